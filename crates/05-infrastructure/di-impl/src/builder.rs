//! 依赖图构建器实现
//!
//! 批次式 Kahn 拓扑排序：每一轮收集所有依赖已全部解析的就绪节点，
//! 按扫描顺序实例化后从待解析集移除，循环直到集合为空。
//! 选择批次式而非基于 DFS 的拓扑排序，是因为它天然表达
//! "当前所有可解析组件"，实例化顺序确定，便于测试断言。

use async_trait::async_trait;
use di_abstractions::{
    ComponentRegistration, ContainerConfig, DependencyGraphBuilder, InstanceRegistry,
};
use infrastructure_common::{
    ComponentDescriptor, DependencyError, DependencyResult, Scope, SignatureInspector, TypeInfo,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::registry::InstanceRegistryImpl;

/// 依赖图构建器
///
/// 描述符与注册信息在启动阶段装载一次，此后不可变；
/// 待解析集按声明顺序维护，保证批次在输入顺序确定时可复现。
pub struct GraphBuilder {
    registry: Arc<InstanceRegistryImpl>,
    config: ContainerConfig,
    descriptors: HashMap<String, ComponentDescriptor>,
    registrations: HashMap<String, ComponentRegistration>,
    pending: Vec<String>,
}

impl GraphBuilder {
    /// 创建新的图构建器
    pub fn new(registry: Arc<InstanceRegistryImpl>) -> Self {
        Self::with_config(registry, ContainerConfig::default())
    }

    /// 使用指定配置创建图构建器
    pub fn with_config(registry: Arc<InstanceRegistryImpl>, config: ContainerConfig) -> Self {
        Self {
            registry,
            config,
            descriptors: HashMap::new(),
            registrations: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// 已装载的组件描述符
    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.values()
    }

    /// 校验待解析集内每个依赖都已声明或已被外部绑定
    async fn verify_dependencies_declared(&self) -> DependencyResult<()> {
        for name in &self.pending {
            let descriptor = self.descriptor(name)?;
            for dependency in &descriptor.dependencies {
                if !self.descriptors.contains_key(dependency)
                    && !self.registry.is_bound(dependency, Scope::default()).await
                {
                    return Err(DependencyError::unresolved(dependency.clone()));
                }
            }
        }
        Ok(())
    }

    fn descriptor(&self, name: &str) -> DependencyResult<&ComponentDescriptor> {
        self.descriptors
            .get(name)
            .ok_or_else(|| DependencyError::ComponentNotDeclared {
                name: name.to_string(),
            })
    }

    fn registration(&self, name: &str) -> DependencyResult<&ComponentRegistration> {
        self.registrations
            .get(name)
            .ok_or_else(|| DependencyError::ComponentNotDeclared {
                name: name.to_string(),
            })
    }

    /// 实例化单个组件并绑定到注册表
    async fn instantiate(&self, name: &str) -> DependencyResult<()> {
        let descriptor = self.descriptor(name)?;
        let registration = self.registration(name)?;

        if descriptor.is_abstract {
            return self.instantiate_abstract(registration).await;
        }

        let params = self.registry.inject_into(&registration.signature).await?;
        let instance = self.registry.create_component(registration, &params).await?;
        self.registry
            .bind(registration.type_info.clone(), instance, Scope::default())
            .await
    }

    /// 构建抽象组件：实例化具体替代组件，
    /// 并把它同时绑定到解析键与具体组件自身名称下
    async fn instantiate_abstract(
        &self,
        registration: &ComponentRegistration,
    ) -> DependencyResult<()> {
        for entry in &registration.resolutions {
            let params = self.registry.inject_into(&entry.concrete.signature).await?;
            let instance = self
                .registry
                .create_component(&entry.concrete, &params)
                .await?;

            let abstract_side = match &entry.adapter {
                Some(adapter) => adapter(Arc::clone(&instance)),
                None => Arc::clone(&instance),
            };
            let abstract_info = TypeInfo {
                name: entry.resolution_key.clone(),
                id: registration.type_info.id,
                module_path: registration.type_info.module_path.clone(),
            };
            self.registry
                .bind(abstract_info, abstract_side, Scope::default())
                .await?;
            self.registry
                .bind(entry.concrete.type_info.clone(), instance, Scope::default())
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DependencyGraphBuilder for GraphBuilder {
    fn load_base_set(&mut self, registrations: &[ComponentRegistration]) {
        for registration in registrations {
            let name = &registration.type_info.name;
            if !self.pending.contains(name) {
                self.pending.push(name.clone());
            }
        }
        debug!("根组件集合已播种，共 {} 个", self.pending.len());
    }

    fn load_dependencies(
        &mut self,
        registrations: Vec<ComponentRegistration>,
    ) -> DependencyResult<()> {
        for registration in registrations {
            let name = registration.type_info.name.clone();
            if self.descriptors.contains_key(&name) {
                continue;
            }

            let (mut dependencies, param_names) =
                SignatureInspector::inspect(&name, &registration.signature)?;

            // 抽象解析条目贡献的依赖并入所有者的描述符
            for entry in &registration.resolutions {
                let (resolved_deps, _) = SignatureInspector::inspect(
                    &entry.concrete.type_info.name,
                    &entry.concrete.signature,
                )?;
                dependencies.extend(resolved_deps);
            }

            let descriptor = ComponentDescriptor {
                type_info: registration.type_info.clone(),
                dependencies,
                param_names,
                is_abstract: registration.is_abstract,
            };

            // 声明装载即校验，畸形声明在任何实例化发生之前被拒绝
            if !descriptor.is_abstract {
                descriptor.verify()?;
            }

            debug!(
                "装载组件描述符: {} (依赖: {:?})",
                name, descriptor.dependencies
            );
            self.descriptors.insert(name.clone(), descriptor);
            self.registrations.insert(name, registration);
        }
        Ok(())
    }

    async fn build(&mut self) -> DependencyResult<Vec<String>> {
        self.verify_dependencies_declared().await?;

        let mut order = Vec::new();
        while !self.pending.is_empty() {
            let mut ready = Vec::new();
            for name in &self.pending {
                let descriptor = self.descriptor(name)?;
                let blocked = descriptor
                    .dependencies
                    .iter()
                    .any(|dependency| self.pending.contains(dependency));
                if !blocked {
                    ready.push(name.clone());
                }
            }

            if ready.is_empty() {
                return Err(DependencyError::CircularDependency {
                    pending: self.pending.clone(),
                });
            }

            self.pending.retain(|name| !ready.contains(name));
            for name in ready {
                self.instantiate(&name).await?;
                order.push(name);
            }
        }

        if self.config.log_instantiation_order {
            info!("依赖图构建完成，实例化顺序: {:?}", order);
        }
        Ok(order)
    }
}
