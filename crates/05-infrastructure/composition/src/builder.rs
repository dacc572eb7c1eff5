//! 基础设施构建器
//!
//! 声明式地收集组件注册、外部绑定与操作暴露，
//! 在一次 `build` 中完成容器构建与管道组合。

use di_abstractions::{ComponentRegistration, ContainerConfig, DependencyGraphBuilder, InstanceRegistry};
use di_impl::{GraphBuilder, InstanceRegistryImpl};
use infrastructure_common::{
    DependencyError, InfrastructureResult, InjectableComponent, Scope, TypeInfo,
};
use pipeline_abstractions::{OperationFn, OperationProvider, StageRegistry};
use pipeline_impl::{PipelineComposer, StageRegistryImpl};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};

use crate::infrastructure::NotifyInfrastructure;
use crate::operations::OperationTable;

/// 操作提取钩子
///
/// 在容器构建完成后接收所有者实例（类型擦除），返回其暴露的裸操作。
type OperationsHook =
    Box<dyn Fn(Arc<dyn Any + Send + Sync>) -> InfrastructureResult<Vec<(String, OperationFn)>> + Send + Sync>;

/// 基础设施构建器
pub struct InfrastructureBuilder {
    config: ContainerConfig,
    registrations: Vec<ComponentRegistration>,
    externals: Vec<(TypeInfo, Arc<dyn Any + Send + Sync>)>,
    operation_owners: Vec<(String, OperationsHook)>,
    stage_registry: Arc<StageRegistryImpl>,
}

impl InfrastructureBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定容器配置创建构建器
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            registrations: Vec::new(),
            externals: Vec::new(),
            operation_owners: Vec::new(),
            stage_registry: Arc::new(StageRegistryImpl::new()),
        }
    }

    /// 阶段注册表句柄，供组件在声明阶段注册管道阶段
    pub fn stage_registry(&self) -> Arc<StageRegistryImpl> {
        Arc::clone(&self.stage_registry)
    }

    /// 登记一条组件注册信息
    #[must_use]
    pub fn register(mut self, registration: ComponentRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// 登记一个可注入组件
    #[must_use]
    pub fn register_component<T: InjectableComponent>(self) -> Self {
        self.register(ComponentRegistration::of::<T>())
    }

    /// 绑定一个在容器外部构造好的实例
    ///
    /// 外部实例在依赖图构建前绑定，可作为其他组件的依赖被注入。
    #[must_use]
    pub fn bind_external<T: Send + Sync + 'static>(mut self, instance: Arc<T>) -> Self {
        self.externals
            .push((TypeInfo::of::<T>(), instance as Arc<dyn Any + Send + Sync>));
        self
    }

    /// 声明某组件暴露操作
    ///
    /// 容器构建完成后，所有者实例按类型名解析，其裸操作
    /// 经管道组合器折叠阶段后登记到操作查找表。
    #[must_use]
    pub fn expose_operations<T: OperationProvider>(mut self) -> Self {
        let owner = TypeInfo::of::<T>().name;
        let hook: OperationsHook = Box::new(|instance| {
            let owner = instance.downcast::<T>().map_err(|_| {
                DependencyError::ParameterTypeMismatch {
                    name: std::any::type_name::<T>().to_string(),
                }
            })?;
            Ok(owner.operations())
        });
        self.operation_owners.push((owner, hook));
        self
    }

    /// 构建基础设施
    ///
    /// 依赖图构建失败时不产生部分可用的基础设施；
    /// 阶段注册表在组合开始前被冻结。
    pub async fn build(self) -> InfrastructureResult<NotifyInfrastructure> {
        let registry = Arc::new(InstanceRegistryImpl::new());

        for (type_info, instance) in self.externals {
            debug!("绑定外部实例: {}", type_info.name);
            registry
                .bind(type_info, instance, Scope::default())
                .await?;
        }

        let mut graph = GraphBuilder::with_config(Arc::clone(&registry), self.config);
        graph.load_base_set(&self.registrations);
        graph.load_dependencies(self.registrations)?;
        let instantiation_order = graph.build().await?;

        self.stage_registry.freeze();
        let composer =
            PipelineComposer::new(Arc::clone(&self.stage_registry) as Arc<dyn StageRegistry>);

        let mut operations = OperationTable::new();
        for (owner_name, hook) in self.operation_owners {
            let instance = registry.get_by_name(&owner_name, Scope::default()).await?;
            for (operation_name, target) in hook(instance)? {
                let composed = composer.compose_operation(&owner_name, &operation_name, target);
                operations.insert(owner_name.clone(), operation_name, composed);
            }
        }

        info!(
            "基础设施构建完成: {} 个组件, {} 个操作",
            instantiation_order.len(),
            operations.len()
        );
        Ok(NotifyInfrastructure::new(
            registry,
            operations,
            instantiation_order,
        ))
    }
}

impl Default for InfrastructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
