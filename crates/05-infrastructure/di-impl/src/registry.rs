//! 实例注册表实现

use async_trait::async_trait;
use di_abstractions::{ComponentRegistration, InstanceRegistry};
use infrastructure_common::{
    ComponentSignature, DependencyError, DependencyResult, ParamMap, Scope, TypeInfo,
};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// 已绑定的实例条目
struct BoundInstance {
    type_info: TypeInfo,
    instance: Arc<dyn Any + Send + Sync>,
}

/// 具体的实例注册表实现
///
/// 按作用域再按组件名称持有单例实例，另维护 TypeId 到名称的索引
/// 以支持类型化解析。每个实例只创建一次，重复绑定是错误。
pub struct InstanceRegistryImpl {
    scopes: RwLock<HashMap<Scope, HashMap<String, BoundInstance>>>,
    type_index: RwLock<HashMap<TypeId, String>>,
}

impl InstanceRegistryImpl {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self {
            scopes: RwLock::new(HashMap::new()),
            type_index: RwLock::new(HashMap::new()),
        }
    }

    /// 类型化解析（进程级作用域）
    pub async fn get_component<T: Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        let instance = self.get(TypeId::of::<T>(), Scope::default()).await?;
        instance
            .downcast::<T>()
            .map_err(|_| DependencyError::ParameterTypeMismatch {
                name: std::any::type_name::<T>().to_string(),
            })
    }

    /// 通过注册信息创建组件实例
    pub async fn create_component(
        &self,
        registration: &ComponentRegistration,
        params: &ParamMap,
    ) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        debug!(
            "创建组件: {} (参数 {} 个)",
            registration.type_info.name,
            params.len()
        );
        (registration.factory)(params)
    }

    /// 按签名声明为任意可调用对象解析注入参数
    ///
    /// 供自由函数注入使用：给定签名，返回已解析的参数集合，
    /// 未标注类型键的参数由调用方自行补齐。
    pub async fn inject_into(&self, signature: &ComponentSignature) -> DependencyResult<ParamMap> {
        let mut params = ParamMap::new();
        for parameter in signature.parameters() {
            let Some(type_key) = &parameter.type_key else {
                continue;
            };
            let instance = self.get_by_name(type_key, Scope::default()).await?;
            params.insert(parameter.name.clone(), instance);
        }
        Ok(params)
    }
}

impl Default for InstanceRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceRegistry for InstanceRegistryImpl {
    async fn bind(
        &self,
        type_info: TypeInfo,
        instance: Arc<dyn Any + Send + Sync>,
        scope: Scope,
    ) -> DependencyResult<()> {
        let mut scopes = self.scopes.write().await;
        let bindings = scopes.entry(scope.clone()).or_default();
        if let Some(existing) = bindings.get(&type_info.name) {
            if existing.type_info.id != type_info.id {
                error!(
                    "组件短名冲突: {} 已绑定为 {}，新绑定来自 {}",
                    type_info.name, existing.type_info.module_path, type_info.module_path
                );
            }
            return Err(DependencyError::DuplicateBinding {
                name: type_info.name,
                scope: scope.to_string(),
            });
        }

        info!("绑定组件: {} (作用域: {})", type_info.name, scope);
        let mut type_index = self.type_index.write().await;
        type_index
            .entry(type_info.id)
            .or_insert_with(|| type_info.name.clone());
        bindings.insert(
            type_info.name.clone(),
            BoundInstance {
                type_info,
                instance,
            },
        );
        Ok(())
    }

    async fn get(
        &self,
        type_id: TypeId,
        scope: Scope,
    ) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        let name = {
            let type_index = self.type_index.read().await;
            type_index
                .get(&type_id)
                .cloned()
                .ok_or_else(|| DependencyError::unresolved(format!("TypeId({type_id:?})")))?
        };
        self.get_by_name(&name, scope).await
    }

    async fn get_by_name(
        &self,
        name: &str,
        scope: Scope,
    ) -> DependencyResult<Arc<dyn Any + Send + Sync>> {
        let scopes = self.scopes.read().await;
        scopes
            .get(&scope)
            .and_then(|bindings| bindings.get(name))
            .map(|bound| Arc::clone(&bound.instance))
            .ok_or_else(|| DependencyError::unresolved(name))
    }

    async fn is_bound(&self, name: &str, scope: Scope) -> bool {
        let scopes = self.scopes.read().await;
        scopes
            .get(&scope)
            .map(|bindings| bindings.contains_key(name))
            .unwrap_or(false)
    }

    async fn bound_components(&self) -> Vec<TypeInfo> {
        let scopes = self.scopes.read().await;
        scopes
            .values()
            .flat_map(|bindings| bindings.values().map(|bound| bound.type_info.clone()))
            .collect()
    }
}
