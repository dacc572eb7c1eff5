//! 实例注册表抽象接口
//!
//! 提供单例实例绑定与解析的核心抽象

use async_trait::async_trait;
use infrastructure_common::{DependencyResult, Scope, TypeInfo};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 实例注册表 trait
///
/// 按类型持有已解析的单例实例，每个实例只创建一次，
/// 启动完成后注册表只读，并发 `get` 无需额外协调。
#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// 绑定一个已解析的实例
    ///
    /// 同一作用域内重复绑定同名组件是错误，绝不覆盖。
    async fn bind(
        &self,
        type_info: TypeInfo,
        instance: Arc<dyn Any + Send + Sync>,
        scope: Scope,
    ) -> DependencyResult<()>;

    /// 解析实例（使用 TypeId）
    async fn get(
        &self,
        type_id: TypeId,
        scope: Scope,
    ) -> DependencyResult<Arc<dyn Any + Send + Sync>>;

    /// 解析实例（使用名称）
    async fn get_by_name(
        &self,
        name: &str,
        scope: Scope,
    ) -> DependencyResult<Arc<dyn Any + Send + Sync>>;

    /// 检查指定名称是否已绑定
    async fn is_bound(&self, name: &str, scope: Scope) -> bool;

    /// 获取所有已绑定组件的类型信息
    async fn bound_components(&self) -> Vec<TypeInfo>;
}

/// 容器配置
///
/// 声明不变式的校验不走配置开关：畸形声明一律在装载时被拒绝。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// 是否在构建完成后记录实例化顺序日志
    pub log_instantiation_order: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            log_instantiation_order: true,
        }
    }
}
