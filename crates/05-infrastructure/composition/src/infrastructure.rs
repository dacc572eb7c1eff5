//! 基础设施句柄

use di_impl::InstanceRegistryImpl;
use infrastructure_common::{DependencyResult, PipelineResult};
use pipeline_abstractions::Invocation;
use serde_json::Value;
use std::sync::Arc;

use crate::builder::InfrastructureBuilder;
use crate::operations::OperationTable;

/// 构建完成的基础设施
///
/// 持有实例注册表与已组合的操作查找表，构建完成后只读。
pub struct NotifyInfrastructure {
    registry: Arc<InstanceRegistryImpl>,
    operations: OperationTable,
    instantiation_order: Vec<String>,
}

impl NotifyInfrastructure {
    pub(crate) fn new(
        registry: Arc<InstanceRegistryImpl>,
        operations: OperationTable,
        instantiation_order: Vec<String>,
    ) -> Self {
        Self {
            registry,
            operations,
            instantiation_order,
        }
    }

    /// 创建基础设施构建器
    pub fn builder() -> InfrastructureBuilder {
        InfrastructureBuilder::new()
    }

    /// 类型化解析组件实例
    pub async fn resolve<T: Send + Sync + 'static>(&self) -> DependencyResult<Arc<T>> {
        self.registry.get_component::<T>().await
    }

    /// 调用已组合的操作
    pub async fn invoke(
        &self,
        owner: &str,
        operation: &str,
        invocation: Invocation,
    ) -> PipelineResult<Value> {
        self.operations.invoke(owner, operation, invocation).await
    }

    /// 组件实例化顺序
    pub fn instantiation_order(&self) -> &[String] {
        &self.instantiation_order
    }

    /// 已组合的操作查找表
    pub fn operations(&self) -> &OperationTable {
        &self.operations
    }

    /// 实例注册表句柄
    pub fn registry(&self) -> Arc<InstanceRegistryImpl> {
        Arc::clone(&self.registry)
    }
}

impl std::fmt::Debug for NotifyInfrastructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyInfrastructure")
            .field("instantiation_order", &self.instantiation_order)
            .field("operations", &self.operations)
            .finish()
    }
}
