//! 已组合操作的查找表

use infrastructure_common::{PipelineError, PipelineResult};
use pipeline_abstractions::{Invocation, OperationFn};
use serde_json::Value;
use std::collections::HashMap;

/// 已组合操作的查找表
///
/// 键为 `(所有者类型名, 操作名)`。构建完成后只读，
/// 调用方拿到的操作已经包含全部阶段包装。
#[derive(Default)]
pub struct OperationTable {
    operations: HashMap<(String, String), OperationFn>,
}

impl OperationTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个已组合的操作
    pub fn insert(
        &mut self,
        owner: impl Into<String>,
        operation: impl Into<String>,
        composed: OperationFn,
    ) {
        self.operations
            .insert((owner.into(), operation.into()), composed);
    }

    /// 查找操作
    pub fn operation(&self, owner: &str, operation: &str) -> Option<OperationFn> {
        self.operations
            .get(&(owner.to_string(), operation.to_string()))
            .cloned()
    }

    /// 调用操作，未登记的操作返回未知操作错误
    pub async fn invoke(
        &self,
        owner: &str,
        operation: &str,
        invocation: Invocation,
    ) -> PipelineResult<Value> {
        let composed =
            self.operation(owner, operation)
                .ok_or_else(|| PipelineError::UnknownOperation {
                    owner: owner.to_string(),
                    operation: operation.to_string(),
                })?;
        composed(invocation).await
    }

    /// 全部已登记的 `(所有者, 操作)` 键，按字典序返回
    pub fn operation_names(&self) -> Vec<(String, String)> {
        let mut names: Vec<_> = self.operations.keys().cloned().collect();
        names.sort();
        names
    }

    /// 已登记操作的数量
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// 表是否为空
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl std::fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTable")
            .field("operations", &self.operation_names())
            .finish()
    }
}
