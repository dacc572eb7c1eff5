//! 操作类型定义
//!
//! 组合后的操作是一个异步可调用对象，传输层直接调用它，
//! 对内部的阶段链一无所知。

use crate::invocation::Invocation;
use futures::future::BoxFuture;
use infrastructure_common::PipelineError;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// 操作调用结果
pub type OperationResult = Result<Value, PipelineError>;

/// 操作的异步返回值
pub type OperationFuture = BoxFuture<'static, OperationResult>;

/// 操作可调用对象类型
pub type OperationFn = Arc<dyn Fn(Invocation) -> OperationFuture + Send + Sync>;

/// 操作提供者 trait
///
/// 暴露操作的组件实现此 trait，在声明时显式列出自己的操作，
/// 替代原有的按命名前缀扫描方法的约定。
pub trait OperationProvider: Send + Sync + 'static {
    /// 该组件暴露的全部操作，`(操作名, 裸操作)` 对
    fn operations(self: Arc<Self>) -> Vec<(String, OperationFn)>;
}

/// 把异步闭包包装为操作可调用对象
pub fn operation_fn<F, Fut>(f: F) -> OperationFn
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OperationResult> + Send + 'static,
{
    Arc::new(move |invocation| -> OperationFuture { Box::pin(f(invocation)) })
}
