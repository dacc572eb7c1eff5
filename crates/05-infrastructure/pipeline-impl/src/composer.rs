//! 管道组合器
//!
//! 在实例构建阶段，把某操作上注册的全部阶段折叠成一个组合后的
//! 可调用对象：阶段按优先级降序稳定排序，优先级最高的包装层
//! 位于最外侧（进入时最先执行，返回时最后执行，经典洋葱分层）。
//! 组合 N 个阶段只产生 O(N) 次包装分配，每个实例一次，与调用次数无关。

use infrastructure_common::PipelineError;
use pipeline_abstractions::{
    Guard, Handler, HandlerDecision, OperationFn, OperationFuture, Permission, Pipe, Stage,
    StageRegistry,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// 组合器内部的包装层
///
/// 同一操作上的全部处理器阶段合并为一条处理器链：
/// 处理器链的状态机（让位 -> 下一个，链耗尽 -> 未处理错误）
/// 遍历的是一个处理器列表，逐层包装无法表达链耗尽的情形。
enum Layer {
    Permission(Arc<dyn Permission>, f64, u64),
    Guard(Arc<dyn Guard>, f64, u64),
    PipeBefore(Arc<dyn Pipe>, f64, u64),
    PipeAfter(Arc<dyn Pipe>, f64, u64),
    HandlerChain(Vec<Arc<dyn Handler>>, f64, u64),
}

impl Layer {
    fn priority(&self) -> f64 {
        match self {
            Self::Permission(_, priority, _)
            | Self::Guard(_, priority, _)
            | Self::PipeBefore(_, priority, _)
            | Self::PipeAfter(_, priority, _)
            | Self::HandlerChain(_, priority, _) => *priority,
        }
    }

    fn sequence(&self) -> u64 {
        match self {
            Self::Permission(_, _, sequence)
            | Self::Guard(_, _, sequence)
            | Self::PipeBefore(_, _, sequence)
            | Self::PipeAfter(_, _, sequence)
            | Self::HandlerChain(_, _, sequence) => *sequence,
        }
    }
}

/// 管道组合器
pub struct PipelineComposer {
    stages: Arc<dyn StageRegistry>,
}

impl PipelineComposer {
    /// 创建新的组合器
    pub fn new(stages: Arc<dyn StageRegistry>) -> Self {
        Self { stages }
    }

    /// 把指定操作上注册的阶段折叠到目标可调用对象上
    ///
    /// 没有注册任何阶段时原样返回目标。
    pub fn compose_operation(
        &self,
        owner: &str,
        operation: &str,
        target: OperationFn,
    ) -> OperationFn {
        let registrations = self.stages.stages_for(owner, operation);
        if registrations.is_empty() {
            return target;
        }

        let mut layers = Vec::new();
        let mut handlers: Vec<(Arc<dyn Handler>, f64, u64)> = Vec::new();
        for registration in registrations {
            match registration.stage {
                Stage::Permission(permission) => layers.push(Layer::Permission(
                    permission,
                    registration.priority,
                    registration.sequence,
                )),
                Stage::Guard(guard) => layers.push(Layer::Guard(
                    guard,
                    registration.priority,
                    registration.sequence,
                )),
                Stage::PipeBefore(pipe) => layers.push(Layer::PipeBefore(
                    pipe,
                    registration.priority,
                    registration.sequence,
                )),
                Stage::PipeAfter(pipe) => layers.push(Layer::PipeAfter(
                    pipe,
                    registration.priority,
                    registration.sequence,
                )),
                Stage::Handler(handler) => {
                    handlers.push((handler, registration.priority, registration.sequence));
                }
            }
        }

        if !handlers.is_empty() {
            handlers.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.2.cmp(&b.2))
            });
            let chain_priority = handlers
                .iter()
                .map(|(_, priority, _)| *priority)
                .fold(f64::MIN, f64::max);
            let chain_sequence = handlers
                .iter()
                .map(|(_, _, sequence)| *sequence)
                .min()
                .unwrap_or(0);
            let chain = handlers.into_iter().map(|(handler, _, _)| handler).collect();
            layers.push(Layer::HandlerChain(chain, chain_priority, chain_sequence));
        }

        // 优先级降序，相同优先级按注册顺序
        layers.sort_by(|a, b| {
            b.priority()
                .partial_cmp(&a.priority())
                .unwrap_or(Ordering::Equal)
                .then(a.sequence().cmp(&b.sequence()))
        });

        debug!(
            "组合操作: {}.{} (共 {} 层)",
            owner,
            operation,
            layers.len()
        );

        // 自内向外折叠，排序最前（优先级最高）的层最后包装，成为最外层
        let mut composed = target;
        for layer in layers.into_iter().rev() {
            composed = match layer {
                Layer::Permission(permission, _, _) => wrap_permission(permission, composed),
                Layer::Guard(guard, _, _) => wrap_guard(guard, composed),
                Layer::PipeBefore(pipe, _, _) => wrap_pipe_before(pipe, composed),
                Layer::PipeAfter(pipe, _, _) => wrap_pipe_after(pipe, composed),
                Layer::HandlerChain(chain, _, _) => {
                    wrap_handler_chain(chain, composed, owner.to_string(), operation.to_string())
                }
            };
        }
        composed
    }
}

/// 权限层：任何拒绝或错误都被翻译为未授权结果，目标不会被调用
fn wrap_permission(permission: Arc<dyn Permission>, inner: OperationFn) -> OperationFn {
    Arc::new(move |invocation| -> OperationFuture {
        let permission = Arc::clone(&permission);
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            match permission.check(invocation).await {
                Ok(invocation) => inner(invocation).await,
                Err(refusal) => Err(PipelineError::RejectedByPermission {
                    reason: refusal.reason,
                }),
            }
        })
    })
}

/// 守卫层：裁决为拒绝时调用方收到拒绝原因，目标不会被调用
fn wrap_guard(guard: Arc<dyn Guard>, inner: OperationFn) -> OperationFn {
    Arc::new(move |invocation| -> OperationFuture {
        let guard = Arc::clone(&guard);
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            let verdict = guard.validate(&invocation).await;
            if !verdict.allowed {
                return Err(PipelineError::RejectedByGuard {
                    reason: verdict.reason,
                });
            }
            inner(invocation).await
        })
    })
}

/// 前置管道层：在目标之前改写输入
fn wrap_pipe_before(pipe: Arc<dyn Pipe>, inner: OperationFn) -> OperationFn {
    Arc::new(move |invocation| -> OperationFuture {
        let pipe = Arc::clone(&pipe);
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            let invocation = pipe.transform_input(invocation).await?;
            inner(invocation).await
        })
    })
}

/// 后置管道层：在目标之后改写输出
fn wrap_pipe_after(pipe: Arc<dyn Pipe>, inner: OperationFn) -> OperationFn {
    Arc::new(move |invocation| -> OperationFuture {
        let pipe = Arc::clone(&pipe);
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            let result = inner(invocation).await?;
            pipe.transform_output(result).await
        })
    })
}

/// 处理器链层
///
/// 逐个调用处理器：产出结果即返回，让位则尝试下一个，
/// 其他错误向外传播；链耗尽仍无结果是终态的未处理错误。
fn wrap_handler_chain(
    handlers: Vec<Arc<dyn Handler>>,
    inner: OperationFn,
    owner: String,
    operation: String,
) -> OperationFn {
    Arc::new(move |invocation| -> OperationFuture {
        let handlers = handlers.clone();
        let inner = Arc::clone(&inner);
        let owner = owner.clone();
        let operation = operation.clone();
        Box::pin(async move {
            for handler in &handlers {
                match handler.handle(Arc::clone(&inner), invocation.clone()).await? {
                    HandlerDecision::Handled(value) => return Ok(value),
                    HandlerDecision::Defer => continue,
                }
            }
            Err(PipelineError::UnhandledCall { owner, operation })
        })
    })
}
