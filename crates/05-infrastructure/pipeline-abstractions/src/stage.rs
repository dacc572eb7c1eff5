//! 能力对象定义
//!
//! 四种互相独立的能力接口（权限、守卫、管道、处理器），
//! 组合器按注册的阶段实现哪个接口来分派，
//! 不存在共享基类与模式标志。

use crate::invocation::Invocation;
use crate::operation::OperationFn;
use async_trait::async_trait;
use infrastructure_common::PipelineResult;
use serde_json::Value;
use std::sync::Arc;

/// 阶段默认优先级
///
/// 优先级是实数，同类装饰器的"前置"与"后置"变体
/// 可以确定性地交错排列。相同优先级按注册顺序稳定排序。
pub mod priority {
    /// 权限阶段
    pub const PERMISSION: f64 = 1.0;
    /// 守卫阶段
    pub const GUARD: f64 = 2.0;
    /// 前置管道阶段
    pub const PIPE_BEFORE: f64 = 3.0;
    /// 后置管道阶段
    pub const PIPE_AFTER: f64 = 3.5;
    /// 处理器阶段
    pub const HANDLER: f64 = 4.0;
}

/// 权限拒绝
#[derive(Debug, Clone)]
pub struct PermissionRefusal {
    /// 拒绝原因
    pub reason: String,
}

impl PermissionRefusal {
    /// 创建权限拒绝
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 守卫裁决
#[derive(Debug, Clone)]
pub struct GuardVerdict {
    /// 是否放行
    pub allowed: bool,
    /// 拒绝原因，放行时为空
    pub reason: String,
}

impl GuardVerdict {
    /// 放行
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    /// 拒绝并给出原因
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// 处理器裁决
///
/// 处理器链的控制流在类型系统中可见：
/// `Handled` 产出结果，`Defer` 显式让位给链中的下一个处理器。
#[derive(Debug, Clone)]
pub enum HandlerDecision {
    /// 已处理，产出结果
    Handled(Value),
    /// 让位给下一个处理器
    Defer,
}

/// 权限能力 trait
///
/// 在目标之前运行，可以放行（可带参数改写）或拒绝调用。
#[async_trait]
pub trait Permission: Send + Sync {
    /// 校验并放行调用；拒绝时返回 [`PermissionRefusal`]
    async fn check(&self, invocation: Invocation) -> Result<Invocation, PermissionRefusal>;
}

/// 守卫能力 trait
///
/// 在目标之前运行，只做校验不做改写；
/// 裁决为拒绝时目标不会被调用。
#[async_trait]
pub trait Guard: Send + Sync {
    /// 校验调用
    async fn validate(&self, invocation: &Invocation) -> GuardVerdict;
}

/// 管道能力 trait
///
/// 前置变体改写输入，后置变体改写输出，默认都是透传。
/// 错误向调用方传播，除非管道自行产出安全的回退值。
#[async_trait]
pub trait Pipe: Send + Sync {
    /// 在目标之前改写输入
    async fn transform_input(&self, invocation: Invocation) -> PipelineResult<Invocation> {
        Ok(invocation)
    }

    /// 在目标之后改写输出
    async fn transform_output(&self, result: Value) -> PipelineResult<Value> {
        Ok(result)
    }
}

/// 处理器能力 trait
///
/// 包裹整个调用（含错误翻译）。处理器拿到目标可调用对象，
/// 可以调用它、改写其结果，或以 [`HandlerDecision::Defer`]
/// 显式让位给链中的下一个处理器。
#[async_trait]
pub trait Handler: Send + Sync {
    /// 处理调用
    async fn handle(
        &self,
        target: OperationFn,
        invocation: Invocation,
    ) -> PipelineResult<HandlerDecision>;
}

/// 已注册的阶段
///
/// 组合器按变体分派到对应的包装语义。
#[derive(Clone)]
pub enum Stage {
    /// 权限阶段
    Permission(Arc<dyn Permission>),
    /// 守卫阶段
    Guard(Arc<dyn Guard>),
    /// 前置管道阶段
    PipeBefore(Arc<dyn Pipe>),
    /// 后置管道阶段
    PipeAfter(Arc<dyn Pipe>),
    /// 处理器阶段
    Handler(Arc<dyn Handler>),
}

impl Stage {
    /// 阶段种类的默认优先级
    pub fn default_priority(&self) -> f64 {
        match self {
            Self::Permission(_) => priority::PERMISSION,
            Self::Guard(_) => priority::GUARD,
            Self::PipeBefore(_) => priority::PIPE_BEFORE,
            Self::PipeAfter(_) => priority::PIPE_AFTER,
            Self::Handler(_) => priority::HANDLER,
        }
    }

    /// 阶段种类名称
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Permission(_) => "permission",
            Self::Guard(_) => "guard",
            Self::PipeBefore(_) => "pipe-before",
            Self::PipeAfter(_) => "pipe-after",
            Self::Handler(_) => "handler",
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Stage").field(&self.kind_name()).finish()
    }
}

/// 阶段注册条目
#[derive(Debug, Clone)]
pub struct StageRegistration {
    /// 阶段
    pub stage: Stage,
    /// 优先级
    pub priority: f64,
    /// 注册序号，相同优先级时按它保持注册顺序
    pub sequence: u64,
}
