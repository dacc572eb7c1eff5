//! 通知资源与管道阶段
//!
//! 资源组件暴露操作，阶段在引导时注册到 `(NotificationResource, 操作名)` 上。

use async_trait::async_trait;
use infrastructure_common::{
    Component, ComponentSignature, DependencyResult, InjectableComponent, ParamMap,
    PipelineError, PipelineResult,
};
use pipeline_abstractions::{
    operation_fn, Guard, GuardVerdict, Handler, HandlerDecision, Invocation, OperationFn,
    OperationProvider, OperationResult, Permission, PermissionRefusal, Pipe,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::components::{AppInfo, EmailService};

/// 通知资源
///
/// 操作的裸实现，管道阶段在组合时被折叠到它外面。
#[derive(Debug)]
pub struct NotificationResource {
    email: Arc<EmailService>,
    app: Arc<AppInfo>,
}

impl NotificationResource {
    async fn send_notification(&self, invocation: Invocation) -> OperationResult {
        let recipient = invocation
            .kwarg("recipient")
            .and_then(Value::as_str)
            .ok_or_else(|| PipelineError::operation_failed("缺少 recipient 参数"))?;
        let body = invocation
            .kwarg("body")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(self.email.send(recipient, body).await)
    }

    async fn channel_status(&self, _invocation: Invocation) -> OperationResult {
        Ok(json!({
            "app": self.app.name,
            "version": self.app.version,
            "channel": self.email.channel_name(),
        }))
    }
}

impl Component for NotificationResource {
    fn name(&self) -> &'static str {
        "NotificationResource"
    }
}

impl InjectableComponent for NotificationResource {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
            .with_injected("email", "EmailService")
            .with_injected("app", "AppInfo")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            email: params.component::<EmailService>("email")?,
            app: params.component::<AppInfo>("app")?,
        })
    }
}

impl OperationProvider for NotificationResource {
    fn operations(self: Arc<Self>) -> Vec<(String, OperationFn)> {
        let send = {
            let resource = Arc::clone(&self);
            operation_fn(move |invocation| {
                let resource = Arc::clone(&resource);
                async move { resource.send_notification(invocation).await }
            })
        };
        let status = {
            let resource = Arc::clone(&self);
            operation_fn(move |invocation| {
                let resource = Arc::clone(&resource);
                async move { resource.channel_status(invocation).await }
            })
        };
        vec![
            ("send_notification".to_string(), send),
            ("channel_status".to_string(), status),
        ]
    }
}

/// 管理令牌权限
///
/// 校验通过后从参数中移除令牌，下游阶段看不到凭据。
pub struct AdminTokenPermission {
    expected: String,
}

impl AdminTokenPermission {
    /// 创建权限阶段
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

#[async_trait]
impl Permission for AdminTokenPermission {
    async fn check(&self, mut invocation: Invocation) -> Result<Invocation, PermissionRefusal> {
        let token = invocation
            .kwarg("token")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if token != self.expected {
            warn!("管理令牌校验失败");
            return Err(PermissionRefusal::new("管理令牌无效"));
        }
        invocation.kwargs.remove("token");
        Ok(invocation)
    }
}

/// 服务可用性守卫
pub struct ServiceAvailabilityGuard {
    available: bool,
}

impl ServiceAvailabilityGuard {
    /// 创建守卫阶段
    pub fn new(available: bool) -> Self {
        Self { available }
    }
}

#[async_trait]
impl Guard for ServiceAvailabilityGuard {
    async fn validate(&self, _invocation: &Invocation) -> GuardVerdict {
        if self.available {
            GuardVerdict::allow()
        } else {
            GuardVerdict::reject("通知服务当前不可用")
        }
    }
}

/// 入参规整管道，收件人地址统一小写
pub struct RecipientNormalizationPipe;

#[async_trait]
impl Pipe for RecipientNormalizationPipe {
    async fn transform_input(&self, mut invocation: Invocation) -> PipelineResult<Invocation> {
        if let Some(recipient) = invocation.kwarg("recipient").and_then(Value::as_str) {
            let normalized = recipient.trim().to_lowercase();
            invocation.set_kwarg("recipient", normalized);
        }
        Ok(invocation)
    }
}

/// 出参封套管道，统一响应外层结构
pub struct ResultEnvelopePipe;

#[async_trait]
impl Pipe for ResultEnvelopePipe {
    async fn transform_output(&self, result: Value) -> PipelineResult<Value> {
        Ok(json!({
            "status": "ok",
            "data": result,
        }))
    }
}

/// 试运行处理器
///
/// 调用带 `dry_run` 标记时直接产出结果，否则让位给下一个处理器。
pub struct DryRunHandler;

#[async_trait]
impl Handler for DryRunHandler {
    async fn handle(
        &self,
        _target: OperationFn,
        invocation: Invocation,
    ) -> PipelineResult<HandlerDecision> {
        if invocation
            .kwarg("dry_run")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            info!("试运行请求，跳过实际投递");
            return Ok(HandlerDecision::Handled(json!({ "dry_run": true })));
        }
        Ok(HandlerDecision::Defer)
    }
}

/// 投递处理器，调用裸操作并产出其结果
pub struct DeliveryHandler;

#[async_trait]
impl Handler for DeliveryHandler {
    async fn handle(
        &self,
        target: OperationFn,
        invocation: Invocation,
    ) -> PipelineResult<HandlerDecision> {
        let result = target(invocation).await?;
        Ok(HandlerDecision::Handled(result))
    }
}
