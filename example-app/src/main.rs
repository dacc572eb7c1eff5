//! 基础设施演示程序
//!
//! 组装一个最小的通知后端：配置服务、抽象通信通道、
//! 邮件服务与带完整管道的通知资源，然后走几条典型调用。

mod components;
mod resource;

use anyhow::Result;
use di_abstractions::{AbstractResolutionEntry, ComponentRegistration, InstanceAdapterFn};
use infrastructure_composition::NotifyInfrastructure;
use pipeline_abstractions::{Invocation, Stage, StageRegistry};
use std::any::Any;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use components::{AppInfo, CommunicationChannel, ConfigService, EmailService, TwilioChannel};
use resource::{
    AdminTokenPermission, DeliveryHandler, DryRunHandler, NotificationResource,
    RecipientNormalizationPipe, ResultEnvelopePipe, ServiceAvailabilityGuard,
};

const ADMIN_TOKEN: &str = "demo-admin-token";
const RESOURCE: &str = "NotificationResource";
const SEND: &str = "send_notification";

/// 抽象通道解析条目，具体实例适配为 trait 对象负载
fn channel_registration() -> ComponentRegistration {
    let adapter: InstanceAdapterFn = Arc::new(|instance| {
        match instance.downcast::<TwilioChannel>() {
            Ok(concrete) => {
                let channel: Arc<dyn CommunicationChannel> = concrete;
                Arc::new(channel) as Arc<dyn Any + Send + Sync>
            }
            Err(original) => original,
        }
    });
    ComponentRegistration::abstract_of::<dyn CommunicationChannel>(vec![
        AbstractResolutionEntry::new(
            "CommunicationChannel",
            ComponentRegistration::of::<TwilioChannel>(),
        )
        .with_adapter(adapter),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_info = Arc::new(AppInfo {
        name: "notify-platform-demo".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    let builder = NotifyInfrastructure::builder()
        .bind_external(app_info)
        .register_component::<ConfigService>()
        .register(channel_registration())
        .register_component::<EmailService>()
        .register_component::<NotificationResource>()
        .expose_operations::<NotificationResource>();

    let stages = builder.stage_registry();
    stages.register(RESOURCE, SEND, Stage::Permission(Arc::new(AdminTokenPermission::new(ADMIN_TOKEN))))?;
    stages.register(RESOURCE, SEND, Stage::Guard(Arc::new(ServiceAvailabilityGuard::new(true))))?;
    stages.register(RESOURCE, SEND, Stage::PipeBefore(Arc::new(RecipientNormalizationPipe)))?;
    stages.register(RESOURCE, SEND, Stage::PipeAfter(Arc::new(ResultEnvelopePipe)))?;
    stages.register(RESOURCE, SEND, Stage::Handler(Arc::new(DryRunHandler)))?;
    stages.register(RESOURCE, SEND, Stage::Handler(Arc::new(DeliveryHandler)))?;

    let infrastructure = builder.build().await?;
    info!("实例化顺序: {:?}", infrastructure.instantiation_order());

    let config = infrastructure.resolve::<ConfigService>().await?;
    info!("短信通道可用: {}", config.sms_enabled());

    let delivered = infrastructure
        .invoke(
            RESOURCE,
            SEND,
            Invocation::new()
                .with_kwarg("token", ADMIN_TOKEN)
                .with_kwarg("recipient", "  Ops@Example.COM ")
                .with_kwarg("body", "deployment finished"),
        )
        .await?;
    info!("投递结果: {}", delivered);

    let dry_run = infrastructure
        .invoke(
            RESOURCE,
            SEND,
            Invocation::new()
                .with_kwarg("token", ADMIN_TOKEN)
                .with_kwarg("recipient", "ops@example.com")
                .with_kwarg("dry_run", true),
        )
        .await?;
    info!("试运行结果: {}", dry_run);

    let rejected = infrastructure
        .invoke(
            RESOURCE,
            SEND,
            Invocation::new()
                .with_kwarg("token", "wrong-token")
                .with_kwarg("recipient", "ops@example.com"),
        )
        .await;
    if let Err(error) = rejected {
        info!("预期的拒绝: {}", error);
    }

    let status = infrastructure
        .invoke(RESOURCE, "channel_status", Invocation::new())
        .await?;
    info!("通道状态: {}", status);

    Ok(())
}
