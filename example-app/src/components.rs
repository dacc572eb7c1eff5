//! 演示组件
//!
//! 按通知后端的典型形态组织：配置服务、抽象通信通道
//! 及其具体替代实现、依赖两者的邮件服务。

use async_trait::async_trait;
use infrastructure_common::{
    Component, ComponentSignature, DependencyResult, InjectableComponent, ParamMap,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// 进程元信息，在容器外部构造后绑定
#[derive(Debug)]
pub struct AppInfo {
    /// 应用名称
    pub name: String,
    /// 应用版本
    pub version: String,
}

/// 配置服务
///
/// 构造时为空，配置装载发生在构建后回调中。
#[derive(Debug)]
pub struct ConfigService {
    values: HashMap<String, Value>,
}

impl ConfigService {
    /// 按键读取配置值
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 短信通道是否可用
    pub fn sms_enabled(&self) -> bool {
        self.get("sms_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl Component for ConfigService {
    fn name(&self) -> &'static str {
        "ConfigService"
    }
}

impl InjectableComponent for ConfigService {
    const HAS_POST_CONSTRUCT: bool = true;

    fn signature() -> ComponentSignature {
        ComponentSignature::new()
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            values: HashMap::new(),
        })
    }

    fn post_construct(&mut self) {
        self.values.insert("sms_enabled".into(), json!(true));
        self.values.insert("sender".into(), json!("noreply@notify-platform.dev"));
        self.values.insert("region".into(), json!("eu-west-1"));
        info!("配置服务初始化完成，共 {} 项配置", self.values.len());
    }
}

/// 通信通道抽象
///
/// 具体通道在组合根处通过抽象解析条目替代。
#[async_trait]
pub trait CommunicationChannel: Send + Sync + std::fmt::Debug + 'static {
    /// 通道名称
    fn channel_name(&self) -> &'static str;

    /// 投递一条消息
    async fn deliver(&self, recipient: &str, body: &str) -> Value;
}

/// Twilio 短信通道
#[derive(Debug)]
pub struct TwilioChannel {
    config: Arc<ConfigService>,
}

impl Component for TwilioChannel {
    fn name(&self) -> &'static str {
        "TwilioChannel"
    }
}

impl InjectableComponent for TwilioChannel {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("config", "ConfigService")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            config: params.component::<ConfigService>("config")?,
        })
    }
}

#[async_trait]
impl CommunicationChannel for TwilioChannel {
    fn channel_name(&self) -> &'static str {
        "twilio"
    }

    async fn deliver(&self, recipient: &str, body: &str) -> Value {
        let region = self
            .config
            .get("region")
            .cloned()
            .unwrap_or_else(|| json!("unknown"));
        info!("通过 Twilio 投递消息: {} ({} 字节)", recipient, body.len());
        json!({
            "channel": self.channel_name(),
            "recipient": recipient,
            "region": region,
            "delivered": true,
        })
    }
}

/// 邮件服务
///
/// 通过抽象类型键注入通信通道，对具体通道实现无感知。
#[derive(Debug)]
pub struct EmailService {
    config: Arc<ConfigService>,
    channel: Arc<dyn CommunicationChannel>,
}

impl EmailService {
    /// 发送一条通知
    pub async fn send(&self, recipient: &str, body: &str) -> Value {
        let sender = self
            .config
            .get("sender")
            .cloned()
            .unwrap_or_else(|| json!("unknown"));
        let receipt = self.channel.deliver(recipient, body).await;
        json!({
            "sender": sender,
            "receipt": receipt,
        })
    }

    /// 当前使用的通道名称
    pub fn channel_name(&self) -> &'static str {
        self.channel.channel_name()
    }
}

impl Component for EmailService {
    fn name(&self) -> &'static str {
        "EmailService"
    }
}

impl InjectableComponent for EmailService {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
            .with_injected("config", "ConfigService")
            .with_injected("channel", "CommunicationChannel")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            config: params.component::<ConfigService>("config")?,
            channel: params.trait_component::<dyn CommunicationChannel>("channel")?,
        })
    }
}
