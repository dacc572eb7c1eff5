//! Centralized integration tests for the composition root
use async_trait::async_trait;
use infrastructure_common::{
    Component, ComponentSignature, DependencyResult, InfrastructureError, InjectableComponent,
    ParamMap, PipelineError, PipelineResult,
};
use infrastructure_composition::NotifyInfrastructure;
use pipeline_abstractions::{
    operation_fn, Guard, GuardVerdict, Invocation, OperationFn, OperationProvider, Pipe, Stage,
    StageRegistry,
};
use serde_json::{json, Value};
use std::sync::Arc;

const GREETER: &str = "GreeterResource";

/// 外部构造的时钟桩
#[derive(Debug)]
struct FixedClock {
    now: &'static str,
}

/// 问候语配置组件
#[derive(Debug)]
struct GreetingConfig {
    template: String,
}

impl Component for GreetingConfig {
    fn name(&self) -> &'static str {
        "GreetingConfig"
    }
}

impl InjectableComponent for GreetingConfig {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            template: "hello, {}".to_string(),
        })
    }
}

/// 暴露操作的资源组件，依赖容器组件与外部绑定
#[derive(Debug)]
struct GreeterResource {
    config: Arc<GreetingConfig>,
    clock: Arc<FixedClock>,
}

impl Component for GreeterResource {
    fn name(&self) -> &'static str {
        GREETER
    }
}

impl InjectableComponent for GreeterResource {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
            .with_injected("config", "GreetingConfig")
            .with_injected("clock", "FixedClock")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            config: params.component::<GreetingConfig>("config")?,
            clock: params.component::<FixedClock>("clock")?,
        })
    }
}

impl OperationProvider for GreeterResource {
    fn operations(self: Arc<Self>) -> Vec<(String, OperationFn)> {
        let greet = {
            let resource = Arc::clone(&self);
            operation_fn(move |invocation: Invocation| {
                let resource = Arc::clone(&resource);
                async move {
                    let name = invocation
                        .kwarg("name")
                        .and_then(Value::as_str)
                        .unwrap_or("world");
                    Ok(json!({
                        "message": resource.config.template.replace("{}", name),
                        "at": resource.clock.now,
                    }))
                }
            })
        };
        vec![("greet".to_string(), greet)]
    }
}

/// 拒绝空名字的守卫
struct NonEmptyNameGuard;

#[async_trait]
impl Guard for NonEmptyNameGuard {
    async fn validate(&self, invocation: &Invocation) -> GuardVerdict {
        match invocation.kwarg("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => GuardVerdict::allow(),
            _ => GuardVerdict::reject("name must not be empty"),
        }
    }
}

/// 给结果打上管道标记的后置管道
struct StampPipe;

#[async_trait]
impl Pipe for StampPipe {
    async fn transform_output(&self, result: Value) -> PipelineResult<Value> {
        Ok(json!({ "stamped": result }))
    }
}

async fn build_infrastructure() -> NotifyInfrastructure {
    let builder = NotifyInfrastructure::builder()
        .bind_external(Arc::new(FixedClock { now: "2026-01-01" }))
        .register_component::<GreetingConfig>()
        .register_component::<GreeterResource>()
        .expose_operations::<GreeterResource>();

    let stages = builder.stage_registry();
    stages
        .register(GREETER, "greet", Stage::Guard(Arc::new(NonEmptyNameGuard)))
        .unwrap();
    stages
        .register(GREETER, "greet", Stage::PipeAfter(Arc::new(StampPipe)))
        .unwrap();

    builder.build().await.unwrap()
}

#[tokio::test]
async fn test_full_startup_walk() {
    let infrastructure = build_infrastructure().await;

    // 配置组件先于依赖它的资源组件
    assert_eq!(
        infrastructure.instantiation_order(),
        &["GreetingConfig".to_string(), GREETER.to_string()]
    );

    let result = infrastructure
        .invoke(GREETER, "greet", Invocation::new().with_kwarg("name", "ops"))
        .await
        .unwrap();
    assert_eq!(
        result,
        json!({ "stamped": { "message": "hello, ops", "at": "2026-01-01" } })
    );
}

#[tokio::test]
async fn test_guard_applies_to_composed_operation() {
    let infrastructure = build_infrastructure().await;

    let error = infrastructure
        .invoke(GREETER, "greet", Invocation::new().with_kwarg("name", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        PipelineError::RejectedByGuard { reason } if reason == "name must not be empty"
    ));
}

#[tokio::test]
async fn test_unknown_operation_is_reported() {
    let infrastructure = build_infrastructure().await;

    let error = infrastructure
        .invoke(GREETER, "missing", Invocation::new())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        PipelineError::UnknownOperation { owner, operation }
            if owner == GREETER && operation == "missing"
    ));
}

#[tokio::test]
async fn test_external_binding_is_injectable_and_resolvable() {
    let infrastructure = build_infrastructure().await;

    let clock = infrastructure.resolve::<FixedClock>().await.unwrap();
    assert_eq!(clock.now, "2026-01-01");

    let resource = infrastructure.resolve::<GreeterResource>().await.unwrap();
    assert!(Arc::ptr_eq(&resource.clock, &clock));
}

#[tokio::test]
async fn test_stage_registry_is_frozen_after_build() {
    let builder = NotifyInfrastructure::builder()
        .bind_external(Arc::new(FixedClock { now: "2026-01-01" }))
        .register_component::<GreetingConfig>()
        .register_component::<GreeterResource>()
        .expose_operations::<GreeterResource>();
    let stages = builder.stage_registry();

    let _infrastructure = builder.build().await.unwrap();

    assert!(stages.is_frozen());
    let error = stages
        .register(GREETER, "greet", Stage::Guard(Arc::new(NonEmptyNameGuard)))
        .unwrap_err();
    assert!(matches!(error, PipelineError::RegistryFrozen { .. }));
}

#[tokio::test]
async fn test_build_failure_surfaces_dependency_error() {
    // 缺少 FixedClock 外部绑定，资源组件的依赖无法解析
    let builder = NotifyInfrastructure::builder()
        .register_component::<GreetingConfig>()
        .register_component::<GreeterResource>()
        .expose_operations::<GreeterResource>();

    let error = builder.build().await.unwrap_err();
    assert!(matches!(
        error,
        InfrastructureError::DependencyError { .. }
    ));
}

#[tokio::test]
async fn test_operation_table_lists_composed_operations() {
    let infrastructure = build_infrastructure().await;

    let names = infrastructure.operations().operation_names();
    assert_eq!(names, vec![(GREETER.to_string(), "greet".to_string())]);
    assert_eq!(infrastructure.operations().len(), 1);
}
