//! Centralized integration tests for di-impl crate
use di_abstractions::{
    AbstractResolutionEntry, ComponentRegistration, DependencyGraphBuilder, InstanceAdapterFn,
    InstanceRegistry,
};
use di_impl::{GraphBuilder, InstanceRegistryImpl};
use infrastructure_common::{
    Component, ComponentSignature, DependencyError, DependencyResult, InjectableComponent,
    ParamMap, Scope, TypeInfo,
};
use std::any::Any;
use std::sync::Arc;

/// 无依赖的叶子组件
#[derive(Debug)]
struct MetricsStore;

impl Component for MetricsStore {
    fn name(&self) -> &'static str {
        "MetricsStore"
    }
}

impl InjectableComponent for MetricsStore {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self)
    }
}

/// 依赖一层的组件
#[derive(Debug)]
struct AuditLog {
    metrics: Arc<MetricsStore>,
}

impl Component for AuditLog {
    fn name(&self) -> &'static str {
        "AuditLog"
    }
}

impl InjectableComponent for AuditLog {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("metrics", "MetricsStore")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            metrics: params.component::<MetricsStore>("metrics")?,
        })
    }
}

/// 同时依赖两层的组件
#[derive(Debug)]
struct ReportService {
    metrics: Arc<MetricsStore>,
    audit: Arc<AuditLog>,
}

impl Component for ReportService {
    fn name(&self) -> &'static str {
        "ReportService"
    }
}

impl InjectableComponent for ReportService {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
            .with_injected("metrics", "MetricsStore")
            .with_injected("audit", "AuditLog")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            metrics: params.component::<MetricsStore>("metrics")?,
            audit: params.component::<AuditLog>("audit")?,
        })
    }
}

/// 互相依赖的一对组件，用于循环检测
#[derive(Debug)]
struct PollerA;

impl Component for PollerA {
    fn name(&self) -> &'static str {
        "PollerA"
    }
}

impl InjectableComponent for PollerA {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("peer", "PollerB")
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self)
    }
}

#[derive(Debug)]
struct PollerB;

impl Component for PollerB {
    fn name(&self) -> &'static str {
        "PollerB"
    }
}

impl InjectableComponent for PollerB {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("peer", "PollerA")
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self)
    }
}

/// 依赖自己的组件，用于自环检测
#[derive(Debug)]
struct SelfLoop;

impl Component for SelfLoop {
    fn name(&self) -> &'static str {
        "SelfLoop"
    }
}

impl InjectableComponent for SelfLoop {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("me", "SelfLoop")
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self)
    }
}

/// 声明了构建后回调能力的组件
#[derive(Debug)]
struct WarmCache {
    warmed: bool,
}

impl Component for WarmCache {
    fn name(&self) -> &'static str {
        "WarmCache"
    }
}

impl InjectableComponent for WarmCache {
    const HAS_POST_CONSTRUCT: bool = true;

    fn signature() -> ComponentSignature {
        ComponentSignature::new()
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self { warmed: false })
    }

    fn post_construct(&mut self) {
        self.warmed = true;
    }
}

/// 抽象解析用的签名器
trait TokenSigner: Send + Sync + std::fmt::Debug + 'static {
    fn sign(&self, payload: &str) -> String;
}

#[derive(Debug)]
struct HmacSigner;

impl Component for HmacSigner {
    fn name(&self) -> &'static str {
        "HmacSigner"
    }
}

impl InjectableComponent for HmacSigner {
    fn signature() -> ComponentSignature {
        ComponentSignature::new()
    }

    fn construct(_params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self)
    }
}

impl TokenSigner for HmacSigner {
    fn sign(&self, payload: &str) -> String {
        format!("hmac:{payload}")
    }
}

/// 通过抽象类型键注入签名器的组件
#[derive(Debug)]
struct SessionService {
    signer: Arc<dyn TokenSigner>,
}

impl Component for SessionService {
    fn name(&self) -> &'static str {
        "SessionService"
    }
}

impl InjectableComponent for SessionService {
    fn signature() -> ComponentSignature {
        ComponentSignature::new().with_injected("signer", "TokenSigner")
    }

    fn construct(params: &ParamMap) -> DependencyResult<Self> {
        Ok(Self {
            signer: params.trait_component::<dyn TokenSigner>("signer")?,
        })
    }
}

fn signer_registration() -> ComponentRegistration {
    let adapter: InstanceAdapterFn = Arc::new(|instance| match instance.downcast::<HmacSigner>() {
        Ok(concrete) => {
            let signer: Arc<dyn TokenSigner> = concrete;
            Arc::new(signer) as Arc<dyn Any + Send + Sync>
        }
        Err(original) => original,
    });
    ComponentRegistration::abstract_of::<dyn TokenSigner>(vec![AbstractResolutionEntry::new(
        "TokenSigner",
        ComponentRegistration::of::<HmacSigner>(),
    )
    .with_adapter(adapter)])
}

async fn build_graph(
    registrations: Vec<ComponentRegistration>,
) -> (Arc<InstanceRegistryImpl>, DependencyResult<Vec<String>>) {
    let registry = Arc::new(InstanceRegistryImpl::new());
    let mut graph = GraphBuilder::new(Arc::clone(&registry));
    graph.load_base_set(&registrations);
    let order = match graph.load_dependencies(registrations) {
        Ok(()) => graph.build().await,
        Err(error) => Err(error),
    };
    (registry, order)
}

#[tokio::test]
async fn test_topological_instantiation_order() {
    // 声明顺序故意与依赖顺序相反
    let registrations = vec![
        ComponentRegistration::of::<ReportService>(),
        ComponentRegistration::of::<AuditLog>(),
        ComponentRegistration::of::<MetricsStore>(),
    ];
    let (registry, order) = build_graph(registrations).await;

    let order = order.unwrap();
    assert_eq!(order, vec!["MetricsStore", "AuditLog", "ReportService"]);

    let report = registry.get_component::<ReportService>().await.unwrap();
    let metrics = registry.get_component::<MetricsStore>().await.unwrap();
    // 直接注入与经由 AuditLog 注入的是同一个实例
    assert!(Arc::ptr_eq(&report.metrics, &metrics));
    assert!(Arc::ptr_eq(&report.audit.metrics, &metrics));
}

#[tokio::test]
async fn test_build_order_is_deterministic() {
    let registrations = || {
        vec![
            ComponentRegistration::of::<ReportService>(),
            ComponentRegistration::of::<AuditLog>(),
            ComponentRegistration::of::<MetricsStore>(),
            ComponentRegistration::of::<WarmCache>(),
        ]
    };
    let (_, first) = build_graph(registrations()).await;
    let (_, second) = build_graph(registrations()).await;
    assert_eq!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn test_cycle_detection_instantiates_nothing() {
    let registrations = vec![
        ComponentRegistration::of::<PollerA>(),
        ComponentRegistration::of::<PollerB>(),
    ];
    let (registry, order) = build_graph(registrations).await;

    let error = order.unwrap_err();
    match error {
        DependencyError::CircularDependency { pending } => {
            assert_eq!(pending.len(), 2);
            assert!(pending.contains(&"PollerA".to_string()));
            assert!(pending.contains(&"PollerB".to_string()));
        }
        other => panic!("expected CircularDependency, got {other:?}"),
    }
    // 环内组件零实例化
    assert!(registry.bound_components().await.is_empty());
}

#[tokio::test]
async fn test_self_cycle_is_detected() {
    let registrations = vec![
        ComponentRegistration::of::<MetricsStore>(),
        ComponentRegistration::of::<SelfLoop>(),
    ];
    let (registry, order) = build_graph(registrations).await;

    assert!(matches!(
        order.unwrap_err(),
        DependencyError::CircularDependency { pending } if pending == vec!["SelfLoop".to_string()]
    ));
    // 自环外的组件已正常实例化
    assert!(registry.is_bound("MetricsStore", Scope::default()).await);
}

#[tokio::test]
async fn test_undeclared_dependency_rejected_before_instantiation() {
    let registrations = vec![ComponentRegistration::of::<AuditLog>()];
    let (registry, order) = build_graph(registrations).await;

    assert!(matches!(
        order.unwrap_err(),
        DependencyError::UnresolvedDependency { name } if name == "MetricsStore"
    ));
    assert!(registry.bound_components().await.is_empty());
}

#[tokio::test]
async fn test_malformed_declaration_rejected_at_load_time() {
    // 解析条目把额外依赖并入描述符，依赖数与参数数失配
    let mut malformed = ComponentRegistration::of::<ReportService>();
    malformed.resolutions.push(AbstractResolutionEntry::new(
        "TokenSigner",
        ComponentRegistration::of::<SessionService>(),
    ));

    let registry = Arc::new(InstanceRegistryImpl::new());
    let mut graph = GraphBuilder::new(Arc::clone(&registry));
    let registrations = vec![
        malformed,
        ComponentRegistration::of::<MetricsStore>(),
        ComponentRegistration::of::<AuditLog>(),
    ];
    graph.load_base_set(&registrations);

    // 装载阶段即失败，不等到 build
    let error = graph.load_dependencies(registrations).unwrap_err();
    assert!(matches!(
        error,
        DependencyError::AmbiguousParameterBinding {
            dependencies: 3,
            parameters: 2,
            ..
        }
    ));
    assert!(registry.bound_components().await.is_empty());
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let registrations = vec![ComponentRegistration::of::<MetricsStore>()];
    let (registry, order) = build_graph(registrations).await;
    order.unwrap();

    let first = registry.get_component::<MetricsStore>().await.unwrap();
    let second = registry.get_component::<MetricsStore>().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_duplicate_binding_is_rejected() {
    let registry = InstanceRegistryImpl::new();
    let instance = Arc::new(MetricsStore) as Arc<dyn Any + Send + Sync>;
    registry
        .bind(
            TypeInfo::of::<MetricsStore>(),
            Arc::clone(&instance),
            Scope::default(),
        )
        .await
        .unwrap();

    let error = registry
        .bind(TypeInfo::of::<MetricsStore>(), instance, Scope::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DependencyError::DuplicateBinding { name, .. } if name == "MetricsStore"
    ));
}

mod east {
    /// 与 west::Endpoint 短名相同的类型
    #[derive(Debug)]
    pub struct Endpoint;
}

mod west {
    /// 与 east::Endpoint 短名相同的类型
    #[derive(Debug)]
    pub struct Endpoint;
}

#[tokio::test]
async fn test_same_short_name_across_modules_is_rejected() {
    // 短名是注册键，不同模块下的同名类型在绑定时被拒绝
    let registry = InstanceRegistryImpl::new();
    registry
        .bind(
            TypeInfo::of::<east::Endpoint>(),
            Arc::new(east::Endpoint),
            Scope::default(),
        )
        .await
        .unwrap();

    let error = registry
        .bind(
            TypeInfo::of::<west::Endpoint>(),
            Arc::new(west::Endpoint),
            Scope::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DependencyError::DuplicateBinding { name, .. } if name == "Endpoint"
    ));
}

#[tokio::test]
async fn test_unresolved_lookup_reports_name() {
    let registry = InstanceRegistryImpl::new();
    let error = registry
        .get_by_name("Phantom", Scope::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        DependencyError::UnresolvedDependency { name } if name == "Phantom"
    ));
}

#[tokio::test]
async fn test_post_construct_runs_before_binding() {
    let registrations = vec![ComponentRegistration::of::<WarmCache>()];
    let (registry, order) = build_graph(registrations).await;
    order.unwrap();

    let cache = registry.get_component::<WarmCache>().await.unwrap();
    assert!(cache.warmed);
}

#[tokio::test]
async fn test_abstract_resolution_binds_both_keys() {
    let registrations = vec![
        signer_registration(),
        ComponentRegistration::of::<SessionService>(),
    ];
    let (registry, order) = build_graph(registrations).await;
    order.unwrap();

    // 抽象键与具体键都可解析
    assert!(registry.is_bound("TokenSigner", Scope::default()).await);
    assert!(registry.is_bound("HmacSigner", Scope::default()).await);

    let session = registry.get_component::<SessionService>().await.unwrap();
    assert_eq!(session.signer.sign("payload"), "hmac:payload");
}

#[tokio::test]
async fn test_inject_into_resolves_signature_parameters() {
    let registrations = vec![ComponentRegistration::of::<MetricsStore>()];
    let (registry, order) = build_graph(registrations).await;
    order.unwrap();

    let signature = ComponentSignature::new()
        .with_injected("metrics", "MetricsStore")
        .with_bare("page_size");
    let params = registry.inject_into(&signature).await.unwrap();

    // 裸参数被跳过，注入参数按名可取
    assert_eq!(params.len(), 1);
    assert!(params.contains("metrics"));
    assert!(params.component::<MetricsStore>("metrics").is_ok());
}
