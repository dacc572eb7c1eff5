//! 依赖图构建抽象接口
//!
//! 组件注册、抽象解析条目与图构建器的抽象定义

use async_trait::async_trait;
use infrastructure_common::{
    ComponentSignature, DependencyError, DependencyResult, InjectableComponent, ParamMap, TypeInfo,
};
use std::any::Any;
use std::sync::Arc;

/// 组件工厂函数类型
pub type ComponentFactoryFn = Arc<
    dyn Fn(&ParamMap) -> DependencyResult<Arc<dyn Any + Send + Sync>> + Send + Sync,
>;

/// 实例适配函数类型
///
/// 抽象解析条目用它把具体实例转换为抽象侧绑定的负载
/// （典型用法：`Arc<Concrete>` 转 `Arc<dyn Trait>`）。
pub type InstanceAdapterFn =
    Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// 组件注册信息
///
/// 携带类型信息、签名声明与工厂函数，是图构建器的输入单元。
#[derive(Clone)]
pub struct ComponentRegistration {
    /// 类型信息
    pub type_info: TypeInfo,
    /// 构造函数签名声明
    pub signature: ComponentSignature,
    /// 是否为抽象组件
    pub is_abstract: bool,
    /// 抽象解析条目
    pub resolutions: Vec<AbstractResolutionEntry>,
    /// 组件工厂
    pub factory: ComponentFactoryFn,
}

impl ComponentRegistration {
    /// 为可注入组件创建注册信息
    ///
    /// 工厂在构造完成后调用可选的构建后回调；
    /// 组件未声明该能力时仅记录告警，不视为错误。
    pub fn of<T: InjectableComponent>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            signature: T::signature(),
            is_abstract: false,
            resolutions: Vec::new(),
            factory: Arc::new(|params: &ParamMap| {
                let mut instance = T::construct(params)?;
                if T::HAS_POST_CONSTRUCT {
                    instance.post_construct();
                } else {
                    tracing::warn!(
                        "组件 {} 未声明构建后能力，跳过构建后回调",
                        std::any::type_name::<T>()
                    );
                }
                Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            }),
        }
    }

    /// 为抽象组件创建注册信息
    ///
    /// 抽象组件不能被直接实例化，它在构建时由解析条目中的具体组件替代。
    pub fn abstract_of<T: ?Sized + 'static>(resolutions: Vec<AbstractResolutionEntry>) -> Self {
        let type_info = TypeInfo::of::<T>();
        let name = type_info.name.clone();
        Self {
            type_info,
            signature: ComponentSignature::new(),
            is_abstract: true,
            resolutions,
            factory: Arc::new(move |_params: &ParamMap| {
                Err(DependencyError::creation_failed(
                    name.clone(),
                    "抽象组件不能被直接实例化",
                ))
            }),
        }
    }
}

impl std::fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("type_info", &self.type_info)
            .field("signature", &self.signature)
            .field("is_abstract", &self.is_abstract)
            .field("resolutions", &self.resolutions)
            .field("factory", &"<function>")
            .finish()
    }
}

/// 抽象解析条目
///
/// 声明在抽象组件上的"解析键 -> 具体替代组件"映射。
/// 具体组件的依赖在拓扑排序前被并入抽象组件的描述符，
/// 具体组件本身不参与直接实例化，而是在抽象所有者构建时被隐式绑定。
#[derive(Clone)]
pub struct AbstractResolutionEntry {
    /// 解析键，抽象侧绑定使用的名称
    pub resolution_key: String,
    /// 具体替代组件的注册信息
    pub concrete: Box<ComponentRegistration>,
    /// 可选的实例适配器
    pub adapter: Option<InstanceAdapterFn>,
}

impl AbstractResolutionEntry {
    /// 创建解析条目
    pub fn new(resolution_key: impl Into<String>, concrete: ComponentRegistration) -> Self {
        Self {
            resolution_key: resolution_key.into(),
            concrete: Box::new(concrete),
            adapter: None,
        }
    }

    /// 配置实例适配器
    #[must_use]
    pub fn with_adapter(mut self, adapter: InstanceAdapterFn) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

impl std::fmt::Debug for AbstractResolutionEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbstractResolutionEntry")
            .field("resolution_key", &self.resolution_key)
            .field("concrete", &self.concrete.type_info)
            .field("adapter", &self.adapter.as_ref().map(|_| "<function>"))
            .finish()
    }
}

/// 依赖图构建器 trait
///
/// 消费声明的组件注册集合，计算描述符并按依赖顺序实例化。
#[async_trait]
pub trait DependencyGraphBuilder: Send + Sync {
    /// 用根组件集合播种待解析集
    fn load_base_set(&mut self, registrations: &[ComponentRegistration]);

    /// 为尚未描述的类型计算组件描述符，并合并抽象解析依赖
    fn load_dependencies(
        &mut self,
        registrations: Vec<ComponentRegistration>,
    ) -> DependencyResult<()>;

    /// 按批次 Kahn 拓扑顺序实例化全部组件，返回实例化顺序
    ///
    /// 某轮扫描没有任何就绪节点而待解析集非空时，图存在环，
    /// 构建以循环依赖错误终止，环内组件零实例化。
    async fn build(&mut self) -> DependencyResult<Vec<String>>;
}
