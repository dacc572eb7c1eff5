//! 组件基础接口定义
//!
//! 提供所有基础设施组件必须实现的基础 trait

use crate::errors::{DependencyError, DependencyResult};
use crate::metadata::TypeInfo;
use crate::signature::ComponentSignature;
use std::any::Any;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// 组件基础 trait
///
/// 所有基础设施组件都必须实现此 trait
pub trait Component: Send + Sync + Debug + 'static {
    /// 组件名称
    fn name(&self) -> &'static str;

    /// 组件优先级，数值越高优先级越高
    fn priority(&self) -> i32 {
        0
    }

    /// 组件是否启用
    fn is_enabled(&self) -> bool {
        true
    }
}

/// 已解析的构造参数集合
///
/// 参数名到已解析实例的映射，由图构建器在实例化前填充。
#[derive(Default)]
pub struct ParamMap {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ParamMap {
    /// 创建空的参数集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个已解析的参数
    pub fn insert(&mut self, name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) {
        self.values.insert(name.into(), value);
    }

    /// 按名称取出指定类型的组件实例
    pub fn component<T: Send + Sync + 'static>(&self, name: &str) -> DependencyResult<Arc<T>> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| DependencyError::unresolved(name))?;
        value
            .clone()
            .downcast::<T>()
            .map_err(|_| DependencyError::ParameterTypeMismatch {
                name: name.to_string(),
            })
    }

    /// 按名称取出以 trait 对象形式绑定的组件实例
    ///
    /// 抽象解析条目可以通过适配器把具体实例绑定为 `Arc<dyn Trait>`，
    /// 此时 Any 负载中存放的是 `Arc<T>` 本身。
    pub fn trait_component<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> DependencyResult<Arc<T>> {
        self.component::<Arc<T>>(name)
            .map(|wrapped| Arc::clone(wrapped.as_ref()))
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 是否包含指定参数
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

impl Debug for ParamMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamMap")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 可注入组件 trait
///
/// 由图构建器构造的组件必须实现此 trait，显式声明构造签名。
/// 组件以类型短名为标识（见 [`TypeInfo::of`]），
/// 参与注入的组件类型在进程内必须短名唯一。
pub trait InjectableComponent: Component + Sized {
    /// 组件是否声明了构建后回调能力
    const HAS_POST_CONSTRUCT: bool = false;

    /// 构造函数签名声明
    fn signature() -> ComponentSignature;

    /// 使用已解析的参数构造组件实例
    fn construct(params: &ParamMap) -> DependencyResult<Self>;

    /// 构建后回调，在构造完成后、绑定之前被调用
    ///
    /// 仅当 [`Self::HAS_POST_CONSTRUCT`] 为 `true` 时才会被调用。
    fn post_construct(&mut self) {}
}

/// 组件描述符
///
/// 每个声明的组件类型对应一份，在启动阶段构建一次，此后不可变。
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// 类型信息
    pub type_info: TypeInfo,
    /// 构造函数需要的依赖类型键集合
    pub dependencies: BTreeSet<String>,
    /// 构造函数参数名序列，顺序即声明顺序
    pub param_names: Vec<String>,
    /// 是否为抽象组件
    pub is_abstract: bool,
}

impl ComponentDescriptor {
    /// 校验依赖数与参数数的一致性
    ///
    /// 不变式：抽象解析条目合并完成后，依赖数必须等于参数名数。
    /// 违反属于组件声明缺陷，必须在任何实例化发生之前被拒绝。
    pub fn verify(&self) -> DependencyResult<()> {
        if self.dependencies.len() != self.param_names.len() {
            return Err(DependencyError::AmbiguousParameterBinding {
                name: self.type_info.name.clone(),
                dependencies: self.dependencies.len(),
                parameters: self.param_names.len(),
            });
        }
        Ok(())
    }
}
