//! 构造函数签名声明与检查
//!
//! Rust 没有运行时的签名反射，组件通过 [`ComponentSignature`] 显式声明
//! 构造参数。[`SignatureInspector`] 从声明中提取依赖集合与参数名序列。

use crate::errors::{DependencyError, DependencyResult};
use std::collections::BTreeSet;

/// 构造函数参数声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// 参数名称
    pub name: String,
    /// 依赖的组件类型键；`None` 表示不参与注入的普通参数
    pub type_key: Option<String>,
}

impl Parameter {
    /// 声明一个注入参数
    pub fn injected(name: impl Into<String>, type_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_key: Some(type_key.into()),
        }
    }

    /// 声明一个不注入的普通参数（由组件自行提供默认值或配置值）
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_key: None,
        }
    }
}

/// 构造函数签名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSignature {
    parameters: Vec<Parameter>,
}

impl ComponentSignature {
    /// 创建空签名
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加注入参数
    #[must_use]
    pub fn with_injected(mut self, name: impl Into<String>, type_key: impl Into<String>) -> Self {
        self.parameters.push(Parameter::injected(name, type_key));
        self
    }

    /// 追加普通参数
    #[must_use]
    pub fn with_bare(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::bare(name));
        self
    }

    /// 所有参数声明
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// 签名检查器
///
/// 纯函数，没有副作用：对任意签名返回 `(依赖集合, 参数名序列)`。
/// 未标注类型键的参数被静默跳过，这是刻意的宽松策略，
/// 允许配置类参数绕过注入。
#[derive(Debug, Default)]
pub struct SignatureInspector;

impl SignatureInspector {
    /// 提取签名中的依赖集合与参数名序列
    ///
    /// 两个参数解析到同一依赖类型是组件声明错误，
    /// 在这里被及早拒绝，而不是等到首次实例化。
    pub fn inspect(
        owner: &str,
        signature: &ComponentSignature,
    ) -> DependencyResult<(BTreeSet<String>, Vec<String>)> {
        let mut dependencies = BTreeSet::new();
        let mut param_names = Vec::new();

        for parameter in signature.parameters() {
            let Some(type_key) = &parameter.type_key else {
                continue;
            };
            if !dependencies.insert(type_key.clone()) {
                return Err(DependencyError::MultipleParameterSameDependency {
                    name: owner.to_string(),
                    dependency: type_key.clone(),
                });
            }
            param_names.push(parameter.name.clone());
        }

        Ok((dependencies, param_names))
    }
}
