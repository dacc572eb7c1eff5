//! 调用参数模型
//!
//! 位置参数加命名参数的组合，是组合后操作的统一入参。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 一次操作调用的参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// 位置参数
    pub args: Vec<Value>,
    /// 命名参数
    pub kwargs: BTreeMap<String, Value>,
}

impl Invocation {
    /// 创建空调用
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个位置参数
    #[must_use]
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// 追加一个命名参数
    #[must_use]
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// 读取命名参数
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    /// 写入命名参数
    pub fn set_kwarg(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.kwargs.insert(name.into(), value.into());
    }
}
