//! 组件作用域定义
//!
//! 注册表接受作用域标签，但本层只实际使用默认的进程级作用域，
//! 实例的生命周期即进程生命周期。

use serde::{Deserialize, Serialize};

/// 组件作用域
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// 进程级作用域 - 实例与进程同生命周期
    Process,
    /// 命名作用域 - 预留的扩展点，当前未被实际使用
    Named(String),
}

impl Default for Scope {
    fn default() -> Self {
        Self::Process
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
