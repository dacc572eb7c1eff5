//! # Infrastructure Common
//!
//! 这个 crate 提供了 Notify Platform 基础设施层的公共 traits 和工具。
//!
//! ## 核心组件
//!
//! - [`Component`] - 组件基础 trait
//! - [`InjectableComponent`] - 可注入组件 trait
//! - [`ComponentSignature`] - 构造函数签名声明
//! - [`SignatureInspector`] - 签名检查器
//! - [`Scope`] - 组件作用域
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 显式注册优于运行时反射
//! - 注册表均为构造注入的对象，不使用模块级全局状态

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod signature;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use signature::*;
