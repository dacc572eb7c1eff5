//! # 依赖注入抽象接口
//!
//! 提供实例注册表与依赖图构建器的核心抽象。
//!
//! 注册表和图构建器都是显式创建、按引用传递的对象，
//! 启动阶段写入一次后冻结，之后只读（见 `infrastructure-composition`）。

pub mod container;
pub mod graph;

pub use container::*;
pub use graph::*;
