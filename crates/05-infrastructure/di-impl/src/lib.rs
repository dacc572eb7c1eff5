//! # 依赖注入具体实现
//!
//! 提供具体的实例注册表与依赖图构建器实现。
//!
//! 图构建与实例化在进程启动时单线程同步完成一次；
//! 启动之后注册表只读，并发解析无需加锁协调。

pub mod builder;
pub mod registry;

pub use builder::GraphBuilder;
pub use registry::InstanceRegistryImpl;
