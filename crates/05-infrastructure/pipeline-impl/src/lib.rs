//! # 请求管道具体实现
//!
//! 提供具体的阶段注册表与管道组合器实现。
//!
//! 阶段注册与管道组合在进程启动时单线程同步完成一次；
//! 组合后的操作可以被并发调用。

pub mod composer;
pub mod registry;

pub use composer::PipelineComposer;
pub use registry::StageRegistryImpl;
