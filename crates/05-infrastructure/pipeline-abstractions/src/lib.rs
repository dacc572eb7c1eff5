//! # 请求管道抽象接口
//!
//! 提供横切关注点（权限、守卫、管道、处理器）挂接到目标操作的核心抽象。
//!
//! ## 核心组件
//!
//! - [`Invocation`] - 调用参数模型
//! - [`Permission`] / [`Guard`] / [`Pipe`] / [`Handler`] - 四种能力对象
//! - [`StageRegistry`] - 阶段注册表
//! - [`OperationFn`] / [`OperationProvider`] - 操作类型
//!
//! 能力对象在并发调用间共享，必须无状态或只持有不可变配置；
//! 任何按调用的状态都放在调用的参数或结果上，绝不放在阶段对象上。

pub mod invocation;
pub mod operation;
pub mod registry;
pub mod stage;

pub use invocation::*;
pub use operation::*;
pub use registry::*;
pub use stage::*;
