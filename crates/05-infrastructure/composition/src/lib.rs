//! # 基础设施组合根
//!
//! 把依赖注入容器与请求管道装配为一个可用的基础设施实例。
//!
//! 启动流程固定为：绑定外部实例 -> 装载组件声明 -> 拓扑构建依赖图 ->
//! 冻结阶段注册表 -> 组合各操作的管道 -> 返回只读的基础设施句柄。

pub mod builder;
pub mod infrastructure;
pub mod operations;

pub use builder::InfrastructureBuilder;
pub use infrastructure::NotifyInfrastructure;
pub use operations::OperationTable;
