//! 阶段注册表抽象接口

use crate::stage::{Stage, StageRegistration};
use infrastructure_common::PipelineResult;

/// 阶段注册表 trait
///
/// 按 `(所有者类型名, 操作名)` 维护有序的阶段列表。
/// 注册发生在声明阶段、图构建之前；组合前注册表被冻结，
/// 此后只读，冻结后注册是错误。
pub trait StageRegistry: Send + Sync {
    /// 以指定优先级注册一个阶段
    fn register_stage(
        &self,
        owner: &str,
        operation: &str,
        stage: Stage,
        priority: f64,
    ) -> PipelineResult<()>;

    /// 以阶段种类的默认优先级注册
    fn register(&self, owner: &str, operation: &str, stage: Stage) -> PipelineResult<()> {
        let priority = stage.default_priority();
        self.register_stage(owner, operation, stage, priority)
    }

    /// 指定操作已注册的阶段，按注册顺序返回
    fn stages_for(&self, owner: &str, operation: &str) -> Vec<StageRegistration>;

    /// 指定所有者下注册了阶段的操作名列表
    fn operations_for(&self, owner: &str) -> Vec<String>;

    /// 冻结注册表
    fn freeze(&self);

    /// 注册表是否已冻结
    fn is_frozen(&self) -> bool;
}
