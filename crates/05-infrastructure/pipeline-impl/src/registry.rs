//! 阶段注册表实现

use infrastructure_common::{PipelineError, PipelineResult};
use parking_lot::RwLock;
use pipeline_abstractions::{Stage, StageRegistration, StageRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// 具体的阶段注册表实现
///
/// 写入一次后冻结：声明阶段的注册调用填充映射，
/// 组合器开始工作前由引导流程冻结，此后只读。
pub struct StageRegistryImpl {
    stages: RwLock<HashMap<(String, String), Vec<StageRegistration>>>,
    frozen: AtomicBool,
    sequence: AtomicU64,
}

impl StageRegistryImpl {
    /// 创建新的阶段注册表
    pub fn new() -> Self {
        Self {
            stages: RwLock::new(HashMap::new()),
            frozen: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
        }
    }

    /// 已注册阶段的操作总数
    pub fn operation_count(&self) -> usize {
        self.stages.read().len()
    }
}

impl Default for StageRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl StageRegistry for StageRegistryImpl {
    fn register_stage(
        &self,
        owner: &str,
        operation: &str,
        stage: Stage,
        priority: f64,
    ) -> PipelineResult<()> {
        if self.is_frozen() {
            return Err(PipelineError::RegistryFrozen {
                owner: owner.to_string(),
                operation: operation.to_string(),
            });
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        debug!(
            "注册阶段: {}.{} <- {} (优先级: {}, 序号: {})",
            owner,
            operation,
            stage.kind_name(),
            priority,
            sequence
        );

        let mut stages = self.stages.write();
        stages
            .entry((owner.to_string(), operation.to_string()))
            .or_default()
            .push(StageRegistration {
                stage,
                priority,
                sequence,
            });
        Ok(())
    }

    fn stages_for(&self, owner: &str, operation: &str) -> Vec<StageRegistration> {
        let stages = self.stages.read();
        stages
            .get(&(owner.to_string(), operation.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn operations_for(&self, owner: &str) -> Vec<String> {
        let stages = self.stages.read();
        let mut operations: Vec<String> = stages
            .keys()
            .filter(|(stage_owner, _)| stage_owner == owner)
            .map(|(_, operation)| operation.clone())
            .collect();
        operations.sort();
        operations
    }

    fn freeze(&self) {
        debug!("阶段注册表已冻结");
        self.frozen.store(true, Ordering::SeqCst);
    }

    fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }
}
