//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("检测到循环依赖，剩余待解析组件: {pending:?}")]
    CircularDependency { pending: Vec<String> },

    #[error("依赖未解析: {name}")]
    UnresolvedDependency { name: String },

    #[error("重复绑定: {name} (作用域: {scope})")]
    DuplicateBinding { name: String, scope: String },

    #[error("参数绑定不明确: {name}, 依赖数 {dependencies} 与参数数 {parameters} 不一致")]
    AmbiguousParameterBinding {
        name: String,
        dependencies: usize,
        parameters: usize,
    },

    #[error("多个参数解析到同一依赖: {name}, 依赖: {dependency}")]
    MultipleParameterSameDependency { name: String, dependency: String },

    #[error("参数类型不匹配: {name}")]
    ParameterTypeMismatch { name: String },

    #[error("组件未声明: {name}")]
    ComponentNotDeclared { name: String },

    #[error("组件创建失败: {name}, 原因: {message}")]
    ComponentCreationFailed { name: String, message: String },
}

impl DependencyError {
    /// 创建依赖未解析错误
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedDependency { name: name.into() }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ComponentCreationFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// 管道错误类型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("守卫拒绝调用: {reason}")]
    RejectedByGuard { reason: String },

    #[error("权限校验拒绝调用: {reason}")]
    RejectedByPermission { reason: String },

    #[error("管道处理失败: {message}")]
    PipeFailed { message: String },

    #[error("所有处理器均未处理调用: {owner}.{operation}")]
    UnhandledCall { owner: String, operation: String },

    #[error("未知操作: {owner}.{operation}")]
    UnknownOperation { owner: String, operation: String },

    #[error("阶段注册表已冻结，无法注册: {owner}.{operation}")]
    RegistryFrozen { owner: String, operation: String },

    #[error("操作执行失败: {message}")]
    OperationFailed { message: String },
}

impl PipelineError {
    /// 创建管道处理失败错误
    pub fn pipe_failed(message: impl Into<String>) -> Self {
        Self::PipeFailed {
            message: message.into(),
        }
    }

    /// 创建操作执行失败错误
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("管道错误: {source}")]
    PipelineError {
        #[from]
        source: PipelineError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
