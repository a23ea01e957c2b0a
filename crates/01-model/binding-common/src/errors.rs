//! 错误类型定义
//!
//! 面向用户的绑定问题以 [`crate::Diagnostic`] 形式收集，不会出现在这里。
//! 这里只定义输入缺陷、内部不变量破坏和配置失败。

use crate::key::Key;
use thiserror::Error;

/// 声明模型错误（上游发现阶段产生了结构不完整的输入）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("类型名称格式错误: {input}, 原因: {reason}")]
    MalformedType { input: String, reason: String },

    #[error("声明格式错误: {key} (组件 {component}), 原因: {reason}; 依赖链: [{}]", .chain.join(" -> "))]
    MalformedDeclaration {
        key: Key,
        component: String,
        reason: String,
        chain: Vec<String>,
    },

    #[error("模块未定义: {module} (组件 {component})")]
    UnknownModule { module: String, component: String },

    #[error("模块重复定义: {module}")]
    DuplicateModule { module: String },

    #[error("组件未定义: {component}")]
    UnknownComponent { component: String },

    #[error("组件重复定义: {component}")]
    DuplicateComponent { component: String },

    #[error("组件树无效: {component}, 原因: {reason}")]
    InvalidComponentTree { component: String, reason: String },

    #[error("注入绑定无效: {key}, 原因: {reason}")]
    InvalidInjectionBinding { key: Key, reason: String },

    #[error("声明模型解析失败: {message}")]
    Deserialization { message: String },
}

impl ModelError {
    /// 创建声明格式错误
    pub fn malformed_declaration(
        key: Key,
        component: impl Into<String>,
        reason: impl Into<String>,
        chain: Vec<String>,
    ) -> Self {
        Self::MalformedDeclaration {
            key,
            component: component.into(),
            reason: reason.into(),
            chain,
        }
    }

    /// 创建组件树错误
    pub fn invalid_tree(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidComponentTree {
            component: component.into(),
            reason: reason.into(),
        }
    }
}

/// 内部不变量被破坏，属于解析器自身缺陷
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("记忆化结果不一致: {key} (组件 {component}), 原因: {message}")]
    MemoInconsistency {
        key: Key,
        component: String,
        message: String,
    },

    #[error("解析深度超过上限 {limit}: {key} (组件 {component}); 依赖链: [{}]", .chain.join(" -> "))]
    ResolutionDepthExceeded {
        key: Key,
        component: String,
        limit: usize,
        chain: Vec<String>,
    },

    #[error("拓扑计算失败: {message}")]
    Topology { message: String },
}

impl InternalError {
    /// 创建记忆化不一致错误
    pub fn memo_inconsistency(
        key: Key,
        component: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MemoInconsistency {
            key,
            component: component.into(),
            message: message.into(),
        }
    }

    /// 创建拓扑错误
    pub fn topology(message: impl Into<String>) -> Self {
        Self::Topology {
            message: message.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置验证失败: {errors:?}")]
    ValidationFailed { errors: Vec<String> },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 绑定图编译的统一错误类型
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("声明模型错误: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("内部错误: {source}")]
    Internal {
        #[from]
        source: InternalError,
    },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("启动失败: {message}")]
    BootstrapFailed { message: String },
}

impl GraphError {
    /// 是否为输入缺陷
    pub fn is_model_error(&self) -> bool {
        matches!(self, Self::Model { .. })
    }

    /// 是否为内部缺陷
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// 声明模型结果类型
pub type ModelResult<T> = Result<T, ModelError>;

/// 内部操作结果类型
pub type InternalResult<T> = Result<T, InternalError>;

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 绑定图编译结果类型
pub type GraphResult<T> = Result<T, GraphError>;
