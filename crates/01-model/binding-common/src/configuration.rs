//! 解析与校验选项

use crate::diagnostics::Severity;
use crate::errors::ConfigResult;
use serde::{Deserialize, Serialize};

/// 默认的最大解析深度
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 1024;

/// 绑定可以放在多个祖先组件时的选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// 放在发出请求的最低组件
    #[default]
    Lowest,
    /// 放在依赖允许的最高组件
    Highest,
}

/// 可配置校验项的级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Error,
    Warning,
    Off,
}

impl ValidationLevel {
    /// 对应的诊断级别，`Off` 表示不报告
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Error => Some(Severity::Error),
            Self::Warning => Some(Severity::Warning),
            Self::Off => None,
        }
    }
}

/// 解析器选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub placement_policy: PlacementPolicy,
    /// 解析每个组件声明的全部 Key，而不只是入口点可达的 Key
    pub full_binding_graph_validation: bool,
    /// 并行解析相互独立的根组件
    pub parallel_roots: bool,
    pub max_resolution_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            placement_policy: PlacementPolicy::Lowest,
            full_binding_graph_validation: false,
            parallel_roots: true,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

/// 校验选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub nullable_validation: ValidationLevel,
    pub explicit_binding_conflicts_with_inject: ValidationLevel,
    pub scope_cycle_validation: ValidationLevel,
    /// 在同一个绑定图上并行运行校验器
    pub parallel_validation: bool,
    /// 按名称禁用的校验器
    pub disabled_validators: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            nullable_validation: ValidationLevel::Error,
            explicit_binding_conflicts_with_inject: ValidationLevel::Warning,
            scope_cycle_validation: ValidationLevel::Error,
            parallel_validation: true,
            disabled_validators: Vec::new(),
        }
    }
}

impl ValidationOptions {
    pub fn is_disabled(&self, validator: &str) -> bool {
        self.disabled_validators.iter().any(|name| name == validator)
    }
}

/// 完整的编译选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub resolver: ResolverOptions,
    pub validation: ValidationOptions,
}

/// 配置验证器 trait
pub trait ConfigValidator<T>: Send + Sync {
    /// 验证配置
    fn validate(&self, config: &T) -> ConfigResult<()>;

    /// 获取验证器名称
    fn name(&self) -> &'static str;
}
