//! 编译选项校验

use binding_common::{ConfigError, ConfigResult, ConfigValidator, GraphOptions};
use tracing::warn;

/// 解析深度的上限，超过后递归解析可能耗尽线程栈
pub const MAX_RESOLUTION_DEPTH_LIMIT: usize = 65_536;

/// 编译选项校验器
#[derive(Debug, Clone, Default)]
pub struct GraphOptionsValidator {
    known_validators: Option<Vec<String>>,
}

impl GraphOptionsValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只允许禁用已知名称的校验器
    pub fn with_known_validators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_validators = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl ConfigValidator<GraphOptions> for GraphOptionsValidator {
    fn validate(&self, config: &GraphOptions) -> ConfigResult<()> {
        let mut errors = Vec::new();

        let depth = config.resolver.max_resolution_depth;
        if depth == 0 {
            errors.push("resolver.max_resolution_depth 必须大于 0".to_string());
        } else if depth > MAX_RESOLUTION_DEPTH_LIMIT {
            errors.push(format!(
                "resolver.max_resolution_depth 不能超过 {MAX_RESOLUTION_DEPTH_LIMIT}，当前为 {depth}"
            ));
        }

        if let Some(known) = &self.known_validators {
            for name in &config.validation.disabled_validators {
                if !known.iter().any(|k| k == name) {
                    errors.push(format!("未知的校验器: {name}"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            warn!("编译选项校验失败: {:?}", errors);
            Err(ConfigError::ValidationFailed { errors })
        }
    }

    fn name(&self) -> &'static str {
        "GraphOptionsValidator"
    }
}
