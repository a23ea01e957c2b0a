//! 编译器构建器
//!
//! 组合编译选项（默认值、配置文件、内联 TOML、环境变量、代码中的覆盖项）、
//! 日志初始化和自定义校验插件，构建 [`GraphCompiler`]。

use crate::compiler::GraphCompiler;
use binding_common::{ConfigValidator, GraphError, GraphOptions, GraphResult, PlacementPolicy};
use binding_config::{GraphOptionsLoader, GraphOptionsValidator};
use binding_validation::{ValidationPipeline, ValidationPlugin, STANDARD_VALIDATORS};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// 编译器构建器
pub struct GraphCompilerBuilder {
    options: Option<GraphOptions>,
    config_files: Vec<PathBuf>,
    inline_toml: Vec<String>,
    use_environment: bool,
    env_source: Option<HashMap<String, String>>,
    placement_policy: Option<PlacementPolicy>,
    full_binding_graph_validation: Option<bool>,
    disabled_validators: Vec<String>,
    plugins: Vec<Arc<dyn ValidationPlugin>>,
    logging_enabled: bool,
    logging_config: LoggingConfig,
}

impl GraphCompilerBuilder {
    /// 创建使用默认选项的构建器
    pub fn new() -> Self {
        Self {
            options: None,
            config_files: Vec::new(),
            inline_toml: Vec::new(),
            use_environment: false,
            env_source: None,
            placement_policy: None,
            full_binding_graph_validation: None,
            disabled_validators: Vec::new(),
            plugins: Vec::new(),
            logging_enabled: false,
            logging_config: LoggingConfig::default(),
        }
    }

    /// 直接使用给定的选项，忽略配置来源
    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// 添加配置文件
    pub fn add_config_file(mut self, path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GraphError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }
        self.config_files.push(path.to_path_buf());
        Ok(self)
    }

    /// 添加内联 TOML 配置
    pub fn with_config_toml(mut self, content: impl Into<String>) -> Self {
        self.inline_toml.push(content.into());
        self
    }

    /// 读取 `BINDING_GRAPH_` 前缀的环境变量
    pub fn with_environment(mut self) -> Self {
        self.use_environment = true;
        self
    }

    /// 用给定的变量表代替进程环境变量
    pub fn with_env_source(mut self, variables: HashMap<String, String>) -> Self {
        self.use_environment = true;
        self.env_source = Some(variables);
        self
    }

    /// 设置子组件绑定的放置策略
    pub fn with_placement_policy(mut self, policy: PlacementPolicy) -> Self {
        self.placement_policy = Some(policy);
        self
    }

    /// 是否解析组件声明的全部键，而不只是入口点可达的键
    pub fn with_full_binding_graph_validation(mut self, enabled: bool) -> Self {
        self.full_binding_graph_validation = Some(enabled);
        self
    }

    /// 按名称禁用校验器，标准校验器和自定义插件都适用
    pub fn disable_validator(mut self, name: impl Into<String>) -> Self {
        self.disabled_validators.push(name.into());
        self
    }

    /// 追加自定义校验插件
    pub fn with_plugin(mut self, plugin: Arc<dyn ValidationPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// 启用日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_enabled = true;
        self.logging_config = config;
        self
    }

    /// 构建编译器
    pub fn build(self) -> GraphResult<GraphCompiler> {
        if self.logging_enabled {
            initialize_logging(&self.logging_config)?;
        }

        let validator = GraphOptionsValidator::new().with_known_validators(
            STANDARD_VALIDATORS
                .iter()
                .copied()
                .chain(self.plugins.iter().map(|plugin| plugin.name())),
        );

        let mut options = match &self.options {
            Some(options) => options.clone(),
            None => self.loader(validator.clone()).load()?,
        };
        if let Some(policy) = self.placement_policy {
            options.resolver.placement_policy = policy;
        }
        if let Some(enabled) = self.full_binding_graph_validation {
            options.resolver.full_binding_graph_validation = enabled;
        }
        options
            .validation
            .disabled_validators
            .extend(self.disabled_validators.iter().cloned());
        validator.validate(&options)?;

        let mut pipeline = ValidationPipeline::standard(&options.validation);
        for plugin in self.plugins {
            if options.validation.is_disabled(plugin.name()) {
                debug!("跳过被禁用的插件: {}", plugin.name());
                continue;
            }
            pipeline = pipeline.with_plugin(plugin);
        }

        info!(
            "编译器构建完成, 放置策略: {:?}, 校验器: {:?}",
            options.resolver.placement_policy,
            pipeline.plugin_names()
        );
        Ok(GraphCompiler::with_pipeline(options, pipeline))
    }

    fn loader(&self, validator: GraphOptionsValidator) -> GraphOptionsLoader {
        let mut loader = GraphOptionsLoader::new().with_validator(validator);
        for path in &self.config_files {
            loader = loader.with_file(path);
        }
        for content in &self.inline_toml {
            loader = loader.with_toml(content.clone());
        }
        match (&self.env_source, self.use_environment) {
            (Some(variables), _) => loader.with_env_source(variables.clone()),
            (None, true) => loader.with_environment(),
            (None, false) => loader,
        }
    }
}

impl Default for GraphCompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphCompilerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCompilerBuilder")
            .field("options", &self.options)
            .field("config_files", &self.config_files)
            .field("use_environment", &self.use_environment)
            .field("disabled_validators", &self.disabled_validators)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("logging_enabled", &self.logging_enabled)
            .finish_non_exhaustive()
    }
}

/// 初始化全局日志订阅者
///
/// `RUST_LOG` 存在时优先于配置中的级别。
pub fn initialize_logging(config: &LoggingConfig) -> GraphResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_thread_names(config.show_thread_names)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    let result = if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    result.map_err(|e| GraphError::BootstrapFailed {
        message: format!("日志初始化失败: {e}"),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub show_target: bool,
    pub show_thread_ids: bool,
    /// 并行解析时可以看出是哪个解析线程
    pub show_thread_names: bool,
    pub show_file: bool,
    pub show_line_number: bool,
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_thread_names: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境配置
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_thread_names: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 生产环境配置
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_thread_names: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
