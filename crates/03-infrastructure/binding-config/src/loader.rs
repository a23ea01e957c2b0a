//! 编译选项加载器

use crate::validation::GraphOptionsValidator;
use binding_common::{ConfigError, ConfigResult, ConfigValidator, GraphOptions};
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "BINDING_GRAPH";

/// 环境变量中层级之间的分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 编译选项加载器
#[derive(Debug, Clone)]
pub struct GraphOptionsLoader {
    files: Vec<PathBuf>,
    inline: Vec<String>,
    use_environment: bool,
    env_source: Option<HashMap<String, String>>,
    validator: GraphOptionsValidator,
}

impl GraphOptionsLoader {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            inline: Vec::new(),
            use_environment: false,
            env_source: None,
            validator: GraphOptionsValidator::new(),
        }
    }

    /// 添加配置文件，格式由扩展名决定（toml / json / yaml）
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// 添加内联 TOML
    pub fn with_toml(mut self, content: impl Into<String>) -> Self {
        self.inline.push(content.into());
        self
    }

    /// 读取进程环境变量中的覆盖项
    pub fn with_environment(mut self) -> Self {
        self.use_environment = true;
        self
    }

    /// 使用给定的变量表代替进程环境变量
    pub fn with_env_source(mut self, variables: HashMap<String, String>) -> Self {
        self.use_environment = true;
        self.env_source = Some(variables);
        self
    }

    /// 使用指定的校验器
    pub fn with_validator(mut self, validator: GraphOptionsValidator) -> Self {
        self.validator = validator;
        self
    }

    /// 合并全部来源并校验
    pub fn load(&self) -> ConfigResult<GraphOptions> {
        let mut builder = Config::builder();

        for path in &self.files {
            if !path.exists() {
                error!("配置文件不存在: {}", path.display());
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            let format = file_format(path)?;
            debug!("添加配置文件: {}", path.display());
            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        for content in &self.inline {
            builder = builder.add_source(File::from_str(content, FileFormat::Toml));
        }

        if self.use_environment {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("validation.disabled_validators")
                    .source(self.env_source.clone()),
            );
        }

        let settings = builder.build().map_err(|e| {
            error!("配置构建失败: {}", e);
            ConfigError::parse_error(e)
        })?;
        let options: GraphOptions = settings.try_deserialize().map_err(|e| {
            error!("配置绑定失败: {}", e);
            ConfigError::parse_error(e)
        })?;

        self.validator.validate(&options)?;
        info!(
            "编译选项加载完成, 放置策略: {:?}, 完整绑定图: {}, 禁用校验器: {:?}",
            options.resolver.placement_policy,
            options.resolver.full_binding_graph_validation,
            options.validation.disabled_validators
        );
        Ok(options)
    }
}

impl Default for GraphOptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn file_format(path: &Path) -> ConfigResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(FileFormat::Toml),
        Some("json") => Ok(FileFormat::Json),
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        _ => Err(ConfigError::validation_error(format!(
            "无法识别的配置文件格式: {}",
            path.display()
        ))),
    }
}

/// 解析 TOML 文本，不经过其他来源
pub fn options_from_toml_str(content: &str) -> ConfigResult<GraphOptions> {
    let options: GraphOptions = toml::from_str(content).map_err(ConfigError::parse_error)?;
    GraphOptionsValidator::new().validate(&options)?;
    Ok(options)
}

/// 读取单个配置文件
pub fn options_from_file(path: impl AsRef<Path>) -> ConfigResult<GraphOptions> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    debug!("读取配置文件: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let options: GraphOptions = match file_format(path)? {
        FileFormat::Json => serde_json::from_str(&content)?,
        FileFormat::Toml => toml::from_str(&content).map_err(ConfigError::parse_error)?,
        _ => {
            return GraphOptionsLoader::new().with_file(path).load();
        }
    };
    GraphOptionsValidator::new().validate(&options)?;
    Ok(options)
}

/// 选项渲染为 TOML，便于写出默认配置
pub fn options_to_toml(options: &GraphOptions) -> ConfigResult<String> {
    toml::to_string_pretty(options).map_err(ConfigError::parse_error)
}
