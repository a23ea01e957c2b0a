//! # Binding Config
//!
//! 编译选项的加载与校验。
//!
//! 选项来源按优先级从低到高依次为：默认值、配置文件、内联 TOML、环境变量。
//! 环境变量使用 `BINDING_GRAPH_` 前缀，层级之间用 `__` 分隔，例如
//! `BINDING_GRAPH_RESOLVER__PLACEMENT_POLICY=highest`。

pub mod loader;
pub mod validation;

#[cfg(test)]
mod tests;

pub use loader::*;
pub use validation::*;
