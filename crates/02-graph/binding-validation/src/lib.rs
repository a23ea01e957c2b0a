//! # Binding Validation
//!
//! 对解析完成的绑定图运行校验器，收集诊断。
//!
//! 校验器之间互不通信，可以以任意顺序并行运行在同一个只读绑定图上。
//!
//! ## 核心组件
//!
//! - [`ValidationPlugin`] - 校验器 trait
//! - [`DiagnosticReporter`] - 线程安全的诊断收集器
//! - [`ValidationPipeline`] - 按配置组装并运行校验器
//! - [`ValidationReport`] - 排序后的诊断结果

pub mod pipeline;
pub mod plugin;
pub mod report;
pub mod validators;

#[cfg(test)]
mod tests;

pub use pipeline::*;
pub use plugin::*;
pub use report::*;
pub use validators::*;
