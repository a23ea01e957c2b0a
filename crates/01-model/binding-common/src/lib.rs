//! # Binding Common
//!
//! 这个 crate 提供了绑定图解析各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`TypeName`] - 结构化的类型名称（名称 + 泛型参数）
//! - [`Key`] - 绑定和请求的唯一标识（类型 + 限定符 + 多重绑定贡献标识）
//! - [`Scope`] - 作用域注解
//! - [`DependencyRequest`] - 依赖请求（Key + 请求方式）
//! - [`Diagnostic`] - 面向用户的诊断信息
//! - [`GraphOptions`] - 解析与校验选项
//!
//! ## 设计原则
//!
//! - 所有标识类型不可变，可直接作为哈希键使用
//! - 诊断是可恢复的数据，错误只用于输入缺陷和内部不变量被破坏

pub mod configuration;
pub mod diagnostics;
pub mod errors;
pub mod key;
pub mod metadata;
pub mod request;
pub mod scope;
pub mod types;

pub use configuration::*;
pub use diagnostics::*;
pub use errors::*;
pub use key::*;
pub use metadata::*;
pub use request::*;
pub use scope::*;
pub use types::*;
