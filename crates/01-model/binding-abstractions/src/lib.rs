//! # Binding Abstractions
//!
//! 绑定图的输入模型和解析结果类型。
//!
//! ## 核心类型
//!
//! - [`Declaration`] - 模块中的声明（贡献绑定、委托、多重绑定、可选绑定、子组件）
//! - [`ModuleDescriptor`] / [`ComponentDescriptor`] - 上游发现阶段交付的纯数据描述
//! - [`DeclarationModel`] - 一次编译的完整输入
//! - [`ComponentTree`] - 以某个根组件展开的组件树（arena 存储）
//! - [`Binding`] - 解析后满足某个 Key 的绑定

pub mod binding;
pub mod builder;
pub mod component;
pub mod declaration;
pub mod model;

pub use binding::*;
pub use builder::*;
pub use component::*;
pub use declaration::*;
pub use model::*;
