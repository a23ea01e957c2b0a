//! # Binding Graph
//!
//! 绑定图的构建：声明索引、解析器和拓扑工具。
//!
//! ## 核心组件
//!
//! - [`ComponentDeclarations`] - 单个组件的声明索引
//! - [`DeclarationsCache`] - 多个根组件并行解析时共享的声明索引缓存
//! - [`GraphResolver`] / [`DefaultGraphResolver`] - 把组件树解析为绑定图
//! - [`BindingGraph`] - 解析结果
//! - [`DependencyNetwork`] - 强连通分量、可达性、拓扑排序

pub mod declarations;
pub mod graph;
pub mod resolver;
pub mod topology;

#[cfg(test)]
mod tests;

pub use declarations::*;
pub use graph::*;
pub use resolver::*;
pub use topology::*;
