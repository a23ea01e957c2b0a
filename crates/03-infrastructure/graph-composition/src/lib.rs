//! # Graph Composition
//!
//! 组合层：把声明模型编译为经过校验的绑定图。
//!
//! ```no_run
//! use binding_abstractions::DeclarationModel;
//! use graph_composition::{GraphCompilerBuilder, LoggingConfig};
//!
//! # fn main() -> binding_common::GraphResult<()> {
//! let compiler = GraphCompilerBuilder::new()
//!     .with_environment()
//!     .with_logging(LoggingConfig::development())
//!     .build()?;
//! let result = compiler.compile(&DeclarationModel::new())?;
//! for diagnostic in result.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod compiler;
pub mod result;


pub use builder::*;
pub use compiler::*;
pub use result::*;
