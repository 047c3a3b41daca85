//! Type system module
//!
//! Core pieces of the engine:
//! - TypeDescriptor: structural AST parsed from a type-string
//! - parser: the type-string grammar
//! - split: quote/bracket-aware literal decomposition
//! - Value: canonical in-memory values
//! - TypeInstance: resolved types implementing cast/deserialize/serialize

pub mod descriptor;
pub mod instance;
pub mod parser;
pub mod split;
pub mod value;

mod composite;
mod decimal;
pub mod enumeration;
mod scalar;
mod temporal;

// Re-export main types for convenience
pub use descriptor::TypeDescriptor;
pub use enumeration::EnumType;
pub use instance::TypeInstance;
pub use parser::parse;
pub use split::{quote_literal, split_top_level, unquote};
pub use value::Value;
