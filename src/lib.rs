//! colcast - client-side type engine for a columnar database
//!
//! Translates between the database's textual type grammar
//! (`Array(Tuple(String, UInt64))`, `Decimal(18,4)`,
//! `Enum8('active'=1,'inactive'=2)`, ...) and in-memory application
//! values, in both directions: deserializing wire values into canonical
//! values and rendering values back into query-literal text.
//!
//! The flow is: type-string -> [`types::parse`] -> [`TypeDescriptor`] ->
//! [`Registry::resolve`] -> shared [`TypeInstance`] graph (cached) ->
//! repeated `cast` / `deserialize` / `serialize` calls driven by the
//! result container and query builder.
//!
//! ```
//! use colcast::{Registry, Value};
//!
//! let registry = Registry::new();
//! let column = registry.resolve("Array(Nullable(Int64))").unwrap();
//! let value = column
//!     .cast(Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]))
//!     .unwrap();
//! assert_eq!(column.serialize(&value).unwrap(), "[1, NULL, 3]");
//! ```

pub mod common;
pub mod registry;
pub mod types;

// Re-export common types for convenience
pub use common::{CastResult, ParseError, ParseResult, TypeCastError, TypeError, TypeResult};

// Re-export type system for convenience
pub use registry::{Builder, Registry};
pub use types::{
    parse, quote_literal, split_top_level, unquote, EnumType, TypeDescriptor, TypeInstance, Value,
};
