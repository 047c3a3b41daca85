//! Error types for the type engine

use thiserror::Error;

/// The type-string (or a composite literal) is structurally malformed.
///
/// Parse errors are never worth retrying: parsing the same malformed
/// string again cannot succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("parse error at position {position} in '{input}': {message}")]
pub struct ParseError {
    /// Byte offset of the offending character in `input`
    pub position: usize,
    /// The full string that failed to parse
    pub input: String,
    /// Human-readable description of what went wrong
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, input: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError {
            position,
            input: input.into(),
            message: message.into(),
        }
    }
}

/// A value cannot be represented in the target type.
///
/// Raised for range overflow, unknown enum tokens/codes, malformed literal
/// text and shape mismatches. The engine never silently coerces
/// out-of-contract data; the only documented lossy behaviors are
/// FixedString padding/truncation and Enum auto-increment code assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {from_type} value '{value}' to {to_type}")]
pub struct TypeCastError {
    /// Description of the input value's type or shape
    pub from_type: String,
    /// Canonical name of the target type
    pub to_type: String,
    /// Rendering of the offending value
    pub value: String,
}

impl TypeCastError {
    pub fn new(
        from_type: impl Into<String>,
        to_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        TypeCastError {
            from_type: from_type.into(),
            to_type: to_type.into(),
            value: value.into(),
        }
    }
}

/// Umbrella error for callers that funnel both kinds through one channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Cast(#[from] TypeCastError),
}

/// Result alias for parse-side operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result alias for conversion-side operations
pub type CastResult<T> = std::result::Result<T, TypeCastError>;

/// Result alias for callers using the umbrella error
pub type TypeResult<T> = std::result::Result<T, TypeError>;
