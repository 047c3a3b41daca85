//! Structural AST for parsed type-strings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed, purely structural representation of a type-string.
///
/// Produced once per distinct type-string by the parser, immutable
/// afterwards. Carries no semantics: `Decimal(18, 4)` parses to a
/// descriptor whose args are the leaf descriptors `18` and `4`, and it is
/// the corresponding builder that reinterprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name or raw argument text (e.g. `Array`, `18`, `'active' = 1`)
    pub name: String,
    /// Ordered argument descriptors; empty for scalar types
    pub args: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// Leaf descriptor with no arguments
    pub fn leaf(name: impl Into<String>) -> Self {
        TypeDescriptor {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor {
            name: name.into(),
            args,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.args.is_empty()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_leaf_display() {
        assert_eq!(TypeDescriptor::leaf("UInt64").to_string(), "UInt64");
    }

    #[test]
    fn test_nested_display() {
        let descriptor = TypeDescriptor::with_args(
            "Map",
            vec![
                TypeDescriptor::leaf("String"),
                TypeDescriptor::with_args("Array", vec![TypeDescriptor::leaf("Int32")]),
            ],
        );
        assert_eq!(descriptor.to_string(), "Map(String, Array(Int32))");
    }
}
