//! Canonical in-memory values produced and consumed by the type engine

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::common::error::{CastResult, TypeCastError};

/// A single application-level value with normalized representation.
///
/// `cast` and `deserialize` produce values in this shape; `serialize`
/// renders them back into query-literal text. Integers are widened to
/// `i128`/`u128` so every supported column width shares one variant; the
/// resolved type instance, not the value, carries the width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value (renders as the literal `NULL`)
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer, any width up to 128 bits
    Int(i128),
    /// Unsigned integer, any width up to 128 bits
    UInt(u128),
    /// Floating point value
    Float(f64),
    /// String value (also the normalized form of enum members)
    String(String),
    /// Fixed-point decimal kept as normalized digit text, exact up to 76
    /// significant digits
    Decimal {
        /// `-?digits[.digits]` with exactly `scale` fractional digits
        digits: String,
        precision: u8,
        scale: u8,
    },
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp with `precision` sub-second digits
    DateTime {
        value: NaiveDateTime,
        precision: u8,
    },
    /// UUID, canonical lowercase hyphenated on output
    Uuid(Uuid),
    /// Ordered collection
    Array(Vec<Value>),
    /// Fixed-arity heterogeneous collection, order significant
    Tuple(Vec<Value>),
    /// Key/value pairs, insertion order kept
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short label of this value's shape, used in cast error reports
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::UInt(_) => "UnsignedInteger",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Decimal { .. } => "Decimal",
            Value::Date(_) => "Date",
            Value::DateTime { .. } => "DateTime",
            Value::Uuid(_) => "UUID",
            Value::Array(_) => "Array",
            Value::Tuple(_) => "Tuple",
            Value::Map(_) => "Map",
        }
    }

    /// Try to extract an i64 value
    pub fn try_as_i64(&self) -> CastResult<i64> {
        match self {
            Value::Int(value) => i64::try_from(*value)
                .map_err(|_| TypeCastError::new(self.type_label(), "Int64", self.to_string())),
            Value::UInt(value) => i64::try_from(*value)
                .map_err(|_| TypeCastError::new(self.type_label(), "Int64", self.to_string())),
            Value::Bool(value) => Ok(*value as i64),
            _ => Err(TypeCastError::new(
                self.type_label(),
                "Int64",
                self.to_string(),
            )),
        }
    }

    /// Try to extract an f64 value
    pub fn try_as_f64(&self) -> CastResult<f64> {
        match self {
            Value::Float(value) => Ok(*value),
            Value::Int(value) => Ok(*value as f64),
            Value::UInt(value) => Ok(*value as f64),
            _ => Err(TypeCastError::new(
                self.type_label(),
                "Float64",
                self.to_string(),
            )),
        }
    }

    /// Try to extract a string slice
    pub fn try_as_str(&self) -> CastResult<&str> {
        match self {
            Value::String(value) => Ok(value),
            _ => Err(TypeCastError::new(
                self.type_label(),
                "String",
                self.to_string(),
            )),
        }
    }

    /// Try to extract the elements of an array value
    pub fn try_as_array(&self) -> CastResult<&[Value]> {
        match self {
            Value::Array(values) => Ok(values),
            _ => Err(TypeCastError::new(
                self.type_label(),
                "Array",
                self.to_string(),
            )),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i128)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value as i128)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value as u128)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl fmt::Display for Value {
    /// Plain (unquoted) rendering, used in error reports and map keys;
    /// SQL-literal rendering lives in `TypeInstance::serialize`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::UInt(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Decimal { digits, .. } => write!(f, "{}", digits),
            Value::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Value::DateTime { value, precision } => {
                if *precision == 0 {
                    write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S"))
                } else {
                    let rendered = value.format("%Y-%m-%d %H:%M:%S%.9f").to_string();
                    let keep = rendered.len() - 9 + *precision as usize;
                    write!(f, "{}", &rendered[..keep])
                }
            }
            Value::Uuid(value) => write!(f, "{}", value),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Tuple(values) => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            Value::Map(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_try_as_accessors() {
        assert_eq!(Value::Int(42).try_as_i64().unwrap(), 42);
        assert_eq!(Value::UInt(7).try_as_i64().unwrap(), 7);
        assert!(Value::String("x".into()).try_as_i64().is_err());
        assert_eq!(Value::Float(1.5).try_as_f64().unwrap(), 1.5);
        assert_eq!(Value::from("hi").try_as_str().unwrap(), "hi");
    }

    #[test]
    fn test_i64_overflow_detected() {
        assert!(Value::Int(i128::from(i64::MAX) + 1).try_as_i64().is_err());
        assert!(Value::UInt(u128::MAX).try_as_i64().is_err());
    }

    #[test]
    fn test_display_composites() {
        let value = Value::Map(vec![(
            Value::from("a"),
            Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]),
        )]);
        assert_eq!(value.to_string(), "{a: [1, NULL, 3]}");
    }

    #[test]
    fn test_display_datetime_precision() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 0, 250_000)
            .unwrap();
        let value = Value::DateTime {
            value: ts,
            precision: 3,
        };
        assert_eq!(value.to_string(), "2024-05-01 12:30:00.250");
    }
}
