//! Resolved, semantic type objects
//!
//! A `TypeInstance` is what a type-string resolves to: a closed sum type
//! over every supported variant, with composite variants holding fully
//! resolved children. Exhaustive matching means a new variant cannot be
//! added without every conversion path being handled.

use std::sync::Arc;

use crate::common::error::{CastResult, TypeCastError};
use crate::types::composite;
use crate::types::decimal;
use crate::types::enumeration::EnumType;
use crate::types::scalar;
use crate::types::split::quote_literal;
use crate::types::temporal;
use crate::types::value::Value;

/// A resolved type, capable of `cast`, `deserialize` and `serialize`.
///
/// Instances are immutable once constructed and shared via `Arc` through
/// the registry cache, so concurrent readers need no locking.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeInstance {
    /// Fixed-width integer: 8/16/32/64/128/256 bits, signed or unsigned
    Int { bits: u16, signed: bool },
    /// IEEE float: 32 or 64 bits
    Float { bits: u16 },
    Bool,
    /// Variable-length string, or fixed-width when `fixed_length` is set
    String { fixed_length: Option<usize> },
    /// Fixed-point decimal; `1 <= precision <= 76`, `scale <= precision`
    Decimal { precision: u8, scale: u8 },
    /// Calendar date; `extended` is the wide (Date32) form
    Date { extended: bool },
    /// Timestamp; `precision` sub-second digits for the 64-bit form
    DateTime {
        precision: Option<u8>,
        timezone: Option<String>,
    },
    Uuid,
    Enum(EnumType),
    Array(Arc<TypeInstance>),
    Map(Arc<TypeInstance>, Arc<TypeInstance>),
    Tuple(Vec<Arc<TypeInstance>>),
    Nullable(Arc<TypeInstance>),
    LowCardinality(Arc<TypeInstance>),
    /// Fallback for type names this build does not know; conversions pass
    /// values through without structured validation
    Passthrough { name: String },
}

impl TypeInstance {
    /// Validate a decimal precision/scale combination.
    ///
    /// Violations fail here, at construction, never at cast time.
    pub fn decimal(precision: u8, scale: u8) -> Result<TypeInstance, String> {
        if precision == 0 || precision > 76 {
            return Err(format!(
                "decimal precision must be between 1 and 76, got {}",
                precision
            ));
        }
        if scale > precision {
            return Err(format!(
                "decimal scale ({}) cannot exceed precision ({})",
                scale, precision
            ));
        }
        Ok(TypeInstance::Decimal { precision, scale })
    }

    /// Validate an integer width.
    pub fn int(bits: u16, signed: bool) -> Result<TypeInstance, String> {
        match bits {
            8 | 16 | 32 | 64 | 128 | 256 => Ok(TypeInstance::Int { bits, signed }),
            _ => Err(format!("unsupported integer width {}", bits)),
        }
    }

    /// The fixed-width storage class backing a decimal of this precision.
    pub fn decimal_storage_bits(precision: u8) -> u16 {
        match precision {
            1..=9 => 32,
            10..=18 => 64,
            19..=38 => 128,
            _ => 256,
        }
    }

    /// Canonical type-string for this instance (inverse of resolution up
    /// to canonical spelling).
    pub fn type_name(&self) -> String {
        match self {
            TypeInstance::Int { bits, signed } => {
                if *signed {
                    format!("Int{}", bits)
                } else {
                    format!("UInt{}", bits)
                }
            }
            TypeInstance::Float { bits } => format!("Float{}", bits),
            TypeInstance::Bool => "Bool".to_string(),
            TypeInstance::String { fixed_length: None } => "String".to_string(),
            TypeInstance::String {
                fixed_length: Some(length),
            } => format!("FixedString({})", length),
            TypeInstance::Decimal { precision, scale } => {
                format!("Decimal({}, {})", precision, scale)
            }
            TypeInstance::Date { extended: false } => "Date".to_string(),
            TypeInstance::Date { extended: true } => "Date32".to_string(),
            TypeInstance::DateTime {
                precision: None,
                timezone: None,
            } => "DateTime".to_string(),
            TypeInstance::DateTime {
                precision: None,
                timezone: Some(tz),
            } => format!("DateTime({})", quote_literal(tz)),
            TypeInstance::DateTime {
                precision: Some(p),
                timezone: None,
            } => format!("DateTime64({})", p),
            TypeInstance::DateTime {
                precision: Some(p),
                timezone: Some(tz),
            } => format!("DateTime64({}, {})", p, quote_literal(tz)),
            TypeInstance::Uuid => "UUID".to_string(),
            TypeInstance::Enum(spec) => spec.type_name(),
            TypeInstance::Array(element) => format!("Array({})", element.type_name()),
            TypeInstance::Map(key, value) => {
                format!("Map({}, {})", key.type_name(), value.type_name())
            }
            TypeInstance::Tuple(elements) => {
                let inner: Vec<String> = elements.iter().map(|e| e.type_name()).collect();
                format!("Tuple({})", inner.join(", "))
            }
            TypeInstance::Nullable(element) => format!("Nullable({})", element.type_name()),
            TypeInstance::LowCardinality(element) => {
                format!("LowCardinality({})", element.type_name())
            }
            TypeInstance::Passthrough { name } => name.clone(),
        }
    }

    /// Per-variant zero value, used by result containers for absent
    /// columns.
    pub fn default_value(&self) -> Value {
        match self {
            TypeInstance::Int { signed: true, .. } => Value::Int(0),
            TypeInstance::Int { signed: false, .. } => Value::UInt(0),
            TypeInstance::Float { .. } => Value::Float(0.0),
            TypeInstance::Bool => Value::Bool(false),
            TypeInstance::String { .. } => Value::String(String::new()),
            TypeInstance::Decimal { precision, scale } => {
                decimal::zero_value(*precision, *scale)
            }
            TypeInstance::Date { .. } => Value::Date(temporal::epoch_date()),
            TypeInstance::DateTime { precision, .. } => Value::DateTime {
                value: chrono::NaiveDateTime::default(),
                precision: precision.unwrap_or(0),
            },
            TypeInstance::Uuid => Value::Uuid(uuid::Uuid::nil()),
            TypeInstance::Enum(spec) => spec.default_value(),
            TypeInstance::Array(_) => Value::Array(Vec::new()),
            TypeInstance::Map(_, _) => Value::Map(Vec::new()),
            TypeInstance::Tuple(elements) => {
                Value::Tuple(elements.iter().map(|e| e.default_value()).collect())
            }
            TypeInstance::Nullable(_) => Value::Null,
            TypeInstance::LowCardinality(element) => element.default_value(),
            TypeInstance::Passthrough { .. } => Value::Null,
        }
    }

    /// Convert an application-level value into this type's canonical
    /// representation. Accepts any reasonably-convertible input (numeric
    /// strings for integer columns, literal text for composites) and
    /// fails with a `TypeCastError` when the value cannot be represented.
    pub fn cast(&self, value: Value) -> CastResult<Value> {
        match self {
            TypeInstance::Nullable(element) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    element.cast(value)
                }
            }
            TypeInstance::LowCardinality(element) => element.cast(value),
            TypeInstance::Passthrough { .. } => Ok(value),
            _ if value.is_null() => Err(self.cast_error(&value)),
            TypeInstance::Int { bits, signed } => scalar::cast_int(*bits, *signed, value, self),
            TypeInstance::Float { bits } => scalar::cast_float(*bits, value, self),
            TypeInstance::Bool => scalar::cast_bool(value, self),
            TypeInstance::String { fixed_length } => {
                scalar::cast_string(*fixed_length, value, self)
            }
            TypeInstance::Decimal { precision, scale } => {
                decimal::cast(*precision, *scale, value, self)
            }
            TypeInstance::Date { .. } => temporal::cast_date(value, self),
            TypeInstance::DateTime { precision, .. } => {
                temporal::cast_datetime(precision.unwrap_or(0), value, self)
            }
            TypeInstance::Uuid => scalar::cast_uuid(value, self),
            TypeInstance::Enum(spec) => spec.cast(value, self),
            TypeInstance::Array(element) => composite::cast_array(element, value, self),
            TypeInstance::Map(key, val) => composite::cast_map(key, val, value, self),
            TypeInstance::Tuple(elements) => composite::cast_tuple(elements, value, self),
        }
    }

    /// Convert a decoded wire value (JSON shape from the transport) into
    /// the canonical representation. More permissive than `cast` in that
    /// the wire data is assumed well-formed by the server, but shape
    /// mismatches still fail.
    pub fn deserialize(&self, wire: &serde_json::Value) -> CastResult<Value> {
        match self {
            TypeInstance::Nullable(element) => {
                if wire.is_null() {
                    Ok(Value::Null)
                } else {
                    element.deserialize(wire)
                }
            }
            TypeInstance::LowCardinality(element) => element.deserialize(wire),
            TypeInstance::Passthrough { .. } => Ok(scalar::lift_wire(wire)),
            TypeInstance::String { fixed_length } => {
                scalar::deserialize_string(*fixed_length, wire, self)
            }
            TypeInstance::Array(element) => composite::deserialize_array(element, wire, self),
            TypeInstance::Map(key, val) => composite::deserialize_map(key, val, wire, self),
            TypeInstance::Tuple(elements) => {
                composite::deserialize_tuple(elements, wire, self)
            }
            // Scalars share the cast path once lifted out of JSON
            _ => self.cast(scalar::lift_wire(wire)),
        }
    }

    /// Render a canonical value as literal text safe to embed in a query.
    /// `Null` always renders as the literal `NULL`.
    pub fn serialize(&self, value: &Value) -> CastResult<String> {
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        match self {
            TypeInstance::Nullable(element) => element.serialize(value),
            TypeInstance::LowCardinality(element) => element.serialize(value),
            TypeInstance::Int { .. } | TypeInstance::Float { .. } => match value {
                Value::Int(_) | Value::UInt(_) | Value::Float(_) => Ok(value.to_string()),
                _ => Err(self.cast_error(value)),
            },
            TypeInstance::Bool => match value {
                Value::Bool(inner) => Ok(inner.to_string()),
                _ => Err(self.cast_error(value)),
            },
            TypeInstance::String { .. } => match value {
                Value::String(inner) => Ok(quote_literal(inner)),
                _ => Err(self.cast_error(value)),
            },
            TypeInstance::Decimal { .. } => decimal::serialize(value, self),
            TypeInstance::Date { .. } | TypeInstance::DateTime { .. } => {
                temporal::serialize(value, self)
            }
            TypeInstance::Uuid => match value {
                Value::Uuid(inner) => Ok(quote_literal(&inner.to_string())),
                _ => Err(self.cast_error(value)),
            },
            TypeInstance::Enum(spec) => spec.serialize(value, self),
            TypeInstance::Array(element) => composite::serialize_array(element, value, self),
            TypeInstance::Map(key, val) => composite::serialize_map(key, val, value, self),
            TypeInstance::Tuple(elements) => {
                composite::serialize_tuple(elements, value, self)
            }
            TypeInstance::Passthrough { .. } => match value {
                Value::String(inner) => Ok(quote_literal(inner)),
                other => Ok(other.to_string()),
            },
        }
    }

    /// Standard cast failure for `value` against this type
    pub(crate) fn cast_error(&self, value: &Value) -> TypeCastError {
        TypeCastError::new(value.type_label(), self.type_name(), value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decimal_construction_bounds() {
        assert!(TypeInstance::decimal(10, 2).is_ok());
        assert!(TypeInstance::decimal(0, 0).is_err());
        assert!(TypeInstance::decimal(77, 0).is_err());
        assert!(TypeInstance::decimal(10, 11).is_err());
    }

    #[test]
    fn test_decimal_storage_bands() {
        assert_eq!(TypeInstance::decimal_storage_bits(1), 32);
        assert_eq!(TypeInstance::decimal_storage_bits(9), 32);
        assert_eq!(TypeInstance::decimal_storage_bits(10), 64);
        assert_eq!(TypeInstance::decimal_storage_bits(18), 64);
        assert_eq!(TypeInstance::decimal_storage_bits(19), 128);
        assert_eq!(TypeInstance::decimal_storage_bits(38), 128);
        assert_eq!(TypeInstance::decimal_storage_bits(39), 256);
        assert_eq!(TypeInstance::decimal_storage_bits(76), 256);
    }

    #[test]
    fn test_type_name_round_trip_shapes() {
        let nested = TypeInstance::Map(
            Arc::new(TypeInstance::String { fixed_length: None }),
            Arc::new(TypeInstance::Array(Arc::new(TypeInstance::Nullable(
                Arc::new(TypeInstance::Int {
                    bits: 64,
                    signed: true,
                }),
            )))),
        );
        assert_eq!(nested.type_name(), "Map(String, Array(Nullable(Int64)))");
    }

    #[test]
    fn test_null_serializes_everywhere() {
        let int8 = TypeInstance::Int {
            bits: 8,
            signed: true,
        };
        assert_eq!(int8.serialize(&Value::Null).unwrap(), "NULL");
    }

    #[test]
    fn test_nullable_short_circuit() {
        let nullable = TypeInstance::Nullable(Arc::new(TypeInstance::Int {
            bits: 32,
            signed: true,
        }));
        assert_eq!(nullable.cast(Value::Null).unwrap(), Value::Null);
        assert_eq!(nullable.cast(Value::Int(5)).unwrap(), Value::Int(5));
    }
}
