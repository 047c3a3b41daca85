//! Conversions for the scalar variants: integers, floats, booleans,
//! strings (plain and fixed-width) and UUIDs

use uuid::Uuid;

use crate::common::error::CastResult;
use crate::types::instance::TypeInstance;
use crate::types::value::Value;

/// Lift a decoded wire value into the closest application value without
/// semantic validation. Numbers keep their JSON flavor, objects become
/// ordered key/value pairs.
pub(crate) fn lift_wire(wire: &serde_json::Value) -> Value {
    match wire {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i as i128)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u as u128)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(lift_wire).collect()),
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), lift_wire(v)))
                .collect(),
        ),
    }
}

pub(crate) fn cast_int(
    bits: u16,
    signed: bool,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let wide: i128 = match &value {
        Value::Bool(b) => *b as i128,
        Value::Int(i) => *i,
        Value::UInt(u) => {
            if signed {
                match i128::try_from(*u) {
                    Ok(i) => i,
                    Err(_) => return Err(target.cast_error(&value)),
                }
            } else {
                return checked_unsigned(bits, *u, &value, target);
            }
        }
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(target.cast_error(&value));
            }
            let truncated = f.trunc();
            if truncated < i128::MIN as f64 || truncated >= i128::MAX as f64 {
                return Err(target.cast_error(&value));
            }
            truncated as i128
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if !signed {
                if let Ok(u) = trimmed.parse::<u128>() {
                    return checked_unsigned(bits, u, &value, target);
                }
            }
            match trimmed.parse::<i128>() {
                Ok(i) => i,
                // numeric-looking but fractional: truncate toward zero
                Err(_) => match trimmed.parse::<f64>() {
                    Ok(f) if f.is_finite() => f.trunc() as i128,
                    _ => return Err(target.cast_error(&value)),
                },
            }
        }
        _ => return Err(target.cast_error(&value)),
    };

    if signed {
        checked_signed(bits, wide, &value, target)
    } else {
        if wide < 0 {
            return Err(target.cast_error(&value));
        }
        checked_unsigned(bits, wide as u128, &value, target)
    }
}

/// Range check `[-2^(bits-1), 2^(bits-1)-1]`; widths of 128 and above
/// span the whole canonical i128 domain.
fn checked_signed(
    bits: u16,
    wide: i128,
    original: &Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    if bits < 128 {
        let max = (1i128 << (bits - 1)) - 1;
        let min = -(1i128 << (bits - 1));
        if wide < min || wide > max {
            return Err(target.cast_error(original));
        }
    }
    Ok(Value::Int(wide))
}

/// Range check `[0, 2^bits-1]`; widths of 128 and above span the whole
/// canonical u128 domain.
fn checked_unsigned(
    bits: u16,
    wide: u128,
    original: &Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    if bits < 128 {
        let max = (1u128 << bits) - 1;
        if wide > max {
            return Err(target.cast_error(original));
        }
    }
    Ok(Value::UInt(wide))
}

pub(crate) fn cast_float(bits: u16, value: Value, target: &TypeInstance) -> CastResult<Value> {
    let wide: f64 = match &value {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        Value::UInt(u) => *u as f64,
        Value::Bool(b) => *b as u8 as f64,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => f,
            Err(_) => return Err(target.cast_error(&value)),
        },
        _ => return Err(target.cast_error(&value)),
    };
    // 32-bit columns round through f32 so the stored value matches what
    // the server will hold
    if bits == 32 {
        Ok(Value::Float(wide as f32 as f64))
    } else {
        Ok(Value::Float(wide))
    }
}

pub(crate) fn cast_bool(value: Value, target: &TypeInstance) -> CastResult<Value> {
    match &value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) | Value::UInt(0) => Ok(Value::Bool(false)),
        Value::Int(1) | Value::UInt(1) => Ok(Value::Bool(true)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "t" | "yes" | "y" => Ok(Value::Bool(true)),
            "false" | "0" | "f" | "no" | "n" => Ok(Value::Bool(false)),
            _ => Err(target.cast_error(&value)),
        },
        _ => Err(target.cast_error(&value)),
    }
}

pub(crate) fn cast_string(
    fixed_length: Option<usize>,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let text = match &value {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Uuid(u) => u.to_string(),
        _ => return Err(target.cast_error(&value)),
    };
    match fixed_length {
        None => Ok(Value::String(text)),
        Some(n) => Ok(Value::String(pad_fixed(text, n))),
    }
}

/// Right-pad with NUL bytes to exactly `n` bytes; longer input is
/// silently truncated (documented lossy behavior). Truncation backs off
/// to a char boundary so a split multi-byte character is dropped whole,
/// then NUL padding restores the exact byte width.
fn pad_fixed(mut text: String, n: usize) -> String {
    if text.len() > n {
        let mut cut = n;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    let missing = n - text.len();
    text.push_str(&"\0".repeat(missing));
    text
}

pub(crate) fn deserialize_string(
    fixed_length: Option<usize>,
    wire: &serde_json::Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let lifted = lift_wire(wire);
    match (&lifted, fixed_length) {
        // wire fixed strings carry their padding; strip the trailing NULs
        (Value::String(s), Some(_)) => {
            Ok(Value::String(s.trim_end_matches('\0').to_string()))
        }
        _ => cast_string(None, lifted, target),
    }
}

pub(crate) fn cast_uuid(value: Value, target: &TypeInstance) -> CastResult<Value> {
    match &value {
        Value::Uuid(u) => Ok(Value::Uuid(*u)),
        Value::String(s) => {
            let trimmed = s.trim();
            let bare = trimmed
                .strip_prefix('{')
                .and_then(|inner| inner.strip_suffix('}'))
                .unwrap_or(trimmed);
            match Uuid::parse_str(bare) {
                Ok(parsed) => Ok(Value::Uuid(parsed)),
                Err(_) => Err(target.cast_error(&value)),
            }
        }
        _ => Err(target.cast_error(&value)),
    }
}
