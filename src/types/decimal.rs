//! Fixed-point decimal conversions
//!
//! The canonical decimal value is normalized digit text rather than a
//! binary mantissa: precisions up to 76 digits exceed every fixed-width
//! integer available here, and the engine does no arithmetic, only
//! validation and rendering. Text keeps 76-digit round trips exact and
//! makes "use strings for high-precision input" the natural calling
//! convention.

use crate::common::error::CastResult;
use crate::types::instance::TypeInstance;
use crate::types::value::Value;

/// Sign and digit parts of a decimal, before scale normalization
struct RawDecimal {
    negative: bool,
    /// Integer digits without leading zeros (empty means zero)
    int_digits: String,
    /// Fraction digits as written
    frac_digits: String,
}

pub(crate) fn zero_value(precision: u8, scale: u8) -> Value {
    Value::Decimal {
        digits: render(false, "0", &"0".repeat(scale as usize), scale),
        precision,
        scale,
    }
}

pub(crate) fn cast(
    precision: u8,
    scale: u8,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let raw = match &value {
        Value::Int(i) => parse_text(&i.to_string()),
        Value::UInt(u) => parse_text(&u.to_string()),
        // binary floats lose digits past ~15 significant places; callers
        // needing more must pass strings
        Value::Float(f) if f.is_finite() => {
            parse_text(&format!("{:.*}", scale as usize, f))
        }
        Value::String(s) => parse_text(s),
        Value::Decimal { digits, .. } => parse_text(digits),
        _ => None,
    };
    let raw = match raw {
        Some(raw) => raw,
        None => return Err(target.cast_error(&value)),
    };

    match normalize(raw, precision, scale) {
        Some(digits) => Ok(Value::Decimal {
            digits,
            precision,
            scale,
        }),
        None => Err(target.cast_error(&value)),
    }
}

/// Fixed-point rendering only, never exponential, so serialized output
/// feeds back through `cast` without loss.
pub(crate) fn serialize(value: &Value, target: &TypeInstance) -> CastResult<String> {
    match value {
        Value::Decimal { digits, .. } => Ok(digits.clone()),
        Value::Int(i) => Ok(i.to_string()),
        Value::UInt(u) => Ok(u.to_string()),
        _ => Err(target.cast_error(value)),
    }
}

/// Parse `-?digits[.digits]` into its parts. Exponents and any other
/// character make the text unusable as an exact decimal.
fn parse_text(text: &str) -> Option<RawDecimal> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    Some(RawDecimal {
        negative,
        int_digits: int_part.trim_start_matches('0').to_string(),
        frac_digits: frac_part.to_string(),
    })
}

/// Round the fraction to `scale` digits (half away from zero) and check
/// that the integer digit count fits in `precision - scale`.
fn normalize(raw: RawDecimal, precision: u8, scale: u8) -> Option<String> {
    let scale = scale as usize;
    let mut int_digits = raw.int_digits;
    let mut frac_digits = raw.frac_digits;

    if frac_digits.len() > scale {
        let round_up = frac_digits.as_bytes()[scale] >= b'5';
        frac_digits.truncate(scale);
        if round_up {
            let mut combined = format!("{}{}", int_digits, frac_digits);
            increment_digits(&mut combined);
            let split = combined.len() - scale;
            frac_digits = combined[split..].to_string();
            int_digits = combined[..split].trim_start_matches('0').to_string();
        }
    } else {
        let missing = scale - frac_digits.len();
        frac_digits.push_str(&"0".repeat(missing));
    }

    let max_int_digits = (precision as usize).saturating_sub(scale);
    if int_digits.len() > max_int_digits {
        return None;
    }

    let is_zero = int_digits.is_empty() && frac_digits.bytes().all(|b| b == b'0');
    let negative = raw.negative && !is_zero;
    let int_rendered = if int_digits.is_empty() { "0" } else { &int_digits };
    Some(render(negative, int_rendered, &frac_digits, scale as u8))
}

/// Add one to a digit string in place, growing on full carry.
fn increment_digits(digits: &mut String) {
    let mut bytes = digits.clone().into_bytes();
    let mut i = bytes.len();
    loop {
        if i == 0 {
            bytes.insert(0, b'1');
            break;
        }
        i -= 1;
        if bytes[i] == b'9' {
            bytes[i] = b'0';
        } else {
            bytes[i] += 1;
            break;
        }
    }
    *digits = String::from_utf8(bytes).unwrap_or_default();
}

fn render(negative: bool, int_digits: &str, frac_digits: &str, scale: u8) -> String {
    let sign = if negative { "-" } else { "" };
    if scale == 0 {
        format!("{}{}", sign, int_digits)
    } else {
        format!("{}{}.{}", sign, int_digits, frac_digits)
    }
}
