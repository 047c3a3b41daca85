//! Date and timestamp conversions
//!
//! `Date`/`Date32` hold calendar dates, `DateTime`/`DateTime64(p)` hold
//! timestamps with `p` sub-second digits. Cast accepts epoch integers,
//! date/time values and canonical `YYYY-MM-DD[ HH:MM:SS[.ffffff]]` text.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::common::error::CastResult;
use crate::types::instance::TypeInstance;
use crate::types::split::quote_literal;
use crate::types::value::Value;

pub(crate) fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

pub(crate) fn cast_date(value: Value, target: &TypeInstance) -> CastResult<Value> {
    match &value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime { value: ts, .. } => Ok(Value::Date(ts.date())),
        Value::Int(i) => days_from_epoch(*i).map(Value::Date).ok_or_else(|| target.cast_error(&value)),
        Value::UInt(u) => i128::try_from(*u)
            .ok()
            .and_then(days_from_epoch)
            .map(Value::Date)
            .ok_or_else(|| target.cast_error(&value)),
        Value::String(s) => match parse_date_text(s.trim()) {
            Some(d) => Ok(Value::Date(d)),
            None => Err(target.cast_error(&value)),
        },
        _ => Err(target.cast_error(&value)),
    }
}

pub(crate) fn cast_datetime(
    precision: u8,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let ts = match &value {
        Value::DateTime { value: ts, .. } => Some(*ts),
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::Int(i) => seconds_from_epoch(*i),
        Value::UInt(u) => i128::try_from(*u).ok().and_then(seconds_from_epoch),
        Value::Float(f) if f.is_finite() => {
            let secs = f.floor() as i64;
            let nanos = ((f - f.floor()) * 1e9) as u32;
            chrono::DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
        }
        Value::String(s) => parse_datetime_text(s.trim()),
        _ => None,
    };
    match ts {
        Some(ts) => Ok(Value::DateTime {
            value: truncate_to_precision(ts, precision),
            precision,
        }),
        None => Err(target.cast_error(&value)),
    }
}

pub(crate) fn serialize(value: &Value, target: &TypeInstance) -> CastResult<String> {
    match (target, value) {
        (TypeInstance::Date { .. }, Value::Date(_)) => {
            Ok(quote_literal(&value.to_string()))
        }
        (TypeInstance::DateTime { .. }, Value::DateTime { .. }) => {
            Ok(quote_literal(&value.to_string()))
        }
        _ => Err(target.cast_error(value)),
    }
}

fn days_from_epoch(days: i128) -> Option<NaiveDate> {
    let days = i64::try_from(days).ok()?;
    epoch_date().checked_add_signed(Duration::days(days))
}

fn seconds_from_epoch(seconds: i128) -> Option<NaiveDateTime> {
    let seconds = i64::try_from(seconds).ok()?;
    chrono::DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    parse_datetime_text(text).map(|ts| ts.date())
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Drop sub-second digits beyond the column's precision so values
/// round-trip through their own serialized text.
fn truncate_to_precision(ts: NaiveDateTime, precision: u8) -> NaiveDateTime {
    use chrono::Timelike;
    if precision >= 9 {
        return ts;
    }
    let divisor = 10u32.pow(9 - precision as u32);
    let nanos = ts.nanosecond() / divisor * divisor;
    ts.with_nanosecond(nanos).unwrap_or(ts)
}
