//! Conversions for the composite variants: Array, Map and Tuple
//!
//! Each accepts either a native collection or the literal text form
//! (`[...]`, `{...}`, `(...)`), decomposed with the top-level splitter and
//! recursively cast through the element types. Nesting depth is unbounded
//! because element types are themselves full instances.

use std::sync::Arc;

use crate::common::error::CastResult;
use crate::types::instance::TypeInstance;
use crate::types::split::{quote_literal, split_top_level, unquote};
use crate::types::value::Value;

/// Route one raw literal segment through an element type. `NULL` stays a
/// null sentinel, quoted text is unescaped, everything else is handed to
/// the element as string input (numbers parse, nested composites
/// decompose again).
fn cast_segment(element: &TypeInstance, segment: &str, target: &TypeInstance) -> CastResult<Value> {
    if segment == "NULL" {
        return element.cast(Value::Null);
    }
    if segment.starts_with('\'') {
        let text = unquote(segment)
            .map_err(|_| target.cast_error(&Value::String(segment.to_string())))?;
        return element.cast(Value::String(text));
    }
    element.cast(Value::String(segment.to_string()))
}

/// Literal body between the expected brackets, or None when the text is
/// not that literal form.
fn literal_body<'a>(text: &'a str, open: char, close: char) -> Option<&'a str> {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix(open)?.strip_suffix(close)?;
    Some(inner)
}

pub(crate) fn cast_array(
    element: &Arc<TypeInstance>,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    match &value {
        Value::Array(items) | Value::Tuple(items) => {
            let cast: CastResult<Vec<Value>> =
                items.iter().cloned().map(|item| element.cast(item)).collect();
            Ok(Value::Array(cast?))
        }
        Value::String(text) => {
            let inner = literal_body(text, '[', ']').ok_or_else(|| target.cast_error(&value))?;
            let segments =
                split_top_level(inner, '[', ']', ',').map_err(|_| target.cast_error(&value))?;
            let cast: CastResult<Vec<Value>> = segments
                .iter()
                .map(|segment| cast_segment(element, segment, target))
                .collect();
            Ok(Value::Array(cast?))
        }
        _ => Err(target.cast_error(&value)),
    }
}

pub(crate) fn cast_map(
    key_type: &Arc<TypeInstance>,
    value_type: &Arc<TypeInstance>,
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    match &value {
        Value::Map(pairs) => {
            let cast: CastResult<Vec<(Value, Value)>> = pairs
                .iter()
                .cloned()
                .map(|(k, v)| Ok((key_type.cast(k)?, value_type.cast(v)?)))
                .collect();
            Ok(Value::Map(cast?))
        }
        Value::String(text) => {
            let inner = literal_body(text, '{', '}').ok_or_else(|| target.cast_error(&value))?;
            let entries =
                split_top_level(inner, '{', '}', ',').map_err(|_| target.cast_error(&value))?;
            let mut pairs = Vec::with_capacity(entries.len());
            for entry in &entries {
                let parts = split_top_level(entry, '{', '}', ':')
                    .map_err(|_| target.cast_error(&value))?;
                if parts.len() != 2 {
                    return Err(target.cast_error(&value));
                }
                pairs.push((
                    cast_segment(key_type, &parts[0], target)?,
                    cast_segment(value_type, &parts[1], target)?,
                ));
            }
            Ok(Value::Map(pairs))
        }
        _ => Err(target.cast_error(&value)),
    }
}

pub(crate) fn cast_tuple(
    elements: &[Arc<TypeInstance>],
    value: Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    let cast_items = |items: &[Value]| -> CastResult<Value> {
        if items.len() != elements.len() {
            return Err(target.cast_error(&Value::Tuple(items.to_vec())));
        }
        let cast: CastResult<Vec<Value>> = elements
            .iter()
            .zip(items.iter().cloned())
            .map(|(element, item)| element.cast(item))
            .collect();
        Ok(Value::Tuple(cast?))
    };

    match &value {
        Value::Tuple(items) | Value::Array(items) => cast_items(items),
        Value::String(text) => {
            let inner = literal_body(text, '(', ')').ok_or_else(|| target.cast_error(&value))?;
            let segments =
                split_top_level(inner, '(', ')', ',').map_err(|_| target.cast_error(&value))?;
            if segments.len() != elements.len() {
                return Err(target.cast_error(&value));
            }
            let cast: CastResult<Vec<Value>> = elements
                .iter()
                .zip(segments.iter())
                .map(|(element, segment)| cast_segment(element, segment, target))
                .collect();
            Ok(Value::Tuple(cast?))
        }
        _ => Err(target.cast_error(&value)),
    }
}

pub(crate) fn deserialize_array(
    element: &Arc<TypeInstance>,
    wire: &serde_json::Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    match wire {
        serde_json::Value::Array(items) => {
            let values: CastResult<Vec<Value>> =
                items.iter().map(|item| element.deserialize(item)).collect();
            Ok(Value::Array(values?))
        }
        // some transports hand composite columns back as literal text
        serde_json::Value::String(text) => {
            cast_array(element, Value::String(text.clone()), target)
        }
        other => Err(target.cast_error(&crate::types::scalar::lift_wire(other))),
    }
}

pub(crate) fn deserialize_map(
    key_type: &Arc<TypeInstance>,
    value_type: &Arc<TypeInstance>,
    wire: &serde_json::Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    match wire {
        serde_json::Value::Object(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                pairs.push((
                    key_type.cast(Value::String(key.clone()))?,
                    value_type.deserialize(item)?,
                ));
            }
            Ok(Value::Map(pairs))
        }
        // pair-list encoding: [[k, v], ...]
        serde_json::Value::Array(items) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                match item.as_array().map(|pair| pair.as_slice()) {
                    Some([key, val]) => pairs.push((
                        key_type.deserialize(key)?,
                        value_type.deserialize(val)?,
                    )),
                    _ => {
                        return Err(
                            target.cast_error(&crate::types::scalar::lift_wire(item))
                        )
                    }
                }
            }
            Ok(Value::Map(pairs))
        }
        serde_json::Value::String(text) => {
            cast_map(key_type, value_type, Value::String(text.clone()), target)
        }
        other => Err(target.cast_error(&crate::types::scalar::lift_wire(other))),
    }
}

pub(crate) fn deserialize_tuple(
    elements: &[Arc<TypeInstance>],
    wire: &serde_json::Value,
    target: &TypeInstance,
) -> CastResult<Value> {
    match wire {
        serde_json::Value::Array(items) if items.len() == elements.len() => {
            let values: CastResult<Vec<Value>> = elements
                .iter()
                .zip(items.iter())
                .map(|(element, item)| element.deserialize(item))
                .collect();
            Ok(Value::Tuple(values?))
        }
        serde_json::Value::String(text) => {
            cast_tuple(elements, Value::String(text.clone()), target)
        }
        other => Err(target.cast_error(&crate::types::scalar::lift_wire(other))),
    }
}

pub(crate) fn serialize_array(
    element: &Arc<TypeInstance>,
    value: &Value,
    target: &TypeInstance,
) -> CastResult<String> {
    match value {
        Value::Array(items) => {
            let rendered: CastResult<Vec<String>> =
                items.iter().map(|item| element.serialize(item)).collect();
            Ok(format!("[{}]", rendered?.join(", ")))
        }
        _ => Err(target.cast_error(value)),
    }
}

/// Plain identifier-ish string keys render bare (`{a: 1}`); keys the
/// splitter would misread bare (separators, quotes, brackets, the NULL
/// sentinel) render quoted, matching the literal form the map cast
/// consumes. Values go through full literal serialization.
pub(crate) fn serialize_map(
    key_type: &Arc<TypeInstance>,
    value_type: &Arc<TypeInstance>,
    value: &Value,
    target: &TypeInstance,
) -> CastResult<String> {
    match value {
        Value::Map(pairs) => {
            let mut rendered = Vec::with_capacity(pairs.len());
            for (key, item) in pairs {
                let key_text = match key {
                    Value::String(s) if key_needs_quoting(s) => quote_literal(s),
                    Value::String(s) => s.clone(),
                    other => key_type.serialize(other)?,
                };
                rendered.push(format!("{}: {}", key_text, value_type.serialize(item)?));
            }
            Ok(format!("{{{}}}", rendered.join(", ")))
        }
        _ => Err(target.cast_error(value)),
    }
}

fn key_needs_quoting(key: &str) -> bool {
    key.is_empty()
        || key == "NULL"
        || key != key.trim()
        || key.chars().any(|ch| {
            matches!(
                ch,
                ':' | ',' | '\'' | '\\' | '(' | ')' | '[' | ']' | '{' | '}'
            ) || ch.is_control()
        })
}

pub(crate) fn serialize_tuple(
    elements: &[Arc<TypeInstance>],
    value: &Value,
    target: &TypeInstance,
) -> CastResult<String> {
    match value {
        Value::Tuple(items) if items.len() == elements.len() => {
            let rendered: CastResult<Vec<String>> = elements
                .iter()
                .zip(items.iter())
                .map(|(element, item)| element.serialize(item))
                .collect();
            Ok(format!("({})", rendered?.join(", ")))
        }
        _ => Err(target.cast_error(value)),
    }
}
