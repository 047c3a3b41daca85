//! Recursive-descent grammar for type-strings
//!
//! Grammar (consumed from the transport layer's column metadata):
//!
//! ```text
//! type       := identifier ['(' arglist ')']
//! arglist    := arg (',' arg)*
//! arg        := type | quoted-literal-expression
//! identifier := letter (letter | digit | '_')*
//! ```
//!
//! `Enum(...)`, `Decimal(p,s)`, `FixedString(n)` and `DateTime64(p)` get no
//! special grammar: their parenthesized contents are captured as opaque
//! argument descriptors and reinterpreted by the matching builder, keeping
//! the grammar uniform.
//!
//! Types nest arbitrarily (`Array(Array(Array(Int32)))` and far deeper), so
//! descent is driven by an explicit frame stack instead of native
//! recursion; pathological nesting grows a `Vec`, not the call stack.

use crate::common::error::{ParseError, ParseResult};
use crate::types::descriptor::TypeDescriptor;
use crate::types::split::split_top_level;

/// Parse a type-string into its structural descriptor.
pub fn parse(input: &str) -> ParseResult<TypeDescriptor> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(0, input, "empty type string"));
    }

    let offset = input.len() - input.trim_start().len();
    let first = trimmed.chars().next().unwrap_or_default();
    if first.is_ascii_digit() {
        return Err(ParseError::new(
            offset,
            input,
            "identifier cannot start with a digit",
        ));
    }
    if !is_identifier_start(first) {
        return Err(ParseError::new(
            offset,
            input,
            format!("unexpected character '{}'", first),
        ));
    }

    let ident_end = identifier_end(trimmed);
    let name = &trimmed[..ident_end];
    let rest = trimmed[ident_end..].trim_start();

    if rest.is_empty() {
        return Ok(TypeDescriptor::leaf(name));
    }
    if !rest.starts_with('(') {
        let position = offset + trimmed.len() - rest.len();
        return Err(ParseError::new(
            position,
            input,
            "trailing characters after type",
        ));
    }

    let close = matching_paren(rest, input, offset + trimmed.len() - rest.len())?;
    if !rest[close + 1..].trim().is_empty() {
        let position = offset + trimmed.len() - rest.len() + close + 1;
        return Err(ParseError::new(
            position,
            input,
            "trailing characters after type",
        ));
    }

    let raw_args = split_top_level(&rest[1..close], '(', ')', ',')?;
    build_tree(name, raw_args)
}

/// Frame of the explicit descent stack: a type name, the raw argument
/// texts still to process, and the child descriptors built so far.
struct Frame {
    name: String,
    pending: std::vec::IntoIter<String>,
    built: Vec<TypeDescriptor>,
}

impl Frame {
    fn new(name: impl Into<String>, raw_args: Vec<String>) -> Self {
        Frame {
            name: name.into(),
            pending: raw_args.into_iter(),
            built: Vec::new(),
        }
    }
}

fn build_tree(root_name: &str, root_args: Vec<String>) -> ParseResult<TypeDescriptor> {
    let mut stack = vec![Frame::new(root_name, root_args)];
    loop {
        let top = stack.last_mut().expect("descent stack never empties mid-loop");
        if let Some(raw) = top.pending.next() {
            match classify_argument(&raw)? {
                Argument::Nested(name, args) => stack.push(Frame::new(name, args)),
                Argument::Leaf(text) => top.built.push(TypeDescriptor::leaf(text)),
            }
            continue;
        }

        let done = stack.pop().expect("popped frame was just inspected");
        let descriptor = TypeDescriptor::with_args(done.name, done.built);
        match stack.last_mut() {
            Some(parent) => parent.built.push(descriptor),
            None => return Ok(descriptor),
        }
    }
}

enum Argument {
    /// A nested parameterized type: name plus raw argument texts
    Nested(String, Vec<String>),
    /// A leaf: bare type name, numeric literal, quoted literal, or an
    /// opaque expression such as `'active' = 1` for the builder to read
    Leaf(String),
}

fn classify_argument(raw: &str) -> ParseResult<Argument> {
    let trimmed = raw.trim();
    let first = match trimmed.chars().next() {
        Some(ch) => ch,
        None => return Ok(Argument::Leaf(String::new())),
    };
    if !is_identifier_start(first) {
        return Ok(Argument::Leaf(trimmed.to_string()));
    }

    let ident_end = identifier_end(trimmed);
    let rest = trimmed[ident_end..].trim_start();
    if rest.is_empty() {
        return Ok(Argument::Leaf(trimmed.to_string()));
    }
    if !rest.starts_with('(') {
        // e.g. a bare enum member expression: keep the raw text opaque
        return Ok(Argument::Leaf(trimmed.to_string()));
    }

    let close = matching_paren(rest, trimmed, trimmed.len() - rest.len())?;
    if !rest[close + 1..].trim().is_empty() {
        return Ok(Argument::Leaf(trimmed.to_string()));
    }

    let args = split_top_level(&rest[1..close], '(', ')', ',')?;
    Ok(Argument::Nested(trimmed[..ident_end].to_string(), args))
}

/// Byte index of the `)` matching the `(` at the start of `text`,
/// quote- and escape-aware.
fn matching_paren(text: &str, input: &str, base: usize) -> ParseResult<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(ParseError::new(base + text.len(), input, "unbalanced '('"))
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn identifier_end(text: &str) -> usize {
    text.char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
