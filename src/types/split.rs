//! Quote- and bracket-aware splitting of composite literal text
//!
//! Composite values arrive as literal text such as `['a, b', 'c']`,
//! `{'k:with:colon': 'v'}` or `(1, (2,3))`. Decomposing them needs bracket
//! depth and quote state tracking rather than a full grammar; this module
//! is that single place.

use crate::common::error::{ParseError, ParseResult};

/// Split `text` into top-level segments separated by `sep`.
///
/// A `sep` character is a boundary only at bracket depth 0 and outside
/// single quotes. Depth is tracked across all three bracket kinds so
/// mixed nesting (maps inside arrays inside tuples) splits correctly;
/// `open`/`close` name the pair the caller is decomposing and drive the
/// balance errors. Backslash escapes suppress the special meaning of the
/// next character. Each segment is whitespace-trimmed.
pub fn split_top_level(
    text: &str,
    open: char,
    close: char,
    sep: char,
) -> ParseResult<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut closers: Vec<char> = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;

    for (pos, ch) in text.char_indices() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => {
                current.push(ch);
                escaped = true;
            }
            '\'' => {
                in_quote = !in_quote;
                current.push(ch);
            }
            _ if in_quote => current.push(ch),
            '(' | '[' | '{' => {
                closers.push(closing_for(ch));
                current.push(ch);
            }
            ')' | ']' | '}' => {
                match closers.pop() {
                    Some(expected) if expected == ch => {}
                    _ => {
                        return Err(ParseError::new(
                            pos,
                            text,
                            format!("unbalanced '{}'", close),
                        ))
                    }
                }
                current.push(ch);
            }
            _ if ch == sep && closers.is_empty() => {
                segments.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if in_quote {
        return Err(ParseError::new(
            text.len(),
            text,
            "unterminated quoted literal",
        ));
    }
    if !closers.is_empty() {
        return Err(ParseError::new(text.len(), text, format!("unbalanced '{}'", open)));
    }

    let last = current.trim();
    if !last.is_empty() || !segments.is_empty() {
        segments.push(last.to_string());
    }
    Ok(segments)
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Strip surrounding single quotes from a literal and resolve backslash
/// escapes. Text without surrounding quotes is returned trimmed but
/// otherwise untouched.
pub fn unquote(text: &str) -> ParseResult<String> {
    let trimmed = text.trim();
    if !trimmed.starts_with('\'') {
        return Ok(trimmed.to_string());
    }
    if trimmed.len() < 2 || !trimmed.ends_with('\'') {
        return Err(ParseError::new(
            trimmed.len(),
            trimmed,
            "unterminated quoted literal",
        ));
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => {
                return Err(ParseError::new(
                    trimmed.len(),
                    trimmed,
                    "dangling escape in quoted literal",
                ))
            }
        }
    }
    Ok(result)
}

/// Render `text` as a single-quoted SQL literal, escaping backslash,
/// quote, newline, carriage return, tab and NUL.
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_split() {
        let segments = split_top_level("1, 2, 3", '[', ']', ',').unwrap();
        assert_eq!(segments, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_split_respects_quotes() {
        let segments = split_top_level("'a, b', 'c'", '[', ']', ',').unwrap();
        assert_eq!(segments, vec!["'a, b'", "'c'"]);
    }

    #[test]
    fn test_split_respects_nesting() {
        let segments = split_top_level("[1, 2], [3]", '[', ']', ',').unwrap();
        assert_eq!(segments, vec!["[1, 2]", "[3]"]);
    }

    #[test]
    fn test_split_respects_mixed_brackets() {
        let segments = split_top_level("{'a': 1, 'b': 2}, {'c': 3}", '[', ']', ',').unwrap();
        assert_eq!(segments, vec!["{'a': 1, 'b': 2}", "{'c': 3}"]);
    }

    #[test]
    fn test_split_colon_inside_quoted_key() {
        let segments = split_top_level("'k:with:colon': 'v'", '{', '}', ':').unwrap();
        assert_eq!(segments, vec!["'k:with:colon'", "'v'"]);
    }

    #[test]
    fn test_split_escaped_quote() {
        let segments = split_top_level(r"'it\'s, fine', 'x'", '[', ']', ',').unwrap();
        assert_eq!(segments, vec![r"'it\'s, fine'", "'x'"]);
    }

    #[test]
    fn test_split_empty_input() {
        let segments = split_top_level("", '[', ']', ',').unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_split_unterminated_quote_fails() {
        assert!(split_top_level("'abc", '[', ']', ',').is_err());
    }

    #[test]
    fn test_split_unbalanced_brackets_fail() {
        assert!(split_top_level("[1, 2", '[', ']', ',').is_err());
        assert!(split_top_level("1, 2]", '[', ']', ',').is_err());
        assert!(split_top_level("[1, 2)", '[', ']', ',').is_err());
    }

    #[test]
    fn test_unquote_round_trip() {
        let quoted = quote_literal("it's a\ttab\nand \\slash");
        assert_eq!(unquote(&quoted).unwrap(), "it's a\ttab\nand \\slash");
    }

    #[test]
    fn test_unquote_bare_text() {
        assert_eq!(unquote("  hello ").unwrap(), "hello");
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("a'b"), r"'a\'b'");
        assert_eq!(quote_literal("a\0b"), r"'a\0b'");
    }
}
