//! Reading the textual `llvm-dwarfdump` rendering of a binary's debug info.

mod parser;

pub use parser::{DebugModel, DumpParser, ParserOptions};

use crate::types::Address;

/// Collapses every whitespace run to a single space and drops a leading space.
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_space = false;

    for ch in line.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }

    if out.starts_with(' ') {
        out.remove(0);
    }
    out
}

// Attribute value readers. Each returns the reason on failure so the parser can attach
// the offending line.

type ValueResult<T> = std::result::Result<T, String>;

fn strip_parens(value: &str) -> ValueResult<&str> {
    value
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| format!("expected a parenthesized value, found '{}'", value))
}

/// `0x0000002a` -> 42. The `0x` prefix is required.
pub(crate) fn parse_hex(token: &str) -> ValueResult<Address> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .ok_or_else(|| format!("expected a hexadecimal value, found '{}'", token))?;
    Address::from_str_radix(digits, 16)
        .map_err(|e| format!("invalid hexadecimal value '{}': {}", token, e))
}

/// `("text")` -> `text`
pub(crate) fn parse_quoted(value: &str) -> ValueResult<&str> {
    let inner = strip_parens(value)?;
    inner
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(|| format!("expected a quoted string, found '{}'", value))
}

/// `(0x00000050)` -> 0x50
pub(crate) fn parse_paren_hex(value: &str) -> ValueResult<Address> {
    parse_hex(strip_parens(value)?)
}

/// `(0x00000039 "int")` -> 0x39
pub(crate) fn parse_type_ref(value: &str) -> ValueResult<Address> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .ok_or_else(|| format!("expected a parenthesized type reference, found '{}'", value))?;
    let token = inner.split([' ', ')']).next().unwrap_or_default();
    parse_hex(token)
}

/// `(DW_ACCESS_public)` -> `DW_ACCESS_public`
pub(crate) fn parse_symbol(value: &str) -> ValueResult<&str> {
    let token = strip_parens(value)?;
    if token.is_empty() {
        return Err("expected a symbolic value, found '()'".to_string());
    }
    Ok(token)
}

/// `(0x04)` or `(4)` -> 4
pub(crate) fn parse_size(value: &str) -> ValueResult<u64> {
    let token = strip_parens(value)?;
    if token.starts_with("0x") || token.starts_with("0X") {
        parse_hex(token)
    } else {
        token.parse::<u64>().map_err(|e| format!("invalid size '{}': {}", token, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_line("  a\t\tb  c"), "a b c");
        assert_eq!(normalize_line("0x0000002a:     DW_TAG_member"), "0x0000002a: DW_TAG_member");
        assert_eq!(normalize_line(" \t "), "");
        assert_eq!(normalize_line(""), "");
    }

    #[test]
    fn normalize_never_leaves_double_or_leading_space() {
        for input in ["\t\tx", "x  ", "  x \t y\t\t\tz  ", "a\u{a0}\u{a0}b"] {
            let out = normalize_line(input);
            assert!(!out.contains("  "), "{:?} -> {:?}", input, out);
            assert!(!out.starts_with(' '), "{:?} -> {:?}", input, out);
        }
    }

    #[test]
    fn hex_values() {
        assert_eq!(parse_hex("0x0000002a"), Ok(0x2a));
        assert_eq!(parse_hex("0XFF"), Ok(0xff));
        assert!(parse_hex("2a").is_err());
        assert!(parse_hex("0xzz").is_err());
        assert!(parse_hex("0x").is_err());
    }

    #[test]
    fn attribute_values() {
        assert_eq!(parse_quoted("(\"Foo\")"), Ok("Foo"));
        assert_eq!(parse_quoted("(\"/src/a b.h\")"), Ok("/src/a b.h"));
        assert!(parse_quoted("(Foo)").is_err());
        assert!(parse_quoted("\"Foo\"").is_err());

        assert_eq!(parse_paren_hex("(0x00000050)"), Ok(0x50));
        assert!(parse_paren_hex("(80)").is_err());

        assert_eq!(parse_type_ref("(0x00000039 \"int\")"), Ok(0x39));
        assert_eq!(parse_type_ref("(0x00000039)"), Ok(0x39));
        assert!(parse_type_ref("0x00000039").is_err());

        assert_eq!(parse_symbol("(DW_ACCESS_public)"), Ok("DW_ACCESS_public"));
        assert!(parse_symbol("()").is_err());

        assert_eq!(parse_size("(0x04)"), Ok(4));
        assert_eq!(parse_size("(16)"), Ok(16));
        assert!(parse_size("(four)").is_err());
    }
}
