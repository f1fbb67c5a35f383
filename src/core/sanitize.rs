//! Line Ending Normalization
//!
//! HL7 terminates segments with a single carriage return. Input may arrive
//! with `\r\n` or lone `\n` line endings; both are normalized to `\r` before
//! parsing. Uses Cow for zero-copy when the input is already canonical.

use memchr::memchr;
use std::borrow::Cow;

/// Normalize `\r\n` and lone `\n` to `\r`.
///
/// Returns Borrowed when the input contains no line feed (common case for
/// wire-received messages), Owned otherwise.
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    // Fast path: no LF anywhere means nothing to rewrite
    if memchr(b'\n', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\r');
            }
            '\n' => out.push('\r'),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_input_is_borrowed() {
        let input = "MSH|^~\\&|\rPID|1";
        let result = normalize_line_endings(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), input);
    }

    #[test]
    fn test_crlf_collapses() {
        assert_eq!(
            normalize_line_endings("MSH|^~\\&|\r\nPID|1").as_ref(),
            "MSH|^~\\&|\rPID|1"
        );
    }

    #[test]
    fn test_lone_lf_rewrites() {
        assert_eq!(
            normalize_line_endings("MSH|^~\\&|\nPID|1").as_ref(),
            "MSH|^~\\&|\rPID|1"
        );
    }

    #[test]
    fn test_mixed_endings() {
        assert_eq!(
            normalize_line_endings("a\r\nb\nc\rd").as_ref(),
            "a\rb\rc\rd"
        );
    }
}
