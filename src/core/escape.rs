//! Escaping Codec
//!
//! Encodes the five reserved characters into `E` + code + `E` sequences so
//! they may appear inside leaf values, and reverses them:
//! `\F\` field, `\S\` component, `\R\` repetition, `\T\` subcomponent,
//! `\E\` escape (with `\` standing for the declared escape character).
//!
//! Uses Cow for zero-copy when no rewriting is needed. Unrecognized
//! `E…E` sequences pass through verbatim.

use std::borrow::Cow;

use memchr::memchr;

use crate::core::delimiters::Delimiters;

/// Escape the reserved characters of `delims` in `input`.
///
/// Returns Borrowed if no reserved character is present.
pub fn escape<'a>(input: &'a str, delims: &Delimiters) -> Cow<'a, str> {
    // Fast path: scan for any reserved character
    if !input.chars().any(|c| code_for(c, delims).is_some()) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match code_for(c, delims) {
            Some(code) => {
                out.push(delims.escape);
                out.push(code);
                out.push(delims.escape);
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Reverse `escape`. Exact inverse for its output; any `E…E` sequence that is
/// not one of the five codes is left as-is, as is a dangling escape character.
pub fn unescape<'a>(input: &'a str, delims: &Delimiters) -> Cow<'a, str> {
    let esc = delims.escape;

    // Fast path: no escape character at all
    let present = if esc.is_ascii() {
        memchr(esc as u8, input.as_bytes()).is_some()
    } else {
        input.contains(esc)
    };
    if !present {
        return Cow::Borrowed(input);
    }

    let esc_len = esc.len_utf8();
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(esc) {
        out.push_str(&rest[..start]);
        let after = &rest[start + esc_len..];

        let Some(close) = after.find(esc) else {
            // No closing delimiter: keep the tail verbatim
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let sequence = &after[..close];
        let consumed = start + esc_len + close + esc_len;
        let mut seq_chars = sequence.chars();
        match (seq_chars.next(), seq_chars.next()) {
            (Some(code), None) if char_for(code, delims).is_some() => {
                // One of the five recognized codes
                out.push(char_for(code, delims).unwrap_or(code));
            }
            _ => out.push_str(&rest[start..consumed]),
        }
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

/// Escape-sequence code for a reserved character, if it is one.
#[inline]
fn code_for(c: char, delims: &Delimiters) -> Option<char> {
    if c == delims.escape {
        Some('E')
    } else if c == delims.field {
        Some('F')
    } else if c == delims.component {
        Some('S')
    } else if c == delims.repetition {
        Some('R')
    } else if c == delims.subcomponent {
        Some('T')
    } else {
        None
    }
}

/// Reserved character for an escape-sequence code, if recognized.
#[inline]
fn char_for(code: char, delims: &Delimiters) -> Option<char> {
    match code {
        'E' => Some(delims.escape),
        'F' => Some(delims.field),
        'S' => Some(delims.component),
        'R' => Some(delims.repetition),
        'T' => Some(delims.subcomponent),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d() -> Delimiters {
        Delimiters::default()
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        let result = escape("hello world", &d());
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_field_and_component() {
        assert_eq!(escape("a|b^c", &d()).as_ref(), "a\\F\\b\\S\\c");
    }

    #[test]
    fn test_escape_all_reserved() {
        assert_eq!(
            escape("|^~\\&", &d()).as_ref(),
            "\\F\\\\S\\\\R\\\\E\\\\T\\"
        );
    }

    #[test]
    fn test_unescape_inverts() {
        let delims = d();
        for s in ["a|b^c", "x~y&z", "back\\slash", "", "plain"] {
            let escaped = escape(s, &delims);
            assert_eq!(unescape(&escaped, &delims).as_ref(), s);
        }
    }

    #[test]
    fn test_unknown_sequence_preserved() {
        assert_eq!(unescape("a\\H\\b", &d()).as_ref(), "a\\H\\b");
        assert_eq!(unescape("a\\X0D\\b", &d()).as_ref(), "a\\X0D\\b");
    }

    #[test]
    fn test_dangling_escape_preserved() {
        assert_eq!(unescape("a\\b", &d()).as_ref(), "a\\b");
        assert_eq!(unescape("tail\\", &d()).as_ref(), "tail\\");
    }

    #[test]
    fn test_unescape_without_escape_char_is_borrowed() {
        let result = unescape("nothing here", &d());
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_alternate_delimiters() {
        let delims = Delimiters::from_message("MSH#!@*%#x").unwrap();
        assert_eq!(escape("a#b!c", &delims).as_ref(), "a*F*b*S*c");
        assert_eq!(unescape("a*F*b*S*c", &delims).as_ref(), "a#b!c");
    }
}
