//! Encoding Header
//!
//! The five characters immediately after the `MSH` segment identifier declare
//! the delimiter at every level plus the escape character. They live inside
//! the message text itself: bytes 3..8 of the buffer.

/// The three-character identifier opening every header segment.
pub const HEADER_ID: &str = "MSH";

/// Segment terminator in the canonical buffer. Host newlines are normalized
/// to this character before parsing.
pub const SEGMENT_TERMINATOR: char = '\r';

/// Shortest valid message: `MSH`, the five encoding characters, and one field
/// separator closing the encoding field.
pub const MIN_MESSAGE_LEN: usize = 9;

/// The delimiter set declared by a message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Splits segments into fields.
    pub field: char,
    /// Splits repetitions into components.
    pub component: char,
    /// Splits a field into repetitions.
    pub repetition: char,
    /// Introduces escape sequences.
    pub escape: char,
    /// Splits components into subcomponents.
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Read the delimiter set from message text, or `None` when the text is
    /// too short to declare one.
    pub fn from_message(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() < MIN_MESSAGE_LEN {
            return None;
        }
        Some(Delimiters {
            field: bytes[3] as char,
            component: bytes[4] as char,
            repetition: bytes[5] as char,
            escape: bytes[6] as char,
            subcomponent: bytes[7] as char,
        })
    }

    /// The four-character MSH-2 value: component, repetition, escape,
    /// subcomponent.
    pub fn encoding_characters(&self) -> String {
        let mut out = String::with_capacity(4);
        out.push(self.component);
        out.push(self.repetition);
        out.push(self.escape);
        out.push(self.subcomponent);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set() {
        let d = Delimiters::default();
        assert_eq!(d.field, '|');
        assert_eq!(d.encoding_characters(), "^~\\&");
    }

    #[test]
    fn test_from_message() {
        let d = Delimiters::from_message("MSH#!@*%#APP").unwrap();
        assert_eq!(d.field, '#');
        assert_eq!(d.component, '!');
        assert_eq!(d.repetition, '@');
        assert_eq!(d.escape, '*');
        assert_eq!(d.subcomponent, '%');
    }

    #[test]
    fn test_from_message_too_short() {
        assert_eq!(Delimiters::from_message("MSH|^~\\&"), None);
        assert_eq!(Delimiters::from_message(""), None);
    }
}
