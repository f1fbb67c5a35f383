//! Error Surface
//!
//! One typed error enum covering the fixed set of core failure codes:
//! construction errors (invalid input text) and structural violations
//! (delete/erase on the root element). Everything else in the core is a
//! silent no-op by contract.

use thiserror::Error;

/// Core error with a stable, machine-readable code per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Hl7Error {
    /// The input text was empty.
    #[error("message data must not be null")]
    EmptyInput,

    /// The input text does not begin with the MSH segment identifier.
    #[error("message data must start with MSH")]
    MissingHeader,

    /// The input text is too short to declare its delimiters.
    #[error("message data is too short")]
    InputTooShort,

    /// Delete was called on a root element.
    #[error("root element cannot be deleted")]
    DeleteRoot,

    /// Erase was called on a root element.
    #[error("root element cannot be erased")]
    EraseRoot,
}

impl Hl7Error {
    /// Stable error code for this variant.
    pub const fn code(&self) -> &'static str {
        match self {
            Hl7Error::EmptyInput => "message-data-must-not-be-null",
            Hl7Error::MissingHeader => "message-data-must-start-with-msh",
            Hl7Error::InputTooShort => "message-data-is-too-short",
            Hl7Error::DeleteRoot => "root-element-cannot-be-deleted",
            Hl7Error::EraseRoot => "root-element-cannot-be-erased",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Hl7Error::EmptyInput.code(), "message-data-must-not-be-null");
        assert_eq!(Hl7Error::DeleteRoot.code(), "root-element-cannot-be-deleted");
        assert_eq!(Hl7Error::EraseRoot.code(), "root-element-cannot-be-erased");
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Hl7Error::MissingHeader.to_string(),
            "message data must start with MSH"
        );
        assert_eq!(Hl7Error::InputTooShort.to_string(), "message data is too short");
    }
}
