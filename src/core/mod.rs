//! Core Text Machinery
//!
//! Delimiter-level primitives shared by the divider arena and the element
//! tree: division spans, the encoding header, the escaping codec, and input
//! sanitization.

pub mod delimiters;
pub mod division;
pub mod escape;
pub mod sanitize;
