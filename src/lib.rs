//! RustyHL7 - HL7 v2 message parsing and mutation
//!
//! Live, structured views over the delimited text of an HL7 v2 message:
//! - Message::parse + Element descent: address any leaf by positional path
//! - writes splice the shared buffer in place, padding sparse slots
//! - a version-stamped division cache keeps every cursor coherent
//! - path::query: cached terser-style path expressions ("PID.3.1")
//! - strategy::query_parallel: one expression across many messages
//!
//! ```
//! use rustyhl7::Message;
//!
//! let m = Message::parse("MSH|^~\\&|APP|FAC|||20240101||ADT^A01|1|P|2.3").unwrap();
//! assert_eq!(m.message_type(), "ADT");
//!
//! m.segment(1).unwrap().child(10).unwrap().set_value("42");
//! assert_eq!(m.control_id(), "42");
//! ```

pub mod core;
pub mod dom;
pub mod error;
pub mod path;
pub mod strategy;

pub use crate::core::delimiters::Delimiters;
pub use crate::core::division::StringDivision;
pub use crate::dom::{Divider, Element, ElementKey, ElementKind, Endpoint, HeaderPart, Message};
pub use crate::error::Hl7Error;
