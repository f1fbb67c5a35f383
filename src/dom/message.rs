//! Message
//!
//! Construction, validation, and the header projections. A message owns the
//! arena; segments, fields, and deeper elements are handles into it. Line
//! endings are normalized to the carriage-return segment terminator on the
//! way in; `to_string` returns the buffer verbatim.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::delimiters::{Delimiters, HEADER_ID, MIN_MESSAGE_LEN};
use crate::core::escape;
use crate::core::sanitize::normalize_line_endings;
use crate::dom::arena::{Arena, ROOT};
use crate::dom::element::{Element, ElementKind};
use crate::error::Hl7Error;

/// A paired application/facility endpoint (MSH-3/4 or MSH-5/6).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub application: String,
    pub facility: String,
}

/// An HL7 v2 message: one shared buffer behind a tree of cursors.
pub struct Message {
    arena: Rc<RefCell<Arena>>,
}

impl Message {
    /// Parse message text. Line endings are normalized to `\r`; the text must
    /// begin with `MSH` and be long enough to declare its delimiters.
    pub fn parse(input: &str) -> Result<Message, Hl7Error> {
        if input.is_empty() {
            return Err(Hl7Error::EmptyInput);
        }
        let text = normalize_line_endings(input);
        if !text.starts_with(HEADER_ID) {
            return Err(Hl7Error::MissingHeader);
        }
        if text.len() < MIN_MESSAGE_LEN {
            return Err(Hl7Error::InputTooShort);
        }
        log::debug!("parsed message of {} bytes", text.len());
        Ok(Message {
            arena: Rc::new(RefCell::new(Arena::new(text.into_owned()))),
        })
    }

    /// The root element of the tree.
    pub fn root(&self) -> Element {
        Element::new(Rc::clone(&self.arena), ROOT, ElementKind::Message)
    }

    /// Current delimiter set, read from the header.
    pub fn delimiters(&self) -> Delimiters {
        self.arena.borrow().delimiters()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.arena.borrow_mut().division_count(ROOT)
    }

    /// Segment at one-based `index`. Past the end this is a detached
    /// placeholder that materializes on write.
    pub fn segment(&self, index: usize) -> Option<Element> {
        self.root().child(index)
    }

    /// All segments whose type matches `kind` (for example `"PID"`).
    pub fn segments(&self, kind: &str) -> Vec<Element> {
        self.root()
            .children()
            .filter(|seg| {
                seg.child(0)
                    .and_then(|t| t.value())
                    .is_some_and(|t| t == kind)
            })
            .collect()
    }

    /// First segment of type `kind`.
    pub fn first_segment(&self, kind: &str) -> Option<Element> {
        self.segments(kind).into_iter().next()
    }

    /// The full message text.
    pub fn value(&self) -> String {
        self.arena.borrow().buffer.clone()
    }

    /// True iff the text still begins with the header segment identifier.
    pub fn validate(&self) -> bool {
        self.arena.borrow().buffer.starts_with(HEADER_ID)
    }

    /// Escape the reserved delimiter characters in `s`.
    pub fn escape(&self, s: &str) -> String {
        escape::escape(s, &self.delimiters()).into_owned()
    }

    /// Reverse `escape`.
    pub fn unescape(&self, s: &str) -> String {
        escape::unescape(s, &self.delimiters()).into_owned()
    }

    fn msh_field(&self, index: usize) -> Option<String> {
        self.segment(1)?.child(index)?.value()
    }

    fn msh_component(&self, field: usize, component: usize) -> Option<String> {
        self.segment(1)?
            .child(field)?
            .child(1)?
            .child(component)?
            .value()
    }

    /// MSH-10.
    pub fn control_id(&self) -> String {
        self.msh_field(10).unwrap_or_default()
    }

    /// MSH-11.
    pub fn processing_id(&self) -> String {
        self.msh_field(11).unwrap_or_default()
    }

    /// MSH-8.
    pub fn security(&self) -> String {
        self.msh_field(8).unwrap_or_default()
    }

    /// MSH-7.
    pub fn time(&self) -> String {
        self.msh_field(7).unwrap_or_default()
    }

    /// MSH-9-1.
    pub fn message_type(&self) -> String {
        self.msh_component(9, 1).unwrap_or_default()
    }

    /// MSH-9-2.
    pub fn trigger_event(&self) -> String {
        self.msh_component(9, 2).unwrap_or_default()
    }

    /// MSH-12.
    pub fn version(&self) -> String {
        self.msh_field(12).unwrap_or_default()
    }

    /// MSH-3/4.
    pub fn sender(&self) -> Endpoint {
        Endpoint {
            application: self.msh_field(3).unwrap_or_default(),
            facility: self.msh_field(4).unwrap_or_default(),
        }
    }

    /// MSH-5/6.
    pub fn receiver(&self) -> Endpoint {
        Endpoint {
            application: self.msh_field(5).unwrap_or_default(),
            facility: self.msh_field(6).unwrap_or_default(),
        }
    }
}

impl Default for Message {
    /// The minimal valid message: `MSH|^~\&|`.
    fn default() -> Self {
        Message::parse("MSH|^~\\&|").expect("default header is valid")
    }
}

impl Clone for Message {
    /// Deep clone: an independent buffer with no shared state.
    fn clone(&self) -> Self {
        Message {
            arena: Rc::new(RefCell::new(Arena::new(self.value()))),
        }
    }
}

impl fmt::Display for Message {
    /// The buffer, verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arena.borrow().buffer)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("value", &self.arena.borrow().buffer)
            .finish()
    }
}

impl PartialEq for Message {
    /// Messages compare by their exact (sanitized) text.
    fn eq(&self, other: &Self) -> bool {
        *self.arena.borrow().buffer == *other.arena.borrow().buffer
    }
}

impl Eq for Message {}
