//! Element Tree
//!
//! Polymorphic nodes over the divider arena. Every element wraps a divider at
//! the right level and exposes the full capability set: indexed descent,
//! value get/set, enumeration, clone-detached, delete, erase. Indexing is
//! one-based and sparse; descending past the current count yields a detached
//! placeholder whose reads are `None` and whose writes materialize the slot.
//!
//! The header segment is special: its first field separator *is* MSH-1 and
//! the encoding characters are MSH-2, so field `k >= 2` of `MSH` maps to
//! division `k - 1`, while field `k` of any other segment maps to division
//! `k` (division 0 being the segment-type pseudo-field).

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::delimiters::HEADER_ID;
use crate::dom::arena::{Arena, NodeId, NO_DELIMITER};
use crate::dom::divider::Divider;
use crate::error::Hl7Error;

/// The level of an element within its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Message,
    Segment,
    Field,
    FieldRepetition,
    Component,
    Subcomponent,
    /// MSH-1 or MSH-2: a field whose content is the delimiter set itself.
    HeaderField(HeaderPart),
}

/// Which pseudo-field of the header a `HeaderField` covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderPart {
    /// MSH-1: the single field separator character.
    FieldSeparator,
    /// MSH-2: the four encoding characters.
    EncodingCharacters,
}

/// Stable, opaque identifier of an element within its message; usable as a
/// map key for one process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey(u64);

/// One node of the element tree: a cheap positional handle over the shared
/// arena.
#[derive(Clone)]
pub struct Element {
    arena: Rc<RefCell<Arena>>,
    node: NodeId,
    kind: ElementKind,
}

impl Element {
    pub(crate) fn new(arena: Rc<RefCell<Arena>>, node: NodeId, kind: ElementKind) -> Self {
        Element { arena, node, kind }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Stable identifier of this element within its message.
    pub fn key(&self) -> ElementKey {
        let tag = match self.kind {
            ElementKind::HeaderField(HeaderPart::FieldSeparator) => 1,
            ElementKind::HeaderField(HeaderPart::EncodingCharacters) => 2,
            _ => 0,
        };
        ElementKey(((self.node as u64) << 2) | tag)
    }

    /// The divider backing this element.
    pub fn divider(&self) -> Divider {
        Divider::new(Rc::clone(&self.arena), self.node)
    }

    /// Text covered by this element; `None` when the slot is absent or
    /// empty.
    pub fn value(&self) -> Option<String> {
        let mut arena = self.arena.borrow_mut();
        match self.kind {
            ElementKind::HeaderField(HeaderPart::FieldSeparator) => {
                Some(arena.delimiters().field.to_string())
            }
            _ => arena.value_of(self.node).filter(|v| !v.is_empty()),
        }
    }

    /// Replace the text covered by this element, materializing its slot when
    /// needed. Header pseudo-fields are read-only: writing them is a no-op.
    pub fn set_value(&self, value: &str) {
        if matches!(self.kind, ElementKind::HeaderField(_)) {
            return;
        }
        self.arena.borrow_mut().write_value(self.node, value);
        self.notify();
    }

    /// Descend to the child at one-based `index` (0 addresses the
    /// segment-type pseudo-field of a segment). Returns a detached
    /// placeholder past the current count; `None` only where descent is not
    /// defined for this kind.
    pub fn child(&self, index: usize) -> Option<Element> {
        let mut arena = self.arena.borrow_mut();
        let delims = arena.delimiters();
        match self.kind {
            ElementKind::Message => {
                if index == 0 {
                    return None;
                }
                let node = arena.child_of(self.node, index - 1, delims.field);
                Some(Element::new(Rc::clone(&self.arena), node, ElementKind::Segment))
            }
            ElementKind::Segment => {
                let header = arena.read_index(self.node, 0).as_deref() == Some(HEADER_ID);
                let (slot, kind) = if header {
                    match index {
                        0 => (0, ElementKind::Field),
                        1 => {
                            let kind = ElementKind::HeaderField(HeaderPart::FieldSeparator);
                            return Some(Element::new(Rc::clone(&self.arena), self.node, kind));
                        }
                        2 => (1, ElementKind::HeaderField(HeaderPart::EncodingCharacters)),
                        _ => (index - 1, ElementKind::Field),
                    }
                } else {
                    (index, ElementKind::Field)
                };
                let delimiter = match kind {
                    ElementKind::HeaderField(_) => NO_DELIMITER,
                    _ => delims.repetition,
                };
                let node = arena.child_of(self.node, slot, delimiter);
                Some(Element::new(Rc::clone(&self.arena), node, kind))
            }
            ElementKind::Field => {
                if index == 0 {
                    return None;
                }
                let node = arena.child_of(self.node, index - 1, delims.component);
                Some(Element::new(
                    Rc::clone(&self.arena),
                    node,
                    ElementKind::FieldRepetition,
                ))
            }
            ElementKind::FieldRepetition => {
                if index == 0 {
                    return None;
                }
                let node = arena.child_of(self.node, index - 1, delims.subcomponent);
                Some(Element::new(Rc::clone(&self.arena), node, ElementKind::Component))
            }
            ElementKind::Component => {
                if index == 0 {
                    return None;
                }
                let node = arena.child_of(self.node, index - 1, NO_DELIMITER);
                Some(Element::new(
                    Rc::clone(&self.arena),
                    node,
                    ElementKind::Subcomponent,
                ))
            }
            ElementKind::Subcomponent | ElementKind::HeaderField(_) => None,
        }
    }

    /// Number of divisions of this element's own text. Zero only for a
    /// detached placeholder.
    pub fn descendant_count(&self) -> usize {
        match self.kind {
            ElementKind::HeaderField(_) => 0,
            _ => self.arena.borrow_mut().division_count(self.node),
        }
    }

    /// Lazy sequence of child elements, in division order. Mutating the
    /// message during enumeration is undefined.
    pub fn children(&self) -> Children {
        let (count, header) = match self.kind {
            ElementKind::Subcomponent | ElementKind::HeaderField(_) => (0, false),
            ElementKind::Segment => {
                let mut arena = self.arena.borrow_mut();
                let count = arena.division_count(self.node);
                let header = arena.read_index(self.node, 0).as_deref() == Some(HEADER_ID);
                (count, header)
            }
            _ => (self.arena.borrow_mut().division_count(self.node), false),
        };
        Children {
            parent: self.clone(),
            header,
            division: 0,
            count,
        }
    }

    /// Ordered child string values; empty slots yield empty strings.
    pub fn values(&self) -> Vec<String> {
        self.children()
            .map(|child| child.value().unwrap_or_default())
            .collect()
    }

    /// Replace all children by joining `values` with this element's own
    /// delimiter.
    pub fn set_values(&self, values: &[&str]) {
        if matches!(self.kind, ElementKind::HeaderField(_)) {
            return;
        }
        let delimiter = self.arena.borrow().node(self.node).delimiter;
        let mut joined = String::new();
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                joined.push(delimiter);
            }
            joined.push_str(v);
        }
        self.set_value(&joined);
    }

    /// True iff at least one descendant has content, or there is more than
    /// one descendant.
    pub fn has_significant_descendants(&self) -> bool {
        if self.descendant_count() > 1 {
            return true;
        }
        self.children().any(|child| child.value().is_some())
    }

    /// The parent element; `None` on a message or a detached root.
    pub fn ancestor(&self) -> Option<Element> {
        let parent_kind = match self.kind {
            ElementKind::Message => return None,
            ElementKind::Segment => ElementKind::Message,
            ElementKind::Field => ElementKind::Segment,
            ElementKind::FieldRepetition => ElementKind::Field,
            ElementKind::Component => ElementKind::FieldRepetition,
            ElementKind::Subcomponent => ElementKind::Component,
            ElementKind::HeaderField(HeaderPart::FieldSeparator) => {
                // MSH-1 shares the segment's own divider record
                return Some(Element::new(
                    Rc::clone(&self.arena),
                    self.node,
                    ElementKind::Segment,
                ));
            }
            ElementKind::HeaderField(HeaderPart::EncodingCharacters) => ElementKind::Segment,
        };
        let parent = self.arena.borrow().node(self.node).parent?;
        Some(Element::new(Rc::clone(&self.arena), parent, parent_kind))
    }

    /// Standalone copy of this element: a fresh buffer holding its value,
    /// with no ancestor and no shared state.
    pub fn clone_detached(&self) -> Element {
        let (value, delimiter, delims) = {
            let mut arena = self.arena.borrow_mut();
            let value = match self.kind {
                ElementKind::HeaderField(HeaderPart::FieldSeparator) => {
                    arena.delimiters().field.to_string()
                }
                _ => arena.value_of(self.node).unwrap_or_default(),
            };
            let delimiter = arena.node(self.node).delimiter;
            (value, delimiter, arena.delimiters())
        };
        let detached = Arena::detached(value, delimiter, delims);
        Element::new(
            Rc::new(RefCell::new(detached)),
            crate::dom::arena::ROOT,
            self.kind,
        )
    }

    /// Remove this element's slot from its parent, shifting later siblings
    /// down by one. Fails on a root.
    pub fn delete(&self) -> Result<(), Hl7Error> {
        if matches!(self.kind, ElementKind::HeaderField(_)) {
            return Ok(());
        }
        let mut arena = self.arena.borrow_mut();
        let Some(parent) = arena.node(self.node).parent else {
            return Err(Hl7Error::DeleteRoot);
        };
        let slot = arena.node(self.node).slot;
        arena.delete_index(parent, slot);
        Ok(())
    }

    /// Clear this element's content while keeping its slot position. Fails on
    /// a root.
    pub fn erase(&self) -> Result<(), Hl7Error> {
        if matches!(self.kind, ElementKind::HeaderField(_)) {
            return Ok(());
        }
        let mut arena = self.arena.borrow_mut();
        let Some(parent) = arena.node(self.node).parent else {
            return Err(Hl7Error::EraseRoot);
        };
        let slot = arena.node(self.node).slot;
        arena.erase_index(parent, slot);
        Ok(())
    }

    /// Fire this element's observers with its new value, outside any arena
    /// borrow.
    fn notify(&self) {
        let (observers, value) = {
            let mut arena = self.arena.borrow_mut();
            let observers = arena.observers_of(self.node);
            if observers.is_empty() {
                return;
            }
            (observers, arena.value_of(self.node).unwrap_or_default())
        };
        for observer in &observers {
            observer(&value);
        }
    }
}

/// Iterator over the child elements of one element, in division order.
pub struct Children {
    parent: Element,
    header: bool,
    division: usize,
    count: usize,
}

impl Iterator for Children {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        if self.division >= self.count {
            return None;
        }
        let division = self.division;
        self.division += 1;

        let index = match self.parent.kind {
            // Divisions are zero-based; element indices are one-based
            ElementKind::Message
            | ElementKind::Field
            | ElementKind::FieldRepetition
            | ElementKind::Component => division + 1,
            ElementKind::Segment if self.header => match division {
                0 => 0,
                // Division 1 of the header is MSH-2
                1 => 2,
                d => d + 1,
            },
            ElementKind::Segment => division,
            ElementKind::Subcomponent | ElementKind::HeaderField(_) => return None,
        };
        self.parent.child(index)
    }
}
