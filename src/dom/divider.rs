//! String Divider
//!
//! The public cursor over one level of a message: indexed read/write of the
//! divisions of its text, on-demand sub-dividers for the next level down, and
//! the version counter that serializes cache invalidation. A divider is a
//! cheap handle; cloning it clones the view, not the text.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::division::StringDivision;
use crate::dom::arena::{Arena, NodeId};

/// A cursor into the message buffer that splits its range on one delimiter.
#[derive(Clone)]
pub struct Divider {
    arena: Rc<RefCell<Arena>>,
    node: NodeId,
}

impl Divider {
    pub(crate) fn new(arena: Rc<RefCell<Arena>>, node: NodeId) -> Self {
        Divider { arena, node }
    }

    /// The delimiter this divider splits on.
    pub fn delimiter(&self) -> char {
        self.arena.borrow().node(self.node).delimiter
    }

    /// Slot index within the parent divider; 0 for the root.
    pub fn index(&self) -> usize {
        self.arena.borrow().node(self.node).slot
    }

    /// Current root version. Opaque: only equality against a previously
    /// captured value is meaningful.
    pub fn version(&self) -> u64 {
        self.arena.borrow().version
    }

    /// Full text of this divider as a fresh copy, or `None` when its slot
    /// does not exist yet.
    pub fn value(&self) -> Option<String> {
        self.arena.borrow_mut().value_of(self.node)
    }

    /// Replace the full text of this divider. Propagates up to the root
    /// buffer and fires this divider's observers.
    pub fn set_value(&self, value: &str) {
        self.arena.borrow_mut().write_value(self.node, value);
        self.notify();
    }

    /// Number of divisions. An empty (but existing) text has count 1.
    pub fn count(&self) -> usize {
        self.arena.borrow_mut().division_count(self.node)
    }

    /// Copy of the current division table.
    pub fn divisions(&self) -> Vec<StringDivision> {
        self.arena.borrow_mut().divisions_of(self.node)
    }

    /// Span of slot `index`, absolute into the buffer.
    pub fn sub_division(&self, index: usize) -> Option<StringDivision> {
        self.arena.borrow_mut().sub_division(self.node, index)
    }

    /// Text of slot `index` as a fresh copy; `None` past the end.
    pub fn get(&self, index: usize) -> Option<String> {
        self.arena.borrow_mut().read_index(self.node, index)
    }

    /// Write slot `index`, padding intervening slots with empty strings when
    /// `index` is past the end. Fires this divider's observers.
    pub fn set(&self, index: usize, value: &str) {
        self.arena.borrow_mut().write_index(self.node, index, value);
        self.notify();
    }

    /// Sub-divider pinned to slot `index`, splitting on `delimiter`.
    pub fn divide(&self, index: usize, delimiter: char) -> Divider {
        let node = self.arena.borrow_mut().child_of(self.node, index, delimiter);
        Divider::new(Rc::clone(&self.arena), node)
    }

    /// Register a value-changed observer. It fires synchronously, with the
    /// divider's new value, for writes entering through this divider's own
    /// indexer only; it must not mutate the same message reentrantly.
    pub fn on_value_changed(&self, observer: impl Fn(&str) + 'static) {
        self.arena.borrow_mut().subscribe(self.node, Rc::new(observer));
    }

    /// Fire observers outside any arena borrow, so they may read the message.
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
