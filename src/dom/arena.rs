//! Divider Arena
//!
//! One flat arena per message: the buffer, the monotonic version counter, and
//! the divider records spawned as clients descend. Handles reference nodes by
//! index, so parent links are plain indices and there are no reference
//! cycles. Every write funnels up to a root buffer replacement, which bumps
//! the version once; every read revalidates its division cache against that
//! counter before use.

use std::collections::HashMap;
use std::rc::Rc;

use crate::core::delimiters::{Delimiters, SEGMENT_TERMINATOR};
use crate::core::division::{self, StringDivision};

/// Index of a divider record in its arena.
pub(crate) type NodeId = usize;

/// The root divider record is always the first one allocated.
pub(crate) const ROOT: NodeId = 0;

/// Delimiter for leaf dividers that never split their text.
pub(crate) const NO_DELIMITER: char = '\0';

/// Observer invoked with the divider's new value after a local write.
pub(crate) type ValueObserver = Rc<dyn Fn(&str)>;

/// One divider record: where it sits in its parent and how it splits its own
/// text. The cache is a division table stamped with the version it was built
/// against.
pub(crate) struct DividerNode {
    pub parent: Option<NodeId>,
    pub slot: usize,
    pub delimiter: char,
    pub cache: Option<(u64, Vec<StringDivision>)>,
    pub observers: Vec<ValueObserver>,
}

/// Shared state of one message (or one detached element).
pub(crate) struct Arena {
    pub buffer: String,
    pub version: u64,
    delims: Delimiters,
    /// Detached arenas keep the delimiter set they were created with; a
    /// message arena re-reads it after a root-level rewrite.
    frozen_delims: bool,
    nodes: Vec<DividerNode>,
    children: HashMap<(NodeId, usize, char), NodeId>,
}

impl Arena {
    /// Arena for a full message. The root splits on the segment terminator.
    pub fn new(buffer: String) -> Self {
        let delims = Delimiters::from_message(&buffer).unwrap_or_default();
        Self::with_root(buffer, SEGMENT_TERMINATOR, delims, false)
    }

    /// Arena for a detached element: the root splits on the element's own
    /// delimiter and the delimiter set is frozen.
    pub fn detached(buffer: String, root_delimiter: char, delims: Delimiters) -> Self {
        Self::with_root(buffer, root_delimiter, delims, true)
    }

    fn with_root(buffer: String, root_delimiter: char, delims: Delimiters, frozen: bool) -> Self {
        let root = DividerNode {
            parent: None,
            slot: 0,
            delimiter: root_delimiter,
            cache: None,
            observers: Vec::new(),
        };
        Arena {
            buffer,
            version: 1,
            delims,
            frozen_delims: frozen,
            nodes: vec![root],
            children: HashMap::new(),
        }
    }

    /// Current delimiter set.
    #[inline]
    pub fn delimiters(&self) -> Delimiters {
        self.delims
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &DividerNode {
        &self.nodes[id]
    }

    /// Find or allocate the sub-divider pinned to `slot` of `parent`.
    /// Allocation is positional: the same (parent, slot, delimiter) always
    /// resolves to the same record, which makes element keys stable.
    pub fn child_of(&mut self, parent: NodeId, slot: usize, delimiter: char) -> NodeId {
        if let Some(&id) = self.children.get(&(parent, slot, delimiter)) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(DividerNode {
            parent: Some(parent),
            slot,
            delimiter,
            cache: None,
            observers: Vec::new(),
        });
        self.children.insert((parent, slot, delimiter), id);
        id
    }

    /// Absolute span covering `id`, or `None` when its parent slot does not
    /// exist (a detached placeholder).
    pub fn span_of(&mut self, id: NodeId) -> Option<StringDivision> {
        match self.nodes[id].parent {
            None => Some(StringDivision::new(0, self.buffer.len())),
            Some(parent) => {
                let slot = self.nodes[id].slot;
                self.refresh(parent);
                self.nodes[parent]
                    .cache
                    .as_ref()
                    .and_then(|(_, divs)| divs.get(slot).copied())
            }
        }
    }

    /// Rebuild the division cache of `id` if its stamp is stale.
    pub fn refresh(&mut self, id: NodeId) {
        let current = self.version;
        if self.nodes[id].cache.as_ref().map(|(stamp, _)| *stamp) == Some(current) {
            return;
        }
        let delimiter = self.nodes[id].delimiter;
        let divisions = match self.span_of(id) {
            Some(span) => division::divisions(&self.buffer, delimiter, Some(span)),
            None => Vec::new(),
        };
        self.nodes[id].cache = Some((current, divisions));
    }

    /// Number of divisions of `id`. Zero only for a detached placeholder.
    pub fn division_count(&mut self, id: NodeId) -> usize {
        self.refresh(id);
        self.nodes[id]
            .cache
            .as_ref()
            .map(|(_, divs)| divs.len())
            .unwrap_or(0)
    }

    /// Copy of the division table of `id`.
    pub fn divisions_of(&mut self, id: NodeId) -> Vec<StringDivision> {
        self.refresh(id);
        self.nodes[id]
            .cache
            .as_ref()
            .map(|(_, divs)| divs.clone())
            .unwrap_or_default()
    }

    /// Span of slot `index` of `id`.
    pub fn sub_division(&mut self, id: NodeId, index: usize) -> Option<StringDivision> {
        self.refresh(id);
        self.nodes[id]
            .cache
            .as_ref()
            .and_then(|(_, divs)| divs.get(index).copied())
    }

    /// Full text of `id` as a fresh copy, or `None` for a detached
    /// placeholder.
    pub fn value_of(&mut self, id: NodeId) -> Option<String> {
        self.span_of(id).map(|span| span.slice(&self.buffer).to_string())
    }

    /// Text of slot `index` of `id`; `None` past the end.
    pub fn read_index(&mut self, id: NodeId, index: usize) -> Option<String> {
        let div = self.sub_division(id, index)?;
        Some(div.slice(&self.buffer).to_string())
    }

    /// Replace the full text of `id`, propagating up to the root buffer.
    /// The version bumps exactly once, at the root.
    pub fn write_value(&mut self, id: NodeId, value: &str) {
        match self.nodes[id].parent {
            None => {
                log::trace!("replacing buffer ({} -> {} bytes)", self.buffer.len(), value.len());
                self.buffer.clear();
                self.buffer.push_str(value);
                if !self.frozen_delims {
                    if let Some(delims) = Delimiters::from_message(&self.buffer) {
                        self.delims = delims;
                    }
                }
                self.version += 1;
            }
            Some(parent) => {
                let slot = self.nodes[id].slot;
                self.write_index(parent, slot, value);
            }
        }
    }

    /// Write slot `index` of `id`, padding with empty slots when `index` is
    /// past the end.
    pub fn write_index(&mut self, id: NodeId, index: usize, value: &str) {
        let current = self.value_of(id).unwrap_or_default();
        let delimiter = self.nodes[id].delimiter;
        let (padded, divs) = division::padded(&current, index, delimiter);
        let div = divs[index];
        let next = division::splice(&padded, div.offset, div.len, value);
        self.write_value(id, &next);
    }

    /// Remove slot `index` of `id` along with one adjacent delimiter, so
    /// later siblings shift down. Out-of-range indices are a no-op.
    pub fn delete_index(&mut self, id: NodeId, index: usize) {
        let Some(span) = self.span_of(id) else { return };
        self.refresh(id);
        let Some((_, divs)) = self.nodes[id].cache.as_ref() else { return };
        if index >= divs.len() {
            return;
        }
        let div = divs[index];
        let count = divs.len();
        let delim_len = self.nodes[id].delimiter.len_utf8();

        let value = span.slice(&self.buffer).to_string();
        let (cut_start, cut_end) = if count == 1 {
            (0, value.len())
        } else if index == 0 {
            (0, div.end() - span.offset + delim_len)
        } else {
            (div.offset - span.offset - delim_len, div.end() - span.offset)
        };

        let next = division::splice(&value, cut_start, cut_end - cut_start, "");
        self.write_value(id, &next);
    }

    /// Clear the content of slot `index` of `id` without removing the slot.
    /// Slots that do not exist are left untouched.
    pub fn erase_index(&mut self, id: NodeId, index: usize) {
        if index < self.division_count(id) {
            self.write_index(id, index, "");
        }
    }

    /// Snapshot of the observers registered on `id`, for firing outside any
    /// arena borrow.
    pub fn observers_of(&self, id: NodeId) -> Vec<ValueObserver> {
        self.nodes[id].observers.clone()
    }

    pub fn subscribe(&mut self, id: NodeId, observer: ValueObserver) {
        self.nodes[id].observers.push(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(text: &str) -> Arena {
        Arena::new(text.to_string())
    }

    #[test]
    fn test_root_divisions_are_segments() {
        let mut a = arena("MSH|^~\\&|\rPID|1");
        assert_eq!(a.division_count(ROOT), 2);
        assert_eq!(a.read_index(ROOT, 0).unwrap(), "MSH|^~\\&|");
        assert_eq!(a.read_index(ROOT, 1).unwrap(), "PID|1");
        assert_eq!(a.read_index(ROOT, 2), None);
    }

    #[test]
    fn test_write_bumps_version_once() {
        let mut a = arena("MSH|^~\\&|\rPID|1");
        let seg = a.child_of(ROOT, 1, '|');
        let before = a.version;
        a.write_index(seg, 1, "2");
        assert_eq!(a.version, before + 1);
        assert_eq!(a.buffer, "MSH|^~\\&|\rPID|2");
    }

    #[test]
    fn test_deep_write_materializes_ancestors() {
        let mut a = arena("MSH|^~\\&|");
        let seg = a.child_of(ROOT, 1, '|');
        let field = a.child_of(seg, 3, '~');
        assert_eq!(a.value_of(field), None);
        a.write_index(field, 0, "v");
        assert_eq!(a.buffer, "MSH|^~\\&|\r|||v");
        assert_eq!(a.value_of(field).unwrap(), "v");
    }

    #[test]
    fn test_stale_cache_refreshes_after_sibling_write() {
        let mut a = arena("MSH|^~\\&|\rPID|a^b");
        let seg = a.child_of(ROOT, 1, '|');
        let field = a.child_of(seg, 1, '~');
        assert_eq!(a.value_of(field).unwrap(), "a^b");
        // Rewrite through the root; the cached field spans are now stale
        a.write_index(ROOT, 1, "PID|longer^content");
        assert_eq!(a.value_of(field).unwrap(), "longer^content");
    }

    #[test]
    fn test_delete_index_shifts_siblings() {
        let mut a = arena("MSH|^~\\&|\rPID|a|b|c");
        let seg = a.child_of(ROOT, 1, '|');
        a.delete_index(seg, 2);
        assert_eq!(a.buffer, "MSH|^~\\&|\rPID|a|c");
        a.delete_index(seg, 0);
        assert_eq!(a.buffer, "MSH|^~\\&|\ra|c");
    }

    #[test]
    fn test_delete_last_division_clears_text() {
        let mut a = arena("MSH|^~\\&|\rabc");
        let seg = a.child_of(ROOT, 1, '|');
        assert_eq!(a.division_count(seg), 1);
        a.delete_index(seg, 0);
        assert_eq!(a.buffer, "MSH|^~\\&|\r");
        assert_eq!(a.division_count(seg), 1);
    }

    #[test]
    fn test_erase_keeps_slot() {
        let mut a = arena("MSH|^~\\&|\rPID|a|b");
        let seg = a.child_of(ROOT, 1, '|');
        a.erase_index(seg, 1);
        assert_eq!(a.buffer, "MSH|^~\\&|\rPID||b");
        assert_eq!(a.division_count(seg), 3);
        // Erasing a slot that does not exist is a no-op
        let before = a.version;
        a.erase_index(seg, 9);
        assert_eq!(a.version, before);
    }

    #[test]
    fn test_delimiters_reread_after_root_rewrite() {
        let mut a = arena("MSH|^~\\&|");
        assert_eq!(a.delimiters().field, '|');
        a.write_value(ROOT, "MSH#!@*%#x");
        assert_eq!(a.delimiters().field, '#');
    }
}
