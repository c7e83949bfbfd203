//! Snapshot-based undo/redo history.

use crate::document::CanvasDocument;
use std::collections::VecDeque;

/// A frozen copy of the document taken at a commit point.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    document: CanvasDocument,
    label: String,
}

impl HistoryEntry {
    /// Snapshot stored in this entry.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Short description of the edit that produced this entry.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Bounded, linear sequence of snapshots with a current index.
///
/// Once an entry exists the index is always within `[0, len)`. Committing
/// after an undo discards every entry after the index; there is no
/// branching. When the log grows past its capacity the oldest entry is
/// evicted and the index shifts with it.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    index: usize,
    capacity: usize,
}

impl HistoryLog {
    /// Create an empty log. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Create a log holding a single entry.
    pub fn with_initial(capacity: usize, document: CanvasDocument, label: impl Into<String>) -> Self {
        let mut log = Self::new(capacity);
        log.reset(document, label);
        log
    }

    /// Record a snapshot as the new current entry.
    pub fn commit(&mut self, document: CanvasDocument, label: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(HistoryEntry {
            document,
            label: label.into(),
        });
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.index -= 1;
        }
        log::debug!(
            "History commit '{}' ({}/{})",
            self.entries[self.index].label,
            self.index + 1,
            self.entries.len()
        );
    }

    /// Step back one entry and return it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// True when an earlier entry exists.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// True when a later entry exists.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Drop every entry and start over with `document` as the only one.
    pub fn reset(&mut self, document: CanvasDocument, label: impl Into<String>) {
        self.entries.clear();
        self.index = 0;
        self.entries.push_back(HistoryEntry {
            document,
            label: label.into(),
        });
    }

    /// The entry the live document corresponds to.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first commit.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry labels, oldest first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(HistoryEntry::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::NewElement;
    use kurbo::Point;

    fn doc_with(n: usize) -> CanvasDocument {
        let mut doc = CanvasDocument::default();
        for i in 0..n {
            doc.add(NewElement::circle(Point::new(i as f64, 0.0), 1.0)).unwrap();
        }
        doc
    }

    #[test]
    fn test_empty_log() {
        let mut log = HistoryLog::new(10);
        assert!(log.is_empty());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert!(log.current().is_none());
    }

    #[test]
    fn test_undo_redo_walks_entries() {
        let mut log = HistoryLog::with_initial(10, doc_with(0), "Initial");
        log.commit(doc_with(1), "one");
        log.commit(doc_with(2), "two");

        assert_eq!(log.undo().map(HistoryEntry::label), Some("one"));
        assert_eq!(log.undo().map(HistoryEntry::label), Some("Initial"));
        assert!(log.undo().is_none());
        assert_eq!(log.index(), 0);

        assert_eq!(log.redo().map(|e| e.document().len()), Some(1));
        assert_eq!(log.redo().map(|e| e.document().len()), Some(2));
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_commit_after_undo_truncates_redo() {
        let mut log = HistoryLog::with_initial(10, doc_with(0), "Initial");
        log.commit(doc_with(1), "one");
        log.commit(doc_with(2), "two");
        log.undo();
        log.undo();
        assert!(log.can_redo());

        log.commit(doc_with(3), "three");
        assert!(!log.can_redo());
        assert_eq!(log.labels().collect::<Vec<_>>(), vec!["Initial", "three"]);
        assert_eq!(log.index(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = HistoryLog::with_initial(3, doc_with(0), "Initial");
        for i in 1..=5 {
            log.commit(doc_with(i), format!("edit {i}"));
            assert!(log.len() <= 3);
            assert_eq!(log.index(), log.len() - 1);
        }
        assert_eq!(log.labels().collect::<Vec<_>>(), vec!["edit 3", "edit 4", "edit 5"]);

        assert!(log.undo().is_some());
        assert!(log.undo().is_some());
        assert!(log.undo().is_none());
        assert_eq!(log.current().map(|e| e.document().len()), Some(3));
    }

    #[test]
    fn test_reset_leaves_single_entry() {
        let mut log = HistoryLog::with_initial(10, doc_with(0), "Initial");
        log.commit(doc_with(1), "one");
        log.reset(doc_with(4), "Import");
        assert_eq!(log.len(), 1);
        assert_eq!(log.index(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let log = HistoryLog::new(0);
        assert_eq!(log.capacity(), 1);
    }
}
