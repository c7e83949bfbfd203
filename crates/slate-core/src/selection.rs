//! Selection of elements.

use crate::elements::ElementId;
use serde::{Deserialize, Serialize};

/// Ordered set of selected element ids (insertion order).
///
/// The selection never references elements outside its document; the
/// document prunes it whenever elements are removed or replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`. Without `multi` the selection becomes exactly `{id}`;
    /// with `multi` membership of `id` is toggled.
    pub fn select(&mut self, id: ElementId, multi: bool) {
        if !multi {
            self.ids.clear();
            self.ids.push(id);
        } else if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Replace the selection with `ids`, dropping duplicates.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Remove `id`; returns true if it was selected.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&s| s != id);
        self.ids.len() != before
    }

    /// Keep only ids for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&ElementId) -> bool) {
        self.ids.retain(keep);
    }

    /// True when `id` is selected.
    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in selection order.
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// The single selected id, if exactly one element is selected.
    pub fn single(&self) -> Option<ElementId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
