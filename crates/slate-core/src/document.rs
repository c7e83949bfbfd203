//! Canvas document: elements, z-order, selection and canvas settings.

use crate::config::SessionConfig;
use crate::elements::{Color, Element, ElementId, ElementPatch, NewElement};
use crate::error::{EditorError, Result};
use crate::selection::Selection;
use crate::snap::GridSettings;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Direction for z-order changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    /// Swap with the element directly above.
    Up,
    /// Swap with the element directly below.
    Down,
    /// Move to the top of the stack.
    Top,
    /// Move to the bottom of the stack.
    Bottom,
}

/// A design canvas document.
///
/// Elements live in an id-keyed arena; stacking is an explicit order list
/// (back to front). Each element's `z_index` always equals its index in that
/// list, and the selection only ever references elements in the arena.
///
/// Mutations here never touch history; [`crate::EditorSession`] decides
/// what gets committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DocumentRecord", into = "DocumentRecord")]
pub struct CanvasDocument {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    selection: Selection,
    width: f64,
    height: f64,
    background: Color,
    viewport: Viewport,
    grid: GridSettings,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl CanvasDocument {
    /// Create an empty document.
    pub fn new(width: f64, height: f64, background: Color) -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            selection: Selection::new(),
            width,
            height,
            background,
            viewport: Viewport::default(),
            grid: GridSettings::default(),
        }
    }

    /// Create an empty document using the configured canvas defaults.
    pub fn from_config(config: &SessionConfig) -> Self {
        let mut doc = Self::new(config.canvas_width, config.canvas_height, config.background);
        doc.grid.size = config.grid_size;
        doc
    }

    /// Canvas width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Canvas background colour.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Current zoom and pan.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable view state; never recorded in history on its own.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Grid settings.
    pub fn grid(&self) -> &GridSettings {
        &self.grid
    }

    /// Replace the grid settings after validating them.
    pub fn set_grid(&mut self, grid: GridSettings) -> Result<()> {
        if !(grid.size.is_finite() && grid.size > 0.0) {
            return Err(EditorError::InvalidGeometry(format!(
                "grid size must be positive, got {}",
                grid.size
            )));
        }
        self.grid = grid;
        Ok(())
    }

    /// Selected ids.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up an element by id.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// True when `id` is in the document.
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Element ids in z-order (back to front).
    pub fn order(&self) -> &[ElementId] {
        &self.order
    }

    /// Elements in z-order (back to front).
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Append an element on top of the stack without touching the selection.
    pub(crate) fn insert(&mut self, mut element: Element) -> ElementId {
        let id = element.id;
        element.z_index = self.order.len();
        self.order.push(id);
        self.elements.insert(id, element);
        self.debug_check();
        id
    }

    /// Validate and append a new element, then select it.
    pub fn add(&mut self, new: NewElement) -> Result<ElementId> {
        let element = Element::from_new(new);
        element.validate()?;
        let id = self.insert(element);
        self.selection.select(id, false);
        Ok(id)
    }

    /// Merge `patch` into an element. The element is left untouched if the
    /// merged result fails validation.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> Result<()> {
        let element = self.elements.get_mut(&id).ok_or(EditorError::NotFound(id))?;
        let mut updated = element.clone();
        patch.apply(&mut updated);
        updated.validate()?;
        *element = updated;
        Ok(())
    }

    /// Delete an element, drop it from the selection and renumber.
    pub fn remove(&mut self, id: ElementId) -> Result<Element> {
        let element = self.elements.remove(&id).ok_or(EditorError::NotFound(id))?;
        self.order.retain(|&e| e != id);
        self.selection.remove(id);
        self.renumber();
        Ok(element)
    }

    /// Copy an element under a new id, offset, on top of the stack, and
    /// select the copy.
    pub fn duplicate(&mut self, id: ElementId, offset: Vec2) -> Result<ElementId> {
        let copy = self.get(id).ok_or(EditorError::NotFound(id))?.duplicate(offset);
        let copy_id = self.insert(copy);
        self.selection.select(copy_id, false);
        Ok(copy_id)
    }

    /// Move an element in the stack. Returns `Ok(false)` when it is already
    /// at the requested limit.
    pub fn reorder(&mut self, id: ElementId, direction: ReorderDirection) -> Result<bool> {
        let pos = self
            .order
            .iter()
            .position(|&e| e == id)
            .ok_or(EditorError::NotFound(id))?;
        let last = self.order.len() - 1;
        match direction {
            ReorderDirection::Up if pos < last => self.order.swap(pos, pos + 1),
            ReorderDirection::Down if pos > 0 => self.order.swap(pos, pos - 1),
            ReorderDirection::Top if pos < last => {
                let id = self.order.remove(pos);
                self.order.push(id);
            }
            ReorderDirection::Bottom if pos > 0 => {
                let id = self.order.remove(pos);
                self.order.insert(0, id);
            }
            _ => return Ok(false),
        }
        self.renumber();
        Ok(true)
    }

    /// Resize the canvas; both sides must be positive.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(width) && valid(height)) {
            return Err(EditorError::InvalidGeometry(format!(
                "canvas size must be positive, got {width}x{height}"
            )));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Set the background colour.
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Select an existing element (see [`Selection::select`]).
    pub fn select(&mut self, id: ElementId, multi: bool) -> Result<()> {
        if !self.contains(id) {
            return Err(EditorError::NotFound(id));
        }
        self.selection.select(id, multi);
        Ok(())
    }

    /// Replace the selection; ids not in the document are dropped.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        let existing: Vec<ElementId> = ids.into_iter().filter(|id| self.contains(*id)).collect();
        self.selection.set(existing);
    }

    /// Select every element in z-order.
    pub fn select_all(&mut self) {
        self.selection.set(self.order.iter().copied());
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Topmost visible element under `point`.
    pub fn element_at(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.elements.get(id))
            .find(|e| e.visible && e.hit_test(point, tolerance))
            .map(|e| e.id)
    }

    /// Union of the bounding boxes of all visible elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements()
            .filter(|e| e.visible)
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Install `snapshot` as the live document, viewport included.
    ///
    /// The live selection is kept, minus ids the snapshot no longer has. When
    /// the snapshot brings back elements the live document lacks, those
    /// become the selection instead.
    pub(crate) fn restore(&mut self, snapshot: &CanvasDocument) {
        let live = std::mem::replace(self, snapshot.clone());
        let returned: Vec<ElementId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !live.elements.contains_key(id))
            .collect();

        if returned.is_empty() {
            self.selection = live.selection;
            let elements = &self.elements;
            self.selection.retain(|id| elements.contains_key(id));
        } else {
            self.selection.set(returned);
        }
        self.debug_check();
    }

    /// Rewrite every z-index from the order list in one pass.
    fn renumber(&mut self) {
        for (rank, id) in self.order.iter().enumerate() {
            if let Some(element) = self.elements.get_mut(id) {
                element.z_index = rank;
            }
        }
        self.debug_check();
    }

    /// Check the structural invariants: arena and order agree, z-order is
    /// dense, and the selection only references existing elements.
    pub fn is_consistent(&self) -> bool {
        self.elements.len() == self.order.len()
            && self
                .order
                .iter()
                .enumerate()
                .all(|(rank, id)| self.elements.get(id).is_some_and(|e| e.z_index == rank))
            && self.selection.ids().iter().all(|id| self.elements.contains_key(id))
    }

    fn debug_check(&self) {
        debug_assert!(self.is_consistent(), "document invariants violated");
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document. Structural problems surface as typed errors rather
    /// than generic deserialization failures.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: DocumentRecord = serde_json::from_str(json)?;
        Self::try_from(record)
    }
}

/// Serialized form of a document: elements listed in z-order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    width: f64,
    height: f64,
    background: Color,
    #[serde(default)]
    viewport: Viewport,
    #[serde(default)]
    grid: GridSettings,
    elements: Vec<Element>,
    #[serde(default)]
    selected: Vec<ElementId>,
}

impl From<CanvasDocument> for DocumentRecord {
    fn from(mut doc: CanvasDocument) -> Self {
        let elements = doc
            .order
            .iter()
            .filter_map(|id| doc.elements.remove(id))
            .collect();
        Self {
            width: doc.width,
            height: doc.height,
            background: doc.background,
            viewport: doc.viewport,
            grid: doc.grid,
            elements,
            selected: doc.selection.ids().to_vec(),
        }
    }
}

impl TryFrom<DocumentRecord> for CanvasDocument {
    type Error = EditorError;

    fn try_from(record: DocumentRecord) -> Result<Self> {
        let mut doc = CanvasDocument::new(record.width, record.height, record.background);
        doc.set_canvas_size(record.width, record.height)?;
        doc.set_grid(record.grid)?;
        if !record.viewport.is_valid() {
            return Err(EditorError::InvalidDocument(format!(
                "viewport must have a positive zoom and finite pan, got zoom {} pan ({}, {})",
                record.viewport.zoom, record.viewport.pan.x, record.viewport.pan.y
            )));
        }
        doc.viewport = record.viewport;

        let mut seen = HashSet::new();
        for element in record.elements {
            if !seen.insert(element.id) {
                return Err(EditorError::InvalidDocument(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
            element.validate()?;
            doc.insert(element);
        }
        doc.select_many(record.selected);
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_at(x: f64, y: f64) -> NewElement {
        NewElement::rectangle(Point::new(x, y), 100.0, 100.0)
    }

    fn ranks(doc: &CanvasDocument) -> Vec<usize> {
        doc.elements().map(Element::z_index).collect()
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::default();
        assert!(doc.is_empty());
        assert!((doc.width() - 1080.0).abs() < f64::EPSILON);
        assert_eq!(doc.background(), Color::white());
    }

    #[test]
    fn test_add_selects_and_ranks() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(10.0, 10.0)).unwrap();

        assert_eq!(doc.order(), &[a, b]);
        assert_eq!(ranks(&doc), vec![0, 1]);
        assert_eq!(doc.selection().ids(), &[b]);
    }

    #[test]
    fn test_add_rejects_invalid_geometry() {
        let mut doc = CanvasDocument::default();
        let err = doc.add(NewElement::rectangle(Point::ZERO, -5.0, 5.0)).unwrap_err();
        assert!(matches!(err, EditorError::InvalidGeometry(_)));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_remove_renumbers_and_deselects() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(0.0, 0.0)).unwrap();
        let c = doc.add(rect_at(0.0, 0.0)).unwrap();
        doc.select_all();

        doc.remove(b).unwrap();
        assert_eq!(doc.order(), &[a, c]);
        assert_eq!(ranks(&doc), vec![0, 1]);
        assert!(!doc.selection().contains(b));
        assert!(doc.is_consistent());
    }

    #[test]
    fn test_remove_unknown_is_not_found() {
        let mut doc = CanvasDocument::default();
        doc.add(rect_at(0.0, 0.0)).unwrap();
        let before = doc.clone();
        let missing = uuid::Uuid::new_v4();
        assert!(matches!(doc.remove(missing), Err(EditorError::NotFound(id)) if id == missing));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_update_keeps_element_on_invalid_patch() {
        let mut doc = CanvasDocument::default();
        let id = doc.add(rect_at(0.0, 0.0)).unwrap();
        let before = doc.get(id).cloned();

        let patch = ElementPatch::new().position(Point::new(5.0, 5.0)).size(-1.0, 10.0);
        assert!(doc.update(id, &patch).is_err());
        assert_eq!(doc.get(id).cloned(), before);
    }

    #[test]
    fn test_duplicate_goes_on_top() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(10.0, 10.0)).unwrap();
        doc.add(rect_at(0.0, 0.0)).unwrap();

        let copy = doc.duplicate(a, Vec2::new(20.0, 20.0)).unwrap();
        assert_eq!(doc.order().last(), Some(&copy));
        assert_eq!(doc.get(copy).map(|e| e.position), Some(Point::new(30.0, 30.0)));
        assert_eq!(doc.selection().ids(), &[copy]);
    }

    #[test]
    fn test_reorder_all_directions() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(0.0, 0.0)).unwrap();
        let c = doc.add(rect_at(0.0, 0.0)).unwrap();

        assert!(doc.reorder(a, ReorderDirection::Top).unwrap());
        assert_eq!(doc.order(), &[b, c, a]);
        assert_eq!(doc.get(b).unwrap().z_index(), 0);
        assert_eq!(doc.get(c).unwrap().z_index(), 1);
        assert_eq!(doc.get(a).unwrap().z_index(), 2);

        assert!(doc.reorder(a, ReorderDirection::Down).unwrap());
        assert_eq!(doc.order(), &[b, a, c]);

        assert!(doc.reorder(c, ReorderDirection::Bottom).unwrap());
        assert_eq!(doc.order(), &[c, b, a]);

        assert!(doc.reorder(c, ReorderDirection::Up).unwrap());
        assert_eq!(doc.order(), &[b, c, a]);
        assert_eq!(ranks(&doc), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_at_limit_is_noop() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(0.0, 0.0)).unwrap();
        assert!(!doc.reorder(b, ReorderDirection::Top).unwrap());
        assert!(!doc.reorder(a, ReorderDirection::Down).unwrap());
        assert_eq!(doc.order(), &[a, b]);
    }

    #[test]
    fn test_element_at_prefers_topmost() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(50.0, 50.0)).unwrap();

        assert_eq!(doc.element_at(Point::new(75.0, 75.0), 0.0), Some(b));
        assert_eq!(doc.element_at(Point::new(25.0, 25.0), 0.0), Some(a));
        assert_eq!(doc.element_at(Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_element_at_skips_hidden() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(0.0, 0.0)).unwrap();
        doc.update(b, &ElementPatch::new().visible(false)).unwrap();
        assert_eq!(doc.element_at(Point::new(10.0, 10.0), 0.0), Some(a));
    }

    #[test]
    fn test_circle_hit_uses_radius() {
        let mut doc = CanvasDocument::default();
        let c = doc.add(NewElement::circle(Point::new(100.0, 100.0), 10.0)).unwrap();
        assert_eq!(doc.element_at(Point::new(105.0, 105.0), 0.0), Some(c));
        // Inside the bounding box but outside the circle.
        assert_eq!(doc.element_at(Point::new(109.0, 109.0), 0.0), None);
    }

    #[test]
    fn test_select_unknown_is_not_found() {
        let mut doc = CanvasDocument::default();
        assert!(doc.select(uuid::Uuid::new_v4(), false).is_err());
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn test_set_canvas_size_rejects_non_positive() {
        let mut doc = CanvasDocument::default();
        assert!(doc.set_canvas_size(0.0, 100.0).is_err());
        assert!(doc.set_canvas_size(800.0, 600.0).is_ok());
        assert!((doc.height() - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_round_trip_preserves_order_and_selection() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        doc.add(NewElement::text(Point::new(5.0, 5.0), "Hello")).unwrap();
        doc.reorder(a, ReorderDirection::Top).unwrap();
        doc.select(a, false).unwrap();

        let json = doc.to_json().unwrap();
        let back = CanvasDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_json_rejects_duplicate_ids() {
        let mut doc = CanvasDocument::default();
        doc.add(rect_at(0.0, 0.0)).unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        let first = value["elements"][0].clone();
        value["elements"].as_array_mut().unwrap().push(first);

        let err = serde_json::from_value::<CanvasDocument>(value).unwrap_err();
        assert!(err.to_string().contains("duplicate element id"));
    }

    #[test]
    fn test_json_drops_stale_selection_and_renumbers() {
        let json = format!(
            r##"{{
                "width": 500, "height": 400, "background": "#ffffff",
                "elements": [
                    {{"id": "{a}", "position": {{"x": 0, "y": 0}}, "z_index": 7,
                      "style": {{"fill": null, "stroke": "#000000", "stroke_width": 1}},
                      "kind": {{"type": "circle", "radius": 4}}}}
                ],
                "selected": ["{a}", "{b}"]
            }}"##,
            a = uuid::Uuid::new_v4(),
            b = uuid::Uuid::new_v4(),
        );
        let doc = CanvasDocument::from_json(&json).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.selection().len(), 1);
        assert_eq!(ranks(&doc), vec![0]);
        assert!(doc.is_consistent());
    }
    #[test]
    fn test_json_rejects_collapsed_viewport() {
        let mut value = serde_json::to_value(CanvasDocument::default()).unwrap();
        value["viewport"]["zoom"] = serde_json::json!(0.0);
        let err = CanvasDocument::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, EditorError::InvalidDocument(_)));

        value["viewport"]["zoom"] = serde_json::json!(-2.0);
        assert!(CanvasDocument::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_restore_installs_viewport_and_prunes_selection() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let snapshot = doc.clone();
        let b = doc.add(rect_at(200.0, 0.0)).unwrap();
        doc.select_many([a, b]);
        doc.viewport_mut().zoom = 3.0;

        doc.restore(&snapshot);
        assert_eq!(doc.viewport(), snapshot.viewport());
        assert_eq!(doc.selection().ids(), &[a]);
        assert!(!doc.contains(b));
    }

    #[test]
    fn test_restore_selects_returning_elements() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add(rect_at(200.0, 0.0)).unwrap();
        let snapshot = doc.clone();
        doc.remove(a).unwrap();
        doc.remove(b).unwrap();

        doc.restore(&snapshot);
        assert_eq!(doc.selection().ids(), &[a, b]);
    }

    #[test]
    fn test_restore_keeps_live_selection() {
        let mut doc = CanvasDocument::default();
        let a = doc.add(rect_at(0.0, 0.0)).unwrap();
        doc.add(rect_at(200.0, 0.0)).unwrap();
        let snapshot = doc.clone();
        doc.update(a, &ElementPatch::new().opacity(0.5)).unwrap();
        doc.select(a, false).unwrap();

        doc.restore(&snapshot);
        assert_eq!(doc.selection().ids(), &[a]);
        assert!((doc.get(a).unwrap().opacity - 1.0).abs() < f64::EPSILON);
    }
}
