//! Editing session: the document, its history and the active tool.

use crate::config::SessionConfig;
use crate::document::{CanvasDocument, ReorderDirection};
use crate::elements::{Color, Element, ElementId, ElementPatch, ElementStyle, NewElement};
use crate::error::{EditorError, Result};
use crate::history::HistoryLog;
use crate::input::{Modifiers, PointerEvent};
use crate::snap::GridSettings;
use crate::tools::{ToolKind, ToolManager, ToolOutcome};
use kurbo::{Point, Rect, Size, Vec2};

/// Label of the entry every history starts from.
const INITIAL_LABEL: &str = "Initial";

/// Screen padding kept around content by [`EditorSession::fit_to_content`].
const FIT_PADDING: f64 = 20.0;

/// Notification for views observing the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A history entry was recorded.
    Committed { label: String },
    /// The edit with this label was undone.
    Undone { label: String },
    /// The edit with this label was redone.
    Redone { label: String },
    SelectionChanged,
    ToolChanged(ToolKind),
    ViewportChanged,
    /// A document was imported and history restarted.
    Imported,
    /// The session was cleared back to an empty document.
    Reset,
}

/// An editing session over one canvas document.
///
/// Every committed command leaves exactly one history entry; read-only
/// queries and selection or viewport changes leave none. Commands that fail
/// leave both the document and the history untouched.
#[derive(Debug)]
pub struct EditorSession {
    config: SessionConfig,
    document: CanvasDocument,
    history: HistoryLog,
    tools: ToolManager,
    revision: u64,
    dirty: bool,
    events: Vec<SessionEvent>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::from_parts(SessionConfig::default())
    }
}

impl EditorSession {
    /// Create a session with default settings and an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with custom settings.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: SessionConfig) -> Self {
        let document = CanvasDocument::from_config(&config);
        let history = HistoryLog::with_initial(config.history_capacity, document.clone(), INITIAL_LABEL);
        Self {
            config,
            document,
            history,
            tools: ToolManager::new(),
            revision: 0,
            dirty: false,
            events: Vec::new(),
        }
    }

    /// Settings the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only view of the live document.
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    /// Undo/redo log, for history panels.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Active tool and gesture state.
    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Counter bumped on every observable change, transient ones included.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the document changed since the last [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the document has been saved.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn emit(&mut self, event: SessionEvent) {
        self.touch();
        self.events.push(event);
    }

    fn commit(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.history.commit(self.document.clone(), label.clone());
        self.dirty = true;
        self.emit(SessionEvent::Committed { label });
    }

    /// Abandon an in-progress gesture so its transient state never reaches
    /// a snapshot.
    fn settle(&mut self) {
        if self.tools.is_active() {
            self.tools.cancel(&mut self.document);
            self.touch();
        }
    }

    // --- Element commands ---

    /// Add an element on top of the stack and select it.
    pub fn add_element(&mut self, new: NewElement) -> Result<ElementId> {
        self.settle();
        let id = self
            .document
            .add(new)
            .inspect_err(|e| log::warn!("Rejected new element: {e}"))?;
        let label = self.document.get(id).map_or("element", |el| el.kind.name());
        self.commit(format!("Add {label}"));
        Ok(id)
    }

    /// Merge `patch` into an element.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<()> {
        self.settle();
        self.document
            .update(id, patch)
            .inspect_err(|e| log::warn!("Rejected update of {id}: {e}"))?;
        self.commit("Update element");
        Ok(())
    }

    /// Delete an element and return it.
    pub fn remove_element(&mut self, id: ElementId) -> Result<Element> {
        self.settle();
        let element = self
            .document
            .remove(id)
            .inspect_err(|e| log::warn!("Rejected removal: {e}"))?;
        self.commit(format!("Delete {}", element.kind.name()));
        Ok(element)
    }

    /// Duplicate an element with the configured offset and select the copy.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<ElementId> {
        self.settle();
        let copy = self
            .document
            .duplicate(id, self.duplicate_offset())
            .inspect_err(|e| log::warn!("Rejected duplicate: {e}"))?;
        self.commit("Duplicate element");
        Ok(copy)
    }

    /// Change an element's stacking position. Returns false, without a
    /// history entry, when it is already at the limit.
    pub fn reorder(&mut self, id: ElementId, direction: ReorderDirection) -> Result<bool> {
        self.settle();
        let moved = self
            .document
            .reorder(id, direction)
            .inspect_err(|e| log::warn!("Rejected reorder: {e}"))?;
        if moved {
            self.commit(match direction {
                ReorderDirection::Up => "Bring forward",
                ReorderDirection::Down => "Send backward",
                ReorderDirection::Top => "Bring to front",
                ReorderDirection::Bottom => "Send to back",
            });
        }
        Ok(moved)
    }

    /// Show or hide an element. Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: ElementId) -> Result<bool> {
        let visible = !self.document.get(id).ok_or(EditorError::NotFound(id))?.visible;
        self.update_element(id, &ElementPatch::new().visible(visible))?;
        Ok(visible)
    }

    /// Lock or unlock an element. Returns the new lock state.
    pub fn toggle_lock(&mut self, id: ElementId) -> Result<bool> {
        let locked = !self.document.get(id).ok_or(EditorError::NotFound(id))?.locked;
        self.update_element(id, &ElementPatch::new().locked(locked))?;
        Ok(locked)
    }

    /// Delete every selected element as a single edit. Returns how many
    /// were removed.
    pub fn delete_selected(&mut self) -> usize {
        self.settle();
        let ids = self.document.selection().ids().to_vec();
        let removed = ids
            .into_iter()
            .filter(|&id| self.document.remove(id).is_ok())
            .count();
        if removed > 0 {
            self.commit(format!("Delete {removed} element(s)"));
        }
        removed
    }

    /// Duplicate every selected element as a single edit; the copies become
    /// the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        self.settle();
        let offset = self.duplicate_offset();
        let ids = self.document.selection().ids().to_vec();
        let copies: Vec<ElementId> = ids
            .into_iter()
            .filter_map(|id| self.document.duplicate(id, offset).ok())
            .collect();
        if !copies.is_empty() {
            self.document.select_many(copies.iter().copied());
            self.commit(format!("Duplicate {} element(s)", copies.len()));
        }
        copies
    }

    fn duplicate_offset(&self) -> Vec2 {
        Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset)
    }

    // --- Canvas commands ---

    /// Resize the canvas. Both sides must be positive.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.settle();
        self.document
            .set_canvas_size(width, height)
            .inspect_err(|e| log::warn!("Rejected canvas size: {e}"))?;
        self.commit("Resize canvas");
        Ok(())
    }

    /// Change the canvas background.
    pub fn set_background_color(&mut self, color: Color) {
        self.settle();
        self.document.set_background(color);
        self.commit("Change background");
    }

    /// Change grid visibility, snapping or spacing.
    pub fn set_grid(&mut self, grid: GridSettings) -> Result<()> {
        self.settle();
        self.document
            .set_grid(grid)
            .inspect_err(|e| log::warn!("Rejected grid settings: {e}"))?;
        self.commit("Change grid");
        Ok(())
    }

    /// Clear everything back to an empty document with a fresh history.
    pub fn reset(&mut self) {
        self.tools.cancel(&mut self.document);
        self.document = CanvasDocument::from_config(&self.config);
        self.history.reset(self.document.clone(), INITIAL_LABEL);
        self.dirty = false;
        log::info!("Session reset");
        self.emit(SessionEvent::Reset);
    }

    // --- Selection ---

    /// Select an element, or toggle it when `multi` is set.
    pub fn select(&mut self, id: ElementId, multi: bool) -> Result<()> {
        self.document
            .select(id, multi)
            .inspect_err(|e| log::warn!("Rejected selection: {e}"))?;
        self.emit(SessionEvent::SelectionChanged);
        Ok(())
    }

    /// Replace the selection; unknown ids are dropped.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.document.select_many(ids);
        self.emit(SessionEvent::SelectionChanged);
    }

    /// Select every element.
    pub fn select_all(&mut self) {
        self.document.select_all();
        self.emit(SessionEvent::SelectionChanged);
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.document.clear_selection();
        self.emit(SessionEvent::SelectionChanged);
    }

    // --- History ---

    /// Check if there is an edit to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if there is an undone edit to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.try_undo().is_ok()
    }

    /// Step forward one edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.try_redo().is_ok()
    }

    /// Like [`undo`](Self::undo), but reports an exhausted history as
    /// [`EditorError::HistoryEmpty`].
    pub fn try_undo(&mut self) -> Result<()> {
        self.settle();
        let label = self.history.current().map(|e| e.label().to_string());
        let entry = self.history.undo().ok_or(EditorError::HistoryEmpty)?;
        self.document.restore(entry.document());
        self.dirty = true;
        let label = label.unwrap_or_default();
        log::debug!("Undo '{label}'");
        self.emit(SessionEvent::Undone { label });
        Ok(())
    }

    /// Like [`redo`](Self::redo), but reports the newest entry as
    /// [`EditorError::HistoryEmpty`].
    pub fn try_redo(&mut self) -> Result<()> {
        self.settle();
        let entry = self.history.redo().ok_or(EditorError::HistoryEmpty)?;
        self.document.restore(entry.document());
        let label = entry.label().to_string();
        self.dirty = true;
        log::debug!("Redo '{label}'");
        self.emit(SessionEvent::Redone { label });
        Ok(())
    }

    // --- Tools ---

    /// The active tool.
    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    /// Switch tools, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.settle();
        self.tools.set_tool(tool);
        self.emit(SessionEvent::ToolChanged(tool));
    }

    /// Source placed by the image tool.
    pub fn set_image_source(&mut self, src: Option<String>) {
        self.tools.image_source = src;
    }

    /// Style used for newly drawn elements; `None` restores per-kind defaults.
    pub fn set_draw_style(&mut self, style: Option<ElementStyle>) {
        self.tools.style_override = style;
    }

    /// Dispatch a pointer event to the active tool.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> ToolOutcome {
        match event {
            PointerEvent::Down { position, modifiers } => self.pointer_down(position, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
            PointerEvent::Leave => self.pointer_cancel(),
        }
    }

    /// Start a gesture at a canvas point.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> ToolOutcome {
        let outcome = self
            .tools
            .pointer_down(&mut self.document, point, modifiers, &self.config);
        self.apply_outcome(outcome)
    }

    /// Pointer moved; updates the active gesture.
    pub fn pointer_move(&mut self, point: Point) -> ToolOutcome {
        let outcome = self.tools.pointer_move(&mut self.document, point);
        self.apply_outcome(outcome)
    }

    /// Finish the gesture, committing at most one history entry.
    pub fn pointer_up(&mut self, point: Point) -> ToolOutcome {
        let tool = self.tools.current_tool();
        let outcome = self.tools.pointer_up(&mut self.document, point, &self.config);
        let outcome = self.apply_outcome(outcome);
        if self.tools.current_tool() != tool {
            self.emit(SessionEvent::ToolChanged(self.tools.current_tool()));
        }
        outcome
    }

    /// Abandon the current gesture; nothing is committed.
    pub fn pointer_cancel(&mut self) -> ToolOutcome {
        let outcome = self.tools.cancel(&mut self.document);
        self.apply_outcome(outcome)
    }

    fn apply_outcome(&mut self, outcome: ToolOutcome) -> ToolOutcome {
        match &outcome {
            ToolOutcome::Ignored => {}
            ToolOutcome::Transient | ToolOutcome::Discarded => self.touch(),
            ToolOutcome::SelectionChanged => self.emit(SessionEvent::SelectionChanged),
            ToolOutcome::ViewportChanged => self.emit(SessionEvent::ViewportChanged),
            ToolOutcome::Commit(label) => self.commit(label.clone()),
        }
        outcome
    }

    // --- Viewport ---

    /// Set the zoom level, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        if self.document.viewport_mut().set_zoom(zoom, min, max) {
            self.emit(SessionEvent::ViewportChanged);
        }
    }

    /// Zoom in by the configured step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.document.viewport().zoom + self.config.zoom_step);
    }

    /// Zoom out by the configured step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.document.viewport().zoom - self.config.zoom_step);
    }

    /// Zoom keeping `screen_point` fixed on screen.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64) {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        if self.document.viewport_mut().zoom_at(screen_point, zoom, min, max) {
            self.emit(SessionEvent::ViewportChanged);
        }
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.document.viewport_mut().pan_by(delta);
        self.emit(SessionEvent::ViewportChanged);
    }

    /// Back to 100% with no pan.
    pub fn reset_view(&mut self) {
        self.document.viewport_mut().reset();
        self.emit(SessionEvent::ViewportChanged);
    }

    /// Zoom and pan so every visible element fits a view of `view` screen
    /// pixels. An empty document fits the whole canvas instead.
    pub fn fit_to_content(&mut self, view: Size) {
        let content = self
            .document
            .bounds()
            .unwrap_or_else(|| Rect::new(0.0, 0.0, self.document.width(), self.document.height()));
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        if self.document.viewport_mut().fit(content, view, FIT_PADDING, min, max) {
            self.emit(SessionEvent::ViewportChanged);
        }
    }

    // --- Import / export ---

    /// Copy of the live document.
    pub fn export_document(&self) -> CanvasDocument {
        self.document.clone()
    }

    /// Replace the document and restart history from it.
    pub fn import_document(&mut self, document: CanvasDocument) -> Result<()> {
        if !document.is_consistent() {
            log::warn!("Rejected inconsistent document");
            return Err(EditorError::InvalidDocument(
                "element order, z-indices or selection disagree".to_string(),
            ));
        }
        for element in document.elements() {
            element.validate()?;
        }
        if !document.viewport().is_valid() {
            log::warn!("Rejected document with an unusable viewport");
            return Err(EditorError::InvalidDocument(
                "viewport must have a positive zoom and finite pan".to_string(),
            ));
        }

        let mut document = document;
        let zoom = document.viewport().zoom;
        document
            .viewport_mut()
            .set_zoom(zoom, self.config.min_zoom, self.config.max_zoom);

        self.tools.cancel(&mut self.document);
        self.document = document;
        self.history.reset(self.document.clone(), "Import");
        self.dirty = false;
        log::info!("Imported document with {} element(s)", self.document.len());
        self.emit(SessionEvent::Imported);
        Ok(())
    }

    /// Serialize the live document.
    pub fn export_json(&self) -> Result<String> {
        self.document.to_json()
    }

    /// Parse and import a document, restarting history.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let document = CanvasDocument::from_json(json).inspect_err(|e| log::warn!("Rejected import: {e}"))?;
        self.import_document(document)
    }
}
