//! Tool modes and pointer gestures.
//!
//! The tool manager turns pointer events into document changes. Everything
//! it does mid-gesture is transient: the document is edited in place but no
//! history entry is produced. Finishing a gesture returns
//! [`ToolOutcome::Commit`], and the session records exactly one entry for it.

use crate::config::SessionConfig;
use crate::document::CanvasDocument;
use crate::elements::{
    Circle, Element, ElementId, ElementKind, ElementStyle, Image, Line, NewElement, Rectangle, Text,
};
use crate::input::Modifiers;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Text,
    Rectangle,
    Circle,
    Image,
    Line,
    Pan,
}

impl ToolKind {
    /// Whether this tool creates elements by dragging.
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            ToolKind::Text | ToolKind::Rectangle | ToolKind::Circle | ToolKind::Image | ToolKind::Line
        )
    }
}

/// An in-progress pointer interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Sizing a freshly created element.
    Drawing {
        origin: Point,
        current: Point,
        element: ElementId,
    },
    /// Dragging an existing element.
    Moving {
        element: ElementId,
        origin: Point,
        current: Point,
        start_position: Point,
    },
    /// Dragging the viewport. `last` is in screen coordinates.
    Panning { last: Point },
}

/// What a pointer event did, so the session knows what to record.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The event had no effect.
    Ignored,
    /// Elements changed transiently; nothing to commit yet.
    Transient,
    /// Only the selection changed.
    SelectionChanged,
    /// Only the viewport changed.
    ViewportChanged,
    /// A gesture finished; commit one history entry with this label.
    Commit(String),
    /// A gesture was abandoned and its transient changes rolled back.
    Discarded,
}

/// Tracks the active tool and its gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    current_tool: ToolKind,
    gesture: Option<Gesture>,
    /// Source used by the image tool; without one the tool does nothing.
    pub image_source: Option<String>,
    /// Style for newly drawn elements (None = the kind's default palette).
    pub style_override: Option<ElementStyle>,
}

impl ToolManager {
    /// Idle manager with the select tool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active tool.
    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    /// Gesture in progress, if any.
    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Switch tools. The gesture must already be finished or cancelled.
    pub(crate) fn set_tool(&mut self, tool: ToolKind) {
        debug_assert!(self.gesture.is_none(), "tool switched mid-gesture");
        self.current_tool = tool;
        self.gesture = None;
    }

    pub(crate) fn pointer_down(
        &mut self,
        doc: &mut CanvasDocument,
        point: Point,
        modifiers: Modifiers,
        config: &SessionConfig,
    ) -> ToolOutcome {
        if self.gesture.is_some() {
            // Missed pointer-up; drop the stale gesture before starting over.
            self.cancel(doc);
        }

        match self.current_tool {
            ToolKind::Select => self.begin_select(doc, point, modifiers, config),
            ToolKind::Pan => {
                self.gesture = Some(Gesture::Panning {
                    last: doc.viewport().canvas_to_screen(point),
                });
                ToolOutcome::Ignored
            }
            tool => self.begin_drawing(doc, tool, point),
        }
    }

    pub(crate) fn pointer_move(&mut self, doc: &mut CanvasDocument, point: Point) -> ToolOutcome {
        let Some(gesture) = self.gesture.as_mut() else {
            return ToolOutcome::Ignored;
        };

        match gesture {
            Gesture::Drawing {
                origin,
                current,
                element,
            } => {
                *current = doc.grid().apply(point);
                let (origin, current) = (*origin, *current);
                match doc.get_mut(*element) {
                    Some(el) => {
                        el.drag_to(origin, current);
                        ToolOutcome::Transient
                    }
                    None => ToolOutcome::Ignored,
                }
            }
            Gesture::Moving {
                element,
                origin,
                current,
                start_position,
            } => {
                *current = point;
                let target = doc.grid().apply(*start_position + (point - *origin));
                match doc.get_mut(*element) {
                    Some(el) => {
                        el.position = target;
                        ToolOutcome::Transient
                    }
                    None => ToolOutcome::Ignored,
                }
            }
            Gesture::Panning { last } => {
                let screen = doc.viewport().canvas_to_screen(point);
                let delta: Vec2 = screen - *last;
                *last = screen;
                doc.viewport_mut().pan_by(delta);
                ToolOutcome::ViewportChanged
            }
        }
    }

    pub(crate) fn pointer_up(
        &mut self,
        doc: &mut CanvasDocument,
        point: Point,
        config: &SessionConfig,
    ) -> ToolOutcome {
        // Apply the release position as the final move.
        let last = self.pointer_move(doc, point);
        let Some(gesture) = self.gesture.take() else {
            return ToolOutcome::Ignored;
        };

        match gesture {
            Gesture::Drawing { element, .. } => self.finish_drawing(doc, element, config),
            Gesture::Moving {
                element,
                start_position,
                ..
            } => match doc.get(element) {
                Some(el) if el.position != start_position => {
                    log::debug!("Moved element {element}");
                    ToolOutcome::Commit("Move element".to_string())
                }
                _ => ToolOutcome::Ignored,
            },
            Gesture::Panning { .. } => last,
        }
    }

    /// Abandon the gesture and roll back its transient changes.
    pub(crate) fn cancel(&mut self, doc: &mut CanvasDocument) -> ToolOutcome {
        match self.gesture.take() {
            Some(Gesture::Drawing { element, .. }) => {
                log::debug!("Cancelled drawing of {element}");
                // Missing only if something else already removed it.
                let _ = doc.remove(element);
                ToolOutcome::Discarded
            }
            Some(Gesture::Moving {
                element,
                start_position,
                ..
            }) => {
                if let Some(el) = doc.get_mut(element) {
                    el.position = start_position;
                }
                ToolOutcome::Discarded
            }
            Some(Gesture::Panning { .. }) | None => ToolOutcome::Ignored,
        }
    }

    fn begin_select(
        &mut self,
        doc: &mut CanvasDocument,
        point: Point,
        modifiers: Modifiers,
        config: &SessionConfig,
    ) -> ToolOutcome {
        let multi = modifiers.multi_select();
        let Some(id) = doc.element_at(point, config.hit_tolerance) else {
            if multi || doc.selection().is_empty() {
                return ToolOutcome::Ignored;
            }
            doc.clear_selection();
            return ToolOutcome::SelectionChanged;
        };

        if doc.select(id, multi).is_err() {
            return ToolOutcome::Ignored;
        }
        if let Some(el) = doc.get(id) {
            if doc.selection().contains(id) && !el.locked {
                self.gesture = Some(Gesture::Moving {
                    element: id,
                    origin: point,
                    current: point,
                    start_position: el.position,
                });
            }
        }
        ToolOutcome::SelectionChanged
    }

    fn begin_drawing(&mut self, doc: &mut CanvasDocument, tool: ToolKind, point: Point) -> ToolOutcome {
        let kind = match tool {
            ToolKind::Rectangle => ElementKind::Rectangle(Rectangle::new(0.0, 0.0)),
            ToolKind::Circle => ElementKind::Circle(Circle::new(0.0)),
            ToolKind::Line => ElementKind::Line(Line::new(Vec2::ZERO)),
            ToolKind::Text => {
                let mut text = Text::new(String::new());
                text.width = 0.0;
                text.height = 0.0;
                ElementKind::Text(text)
            }
            ToolKind::Image => match &self.image_source {
                Some(src) => ElementKind::Image(Image::new(src.clone(), 0.0, 0.0)),
                None => {
                    log::warn!("Image tool used without an image source");
                    return ToolOutcome::Ignored;
                }
            },
            ToolKind::Select | ToolKind::Pan => return ToolOutcome::Ignored,
        };

        let origin = doc.grid().apply(point);
        let mut new = NewElement::new(origin, kind);
        if let Some(style) = &self.style_override {
            new.style = style.clone();
        }
        let element = doc.insert(Element::from_new(new));
        log::debug!("Started drawing {:?} {element} at ({}, {})", tool, origin.x, origin.y);

        self.gesture = Some(Gesture::Drawing {
            origin,
            current: origin,
            element,
        });
        ToolOutcome::Transient
    }

    fn finish_drawing(
        &mut self,
        doc: &mut CanvasDocument,
        id: ElementId,
        config: &SessionConfig,
    ) -> ToolOutcome {
        let Some(el) = doc.get_mut(id) else {
            return ToolOutcome::Ignored;
        };

        if el.is_degenerate() {
            if let ElementKind::Text(text) = &mut el.kind {
                // A click places a default-sized text box.
                text.width = config.default_text_width;
                text.height = config.default_text_height;
            } else {
                log::debug!("Discarding degenerate {} {id}", el.kind.name());
                let _ = doc.remove(id);
                return ToolOutcome::Discarded;
            }
        }

        let label = format!("Add {}", el.kind.name());
        doc.clear_selection();
        let _ = doc.select(id, false);
        self.current_tool = ToolKind::Select;
        ToolOutcome::Commit(label)
    }
}
