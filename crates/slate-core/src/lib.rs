//! Slate Core Library
//!
//! Platform-agnostic document model, selection, undo/redo history and tool
//! state machine for the Slate canvas editor.

pub mod config;
pub mod document;
pub mod elements;
pub mod error;
pub mod history;
pub mod input;
pub mod selection;
pub mod session;
pub mod snap;
pub mod tools;
pub mod viewport;

pub use config::SessionConfig;
pub use document::{CanvasDocument, ReorderDirection};
pub use elements::{Animation, Color, Element, ElementId, ElementKind, ElementPatch, ElementStyle, NewElement};
pub use error::{EditorError, Result};
pub use history::{HistoryEntry, HistoryLog};
pub use input::{Modifiers, PointerEvent};
pub use selection::Selection;
pub use session::{EditorSession, SessionEvent};
pub use snap::{GridSettings, GRID_SIZE, snap_to_grid};
pub use tools::{Gesture, ToolKind, ToolManager, ToolOutcome};
pub use viewport::Viewport;
