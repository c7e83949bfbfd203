//! Pointer input types.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Shift, Ctrl or Cmd extend the selection instead of replacing it.
    pub fn multi_select(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Pointer event in canvas coordinates.
///
/// Callers convert from screen space with
/// [`Viewport::screen_to_canvas`](crate::Viewport::screen_to_canvas).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, modifiers: Modifiers },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the canvas; any gesture in progress is abandoned.
    Leave,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_select_modifiers() {
        assert!(!Modifiers::NONE.multi_select());
        assert!(Modifiers::SHIFT.multi_select());
        let alt_only = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert!(!alt_only.multi_select());
    }
}
