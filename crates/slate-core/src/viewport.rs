//! Viewport zoom and pan.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// View transform for the canvas.
///
/// Converts between screen coordinates and canvas coordinates. It is view
/// state: it travels with exported documents but undo/redo leaves it alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scale factor (1.0 = 100%).
    pub zoom: f64,
    /// Translation offset in screen pixels.
    pub pan: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// 100% zoom with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen-to-canvas transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Map a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Map a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom, clamped to `[min, max]`. Returns true if it changed.
    pub fn set_zoom(&mut self, zoom: f64, min: f64, max: f64) -> bool {
        let zoom = zoom.clamp(min, max);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Zoom keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, zoom: f64, min: f64, max: f64) -> bool {
        let anchor = self.screen_to_canvas(screen_point);
        if !self.set_zoom(zoom, min, max) {
            return false;
        }
        let moved = self.canvas_to_screen(anchor);
        self.pan += screen_point - moved;
        true
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check the transform is finite and invertible.
    pub fn is_valid(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0 && self.pan.is_finite()
    }

    /// Zoom and pan so `content` sits centered in a `view` of the given
    /// screen size, leaving `padding` pixels on each side. Returns true if
    /// the view changed.
    pub fn fit(&mut self, content: Rect, view: Size, padding: f64, min: f64, max: f64) -> bool {
        let available = Size::new(
            (view.width - 2.0 * padding).max(1.0),
            (view.height - 2.0 * padding).max(1.0),
        );
        let mut zoom = f64::INFINITY;
        if content.width() > 0.0 {
            zoom = zoom.min(available.width / content.width());
        }
        if content.height() > 0.0 {
            zoom = zoom.min(available.height / content.height());
        }
        if !zoom.is_finite() {
            zoom = 1.0;
        }

        let before = *self;
        self.zoom = zoom.clamp(min, max);
        let center = content.center();
        self.pan = Vec2::new(
            view.width / 2.0 - center.x * self.zoom,
            view.height / 2.0 - center.y * self.zoom,
        );
        *self != before
    }
}
