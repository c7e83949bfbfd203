//! Grid settings and grid snapping.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default grid spacing in canvas units.
pub const GRID_SIZE: f64 = 20.0;

/// Grid display and snapping settings stored with the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Whether the renderer should draw the grid.
    pub visible: bool,
    /// Whether gesture points snap to grid intersections.
    pub snap: bool,
    /// Grid spacing.
    pub size: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: false,
            snap: false,
            size: GRID_SIZE,
        }
    }
}

impl GridSettings {
    /// Snap `point` if snapping is enabled, otherwise return it unchanged.
    pub fn apply(&self, point: Point) -> Point {
        if self.snap && self.size > 0.0 {
            snap_to_grid(point, self.size)
        } else {
            point
        }
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}
