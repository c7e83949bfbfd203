//! Rectangle element.

use super::{Geometry, non_negative};
use crate::error::Result;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A rectangle anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl Rectangle {
    /// Square-cornered rectangle.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            corner_radius: 0.0,
        }
    }
}

impl Geometry for Rectangle {
    fn bounds(&self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, origin.x + self.width, origin.y + self.height)
    }

    fn hit_test(&self, origin: Point, point: Point, tolerance: f64) -> bool {
        box_contains(self.bounds(origin), point, tolerance)
    }

    fn drag_to(&mut self, origin: Point, current: Point) -> Point {
        let rect = Rect::from_points(origin, current);
        self.width = rect.width();
        self.height = rect.height();
        rect.origin()
    }

    fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    fn validate(&self) -> Result<()> {
        non_negative("width", self.width)?;
        non_negative("height", self.height)?;
        non_negative("corner radius", self.corner_radius)
    }
}

/// Inclusive point-in-box test used by the box-shaped kinds.
pub(super) fn box_contains(bounds: Rect, point: Point, tolerance: f64) -> bool {
    let b = bounds.inflate(tolerance, tolerance);
    point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
}
