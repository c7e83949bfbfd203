//! Circle element.

use super::{Geometry, non_negative};
use crate::error::Result;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A circle anchored at its centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    /// Circle of `radius`.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Geometry for Circle {
    fn bounds(&self, center: Point) -> Rect {
        Rect::new(
            center.x - self.radius,
            center.y - self.radius,
            center.x + self.radius,
            center.y + self.radius,
        )
    }

    fn hit_test(&self, center: Point, point: Point, tolerance: f64) -> bool {
        center.distance(point) <= self.radius + tolerance
    }

    fn drag_to(&mut self, origin: Point, current: Point) -> Point {
        self.radius = origin.distance(current);
        origin
    }

    fn is_degenerate(&self) -> bool {
        self.radius == 0.0
    }

    fn validate(&self) -> Result<()> {
        non_negative("radius", self.radius)
    }
}
