//! Line element.

use super::{Geometry, point_to_segment_dist};
use crate::error::{EditorError, Result};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A straight segment from the element's position to `position + end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Endpoint offset relative to the start point.
    pub end: Vec2,
}

impl Line {
    /// Line ending at `end` relative to its start.
    pub fn new(end: Vec2) -> Self {
        Self { end }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.end.hypot()
    }
}

impl Geometry for Line {
    fn bounds(&self, start: Point) -> Rect {
        Rect::from_points(start, start + self.end)
    }

    fn hit_test(&self, start: Point, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, start, start + self.end) <= tolerance
    }

    fn drag_to(&mut self, origin: Point, current: Point) -> Point {
        self.end = current - origin;
        origin
    }

    fn is_degenerate(&self) -> bool {
        self.end == Vec2::ZERO
    }

    fn validate(&self) -> Result<()> {
        if self.end.is_finite() {
            Ok(())
        } else {
            Err(EditorError::InvalidGeometry("line endpoint must be finite".into()))
        }
    }
}
