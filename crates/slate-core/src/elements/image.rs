//! Image element.

use super::rectangle::box_contains;
use super::{Geometry, non_negative};
use crate::error::Result;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Source-space crop rectangle applied before the image is scaled into its box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An image anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Source reference (URL, data URL or asset key); resolved by the renderer.
    pub src: String,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
}

impl Image {
    /// Uncropped image of the given size.
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            width,
            height,
            crop: None,
        }
    }

    /// Show only `crop` of the source.
    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }
}

impl Geometry for Image {
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
        if let Some(crop) = &self.crop {
            non_negative("crop x", crop.x)?;
            non_negative("crop y", crop.y)?;
            non_negative("crop width", crop.width)?;
            non_negative("crop height", crop.height)?;
        }
        Ok(())
    }
}
