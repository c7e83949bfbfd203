//! Text element.

use super::rectangle::box_contains;
use super::{Geometry, non_negative};
use crate::error::{EditorError, Result};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Horizontal alignment of text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A text box anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The text content (may be empty).
    pub content: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// CSS-style numeric weight (400 = regular, 700 = bold).
    #[serde(default = "default_font_weight")]
    pub font_weight: u16,
    #[serde(default)]
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
    /// Layout box width.
    pub width: f64,
    /// Layout box height.
    pub height: f64,
}

fn default_font_weight() -> u16 {
    400
}

fn default_line_height() -> f64 {
    1.2
}

impl Text {
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    pub const DEFAULT_FONT_SIZE: f64 = 24.0;
    pub const DEFAULT_WIDTH: f64 = 200.0;
    pub const DEFAULT_HEIGHT: f64 = 50.0;

    /// Text with default font and a 200x50 box.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: default_font_weight(),
            align: TextAlign::default(),
            line_height: default_line_height(),
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    /// Override the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Override the alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

impl Geometry for Text {
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
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(EditorError::InvalidGeometry(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        non_negative("line height", self.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_defaults() {
        let text = Text::new("Hello");
        assert_eq!(text.content, "Hello");
        assert_eq!(text.font_family, "Arial");
        assert!((text.font_size - Text::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
        assert_eq!(text.align, TextAlign::Left);
    }

    #[test]
    fn test_empty_content_is_valid() {
        assert!(Text::new("").validate().is_ok());
    }

    #[test]
    fn test_zero_font_size_rejected() {
        assert!(Text::new("x").with_font_size(0.0).validate().is_err());
    }

    #[test]
    fn test_align_serializes_lowercase() {
        let json = serde_json::to_string(&TextAlign::Center).unwrap();
        assert_eq!(json, "\"center\"");
    }
}
