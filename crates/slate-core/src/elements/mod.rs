//! Element definitions for the design canvas.

mod circle;
mod image;
mod line;
mod rectangle;
mod text;

pub use circle::Circle;
pub use image::{CropRect, Image};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{Text, TextAlign};

use crate::error::{EditorError, Result};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// RGBA8 color, serialized as a CSS hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Self::transparent());
        }
        let invalid = || EditorError::Color(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        match hex.len() {
            // #rgb -> #rrggbb
            3 => Ok(Self::rgb(byte(0..1)? * 17, byte(1..2)? * 17, byte(2..3)? * 17)),
            6 => Ok(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Ok(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = EditorError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<peniko::Color> for Color {
    fn from(color: peniko::Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Color> for peniko::Color {
    fn from(color: Color) -> Self {
        peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Fill color (None = no fill).
    pub fill: Option<Color>,
    /// Stroke color (None = no stroke).
    pub stroke: Option<Color>,
    /// Stroke width.
    pub stroke_width: f64,
    /// Alternating dash and gap lengths (None = solid stroke).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dash: Option<Vec<f64>>,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: Some(Color::black()),
            stroke_width: 2.0,
            stroke_dash: None,
        }
    }
}

impl ElementStyle {
    /// The palette new elements of a given kind start with.
    pub fn for_kind(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Rectangle(_) => Self {
                fill: Some(Color::rgb(0x3b, 0x82, 0xf6)),
                stroke: Some(Color::rgb(0x1e, 0x40, 0xaf)),
                stroke_width: 2.0,
                stroke_dash: None,
            },
            ElementKind::Circle(_) => Self {
                fill: Some(Color::rgb(0xef, 0x44, 0x44)),
                stroke: Some(Color::rgb(0xdc, 0x26, 0x26)),
                stroke_width: 2.0,
                stroke_dash: None,
            },
            ElementKind::Text(_) => Self {
                fill: Some(Color::black()),
                stroke: None,
                stroke_width: 0.0,
                stroke_dash: None,
            },
            ElementKind::Image(_) => Self {
                fill: None,
                stroke: None,
                stroke_width: 0.0,
                stroke_dash: None,
            },
            ElementKind::Line(_) => Self::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        non_negative("stroke width", self.stroke_width)?;
        for &dash in self.stroke_dash.iter().flatten() {
            non_negative("stroke dash", dash)?;
        }
        Ok(())
    }
}

/// Entrance animation attached to an element, played by presentation
/// renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Effect name, such as `fade` or `slide-up`.
    #[serde(rename = "type")]
    pub effect: String,
    /// Duration in milliseconds.
    pub duration: f64,
    /// Delay before the effect starts, in milliseconds.
    pub delay: f64,
    /// CSS easing function name.
    pub easing: String,
}

impl Animation {
    /// Effect with no delay and ease-out timing.
    pub fn new(effect: impl Into<String>, duration: f64) -> Self {
        Self {
            effect: effect.into(),
            duration,
            delay: 0.0,
            easing: "ease-out".to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        non_negative("animation duration", self.duration)?;
        non_negative("animation delay", self.delay)
    }
}

/// Geometry behaviour implemented by every element kind.
///
/// `origin` is the owning element's `position`; what it denotes (top-left,
/// centre, start point) is up to the kind.
pub trait Geometry {
    /// Bounding box in canvas coordinates.
    fn bounds(&self, origin: Point) -> Rect;

    /// Check if a point (in canvas coordinates) hits this geometry.
    fn hit_test(&self, origin: Point, point: Point, tolerance: f64) -> bool;

    /// Reshape from a drag gesture and return the element's new position.
    fn drag_to(&mut self, origin: Point, current: Point) -> Point;

    /// True when the geometry has no visible extent.
    fn is_degenerate(&self) -> bool;

    /// Reject negative or non-finite dimensions.
    fn validate(&self) -> Result<()>;
}

/// Kind-specific part of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text(Text),
    Rectangle(Rectangle),
    Circle(Circle),
    Image(Image),
    Line(Line),
}

impl ElementKind {
    fn geometry(&self) -> &dyn Geometry {
        match self {
            ElementKind::Text(g) => g,
            ElementKind::Rectangle(g) => g,
            ElementKind::Circle(g) => g,
            ElementKind::Image(g) => g,
            ElementKind::Line(g) => g,
        }
    }

    fn geometry_mut(&mut self) -> &mut dyn Geometry {
        match self {
            ElementKind::Text(g) => g,
            ElementKind::Rectangle(g) => g,
            ElementKind::Circle(g) => g,
            ElementKind::Image(g) => g,
            ElementKind::Line(g) => g,
        }
    }

    /// Short lowercase name, used in history labels.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Rectangle(_) => "rectangle",
            ElementKind::Circle(_) => "circle",
            ElementKind::Image(_) => "image",
            ElementKind::Line(_) => "line",
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// A single graphical object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Anchor position; see [`ElementKind`] for its meaning per kind.
    pub position: Point,
    /// Rotation in degrees around the element's centre.
    #[serde(default)]
    pub rotation: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub style: ElementStyle,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Stacking rank, kept equal to the index in the document's order list.
    #[serde(default)]
    pub(crate) z_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    pub kind: ElementKind,
}

impl Element {
    /// Build an element from a template, assigning a fresh identifier.
    pub fn from_new(new: NewElement) -> Self {
        Self {
            id: Uuid::new_v4(),
            position: new.position,
            rotation: new.rotation,
            opacity: new.opacity,
            style: new.style,
            visible: new.visible,
            locked: new.locked,
            z_index: 0,
            animation: new.animation,
            kind: new.kind,
        }
    }

    /// Stable identifier, unchanged by edits and undo/redo.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Stacking rank (0 = bottom).
    pub fn z_index(&self) -> usize {
        self.z_index
    }

    /// Axis-aligned bounding box in canvas coordinates, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        self.kind.geometry().bounds(self.position)
    }

    /// Hit test against the element's geometry. Lines widen the tolerance by
    /// half their stroke so thin lines stay clickable.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let tolerance = match self.kind {
            ElementKind::Line(_) => tolerance + self.style.stroke_width / 2.0,
            _ => tolerance,
        };
        self.kind.geometry().hit_test(self.position, point, tolerance)
    }

    /// Reshape the element so it spans from `origin` to `current`.
    pub fn drag_to(&mut self, origin: Point, current: Point) {
        self.position = self.kind.geometry_mut().drag_to(origin, current);
    }

    /// True when a drawn element has no extent and should be discarded.
    pub fn is_degenerate(&self) -> bool {
        self.kind.geometry().is_degenerate()
    }

    /// Translate the element by a delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Copy this element under a new identifier.
    pub fn duplicate(&self, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.position += offset;
        copy
    }

    /// Validate common and kind-specific fields.
    pub fn validate(&self) -> Result<()> {
        if !(self.position.x.is_finite() && self.position.y.is_finite()) {
            return Err(EditorError::InvalidGeometry(format!(
                "position must be finite, got ({}, {})",
                self.position.x, self.position.y
            )));
        }
        if !self.rotation.is_finite() {
            return Err(EditorError::InvalidGeometry("rotation must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(EditorError::InvalidGeometry(format!(
                "opacity must be within [0, 1], got {}",
                self.opacity
            )));
        }
        self.style.validate()?;
        if let Some(animation) = &self.animation {
            animation.validate()?;
        }
        self.kind.geometry().validate()
    }
}

/// Check a dimension is finite and not negative.
pub(crate) fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EditorError::InvalidGeometry(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

/// Properties for an element that has not been added to a document yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    pub position: Point,
    pub rotation: f64,
    pub opacity: f64,
    pub style: ElementStyle,
    pub visible: bool,
    pub locked: bool,
    pub animation: Option<Animation>,
    pub kind: ElementKind,
}

impl NewElement {
    /// Create a template with the default palette for its kind.
    pub fn new(position: Point, kind: ElementKind) -> Self {
        Self {
            position,
            rotation: 0.0,
            opacity: 1.0,
            style: ElementStyle::for_kind(&kind),
            visible: true,
            locked: false,
            animation: None,
            kind,
        }
    }

    /// Rectangle with its top-left at `position`.
    pub fn rectangle(position: Point, width: f64, height: f64) -> Self {
        Self::new(position, ElementKind::Rectangle(Rectangle::new(width, height)))
    }

    /// Circle centred on `center`.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(center, ElementKind::Circle(Circle::new(radius)))
    }

    /// Text box with its top-left at `position`.
    pub fn text(position: Point, content: impl Into<String>) -> Self {
        Self::new(position, ElementKind::Text(Text::new(content)))
    }

    /// Image with its top-left at `position`.
    pub fn image(position: Point, src: impl Into<String>, width: f64, height: f64) -> Self {
        Self::new(position, ElementKind::Image(Image::new(src, width, height)))
    }

    /// Line from `start` to `end`.
    pub fn line(start: Point, end: Point) -> Self {
        Self::new(start, ElementKind::Line(Line::new(end - start)))
    }

    /// Replace the default style for the kind.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// Rotation in degrees.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Opacity in `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Attach an entrance effect.
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// A partial update merged into an existing element.
///
/// Kind-specific fields that do not apply to the target's kind are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub fill: Option<Option<Color>>,
    pub stroke: Option<Option<Color>>,
    pub stroke_width: Option<f64>,
    pub stroke_dash: Option<Option<Vec<f64>>>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub animation: Option<Option<Animation>>,
    /// Rectangle, Text and Image.
    pub width: Option<f64>,
    /// Rectangle, Text and Image.
    pub height: Option<f64>,
    pub corner_radius: Option<f64>,
    pub radius: Option<f64>,
    pub content: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub align: Option<TextAlign>,
    pub line_height: Option<f64>,
    pub src: Option<String>,
    pub crop: Option<Option<CropRect>>,
    pub end: Option<Vec2>,
}

impl ElementPatch {
    /// Empty patch; applies nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `position`.
    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Resize a box-shaped kind.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set a circle's radius.
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set or clear the fill.
    pub fn fill(mut self, fill: Option<Color>) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set the opacity.
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Set (or with `None` clear) the dash pattern.
    pub fn stroke_dash(mut self, dash: Option<Vec<f64>>) -> Self {
        self.stroke_dash = Some(dash);
        self
    }

    /// Set or clear the entrance effect.
    pub fn animation(mut self, animation: Option<Animation>) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Replace a text element's content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Show or hide.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Lock or unlock.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    /// Merge the set fields into `element`. Does not validate.
    pub fn apply(&self, element: &mut Element) {
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity;
        }
        if let Some(fill) = self.fill {
            element.style.fill = fill;
        }
        if let Some(stroke) = self.stroke {
            element.style.stroke = stroke;
        }
        if let Some(stroke_width) = self.stroke_width {
            element.style.stroke_width = stroke_width;
        }
        if let Some(visible) = self.visible {
            element.visible = visible;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
        assign(&mut element.style.stroke_dash, self.stroke_dash.clone());
        assign(&mut element.animation, self.animation.clone());

        match &mut element.kind {
            ElementKind::Rectangle(rect) => {
                assign(&mut rect.width, self.width);
                assign(&mut rect.height, self.height);
                assign(&mut rect.corner_radius, self.corner_radius);
            }
            ElementKind::Circle(circle) => {
                assign(&mut circle.radius, self.radius);
            }
            ElementKind::Text(text) => {
                assign(&mut text.width, self.width);
                assign(&mut text.height, self.height);
                assign(&mut text.content, self.content.clone());
                assign(&mut text.font_family, self.font_family.clone());
                assign(&mut text.font_size, self.font_size);
                assign(&mut text.font_weight, self.font_weight);
                assign(&mut text.align, self.align);
                assign(&mut text.line_height, self.line_height);
            }
            ElementKind::Image(image) => {
                assign(&mut image.width, self.width);
                assign(&mut image.height, self.height);
                assign(&mut image.src, self.src.clone());
                assign(&mut image.crop, self.crop);
            }
            ElementKind::Line(line) => {
                assign(&mut line.end, self.end);
            }
        }
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}
