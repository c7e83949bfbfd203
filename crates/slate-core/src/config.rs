//! Session configuration.

use crate::elements::Color;
use crate::error::{EditorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of history entries kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default offset applied to duplicated elements on both axes.
pub const DEFAULT_DUPLICATE_OFFSET: f64 = 20.0;

/// Tunables for an editing session.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of history entries; the oldest is evicted beyond this.
    pub history_capacity: usize,
    /// Offset applied to duplicates on both axes.
    pub duplicate_offset: f64,
    /// Canvas width for new documents.
    pub canvas_width: f64,
    /// Canvas height for new documents.
    pub canvas_height: f64,
    /// Background color for new documents.
    pub background: Color,
    /// Extra slack, in canvas units, when hit testing elements.
    pub hit_tolerance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Increment used by zoom in / zoom out.
    pub zoom_step: f64,
    /// Grid spacing for new documents.
    pub grid_size: f64,
    /// Box size given to text placed with a click instead of a drag.
    pub default_text_width: f64,
    pub default_text_height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            canvas_width: 1080.0,
            canvas_height: 1080.0,
            background: Color::white(),
            hit_tolerance: 0.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 0.1,
            grid_size: 20.0,
            default_text_width: 200.0,
            default_text_height: 50.0,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(EditorError::Config("history_capacity must be at least 1".into()));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(EditorError::Config("canvas size must be positive".into()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(EditorError::Config(format!(
                "zoom range is invalid: {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.zoom_step > 0.0) {
            return Err(EditorError::Config("zoom_step must be positive".into()));
        }
        if !(self.grid_size > 0.0) {
            return Err(EditorError::Config("grid_size must be positive".into()));
        }
        if !(self.hit_tolerance >= 0.0 && self.duplicate_offset.is_finite()) {
            return Err(EditorError::Config(
                "hit_tolerance must be non-negative and duplicate_offset finite".into(),
            ));
        }
        if !(self.default_text_width > 0.0 && self.default_text_height > 0.0) {
            return Err(EditorError::Config("default text box must be positive".into()));
        }
        Ok(())
    }
}
