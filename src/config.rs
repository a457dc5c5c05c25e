//! Renderer defaults.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::Result;
use crate::plots::LocalClock;
use crate::quantize::Dither;
use crate::text::BUILTIN_FAMILY;

/// Defaults applied when elements or the canvas leave a setting out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font family used when an element names none.
    pub font_family: String,
    /// Font size used when an element gives none.
    pub font_size: u32,
    /// Dithering used when the canvas gives none.
    pub dither: Dither,
    /// Extra pixels between wrapped text lines.
    pub line_spacing: u32,
    /// Debug grid defaults.
    pub grid: GridDefaults,
    /// Clock used to place plot timestamps.
    pub clock: LocalClock,
    /// Reuse fonts across renders.
    pub font_cache: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: BUILTIN_FAMILY.to_string(),
            font_size: 16,
            dither: Dither::FloydSteinberg,
            line_spacing: 2,
            grid: GridDefaults::default(),
            clock: LocalClock::System,
            font_cache: true,
        }
    }
}

/// Debug grid defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDefaults {
    /// Distance between grid lines in pixels.
    pub spacing: u32,
    /// Dash length in pixels.
    pub dash: u32,
    /// Gap length in pixels.
    pub gap: u32,
    /// Line color name.
    pub color: String,
    /// Label font size.
    pub font_size: u32,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self { spacing: 20, dash: 2, gap: 4, color: "black".to_string(), font_size: 8 }
    }
}

impl GridDefaults {
    /// Resolved line color, black if the name is unknown.
    #[must_use]
    pub fn line_color(&self) -> Rgba {
        Rgba::from_name(&self.color).unwrap_or(Rgba::BLACK)
    }
}

impl RenderConfig {
    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
