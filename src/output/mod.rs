//! Render results and encoders (indexed PNG, refresh hints).

mod png_encoder;
mod refresh;

pub use png_encoder::PngEncoder;
pub use refresh::RefreshScope;

use crate::error::RenderWarning;
use crate::quantize::{IndexedRaster, PaletteId};

/// Result of one render request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// Quantized raster in firmware palette indices.
    pub raster: IndexedRaster,
    /// Palette the raster uses.
    pub palette: PaletteId,
    /// Non-fatal problems in input order (canvas warnings first).
    pub warnings: Vec<RenderWarning>,
    /// Region that changed relative to the previously displayed raster.
    pub refresh: RefreshScope,
}
