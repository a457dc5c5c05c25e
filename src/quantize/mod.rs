//! Color quantization to device palettes.
//!
//! Maps the composited RGBA raster to firmware palette indices. Transparent
//! and translucent pixels are flattened onto white first.

mod dither;
mod palette;

pub use dither::Dither;
pub use palette::{Palette, PaletteId};

use tracing::trace;

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;

/// One palette index per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRaster {
    width: u32,
    height: u32,
    palette: PaletteId,
    indices: Vec<u8>,
}

impl IndexedRaster {
    /// Wrap an index buffer, e.g. the raster currently shown on a panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is zero, the buffer length does not match,
    /// or an index is outside the palette.
    pub fn from_indices(width: u32, height: u32, palette: PaletteId, indices: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || indices.len() != (width as usize) * (height as usize) {
            return Err(Error::InvalidDimensions { width, height });
        }
        let slots = palette.palette().len();
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= slots) {
            return Err(Error::InvalidRaster(format!("index {bad} outside palette {palette}")));
        }
        Ok(Self { width, height, palette, indices })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Palette the indices refer to.
    #[must_use]
    pub const fn palette(&self) -> PaletteId {
        self.palette
    }

    /// Raw index buffer.
    #[must_use]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Index at (x, y).
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.indices.get((y as usize) * (self.width as usize) + x as usize).copied()
    }

    /// Pixel count per palette slot.
    #[must_use]
    pub fn histogram(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette.palette().len()];
        for &i in &self.indices {
            if let Some(c) = counts.get_mut(i as usize) {
                *c += 1;
            }
        }
        counts
    }
}

/// Quantize `fb` to `palette` with `dither`.
///
/// # Example
///
/// ```
/// use epd_render::color::Rgba;
/// use epd_render::framebuffer::Framebuffer;
/// use epd_render::quantize::{quantize, Dither, PaletteId};
///
/// let mut fb = Framebuffer::new(4, 4).unwrap();
/// fb.clear(Rgba::RED);
/// let raster = quantize(&fb, PaletteId::Bwr, Dither::FloydSteinberg);
/// assert!(raster.indices().iter().all(|&i| i == 2));
/// ```
#[must_use]
pub fn quantize(fb: &Framebuffer, palette: PaletteId, dither: Dither) -> IndexedRaster {
    let (width, height) = (fb.width() as usize, fb.height() as usize);
    let mut rgb = Vec::with_capacity(width * height);
    for y in 0..fb.height() {
        let Some(row) = fb.row(y) else { continue };
        rgb.extend(row.chunks_exact(4).map(|px| flatten_on_white([px[0], px[1], px[2], px[3]])));
    }

    let table = palette.palette();
    let indices = dither::apply(rgb, width, height, &table, dither);
    let raster = IndexedRaster { width: fb.width(), height: fb.height(), palette, indices };
    trace!(palette = %palette, dither = dither.name(), histogram = ?raster.histogram(), "quantized");
    raster
}

/// Composite a straight-alpha pixel over white.
fn flatten_on_white(px: [u8; 4]) -> [i32; 3] {
    let a = i32::from(px[3]);
    let mix = |c: u8| (i32::from(c) * a + 255 * (255 - a) + 127) / 255;
    [mix(px[0]), mix(px[1]), mix(px[2])]
}
