//! Refresh hints for partial panel updates.

use crate::geometry::PixelBounds;
use crate::quantize::IndexedRaster;

/// How much of the panel must be redrawn to show a new raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    /// Redraw everything: no previous raster, or size/palette changed.
    Full,
    /// Only pixels inside `bounds` differ from the previous raster.
    Partial {
        /// Bounding box of changed pixels.
        bounds: PixelBounds,
    },
    /// Identical to the previous raster.
    Unchanged,
}

impl RefreshScope {
    /// Compare `next` against the raster currently on the panel.
    #[must_use]
    pub fn diff(previous: Option<&IndexedRaster>, next: &IndexedRaster) -> Self {
        let Some(previous) = previous else {
            return Self::Full;
        };
        if previous.width() != next.width()
            || previous.height() != next.height()
            || previous.palette() != next.palette()
        {
            return Self::Full;
        }

        let width = next.width() as usize;
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (y, (old, new)) in
            previous.indices().chunks_exact(width).zip(next.indices().chunks_exact(width)).enumerate()
        {
            if old == new {
                continue;
            }
            let first = old.iter().zip(new).position(|(a, b)| a != b);
            let last = old.iter().zip(new).rposition(|(a, b)| a != b);
            let (Some(first), Some(last)) = (first, last) else { continue };
            let (x0, x1, y) = (first as u32, last as u32, y as u32);
            bounds = Some(match bounds {
                None => (x0, y, x1, y),
                Some((bx0, by0, bx1, _)) => (bx0.min(x0), by0, bx1.max(x1), y),
            });
        }

        match bounds {
            None => Self::Unchanged,
            Some((x0, y0, x1, y1)) => {
                Self::Partial { bounds: PixelBounds { x: x0, y: y0, width: x1 - x0 + 1, height: y1 - y0 + 1 } }
            }
        }
    }
}
