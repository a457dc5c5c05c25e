//! Bitmap fonts and the process-wide font cache.
//!
//! Fonts arrive already rasterized: every glyph is a coverage bitmap plus an
//! advance. A 5x7 face is built in so text always renders even without a
//! resource provider; it is scaled by whole pixels for larger sizes.

use crate::resources::ResourceProvider;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Family name that always resolves to the built-in bitmap face.
pub const BUILTIN_FAMILY: &str = "default";

/// One rasterized glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Horizontal distance to the next glyph origin.
    pub advance: u32,
    /// Vertical offset of the bitmap's top row below the line top.
    pub offset_y: i32,
    /// Row-major coverage, one byte per `scale` x `scale` cell; values >= 128
    /// are inked.
    pub coverage: Vec<u8>,
    /// Side of the pixel block each coverage cell covers; 1 for plain bitmaps.
    pub scale: u32,
}

impl Glyph {
    /// True if the pixel at (x, y) inside the glyph box is inked.
    #[must_use]
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        let scale = self.scale.max(1);
        let cells = (self.width / scale) as usize;
        x < self.width
            && y < self.height
            && self
                .coverage
                .get((y / scale) as usize * cells + (x / scale) as usize)
                .is_some_and(|c| *c >= 128)
    }
}

/// A bitmap font at one pixel size.
#[derive(Debug, Clone)]
pub struct Font {
    family: String,
    size: u32,
    line_height: u32,
    glyphs: HashMap<char, Glyph>,
    /// Advance used for characters without a glyph.
    missing_advance: u32,
}

impl Font {
    /// Assemble a font from pre-rasterized glyphs.
    #[must_use]
    pub fn new(family: impl Into<String>, size: u32, line_height: u32, glyphs: HashMap<char, Glyph>) -> Self {
        let missing_advance = glyphs.get(&'?').map_or(size.max(1) / 2, |g| g.advance);
        Self { family: family.into(), size, line_height: line_height.max(1), glyphs, missing_advance }
    }

    /// The built-in 5x7 face, scaled by `max(1, round(size / 8))`.
    ///
    /// Each glyph advances 6 cells and lines are 8 cells tall. Glyphs keep
    /// their 5x7 cells, so memory does not grow with the size.
    #[must_use]
    pub fn builtin(size: u32) -> Self {
        let scale = ((size as f32 / 8.0).round() as u32).clamp(1, u32::MAX / 8);
        let mut glyphs = HashMap::with_capacity(GLYPHS_5X7.len() + 1);
        for (i, rows) in GLYPHS_5X7.iter().enumerate() {
            if let Some(ch) = char::from_u32(0x20 + i as u32) {
                glyphs.insert(ch, scaled_glyph(rows, scale));
            }
        }
        glyphs.insert('°', scaled_glyph(&DEGREE_5X7, scale));
        Self::new(BUILTIN_FAMILY, size, 8 * scale, glyphs)
    }

    /// Font family name.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Nominal pixel size requested for this font.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Height of one text line in pixels.
    #[must_use]
    pub const fn line_height(&self) -> u32 {
        self.line_height
    }

    /// Glyph for `ch`, falling back to `?`.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Horizontal advance of `ch` in pixels.
    #[must_use]
    pub fn advance(&self, ch: char) -> u32 {
        self.glyph(ch).map_or(self.missing_advance, |g| g.advance)
    }

    /// Rendered width of `text` (sum of glyph advances).
    #[must_use]
    pub fn measure(&self, text: &str) -> u32 {
        text.chars().fold(0_u32, |w, c| w.saturating_add(self.advance(c)))
    }
}

fn scaled_glyph(rows: &[u8; 7], scale: u32) -> Glyph {
    let coverage = rows
        .iter()
        .flat_map(|bits| (0..5).map(move |column| if bits & (0x10 >> column) != 0 { 255 } else { 0 }))
        .collect();
    Glyph { width: 5 * scale, height: 7 * scale, advance: 6 * scale, offset_y: 0, coverage, scale }
}

// ============================================================================
// Font Cache
// ============================================================================

/// Process-wide cache of fonts keyed by (family, size).
///
/// Readers share the `RwLock`; a miss takes the write lock once to insert.
/// Fonts are size-specific but canvas-independent, so entries never need
/// invalidation between renders.
#[derive(Debug, Default)]
pub struct FontCache {
    fonts: RwLock<HashMap<(String, u32), Arc<Font>>>,
}

impl FontCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a font, asking `provider` on a miss.
    ///
    /// The built-in family resolves even when the provider has no such font.
    /// Returns `None` if the font cannot be found.
    pub fn resolve(&self, provider: &dyn ResourceProvider, family: &str, size: u32) -> Option<Arc<Font>> {
        let key = (family.to_string(), size);
        if let Some(font) = self.fonts.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
            trace!(family, size, "font cache hit");
            return Some(Arc::clone(font));
        }

        let font = provider
            .get_font(family, size)
            .or_else(|| (family == BUILTIN_FAMILY).then(|| Font::builtin(size)))?;
        trace!(family, size, "font cache miss");

        let mut fonts = self.fonts.write().unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(fonts.entry(key).or_insert_with(|| Arc::new(font))))
    }

    /// Number of cached fonts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no font has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Built-in 5x7 glyph table (ASCII 0x20..=0x7E), bit 4 = leftmost column
// ============================================================================

const DEGREE_5X7: [u8; 7] = [0x0C, 0x12, 0x12, 0x0C, 0x00, 0x00, 0x00];

#[rustfmt::skip]
const GLYPHS_5X7: [[u8; 7]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04], // '!'
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // '#'
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // '$'
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // '%'
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // '&'
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // '('
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // ')'
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // '*'
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ','
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // '.'
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // '/'
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // '0'
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // '1'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // '2'
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // '3'
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // '4'
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // '5'
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // '6'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // '7'
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // '8'
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ';'
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // '<'
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // '='
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // '>'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // '@'
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // 'A'
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // 'B'
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // 'C'
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // 'D'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // 'E'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // 'F'
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // 'G'
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'H'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'I'
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // 'J'
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // 'K'
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // 'L'
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // 'M'
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // 'N'
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'O'
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // 'P'
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // 'Q'
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // 'R'
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // 'S'
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // 'T'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'U'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'V'
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // 'W'
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // 'X'
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // 'Y'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // 'Z'
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // '['
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // '\\'
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ']'
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // '_'
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F], // 'a'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E], // 'b'
    [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E], // 'c'
    [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F], // 'd'
    [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E], // 'e'
    [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08], // 'f'
    [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'g'
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11], // 'h'
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E], // 'i'
    [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C], // 'j'
    [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12], // 'k'
    [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'l'
    [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11], // 'm'
    [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11], // 'n'
    [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E], // 'o'
    [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10], // 'p'
    [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01], // 'q'
    [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10], // 'r'
    [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E], // 's'
    [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06], // 't'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D], // 'u'
    [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'v'
    [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A], // 'w'
    [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11], // 'x'
    [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E], // 'y'
    [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F], // 'z'
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // '{'
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // '|'
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // '}'
    [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00], // '~'
];
