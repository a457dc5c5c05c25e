//! Device palettes with firmware index assignment.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Identifier of a supported panel palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteId {
    /// Black and white.
    Mono,
    /// Black, white, red.
    Bwr,
    /// Black, white, yellow.
    Bwy,
    /// Black, white, yellow, red.
    Bwry,
    /// Four gray levels.
    Gray4,
    /// Spectra 6 color.
    Spectra6,
    /// ACeP 7 color.
    Acep7,
}

impl PaletteId {
    /// All palettes in declaration order.
    pub const ALL: [Self; 7] =
        [Self::Mono, Self::Bwr, Self::Bwy, Self::Bwry, Self::Gray4, Self::Spectra6, Self::Acep7];

    /// Parse a palette id; a few common aliases are accepted.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let id = match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "mono" | "bw" | "black_white" => Self::Mono,
            "bwr" | "black_white_red" => Self::Bwr,
            "bwy" | "black_white_yellow" => Self::Bwy,
            "bwry" | "black_white_red_yellow" => Self::Bwry,
            "gray4" | "grey4" | "4gray" => Self::Gray4,
            "spectra6" | "spectra_6" | "6color" => Self::Spectra6,
            "acep7" | "acep" | "7color" => Self::Acep7,
            _ => return None,
        };
        Some(id)
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Bwr => "bwr",
            Self::Bwy => "bwy",
            Self::Bwry => "bwry",
            Self::Gray4 => "gray4",
            Self::Spectra6 => "spectra6",
            Self::Acep7 => "acep7",
        }
    }

    /// The palette table for this id.
    #[must_use]
    pub const fn palette(self) -> Palette {
        let entries: &'static [Entry] = match self {
            Self::Mono => &MONO,
            Self::Bwr => &BWR,
            Self::Bwy => &BWY,
            Self::Bwry => &BWRY,
            Self::Gray4 => &GRAY4,
            Self::Spectra6 => &SPECTRA6,
            Self::Acep7 => &ACEP7,
        };
        Palette { id: self, entries }
    }
}

impl std::fmt::Display for PaletteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One firmware slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    color: Rgba,
    target: bool,
}

const fn slot(r: u8, g: u8, b: u8) -> Entry {
    Entry { color: Rgba::rgb(r, g, b), target: true }
}

const fn reserved(r: u8, g: u8, b: u8) -> Entry {
    Entry { color: Rgba::rgb(r, g, b), target: false }
}

const MONO: [Entry; 2] = [slot(0, 0, 0), slot(255, 255, 255)];
const BWR: [Entry; 3] = [slot(0, 0, 0), slot(255, 255, 255), slot(255, 0, 0)];
const BWY: [Entry; 3] = [slot(0, 0, 0), slot(255, 255, 255), slot(255, 255, 0)];
const BWRY: [Entry; 4] = [slot(0, 0, 0), slot(255, 255, 255), slot(255, 255, 0), slot(255, 0, 0)];
const GRAY4: [Entry; 4] = [slot(0, 0, 0), slot(85, 85, 85), slot(170, 170, 170), slot(255, 255, 255)];
const SPECTRA6: [Entry; 7] = [
    slot(0, 0, 0),
    slot(255, 255, 255),
    slot(255, 255, 0),
    slot(255, 0, 0),
    reserved(0, 0, 0),
    slot(0, 0, 255),
    slot(0, 255, 0),
];
const ACEP7: [Entry; 8] = [
    slot(0, 0, 0),
    slot(255, 255, 255),
    slot(0, 255, 0),
    slot(0, 0, 255),
    slot(255, 0, 0),
    slot(255, 255, 0),
    slot(255, 128, 0),
    reserved(255, 255, 255),
];

/// An ordered device palette.
///
/// Indices are the panel firmware's; slots marked reserved keep their index
/// but are never produced by quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    id: PaletteId,
    entries: &'static [Entry],
}

impl Palette {
    /// Palette id.
    #[must_use]
    pub const fn id(&self) -> PaletteId {
        self.id
    }

    /// Number of firmware slots, reserved ones included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; every palette has at least black and white.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Color of slot `index`.
    #[must_use]
    pub fn color(&self, index: u8) -> Option<Rgba> {
        self.entries.get(index as usize).map(|e| e.color)
    }

    /// Whether quantization may emit `index`.
    #[must_use]
    pub fn is_target(&self, index: u8) -> bool {
        self.entries.get(index as usize).is_some_and(|e| e.target)
    }

    /// Indices quantization may emit, ascending.
    pub fn targets(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().enumerate().filter(|(_, e)| e.target).map(|(i, _)| i as u8)
    }

    /// Nearest valid target to an RGB triple, by squared Euclidean distance.
    ///
    /// Ties resolve to the lower index.
    #[must_use]
    pub fn nearest(&self, rgb: [i32; 3]) -> u8 {
        let mut best = 0u8;
        let mut best_dist = i64::MAX;
        for (i, entry) in self.entries.iter().enumerate() {
            if !entry.target {
                continue;
            }
            let c = entry.color;
            let dr = i64::from(rgb[0] - i32::from(c.r));
            let dg = i64::from(rgb[1] - i32::from(c.g));
            let db = i64::from(rgb[2] - i32::from(c.b));
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i as u8;
            }
        }
        best
    }

    /// The first chromatic target color, or black if there is none.
    #[must_use]
    pub fn accent(&self) -> Rgba {
        self.entries
            .iter()
            .filter(|e| e.target)
            .map(|e| e.color)
            .find(|c| !(c.r == c.g && c.g == c.b))
            .unwrap_or(Rgba::BLACK)
    }
}
