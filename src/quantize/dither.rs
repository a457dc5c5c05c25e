//! Dithering strategies.
//!
//! Every path is integer-only so the same input always yields the same
//! indices on every platform.

use serde::{Deserialize, Serialize};

use super::palette::Palette;

/// Dithering algorithm applied during quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dither {
    /// Plain nearest-color mapping.
    None,
    /// 8x8 Bayer threshold matrix.
    Ordered,
    /// Floyd-Steinberg error diffusion.
    #[default]
    #[serde(alias = "error-diffusion", alias = "floyd_steinberg")]
    FloydSteinberg,
    /// Atkinson error diffusion (diffuses 3/4 of the error).
    Atkinson,
    /// Burkes error diffusion.
    Burkes,
}

impl Dither {
    /// Parse a dither name. Numeric codes 0 (none), 1 (diffusion) and
    /// 2 (ordered) are accepted.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let dither = match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "off" | "false" | "0" => Self::None,
            "ordered" | "bayer" | "2" => Self::Ordered,
            "error-diffusion" | "floyd-steinberg" | "diffusion" | "true" | "1" => Self::FloydSteinberg,
            "atkinson" => Self::Atkinson,
            "burkes" => Self::Burkes,
            _ => return None,
        };
        Some(dither)
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ordered => "ordered",
            Self::FloydSteinberg => "floyd-steinberg",
            Self::Atkinson => "atkinson",
            Self::Burkes => "burkes",
        }
    }
}

/// 8x8 Bayer index matrix.
const BAYER_8X8: [[i32; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Threshold amplitude of the ordered matrix, in channel units.
const ORDERED_SPREAD: i32 = 64;

/// Error diffusion kernel: (dx, dy, weight) taps and the divisor.
struct Kernel {
    taps: &'static [(i32, i32, i32)],
    divisor: i32,
}

const FLOYD_STEINBERG: Kernel = Kernel { taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)], divisor: 16 };

const ATKINSON: Kernel = Kernel {
    taps: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
};

const BURKES: Kernel = Kernel {
    taps: &[(1, 0, 8), (2, 0, 4), (-2, 1, 2), (-1, 1, 4), (0, 1, 8), (1, 1, 4), (2, 1, 2)],
    divisor: 32,
};

/// Map opaque RGB pixels to palette indices.
///
/// `rgb` holds `width * height` pixels in row-major order.
pub(crate) fn apply(rgb: Vec<[i32; 3]>, width: usize, height: usize, palette: &Palette, dither: Dither) -> Vec<u8> {
    match dither {
        Dither::None => rgb.iter().map(|&px| palette.nearest(px)).collect(),
        Dither::Ordered => ordered(&rgb, width, palette),
        Dither::FloydSteinberg => diffuse(rgb, width, height, palette, &FLOYD_STEINBERG),
        Dither::Atkinson => diffuse(rgb, width, height, palette, &ATKINSON),
        Dither::Burkes => diffuse(rgb, width, height, palette, &BURKES),
    }
}

fn ordered(rgb: &[[i32; 3]], width: usize, palette: &Palette) -> Vec<u8> {
    rgb.iter()
        .enumerate()
        .map(|(i, px)| {
            let (x, y) = (i % width, i / width);
            // Centered threshold in [-spread/2, spread/2).
            let t = ((BAYER_8X8[y % 8][x % 8] * 2 - 63) * ORDERED_SPREAD) / 128;
            palette.nearest([px[0] + t, px[1] + t, px[2] + t])
        })
        .collect()
}

fn diffuse(mut rgb: Vec<[i32; 3]>, width: usize, height: usize, palette: &Palette, kernel: &Kernel) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgb.len());
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let px = rgb[i].map(|c| c.clamp(0, 255));
            let index = palette.nearest(px);
            out.push(index);

            let Some(target) = palette.color(index) else { continue };
            let err = [
                px[0] - i32::from(target.r),
                px[1] - i32::from(target.g),
                px[2] - i32::from(target.b),
            ];
            if err == [0, 0, 0] {
                continue;
            }
            for &(dx, dy, weight) in kernel.taps {
                let nx = x as i32 + dx;
                let ny = y + dy as usize;
                if nx < 0 || nx as usize >= width || ny >= height {
                    continue;
                }
                for (c, e) in rgb[ny * width + nx as usize].iter_mut().zip(err) {
                    *c += e * weight / kernel.divisor;
                }
            }
        }
    }
    out
}
