//! Working RGBA raster owned by the compositor.
//!
//! Rows are padded to a 64-byte stride so trueno's vector kernels can process
//! whole rows during layer blending.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::geometry::Point;
use trueno::Vector;

/// Alignment for SIMD operations (64 bytes for AVX-512).
const SIMD_ALIGNMENT: usize = 64;

/// SIMD-aligned RGBA framebuffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// RGBA pixels in row-major order, 4 bytes per pixel.
    pixels: Vec<u8>,
    /// Stride in bytes (may include padding for alignment).
    stride: usize,
}

impl Framebuffer {
    /// Create a new, fully transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use epd_render::framebuffer::Framebuffer;
    ///
    /// let fb = Framebuffer::new(296, 128).unwrap();
    /// assert_eq!(fb.width(), 296);
    /// assert_eq!(fb.height(), 128);
    /// ```
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let row_bytes = (width as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let pixels = vec![0; stride * (height as usize)];

        Ok(Self { width, height, pixels, stride })
    }

    /// Create a framebuffer from tightly packed RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or `rgba` has the wrong length.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let mut fb = Self::new(width, height)?;
        let row_bytes = (width as usize) * 4;
        if rgba.len() != row_bytes * height as usize {
            return Err(Error::InvalidDimensions { width, height });
        }
        for (y, src) in rgba.chunks_exact(row_bytes).enumerate() {
            let start = y * fb.stride;
            fb.pixels[start..start + row_bytes].copy_from_slice(src);
        }
        Ok(fb)
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the stride (row width in bytes, including any padding).
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Get the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Get a row of pixels as a slice.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = (y as usize) * self.stride;
        let end = start + (self.width as usize) * 4;
        Some(&self.pixels[start..end])
    }

    /// Clear the framebuffer to a solid color.
    pub fn clear(&mut self, color: Rgba) {
        let [r, g, b, a] = color.to_array();
        let row_bytes = (self.width as usize) * 4;
        for row in self.pixels.chunks_exact_mut(self.stride) {
            for chunk in row[..row_bytes].chunks_exact_mut(4) {
                chunk.copy_from_slice(&[r, g, b, a]);
            }
        }
    }

    /// Fill a rectangular region with a solid color.
    ///
    /// Coordinates may be negative or extend past the edges; they are clipped.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x1 = x.max(0);
        let y1 = y.max(0);
        let x2 = x.saturating_add(w).min(self.width as i32);
        let y2 = y.saturating_add(h).min(self.height as i32);

        if x1 >= x2 || y1 >= y2 {
            return;
        }

        let rgba = color.to_array();
        let rect_width = (x2 - x1) as usize;

        for row_y in y1..y2 {
            let row_start = (row_y as usize) * self.stride + (x1 as usize) * 4;
            let row = &mut self.pixels[row_start..row_start + rect_width * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let idx = self.pixel_index(x, y);
        Some(Rgba::from_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    /// Set the color at a specific pixel coordinate.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.pixel_index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Set a pixel addressed with signed coordinates, clipping silently.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Rgba) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as u32, y as u32, color);
        }
    }

    /// Copy the visible pixels of a same-sized layer that fall inside the
    /// inclusive box `(x0, y0)..=(x1, y1)`.
    ///
    /// Pixels outside the box, or transparent in `layer`, are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the framebuffers have different dimensions.
    pub fn overlay_within(&mut self, layer: &Framebuffer, x0: u32, y0: u32, x1: u32, y1: u32) -> Result<()> {
        if self.width != layer.width || self.height != layer.height {
            return Err(Error::InvalidDimensions { width: layer.width, height: layer.height });
        }
        let (x1, y1) = (x1.min(self.width - 1), y1.min(self.height - 1));
        if x0 > x1 || y0 > y1 {
            return Ok(());
        }
        for y in y0..=y1 {
            let start = self.pixel_index(x0, y);
            let end = self.pixel_index(x1, y) + 4;
            let src = &layer.pixels[start..end];
            let dst = &mut self.pixels[start..end];
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                if s[3] != 0 {
                    d.copy_from_slice(s);
                }
            }
        }
        Ok(())
    }

    /// Merge a same-sized layer over this buffer.
    ///
    /// Opaque layer pixels overwrite at `opacity >= 1.0`; otherwise each
    /// channel becomes `src * a + dst * (1 - a)` with `a = opacity * alpha`,
    /// evaluated row-wise with trueno vectors. Transparent layer pixels never
    /// touch the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the framebuffers have different dimensions.
    pub fn composite(&mut self, layer: &Framebuffer, opacity: f32) -> Result<()> {
        if self.width != layer.width || self.height != layer.height {
            return Err(Error::InvalidDimensions { width: layer.width, height: layer.height });
        }

        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return Ok(());
        }
        let row_bytes = (self.width as usize) * 4;

        for y in 0..self.height as usize {
            let start = y * self.stride;
            let src = &layer.pixels[start..start + row_bytes];
            if src.chunks_exact(4).all(|px| px[3] == 0) {
                continue;
            }

            let hard = opacity >= 1.0 && src.chunks_exact(4).all(|px| px[3] == 0 || px[3] == 255);
            if hard {
                let dst = &mut self.pixels[start..start + row_bytes];
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    if s[3] != 0 {
                        d.copy_from_slice(s);
                    }
                }
                continue;
            }

            self.blend_row(start, src, opacity);
        }

        Ok(())
    }

    fn blend_row(&mut self, start: usize, src: &[u8], opacity: f32) {
        let row_bytes = src.len();
        let alpha: Vec<f32> = src
            .chunks_exact(4)
            .flat_map(|px| {
                let a = opacity * f32::from(px[3]) / 255.0;
                [a, a, a, 0.0]
            })
            .collect();
        let inv_alpha: Vec<f32> = alpha.iter().map(|a| 1.0 - a).collect();

        let dst_vec = Vector::from_vec(
            self.pixels[start..start + row_bytes].iter().map(|&b| f32::from(b)).collect(),
        );
        let src_vec = Vector::from_vec(src.iter().map(|&b| f32::from(b)).collect());

        // out = src * alpha + dst * (1 - alpha)
        if let (Ok(src_scaled), Ok(dst_scaled)) =
            (src_vec.mul(&Vector::from_vec(alpha)), dst_vec.mul(&Vector::from_vec(inv_alpha)))
        {
            if let Ok(result) = src_scaled.add(&dst_scaled) {
                let dst = &mut self.pixels[start..start + row_bytes];
                for ((d, v), s) in
                    dst.chunks_exact_mut(4).zip(result.as_slice().chunks_exact(4)).zip(src.chunks_exact(4))
                {
                    if s[3] == 0 {
                        continue;
                    }
                    d[0] = v[0].round().clamp(0.0, 255.0) as u8;
                    d[1] = v[1].round().clamp(0.0, 255.0) as u8;
                    d[2] = v[2].round().clamp(0.0, 255.0) as u8;
                    d[3] = 255;
                }
            }
        }
    }

    /// Bounding box `(x0, y0, x1, y1)` (inclusive) of all non-transparent pixels.
    #[must_use]
    pub fn content_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..self.height {
            let Some(row) = self.row(y) else { continue };
            for (x, px) in row.chunks_exact(4).enumerate() {
                if px[3] == 0 {
                    continue;
                }
                let x = x as u32;
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    /// Return a copy of this layer rotated clockwise by `degrees` about `pivot`.
    ///
    /// Nearest-neighbor inverse mapping; content rotated outside the buffer is
    /// clipped.
    #[must_use]
    pub fn rotated_about(&self, pivot: Point, degrees: f32) -> Self {
        let mut out = Self {
            width: self.width,
            height: self.height,
            pixels: vec![0; self.pixels.len()],
            stride: self.stride,
        };
        let Some((x0, y0, x1, y1)) = self.content_bounds() else {
            return out;
        };

        // Destination region: the rotated content box, clipped to the buffer.
        let corners = [
            Point::new(x0 as f32, y0 as f32),
            Point::new(x1 as f32 + 1.0, y0 as f32),
            Point::new(x0 as f32, y1 as f32 + 1.0),
            Point::new(x1 as f32 + 1.0, y1 as f32 + 1.0),
        ]
        .map(|c| c.rotate_about(pivot, degrees));
        let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max).ceil();
        let max_x = (max_x.max(0.0) as u32).min(self.width);
        let max_y = (max_y.max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let src = Point::new(x as f32 + 0.5, y as f32 + 0.5).rotate_about(pivot, -degrees);
                let (sx, sy) = (src.x.floor(), src.y.floor());
                if sx < 0.0 || sy < 0.0 {
                    continue;
                }
                if let Some(color) = self.get_pixel(sx as u32, sy as u32) {
                    if !color.is_transparent() {
                        out.set_pixel(x, y, color);
                    }
                }
            }
        }
        out
    }

    /// Return a copy rotated clockwise by `quarter_turns * 90` degrees.
    ///
    /// Odd turn counts swap width and height.
    #[must_use]
    pub fn rotated_quarter(&self, quarter_turns: u32) -> Self {
        let turns = quarter_turns % 4;
        if turns == 0 {
            return self.clone();
        }
        let (w, h) = if turns % 2 == 1 { (self.height, self.width) } else { (self.width, self.height) };
        let row_bytes = (w as usize) * 4;
        let stride = (row_bytes + SIMD_ALIGNMENT - 1) & !(SIMD_ALIGNMENT - 1);
        let mut out = Self { width: w, height: h, pixels: vec![0; stride * h as usize], stride };

        for y in 0..self.height {
            for x in 0..self.width {
                let (nx, ny) = match turns {
                    1 => (self.height - 1 - y, x),
                    2 => (self.width - 1 - x, self.height - 1 - y),
                    _ => (y, self.width - 1 - x),
                };
                let idx = self.pixel_index(x, y);
                let dst = out.pixel_index(nx, ny);
                out.pixels[dst..dst + 4].copy_from_slice(&self.pixels[idx..idx + 4]);
            }
        }
        out
    }

    /// Calculate the byte index for a pixel coordinate.
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * self.stride + (x as usize) * 4
    }
}
