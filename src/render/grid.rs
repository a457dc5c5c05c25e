//! Debug guide grid.

use super::path::{stroke_polyline, Stroke};
use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::text::{draw_glyph, Font};

/// Coordinate labels drawn next to grid lines.
#[derive(Debug, Clone, Copy)]
pub struct GridLabels<'a> {
    /// Label font.
    pub font: &'a Font,
    /// Label color.
    pub color: Rgba,
    /// Label every n-th line.
    pub every: u32,
}

/// Draw evenly spaced horizontal and vertical guide lines across the buffer.
///
/// `spacing` must be positive; callers clamp it beforehand. Lines start at
/// `spacing` so the canvas edges stay clear for the labels.
pub fn draw_debug_grid(fb: &mut Framebuffer, spacing: u32, stroke: &Stroke, labels: Option<GridLabels<'_>>) {
    let spacing = spacing.max(1);
    let (w, h) = (fb.width(), fb.height());
    let right = (w - 1) as f32;
    let bottom = (h - 1) as f32;

    for (i, x) in (spacing..w).step_by(spacing as usize).enumerate() {
        let x_f = x as f32;
        stroke_polyline(fb, &[Point::new(x_f, 0.0), Point::new(x_f, bottom)], stroke);
        if let Some(l) = labels.filter(|l| (i as u32 + 1) % l.every.max(1) == 0) {
            draw_label(fb, l, &x.to_string(), x as i32 + 2, 1);
        }
    }
    for (i, y) in (spacing..h).step_by(spacing as usize).enumerate() {
        let y_f = y as f32;
        stroke_polyline(fb, &[Point::new(0.0, y_f), Point::new(right, y_f)], stroke);
        if let Some(l) = labels.filter(|l| (i as u32 + 1) % l.every.max(1) == 0) {
            draw_label(fb, l, &y.to_string(), 1, y as i32 + 2);
        }
    }
}

fn draw_label(fb: &mut Framebuffer, labels: GridLabels<'_>, text: &str, x: i32, y: i32) {
    let mut cursor = i64::from(x);
    for ch in text.chars() {
        draw_glyph(fb, labels.font, ch, cursor, i64::from(y), labels.color);
        cursor += i64::from(labels.font.advance(ch));
    }
}
