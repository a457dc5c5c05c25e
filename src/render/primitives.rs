//! Primitive rasterization functions.
//!
//! Everything here draws hard-edged pixels: e-paper panels cannot show
//! intermediate coverage, so anti-aliasing would only feed noise into the
//! quantizer.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};

// ============================================================================
// Line Drawing
// ============================================================================

/// Pixels of a Bresenham line from (x0, y0) to (x1, y1), both ends included.
///
/// Every pixel between the ends is visited, so callers clip far-away
/// endpoints with [`clip_segment`] first.
#[must_use]
pub fn line_pixels(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (i64::from(x1) - i64::from(x0)).abs();
    let dy = -(i64::from(y1) - i64::from(y0)).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut out = Vec::with_capacity(usize::try_from(dx - dy + 1).map_or(0, |n| n.min(MAX_PREALLOC)));

    loop {
        out.push((x, y));

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
    out
}

const MAX_PREALLOC: usize = 1 << 16;

/// Clip the segment `a`-`b` to `area` (Liang-Barsky).
///
/// Returns the visible part, keeping the original direction, or `None` when
/// nothing of it lies inside. Unclipped ends are returned unchanged.
#[must_use]
pub fn clip_segment(a: Point, b: Point, area: Rect) -> Option<(Point, Point)> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let (x0, y0) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - x0, f64::from(b.y) - y0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let edges = [
        (-dx, x0 - f64::from(area.x)),
        (dx, f64::from(area.right()) - x0),
        (-dy, y0 - f64::from(area.y)),
        (dy, f64::from(area.bottom()) - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else if p < 0.0 {
            t0 = t0.max(q / p);
        } else {
            t1 = t1.min(q / p);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| Point::new((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((if t0 > 0.0 { at(t0) } else { a }, if t1 < 1.0 { at(t1) } else { b }))
}

/// `fb`'s pixel area grown by `margin` on every side.
#[must_use]
pub fn padded_area(fb: &Framebuffer, margin: u32) -> Rect {
    let m = margin as f32;
    Rect::new(-m, -m, fb.width() as f32 - 1.0 + 2.0 * m, fb.height() as f32 - 1.0 + 2.0 * m)
}

/// Draw a one-pixel line using Bresenham's algorithm.
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
    let a = Point::new(x0 as f32, y0 as f32);
    let b = Point::new(x1 as f32, y1 as f32);
    let Some((a, b)) = clip_segment(a, b, padded_area(fb, 1)) else { return };
    let ((x0, y0), (x1, y1)) = (a.to_pixel(), b.to_pixel());
    for (x, y) in line_pixels(x0, y0, x1, y1) {
        fb.put(x, y, color);
    }
}

/// Stamp a square brush of side `width` centered on (x, y).
#[inline]
pub fn stamp(fb: &mut Framebuffer, x: i32, y: i32, width: u32, color: Rgba) {
    if width <= 1 {
        fb.put(x, y, color);
        return;
    }
    let w = i64::from(width);
    let half = (w - 1) / 2;
    fill_area(fb, i64::from(x) - half, i64::from(y) - half, w, w, color);
}

/// `fill_rect` over wide coordinates, clipped before narrowing to `i32`.
fn fill_area(fb: &mut Framebuffer, x: i64, y: i64, w: i64, h: i64, color: Rgba) {
    let (x0, y0) = (x.max(-1), y.max(-1));
    let x1 = x.saturating_add(w).min(i64::from(fb.width()) + 1);
    let y1 = y.saturating_add(h).min(i64::from(fb.height()) + 1);
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    fb.fill_rect(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32, color);
}

/// Inclusive span `lo..=hi` on row `y` over wide coordinates.
fn span_area(fb: &mut Framebuffer, lo: i64, hi: i64, y: i64, color: Rgba) {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let (lo, hi) = (lo.max(-1), hi.min(i64::from(fb.width())));
    fill_area(fb, lo, y, hi - lo + 1, 1, color);
}

/// Rows of `fb` that a run of `len` rows starting at `top` touches.
fn visible_rows(fb: &Framebuffer, top: i64, len: i64) -> std::ops::Range<i64> {
    (-top).clamp(0, len)..(i64::from(fb.height()) - top).clamp(0, len)
}

// ============================================================================
// Rectangle Drawing
// ============================================================================

/// Draw a filled rectangle.
pub fn draw_rect(fb: &mut Framebuffer, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
    fill_area(fb, i64::from(x), i64::from(y), i64::from(width), i64::from(height), color);
}

/// Draw a rectangle outline; the border grows inward from the edges.
pub fn draw_rect_outline(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba,
    thickness: u32,
) {
    let t = i64::from(thickness.max(1));
    let (x, y) = (i64::from(x), i64::from(y));
    let (w, h) = (i64::from(width), i64::from(height));

    // Top edge
    fill_area(fb, x, y, w, t.min(h), color);
    // Bottom edge
    if h > t {
        fill_area(fb, x, y + h - t, w, t, color);
    }
    // Left and right edges
    if h > 2 * t {
        fill_area(fb, x, y + t, t.min(w), h - 2 * t, color);
        if w > t {
            fill_area(fb, x + w - t, y + t, t, h - 2 * t, color);
        }
    }
}

/// Fill a rectangle whose corners are rounded with `radius`.
///
/// The radius is limited to half the shorter side.
pub fn fill_rounded_rect(fb: &mut Framebuffer, x: i32, y: i32, width: u32, height: u32, radius: u32, color: Rgba) {
    let radius = radius.min(width / 2).min(height / 2);
    if radius == 0 {
        draw_rect(fb, x, y, width, height, color);
        return;
    }
    let r = radius as f32;
    let (x, y) = (i64::from(x), i64::from(y));
    let (w, h) = (i64::from(width), i64::from(height));
    for row in visible_rows(fb, y, h) {
        // Distance of the row center from the nearest corner-circle center.
        let from_edge = row.min(h - 1 - row) as f32 + 0.5;
        let inset = if from_edge < r {
            let dy = r - from_edge;
            (r - (r * r - dy * dy).sqrt()).round() as i64
        } else {
            0
        };
        span_area(fb, x + inset, x + w - 1 - inset, y + row, color);
    }
}

// ============================================================================
// Circle/Ellipse Drawing
// ============================================================================

/// Draw a filled circle using the midpoint algorithm.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        if radius == 0 {
            fb.put(cx, cy, color);
        }
        return;
    }

    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let mut x = i64::from(radius);
    let mut y = 0_i64;
    let mut err = 1 - x;

    while x >= y {
        span_area(fb, cx - x, cx + x, cy + y, color);
        span_area(fb, cx - x, cx + x, cy - y, color);
        span_area(fb, cx - y, cx + y, cy + x, color);
        span_area(fb, cx - y, cx + y, cy - x, color);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Fill the ellipse inscribed in `bounds`, or only a ring of `thickness`
/// pixels measured inward from its edge.
///
/// `bounds` uses inclusive pixel coordinates: a box from (0, 0) to (10, 10)
/// covers 11 pixels per side.
pub fn fill_ellipse(fb: &mut Framebuffer, bounds: Rect, thickness: Option<u32>, color: Rgba) {
    let center = bounds.center();
    let (a, b) = (bounds.width / 2.0, bounds.height / 2.0);
    let inner = thickness.map(|t| (a - t as f32, b - t as f32));

    let y_start = (bounds.y.round() as i64).max(0);
    let y_end = (bounds.bottom().round() as i64).min(i64::from(fb.height()) - 1);
    for y in y_start..=y_end {
        let dy = y as f32 - center.y;
        let Some(half) = half_width(a, b, dy) else { continue };
        let lo = (center.x - half).round() as i64;
        let hi = (center.x + half).round() as i64;

        let hole = inner.and_then(|(ia, ib)| {
            if ia <= 0.0 || ib <= 0.0 {
                return None;
            }
            half_width(ia, ib, dy).filter(|h| *h > 0.0)
        });
        match hole {
            None => span_area(fb, lo, hi, y, color),
            Some(ih) => {
                let ilo = (center.x - ih).round() as i64;
                let ihi = (center.x + ih).round() as i64;
                span_area(fb, lo, (ilo - 1).max(lo), y, color);
                span_area(fb, (ihi + 1).min(hi), hi, y, color);
            }
        }
    }
}

/// Half-width of an ellipse with semi-axes (a, b) at vertical offset `dy`.
fn half_width(a: f32, b: f32, dy: f32) -> Option<f32> {
    if b <= 0.0 {
        return (dy.abs() < 0.5).then_some(a);
    }
    let t = 1.0 - (dy / b) * (dy / b);
    (t >= 0.0).then(|| a * t.sqrt())
}

// ============================================================================
// Polygon Filling
// ============================================================================

/// Fill a closed polygon with the even-odd rule.
///
/// Vertices sit on pixel centers; each row samples at its integer y with a
/// half-open edge rule so shared vertices are counted once.
pub fn fill_polygon(fb: &mut Framebuffer, points: &[Point], color: Rgba) {
    if points.len() < 3 {
        return;
    }
    let y_min = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).ceil() as i32;
    let y_max = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).floor() as i32;
    let y_min = y_min.max(0);
    let y_max = y_max.min(fb.height() as i32 - 1);

    let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
    for y in y_min..=y_max {
        let scan = y as f32;
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            let (lo, hi) = if a.y <= b.y { (*a, b) } else { (b, *a) };
            if scan >= lo.y && scan < hi.y {
                let t = (scan - lo.y) / (hi.y - lo.y);
                crossings.push(lo.x + t * (hi.x - lo.x));
            }
        }
        crossings.sort_by(f32::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil() as i64;
            let x1 = pair[1].floor() as i64;
            if x0 <= x1 {
                span_area(fb, x0, x1, i64::from(y), color);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Framebuffer {
        let mut fb = Framebuffer::new(w, h).expect("framebuffer creation should succeed");
        fb.clear(Rgba::WHITE);
        fb
    }

    #[test]
    fn test_draw_line_horizontal() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, 10, 50, 90, 50, Rgba::BLACK);

        assert_eq!(fb.get_pixel(10, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(91, 50), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_line_diagonal() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, 10, 10, 90, 90, Rgba::BLACK);

        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 90), Some(Rgba::BLACK));
    }

    #[test]
    fn test_line_pixels_count() {
        assert_eq!(line_pixels(0, 0, 12, 0).len(), 13);
        assert_eq!(line_pixels(3, 3, 3, 3), vec![(3, 3)]);
        assert_eq!(line_pixels(0, 0, 5, 5).len(), 6);
    }

    #[test]
    fn test_line_out_of_bounds() {
        let mut fb = white(100, 100);
        draw_line(&mut fb, -10, -10, 110, 110, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_line_extreme_endpoints() {
        let mut fb = white(20, 10);
        draw_line(&mut fb, i32::MIN, 5, i32::MAX, 5, Rgba::BLACK);
        assert_eq!(fb.get_pixel(0, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(19, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(10, 4), Some(Rgba::WHITE));
    }

    #[test]
    fn test_line_pixels_near_integer_limits() {
        assert_eq!(line_pixels(i32::MAX - 2, 0, i32::MAX, 0).len(), 3);
        assert_eq!(line_pixels(i32::MIN, i32::MIN, i32::MIN + 1, i32::MIN + 1).len(), 2);
    }

    #[test]
    fn test_clip_segment() {
        let area = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inside = (Point::new(1.0, 1.0), Point::new(9.0, 2.0));
        assert_eq!(clip_segment(inside.0, inside.1, area), Some(inside));

        let (a, b) = clip_segment(Point::new(-3e9, 5.0), Point::new(3e9, 5.0), area).unwrap();
        assert_eq!((a.x, b.x), (0.0, 10.0));
        assert_eq!((a.y, b.y), (5.0, 5.0));

        assert_eq!(clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), area), None);
        assert_eq!(clip_segment(Point::new(f32::INFINITY, 0.0), Point::new(1.0, 1.0), area), None);
    }

    #[test]
    fn test_stamp_width() {
        let mut fb = white(10, 10);
        stamp(&mut fb, 5, 5, 3, Rgba::BLACK);
        assert_eq!(fb.get_pixel(4, 4), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(6, 6), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(7, 7), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_rect() {
        let mut fb = white(100, 100);
        draw_rect(&mut fb, 20, 20, 30, 30, Rgba::RED);
        assert_eq!(fb.get_pixel(25, 25), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut fb = white(100, 100);
        draw_rect_outline(&mut fb, 20, 20, 30, 30, Rgba::RED, 2);

        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(21, 35), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(49, 49), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(35, 35), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_rounded_rect_cuts_corners() {
        let mut fb = white(40, 40);
        fill_rounded_rect(&mut fb, 0, 0, 40, 20, 8, Rgba::BLACK);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(39, 19), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(0, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(20, 0), Some(Rgba::BLACK));
    }

    #[test]
    fn test_fill_rounded_rect_zero_radius_is_square() {
        let mut fb = white(10, 10);
        fill_rounded_rect(&mut fb, 0, 0, 10, 10, 0, Rgba::BLACK);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn test_rect_sizes_beyond_i32() {
        let mut fb = white(10, 10);
        draw_rect(&mut fb, 2, 2, u32::MAX, u32::MAX, Rgba::BLACK);
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::WHITE));

        let mut fb = white(10, 10);
        draw_rect_outline(&mut fb, i32::MAX, 0, u32::MAX, 5, Rgba::BLACK, 2);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_rounded_rect_taller_than_buffer() {
        let mut fb = white(10, 10);
        fill_rounded_rect(&mut fb, -5, -1_000_000_000, 20, 2_000_000_000, 3, Rgba::BLACK);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn test_fill_ellipse_huge_bounds() {
        let mut fb = white(10, 10);
        fill_ellipse(&mut fb, Rect::new(-1e12, -1e12, 2e12, 2e12), None, Rgba::BLACK);
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::BLACK));
        fill_ellipse(&mut fb, Rect::new(1e12, 1e12, 4.0, 4.0), Some(1), Rgba::RED);
        assert_eq!(fb.get_pixel(9, 9), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_circle() {
        let mut fb = white(100, 100);
        draw_circle(&mut fb, 50, 50, 20, Rgba::BLUE);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(70, 50), Some(Rgba::BLUE));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_circle_zero_radius() {
        let mut fb = white(100, 100);
        draw_circle(&mut fb, 50, 50, 0, Rgba::RED);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(51, 50), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_ellipse_solid() {
        let mut fb = white(100, 100);
        fill_ellipse(&mut fb, Rect::new(10.0, 30.0, 80.0, 40.0), None, Rgba::BLACK);
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(10, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(90, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 30), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(12, 32), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_ellipse_ring() {
        let mut fb = white(100, 100);
        fill_ellipse(&mut fb, Rect::new(30.0, 30.0, 40.0, 40.0), Some(3), Rgba::BLACK);
        assert_eq!(fb.get_pixel(30, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(32, 50), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(50, 50), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(50, 68), Some(Rgba::BLACK));
    }

    #[test]
    fn test_fill_polygon_triangle() {
        let mut fb = white(50, 50);
        let tri = [Point::new(10.0, 10.0), Point::new(40.0, 10.0), Point::new(10.0, 40.0)];
        fill_polygon(&mut fb, &tri, Rgba::RED);
        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(35, 35), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_even_odd_hole() {
        let mut fb = white(50, 50);
        // A bow-tie: the crossing region is filled once on each side.
        let star = [
            Point::new(0.0, 0.0),
            Point::new(40.0, 40.0),
            Point::new(40.0, 0.0),
            Point::new(0.0, 40.0),
        ];
        fill_polygon(&mut fb, &star, Rgba::BLACK);
        assert_eq!(fb.get_pixel(5, 20), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(20, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_polygon_degenerate() {
        let mut fb = white(10, 10);
        fill_polygon(&mut fb, &[Point::new(1.0, 1.0), Point::new(5.0, 5.0)], Rgba::BLACK);
        assert_eq!(fb.get_pixel(3, 3), Some(Rgba::WHITE));
    }
}
