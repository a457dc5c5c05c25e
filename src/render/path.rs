//! Stroked paths: polylines, dashes and elliptical arcs.

use super::primitives::{clip_segment, line_pixels, padded_area, stamp};
use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Point, Rect};

/// Dash/gap lengths in pixels, measured along the path's arc length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashPattern {
    dash: u32,
    gap: u32,
}

impl DashPattern {
    /// Create a pattern. Returns `None` unless both lengths are positive.
    #[must_use]
    pub const fn new(dash: u32, gap: u32) -> Option<Self> {
        if dash == 0 || gap == 0 {
            return None;
        }
        Some(Self { dash, gap })
    }

    /// Length of the inked part.
    #[must_use]
    pub const fn dash(&self) -> u32 {
        self.dash
    }

    /// Length of the blank part.
    #[must_use]
    pub const fn gap(&self) -> u32 {
        self.gap
    }

    /// Whether the pixel at arc length `distance` is inked.
    #[must_use]
    pub fn is_on(&self, distance: f32) -> bool {
        let period = (self.dash + self.gap) as f32;
        distance.rem_euclid(period) < self.dash as f32
    }
}

impl Default for DashPattern {
    fn default() -> Self {
        Self { dash: 4, gap: 4 }
    }
}

/// Stroke parameters for any path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Ink color.
    pub color: Rgba,
    /// Brush width in pixels.
    pub width: u32,
    /// Dash pattern; `None` draws solid.
    pub dash: Option<DashPattern>,
}

impl Stroke {
    /// Solid one-pixel stroke.
    #[must_use]
    pub const fn solid(color: Rgba) -> Self {
        Self { color, width: 1, dash: None }
    }

    /// Builder: set the brush width.
    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Builder: set the dash pattern.
    #[must_use]
    pub const fn dashed(mut self, dash: Option<DashPattern>) -> Self {
        self.dash = dash;
        self
    }
}

/// Stroke an open polyline.
///
/// Solid strokes include every vertex. Dashed strokes treat each segment as
/// half-open and carry the dash phase across vertices, so the pattern is
/// continuous along the whole path. Segments are clipped to the buffer
/// (plus the brush width) before rasterizing.
pub fn stroke_polyline(fb: &mut Framebuffer, points: &[Point], stroke: &Stroke) {
    match points {
        [] => {}
        [only] => {
            let (x, y) = only.to_pixel();
            stamp(fb, x, y, stroke.width, stroke.color);
        }
        _ => match stroke.dash {
            None => {
                let area = padded_area(fb, stroke.width);
                for pair in points.windows(2) {
                    let Some((a, b)) = clip_segment(pair[0], pair[1], area) else { continue };
                    let (x0, y0) = a.to_pixel();
                    let (x1, y1) = b.to_pixel();
                    for (x, y) in line_pixels(x0, y0, x1, y1) {
                        stamp(fb, x, y, stroke.width, stroke.color);
                    }
                }
            }
            Some(dash) => stroke_dashed(fb, points, stroke, dash),
        },
    }
}

fn stroke_dashed(fb: &mut Framebuffer, points: &[Point], stroke: &Stroke, dash: DashPattern) {
    let area = padded_area(fb, stroke.width);
    let period = f64::from(dash.dash()) + f64::from(dash.gap());
    // Arc length travelled so far, kept reduced modulo the period.
    let mut travelled = 0.0_f64;
    for pair in points.windows(2) {
        let start = rounded(pair[0]);
        let end = rounded(pair[1]);
        if start == end {
            continue;
        }
        let length = (end.0 - start.0).hypot(end.1 - start.1);
        if let Some((a, b)) = clip_segment(pair[0], pair[1], area) {
            let (x0, y0) = a.to_pixel();
            let (x1, y1) = b.to_pixel();
            let mut pixels = line_pixels(x0, y0, x1, y1);
            if b == pair[1] {
                pixels.pop();
            }
            for (x, y) in pixels {
                // Phase is measured from the unclipped start vertex.
                let along = (f64::from(x) - start.0).hypot(f64::from(y) - start.1);
                if dash.is_on(((travelled + along) % period) as f32) {
                    stamp(fb, x, y, stroke.width, stroke.color);
                }
            }
        }
        travelled = (travelled + length) % period;
    }
}

fn rounded(p: Point) -> (f64, f64) {
    (f64::from(p.x.round()), f64::from(p.y.round()))
}

/// Stroke a closed polyline, joining the last vertex back to the first.
pub fn stroke_closed(fb: &mut Framebuffer, points: &[Point], stroke: &Stroke) {
    if points.len() < 2 {
        stroke_polyline(fb, points, stroke);
        return;
    }
    let mut ring = points.to_vec();
    ring.push(points[0]);
    stroke_polyline(fb, &ring, stroke);
}

/// Normalized clockwise sweep from `start` to `end`, in degrees.
///
/// Equal angles sweep nothing; any other pair sweeps `(0, 360]`.
#[must_use]
pub fn arc_sweep(start: f32, end: f32) -> f32 {
    if (end - start).abs() < f32::EPSILON {
        return 0.0;
    }
    let sweep = (end - start).rem_euclid(360.0);
    if sweep < f32::EPSILON {
        360.0
    } else {
        sweep
    }
}

/// Sample the ellipse inscribed in `bounds` from `start` to `end` degrees.
///
/// Angles run clockwise from 3 o'clock. Samples are about two pixels apart,
/// up to [`MAX_ARC_STEPS`] per arc.
#[must_use]
pub fn arc_points(bounds: Rect, start: f32, end: f32) -> Vec<Point> {
    let sweep = arc_sweep(start, end);
    if sweep <= 0.0 {
        return Vec::new();
    }
    let center = bounds.center();
    let (a, b) = (bounds.width / 2.0, bounds.height / 2.0);
    let arc_length = std::f32::consts::PI * (a + b) * sweep / 360.0;
    let steps = ((arc_length / 2.0).ceil() as usize).clamp(8, MAX_ARC_STEPS);

    (0..=steps)
        .map(|i| {
            let theta = (start + sweep * i as f32 / steps as f32).to_radians();
            Point::new(center.x + a * theta.cos(), center.y + b * theta.sin())
        })
        .collect()
}

/// Sample cap for one arc; larger arcs get longer chords.
pub const MAX_ARC_STEPS: usize = 1 << 14;

/// Stroke an elliptical arc `width` pixels thick, growing inward.
pub fn draw_arc(fb: &mut Framebuffer, bounds: Rect, start: f32, end: f32, stroke: &Stroke) {
    let ring = Stroke { width: 1, ..*stroke };
    for inset in 0..stroke.width.max(1) {
        let inset = inset as f32;
        let inner = Rect::new(
            bounds.x + inset,
            bounds.y + inset,
            bounds.width - 2.0 * inset,
            bounds.height - 2.0 * inset,
        );
        if inner.width < 0.0 || inner.height < 0.0 {
            break;
        }
        stroke_polyline(fb, &arc_points(inner, start, end), &ring);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fb: &Framebuffer, y: u32, len: u32) -> Vec<bool> {
        (0..len).map(|x| fb.get_pixel(x, y) == Some(Rgba::BLACK)).collect()
    }

    #[test]
    fn test_dash_pattern_rejects_zero() {
        assert!(DashPattern::new(0, 2).is_none());
        assert!(DashPattern::new(4, 0).is_none());
        assert!(DashPattern::new(4, 2).is_some());
    }

    #[test]
    fn test_dashed_length_twelve() {
        let mut fb = Framebuffer::new(20, 3).unwrap();
        let stroke = Stroke::solid(Rgba::BLACK).dashed(DashPattern::new(4, 2));
        stroke_polyline(&mut fb, &[Point::new(0.0, 1.0), Point::new(12.0, 1.0)], &stroke);

        let expected: Vec<bool> = [
            true, true, true, true, false, false, true, true, true, true, false, false, false,
        ]
        .to_vec();
        assert_eq!(row(&fb, 1, 13), expected);
    }

    #[test]
    fn test_dash_phase_continues_across_vertices() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        let stroke = Stroke::solid(Rgba::BLACK).dashed(DashPattern::new(4, 2));
        let path = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 10.0)];
        stroke_polyline(&mut fb, &path, &stroke);

        // Arc length 5 at the corner is inside the first gap.
        assert_eq!(fb.get_pixel(4, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(fb.get_pixel(5, 0), Some(Rgba::TRANSPARENT));
        // Arc length 6..10 is the second dash.
        assert_eq!(fb.get_pixel(5, 1), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 4), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_dash_phase_survives_clipping() {
        let stroke = Stroke::solid(Rgba::BLACK).dashed(DashPattern::new(4, 2));
        let mut from_zero = Framebuffer::new(20, 3).unwrap();
        stroke_polyline(&mut from_zero, &[Point::new(0.0, 1.0), Point::new(12.0, 1.0)], &stroke);
        // Starting one period off-screen gives the same visible pattern.
        let mut offscreen = Framebuffer::new(20, 3).unwrap();
        stroke_polyline(&mut offscreen, &[Point::new(-6.0, 1.0), Point::new(12.0, 1.0)], &stroke);
        assert_eq!(row(&offscreen, 1, 20), row(&from_zero, 1, 20));
    }

    #[test]
    fn test_far_endpoints_are_clipped() {
        let mut fb = Framebuffer::new(20, 3).unwrap();
        let stroke = Stroke::solid(Rgba::BLACK).dashed(DashPattern::new(4, 2));
        stroke_polyline(&mut fb, &[Point::new(-3e9, 1.0), Point::new(3e9, 1.0)], &stroke);
        let expected: Vec<bool> = (0..20).map(|x| x % 6 < 4).collect();
        assert_eq!(row(&fb, 1, 20), expected);

        let mut fb = Framebuffer::new(20, 20).unwrap();
        let path = [Point::new(-1e12, -1e12), Point::new(1e12, 1e12), Point::new(10.0, -1e12)];
        stroke_polyline(&mut fb, &path, &Stroke::solid(Rgba::RED).width(3));
        assert_eq!(fb.get_pixel(5, 5), Some(Rgba::RED));
    }

    #[test]
    fn test_huge_arc_is_bounded() {
        let points = arc_points(Rect::new(-1e9, -1e9, 2e9, 2e9), 0.0, 360.0);
        assert_eq!(points.len(), MAX_ARC_STEPS + 1);
    }

    #[test]
    fn test_solid_polyline_includes_vertices() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        let path = [Point::new(1.0, 1.0), Point::new(10.0, 1.0), Point::new(10.0, 10.0)];
        stroke_polyline(&mut fb, &path, &Stroke::solid(Rgba::RED));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(10, 1), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::RED));
    }

    #[test]
    fn test_single_point_draws_stamp() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        stroke_polyline(&mut fb, &[Point::new(5.0, 5.0)], &Stroke::solid(Rgba::BLACK).width(3));
        assert_eq!(fb.get_pixel(4, 4), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(6, 6), Some(Rgba::BLACK));
    }

    #[test]
    fn test_stroke_closed_joins_ends() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        let square = [Point::new(2.0, 2.0), Point::new(12.0, 2.0), Point::new(12.0, 12.0), Point::new(2.0, 12.0)];
        stroke_closed(&mut fb, &square, &Stroke::solid(Rgba::BLACK));
        assert_eq!(fb.get_pixel(2, 7), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(7, 7), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_arc_sweep() {
        assert_eq!(arc_sweep(0.0, 90.0), 90.0);
        assert_eq!(arc_sweep(270.0, 90.0), 180.0);
        assert_eq!(arc_sweep(0.0, 360.0), 360.0);
        assert_eq!(arc_sweep(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_arc_clockwise_from_three_oclock() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 20.0);
        let points = arc_points(bounds, 0.0, 90.0);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.x - 20.0).abs() < 1e-3 && (first.y - 10.0).abs() < 1e-3);
        // Clockwise on screen: a quarter turn ends at 6 o'clock.
        assert!((last.x - 10.0).abs() < 1e-3 && (last.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_draw_arc_width() {
        let mut fb = Framebuffer::new(30, 30).unwrap();
        let stroke = Stroke::solid(Rgba::BLACK).width(3);
        draw_arc(&mut fb, Rect::new(0.0, 0.0, 20.0, 20.0), 0.0, 360.0, &stroke);
        assert_eq!(fb.get_pixel(20, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(18, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::TRANSPARENT));
    }
}
