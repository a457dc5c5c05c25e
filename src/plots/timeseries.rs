//! Time-series plot with gap handling.
//!
//! Samples are `(timestamp, value-or-null)` pairs. A null splits the series
//! into independent runs unless `span_gaps` is set, in which case nulls are
//! dropped and the remaining samples form one run.

use chrono::{DateTime, Local, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use crate::render::{draw_circle, draw_rect_outline, stroke_polyline, DashPattern, Stroke};
use crate::scale::{LinearScale, Scale};
use crate::text::{draw_glyph, Font};

// ============================================================================
// Local Clock
// ============================================================================

/// Source of the local UTC offset used to place timestamps on the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalClock {
    /// Host time zone, including daylight-saving transitions.
    #[default]
    System,
    /// A fixed offset east of UTC, in seconds.
    Fixed {
        /// Offset in seconds.
        utc_offset_seconds: i32,
    },
}

impl LocalClock {
    /// UTC offset in seconds at the instant `unix_seconds`.
    #[must_use]
    pub fn offset_at(&self, unix_seconds: f64) -> i32 {
        match *self {
            Self::Fixed { utc_offset_seconds } => utc_offset_seconds,
            Self::System => Local
                .timestamp_opt(unix_seconds.floor() as i64, 0)
                .single()
                .map_or(0, |dt| dt.offset().fix().local_minus_utc()),
        }
    }

    /// Map a unix timestamp to seconds on the local wall-clock timeline.
    #[must_use]
    pub fn to_local(&self, unix_seconds: f64) -> f64 {
        unix_seconds + f64::from(self.offset_at(unix_seconds))
    }
}

/// Parse an RFC 3339 timestamp into unix seconds.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let dt = DateTime::parse_from_rfc3339(text.trim()).ok()?;
    Some(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
}

// ============================================================================
// Samples and Series
// ============================================================================

/// One observation; `value` is `None` for a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Unix seconds.
    pub time: f64,
    /// Observed value.
    pub value: Option<f64>,
}

impl Sample {
    /// Create a sample.
    #[must_use]
    pub const fn new(time: f64, value: Option<f64>) -> Self {
        Self { time, value }
    }
}

/// How consecutive samples are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Straight segment between samples.
    #[default]
    Linear,
    /// Horizontal to the next timestamp, then vertical to its value.
    Step,
}

impl LineStyle {
    /// Parse `linear` or `step`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" | "line" => Some(Self::Linear),
            "step" | "steps" => Some(Self::Step),
            _ => None,
        }
    }
}

/// A data series for time-series plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Samples in time order.
    pub samples: Vec<Sample>,
    /// Line color.
    pub color: Rgba,
    /// Stroke width in pixels.
    pub width: u32,
    /// Optional dash pattern.
    pub dash: Option<DashPattern>,
}

impl Series {
    /// Create a black one-pixel series.
    #[must_use]
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples, color: Rgba::BLACK, width: 1, dash: None }
    }

    /// Set the line color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Set the stroke width.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width.max(1);
        self
    }

    /// Set the dash pattern.
    #[must_use]
    pub fn dash(mut self, dash: Option<DashPattern>) -> Self {
        self.dash = dash;
        self
    }
}

/// Split samples into drawable runs of `(time, value)` pairs.
///
/// Without `span_gaps` every maximal run of non-null samples is separate;
/// with it, nulls are dropped and one run remains. Non-finite values count
/// as nulls.
#[must_use]
pub fn runs(samples: &[Sample], span_gaps: bool) -> Vec<Vec<(f64, f64)>> {
    let mut out: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for sample in samples {
        match sample.value.filter(|v| v.is_finite()) {
            Some(v) => current.push((sample.time, v)),
            None if span_gaps => {}
            None => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Expand a polyline into horizontal-then-vertical steps.
#[must_use]
pub fn step_path(points: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        if let Some(prev) = i.checked_sub(1).map(|j| points[j]) {
            out.push(Point::new(p.x, prev.y));
        }
        out.push(*p);
    }
    out
}

// ============================================================================
// Time-Series Plot
// ============================================================================

/// Builder for time-series plots drawn into a box of the canvas.
#[derive(Debug, Clone)]
pub struct TimeSeriesPlot {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    series: Vec<Series>,
    time_window: (Option<f64>, Option<f64>),
    y_range: (Option<f64>, Option<f64>),
    line_style: LineStyle,
    span_gaps: bool,
    clock: LocalClock,
    frame: Option<Rgba>,
    x_grid: Option<f64>,
    y_grid: Option<f64>,
    grid_stroke: Stroke,
    labels: Option<Rgba>,
}

impl Default for TimeSeriesPlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesPlot {
    /// Create a plot builder with a 100x50 box at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 100,
            height: 50,
            series: Vec::new(),
            time_window: (None, None),
            y_range: (None, None),
            line_style: LineStyle::Linear,
            span_gaps: false,
            clock: LocalClock::System,
            frame: None,
            x_grid: None,
            y_grid: None,
            grid_stroke: Stroke::solid(Rgba::BLACK).dashed(DashPattern::new(1, 2)),
            labels: None,
        }
    }

    /// Set the top-left corner of the plot box.
    #[must_use]
    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the output dimensions.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Add a data series.
    #[must_use]
    pub fn add_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    /// Set the time window in unix seconds; `None` ends use the data extent.
    #[must_use]
    pub fn time_window(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.time_window = (start, end);
        self
    }

    /// Set the value range; `None` ends use the data extent.
    #[must_use]
    pub fn y_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.y_range = (min, max);
        self
    }

    /// Set the line style for every run.
    #[must_use]
    pub fn line_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    /// Join runs across null samples.
    #[must_use]
    pub fn span_gaps(mut self, span: bool) -> Self {
        self.span_gaps = span;
        self
    }

    /// Set the clock used to place timestamps.
    #[must_use]
    pub fn clock(mut self, clock: LocalClock) -> Self {
        self.clock = clock;
        self
    }

    /// Draw a one-pixel frame around the plot box.
    #[must_use]
    pub fn frame(mut self, color: Option<Rgba>) -> Self {
        self.frame = color;
        self
    }

    /// Vertical grid lines every `seconds` of local time. Non-positive disables.
    #[must_use]
    pub fn x_grid(mut self, seconds: Option<f64>) -> Self {
        self.x_grid = seconds.filter(|s| *s > 0.0 && s.is_finite());
        self
    }

    /// Horizontal grid lines every `step` value units. Non-positive disables.
    #[must_use]
    pub fn y_grid(mut self, step: Option<f64>) -> Self {
        self.y_grid = step.filter(|s| *s > 0.0 && s.is_finite());
        self
    }

    /// Set the grid stroke.
    #[must_use]
    pub fn grid_stroke(mut self, stroke: Stroke) -> Self {
        self.grid_stroke = stroke;
        self
    }

    /// Draw min/max value labels in `color`.
    #[must_use]
    pub fn labels(mut self, color: Option<Rgba>) -> Self {
        self.labels = color;
        self
    }

    /// Local-time extent of all samples.
    fn time_extent(&self) -> Option<(f64, f64)> {
        let times: Vec<f64> = self
            .series
            .iter()
            .flat_map(|s| s.samples.iter().map(|p| self.clock.to_local(p.time)))
            .collect();
        extent(&times)
    }

    fn value_extent(&self) -> Option<(f64, f64)> {
        let values: Vec<f64> =
            self.series.iter().flat_map(|s| s.samples.iter().filter_map(|p| p.value)).collect();
        extent(&values)
    }

    /// Pixel edges of the box as (left, top, right, bottom), inclusive.
    fn edges(&self) -> (f64, f64, f64, f64) {
        let left = f64::from(self.x);
        let top = f64::from(self.y);
        (left, top, left + f64::from(self.width) - 1.0, top + f64::from(self.height) - 1.0)
    }

    fn scales(&self) -> Option<(LinearScale, LinearScale)> {
        let (left, top, right, bottom) = self.edges();

        let data_t = self.time_extent();
        let t0 = self.time_window.0.map(|t| self.clock.to_local(t)).or(data_t.map(|e| e.0))?;
        let t1 = self.time_window.1.map(|t| self.clock.to_local(t)).or(data_t.map(|e| e.1))?;
        let x_scale = LinearScale::new((t0, t1), (left, right))
            .ok()
            .or_else(|| LinearScale::from_data(&[t0, t1], (left, right)))?;

        let data_v = self.value_extent();
        let v0 = self.y_range.0.or(data_v.map(|e| e.0))?;
        let v1 = self.y_range.1.or(data_v.map(|e| e.1))?;
        let y_scale = LinearScale::new((v0, v1), (bottom, top))
            .ok()
            .or_else(|| LinearScale::from_data(&[v0, v1], (bottom, top)))?;
        Some((x_scale, y_scale))
    }

    /// Render the plot into `fb`. `font` is needed only for labels.
    ///
    /// Series ink never leaves the plot box: samples outside the time window
    /// or value range are drawn toward their true position and cut at the
    /// box edge.
    pub fn render(&self, fb: &mut Framebuffer, font: Option<&Font>) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        if let Some(color) = self.frame {
            draw_rect_outline(fb, self.x, self.y, self.width, self.height, color, 1);
        }
        let Some((x_scale, y_scale)) = self.scales() else { return };

        self.render_grid(fb, &x_scale, &y_scale);
        self.render_series(fb, &x_scale, &y_scale);

        if let (Some(color), Some(font)) = (self.labels, font) {
            let (lo, hi) = y_scale.domain();
            let (left, top) = (i64::from(self.x), i64::from(self.y));
            let bottom = top + i64::from(self.height) - 1;
            draw_text(fb, font, &format_value(hi), left + 2, top + 1, color);
            draw_text(fb, font, &format_value(lo), left + 2, bottom - i64::from(font.line_height()), color);
        }
    }

    fn render_series(&self, fb: &mut Framebuffer, x_scale: &LinearScale, y_scale: &LinearScale) {
        let (left, top, right, bottom) = self.edges();
        let (limit_x, limit_y) = (f64::from(fb.width()) - 1.0, f64::from(fb.height()) - 1.0);
        if right < 0.0 || bottom < 0.0 || left > limit_x || top > limit_y {
            return;
        }
        let Ok(mut ink) = Framebuffer::new(fb.width(), fb.height()) else { return };

        for series in &self.series {
            let stroke = Stroke::solid(series.color).width(series.width).dashed(series.dash);
            for run in runs(&series.samples, self.span_gaps) {
                let points: Vec<Point> = run
                    .iter()
                    .map(|&(t, v)| {
                        Point::new(
                            narrow(x_scale.scale(self.clock.to_local(t))),
                            narrow(y_scale.scale(v)),
                        )
                    })
                    .collect();
                if let ([dot], true) = (points.as_slice(), series.width > 1) {
                    let (cx, cy) = dot.to_pixel();
                    draw_circle(&mut ink, cx, cy, (series.width / 2) as i32, series.color);
                    continue;
                }
                let path = match self.line_style {
                    LineStyle::Linear => points,
                    LineStyle::Step => step_path(&points),
                };
                stroke_polyline(&mut ink, &path, &stroke);
            }
        }

        let (x0, y0) = (left.max(0.0) as u32, top.max(0.0) as u32);
        let (x1, y1) = (right.min(limit_x) as u32, bottom.min(limit_y) as u32);
        if let Err(e) = fb.overlay_within(&ink, x0, y0, x1, y1) {
            warn!(error = %e, "plot series layer mismatch");
        }
    }

    fn render_grid(&self, fb: &mut Framebuffer, x_scale: &LinearScale, y_scale: &LinearScale) {
        let (left, top, right, bottom) = self.edges();

        if let (Some(step), Some((domain, pixels))) = (self.y_grid, visible_domain(y_scale, fb.height())) {
            for v in grid_values(domain, step, pixels) {
                let py = y_scale.scale(v) as f32;
                let line = [Point::new(left as f32, py), Point::new(right as f32, py)];
                stroke_polyline(fb, &line, &self.grid_stroke);
            }
        }
        if let (Some(step), Some((domain, pixels))) = (self.x_grid, visible_domain(x_scale, fb.width())) {
            for t in grid_values(domain, step, pixels) {
                let px = x_scale.scale(t) as f32;
                let line = [Point::new(px, top as f32), Point::new(px, bottom as f32)];
                stroke_polyline(fb, &line, &self.grid_stroke);
            }
        }
    }
}

impl batuta_common::display::WithDimensions for TimeSeriesPlot {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Pixel coordinate as `f32`, kept finite for far off-box samples.
fn narrow(v: f64) -> f32 {
    v.clamp(-1e30, 1e30) as f32
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (lo <= hi).then_some((lo, hi))
}

/// Domain interval covered by the on-canvas part of `scale`'s range, and its
/// length in pixels. `limit` is the canvas size along the same axis.
fn visible_domain(scale: &LinearScale, limit: u32) -> Option<((f64, f64), u32)> {
    let (r0, r1) = scale.range();
    let (d0, d1) = scale.domain();
    let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
    let (vlo, vhi) = (lo.max(0.0), hi.min(f64::from(limit) - 1.0));
    if vlo > vhi {
        return None;
    }
    // Unclipped ends keep their exact domain value.
    let at = |px: f64| {
        if px == r0 {
            d0
        } else if px == r1 {
            d1
        } else {
            scale.invert(px)
        }
    };
    Some(((at(vlo), at(vhi)), (vhi - vlo) as u32 + 1))
}

/// Multiples of `step` inside `domain`; empty if there would be more lines
/// than pixels.
fn grid_values(domain: (f64, f64), step: f64, pixels: u32) -> Vec<f64> {
    let (lo, hi) = if domain.0 <= domain.1 { domain } else { (domain.1, domain.0) };
    let count = ((hi - lo) / step).floor();
    if !count.is_finite() || count > f64::from(pixels) {
        return Vec::new();
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn format_value(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn draw_text(fb: &mut Framebuffer, font: &Font, text: &str, x: i64, y: i64, color: Rgba) {
    let mut cursor = x;
    for ch in text.chars() {
        draw_glyph(fb, font, ch, cursor, y, color);
        cursor += i64::from(font.advance(ch));
    }
}
