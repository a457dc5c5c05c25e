//! Typed drawable elements.
//!
//! Parameter structs hold unresolved coordinates; percentages are resolved
//! against the canvas each time an element is drawn.

use crate::color::Rgba;
use crate::geometry::{Anchor, Point, Rect};
use crate::plots::{LineStyle, Series};
use crate::quantize::{Dither, PaletteId};
use crate::render::{DashPattern, ResizeMethod};
use crate::text::TextAlign;

// ============================================================================
// Canvas
// ============================================================================

/// Validated canvas descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    /// Width in pixels, before global rotation.
    pub width: u32,
    /// Height in pixels, before global rotation.
    pub height: u32,
    /// Device palette.
    pub palette: PaletteId,
    /// Global clockwise rotation in quarter turns (0..=3).
    pub quarter_turns: u32,
    /// Background color.
    pub background: Rgba,
    /// Dithering override; `None` uses the configured default.
    pub dither: Option<Dither>,
}

impl CanvasSpec {
    /// A white canvas without rotation.
    #[must_use]
    pub const fn new(width: u32, height: u32, palette: PaletteId) -> Self {
        Self { width, height, palette, quarter_turns: 0, background: Rgba::WHITE, dither: None }
    }

    /// Resolve a coordinate pair against this canvas.
    #[must_use]
    pub fn resolve(&self, position: Position) -> Point {
        Point::new(position.x.resolve(self.width), position.y.resolve(self.height))
    }

    /// Resolve a color name, including `accent`, for this canvas' palette.
    #[must_use]
    pub fn color(&self, name: &str) -> Option<Rgba> {
        if name.trim().eq_ignore_ascii_case("accent") {
            return Some(self.palette.palette().accent());
        }
        Rgba::from_name(name)
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// A coordinate in pixels or as a percentage of the canvas extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the canvas width (x) or height (y).
    Percent(f32),
}

impl Coord {
    /// Pixel value against `extent`.
    #[must_use]
    pub fn resolve(self, extent: u32) -> f32 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => (p * extent as f32 / 100.0).round(),
        }
    }

    /// Parse `"12"`, `"12.5"` or `"50%"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(pct) = text.strip_suffix('%') {
            return pct.trim().parse::<f32>().ok().filter(|v| v.is_finite()).map(Self::Percent);
        }
        text.parse::<f32>().ok().filter(|v| v.is_finite()).map(Self::Px)
    }
}

impl Default for Coord {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

/// An unresolved (x, y) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: Coord,
    /// Vertical coordinate.
    pub y: Coord,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Pixel position.
    #[must_use]
    pub const fn px(x: f32, y: f32) -> Self {
        Self { x: Coord::Px(x), y: Coord::Px(y) }
    }
}

/// An unresolved box given by two corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSpec {
    /// First corner.
    pub start: Position,
    /// Opposite corner.
    pub end: Position,
}

impl BoxSpec {
    /// Normalized rectangle; the end corner is inclusive.
    #[must_use]
    pub fn resolve(&self, canvas: &CanvasSpec) -> Rect {
        Rect::from_corners(canvas.resolve(self.start), canvas.resolve(self.end))
    }
}

// ============================================================================
// Element
// ============================================================================

/// One drawable instruction with its common attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Position in the input list; also the z-order.
    pub index: usize,
    /// Invisible elements are validated but never drawn.
    pub visible: bool,
    /// Clockwise rotation in degrees about the element's pivot.
    pub rotate: f32,
    /// Anchor of the element box at its position.
    pub anchor: Anchor,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Kind-specific parameters.
    pub kind: ElementKind,
}

impl Element {
    /// Wrap `kind` with default common attributes.
    #[must_use]
    pub fn new(index: usize, kind: ElementKind) -> Self {
        Self { index, visible: true, rotate: 0.0, anchor: Anchor::TopLeft, opacity: 1.0, kind }
    }
}

/// Closed set of element kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Styled, wrapped text.
    Text(TextParams),
    /// Straight line or polyline.
    Line(LineParams),
    /// Rectangle with optional rounded corners.
    Rectangle(RectangleParams),
    /// Circle given by center and radius.
    Circle(CircleParams),
    /// Ellipse inscribed in a box.
    Ellipse(EllipseParams),
    /// Elliptical arc.
    Arc(ArcParams),
    /// Closed polygon.
    Polygon(PolygonParams),
    /// Time-series plot.
    Plot(PlotParams),
    /// Tinted icon from the resource provider.
    Icon(IconParams),
    /// Provider image.
    Image(ImageParams),
    /// Debug guide grid.
    DebugGrid(DebugGridParams),
    /// Progress bar.
    ProgressBar(ProgressParams),
}

impl ElementKind {
    /// Kind name as used in input records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Line(_) => "line",
            Self::Rectangle(_) => "rectangle",
            Self::Circle(_) => "circle",
            Self::Ellipse(_) => "ellipse",
            Self::Arc(_) => "arc",
            Self::Polygon(_) => "polygon",
            Self::Plot(_) => "plot",
            Self::Icon(_) => "icon",
            Self::Image(_) => "dlimg",
            Self::DebugGrid(_) => "debug_grid",
            Self::ProgressBar(_) => "progress_bar",
        }
    }
}

// ============================================================================
// Kind Parameters
// ============================================================================

/// Fill and outline shared by closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeStyle {
    /// Interior color.
    pub fill: Option<Rgba>,
    /// Border color.
    pub outline: Option<Rgba>,
    /// Border width in pixels, grown inward.
    pub width: u32,
    /// Optional dash for the border.
    pub dash: Option<DashPattern>,
}

/// `text` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Anchor position.
    pub at: Position,
    /// Text with inline color markup.
    pub value: String,
    /// Font family.
    pub font: String,
    /// Font size.
    pub size: u32,
    /// Default color outside markup.
    pub color: Rgba,
    /// Per-line alignment.
    pub align: TextAlign,
    /// Wrap width.
    pub max_width: Option<Coord>,
    /// Extra pixels between lines.
    pub spacing: u32,
}

/// `line` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LineParams {
    /// Vertices, two for a simple line.
    pub points: Vec<Position>,
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width.
    pub width: u32,
    /// Optional dash.
    pub dash: Option<DashPattern>,
}

/// `rectangle` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleParams {
    /// Corners, end inclusive.
    pub bounds: BoxSpec,
    /// Fill and outline.
    pub style: ShapeStyle,
    /// Corner radius.
    pub radius: u32,
}

/// `circle` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleParams {
    /// Center.
    pub center: Position,
    /// Radius in pixels.
    pub radius: f32,
    /// Fill and outline.
    pub style: ShapeStyle,
}

/// `ellipse` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseParams {
    /// Bounding box.
    pub bounds: BoxSpec,
    /// Fill and outline.
    pub style: ShapeStyle,
}

/// Where an arc's ellipse lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcBounds {
    /// Ellipse inscribed in a box.
    Box(BoxSpec),
    /// Circle by center and radius.
    Circle {
        /// Center.
        center: Position,
        /// Radius.
        radius: f32,
    },
}

/// `arc` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcParams {
    /// Ellipse the arc follows.
    pub bounds: ArcBounds,
    /// Start angle, degrees clockwise from 3 o'clock.
    pub start_angle: f32,
    /// End angle.
    pub end_angle: f32,
    /// Stroke color.
    pub color: Rgba,
    /// Stroke width, grown inward.
    pub width: u32,
    /// Optional dash.
    pub dash: Option<DashPattern>,
}

/// `polygon` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonParams {
    /// Vertices; the polygon closes itself.
    pub points: Vec<Position>,
    /// Fill and outline.
    pub style: ShapeStyle,
}

/// `plot` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotParams {
    /// Plot box.
    pub bounds: BoxSpec,
    /// Data series.
    pub series: Vec<Series>,
    /// Window start, unix seconds.
    pub start: Option<f64>,
    /// Window end, unix seconds.
    pub end: Option<f64>,
    /// Lower value bound.
    pub y_min: Option<f64>,
    /// Upper value bound.
    pub y_max: Option<f64>,
    /// Segment style for every run.
    pub line_style: LineStyle,
    /// Join runs across nulls.
    pub span_gaps: bool,
    /// Frame color.
    pub frame: Option<Rgba>,
    /// Vertical grid interval in seconds.
    pub x_grid: Option<f64>,
    /// Horizontal grid interval in value units.
    pub y_grid: Option<f64>,
    /// Grid line color.
    pub grid_color: Rgba,
    /// Min/max label color; `None` disables labels.
    pub labels: Option<Rgba>,
    /// Label font family.
    pub font: String,
    /// Label font size.
    pub font_size: u32,
}

/// `icon` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IconParams {
    /// Anchor position.
    pub at: Position,
    /// Icon name with any namespace prefix removed.
    pub name: String,
    /// Edge length in pixels.
    pub size: u32,
    /// Tint.
    pub color: Rgba,
}

/// `dlimg` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    /// Anchor position.
    pub at: Position,
    /// Provider reference (URL or path).
    pub reference: String,
    /// Target width; `None` keeps the image width.
    pub width: Option<u32>,
    /// Target height; `None` keeps the image height.
    pub height: Option<u32>,
    /// Fitting policy.
    pub resize: ResizeMethod,
}

/// `debug_grid` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugGridParams {
    /// Line spacing in pixels (positive).
    pub spacing: u32,
    /// Line color.
    pub color: Rgba,
    /// Dash; `None` draws solid lines.
    pub dash: Option<DashPattern>,
    /// Draw coordinate labels.
    pub show_labels: bool,
    /// Label every n-th line.
    pub label_every: u32,
    /// Label color.
    pub label_color: Rgba,
    /// Label font size.
    pub font_size: u32,
}

/// Fill direction of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressDirection {
    /// Fills from the left edge.
    #[default]
    Right,
    /// Fills from the right edge.
    Left,
    /// Fills from the bottom edge.
    Up,
    /// Fills from the top edge.
    Down,
}

impl ProgressDirection {
    /// Parse `right`, `left`, `up` or `down`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "right" => Some(Self::Right),
            "left" => Some(Self::Left),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// `progress_bar` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressParams {
    /// Bar box.
    pub bounds: BoxSpec,
    /// Progress in percent, clamped to `[0, 100]`.
    pub progress: f32,
    /// Fill direction.
    pub direction: ProgressDirection,
    /// Fill color.
    pub fill: Rgba,
    /// Background color.
    pub background: Option<Rgba>,
    /// Outline color.
    pub outline: Option<Rgba>,
    /// Outline width.
    pub width: u32,
    /// Draw a centered percentage label.
    pub show_percentage: bool,
    /// Label font size.
    pub font_size: u32,
}
