//! Geometric primitives shared by the renderers.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate this point clockwise (screen coordinates) about `pivot`.
    #[must_use]
    pub fn rotate_about(self, pivot: Self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Self::new(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
    }

    /// Round to the nearest pixel.
    #[must_use]
    pub fn to_pixel(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from two arbitrary corner points.
    ///
    /// Corners may be given in any order; the result has non-negative size.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Get the center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Named reference point of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Top-left corner.
    #[default]
    TopLeft,
    /// Middle of the top edge.
    Top,
    /// Top-right corner.
    TopRight,
    /// Middle of the left edge.
    Left,
    /// Center of the box.
    Center,
    /// Middle of the right edge.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the bottom edge.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Parse an anchor keyword.
    ///
    /// Accepts snake/kebab names (`top_left`, `center`) and the two-letter
    /// horizontal+vertical codes (`lt`, `mm`, `rb`).
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        let anchor = match keyword.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top_left" | "lt" | "la" => Self::TopLeft,
            "top" | "top_center" | "mt" | "ma" => Self::Top,
            "top_right" | "rt" | "ra" => Self::TopRight,
            "left" | "center_left" | "lm" => Self::Left,
            "center" | "middle" | "mm" => Self::Center,
            "right" | "center_right" | "rm" => Self::Right,
            "bottom_left" | "lb" | "ld" => Self::BottomLeft,
            "bottom" | "bottom_center" | "mb" | "md" => Self::Bottom,
            "bottom_right" | "rb" | "rd" => Self::BottomRight,
            _ => return None,
        };
        Some(anchor)
    }

    /// Horizontal and vertical position of the anchor as fractions of the box.
    #[must_use]
    pub const fn fractions(self) -> (f32, f32) {
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::Top => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::Left => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::Right => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::Bottom => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }

    /// Top-left origin of a `width` x `height` box whose anchor lands on `at`.
    #[must_use]
    pub fn origin(self, at: Point, width: f32, height: f32) -> Point {
        let (fx, fy) = self.fractions();
        Point::new((at.x - width * fx).round(), (at.y - height * fy).round())
    }
}

/// Integer pixel bounds, used for refresh hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelBounds {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
