//! Shape and path rasterization.
//!
//! All output is aliased: every pixel is either fully inked or untouched.
//!
//! # Algorithms
//!
//! - **Bresenham's Line**: integer line walking, reused for dashes
//! - **Midpoint Circle**: filled plot markers
//! - **Scanline fill**: ellipses, rings and even-odd polygons
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."

mod grid;
mod image;
mod path;
mod primitives;

pub use grid::{draw_debug_grid, GridLabels};
pub use image::{blit, draw_icon, resize_image, ResizeMethod};
pub use path::{arc_points, arc_sweep, draw_arc, stroke_closed, stroke_polyline, DashPattern, Stroke};
pub use primitives::{
    draw_circle, draw_line, draw_rect, draw_rect_outline, fill_ellipse, fill_polygon, fill_rounded_rect,
    line_pixels, stamp,
};
