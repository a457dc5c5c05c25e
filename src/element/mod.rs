//! Element model and validation.
//!
//! [`parse_canvas`] and [`parse_elements`] turn loosely-typed JSON records
//! into a [`CanvasSpec`] and a list of typed [`Element`]s.

mod model;
mod parser;

pub use model::{
    ArcBounds, ArcParams, BoxSpec, CanvasSpec, CircleParams, Coord, DebugGridParams, Element, ElementKind,
    EllipseParams, IconParams, ImageParams, LineParams, PlotParams, PolygonParams, Position,
    ProgressDirection, ProgressParams, RectangleParams, ShapeStyle, TextParams,
};
pub use parser::{parse_canvas, parse_elements, schema_for, KindSchema, COMMON_FIELDS, KIND_SCHEMAS};
