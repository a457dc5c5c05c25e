//! Validation of loosely-typed canvas and element records.
//!
//! Records arrive as JSON values. A bad canvas aborts the request; a bad
//! element is skipped with a warning; a bad enumerated option falls back to
//! its default with a warning.

use serde_json::{Map, Value};
use tracing::debug;

use super::model::{
    ArcBounds, ArcParams, BoxSpec, CanvasSpec, CircleParams, Coord, DebugGridParams, Element, ElementKind,
    EllipseParams, IconParams, ImageParams, LineParams, PlotParams, PolygonParams, Position,
    ProgressDirection, ProgressParams, RectangleParams, ShapeStyle, TextParams,
};
use crate::color::Rgba;
use crate::config::RenderConfig;
use crate::error::{Error, RenderWarning, Result, WarningKind};
use crate::geometry::Anchor;
use crate::plots::{parse_timestamp, LineStyle, Sample, Series};
use crate::quantize::{Dither, PaletteId};
use crate::render::{DashPattern, ResizeMethod};
use crate::resources::strip_icon_prefix;
use crate::text::TextAlign;

// ============================================================================
// Schemas
// ============================================================================

/// Field table for one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSchema {
    /// Canonical kind name.
    pub kind: &'static str,
    /// Accepted alternative names.
    pub aliases: &'static [&'static str],
    /// Fields that must be present.
    pub required: &'static [&'static str],
    /// Groups of which at least one must be fully present.
    pub alternatives: &'static [&'static [&'static str]],
    /// Fields that may be present.
    pub optional: &'static [&'static str],
}

impl KindSchema {
    fn knows(&self, field: &str) -> bool {
        COMMON_FIELDS.contains(&field)
            || self.required.contains(&field)
            || self.optional.contains(&field)
            || self.alternatives.iter().any(|group| group.contains(&field))
    }
}

/// Fields every kind accepts.
pub const COMMON_FIELDS: &[&str] = &["type", "visible", "rotate", "anchor", "opacity"];

const BOX: &[&str] = &["x_start", "y_start", "x_end", "y_end"];

/// Every supported element kind.
pub static KIND_SCHEMAS: &[KindSchema] = &[
    KindSchema {
        kind: "text",
        aliases: &[],
        required: &["x", "y", "value"],
        alternatives: &[],
        optional: &["size", "font", "color", "fill", "align", "max_width", "spacing"],
    },
    KindSchema {
        kind: "line",
        aliases: &["polyline"],
        required: &[],
        alternatives: &[BOX, &["points"]],
        optional: &["width", "color", "fill", "dashed", "dash_length", "space_length"],
    },
    KindSchema {
        kind: "rectangle",
        aliases: &["rect"],
        required: BOX,
        alternatives: &[],
        optional: &["fill", "outline", "width", "radius", "dashed", "dash_length", "space_length"],
    },
    KindSchema {
        kind: "circle",
        aliases: &[],
        required: &["x", "y", "radius"],
        alternatives: &[],
        optional: &["fill", "outline", "width"],
    },
    KindSchema {
        kind: "ellipse",
        aliases: &[],
        required: BOX,
        alternatives: &[],
        optional: &["fill", "outline", "width"],
    },
    KindSchema {
        kind: "arc",
        aliases: &[],
        required: &["start_angle", "end_angle"],
        alternatives: &[BOX, &["x", "y", "radius"]],
        optional: &["color", "outline", "fill", "width", "dashed", "dash_length", "space_length"],
    },
    KindSchema {
        kind: "polygon",
        aliases: &[],
        required: &["points"],
        alternatives: &[],
        optional: &["fill", "outline", "width", "dashed", "dash_length", "space_length"],
    },
    KindSchema {
        kind: "plot",
        aliases: &[],
        required: BOX,
        alternatives: &[&["data"], &["series"]],
        optional: &[
            "start", "end", "y_min", "y_max", "line_style", "span_gaps", "frame", "x_grid", "y_grid",
            "grid_color", "labels", "label_color", "font", "size", "color", "width", "dashed", "dash_length",
            "space_length",
        ],
    },
    KindSchema {
        kind: "icon",
        aliases: &[],
        required: &["x", "y", "value"],
        alternatives: &[],
        optional: &["size", "color", "fill"],
    },
    KindSchema {
        kind: "dlimg",
        aliases: &["downloaded_image", "image"],
        required: &["x", "y", "url"],
        alternatives: &[],
        optional: &["xsize", "ysize", "resize_method"],
    },
    KindSchema {
        kind: "debug_grid",
        aliases: &["debuggrid"],
        required: &[],
        alternatives: &[],
        optional: &[
            "spacing", "line_color", "dashed", "dash_length", "space_length", "show_labels", "label_step",
            "label_color", "font_size",
        ],
    },
    KindSchema {
        kind: "progress_bar",
        aliases: &["progressbar", "progress"],
        required: &["x_start", "y_start", "x_end", "y_end", "progress"],
        alternatives: &[],
        optional: &["direction", "fill", "background", "outline", "width", "show_percentage", "size"],
    },
];

/// Look up a schema by kind name or alias, case-insensitively.
#[must_use]
pub fn schema_for(kind: &str) -> Option<&'static KindSchema> {
    let kind = kind.trim().to_ascii_lowercase().replace('-', "_");
    KIND_SCHEMAS.iter().find(|s| s.kind == kind || s.aliases.contains(&kind.as_str()))
}

// ============================================================================
// Canvas
// ============================================================================

/// Validate a canvas record.
///
/// Returns the canvas and any warnings about unsupported options.
///
/// # Errors
///
/// Returns [`Error::InvalidCanvas`] for a non-object record, a non-positive
/// or non-integral `width`/`height`, an unknown `palette`, or a `rotation`
/// that is not a multiple of 90.
pub fn parse_canvas(record: &Value) -> Result<(CanvasSpec, Vec<RenderWarning>)> {
    let map = record.as_object().ok_or_else(|| Error::canvas("canvas", "must be an object"))?;
    let width = dimension(map, "width")?;
    let height = dimension(map, "height")?;

    let palette = match map.get("palette") {
        Some(Value::String(name)) => {
            PaletteId::parse(name).ok_or_else(|| Error::canvas("palette", format!("unknown palette `{name}`")))?
        }
        Some(other) => return Err(Error::canvas("palette", format!("expected a string, got {other}"))),
        None => return Err(Error::canvas("palette", "missing")),
    };

    let quarter_turns = match map.get("rotation").or_else(|| map.get("rotate")) {
        None | Some(Value::Null) => 0,
        Some(value) => {
            let degrees = value
                .as_f64()
                .filter(|d| d.fract() == 0.0)
                .ok_or_else(|| Error::canvas("rotation", format!("expected whole degrees, got {value}")))?;
            if degrees % 90.0 != 0.0 {
                return Err(Error::canvas("rotation", format!("{degrees} is not a multiple of 90")));
            }
            (degrees.rem_euclid(360.0) / 90.0) as u32
        }
    };

    let mut canvas = CanvasSpec::new(width, height, palette);
    canvas.quarter_turns = quarter_turns;
    let mut warnings = Vec::new();

    if let Some(value) = map.get("background").filter(|v| !v.is_null()) {
        match value.as_str().and_then(|name| canvas.color(name)) {
            Some(color) if !color.is_transparent() => canvas.background = color,
            _ => warnings.push(RenderWarning::canvas(
                WarningKind::UnsupportedOption,
                format!("background {value} not recognized, using white"),
            )),
        }
    }

    if let Some(value) = map.get("dither").filter(|v| !v.is_null()) {
        let parsed = match value {
            Value::String(s) => Dither::parse(s),
            Value::Bool(true) => Some(Dither::FloydSteinberg),
            Value::Bool(false) => Some(Dither::None),
            Value::Number(n) => Dither::parse(&n.to_string()),
            _ => None,
        };
        match parsed {
            Some(dither) => canvas.dither = Some(dither),
            None => warnings.push(RenderWarning::canvas(
                WarningKind::UnsupportedOption,
                format!("dither {value} not recognized, using default"),
            )),
        }
    }

    Ok((canvas, warnings))
}

fn dimension(map: &Map<String, Value>, field: &'static str) -> Result<u32> {
    let value = map.get(field).ok_or_else(|| Error::canvas(field, "missing"))?;
    let n = value.as_f64().ok_or_else(|| Error::canvas(field, format!("expected a number, got {value}")))?;
    if n <= 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(Error::canvas(field, format!("must be a positive integer, got {n}")));
    }
    Ok(n as u32)
}

// ============================================================================
// Elements
// ============================================================================

/// Validate element records in order.
///
/// Invalid records are skipped and reported; the returned elements keep
/// their input index.
#[must_use]
pub fn parse_elements(
    records: &[Value],
    canvas: &CanvasSpec,
    config: &RenderConfig,
) -> (Vec<Element>, Vec<RenderWarning>) {
    let mut elements = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match parse_element(index, record, canvas, config, &mut warnings) {
            Ok(element) => elements.push(element),
            Err(message) => warnings.push(RenderWarning::element(index, WarningKind::InvalidElement, message)),
        }
    }
    (elements, warnings)
}

type FieldResult<T> = std::result::Result<T, String>;

fn parse_element(
    index: usize,
    record: &Value,
    canvas: &CanvasSpec,
    config: &RenderConfig,
    warnings: &mut Vec<RenderWarning>,
) -> FieldResult<Element> {
    let map = record.as_object().ok_or("element must be an object")?;
    let kind_name = match map.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(format!("`type` must be a string, got {other}")),
        None => return Err("missing `type`".to_string()),
    };
    let schema = schema_for(kind_name).ok_or_else(|| format!("unknown element type `{kind_name}`"))?;

    let present = |field: &str| map.get(field).is_some_and(|v| !v.is_null());
    if let Some(missing) = schema.required.iter().find(|f| !present(**f)) {
        return Err(format!("{}: missing required field `{missing}`", schema.kind));
    }
    if !schema.alternatives.is_empty() && !schema.alternatives.iter().any(|group| group.iter().all(|f| present(*f))) {
        let groups: Vec<String> = schema.alternatives.iter().map(|g| g.join("+")).collect();
        return Err(format!("{}: needs one of {}", schema.kind, groups.join(" or ")));
    }
    for field in map.keys().filter(|f| !schema.knows(f.as_str())) {
        debug!(index, kind = schema.kind, field = %field, "ignoring unknown field");
    }

    let mut f = Fields { index, map, canvas, warnings };
    let visible = f.bool_or("visible", true)?;
    // Whole turns are dropped so huge angles stay finite as f32.
    let rotate = (f.number_or("rotate", 0.0)? % 360.0) as f32;
    let anchor = f.option("anchor", Anchor::parse, Anchor::TopLeft)?;
    let opacity = f.number_or("opacity", 1.0)?.clamp(0.0, 1.0) as f32;

    let kind = match schema.kind {
        "text" => ElementKind::Text(text_params(&mut f, config)?),
        "line" => ElementKind::Line(line_params(&mut f)?),
        "rectangle" => ElementKind::Rectangle(RectangleParams {
            bounds: f.bounds()?,
            style: f.shape_style()?,
            radius: f.uint_extent_or("radius", 0)?,
        }),
        "circle" => ElementKind::Circle(CircleParams {
            center: f.position("x", "y")?,
            radius: f.number("radius")?.max(0.0) as f32,
            style: f.shape_style()?,
        }),
        "ellipse" => ElementKind::Ellipse(EllipseParams { bounds: f.bounds()?, style: f.shape_style()? }),
        "arc" => ElementKind::Arc(arc_params(&mut f)?),
        "polygon" => {
            let points = f.points("points")?;
            if points.len() < 3 {
                return Err(format!("polygon needs at least 3 points, got {}", points.len()));
            }
            ElementKind::Polygon(PolygonParams { points, style: f.shape_style()? })
        }
        "plot" => ElementKind::Plot(plot_params(&mut f, config)?),
        "icon" => ElementKind::Icon(IconParams {
            at: f.position("x", "y")?,
            name: strip_icon_prefix(&f.string("value")?).to_string(),
            size: f.extent_or("size", 24)?,
            color: f.color_or(&["color", "fill"], Rgba::BLACK)?,
        }),
        "dlimg" => ElementKind::Image(ImageParams {
            at: f.position("x", "y")?,
            reference: f.string("url")?,
            width: f.opt_extent("xsize")?,
            height: f.opt_extent("ysize")?,
            resize: f.option("resize_method", ResizeMethod::parse, ResizeMethod::Stretch)?,
        }),
        "debug_grid" => ElementKind::DebugGrid(grid_params(&mut f, config)?),
        "progress_bar" => ElementKind::ProgressBar(progress_params(&mut f, config)?),
        other => return Err(format!("no builder for `{other}`")),
    };
    Ok(Element { index, visible, rotate, anchor, opacity, kind })
}

fn text_params(f: &mut Fields<'_>, config: &RenderConfig) -> FieldResult<TextParams> {
    let max_width = match f.opt_coord("max_width")? {
        Some(Coord::Px(w) | Coord::Percent(w)) if w <= 0.0 => {
            f.warn(WarningKind::UnsupportedOption, format!("max_width {w} ignored"));
            None
        }
        other => other,
    };
    Ok(TextParams {
        at: f.position("x", "y")?,
        value: f.string("value")?,
        font: f.opt_string("font")?.unwrap_or_else(|| config.font_family.clone()),
        size: f.extent_or("size", config.font_size)?,
        color: f.color_or(&["color", "fill"], Rgba::BLACK)?,
        align: f.option("align", TextAlign::parse, TextAlign::Left)?,
        max_width,
        spacing: f.uint_extent_or("spacing", config.line_spacing)?,
    })
}

fn line_params(f: &mut Fields<'_>) -> FieldResult<LineParams> {
    let points = if f.has("points") {
        let points = f.points("points")?;
        if points.is_empty() {
            return Err("line needs at least one point".to_string());
        }
        points
    } else {
        vec![f.position("x_start", "y_start")?, f.position("x_end", "y_end")?]
    };
    Ok(LineParams {
        points,
        color: f.color_or(&["color", "fill"], Rgba::BLACK)?,
        width: f.extent_or("width", 1)?,
        dash: f.dash()?,
    })
}

fn arc_params(f: &mut Fields<'_>) -> FieldResult<ArcParams> {
    let bounds = if BOX.iter().all(|k| f.has(k)) {
        ArcBounds::Box(f.bounds()?)
    } else {
        ArcBounds::Circle { center: f.position("x", "y")?, radius: f.number("radius")?.max(0.0) as f32 }
    };
    Ok(ArcParams {
        bounds,
        start_angle: f.number("start_angle")? as f32,
        end_angle: f.number("end_angle")? as f32,
        color: f.color_or(&["color", "outline", "fill"], Rgba::BLACK)?,
        width: f.extent_or("width", 1)?,
        dash: f.dash()?,
    })
}

fn plot_params(f: &mut Fields<'_>, config: &RenderConfig) -> FieldResult<PlotParams> {
    let color = f.color_or(&["color"], Rgba::BLACK)?;
    let width = f.extent_or("width", 1)?;
    let dash = f.dash()?;

    let series = if f.has("series") {
        let items = f.array("series")?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| format!("series[{i}] must be an object"))?;
            let mut sf = Fields { index: f.index, map: obj, canvas: f.canvas, warnings: &mut *f.warnings };
            let data = sf.array("data").map_err(|e| format!("series[{i}]: {e}"))?;
            out.push(
                Series::new(samples(&data).map_err(|e| format!("series[{i}]: {e}"))?)
                    .color(sf.color_or(&["color"], color)?)
                    .width(sf.extent_or("width", width)?)
                    .dash(if sf.has("dashed") { sf.dash()? } else { dash }),
            );
        }
        out
    } else {
        let data = f.array("data")?;
        vec![Series::new(samples(&data)?).color(color).width(width).dash(dash)]
    };

    let x_grid = f.grid_interval("x_grid")?;
    let y_grid = f.grid_interval("y_grid")?;
    let labels = if f.bool_or("labels", false)? {
        Some(f.color_or(&["label_color"], Rgba::BLACK)?)
    } else {
        None
    };

    Ok(PlotParams {
        bounds: f.bounds()?,
        series,
        start: f.opt_time("start")?,
        end: f.opt_time("end")?,
        y_min: f.opt_number("y_min")?,
        y_max: f.opt_number("y_max")?,
        line_style: f.option("line_style", LineStyle::parse, LineStyle::Linear)?,
        span_gaps: f.bool_or("span_gaps", false)?,
        frame: f.opt_color(&["frame"])?,
        x_grid,
        y_grid,
        grid_color: f.color_or(&["grid_color"], Rgba::BLACK)?,
        labels,
        font: f.opt_string("font")?.unwrap_or_else(|| config.font_family.clone()),
        font_size: f.extent_or("size", 8)?,
    })
}

/// Parse `[t, v]` pairs or `{"t": .., "v": ..}` objects.
///
/// Values that are null or not numeric become gaps.
fn samples(data: &[Value]) -> FieldResult<Vec<Sample>> {
    data.iter()
        .enumerate()
        .map(|(i, item)| {
            let (t, v) = match item {
                Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
                Value::Object(obj) => (
                    obj.get("t").or_else(|| obj.get("time")).unwrap_or(&Value::Null),
                    obj.get("v").or_else(|| obj.get("value")).unwrap_or(&Value::Null),
                ),
                _ => return Err(format!("sample {i} must be [time, value] or an object")),
            };
            let time = time_value(t).ok_or_else(|| format!("sample {i} has invalid time {t}"))?;
            let value = match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            Ok(Sample::new(time, value.filter(|v| v.is_finite())))
        })
        .collect()
}

fn time_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|t| t.is_finite()),
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

fn progress_params(f: &mut Fields<'_>, config: &RenderConfig) -> FieldResult<ProgressParams> {
    Ok(ProgressParams {
        bounds: f.bounds()?,
        progress: f.number("progress")?.clamp(0.0, 100.0) as f32,
        direction: f.option("direction", ProgressDirection::parse, ProgressDirection::Right)?,
        fill: f.color_or(&["fill"], Rgba::BLACK)?,
        background: f.opt_color(&["background"])?,
        outline: f.opt_color(&["outline"])?.or(Some(Rgba::BLACK)),
        width: f.uint_extent_or("width", 1)?,
        show_percentage: f.bool_or("show_percentage", false)?,
        font_size: f.extent_or("size", config.font_size)?,
    })
}

fn grid_params(f: &mut Fields<'_>, config: &RenderConfig) -> FieldResult<DebugGridParams> {
    let defaults = &config.grid;
    let spacing = match f.opt_number("spacing")? {
        Some(s) if s >= 1.0 => s.round() as u32,
        Some(s) => {
            f.warn(WarningKind::UnsupportedOption, format!("grid spacing {s} clamped to {}", defaults.spacing));
            defaults.spacing.max(1)
        }
        None => defaults.spacing.max(1),
    };
    let dash = if f.bool_or("dashed", true)? {
        let default = DashPattern::new(defaults.dash, defaults.gap).unwrap_or_default();
        f.dash_lengths(default)?
    } else {
        None
    };
    Ok(DebugGridParams {
        spacing,
        color: f.color_or(&["line_color"], defaults.line_color())?,
        dash,
        show_labels: f.bool_or("show_labels", true)?,
        label_every: f.positive_or("label_step", 1)?,
        label_color: f.color_or(&["label_color"], Rgba::BLACK)?,
        font_size: f.extent_or("font_size", defaults.font_size)?,
    })
}

// ============================================================================
// Field Access
// ============================================================================

/// Default dash when `dashed` is set without lengths.
fn default_dash() -> DashPattern {
    DashPattern::new(5, 3).unwrap_or_default()
}

/// Typed access to one record's fields, collecting option warnings.
struct Fields<'a> {
    index: usize,
    map: &'a Map<String, Value>,
    canvas: &'a CanvasSpec,
    warnings: &'a mut Vec<RenderWarning>,
}

impl<'a> Fields<'a> {
    fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(RenderWarning::element(self.index, kind, message));
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn coord_value(key: &str, value: &Value) -> FieldResult<Coord> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(|v| Coord::Px(v.clamp(-f64::from(f32::MAX), f64::from(f32::MAX)) as f32))
                .ok_or_else(|| format!("`{key}` is not finite")),
            Value::String(s) => Coord::parse(s).ok_or_else(|| format!("`{key}` must be a number or percentage, got {s:?}")),
            other => Err(format!("`{key}` must be a number or percentage, got {other}")),
        }
    }

    fn coord(&self, key: &str) -> FieldResult<Coord> {
        let value = self.get(key).ok_or_else(|| format!("missing `{key}`"))?;
        Self::coord_value(key, value)
    }

    fn opt_coord(&self, key: &str) -> FieldResult<Option<Coord>> {
        self.get(key).map(|v| Self::coord_value(key, v)).transpose()
    }

    fn position(&self, x: &str, y: &str) -> FieldResult<Position> {
        Ok(Position::new(self.coord(x)?, self.coord(y)?))
    }

    fn bounds(&self) -> FieldResult<BoxSpec> {
        Ok(BoxSpec { start: self.position("x_start", "y_start")?, end: self.position("x_end", "y_end")? })
    }

    fn points(&self, key: &str) -> FieldResult<Vec<Position>> {
        self.array(key)?
            .iter()
            .enumerate()
            .map(|(i, p)| match p {
                Value::Array(xy) if xy.len() == 2 => {
                    Ok(Position::new(Self::coord_value(key, &xy[0])?, Self::coord_value(key, &xy[1])?))
                }
                Value::Object(obj) => {
                    let x = obj.get("x").ok_or_else(|| format!("`{key}[{i}]` has no x"))?;
                    let y = obj.get("y").ok_or_else(|| format!("`{key}[{i}]` has no y"))?;
                    Ok(Position::new(Self::coord_value(key, x)?, Self::coord_value(key, y)?))
                }
                other => Err(format!("`{key}[{i}]` must be [x, y], got {other}")),
            })
            .collect()
    }

    fn array(&self, key: &str) -> FieldResult<Vec<Value>> {
        match self.get(key) {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(format!("`{key}` must be an array, got {other}")),
            None => Err(format!("missing `{key}`")),
        }
    }

    fn number(&self, key: &str) -> FieldResult<f64> {
        self.opt_number(key)?.ok_or_else(|| format!("missing `{key}`"))
    }

    fn opt_number(&self, key: &str) -> FieldResult<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => {
                s.trim().parse::<f64>().map(Some).map_err(|_| format!("`{key}` must be a number, got {s:?}"))
            }
            Some(other) => Err(format!("`{key}` must be a number, got {other}")),
        }
    }

    fn number_or(&self, key: &str, default: f64) -> FieldResult<f64> {
        Ok(self.opt_number(key)?.filter(|v| v.is_finite()).unwrap_or(default))
    }

    fn uint_or(&mut self, key: &str, default: u32) -> FieldResult<u32> {
        match self.opt_number(key)? {
            None => Ok(default),
            Some(v) if v >= 0.0 && v.is_finite() => Ok(v.round().min(f64::from(u32::MAX)) as u32),
            Some(v) => {
                self.warn(WarningKind::UnsupportedOption, format!("`{key}` {v} clamped to {default}"));
                Ok(default)
            }
        }
    }

    /// Like `uint_or` but zero is also replaced by the default.
    fn positive_or(&mut self, key: &str, default: u32) -> FieldResult<u32> {
        match self.opt_positive(key)? {
            Some(v) => Ok(v),
            None if self.has(key) => {
                self.warn(WarningKind::UnsupportedOption, format!("`{key}` must be positive, using {default}"));
                Ok(default)
            }
            None => Ok(default),
        }
    }

    fn opt_positive(&self, key: &str) -> FieldResult<Option<u32>> {
        Ok(self
            .opt_number(key)?
            .filter(|v| v.is_finite() && v.round() >= 1.0)
            .map(|v| v.round().min(f64::from(u32::MAX)) as u32))
    }

    /// Pixel extents (sizes, widths, radii) given in the record never exceed
    /// the canvas's longer side; larger values are capped with a warning.
    fn extent_or(&mut self, key: &str, default: u32) -> FieldResult<u32> {
        let value = self.positive_or(key, default)?;
        Ok(if self.has(key) { self.cap(key, value) } else { value })
    }

    fn uint_extent_or(&mut self, key: &str, default: u32) -> FieldResult<u32> {
        let value = self.uint_or(key, default)?;
        Ok(if self.has(key) { self.cap(key, value) } else { value })
    }

    fn opt_extent(&mut self, key: &str) -> FieldResult<Option<u32>> {
        Ok(self.opt_positive(key)?.map(|v| self.cap(key, v)))
    }

    fn cap(&mut self, key: &str, value: u32) -> u32 {
        let limit = self.canvas.width.max(self.canvas.height);
        if value <= limit {
            return value;
        }
        self.warn(WarningKind::UnsupportedOption, format!("`{key}` {value} capped to {limit}"));
        limit
    }

    fn bool_or(&self, key: &str, default: bool) -> FieldResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(format!("`{key}` must be a boolean, got {s:?}")),
            },
            Some(other) => Err(format!("`{key}` must be a boolean, got {other}")),
        }
    }

    fn string(&self, key: &str) -> FieldResult<String> {
        self.opt_string(key)?.ok_or_else(|| format!("missing `{key}`"))
    }

    fn opt_string(&self, key: &str) -> FieldResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(format!("`{key}` must be a string, got {other}")),
        }
    }

    fn opt_time(&self, key: &str) -> FieldResult<Option<f64>> {
        self.get(key)
            .map(|v| time_value(v).ok_or_else(|| format!("`{key}` must be unix seconds or RFC 3339, got {v}")))
            .transpose()
    }

    fn grid_interval(&mut self, key: &str) -> FieldResult<Option<f64>> {
        match self.opt_number(key)? {
            Some(v) if v > 0.0 && v.is_finite() => Ok(Some(v)),
            Some(v) => {
                self.warn(WarningKind::UnsupportedOption, format!("`{key}` {v} must be positive, grid disabled"));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// First present key among `keys` that names a color.
    ///
    /// Unknown names warn and yield `None`; `transparent`/`none` yield `None`
    /// silently.
    fn opt_color(&mut self, keys: &[&str]) -> FieldResult<Option<Rgba>> {
        let Some((key, value)) = keys.iter().find_map(|k| self.get(k).map(|v| (*k, v.clone()))) else {
            return Ok(None);
        };
        let Value::String(name) = value else {
            return Err(format!("`{key}` must be a color name, got {value}"));
        };
        match self.canvas.color(&name) {
            Some(color) if color.is_transparent() => Ok(None),
            Some(color) => Ok(Some(color)),
            None => {
                self.warn(WarningKind::UnsupportedOption, format!("unknown color `{name}` for `{key}`"));
                Ok(None)
            }
        }
    }

    fn color_or(&mut self, keys: &[&str], default: Rgba) -> FieldResult<Rgba> {
        Ok(self.opt_color(keys)?.unwrap_or(default))
    }

    fn option<T>(&mut self, key: &str, parse: impl Fn(&str) -> Option<T>, default: T) -> FieldResult<T> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::String(s)) => Ok(parse(s).unwrap_or_else(|| {
                self.warn(WarningKind::UnsupportedOption, format!("`{key}` value {s:?} not supported, using default"));
                default
            })),
            Some(other) => Err(format!("`{key}` must be a string, got {other}")),
        }
    }

    fn shape_style(&mut self) -> FieldResult<ShapeStyle> {
        let fill = self.opt_color(&["fill"])?;
        let outline = match self.opt_color(&["outline"])? {
            Some(c) => Some(c),
            // An explicit but empty outline disables the border.
            None if self.map.contains_key("outline") => None,
            None if fill.is_none() => Some(Rgba::BLACK),
            None => None,
        };
        Ok(ShapeStyle { fill, outline, width: self.extent_or("width", 1)?, dash: self.dash()? })
    }

    fn dash(&mut self) -> FieldResult<Option<DashPattern>> {
        if !self.bool_or("dashed", false)? {
            return Ok(None);
        }
        self.dash_lengths(default_dash())
    }

    fn dash_lengths(&mut self, default: DashPattern) -> FieldResult<Option<DashPattern>> {
        let dash = self.positive_or("dash_length", default.dash())?;
        let gap = self.positive_or("space_length", default.gap())?;
        Ok(Some(DashPattern::new(dash, gap).unwrap_or(default)))
    }
}
