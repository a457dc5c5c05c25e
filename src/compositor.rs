//! Canvas compositing.
//!
//! The compositor owns the working raster. Each visible element is drawn on
//! its own transparent layer, rotated about its pivot when requested, then
//! merged in input order.

use std::sync::Arc;

use tracing::{debug_span, trace, warn};

use crate::color::Rgba;
use crate::config::RenderConfig;
use crate::element::{
    ArcBounds, CanvasSpec, DebugGridParams, Element, ElementKind, ImageParams, PlotParams, ProgressDirection,
    ProgressParams, RectangleParams, ShapeStyle, TextParams,
};
use crate::error::{RenderWarning, Result, WarningKind};
use crate::framebuffer::Framebuffer;
use crate::geometry::{Anchor, Point, Rect};
use crate::plots::TimeSeriesPlot;
use crate::render::{
    blit, draw_arc, draw_debug_grid, draw_icon, draw_rect, draw_rect_outline, fill_ellipse, fill_polygon,
    fill_rounded_rect, resize_image, stroke_closed, stroke_polyline, DashPattern, GridLabels, Stroke,
};
use crate::resources::ResourceProvider;
use crate::text::{parse_colors, Font, FontCache, TextAlign, TextLayout, BUILTIN_FAMILY};

/// Why an element produced no layer.
type Skip = RenderWarning;

/// Owns the working raster for one render request.
pub struct Compositor<'a> {
    canvas: CanvasSpec,
    fb: Framebuffer,
    fonts: &'a FontCache,
    resources: &'a dyn ResourceProvider,
    config: &'a RenderConfig,
    warnings: Vec<RenderWarning>,
}

impl<'a> Compositor<'a> {
    /// Create a compositor with a raster cleared to the canvas background.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas has a zero dimension.
    pub fn new(
        canvas: CanvasSpec,
        fonts: &'a FontCache,
        resources: &'a dyn ResourceProvider,
        config: &'a RenderConfig,
    ) -> Result<Self> {
        let mut fb = Framebuffer::new(canvas.width, canvas.height)?;
        fb.clear(canvas.background);
        Ok(Self { canvas, fb, fonts, resources, config, warnings: Vec::new() })
    }

    /// Working raster before global rotation.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Apply every element in order.
    ///
    /// # Errors
    ///
    /// Returns an error only if a layer cannot be allocated.
    pub fn apply_all(&mut self, elements: &[Element]) -> Result<()> {
        for element in elements {
            self.apply(element)?;
        }
        Ok(())
    }

    /// Draw one element onto the canvas. Invisible elements are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if a layer cannot be allocated.
    pub fn apply(&mut self, element: &Element) -> Result<()> {
        if !element.visible {
            return Ok(());
        }
        let span = debug_span!("element", index = element.index, kind = element.kind.name());
        let _enter = span.enter();

        let mut layer = Framebuffer::new(self.canvas.width, self.canvas.height)?;
        let pivot = match self.draw(&mut layer, element) {
            Ok(pivot) => pivot,
            Err(skip) => {
                warn!(%skip, "element skipped");
                self.warnings.push(skip);
                return Ok(());
            }
        };

        if element.rotate.rem_euclid(360.0) != 0.0 {
            trace!(degrees = element.rotate, x = pivot.x, y = pivot.y, "rotating layer");
            layer = layer.rotated_about(pivot, element.rotate);
        }
        self.fb.composite(&layer, element.opacity)
    }

    /// Finish the render: apply the global rotation and hand over the raster.
    #[must_use]
    pub fn finish(self) -> (Framebuffer, Vec<RenderWarning>) {
        let fb = self.fb.rotated_quarter(self.canvas.quarter_turns);
        (fb, self.warnings)
    }

    /// Draw `element` on `layer`, returning its rotation pivot.
    fn draw(&self, layer: &mut Framebuffer, element: &Element) -> std::result::Result<Point, Skip> {
        let canvas = self.canvas;
        let index = element.index;
        match &element.kind {
            ElementKind::Text(t) => self.draw_text(layer, index, element.anchor, t),
            ElementKind::Line(l) => {
                let points: Vec<Point> = l.points.iter().map(|p| canvas.resolve(*p)).collect();
                let stroke = Stroke::solid(l.color).width(l.width).dashed(l.dash);
                stroke_polyline(layer, &points, &stroke);
                Ok(bounding_center(&points))
            }
            ElementKind::Rectangle(r) => Ok(draw_rectangle(layer, &canvas, r.bounds.resolve(&canvas), r)),
            ElementKind::Circle(c) => {
                let center = canvas.resolve(c.center);
                let bounds = Rect::new(center.x - c.radius, center.y - c.radius, 2.0 * c.radius, 2.0 * c.radius);
                draw_ellipse(layer, bounds, &c.style);
                Ok(center)
            }
            ElementKind::Ellipse(e) => {
                let bounds = e.bounds.resolve(&canvas);
                draw_ellipse(layer, bounds, &e.style);
                Ok(bounds.center())
            }
            ElementKind::Arc(a) => {
                let bounds = match a.bounds {
                    ArcBounds::Box(b) => b.resolve(&canvas),
                    ArcBounds::Circle { center, radius } => {
                        let c = canvas.resolve(center);
                        Rect::new(c.x - radius, c.y - radius, 2.0 * radius, 2.0 * radius)
                    }
                };
                let stroke = Stroke::solid(a.color).width(a.width).dashed(a.dash);
                draw_arc(layer, bounds, a.start_angle, a.end_angle, &stroke);
                Ok(bounds.center())
            }
            ElementKind::Polygon(p) => {
                let points: Vec<Point> = p.points.iter().map(|v| canvas.resolve(*v)).collect();
                if let Some(fill) = p.style.fill {
                    fill_polygon(layer, &points, fill);
                }
                if let Some(outline) = p.style.outline {
                    let stroke = Stroke::solid(outline).width(p.style.width).dashed(p.style.dash);
                    stroke_closed(layer, &points, &stroke);
                }
                Ok(bounding_center(&points))
            }
            ElementKind::Plot(p) => self.draw_plot(layer, index, p),
            ElementKind::Icon(i) => {
                let at = canvas.resolve(i.at);
                let icon = self.resources.get_icon(&i.name).ok_or_else(|| {
                    RenderWarning::element(index, WarningKind::MissingResource, format!("icon `{}` not found", i.name))
                })?;
                let origin = element.anchor.origin(at, i.size as f32, i.size as f32);
                let (x, y) = origin.to_pixel();
                draw_icon(layer, &icon, x, y, i.size, i.color);
                Ok(at)
            }
            ElementKind::Image(img) => self.draw_image(layer, index, element.anchor, img),
            ElementKind::DebugGrid(g) => {
                self.draw_grid(layer, g);
                Ok(Point::new(canvas.width as f32 / 2.0, canvas.height as f32 / 2.0))
            }
            ElementKind::ProgressBar(p) => self.draw_progress(layer, index, p),
        }
    }

    fn font(&self, index: usize, family: &str, size: u32) -> std::result::Result<Arc<Font>, Skip> {
        self.fonts.resolve(self.resources, family, size).ok_or_else(|| {
            RenderWarning::element(index, WarningKind::MissingResource, format!("font `{family}` size {size} not found"))
        })
    }

    fn draw_text(
        &self,
        layer: &mut Framebuffer,
        index: usize,
        anchor: Anchor,
        t: &TextParams,
    ) -> std::result::Result<Point, Skip> {
        let font = self.font(index, &t.font, t.size)?;
        let canvas = self.canvas;
        let paragraph = parse_colors(&t.value, t.color, |name| canvas.color(name));
        let max_width = t.max_width.map(|w| w.resolve(canvas.width).max(1.0) as u32);
        let layout = TextLayout::new(&paragraph, &font, max_width, t.spacing);
        let at = canvas.resolve(t.at);
        layout.draw(layer, &font, layout.origin(anchor, at), t.align);
        Ok(at)
    }

    fn draw_plot(&self, layer: &mut Framebuffer, index: usize, p: &PlotParams) -> std::result::Result<Point, Skip> {
        let font = match p.labels {
            Some(_) => Some(self.font(index, &p.font, p.font_size)?),
            None => None,
        };
        let bounds = p.bounds.resolve(&self.canvas);
        let (x, y) = Point::new(bounds.x, bounds.y).to_pixel();
        // Float-to-int casts saturate, so oversized boxes stay representable.
        let width = (bounds.width.round() + 1.0) as u32;
        let height = (bounds.height.round() + 1.0) as u32;

        let mut plot = TimeSeriesPlot::new()
            .position(x, y)
            .dimensions(width, height)
            .time_window(p.start, p.end)
            .y_range(p.y_min, p.y_max)
            .line_style(p.line_style)
            .span_gaps(p.span_gaps)
            .clock(self.config.clock)
            .frame(p.frame)
            .x_grid(p.x_grid)
            .y_grid(p.y_grid)
            .grid_stroke(Stroke::solid(p.grid_color).dashed(DashPattern::new(1, 2)))
            .labels(p.labels);
        for series in &p.series {
            plot = plot.add_series(series.clone());
        }
        plot.render(layer, font.as_deref());
        Ok(bounds.center())
    }

    fn draw_image(
        &self,
        layer: &mut Framebuffer,
        index: usize,
        anchor: Anchor,
        img: &ImageParams,
    ) -> std::result::Result<Point, Skip> {
        let source = self.resources.get_image(&img.reference).ok_or_else(|| {
            RenderWarning::element(index, WarningKind::MissingResource, format!("image `{}` not found", img.reference))
        })?;
        let width = img.width.unwrap_or_else(|| source.width());
        let height = img.height.unwrap_or_else(|| source.height());
        let resized = resize_image(&source, width, height, img.resize).map_err(|e| {
            RenderWarning::element(index, WarningKind::InvalidElement, format!("image `{}`: {e}", img.reference))
        })?;
        let at = self.canvas.resolve(img.at);
        let (x, y) = anchor.origin(at, width as f32, height as f32).to_pixel();
        blit(layer, &resized, x, y);
        Ok(at)
    }

    fn draw_grid(&self, layer: &mut Framebuffer, g: &DebugGridParams) {
        let stroke = Stroke::solid(g.color).dashed(g.dash);
        let font = if g.show_labels { self.fonts.resolve(self.resources, BUILTIN_FAMILY, g.font_size) } else { None };
        let labels = font.as_deref().map(|font| GridLabels { font, color: g.label_color, every: g.label_every });
        draw_debug_grid(layer, g.spacing, &stroke, labels);
    }

    fn draw_progress(
        &self,
        layer: &mut Framebuffer,
        index: usize,
        p: &ProgressParams,
    ) -> std::result::Result<Point, Skip> {
        let bounds = p.bounds.resolve(&self.canvas);
        let (x, y) = (bounds.x.round(), bounds.y.round());
        let (width, height) = (bounds.width.round() + 1.0, bounds.height.round() + 1.0);
        let canvas = &self.canvas;

        if let (Some(background), Some((bx, by, bw, bh))) = (p.background, pixel_box(canvas, x, y, width, height, 0)) {
            draw_rect(layer, bx, by, bw, bh, background);
        }

        // The filled share is measured on the full bar, before clipping.
        let fraction = p.progress / 100.0;
        let filled = match p.direction {
            ProgressDirection::Right => {
                let filled = (width * fraction).round().min(width);
                pixel_box(canvas, x, y, filled, height, 0)
            }
            ProgressDirection::Left => {
                let filled = (width * fraction).round().min(width);
                pixel_box(canvas, x + width - filled, y, filled, height, 0)
            }
            ProgressDirection::Down => {
                let filled = (height * fraction).round().min(height);
                pixel_box(canvas, x, y, width, filled, 0)
            }
            ProgressDirection::Up => {
                let filled = (height * fraction).round().min(height);
                pixel_box(canvas, x, y + height - filled, width, filled, 0)
            }
        };
        if let Some((fx, fy, fw, fh)) = filled {
            draw_rect(layer, fx, fy, fw, fh, p.fill);
        }

        if let Some(outline) = p.outline.filter(|_| p.width > 0) {
            if let Some((bx, by, bw, bh)) = pixel_box(canvas, x, y, width, height, p.width) {
                draw_rect_outline(layer, bx, by, bw, bh, outline, p.width);
            }
        }

        if p.show_percentage {
            let font = self.font(index, &self.config.font_family, p.font_size)?;
            let dark_fill = u32::from(p.fill.r) + u32::from(p.fill.g) + u32::from(p.fill.b) < 384;
            let color = if p.progress >= 50.0 && dark_fill { Rgba::WHITE } else { Rgba::BLACK };
            let label = format!("{:.0}%", p.progress);
            let paragraph = parse_colors(&label, color, |_| None);
            let layout = TextLayout::new(&paragraph, &font, None, 0);
            let origin = layout.origin(Anchor::Center, bounds.center());
            layout.draw(layer, &font, origin, TextAlign::Left);
        }
        Ok(bounds.center())
    }
}

/// Rectangle with inward border, optional rounded corners and dashed border.
fn draw_rectangle(layer: &mut Framebuffer, canvas: &CanvasSpec, bounds: Rect, r: &RectangleParams) -> Point {
    let style = r.style;
    let (x, y) = (bounds.x.round(), bounds.y.round());
    let (w, h) = (bounds.width.round() + 1.0, bounds.height.round() + 1.0);
    let Some((bx, by, width, height)) = pixel_box(canvas, x, y, w, h, style.width.max(r.radius)) else {
        return bounds.center();
    };

    match (style.outline, style.dash) {
        (Some(outline), None) => {
            let t = style.width.min(width / 2).min(height / 2);
            fill_rounded_rect(layer, bx, by, width, height, r.radius, outline);
            // The layer starts transparent, so an unfilled interior is
            // cleared back to transparent.
            let inner = style.fill.unwrap_or(Rgba::TRANSPARENT);
            fill_rounded_rect(
                layer,
                bx + t as i32,
                by + t as i32,
                width.saturating_sub(2 * t),
                height.saturating_sub(2 * t),
                r.radius.saturating_sub(t),
                inner,
            );
        }
        (Some(outline), Some(dash)) => {
            if let Some(fill) = style.fill {
                fill_rounded_rect(layer, bx, by, width, height, r.radius, fill);
            }
            // Rings follow the unclipped edges so the dash phase matches the
            // whole perimeter.
            let stroke = Stroke::solid(outline).dashed(Some(dash));
            let rings = style.width.min((w / 2.0) as u32).min((h / 2.0) as u32).max(1);
            for inset in 0..rings {
                let inset = inset as f32;
                let (x0, y0) = (x + inset, y + inset);
                let (x1, y1) = (x + w - 1.0 - inset, y + h - 1.0 - inset);
                let corners = [Point::new(x0, y0), Point::new(x1, y0), Point::new(x1, y1), Point::new(x0, y1)];
                stroke_closed(layer, &corners, &stroke);
            }
        }
        (None, _) => {
            if let Some(fill) = style.fill {
                fill_rounded_rect(layer, bx, by, width, height, r.radius, fill);
            }
        }
    }
    bounds.center()
}

/// Pixel box at (x, y) spanning `width` x `height` pixels, clipped to the
/// canvas grown by `margin + 1` on every side.
///
/// Clipped edges land off-canvas, so borders and corners up to `margin`
/// pixels deep drawn along them stay invisible. Returns `None` when nothing
/// is left.
fn pixel_box(canvas: &CanvasSpec, x: f32, y: f32, width: f32, height: f32, margin: u32) -> Option<(i32, i32, u32, u32)> {
    let m = margin as f32 + 1.0;
    let (x0, y0) = (x.max(-m), y.max(-m));
    let x1 = (x + width - 1.0).min(canvas.width as f32 - 1.0 + m);
    let y1 = (y + height - 1.0).min(canvas.height as f32 - 1.0 + m);
    if !(width >= 1.0 && height >= 1.0 && x0 <= x1 && y0 <= y1) {
        return None;
    }
    Some((x0 as i32, y0 as i32, (x1 - x0 + 1.0) as u32, (y1 - y0 + 1.0) as u32))
}

fn draw_ellipse(layer: &mut Framebuffer, bounds: Rect, style: &ShapeStyle) {
    if let Some(fill) = style.fill {
        fill_ellipse(layer, bounds, None, fill);
    }
    if let Some(outline) = style.outline {
        fill_ellipse(layer, bounds, Some(style.width.max(1)), outline);
    }
}

fn bounding_center(points: &[Point]) -> Point {
    let (min_x, max_x) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let (min_y, max_y) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    if min_x > max_x {
        return Point::ORIGIN;
    }
    Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{BoxSpec, Coord, IconParams, LineParams, Position};
    use crate::quantize::PaletteId;
    use crate::resources::{IconBitmap, MemoryResources};

    fn canvas(w: u32, h: u32) -> CanvasSpec {
        CanvasSpec::new(w, h, PaletteId::Bwr)
    }

    fn line(index: usize, from: (f32, f32), to: (f32, f32), color: Rgba) -> Element {
        Element::new(
            index,
            ElementKind::Line(LineParams {
                points: vec![Position::px(from.0, from.1), Position::px(to.0, to.1)],
                color,
                width: 1,
                dash: None,
            }),
        )
    }

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32, style: ShapeStyle, radius: u32) -> Element {
        Element::new(
            0,
            ElementKind::Rectangle(RectangleParams {
                bounds: BoxSpec { start: Position::px(x0, y0), end: Position::px(x1, y1) },
                style,
                radius,
            }),
        )
    }

    #[test]
    fn test_background_fill() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut spec = canvas(4, 4);
        spec.background = Rgba::RED;
        let comp = Compositor::new(spec, &fonts, &res, &config).unwrap();
        assert_eq!(comp.framebuffer().get_pixel(3, 3), Some(Rgba::RED));
    }

    #[test]
    fn test_painter_order() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(10, 10), &fonts, &res, &config).unwrap();
        comp.apply_all(&[line(0, (0.0, 5.0), (9.0, 5.0), Rgba::BLACK), line(1, (5.0, 0.0), (5.0, 9.0), Rgba::RED)])
            .unwrap();
        assert_eq!(comp.framebuffer().get_pixel(5, 5), Some(Rgba::RED));
        assert_eq!(comp.framebuffer().get_pixel(2, 5), Some(Rgba::BLACK));
    }

    #[test]
    fn test_invisible_element_skipped() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(10, 10), &fonts, &res, &config).unwrap();
        let mut hidden = line(0, (0.0, 0.0), (9.0, 9.0), Rgba::BLACK);
        hidden.visible = false;
        comp.apply(&hidden).unwrap();
        assert_eq!(comp.framebuffer().get_pixel(5, 5), Some(Rgba::WHITE));
        assert!(comp.warnings().is_empty());
    }

    #[test]
    fn test_outlined_rect_keeps_background_inside() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 20), &fonts, &res, &config).unwrap();
        let style = ShapeStyle { fill: None, outline: Some(Rgba::BLACK), width: 2, dash: None };
        comp.apply(&rect(2.0, 2.0, 17.0, 17.0, style, 0)).unwrap();
        let fb = comp.framebuffer();
        assert_eq!(fb.get_pixel(2, 2), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(3, 10), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(17, 17), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(10, 10), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(18, 18), Some(Rgba::WHITE));
    }

    #[test]
    fn test_filled_rect_with_outline() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 20), &fonts, &res, &config).unwrap();
        let style = ShapeStyle { fill: Some(Rgba::RED), outline: Some(Rgba::BLACK), width: 1, dash: None };
        comp.apply(&rect(0.0, 0.0, 9.0, 9.0, style, 0)).unwrap();
        assert_eq!(comp.framebuffer().get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(comp.framebuffer().get_pixel(5, 5), Some(Rgba::RED));
    }

    #[test]
    fn test_filled_rect_past_i32_range() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 10), &fonts, &res, &config).unwrap();
        let style = ShapeStyle { fill: Some(Rgba::BLACK), outline: None, width: 1, dash: None };
        comp.apply(&rect(5.0, 2.0, 3e9, 1e12, style, 4)).unwrap();
        let fb = comp.framebuffer();
        // The near corner stays rounded; the far ones are clipped off-canvas.
        assert_eq!(fb.get_pixel(5, 2), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(9, 2), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 6), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(19, 9), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(4, 6), Some(Rgba::WHITE));
    }

    #[test]
    fn test_clipped_outline_stays_off_canvas() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 20), &fonts, &res, &config).unwrap();
        let style = ShapeStyle { fill: None, outline: Some(Rgba::BLACK), width: 3, dash: None };
        comp.apply(&rect(-3e9, 5.0, 3e9, 1e12, style, 0)).unwrap();
        let fb = comp.framebuffer();
        // Only the top border is on the canvas.
        assert_eq!(fb.get_pixel(0, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(19, 7), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(0, 8), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(19, 19), Some(Rgba::WHITE));
    }

    #[test]
    fn test_line_with_far_endpoints() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 10), &fonts, &res, &config).unwrap();
        comp.apply(&line(0, (-3e9, 4.0), (3e9, 4.0), Rgba::RED)).unwrap();
        let fb = comp.framebuffer();
        assert!((0..20).all(|x| fb.get_pixel(x, 4) == Some(Rgba::RED)));
        assert_eq!(fb.get_pixel(10, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn test_percent_position_resolves_at_draw_time() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let el = Element::new(
            0,
            ElementKind::Line(LineParams {
                points: vec![Position::new(Coord::Percent(50.0), Coord::Px(0.0))],
                color: Rgba::BLACK,
                width: 1,
                dash: None,
            }),
        );
        for (w, expected) in [(200, 100), (300, 150)] {
            let mut comp = Compositor::new(canvas(w, 4), &fonts, &res, &config).unwrap();
            comp.apply(&el).unwrap();
            assert_eq!(comp.framebuffer().get_pixel(expected, 0), Some(Rgba::BLACK), "width {w}");
        }
    }

    #[test]
    fn test_missing_icon_warns() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(10, 10), &fonts, &res, &config).unwrap();
        let el = Element::new(
            3,
            ElementKind::Icon(IconParams { at: Position::px(0.0, 0.0), name: "home".into(), size: 8, color: Rgba::BLACK }),
        );
        comp.apply(&el).unwrap();
        assert_eq!(comp.warnings().len(), 1);
        assert_eq!(comp.warnings()[0].index, Some(3));
        assert_eq!(comp.warnings()[0].kind, WarningKind::MissingResource);
    }

    #[test]
    fn test_icon_anchor_center() {
        let fonts = FontCache::new();
        let res = MemoryResources::new().with_icon("dot", IconBitmap::from_ascii(&["#"]));
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 20), &fonts, &res, &config).unwrap();
        let mut el = Element::new(
            0,
            ElementKind::Icon(IconParams { at: Position::px(10.0, 10.0), name: "dot".into(), size: 4, color: Rgba::RED }),
        );
        el.anchor = Anchor::Center;
        comp.apply(&el).unwrap();
        assert_eq!(comp.framebuffer().get_pixel(8, 8), Some(Rgba::RED));
        assert_eq!(comp.framebuffer().get_pixel(11, 11), Some(Rgba::RED));
        assert_eq!(comp.framebuffer().get_pixel(12, 12), Some(Rgba::WHITE));
    }

    #[test]
    fn test_element_rotation_about_pivot() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(21, 21), &fonts, &res, &config).unwrap();
        let mut el = line(0, (5.0, 10.0), (15.0, 10.0), Rgba::BLACK);
        el.rotate = 90.0;
        comp.apply(&el).unwrap();
        let fb = comp.framebuffer();
        assert_eq!(fb.get_pixel(9, 6), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(9, 14), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(6, 10), Some(Rgba::WHITE));
    }

    #[test]
    fn test_global_rotation_swaps_dimensions() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut spec = canvas(30, 10);
        spec.quarter_turns = 1;
        let comp = Compositor::new(spec, &fonts, &res, &config).unwrap();
        let (fb, _) = comp.finish();
        assert_eq!((fb.width(), fb.height()), (10, 30));
    }

    #[test]
    fn test_progress_bar_fill_right() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 10), &fonts, &res, &config).unwrap();
        let el = Element::new(
            0,
            ElementKind::ProgressBar(ProgressParams {
                bounds: BoxSpec { start: Position::px(0.0, 0.0), end: Position::px(9.0, 4.0) },
                progress: 50.0,
                direction: ProgressDirection::Right,
                fill: Rgba::RED,
                background: None,
                outline: None,
                width: 0,
                show_percentage: false,
                font_size: 8,
            }),
        );
        comp.apply(&el).unwrap();
        assert_eq!(comp.framebuffer().get_pixel(4, 2), Some(Rgba::RED));
        assert_eq!(comp.framebuffer().get_pixel(5, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_progress_bar_fill_measured_before_clipping() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(20, 10), &fonts, &res, &config).unwrap();
        let el = Element::new(
            0,
            ElementKind::ProgressBar(ProgressParams {
                bounds: BoxSpec { start: Position::px(-99.0, 0.0), end: Position::px(100.0, 1e12) },
                progress: 55.0,
                direction: ProgressDirection::Right,
                fill: Rgba::RED,
                background: Some(Rgba::BLACK),
                outline: Some(Rgba::BLACK),
                width: 2,
                show_percentage: true,
                font_size: 8,
            }),
        );
        comp.apply(&el).unwrap();
        // 200 px bar, 110 px filled: the fill ends at x = 10.
        let fb = comp.framebuffer();
        assert_eq!(fb.get_pixel(10, 5), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(11, 5), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(5, 0), Some(Rgba::BLACK));
        assert!(comp.warnings().is_empty());
    }

    #[test]
    fn test_half_opacity_blends() {
        let fonts = FontCache::new();
        let res = MemoryResources::new();
        let config = RenderConfig::default();
        let mut comp = Compositor::new(canvas(10, 10), &fonts, &res, &config).unwrap();
        let mut el = line(0, (0.0, 0.0), (9.0, 0.0), Rgba::BLACK);
        el.opacity = 0.5;
        comp.apply(&el).unwrap();
        let px = comp.framebuffer().get_pixel(3, 0).unwrap();
        assert!(px.r > 100 && px.r < 150, "{px:?}");
    }

    #[test]
    fn test_bounding_center() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 4.0)];
        assert_eq!(bounding_center(&pts), Point::new(5.0, 2.0));
        assert_eq!(bounding_center(&[]), Point::ORIGIN);
    }
}
