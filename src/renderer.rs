//! Top-level render entry point.
//!
//! Chains validation, compositing and quantization for one request:
//!
//! ```text
//! canvas + element records ─► parse ─► Compositor ─► quantize ─► RenderOutput
//! ```

use serde_json::Value;
use tracing::{debug, debug_span, warn};

use crate::compositor::Compositor;
use crate::config::RenderConfig;
use crate::element::{parse_canvas, parse_elements, CanvasSpec, Element};
use crate::error::{RenderWarning, Result};
use crate::output::{RefreshScope, RenderOutput};
use crate::quantize::{quantize, IndexedRaster};
use crate::resources::{MemoryResources, ResourceProvider};
use crate::text::FontCache;

/// Renders declarative element lists for one family of resources.
///
/// The renderer keeps its [`FontCache`] across calls; everything else lives
/// for a single request.
pub struct Renderer<P: ResourceProvider = MemoryResources> {
    config: RenderConfig,
    fonts: FontCache,
    resources: P,
}

impl Renderer<MemoryResources> {
    /// Renderer with default configuration and no external resources.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resources(MemoryResources::new())
    }
}

impl Default for Renderer<MemoryResources> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ResourceProvider> Renderer<P> {
    /// Renderer backed by `resources`.
    pub fn with_resources(resources: P) -> Self {
        Self { config: RenderConfig::default(), fonts: FontCache::new(), resources }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    pub fn settings(&self) -> &RenderConfig {
        &self.config
    }

    /// Shared font cache.
    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    /// Validate and render raw records.
    ///
    /// `previous` is the raster currently shown on the panel, if known; it
    /// only affects [`RenderOutput::refresh`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCanvas`] if the canvas record is
    /// unusable. Element problems never fail the render; they are reported in
    /// [`RenderOutput::warnings`].
    pub fn render(&self, canvas: &Value, elements: &[Value], previous: Option<&IndexedRaster>) -> Result<RenderOutput> {
        let span = debug_span!("render", elements = elements.len());
        let _enter = span.enter();

        let (spec, mut warnings) = parse_canvas(canvas)?;
        let (parsed, element_warnings) = parse_elements(elements, &spec, &self.config);
        warnings.extend(element_warnings);
        for warning in &warnings {
            warn!(%warning, "input warning");
        }

        self.finish(spec, &parsed, warnings, previous)
    }

    /// Render already-typed elements onto `canvas`.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas has a zero dimension.
    pub fn render_elements(
        &self,
        canvas: CanvasSpec,
        elements: &[Element],
        previous: Option<&IndexedRaster>,
    ) -> Result<RenderOutput> {
        let span = debug_span!("render", elements = elements.len());
        let _enter = span.enter();
        self.finish(canvas, elements, Vec::new(), previous)
    }

    fn finish(
        &self,
        canvas: CanvasSpec,
        elements: &[Element],
        mut warnings: Vec<RenderWarning>,
        previous: Option<&IndexedRaster>,
    ) -> Result<RenderOutput> {
        let scratch;
        let fonts = if self.config.font_cache {
            &self.fonts
        } else {
            scratch = FontCache::new();
            &scratch
        };

        let dither = canvas.dither.unwrap_or(self.config.dither);
        let mut compositor = Compositor::new(canvas, fonts, &self.resources, &self.config)?;
        compositor.apply_all(elements)?;
        let (fb, render_warnings) = compositor.finish();
        warnings.extend(render_warnings);
        // Stable: canvas warnings first, then by element index.
        warnings.sort_by_key(|w| w.index);

        let raster = quantize(&fb, canvas.palette, dither);
        let refresh = RefreshScope::diff(previous, &raster);
        debug!(
            width = raster.width(),
            height = raster.height(),
            palette = %canvas.palette,
            dither = dither.name(),
            warnings = warnings.len(),
            ?refresh,
            "render complete"
        );

        Ok(RenderOutput { raster, palette: canvas.palette, warnings, refresh })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, WarningKind};
    use crate::quantize::PaletteId;
    use serde_json::json;

    #[test]
    fn test_empty_canvas_is_white() {
        let out = Renderer::new().render(&json!({"width": 4, "height": 3, "palette": "bwr"}), &[], None).unwrap();
        assert_eq!(out.palette, PaletteId::Bwr);
        assert_eq!((out.raster.width(), out.raster.height()), (4, 3));
        assert!(out.raster.indices().iter().all(|&i| i == 1));
        assert_eq!(out.refresh, RefreshScope::Full);
    }

    #[test]
    fn test_invalid_canvas_rejected() {
        let err = Renderer::new().render(&json!({"width": 0, "height": 3, "palette": "bwr"}), &[], None).unwrap_err();
        assert!(matches!(err, Error::InvalidCanvas { field: "width", .. }));
    }

    #[test]
    fn test_rotation_swaps_output() {
        let canvas = json!({"width": 8, "height": 4, "palette": "mono", "rotation": 90});
        let out = Renderer::new().render(&canvas, &[], None).unwrap();
        assert_eq!((out.raster.width(), out.raster.height()), (4, 8));
    }

    #[test]
    fn test_warnings_sorted_by_index() {
        let canvas = json!({"width": 10, "height": 10, "palette": "bwr", "dither": "sparkle"});
        let elements = [
            json!({"type": "icon", "x": 0, "y": 0, "value": "mdi:home", "size": 8}),
            json!({"type": "hologram"}),
        ];
        let out = Renderer::new().render(&canvas, &elements, None).unwrap();
        let indices: Vec<Option<usize>> = out.warnings.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![None, Some(0), Some(1)]);
        assert_eq!(out.warnings[1].kind, WarningKind::MissingResource);
        assert_eq!(out.warnings[2].kind, WarningKind::InvalidElement);
    }

    #[test]
    fn test_previous_raster_refresh() {
        let renderer = Renderer::new();
        let canvas = json!({"width": 10, "height": 10, "palette": "bwr", "dither": "none"});
        let first = renderer.render(&canvas, &[], None).unwrap();
        let elements = [json!({"type": "line", "x_start": 2, "y_start": 3, "x_end": 5, "y_end": 3, "fill": "red"})];
        let second = renderer.render(&canvas, &elements, Some(&first.raster)).unwrap();
        assert_eq!(
            second.refresh,
            RefreshScope::Partial { bounds: crate::geometry::PixelBounds { x: 2, y: 3, width: 4, height: 1 } }
        );
        let third = renderer.render(&canvas, &elements, Some(&second.raster)).unwrap();
        assert_eq!(third.refresh, RefreshScope::Unchanged);
    }

    #[test]
    fn test_font_cache_toggle() {
        let elements = [json!({"type": "text", "x": 0, "y": 0, "value": "hi"})];
        let canvas = json!({"width": 20, "height": 20, "palette": "mono"});

        let cached = Renderer::new();
        cached.render(&canvas, &elements, None).unwrap();
        assert_eq!(cached.fonts().len(), 1);

        let config = RenderConfig { font_cache: false, ..RenderConfig::default() };
        let uncached = Renderer::new().config(config);
        let out = uncached.render(&canvas, &elements, None).unwrap();
        assert!(uncached.fonts().is_empty());
        assert!(out.raster.indices().contains(&0));
    }
}
