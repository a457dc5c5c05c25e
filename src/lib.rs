//! # epd-render
//!
//! Deterministic rendering and palette quantization for electronic-paper
//! displays.
//!
//! A render request is a canvas record (size, palette, rotation) plus an
//! ordered list of declarative element records: text, shapes, dashed paths,
//! time-series plots, icons, images, progress bars and a debug grid. The
//! engine validates them, composites them onto an RGBA working raster and
//! quantizes the result to the panel's firmware palette with a selectable
//! dithering algorithm. Identical input always yields identical bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use epd_render::prelude::*;
//! use serde_json::json;
//!
//! let renderer = Renderer::new();
//! let canvas = json!({"width": 64, "height": 32, "palette": "bwr"});
//! let elements = [
//!     json!({"type": "text", "x": "50%", "y": 4, "anchor": "top", "value": "[red]Hi[/red]"}),
//!     json!({"type": "line", "x_start": 0, "y_start": 20, "x_end": 63, "y_end": 20, "dashed": true}),
//! ];
//!
//! let out = renderer.render(&canvas, &elements, None)?;
//! assert_eq!(out.raster.width(), 64);
//! assert!(out.warnings.is_empty());
//! # Ok::<(), epd_render::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`element`]: records to typed [`element::Element`]s, with warnings
//! - [`text`], [`render`], [`plots`]: layout and rasterization primitives
//! - [`compositor`]: per-element layers, rotation, opacity, global rotation
//! - [`quantize`]: palette mapping with ordered or error-diffusion dithering
//! - [`output`]: [`output::RenderOutput`], refresh hints, indexed PNG

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in raster code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Color types and named-color parsing.
pub mod color;

/// RGBA working raster.
pub mod framebuffer;

/// Points, rectangles, anchors.
pub mod geometry;

/// Linear data-to-pixel mapping.
pub mod scale;

/// Renderer defaults.
pub mod config;

/// Font, icon and image provider interface.
pub mod resources;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Element model and validation.
pub mod element;

/// Color markup, wrapping and glyph drawing.
pub mod text;

/// Shape and path rasterization.
pub mod render;

/// Time-series plots.
pub mod plots;

/// Canvas compositing.
pub mod compositor;

/// Palette quantization and dithering.
pub mod quantize;

/// Render results and encoders.
pub mod output;

/// Top-level render entry point.
pub mod renderer;

// ============================================================================
// Error Types
// ============================================================================

/// Error and warning types.
pub mod error;

pub use error::{Error, RenderWarning, Result, WarningKind};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use epd_render::prelude::*;
/// ```
pub mod prelude {
    pub use batuta_common::display::WithDimensions;
    pub use crate::color::Rgba;
    pub use crate::config::RenderConfig;
    pub use crate::element::{CanvasSpec, Element, ElementKind};
    pub use crate::error::{Error, RenderWarning, Result, WarningKind};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::geometry::{Anchor, PixelBounds, Point, Rect};
    pub use crate::output::{PngEncoder, RefreshScope, RenderOutput};
    pub use crate::plots::{LineStyle, Sample, Series, TimeSeriesPlot};
    pub use crate::quantize::{quantize, Dither, IndexedRaster, PaletteId};
    pub use crate::render::{DashPattern, Stroke};
    pub use crate::renderer::Renderer;
    pub use crate::resources::{IconBitmap, MemoryResources, ResourceProvider};
    pub use crate::text::{Font, FontCache};
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;
