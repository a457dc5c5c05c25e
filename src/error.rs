//! Error and warning types for epd-render operations.
//!
//! Only a malformed canvas (and I/O from the optional encoders) is reported
//! as an [`Error`]. Problems confined to a single element are collected as
//! [`RenderWarning`]s and returned next to the finished raster.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a render request.
#[derive(Error, Debug)]
pub enum Error {
    /// The canvas descriptor is invalid; no raster is produced.
    #[error("Invalid canvas field `{field}`: {reason}")]
    InvalidCanvas {
        /// Offending field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// Invalid dimensions for a framebuffer.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// An index buffer does not describe a raster of the given palette.
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Scale domain error (e.g., empty value range).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Malformed JSON input or configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),
}

impl Error {
    pub(crate) fn canvas(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidCanvas { field, reason: reason.into() }
    }
}

/// Category of a non-fatal render problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Element was malformed (unknown kind, missing or mistyped field) and skipped.
    InvalidElement,
    /// An enumerated option was not recognized; a default was used instead.
    UnsupportedOption,
    /// A font, icon or image could not be resolved; the element was skipped.
    MissingResource,
}

impl WarningKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidElement => "invalid element",
            Self::UnsupportedOption => "unsupported option",
            Self::MissingResource => "missing resource",
        }
    }
}

/// A non-fatal problem collected while parsing or rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    /// Input index of the element concerned, `None` for canvas-level options.
    pub index: Option<usize>,
    /// Warning category.
    pub kind: WarningKind,
    /// Description of the problem.
    pub message: String,
}

impl RenderWarning {
    /// Create a warning attached to the element at `index`.
    #[must_use]
    pub fn element(index: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Self { index: Some(index), kind, message: message.into() }
    }

    /// Create a canvas-level warning.
    #[must_use]
    pub fn canvas(kind: WarningKind, message: impl Into<String>) -> Self {
        Self { index: None, kind, message: message.into() }
    }
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "element {index}: {}: {}", self.kind.as_str(), self.message),
            None => write!(f, "canvas: {}: {}", self.kind.as_str(), self.message),
        }
    }
}
