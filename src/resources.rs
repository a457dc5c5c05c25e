//! Resource provider interface.
//!
//! Fonts, icons and downloaded images are fetched by collaborators before a
//! render starts. The core only asks for them through [`ResourceProvider`],
//! which must answer synchronously and without side effects.

use crate::framebuffer::Framebuffer;
use crate::text::Font;
use std::collections::HashMap;

/// A single-channel icon glyph; `alpha >= 128` is inked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major coverage values.
    pub alpha: Vec<u8>,
}

impl IconBitmap {
    /// Build an icon from rows of `#` (inked) and any other character (blank).
    ///
    /// Rows shorter than the widest one are padded with blanks.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let height = rows.len() as u32;
        let mut alpha = vec![0; (width * height) as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    alpha[y * width as usize + x] = 255;
                }
            }
        }
        Self { width, height, alpha }
    }

    /// Coverage at (x, y), zero outside the bitmap.
    #[must_use]
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[(y * self.width + x) as usize]
    }
}

/// Source of fonts, icons and images for a render.
pub trait ResourceProvider {
    /// Glyph metrics and bitmaps for `family` at `size` pixels.
    fn get_font(&self, family: &str, size: u32) -> Option<Font>;

    /// Icon glyph by bare name (namespace prefixes are already stripped).
    fn get_icon(&self, name: &str) -> Option<IconBitmap>;

    /// Full-color bitmap for an image reference (URL, path, entity id).
    fn get_image(&self, reference: &str) -> Option<Framebuffer>;
}

/// Strip a namespacing prefix such as `mdi:` from an icon name.
#[must_use]
pub fn strip_icon_prefix(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, bare)| bare)
}

/// In-memory [`ResourceProvider`] for callers that pre-load everything.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    fonts: HashMap<(String, u32), Font>,
    icons: HashMap<String, IconBitmap>,
    images: HashMap<String, Framebuffer>,
}

impl MemoryResources {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font for (family, size).
    #[must_use]
    pub fn with_font(mut self, family: impl Into<String>, size: u32, font: Font) -> Self {
        self.fonts.insert((family.into(), size), font);
        self
    }

    /// Register an icon under its bare name.
    #[must_use]
    pub fn with_icon(mut self, name: impl Into<String>, icon: IconBitmap) -> Self {
        self.icons.insert(name.into(), icon);
        self
    }

    /// Register an image under a reference string.
    #[must_use]
    pub fn with_image(mut self, reference: impl Into<String>, image: Framebuffer) -> Self {
        self.images.insert(reference.into(), image);
        self
    }
}

impl ResourceProvider for MemoryResources {
    fn get_font(&self, family: &str, size: u32) -> Option<Font> {
        self.fonts.get(&(family.to_string(), size)).cloned()
    }

    fn get_icon(&self, name: &str) -> Option<IconBitmap> {
        self.icons.get(name).cloned()
    }

    fn get_image(&self, reference: &str) -> Option<Framebuffer> {
        self.images.get(reference).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_icon_prefix() {
        assert_eq!(strip_icon_prefix("mdi:home"), "home");
        assert_eq!(strip_icon_prefix("home"), "home");
        assert_eq!(strip_icon_prefix("mdi:weather:sunny"), "weather:sunny");
    }

    #[test]
    fn test_icon_from_ascii() {
        let icon = IconBitmap::from_ascii(&["#.", ".##"]);
        assert_eq!((icon.width, icon.height), (3, 2));
        assert_eq!(icon.coverage(0, 0), 255);
        assert_eq!(icon.coverage(1, 0), 0);
        assert_eq!(icon.coverage(2, 1), 255);
        assert_eq!(icon.coverage(9, 9), 0);
    }

    #[test]
    fn test_memory_resources_lookup() {
        let provider = MemoryResources::new()
            .with_icon("home", IconBitmap::from_ascii(&["#"]))
            .with_image("camera.front", Framebuffer::new(2, 2).unwrap());

        assert!(provider.get_icon("home").is_some());
        assert!(provider.get_icon("mdi:home").is_none());
        assert!(provider.get_image("camera.front").is_some());
        assert!(provider.get_font("default", 16).is_none());
    }
}
