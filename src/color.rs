//! Color types and named-color parsing.
//!
//! The working raster stores full-color RGBA pixels; palette reduction happens
//! later in [`crate::quantize`].

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);
    /// Opaque orange.
    pub const ORANGE: Self = Self::new(255, 128, 0, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::new(128, 128, 128, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// True when the pixel contributes nothing to a composite.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parse a `#rrggbb` or `#rgb` hex color.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let nibble = |i: usize| u8::from_str_radix(digits.get(i..=i)?, 16).ok();
        match digits.len() {
            6 => {
                let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
                Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            3 => Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            _ => None,
        }
    }

    /// Resolve a color name (`black`, `red`, `b`, `#ff0000`, ...).
    ///
    /// Palette-relative names such as `accent` are resolved by the parser,
    /// not here.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.starts_with('#') {
            return Self::from_hex(name);
        }
        match name.to_ascii_lowercase().as_str() {
            "black" | "b" => Some(Self::BLACK),
            "white" | "w" => Some(Self::WHITE),
            "red" | "r" => Some(Self::RED),
            "yellow" | "y" => Some(Self::YELLOW),
            "green" | "g" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "orange" | "o" => Some(Self::ORANGE),
            "gray" | "grey" => Some(Self::GRAY),
            "transparent" | "none" => Some(Self::TRANSPARENT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK, Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::WHITE, Rgba::rgb(255, 255, 255));
        assert_eq!(Rgba::RED.r, 255);
        assert_eq!(Rgba::GREEN.g, 255);
        assert_eq!(Rgba::BLUE.b, 255);
    }

    #[test]
    fn test_rgba_with_alpha() {
        let semi_red = Rgba::RED.with_alpha(128);
        assert_eq!(semi_red.r, 255);
        assert_eq!(semi_red.a, 128);
        assert!(!semi_red.is_transparent());
        assert!(Rgba::TRANSPARENT.is_transparent());
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgba::from_hex("#ff8000"), Some(Rgba::rgb(255, 128, 0)));
        assert_eq!(Rgba::from_hex("#f00"), Some(Rgba::RED));
        assert_eq!(Rgba::from_hex("ff0000"), None);
        assert_eq!(Rgba::from_hex("#zz0000"), None);
        assert_eq!(Rgba::from_hex("#12345"), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Rgba::from_name("Red"), Some(Rgba::RED));
        assert_eq!(Rgba::from_name("b"), Some(Rgba::BLACK));
        assert_eq!(Rgba::from_name(" #00ff00 "), Some(Rgba::GREEN));
        assert_eq!(Rgba::from_name("magenta"), None);
    }

    #[test]
    fn test_rgba_to_array_from_array() {
        let color = Rgba::new(10, 20, 30, 40);
        assert_eq!(Rgba::from_array(color.to_array()), color);
    }
}
