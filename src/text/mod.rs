//! Text layout engine.
//!
//! Parses inline color markup, wraps lines against real glyph advances and
//! resolves the nine anchors against the measured paragraph box.

mod font;
mod layout;
mod markup;

pub use font::{Font, FontCache, Glyph, BUILTIN_FAMILY};
pub use layout::{draw_glyph, LayoutLine, TextAlign, TextLayout};
pub use markup::{parse_colors, ColorSpan, Paragraph, SpanLine};
