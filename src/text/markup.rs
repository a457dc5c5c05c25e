//! Inline color markup.
//!
//! # Syntax
//!
//! - `[red]text[/red]` or `[red]text[/]` - colored run
//! - `[#ff8000]text[/]` - hex color
//! - `\[` - literal `[`
//!
//! Tags nest. A tag left open at a line break keeps coloring the following
//! lines until it is closed or the text ends. Bracketed words that do not
//! name a color are kept as literal text.

use crate::color::Rgba;

/// A contiguous run of characters sharing one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpan {
    /// Span text, markup removed.
    pub text: String,
    /// Span color.
    pub color: Rgba,
}

impl ColorSpan {
    /// Create a span.
    #[must_use]
    pub fn new(text: impl Into<String>, color: Rgba) -> Self {
        Self { text: text.into(), color }
    }
}

/// One line of colored spans.
pub type SpanLine = Vec<ColorSpan>;

/// Text split into lines of color spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Lines in order; an empty line has no spans.
    pub lines: Vec<SpanLine>,
}

impl Paragraph {
    /// Plain text of line `index` with markup removed.
    #[must_use]
    pub fn line_text(&self, index: usize) -> String {
        self.lines
            .get(index)
            .map(|spans| spans.iter().map(|s| s.text.as_str()).collect())
            .unwrap_or_default()
    }
}

struct SpanBuilder {
    lines: Vec<SpanLine>,
    current: SpanLine,
    text: String,
    color: Rgba,
}

impl SpanBuilder {
    fn flush(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        match self.current.last_mut() {
            Some(last) if last.color == self.color => last.text.push_str(&text),
            _ => self.current.push(ColorSpan { text, color: self.color }),
        }
    }

    fn set_color(&mut self, color: Rgba) {
        if color != self.color {
            self.flush();
            self.color = color;
        }
    }

    fn newline(&mut self) {
        self.flush();
        self.lines.push(std::mem::take(&mut self.current));
    }
}

/// Parse inline color markup into a [`Paragraph`].
///
/// `resolve` maps a tag name to a color; tags it rejects stay literal.
///
/// # Example
///
/// ```
/// use epd_render::color::Rgba;
/// use epd_render::text::parse_colors;
///
/// let p = parse_colors("[red]A\nB[/red]", Rgba::BLACK, Rgba::from_name);
/// assert_eq!(p.lines.len(), 2);
/// assert_eq!(p.lines[1][0].color, Rgba::RED);
/// ```
pub fn parse_colors(text: &str, default: Rgba, resolve: impl Fn(&str) -> Option<Rgba>) -> Paragraph {
    let mut out = SpanBuilder { lines: Vec::new(), current: Vec::new(), text: String::new(), color: default };
    // (tag name, color) of each open tag.
    let mut stack: Vec<(String, Rgba)> = Vec::new();
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        match ch {
            '\\' if rest.starts_with('[') => {
                out.text.push('[');
                rest = &rest[1..];
            }
            '\n' => out.newline(),
            '\r' => {}
            '[' => {
                let Some(end) = rest.find(']') else {
                    out.text.push('[');
                    continue;
                };
                let tag = &rest[..end];
                if let Some(name) = tag.strip_prefix('/') {
                    if stack.is_empty() {
                        out.text.push('[');
                        continue;
                    }
                    let name = name.trim();
                    let depth = stack
                        .iter()
                        .rposition(|(open, _)| !name.is_empty() && open.eq_ignore_ascii_case(name))
                        .unwrap_or(stack.len() - 1);
                    stack.truncate(depth);
                } else if let Some(color) = resolve(tag.trim()) {
                    stack.push((tag.trim().to_string(), color));
                } else {
                    out.text.push('[');
                    continue;
                }
                rest = &rest[end + 1..];
                out.set_color(stack.last().map_or(default, |(_, c)| *c));
            }
            _ => out.text.push(ch),
        }
    }

    out.newline();
    Paragraph { lines: out.lines }
}
