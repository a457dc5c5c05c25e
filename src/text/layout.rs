//! Line wrapping, measurement and anchored drawing of colored paragraphs.

use super::font::Font;
use super::markup::{ColorSpan, Paragraph, SpanLine};
use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Anchor, Point};

/// Horizontal alignment of lines inside the paragraph box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

impl TextAlign {
    /// Parse `left`, `center` or `right`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" | "middle" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// A laid-out line with its measured width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    /// Colored spans of the line.
    pub spans: SpanLine,
    /// Rendered width in pixels.
    pub width: u32,
}

impl LayoutLine {
    fn from_chars(chars: &[(char, Rgba)], font: &Font) -> Self {
        let mut spans: SpanLine = Vec::new();
        for &(ch, color) in chars {
            match spans.last_mut() {
                Some(span) if span.color == color => span.text.push(ch),
                _ => spans.push(ColorSpan::new(ch.to_string(), color)),
            }
        }
        let width = chars.iter().fold(0_u32, |w, &(ch, _)| w.saturating_add(font.advance(ch)));
        Self { spans, width }
    }

    /// Plain text of the line.
    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A paragraph measured against one font, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    /// Lines in drawing order.
    pub lines: Vec<LayoutLine>,
    /// Width of the widest line.
    pub width: u32,
    /// Total height including inter-line spacing.
    pub height: u32,
    /// Height of one line.
    pub line_height: u32,
    /// Extra pixels between lines.
    pub spacing: u32,
}

impl TextLayout {
    /// Lay out `paragraph`, wrapping to `max_width` when given.
    #[must_use]
    pub fn new(paragraph: &Paragraph, font: &Font, max_width: Option<u32>, spacing: u32) -> Self {
        let lines: Vec<LayoutLine> = paragraph
            .lines
            .iter()
            .flat_map(|line| match max_width {
                Some(max) => wrap_line(line, font, max),
                None => {
                    let chars = flatten(line);
                    vec![LayoutLine::from_chars(&chars, font)]
                }
            })
            .collect();

        let width = lines.iter().map(|l| l.width).max().unwrap_or(0);
        let n = lines.len() as u32;
        let line_height = font.line_height();
        let height = if n == 0 {
            0
        } else {
            n.saturating_mul(line_height).saturating_add((n - 1).saturating_mul(spacing))
        };
        Self { lines, width, height, line_height, spacing }
    }

    /// Top-left drawing origin that puts `anchor` of the paragraph box on `at`.
    #[must_use]
    pub fn origin(&self, anchor: Anchor, at: Point) -> Point {
        anchor.origin(at, self.width as f32, self.height as f32)
    }

    /// Draw every line with its top-left corner at `origin`.
    pub fn draw(&self, fb: &mut Framebuffer, font: &Font, origin: Point, align: TextAlign) {
        let (ox, oy) = origin.to_pixel();
        let step = i64::from(self.line_height) + i64::from(self.spacing);
        for (i, line) in self.lines.iter().enumerate() {
            let slack = self.width - line.width;
            let shift = match align {
                TextAlign::Left => 0,
                TextAlign::Center => slack / 2,
                TextAlign::Right => slack,
            };
            let y = i64::from(oy) + i as i64 * step;
            if y >= i64::from(fb.height()) {
                break;
            }
            let mut x = i64::from(ox) + i64::from(shift);
            for span in &line.spans {
                for ch in span.text.chars() {
                    if x >= i64::from(fb.width()) {
                        break;
                    }
                    draw_glyph(fb, font, ch, x, y, span.color);
                    x += i64::from(font.advance(ch));
                }
            }
        }
    }
}

/// Draw one glyph with its cell's top-left at (x, y).
///
/// Only the part of the glyph box that overlaps `fb` is visited.
pub fn draw_glyph(fb: &mut Framebuffer, font: &Font, ch: char, x: i64, y: i64, color: Rgba) {
    let Some(glyph) = font.glyph(ch) else { return };
    let top = y + i64::from(glyph.offset_y);
    let rows = visible(top, glyph.height, fb.height());
    let columns = visible(x, glyph.width, fb.width());
    for gy in rows {
        for gx in columns.clone() {
            if glyph.is_set(gx, gy) {
                fb.put((x + i64::from(gx)) as i32, (top + i64::from(gy)) as i32, color);
            }
        }
    }
}

/// Offsets into a run of `len` pixels starting at `origin` that land in
/// `0..limit`.
fn visible(origin: i64, len: u32, limit: u32) -> std::ops::Range<u32> {
    let len = i64::from(len);
    let start = (-origin).clamp(0, len);
    let end = (i64::from(limit) - origin).clamp(0, len);
    start as u32..end as u32
}

fn flatten(line: &SpanLine) -> Vec<(char, Rgba)> {
    line.iter().flat_map(|span| span.text.chars().map(move |c| (c, span.color))).collect()
}

/// Greedily wrap one source line to `max_width`.
///
/// Words are separated by whitespace; a span that straddles a break keeps its
/// color on both sides. A word wider than `max_width` on its own is broken
/// between glyphs, keeping at least one glyph per line.
fn wrap_line(line: &SpanLine, font: &Font, max_width: u32) -> Vec<LayoutLine> {
    let chars = flatten(line);
    let words: Vec<&[(char, Rgba)]> =
        chars.split(|&(c, _)| c.is_whitespace()).filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return vec![LayoutLine::from_chars(&[], font)];
    }

    // The space between two words takes the color of the word before it.
    let measure =
        |w: &[(char, Rgba)]| -> u32 { w.iter().fold(0_u32, |n, &(c, _)| n.saturating_add(font.advance(c))) };
    let space = font.advance(' ');

    let mut out = Vec::new();
    let mut current: Vec<(char, Rgba)> = Vec::new();
    let mut current_width = 0_u32;

    for word in words {
        let word_width = measure(word);
        let joined = if current.is_empty() {
            word_width
        } else {
            current_width.saturating_add(space).saturating_add(word_width)
        };
        if joined <= max_width {
            if let Some(&(_, color)) = current.last() {
                current.push((' ', color));
            }
            current.extend_from_slice(word);
            current_width = joined;
            continue;
        }

        if !current.is_empty() {
            out.push(LayoutLine::from_chars(&current, font));
            current.clear();
            current_width = 0;
        }

        let mut rest = word;
        while measure(rest) > max_width {
            let mut taken = 0;
            let mut width = 0_u32;
            for &(c, _) in rest {
                let advance = font.advance(c);
                if taken > 0 && width.saturating_add(advance) > max_width {
                    break;
                }
                width = width.saturating_add(advance);
                taken += 1;
            }
            out.push(LayoutLine::from_chars(&rest[..taken], font));
            rest = &rest[taken..];
        }
        current.extend_from_slice(rest);
        current_width = measure(rest);
    }

    if !current.is_empty() {
        out.push(LayoutLine::from_chars(&current, font));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::parse_colors;

    fn paragraph(text: &str) -> Paragraph {
        parse_colors(text, Rgba::BLACK, Rgba::from_name)
    }

    #[test]
    fn test_layout_without_wrap() {
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("ab\nabcd"), &font, None, 2);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.width, 24);
        assert_eq!(layout.height, 8 + 2 + 8);
    }

    #[test]
    fn test_measure_ignores_markup() {
        let font = Font::builtin(8);
        let plain = TextLayout::new(&paragraph("hello"), &font, None, 0);
        let tagged = TextLayout::new(&paragraph("[red]hel[/red]lo"), &font, None, 0);
        assert_eq!(plain.width, tagged.width);
    }

    #[test]
    fn test_greedy_wrap() {
        let font = Font::builtin(8);
        // Each glyph is 6px: "aa bb" = 30px, "aa bb cc" = 48px.
        let layout = TextLayout::new(&paragraph("aa bb cc"), &font, Some(30), 0);
        let texts: Vec<String> = layout.lines.iter().map(LayoutLine::text).collect();
        assert_eq!(texts, vec!["aa bb", "cc"]);
    }

    #[test]
    fn test_wrap_splits_span_keeping_color() {
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("[red]aa bb[/red]"), &font, Some(12), 0);
        assert_eq!(layout.lines.len(), 2);
        for line in &layout.lines {
            assert_eq!(line.spans[0].color, Rgba::RED);
        }
    }

    #[test]
    fn test_overlong_word_breaks_between_glyphs() {
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("abcdefg"), &font, Some(18), 0);
        let texts: Vec<String> = layout.lines.iter().map(LayoutLine::text).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_narrower_than_one_glyph_keeps_progress() {
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("ab"), &font, Some(1), 0);
        assert_eq!(layout.lines.len(), 2);
    }

    #[test]
    fn test_anchor_origin_uses_rendered_width() {
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("[red]abcd[/red]"), &font, None, 0);
        let origin = layout.origin(Anchor::Center, Point::new(50.0, 50.0));
        assert_eq!(origin, Point::new(38.0, 46.0));
        let origin = layout.origin(Anchor::BottomRight, Point::new(50.0, 50.0));
        assert_eq!(origin, Point::new(26.0, 42.0));
    }

    #[test]
    fn test_draw_colors_pixels() {
        let font = Font::builtin(8);
        let mut fb = Framebuffer::new(40, 20).unwrap();
        let layout = TextLayout::new(&paragraph("[red]T[/red]T"), &font, None, 0);
        layout.draw(&mut fb, &font, Point::new(1.0, 1.0), TextAlign::Left);
        // Top bar of each 'T'.
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(7, 1), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_center_alignment() {
        let font = Font::builtin(8);
        let mut fb = Framebuffer::new(40, 20).unwrap();
        let layout = TextLayout::new(&paragraph("TTT\nT"), &font, None, 0);
        layout.draw(&mut fb, &font, Point::ORIGIN, TextAlign::Center);
        // Second line is shifted by (18 - 6) / 2 = 6px.
        assert_eq!(fb.get_pixel(6, 8), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(0, 8), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_draw_far_origin_and_huge_glyphs() {
        let mut fb = Framebuffer::new(40, 20).unwrap();
        let font = Font::builtin(8);
        let layout = TextLayout::new(&paragraph("TTT"), &font, None, 0);
        layout.draw(&mut fb, &font, Point::new(3e9, -3e9), TextAlign::Left);
        layout.draw(&mut fb, &font, Point::new(f32::MAX, f32::MAX), TextAlign::Right);
        assert!(fb.content_bounds().is_none());

        // One 'T' at scale 10000 covers the buffer with its top bar.
        let huge = Font::builtin(80_000);
        let layout = TextLayout::new(&paragraph("T"), &huge, None, 0);
        layout.draw(&mut fb, &huge, Point::new(-10.0, 0.0), TextAlign::Left);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(39, 19), Some(Rgba::BLACK));
    }

    #[test]
    fn test_text_align_parse() {
        assert_eq!(TextAlign::parse("Center"), Some(TextAlign::Center));
        assert_eq!(TextAlign::parse("justify"), None);
    }
}
