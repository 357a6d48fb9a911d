//! Font-size fitting and line wrapping.
//!
//! Both fit variants scan candidate sizes downward from the field's maximum,
//! so the largest satisfying size always wins. Measurement goes through the
//! [`Measure`] trait; the renderer supplies a rusttype-backed implementation
//! and tests use a fixed-advance fake.

use rusttype::{point, Font, Scale};

use crate::config::{FieldStyle, Region};

pub const ELLIPSIS: char = '…';

/// Width of `text` rendered at `px`, in canvas pixels.
pub trait Measure {
    fn width(&self, text: &str, px: f32) -> f32;
}

pub struct FontMeasure<'a> {
    pub font: &'a Font<'static>,
    pub letter_spacing: f32,
}

impl Measure for FontMeasure<'_> {
    fn width(&self, text: &str, px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        let glyphs: Vec<_> = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let mut width: f32 = 0.0;
        for (i, g) in glyphs.iter().enumerate() {
            if let Some(bb) = g.pixel_bounding_box() {
                width = width.max(bb.max.x as f32);
            }
            if i + 1 < glyphs.len() {
                width += self.letter_spacing;
            }
        }
        width
    }
}

/// Outcome of a fit: chosen size, final line breaks, and whether the
/// ellipsis fallback had to kick in. Computed fresh on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub px: u32,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub overflowed: bool,
}

/// Greedy word wrap: extend the current line while it still fits, else start
/// a new one. Words are never split; a single word wider than `max_width`
/// gets its own (overflowing) line.
pub fn wrap_words(measure: &dyn Measure, text: &str, px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let mut test = current.clone();
        test.push(word);
        let test_line = test.join(" ");
        if measure.width(&test_line, px) <= max_width {
            current.push(word);
        } else {
            if !current.is_empty() {
                lines.push(current.join(" "));
            }
            current = vec![word];
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Strips trailing characters until `text + ELLIPSIS` fits. Operates on raw
/// characters, so it may cut inside a word; if nothing fits the ellipsis
/// alone is emitted.
pub fn ellipsize(measure: &dyn Measure, text: &str, px: f32, max_width: f32) -> String {
    if measure.width(text, px) <= max_width {
        return text.to_string();
    }
    let mut t = text.to_string();
    while !t.is_empty() {
        t.pop();
        let candidate = format!("{t}{ELLIPSIS}");
        if measure.width(&candidate, px) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Multiline fit: first size whose wrap stays within `max_lines` and whose
/// block height fits the region. Fallback: minimum size, truncated to
/// `max_lines` with the last retained line ellipsized.
pub fn fit_multiline(
    measure: &dyn Measure,
    text: &str,
    region: Region,
    style: FieldStyle,
) -> FitResult {
    for px in (style.min_size..=style.max_size).rev() {
        let pxf = px as f32;
        let lines = wrap_words(measure, text, pxf, region.w as f32);
        if lines.len() > style.max_lines {
            continue;
        }
        let line_height = pxf * style.line_height;
        if lines.len() as f32 * line_height > region.h as f32 {
            continue;
        }
        return FitResult { px, lines, line_height, overflowed: false };
    }

    let px = style.min_size;
    let pxf = px as f32;
    let mut lines = wrap_words(measure, text, pxf, region.w as f32);
    if lines.len() > style.max_lines {
        lines.truncate(style.max_lines);
    }
    if let Some(last) = lines.last_mut() {
        *last = ellipsize(measure, last, pxf, region.w as f32);
    }
    FitResult { px, lines, line_height: pxf * style.line_height, overflowed: true }
}

/// Single-line fit: first size where the whole string fits the region width
/// and one line height fits the region height.
pub fn fit_single_line(
    measure: &dyn Measure,
    text: &str,
    region: Region,
    style: FieldStyle,
) -> FitResult {
    for px in (style.min_size..=style.max_size).rev() {
        let pxf = px as f32;
        if measure.width(text, pxf) <= region.w as f32
            && pxf * style.line_height <= region.h as f32
        {
            return FitResult {
                px,
                lines: vec![text.to_string()],
                line_height: pxf * style.line_height,
                overflowed: false,
            };
        }
    }

    let px = style.min_size;
    let pxf = px as f32;
    FitResult {
        px,
        lines: vec![ellipsize(measure, text, pxf, region.w as f32)],
        line_height: pxf * style.line_height,
        overflowed: true,
    }
}
