//! Text measurement seam.

/// Vertical metrics of a single line of text at a font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Distance from the line top to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the line bottom.
    pub descent: f32,
}

impl LineMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Width/height measurement for text runs.
///
/// Implementations must be deterministic: the same text and size always
/// produce the same values, otherwise layout passes are not reproducible.
pub trait TextMeasurer: Send + Sync {
    /// Advance width of `text` at `font_size`.
    fn measure_width(&self, text: &str, font_size: f32) -> f32;

    /// Ink height of `text` at `font_size` (top of the tallest glyph to the
    /// bottom of the deepest descender).
    fn text_height(&self, text: &str, font_size: f32) -> f32;

    /// Line box metrics used for paragraph baselines.
    ///
    /// Default uses typical sans-serif proportions.
    fn line_metrics(&self, font_size: f32) -> LineMetrics {
        LineMetrics {
            ascent: font_size * 0.93,
            descent: font_size * 0.24,
        }
    }
}

/// Whether a character is rendered at full (square) width.
pub fn is_wide_char(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

/// Font-free measurer driven by per-glyph width classes.
///
/// Useful for previews and tests; hosts with real fonts should supply their
/// own [`TextMeasurer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl HeuristicMeasurer {
    pub fn new() -> Self {
        Self
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let em_sum: f32 = text.chars().map(glyph_em_width).sum();
        em_sum * font_size
    }

    fn text_height(&self, text: &str, font_size: f32) -> f32 {
        let mut above = 0.0f32;
        let mut below = 0.0f32;
        for ch in text.chars() {
            let (a, b) = glyph_em_extent(ch);
            above = above.max(a);
            below = below.max(b);
        }
        (above + below) * font_size
    }
}

fn glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        '\t' => 1.28,
        '\n' => 0.0,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if is_wide_char(c) => 1.0,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

/// Extent above and below the baseline, in em.
fn glyph_em_extent(ch: char) -> (f32, f32) {
    match ch {
        c if is_wide_char(c) => (0.80, 0.08),
        'g' | 'p' | 'q' | 'y' => (0.52, 0.22),
        'j' => (0.72, 0.22),
        'b' | 'd' | 'f' | 'h' | 'k' | 'l' | 't' | 'i' => (0.72, 0.0),
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => (0.72, 0.0),
        c if c.is_ascii_lowercase() => (0.52, 0.0),
        c if c.is_alphabetic() => (0.74, 0.0),
        c if c.is_whitespace() => (0.0, 0.0),
        _ => (0.72, 0.0),
    }
}
