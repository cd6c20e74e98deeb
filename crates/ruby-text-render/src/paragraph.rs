//! Paragraph layout for the single-script draw modes.
//!
//! The renderer only depends on [`ParagraphLayouter`]; hosts with a native
//! text stack plug theirs in. [`GreedyParagraphLayouter`] is a font-agnostic
//! implementation built on [`TextMeasurer`].

use std::sync::Arc;

use ruby_text::{parse_markup_lossy, Color, DEFAULT_BASE_FONT_SIZE, INDENT_CHAR};
use serde::Serialize;
use smallvec::SmallVec;

use crate::metrics::{is_wide_char, TextMeasurer};

/// Inputs of a paragraph layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParagraphRequest {
    /// Available line width; [`i32::MAX`] for unbounded.
    pub width: i32,
    pub font_size: f32,
    /// Extra space added below every line except the last.
    pub line_spacing: i32,
    /// Color for text outside any `<font>` element.
    pub default_color: Color,
}

impl Default for ParagraphRequest {
    fn default() -> Self {
        Self {
            width: i32::MAX,
            font_size: DEFAULT_BASE_FONT_SIZE,
            line_spacing: 0,
            default_color: Color::DEFAULT_TEXT,
        }
    }
}

/// A same-colored run within one line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineRun {
    pub text: String,
    /// Left x relative to the line's left edge.
    pub x: i32,
    pub color: Color,
}

/// One visual line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParagraphLine {
    /// First char index (in the plain text) on this line.
    pub start: usize,
    /// One past the last char index, including a consumed trailing break.
    pub end: usize,
    pub left: i32,
    /// Right edge of the visible text, trailing spaces excluded.
    pub right: i32,
    pub top: i32,
    /// Bottom of the line box, including line spacing unless last.
    pub bottom: i32,
    pub baseline: i32,
    pub runs: SmallVec<[LineRun; 2]>,
}

impl ParagraphLine {
    /// Visible text of the line.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Number of indentation placeholders at the start of the line.
    pub fn leading_indents(&self) -> usize {
        self.runs
            .iter()
            .flat_map(|run| run.text.chars())
            .take_while(|&ch| ch == INDENT_CHAR)
            .count()
    }
}

/// Result of a paragraph layout pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ParagraphLayout {
    /// Plain text with breaks as `'\n'`.
    pub text: String,
    pub lines: Vec<ParagraphLine>,
    /// Bottom of the last line.
    pub height: i32,
    /// Width of the widest explicit line if nothing wrapped.
    pub desired_width: i32,
}

impl ParagraphLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Lays out inline color markup into wrapped lines.
pub trait ParagraphLayouter: Send + Sync {
    fn layout_paragraph(&self, markup: &str, request: &ParagraphRequest) -> ParagraphLayout;
}

/// Greedy word-wrapping layouter.
///
/// Latin text breaks after spaces; each wide (CJK) character is its own break
/// opportunity. A unit that does not fit an empty line is split by character.
#[derive(Clone)]
pub struct GreedyParagraphLayouter {
    measurer: Arc<dyn TextMeasurer>,
}

impl core::fmt::Debug for GreedyParagraphLayouter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GreedyParagraphLayouter")
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug)]
struct Glyph {
    ch: char,
    color: Color,
}

/// Char range `[start, end)` within a hard line, plus the index where the
/// trailing spaces begin.
#[derive(Clone, Copy, Debug)]
struct Unit {
    start: usize,
    visible_end: usize,
    end: usize,
}

impl GreedyParagraphLayouter {
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    /// Running advance: `edges[i]` is the width of `glyphs[..i]`.
    fn advance_edges(&self, glyphs: &[Glyph], font_size: f32) -> Vec<f32> {
        let mut edges = Vec::with_capacity(glyphs.len() + 1);
        let mut buf = [0u8; 4];
        let mut total = 0.0f32;
        edges.push(total);
        for glyph in glyphs {
            total += self
                .measurer
                .measure_width(glyph.ch.encode_utf8(&mut buf), font_size);
            edges.push(total);
        }
        edges
    }

    /// Break one explicit line into `(start, end)` char ranges.
    fn wrap(
        &self,
        glyphs: &[Glyph],
        edges: &[f32],
        request: &ParagraphRequest,
    ) -> Vec<(usize, usize)> {
        let available = request.width as f32;
        let fits = |start: usize, end: usize| edges[end] - edges[start] <= available;
        let mut ranges = Vec::new();
        let mut line_start = 0usize;
        let mut line_end = 0usize;

        for unit in split_units(glyphs) {
            if fits(line_start, unit.visible_end) {
                line_end = unit.end;
                continue;
            }
            if line_end > line_start {
                ranges.push((line_start, line_end));
                line_start = line_end;
                if fits(line_start, unit.visible_end) {
                    line_end = unit.end;
                    continue;
                }
            }
            // Too wide for an empty line: split by character, at least one
            // character per line.
            let mut cursor = unit.start;
            loop {
                let mut end = cursor + 1;
                while end < unit.visible_end && fits(cursor, end + 1) {
                    end += 1;
                }
                if end >= unit.visible_end {
                    break;
                }
                ranges.push((cursor, end));
                cursor = end;
            }
            line_start = cursor;
            line_end = unit.end;
        }
        if line_end > line_start || ranges.is_empty() {
            ranges.push((line_start, line_end));
        }
        ranges
    }

}

/// Split a line into same-colored runs. `edges` are the advance edges of
/// `glyphs`, starting at the line's left edge.
fn runs_for(glyphs: &[Glyph], edges: &[f32]) -> SmallVec<[LineRun; 2]> {
    let origin = edges.first().copied().unwrap_or(0.0);
    let mut runs: SmallVec<[LineRun; 2]> = SmallVec::new();
    for (glyph, edge) in glyphs.iter().zip(edges) {
        match runs.last_mut() {
            Some(run) if run.color == glyph.color => run.text.push(glyph.ch),
            _ => runs.push(LineRun {
                text: glyph.ch.to_string(),
                x: round_px(edge - origin),
                color: glyph.color,
            }),
        }
    }
    runs
}

fn split_units(glyphs: &[Glyph]) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut i = 0usize;
    while i < glyphs.len() {
        let start = i;
        if is_wide_char(glyphs[i].ch) {
            i += 1;
        } else {
            while i < glyphs.len() && glyphs[i].ch != ' ' && !is_wide_char(glyphs[i].ch) {
                i += 1;
            }
        }
        let visible_end = i;
        while i < glyphs.len() && glyphs[i].ch == ' ' {
            i += 1;
        }
        units.push(Unit {
            start,
            visible_end,
            end: i,
        });
    }
    units
}

impl ParagraphLayouter for GreedyParagraphLayouter {
    fn layout_paragraph(&self, markup: &str, request: &ParagraphRequest) -> ParagraphLayout {
        let runs = parse_markup_lossy(markup, request.default_color);
        let mut glyphs = Vec::new();
        for run in &runs {
            glyphs.extend(run.text.chars().map(|ch| Glyph {
                ch,
                color: run.color,
            }));
        }
        let text: String = glyphs.iter().map(|g| g.ch).collect();
        if glyphs.is_empty() {
            return ParagraphLayout::default();
        }

        let metrics = self.measurer.line_metrics(request.font_size);
        let ascent = round_px(metrics.ascent);
        let line_height = round_px(metrics.line_height());
        let pitch = line_height.saturating_add(request.line_spacing);
        let mut lines = Vec::new();
        let mut desired = 0.0f32;
        let mut offset = 0usize;
        let mut top = 0i32;

        let hard_lines: Vec<&[Glyph]> = glyphs.split(|g| g.ch == '\n').collect();
        let hard_count = hard_lines.len();
        for (hard_index, hard) in hard_lines.into_iter().enumerate() {
            let edges = self.advance_edges(hard, request.font_size);
            desired = desired.max(edges[hard.len()]);
            let ranges = self.wrap(hard, &edges, request);
            let range_count = ranges.len();
            for (range_index, (start, end)) in ranges.into_iter().enumerate() {
                let visible_end = trim_trailing_spaces(hard, start, end);
                let right = ceil_px(edges[visible_end] - edges[start]);
                let consumes_break = range_index + 1 == range_count && hard_index + 1 < hard_count;
                lines.push(ParagraphLine {
                    start: offset + start,
                    end: offset + end + usize::from(consumes_break),
                    left: 0,
                    right,
                    top,
                    bottom: top.saturating_add(pitch),
                    baseline: top.saturating_add(ascent),
                    runs: runs_for(&hard[start..end], &edges[start..=end]),
                });
                top = top.saturating_add(pitch);
            }
            offset += hard.len() + 1;
        }

        if let Some(last) = lines.last_mut() {
            last.bottom = last.bottom.saturating_sub(request.line_spacing);
        }
        let height = lines.last().map_or(0, |line| line.bottom);
        log::debug!(
            "paragraph layout: {} chars on {} lines, height={}",
            glyphs.len(),
            lines.len(),
            height
        );
        ParagraphLayout {
            text,
            lines,
            height,
            desired_width: ceil_px(desired),
        }
    }
}

fn trim_trailing_spaces(glyphs: &[Glyph], start: usize, end: usize) -> usize {
    let mut visible_end = end;
    while visible_end > start && glyphs[visible_end - 1].ch == ' ' {
        visible_end -= 1;
    }
    visible_end
}

fn ceil_px(value: f32) -> i32 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as i32
    } else {
        0
    }
}

fn round_px(value: f32) -> i32 {
    if value.is_finite() {
        value.round() as i32
    } else {
        0
    }
}
