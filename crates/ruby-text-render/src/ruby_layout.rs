//! Ruby layout: annotation stacked over base, wrapped as atomic pairs.

use std::sync::Arc;

use ruby_text::{Document, DocumentToken, RubyStyle};
use serde::{Deserialize, Serialize};

use crate::metrics::TextMeasurer;
use crate::render_ir::{PositionedToken, Rect, RubyLayout};

/// Probe text for the base line height.
pub const BASE_HEIGHT_PROBE: &str = "你好";
/// Probe text for the annotation line height: tone marks plus ascenders and
/// descenders.
pub const ANNOTATION_HEIGHT_PROBE: &str = "āáǎàaHhJjPpYyG";

/// Constraint on one axis of the measured size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeConstraint {
    /// The size is fixed by the host.
    Exact(i32),
    /// Content may use up to this size.
    AtMost(i32),
    /// No limit.
    #[default]
    Unbounded,
}

impl SizeConstraint {
    /// Space available for content; [`i32::MAX`] when unbounded.
    pub fn available(self) -> i32 {
        match self {
            Self::Exact(size) | Self::AtMost(size) => size.max(0),
            Self::Unbounded => i32::MAX,
        }
    }

    pub fn exact(self) -> Option<i32> {
        match self {
            Self::Exact(size) => Some(size.max(0)),
            _ => None,
        }
    }

    /// Same constraint with `amount` removed from the available space.
    pub fn shrink(self, amount: i32) -> Self {
        match self {
            Self::Exact(size) => Self::Exact(size.saturating_sub(amount).max(0)),
            Self::AtMost(size) => Self::AtMost(size.saturating_sub(amount).max(0)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

/// Inputs of a ruby layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RubyLayoutParams {
    pub base_font_size: f32,
    pub annotation_font_size: f32,
    /// Gap between pairs on a line.
    pub horizontal_spacing: i32,
    /// Gap between lines.
    pub vertical_spacing: i32,
    /// Gap between an annotation box and its base box.
    pub pair_spacing: i32,
    pub width: SizeConstraint,
    pub height: SizeConstraint,
}

impl RubyLayoutParams {
    /// Params for `style` under the given content constraints.
    pub fn from_style(style: &RubyStyle, width: SizeConstraint, height: SizeConstraint) -> Self {
        Self {
            base_font_size: style.base_font_size(),
            annotation_font_size: style.annotation_font_size(),
            horizontal_spacing: style.horizontal_spacing(),
            vertical_spacing: style.vertical_spacing(),
            pair_spacing: style.pair_spacing(),
            width,
            height,
        }
    }
}

impl Default for RubyLayoutParams {
    fn default() -> Self {
        Self::from_style(
            &RubyStyle::default(),
            SizeConstraint::Unbounded,
            SizeConstraint::Unbounded,
        )
    }
}

/// Ruby layout engine.
#[derive(Clone)]
pub struct RubyLayoutEngine {
    measurer: Arc<dyn TextMeasurer>,
}

impl core::fmt::Debug for RubyLayoutEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RubyLayoutEngine").finish_non_exhaustive()
    }
}

/// Per-pass cursor over the current line.
#[derive(Clone, Copy, Debug, Default)]
struct LineCursor {
    line: usize,
    column: usize,
    extent: i32,
    top: i32,
    max_extent: i32,
}

impl LineCursor {
    fn next_line(&mut self, advance: i32) {
        self.line += 1;
        self.column = 0;
        self.extent = 0;
        self.top = self.top.saturating_add(advance);
    }
}

impl RubyLayoutEngine {
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    pub fn measurer(&self) -> &Arc<dyn TextMeasurer> {
        &self.measurer
    }

    /// Rounded-up advance width.
    pub fn text_width(&self, text: &str, font_size: f32) -> i32 {
        ceil_px(self.measurer.measure_width(text, font_size))
    }

    /// Line heights `(base, annotation)` from the probe strings.
    pub fn script_heights(&self, params: &RubyLayoutParams) -> (i32, i32) {
        let base = ceil_px(
            self.measurer
                .text_height(BASE_HEIGHT_PROBE, params.base_font_size),
        );
        let annotation = ceil_px(
            self.measurer
                .text_height(ANNOTATION_HEIGHT_PROBE, params.annotation_font_size),
        );
        (base, annotation)
    }

    /// Place every non-break token of `doc`.
    ///
    /// Pairs never split. A pair that does not fit after the last pair of a
    /// line moves to column 0 of the next line; a pair wider than the whole
    /// line is placed alone and overflows.
    pub fn layout(&self, doc: &Document, params: &RubyLayoutParams) -> RubyLayout {
        let (base_h, ann_h) = self.script_heights(params);
        if doc.is_empty() {
            return RubyLayout {
                tokens: Vec::new(),
                measured_width: params.width.exact().unwrap_or(0),
                measured_height: params.height.exact().unwrap_or(0),
                line_count: 0,
                base_height: base_h,
                annotation_height: ann_h,
            };
        }

        let available = params.width.available();
        let hs = params.horizontal_spacing;
        let advance = base_h
            .saturating_add(ann_h)
            .saturating_add(params.pair_spacing)
            .saturating_add(params.vertical_spacing);
        let mut cursor = LineCursor::default();
        let mut tokens = Vec::with_capacity(doc.len());

        for token in doc.tokens() {
            if token.is_line_break() {
                cursor.next_line(advance);
                continue;
            }
            let base_w = self.text_width(&token.base, params.base_font_size);
            let ann_w = self.text_width(&token.annotation, params.annotation_font_size);
            let pair_w = base_w.max(ann_w);

            if cursor.column > 0
                && cursor.extent.saturating_add(hs).saturating_add(pair_w) > available
            {
                log::trace!(
                    "wrap before {:?}: extent={} pair={} available={}",
                    token.base,
                    cursor.extent,
                    pair_w,
                    available
                );
                cursor.next_line(advance);
            }
            let left = if cursor.column == 0 {
                cursor.extent
            } else {
                cursor.extent.saturating_add(hs)
            };
            cursor.extent = left.saturating_add(pair_w);
            cursor.max_extent = cursor.max_extent.max(cursor.extent);

            tokens.push(place(
                token,
                &cursor,
                left,
                (ann_w, base_w, pair_w),
                (ann_h, base_h),
                params.pair_spacing,
            ));
            cursor.column += 1;
        }

        let measured_width = match params.width {
            SizeConstraint::Exact(w) => w.max(0),
            SizeConstraint::AtMost(w) => cursor.max_extent.min(w.max(0)),
            SizeConstraint::Unbounded => cursor.max_extent,
        };
        let measured_height = params.height.exact().unwrap_or(
            cursor
                .top
                .saturating_add(ann_h)
                .saturating_add(params.pair_spacing)
                .saturating_add(base_h)
                .saturating_add(base_h / 4),
        );
        log::debug!(
            "ruby layout: {} tokens on {} lines, {}x{}",
            tokens.len(),
            cursor.line + 1,
            measured_width,
            measured_height
        );

        RubyLayout {
            tokens,
            measured_width,
            measured_height,
            line_count: cursor.line + 1,
            base_height: base_h,
            annotation_height: ann_h,
        }
    }
}

fn place(
    token: &DocumentToken,
    cursor: &LineCursor,
    left: i32,
    (ann_w, base_w, pair_w): (i32, i32, i32),
    (ann_h, base_h): (i32, i32),
    pair_spacing: i32,
) -> PositionedToken {
    // Coordinates saturate at the i32 bounds for oversized fonts.
    let ann_left = left.saturating_add((pair_w - ann_w) / 2);
    let base_left = left.saturating_add((pair_w - base_w) / 2);
    let annotation_box = Rect::new(
        ann_left,
        cursor.top,
        ann_left.saturating_add(ann_w),
        cursor.top.saturating_add(ann_h),
    );
    let base_top = annotation_box.bottom.saturating_add(pair_spacing);
    let base_box = Rect::new(
        base_left,
        base_top,
        base_left.saturating_add(base_w),
        base_top.saturating_add(base_h),
    );
    PositionedToken {
        token: token.clone(),
        line: cursor.line,
        column: cursor.column,
        annotation_box,
        base_box,
        combined_box: annotation_box.union(&base_box),
    }
}

fn ceil_px(value: f32) -> i32 {
    if value.is_finite() && value > 0.0 {
        value.ceil() as i32
    } else {
        0
    }
}
