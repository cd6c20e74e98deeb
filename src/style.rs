//! Style and configuration state.
//!
//! Every setter validates its input and reports how much cached work the
//! change invalidates. Rejected or unchanged values report
//! [`Invalidation::None`] and leave the style untouched.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Default base font size in pixels.
pub const DEFAULT_BASE_FONT_SIZE: f32 = 14.0;
/// Default annotation/base size ratio.
pub const DEFAULT_ANNOTATION_RATIO: f32 = 0.5;
/// Default gap between tokens on a line.
pub const DEFAULT_HORIZONTAL_SPACING: i32 = 5;

/// Which representation is laid out and drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Base script only, as a wrapped paragraph.
    #[default]
    BaseOnly,
    /// Annotation stacked over base, token by token.
    AnnotationAndBase,
    /// Annotation only, as a wrapped paragraph.
    AnnotationOnly,
}

/// Underline stroke pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineStyle {
    #[default]
    Solid,
    /// Dashes and gaps as long as the stroke width.
    Dashed,
}

/// How much cached state a configuration change invalidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Invalidation {
    /// Nothing changed.
    None,
    /// Geometry is unchanged; only pixels need repainting.
    Redraw,
    /// Geometry must be recomputed before the next draw.
    Remeasure,
}

impl Invalidation {
    /// The stronger of two invalidations.
    pub fn merge(self, other: Invalidation) -> Invalidation {
        self.max(other)
    }

    pub fn needs_measure(self) -> bool {
        self == Self::Remeasure
    }
}

/// Underline configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderlineConfig {
    /// Draw underlines.
    pub enabled: bool,
    /// Stroke color.
    pub color: Color,
    /// Stroke width in px.
    pub width: u32,
    /// Stroke pattern.
    pub style: UnderlineStyle,
    /// Vertical offset below the text.
    pub spacing: i32,
}

impl Default for UnderlineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::DEFAULT_TEXT,
            width: 1,
            style: UnderlineStyle::Solid,
            spacing: DEFAULT_HORIZONTAL_SPACING,
        }
    }
}

/// Complete style state for one annotated text surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubyStyle {
    base_font_size: f32,
    annotation_font_size: f32,
    annotation_ratio: f32,
    /// Set when the annotation size was chosen explicitly instead of derived
    /// from the ratio.
    annotation_size_pinned: bool,
    base_color: Color,
    annotation_color: Color,
    horizontal_spacing: i32,
    vertical_spacing: i32,
    pair_spacing: i32,
    indent_count: usize,
    underline: UnderlineConfig,
    draw_mode: DrawMode,
}

impl Default for RubyStyle {
    fn default() -> Self {
        Self {
            base_font_size: DEFAULT_BASE_FONT_SIZE,
            annotation_font_size: DEFAULT_BASE_FONT_SIZE * DEFAULT_ANNOTATION_RATIO,
            annotation_ratio: DEFAULT_ANNOTATION_RATIO,
            annotation_size_pinned: false,
            base_color: Color::DEFAULT_TEXT,
            annotation_color: Color::DEFAULT_TEXT,
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_HORIZONTAL_SPACING * 2,
            pair_spacing: DEFAULT_HORIZONTAL_SPACING / 2,
            indent_count: 0,
            underline: UnderlineConfig::default(),
            draw_mode: DrawMode::BaseOnly,
        }
    }
}

fn valid_size(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl RubyStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repair values that setters would have rejected, e.g. after loading a
    /// style from configuration. Invalid fields fall back to defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !valid_size(self.base_font_size) {
            log::warn!("invalid base font size {}; using default", self.base_font_size);
            self.base_font_size = defaults.base_font_size;
        }
        if !valid_size(self.annotation_ratio) {
            log::warn!("invalid annotation ratio {}; using default", self.annotation_ratio);
            self.annotation_ratio = defaults.annotation_ratio;
        }
        if !self.annotation_size_pinned || !valid_size(self.annotation_font_size) {
            self.annotation_font_size = self.base_font_size * self.annotation_ratio;
            self.annotation_size_pinned = false;
        }
        for (name, value, fallback) in [
            (
                "horizontal spacing",
                &mut self.horizontal_spacing,
                defaults.horizontal_spacing,
            ),
            (
                "vertical spacing",
                &mut self.vertical_spacing,
                defaults.vertical_spacing,
            ),
            ("pair spacing", &mut self.pair_spacing, defaults.pair_spacing),
            (
                "underline spacing",
                &mut self.underline.spacing,
                defaults.underline.spacing,
            ),
        ] {
            if *value < 0 {
                log::warn!("negative {} {}; using default", name, value);
                *value = fallback;
            }
        }
        if self.underline.width == 0 {
            self.underline.width = defaults.underline.width;
        }
        self
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) -> Invalidation {
        if self.draw_mode == mode {
            return Invalidation::None;
        }
        self.draw_mode = mode;
        Invalidation::Remeasure
    }

    pub fn base_font_size(&self) -> f32 {
        self.base_font_size
    }

    /// Set the base size. Unless the annotation size is pinned it follows
    /// at the configured ratio.
    pub fn set_base_font_size(&mut self, size: f32) -> Invalidation {
        if !valid_size(size) || self.base_font_size == size {
            return Invalidation::None;
        }
        self.base_font_size = size;
        if !self.annotation_size_pinned {
            self.annotation_font_size = size * self.annotation_ratio;
        }
        Invalidation::Remeasure
    }

    pub fn annotation_font_size(&self) -> f32 {
        self.annotation_font_size
    }

    /// Set the annotation size explicitly, pinning it against later base
    /// size changes until the ratio is set again.
    pub fn set_annotation_font_size(&mut self, size: f32) -> Invalidation {
        if !valid_size(size) || self.annotation_font_size == size {
            return Invalidation::None;
        }
        self.annotation_font_size = size;
        self.annotation_size_pinned = true;
        Invalidation::Remeasure
    }

    pub fn annotation_ratio(&self) -> f32 {
        self.annotation_ratio
    }

    pub fn is_annotation_size_pinned(&self) -> bool {
        self.annotation_size_pinned
    }

    /// Set the annotation/base ratio and re-derive the annotation size.
    pub fn set_annotation_ratio(&mut self, ratio: f32) -> Invalidation {
        if !valid_size(ratio) || self.annotation_ratio == ratio {
            return Invalidation::None;
        }
        self.annotation_ratio = ratio;
        self.annotation_size_pinned = false;
        let derived = self.base_font_size * ratio;
        if derived == self.annotation_font_size {
            return Invalidation::None;
        }
        self.annotation_font_size = derived;
        Invalidation::Remeasure
    }

    pub fn base_color(&self) -> Color {
        self.base_color
    }

    /// Default base color. Colors are baked into the document, so a change
    /// requires a rebuild.
    pub fn set_base_color(&mut self, color: Color) -> Invalidation {
        if self.base_color == color {
            return Invalidation::None;
        }
        self.base_color = color;
        Invalidation::Remeasure
    }

    pub fn annotation_color(&self) -> Color {
        self.annotation_color
    }

    pub fn set_annotation_color(&mut self, color: Color) -> Invalidation {
        if self.annotation_color == color {
            return Invalidation::None;
        }
        self.annotation_color = color;
        Invalidation::Remeasure
    }

    pub fn horizontal_spacing(&self) -> i32 {
        self.horizontal_spacing
    }

    /// Gap between tokens on a line. Also resets the annotation/base gap to
    /// half of it.
    pub fn set_horizontal_spacing(&mut self, spacing: i32) -> Invalidation {
        if spacing < 0 || self.horizontal_spacing == spacing {
            return Invalidation::None;
        }
        self.horizontal_spacing = spacing;
        self.pair_spacing = spacing / 2;
        Invalidation::Remeasure
    }

    pub fn vertical_spacing(&self) -> i32 {
        self.vertical_spacing
    }

    pub fn set_vertical_spacing(&mut self, spacing: i32) -> Invalidation {
        if spacing < 0 || self.vertical_spacing == spacing {
            return Invalidation::None;
        }
        self.vertical_spacing = spacing;
        Invalidation::Remeasure
    }

    /// Gap between the annotation box and the base box of a pair.
    pub fn pair_spacing(&self) -> i32 {
        self.pair_spacing
    }

    pub fn set_pair_spacing(&mut self, spacing: i32) -> Invalidation {
        if spacing < 0 || self.pair_spacing == spacing {
            return Invalidation::None;
        }
        self.pair_spacing = spacing;
        Invalidation::Remeasure
    }

    pub fn indent_count(&self) -> usize {
        self.indent_count
    }

    pub fn set_indent_count(&mut self, count: usize) -> Invalidation {
        if self.indent_count == count {
            return Invalidation::None;
        }
        self.indent_count = count;
        Invalidation::Remeasure
    }

    pub fn underline(&self) -> &UnderlineConfig {
        &self.underline
    }

    /// Toggling underlines changes paragraph-mode height.
    pub fn set_underline(&mut self, enabled: bool) -> Invalidation {
        if self.underline.enabled == enabled {
            return Invalidation::None;
        }
        self.underline.enabled = enabled;
        Invalidation::Remeasure
    }

    pub fn set_underline_color(&mut self, color: Color) -> Invalidation {
        if self.underline.color == color {
            return Invalidation::None;
        }
        self.underline.color = color;
        Invalidation::Redraw
    }

    pub fn set_underline_width(&mut self, width: u32) -> Invalidation {
        if width == 0 || self.underline.width == width {
            return Invalidation::None;
        }
        self.underline.width = width;
        Invalidation::Redraw
    }

    pub fn set_underline_style(&mut self, style: UnderlineStyle) -> Invalidation {
        if self.underline.style == style {
            return Invalidation::None;
        }
        self.underline.style = style;
        Invalidation::Redraw
    }

    /// Vertical offset of the underline below the text.
    pub fn set_underline_spacing(&mut self, spacing: i32) -> Invalidation {
        if spacing < 0 || self.underline.spacing == spacing {
            return Invalidation::None;
        }
        self.underline.spacing = spacing;
        Invalidation::Remeasure
    }

    /// Font size used by a paragraph draw mode.
    pub fn paragraph_font_size(&self) -> f32 {
        match self.draw_mode {
            DrawMode::AnnotationOnly => self.annotation_font_size,
            _ => self.base_font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let style = RubyStyle::default();
        assert_eq!(style.base_font_size(), 14.0);
        assert_eq!(style.annotation_font_size(), 7.0);
        assert_eq!(style.horizontal_spacing(), 5);
        assert_eq!(style.vertical_spacing(), 10);
        assert_eq!(style.pair_spacing(), 2);
        assert_eq!(style.underline().spacing, 5);
        assert_eq!(style.draw_mode(), DrawMode::BaseOnly);
    }

    #[test]
    fn invalid_and_unchanged_values_are_noops() {
        let mut style = RubyStyle::default();
        assert_eq!(style.set_base_font_size(0.0), Invalidation::None);
        assert_eq!(style.set_base_font_size(-3.0), Invalidation::None);
        assert_eq!(style.set_base_font_size(f32::NAN), Invalidation::None);
        assert_eq!(style.set_base_font_size(14.0), Invalidation::None);
        assert_eq!(style.set_vertical_spacing(-1), Invalidation::None);
        assert_eq!(style.set_underline_width(0), Invalidation::None);
        assert_eq!(style, RubyStyle::default());
    }

    #[test]
    fn base_size_rescales_annotation_until_pinned() {
        let mut style = RubyStyle::default();
        assert_eq!(style.set_base_font_size(20.0), Invalidation::Remeasure);
        assert_eq!(style.annotation_font_size(), 10.0);

        style.set_annotation_font_size(12.0);
        assert!(style.is_annotation_size_pinned());
        style.set_base_font_size(30.0);
        assert_eq!(style.annotation_font_size(), 12.0);

        style.set_annotation_ratio(0.25);
        assert!(!style.is_annotation_size_pinned());
        assert_eq!(style.annotation_font_size(), 7.5);
        style.set_base_font_size(40.0);
        assert_eq!(style.annotation_font_size(), 10.0);
    }

    #[test]
    fn underline_paint_changes_only_redraw() {
        let mut style = RubyStyle::default();
        assert_eq!(style.set_underline_color(Color::RED), Invalidation::Redraw);
        assert_eq!(style.set_underline_width(3), Invalidation::Redraw);
        assert_eq!(
            style.set_underline_style(UnderlineStyle::Dashed),
            Invalidation::Redraw
        );
        assert_eq!(style.set_underline(true), Invalidation::Remeasure);
        assert_eq!(style.set_underline_spacing(8), Invalidation::Remeasure);
    }

    #[test]
    fn horizontal_spacing_resets_pair_spacing() {
        let mut style = RubyStyle::default();
        style.set_pair_spacing(9);
        style.set_horizontal_spacing(11);
        assert_eq!(style.pair_spacing(), 5);
    }

    #[test]
    fn invalidation_merge_keeps_strongest() {
        assert_eq!(
            Invalidation::Redraw.merge(Invalidation::Remeasure),
            Invalidation::Remeasure
        );
        assert_eq!(Invalidation::None.merge(Invalidation::Redraw), Invalidation::Redraw);
    }

    #[test]
    fn sanitized_repairs_invalid_configuration() {
        let raw = r#"{"base_font_size": -1.0, "horizontal_spacing": -4, "underline": {"width": 0}}"#;
        let style: RubyStyle = serde_json::from_str(raw).unwrap();
        let style = style.sanitized();
        assert_eq!(style.base_font_size(), DEFAULT_BASE_FONT_SIZE);
        assert_eq!(style.horizontal_spacing(), DEFAULT_HORIZONTAL_SPACING);
        assert_eq!(style.underline().width, 1);
        assert_eq!(style.annotation_font_size(), 7.0);
    }

    #[test]
    fn partial_configuration_keeps_defaults() {
        let style: RubyStyle =
            serde_json::from_str(r#"{"draw_mode": "annotation_and_base", "indent_count": 2}"#)
                .unwrap();
        assert_eq!(style.draw_mode(), DrawMode::AnnotationAndBase);
        assert_eq!(style.indent_count(), 2);
        assert_eq!(style.vertical_spacing(), 10);
    }
}
