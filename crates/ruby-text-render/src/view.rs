//! Stateful host facade: data + style + cached measurement.

use std::sync::Arc;

use ruby_text::{
    Color, Document, DocumentBuilder, DrawMode, Invalidation, RubyStyle, Script, Token,
    UnderlineStyle, INDENT_PLACEHOLDER,
};
use serde::{Deserialize, Serialize};

use crate::metrics::TextMeasurer;
use crate::paragraph::{GreedyParagraphLayouter, ParagraphLayout, ParagraphLayouter, ParagraphRequest};
use crate::render_ir::{DrawCommand, RubyLayout};
use crate::renderer::{
    execute_commands, paragraph_commands, ruby_commands, AnnotationEcho, DrawSurface,
    RenderOptions,
};
use crate::ruby_layout::{RubyLayoutEngine, RubyLayoutParams, SizeConstraint};

/// Padding around the content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    pub const fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }
}

/// Outer size reported by [`RubyTextView::measure`], padding included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MeasuredSize {
    pub width: i32,
    pub height: i32,
}

/// Geometry produced by the last measure pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MeasuredContent {
    /// Nothing to draw in the current mode.
    #[default]
    Empty,
    Ruby(RubyLayout),
    Paragraph {
        layout: ParagraphLayout,
        /// Width of one indentation placeholder at the paragraph size.
        indent_width: i32,
    },
}

/// Annotated text surface.
///
/// Setters return `&mut Self` for chaining and only invalidate cached
/// geometry when they change something. [`draw`](Self::draw) re-measures with
/// the last constraints when the cache is stale.
pub struct RubyTextView {
    engine: RubyLayoutEngine,
    paragraph: Arc<dyn ParagraphLayouter>,
    data: Vec<Token>,
    style: RubyStyle,
    document: Document,
    padding: Insets,
    debug_boxes: bool,
    annotation_echo: AnnotationEcho,
    content: MeasuredContent,
    measured: MeasuredSize,
    constraints: Option<(SizeConstraint, SizeConstraint)>,
    needs_measure: bool,
    needs_redraw: bool,
}

impl core::fmt::Debug for RubyTextView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RubyTextView")
            .field("tokens", &self.data.len())
            .field("style", &self.style)
            .field("padding", &self.padding)
            .field("measured", &self.measured)
            .field("needs_measure", &self.needs_measure)
            .field("needs_redraw", &self.needs_redraw)
            .finish_non_exhaustive()
    }
}

impl RubyTextView {
    /// View measuring with `measurer` and wrapping paragraphs with
    /// [`GreedyParagraphLayouter`].
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        let paragraph = Arc::new(GreedyParagraphLayouter::new(Arc::clone(&measurer)));
        Self {
            engine: RubyLayoutEngine::new(measurer),
            paragraph,
            data: Vec::new(),
            style: RubyStyle::default(),
            document: Document::empty(),
            padding: Insets::default(),
            debug_boxes: false,
            annotation_echo: AnnotationEcho::default(),
            content: MeasuredContent::Empty,
            measured: MeasuredSize::default(),
            constraints: None,
            needs_measure: true,
            needs_redraw: true,
        }
    }

    /// Replace the paragraph layout service.
    pub fn with_paragraph_layouter(mut self, layouter: Arc<dyn ParagraphLayouter>) -> Self {
        self.paragraph = layouter;
        self.needs_measure = true;
        self
    }

    // Data

    /// Replace the tokens and rebuild the document.
    pub fn set_data(&mut self, tokens: Vec<Token>) -> &mut Self {
        self.data = tokens;
        self.rebuild();
        self
    }

    /// Pair base characters with space-separated annotation pieces.
    /// `None` on either side clears the data.
    pub fn set_data_text(&mut self, base: Option<&str>, annotation: Option<&str>) -> &mut Self {
        let tokens = match (base, annotation) {
            (Some(base), Some(annotation)) => ruby_text::pair_text(base, annotation),
            _ => Vec::new(),
        };
        self.set_data(tokens)
    }

    pub fn data(&self) -> &[Token] {
        &self.data
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn base_text(&self) -> &str {
        self.document.base_text()
    }

    pub fn annotation_text(&self) -> &str {
        self.document.annotation_text()
    }

    // Style

    pub fn style(&self) -> &RubyStyle {
        &self.style
    }

    /// Replace the whole style. The style is sanitized first.
    pub fn configure(&mut self, style: RubyStyle) -> &mut Self {
        let style = style.sanitized();
        if style == self.style {
            return self;
        }
        let mut paint_only = self.style;
        paint_only.set_underline_color(style.underline().color);
        paint_only.set_underline_width(style.underline().width);
        paint_only.set_underline_style(style.underline().style);
        let rebuild = style.base_color() != self.style.base_color()
            || style.annotation_color() != self.style.annotation_color()
            || style.indent_count() != self.style.indent_count();

        self.style = style;
        if rebuild {
            self.rebuild();
        } else if paint_only == style {
            self.invalidate(Invalidation::Redraw);
        } else {
            self.invalidate(Invalidation::Remeasure);
        }
        self
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) -> &mut Self {
        let change = self.style.set_draw_mode(mode);
        self.invalidate(change)
    }

    pub fn set_base_font_size(&mut self, size: f32) -> &mut Self {
        let change = self.style.set_base_font_size(size);
        self.invalidate(change)
    }

    pub fn set_annotation_font_size(&mut self, size: f32) -> &mut Self {
        let change = self.style.set_annotation_font_size(size);
        self.invalidate(change)
    }

    pub fn set_annotation_ratio(&mut self, ratio: f32) -> &mut Self {
        let change = self.style.set_annotation_ratio(ratio);
        self.invalidate(change)
    }

    pub fn set_horizontal_spacing(&mut self, spacing: i32) -> &mut Self {
        let change = self.style.set_horizontal_spacing(spacing);
        self.invalidate(change)
    }

    pub fn set_vertical_spacing(&mut self, spacing: i32) -> &mut Self {
        let change = self.style.set_vertical_spacing(spacing);
        self.invalidate(change)
    }

    pub fn set_pair_spacing(&mut self, spacing: i32) -> &mut Self {
        let change = self.style.set_pair_spacing(spacing);
        self.invalidate(change)
    }

    pub fn set_indent_count(&mut self, count: usize) -> &mut Self {
        if self.style.set_indent_count(count) != Invalidation::None {
            self.rebuild();
        }
        self
    }

    pub fn set_underline(&mut self, enabled: bool) -> &mut Self {
        let change = self.style.set_underline(enabled);
        self.invalidate(change)
    }

    pub fn set_underline_color(&mut self, color: Color) -> &mut Self {
        let change = self.style.set_underline_color(color);
        self.invalidate(change)
    }

    pub fn set_underline_width(&mut self, width: u32) -> &mut Self {
        let change = self.style.set_underline_width(width);
        self.invalidate(change)
    }

    pub fn set_underline_style(&mut self, style: UnderlineStyle) -> &mut Self {
        let change = self.style.set_underline_style(style);
        self.invalidate(change)
    }

    pub fn set_underline_spacing(&mut self, spacing: i32) -> &mut Self {
        let change = self.style.set_underline_spacing(spacing);
        self.invalidate(change)
    }

    // Colors

    /// Default base color for tokens without an override.
    pub fn set_text_color(&mut self, color: Color) -> &mut Self {
        if self.style.set_base_color(color) != Invalidation::None {
            self.rebuild();
        }
        self
    }

    /// Default annotation color for tokens without an override.
    pub fn set_annotation_color(&mut self, color: Color) -> &mut Self {
        if self.style.set_annotation_color(color) != Invalidation::None {
            self.rebuild();
        }
        self
    }

    /// Override the base color of the token at `index`. [`Color::UNSET`]
    /// clears the override. Out-of-range indices are ignored.
    pub fn set_text_color_at(&mut self, index: usize, color: Color) -> &mut Self {
        let color = color.as_override();
        match self.data.get_mut(index) {
            Some(token) if token.base_color != color => {
                token.base_color = color;
                self.rebuild();
            }
            _ => {}
        }
        self
    }

    /// Override the annotation color of the token at `index`.
    pub fn set_annotation_color_at(&mut self, index: usize, color: Color) -> &mut Self {
        let color = color.as_override();
        match self.data.get_mut(index) {
            Some(token) if token.annotation_color != color => {
                token.annotation_color = color;
                self.rebuild();
            }
            _ => {}
        }
        self
    }

    /// Clear every base override and set the default base color.
    pub fn set_all_text_color(&mut self, color: Color) -> &mut Self {
        for token in &mut self.data {
            token.base_color = None;
        }
        self.style.set_base_color(color);
        self.rebuild();
        self
    }

    /// Clear every annotation override and set the default annotation color.
    pub fn set_all_annotation_color(&mut self, color: Color) -> &mut Self {
        for token in &mut self.data {
            token.annotation_color = None;
        }
        self.style.set_annotation_color(color);
        self.rebuild();
        self
    }

    // Host surface

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn set_padding(&mut self, padding: Insets) -> &mut Self {
        if self.padding != padding {
            self.padding = padding;
            self.invalidate(Invalidation::Remeasure);
        }
        self
    }

    /// Outline every laid-out box when drawing.
    pub fn set_debug_boxes(&mut self, enabled: bool) -> &mut Self {
        if self.debug_boxes != enabled {
            self.debug_boxes = enabled;
            self.invalidate(Invalidation::Redraw);
        }
        self
    }

    pub fn set_annotation_echo(&mut self, policy: AnnotationEcho) -> &mut Self {
        if self.annotation_echo != policy {
            self.annotation_echo = policy;
            self.invalidate(Invalidation::Redraw);
        }
        self
    }

    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    // Measure / draw

    /// Measure under the host's constraints. The returned size includes
    /// padding.
    pub fn measure(&mut self, width: SizeConstraint, height: SizeConstraint) -> MeasuredSize {
        self.constraints = Some((width, height));
        let content_width = width.shrink(self.padding.horizontal());
        let content_height = height.shrink(self.padding.vertical());
        let (content, size) = self.measure_content(content_width, content_height);
        self.content = content;
        self.measured = MeasuredSize {
            width: size.width.saturating_add(self.padding.horizontal()),
            height: size.height.saturating_add(self.padding.vertical()),
        };
        self.needs_measure = false;
        self.needs_redraw = true;
        log::debug!(
            "measured {:?} as {}x{}",
            self.style.draw_mode(),
            self.measured.width,
            self.measured.height
        );
        self.measured
    }

    /// Size from the last measure pass.
    pub fn measured_size(&self) -> MeasuredSize {
        self.measured
    }

    /// Geometry from the last measure pass.
    pub fn content(&self) -> &MeasuredContent {
        &self.content
    }

    /// Draw commands for the current state, in surface coordinates.
    pub fn draw_commands(&mut self) -> Vec<DrawCommand> {
        self.ensure_measured();
        let options = RenderOptions {
            offset_x: self.padding.left,
            offset_y: self.padding.top,
            annotation_echo: self.annotation_echo,
            debug_boxes: self.debug_boxes,
        };
        match &self.content {
            MeasuredContent::Empty => Vec::new(),
            MeasuredContent::Ruby(layout) => ruby_commands(layout, &self.style, &options),
            MeasuredContent::Paragraph {
                layout,
                indent_width,
            } => paragraph_commands(layout, &self.style, *indent_width, &options),
        }
    }

    /// Draw onto `surface`.
    pub fn draw<S>(&mut self, surface: &mut S) -> Result<(), S::Error>
    where
        S: DrawSurface + ?Sized,
    {
        let commands = self.draw_commands();
        execute_commands(surface, &commands)?;
        self.needs_redraw = false;
        Ok(())
    }

    fn ensure_measured(&mut self) {
        if self.needs_measure {
            let (width, height) = self
                .constraints
                .unwrap_or((SizeConstraint::Unbounded, SizeConstraint::Unbounded));
            self.measure(width, height);
        }
    }

    fn measure_content(
        &self,
        width: SizeConstraint,
        height: SizeConstraint,
    ) -> (MeasuredContent, MeasuredSize) {
        let script = match self.style.draw_mode() {
            DrawMode::AnnotationAndBase => {
                if self.document.is_empty() {
                    return empty_content(width, height);
                }
                let params = RubyLayoutParams::from_style(&self.style, width, height);
                let layout = self.engine.layout(&self.document, &params);
                let size = MeasuredSize {
                    width: layout.measured_width,
                    height: layout.measured_height,
                };
                return (MeasuredContent::Ruby(layout), size);
            }
            DrawMode::BaseOnly => Script::Base,
            DrawMode::AnnotationOnly => Script::Annotation,
        };

        let markup = self.document.markup(script);
        if markup.is_empty() {
            return empty_content(width, height);
        }
        let font_size = self.style.paragraph_font_size();
        let default_color = match script {
            Script::Base => self.style.base_color(),
            Script::Annotation => self.style.annotation_color(),
        };
        let request = ParagraphRequest {
            width: width.available(),
            font_size,
            line_spacing: self.style.vertical_spacing(),
            default_color,
        };
        let layout = self.paragraph.layout_paragraph(markup, &request);
        let measured_width = width
            .exact()
            .unwrap_or_else(|| request.width.min(layout.desired_width));
        let mut measured_height = height.exact().unwrap_or(layout.height);
        if self.style.underline().enabled {
            measured_height += self.style.underline().spacing;
        }
        let indent_width = self.engine.text_width(INDENT_PLACEHOLDER, font_size);
        (
            MeasuredContent::Paragraph {
                layout,
                indent_width,
            },
            MeasuredSize {
                width: measured_width,
                height: measured_height,
            },
        )
    }

    fn rebuild(&mut self) {
        self.document = DocumentBuilder::new()
            .indent_count(self.style.indent_count())
            .base_color(self.style.base_color())
            .annotation_color(self.style.annotation_color())
            .build(&self.data);
        self.invalidate(Invalidation::Remeasure);
    }

    fn invalidate(&mut self, change: Invalidation) -> &mut Self {
        match change {
            Invalidation::None => {}
            Invalidation::Redraw => self.needs_redraw = true,
            Invalidation::Remeasure => {
                self.needs_measure = true;
                self.needs_redraw = true;
            }
        }
        self
    }
}

fn empty_content(width: SizeConstraint, height: SizeConstraint) -> (MeasuredContent, MeasuredSize) {
    (
        MeasuredContent::Empty,
        MeasuredSize {
            width: width.exact().unwrap_or(0),
            height: height.exact().unwrap_or(0),
        },
    )
}
