//! Turns laid-out geometry into [`DrawCommand`]s and replays them.

use ruby_text::{Color, DrawMode, RubyStyle, Script, UnderlineStyle};
use serde::{Deserialize, Serialize};

use crate::paragraph::ParagraphLayout;
use crate::render_ir::{DrawCommand, LineCommand, Rect, RectCommand, RubyLayout, TextCommand};

/// Target that can execute draw commands.
pub trait DrawSurface {
    type Error;

    /// Draw `text` with its left edge at `x` and baseline at `baseline_y`.
    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        baseline_y: i32,
        color: Color,
        font_size: f32,
    ) -> Result<(), Self::Error>;

    #[allow(clippy::too_many_arguments)]
    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        width: u32,
        style: UnderlineStyle,
    ) -> Result<(), Self::Error>;

    /// Outline a rectangle. Default strokes its four edges with 1px lines.
    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<(), Self::Error> {
        let (l, t, r, b) = (rect.left, rect.top, rect.right, rect.bottom);
        self.draw_line(l, t, r, t, color, 1, UnderlineStyle::Solid)?;
        self.draw_line(r, t, r, b, color, 1, UnderlineStyle::Solid)?;
        self.draw_line(r, b, l, b, color, 1, UnderlineStyle::Solid)?;
        self.draw_line(l, b, l, t, color, 1, UnderlineStyle::Solid)
    }
}

/// What to do with an annotation identical to its base text (typically
/// punctuation carried through the annotation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationEcho {
    /// Draw the base text only.
    #[default]
    Suppress,
    /// Draw both.
    Draw,
}

/// Options that are not part of the text style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Added to every x coordinate (left padding).
    pub offset_x: i32,
    /// Added to every y coordinate (top padding).
    pub offset_y: i32,
    pub annotation_echo: AnnotationEcho,
    /// Outline every box in the base color.
    pub debug_boxes: bool,
}

/// Commands for a ruby layout.
pub fn ruby_commands(
    layout: &RubyLayout,
    style: &RubyStyle,
    options: &RenderOptions,
) -> Vec<DrawCommand> {
    let (dx, dy) = (options.offset_x, options.offset_y);
    let underline = style.underline();
    let mut out = Vec::with_capacity(layout.tokens.len() * 2);

    for placed in &layout.tokens {
        let token = &placed.token;
        let ann = placed.annotation_box.offset(dx, dy);
        let base = placed.base_box.offset(dx, dy);
        let combined = placed.combined_box.offset(dx, dy);

        let echo = token.annotation == token.base;
        if !echo || options.annotation_echo == AnnotationEcho::Draw {
            out.push(DrawCommand::Text(TextCommand {
                x: ann.left,
                baseline_y: ann.bottom,
                text: token.annotation.clone(),
                color: token.annotation_color,
                font_size: style.annotation_font_size(),
                script: Script::Annotation,
            }));
        }
        out.push(DrawCommand::Text(TextCommand {
            x: base.left,
            baseline_y: base.bottom,
            text: token.base.clone(),
            color: token.base_color,
            font_size: style.base_font_size(),
            script: Script::Base,
        }));

        if underline.enabled && !token.is_indent() {
            let y = combined.bottom.saturating_add(underline.spacing);
            out.push(DrawCommand::Line(LineCommand {
                x1: combined.left,
                y1: y,
                x2: combined.right.saturating_add(style.horizontal_spacing()),
                y2: y,
                color: underline.color,
                width: underline.width,
                style: underline.style,
            }));
        }

        if options.debug_boxes {
            for rect in [base, ann, combined] {
                out.push(DrawCommand::Rect(RectCommand {
                    rect,
                    color: style.base_color(),
                }));
            }
        }
    }
    out
}

/// Commands for a paragraph layout.
///
/// `indent_width` is the width of one indentation placeholder at the
/// paragraph font size; underlines start after leading placeholders.
pub fn paragraph_commands(
    layout: &ParagraphLayout,
    style: &RubyStyle,
    indent_width: i32,
    options: &RenderOptions,
) -> Vec<DrawCommand> {
    let (dx, dy) = (options.offset_x, options.offset_y);
    let underline = style.underline();
    let script = match style.draw_mode() {
        DrawMode::AnnotationOnly => Script::Annotation,
        _ => Script::Base,
    };
    let font_size = style.paragraph_font_size();
    let last = layout.lines.len().saturating_sub(1);
    let mut out = Vec::with_capacity(layout.lines.len() * 3);

    for (index, line) in layout.lines.iter().enumerate() {
        for run in &line.runs {
            out.push(DrawCommand::Text(TextCommand {
                x: dx + line.left + run.x,
                baseline_y: dy + line.baseline,
                text: run.text.clone(),
                color: run.color,
                font_size,
                script,
            }));
        }

        if underline.enabled {
            let bottom = if index == last {
                line.bottom
            } else {
                line.bottom - style.vertical_spacing()
            };
            let y = dy + bottom + underline.spacing;
            let x1 = dx + line.left + line.leading_indents() as i32 * indent_width;
            let x2 = dx + line.right;
            if x2 > x1 {
                out.push(DrawCommand::Line(LineCommand {
                    x1,
                    y1: y,
                    x2,
                    y2: y,
                    color: underline.color,
                    width: underline.width,
                    style: underline.style,
                }));
            }
        }

        if options.debug_boxes {
            out.push(DrawCommand::Rect(RectCommand {
                rect: Rect::new(line.left, line.top, line.right, line.bottom).offset(dx, dy),
                color: style.base_color(),
            }));
        }
    }
    out
}

/// Replay commands onto a surface, stopping at the first error.
pub fn execute_commands<S>(surface: &mut S, commands: &[DrawCommand]) -> Result<(), S::Error>
where
    S: DrawSurface + ?Sized,
{
    for cmd in commands {
        match cmd {
            DrawCommand::Text(text) => surface.draw_text(
                &text.text,
                text.x,
                text.baseline_y,
                text.color,
                text.font_size,
            )?,
            DrawCommand::Line(line) => surface.draw_line(
                line.x1, line.y1, line.x2, line.y2, line.color, line.width, line.style,
            )?,
            DrawCommand::Rect(rect) => surface.draw_rect(rect.rect, rect.color)?,
        }
    }
    Ok(())
}

/// Surface that records what it is asked to draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded text commands.
    pub fn texts(&self) -> impl Iterator<Item = &TextCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Recorded line commands.
    pub fn lines(&self) -> impl Iterator<Item = &LineCommand> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Line(line) => Some(line),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    type Error = core::convert::Infallible;

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        baseline_y: i32,
        color: Color,
        font_size: f32,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Text(TextCommand {
            x,
            baseline_y,
            text: text.to_string(),
            color,
            font_size,
            script: Script::Base,
        }));
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
        width: u32,
        style: UnderlineStyle,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Line(LineCommand {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
            style,
        }));
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<(), Self::Error> {
        self.commands
            .push(DrawCommand::Rect(RectCommand { rect, color }));
        Ok(())
    }
}
