//! embedded-graphics backend for `ruby-text-render`.
//!
//! Text is drawn with the ISO 8859-1 mono fonts. Pinyin tone marks outside
//! that range are folded to their base vowel and wide (CJK) glyphs are drawn
//! as double-width outline cells, so geometry stays faithful even without a
//! CJK font.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use std::sync::Arc;

use embedded_graphics::{
    mono_font::{
        iso_8859_1::{
            FONT_10X20, FONT_5X8, FONT_6X10, FONT_6X13, FONT_7X14, FONT_9X15, FONT_9X18,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use ruby_text::{Color, UnderlineStyle};
use ruby_text_render::{
    execute_commands, is_wide_char, DrawCommand, DrawSurface, LineMetrics, Rect, RubyTextView,
    TextMeasurer,
};

/// Mono font used for a requested pixel size.
pub fn font_for_size(font_size: f32) -> &'static MonoFont<'static> {
    if font_size <= 8.0 {
        &FONT_5X8
    } else if font_size <= 10.0 {
        &FONT_6X10
    } else if font_size <= 13.0 {
        &FONT_6X13
    } else if font_size <= 14.0 {
        &FONT_7X14
    } else if font_size <= 15.0 {
        &FONT_9X15
    } else if font_size <= 18.0 {
        &FONT_9X18
    } else {
        &FONT_10X20
    }
}

/// Horizontal advance of one narrow cell.
fn cell_advance(font: &MonoFont<'_>) -> i32 {
    (font.character_size.width + font.character_spacing) as i32
}

/// Map pinyin tone-marked vowels outside Latin-1 to their base letter.
pub fn fold_tone_mark(ch: char) -> char {
    match ch {
        'ā' | 'ǎ' => 'a',
        'Ā' | 'Ǎ' => 'A',
        'ē' | 'ě' => 'e',
        'Ē' | 'Ě' => 'E',
        'ī' | 'ǐ' => 'i',
        'Ī' | 'Ǐ' => 'I',
        'ō' | 'ǒ' => 'o',
        'Ō' | 'Ǒ' => 'O',
        'ū' | 'ǔ' => 'u',
        'Ū' | 'Ǔ' => 'U',
        'ǖ' | 'ǘ' | 'ǚ' | 'ǜ' => 'ü',
        'Ǖ' | 'Ǘ' | 'Ǚ' | 'Ǜ' => 'Ü',
        'ń' | 'ň' | 'ǹ' => 'n',
        'ḿ' => 'm',
        other => other,
    }
}

/// `TextMeasurer` matching what [`EgSurface`] draws.
#[derive(Clone, Copy, Debug, Default)]
pub struct EgTextMeasurer;

impl EgTextMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Shared trait object for view and engine wiring.
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl TextMeasurer for EgTextMeasurer {
    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let advance = cell_advance(font_for_size(font_size));
        let cells: i32 = text
            .chars()
            .map(|ch| match ch {
                '\n' => 0,
                c if is_wide_char(c) => 2,
                _ => 1,
            })
            .sum();
        (cells * advance) as f32
    }

    fn text_height(&self, text: &str, font_size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        font_for_size(font_size).character_size.height as f32
    }

    fn line_metrics(&self, font_size: f32) -> LineMetrics {
        let font = font_for_size(font_size);
        let ascent = font.baseline as f32 + 1.0;
        LineMetrics {
            ascent,
            descent: (font.character_size.height as f32 - ascent).max(0.0),
        }
    }
}

fn to_rgb(color: Color) -> Rgb888 {
    Rgb888::new(color.red(), color.green(), color.blue())
}

/// [`DrawSurface`] over an RGB embedded-graphics target.
pub struct EgSurface<'a, D> {
    display: &'a mut D,
}

impl<'a, D> EgSurface<'a, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    pub fn new(display: &'a mut D) -> Self {
        Self { display }
    }

    fn draw_segment(
        &mut self,
        segment: &str,
        x: i32,
        baseline_y: i32,
        style: MonoTextStyle<'static, Rgb888>,
    ) -> Result<(), D::Error> {
        if segment.is_empty() {
            return Ok(());
        }
        Text::with_baseline(segment, Point::new(x, baseline_y), style, Baseline::Alphabetic)
            .draw(self.display)?;
        Ok(())
    }

    fn draw_dashed(
        &mut self,
        from: Point,
        to: Point,
        stroke: PrimitiveStyle<Rgb888>,
        dash: u32,
    ) -> Result<(), D::Error> {
        let dx = (to.x - from.x) as f32;
        let dy = (to.y - from.y) as f32;
        let length = (dx * dx + dy * dy).sqrt();
        if length <= 0.0 {
            return Ok(());
        }
        let dash = dash.max(1) as f32;
        let at = |t: f32| {
            Point::new(
                from.x + (dx * t / length).round() as i32,
                from.y + (dy * t / length).round() as i32,
            )
        };
        // Dash and gap are both `dash` pixels long; line endpoints are inclusive.
        let mut t = 0.0f32;
        while t <= length {
            let end = (t + dash - 1.0).min(length);
            Line::new(at(t), at(end))
                .into_styled(stroke)
                .draw(self.display)?;
            t += dash * 2.0;
        }
        Ok(())
    }
}

impl<D> DrawSurface for EgSurface<'_, D>
where
    D: DrawTarget<Color = Rgb888>,
{
    type Error = D::Error;

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        baseline_y: i32,
        color: Color,
        font_size: f32,
    ) -> Result<(), Self::Error> {
        let font = font_for_size(font_size);
        let style = MonoTextStyle::new(font, to_rgb(color));
        let advance = cell_advance(font);
        let mut segment = String::with_capacity(text.len());
        let mut segment_x = x;
        let mut cursor = x;

        for ch in text.chars() {
            if !is_wide_char(ch) {
                segment.push(fold_tone_mark(ch));
                cursor += advance;
                continue;
            }
            self.draw_segment(&segment, segment_x, baseline_y, style)?;
            segment.clear();
            if !ch.is_whitespace() {
                let cell = Rectangle::new(
                    Point::new(cursor + 1, baseline_y - font.baseline as i32),
                    Size::new((advance * 2 - 2).max(1) as u32, font.baseline.max(1)),
                );
                cell.into_styled(PrimitiveStyle::with_stroke(to_rgb(color), 1))
                    .draw(self.display)?;
            }
            cursor += advance * 2;
            segment_x = cursor;
        }
        self.draw_segment(&segment, segment_x, baseline_y, style)
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
        let stroke = PrimitiveStyle::with_stroke(to_rgb(color), width.max(1));
        let (from, to) = (Point::new(x1, y1), Point::new(x2, y2));
        match style {
            UnderlineStyle::Solid => {
                Line::new(from, to).into_styled(stroke).draw(self.display)?;
                Ok(())
            }
            UnderlineStyle::Dashed => self.draw_dashed(from, to, stroke, width),
        }
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<(), Self::Error> {
        if rect.width() <= 0 || rect.height() <= 0 {
            return Ok(());
        }
        Rectangle::new(
            Point::new(rect.left, rect.top),
            Size::new(rect.width() as u32, rect.height() as u32),
        )
        .into_styled(PrimitiveStyle::with_stroke(to_rgb(color), 1))
        .draw(self.display)
    }
}

/// Renderer options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EgRenderConfig {
    /// Clear the target to `background` before drawing.
    pub clear_first: bool,
    pub background: Color,
}

impl Default for EgRenderConfig {
    fn default() -> Self {
        Self {
            clear_first: true,
            background: Color::WHITE,
        }
    }
}

/// Draws views and command lists onto embedded-graphics targets.
#[derive(Clone, Copy, Debug, Default)]
pub struct EgRenderer {
    cfg: EgRenderConfig,
}

impl EgRenderer {
    pub fn new(cfg: EgRenderConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EgRenderConfig {
        &self.cfg
    }

    /// Draw a view, re-measuring it first if needed.
    pub fn render_view<D>(&self, view: &mut RubyTextView, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.clear(display)?;
        let mut surface = EgSurface::new(display);
        view.draw(&mut surface)
    }

    /// Replay precomputed commands.
    pub fn render_commands<D>(
        &self,
        commands: &[DrawCommand],
        display: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.clear(display)?;
        log::debug!("replaying {} draw commands", commands.len());
        execute_commands(&mut EgSurface::new(display), commands)
    }

    fn clear<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if self.cfg.clear_first {
            display.clear(to_rgb(self.cfg.background))?;
        }
        Ok(())
    }
}
