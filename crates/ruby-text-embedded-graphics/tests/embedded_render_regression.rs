use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::{Rgb888, RgbColor},
    Pixel,
};
use ruby_text::{Color, DrawMode, UnderlineStyle};
use ruby_text_embedded_graphics::{EgRenderConfig, EgRenderer, EgTextMeasurer};
use ruby_text_render::{DrawCommand, LineCommand, RubyTextView, SizeConstraint};

const DISPLAY_WIDTH: u32 = 320;
const DISPLAY_HEIGHT: u32 = 240;

const STORY_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。";
const STORY_ANNOTATION: &str =
    "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。";

struct PixelCaptureDisplay {
    size: Size,
    pixels: Vec<Rgb888>,
    out_of_bounds: usize,
    clears: usize,
}

impl PixelCaptureDisplay {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::WHITE; (width * height) as usize],
            out_of_bounds: 0,
            clears: 0,
        }
    }

    fn count(&self, color: Rgb888) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    fn inked(&self) -> usize {
        self.pixels.iter().filter(|p| **p != Rgb888::WHITE).count()
    }

    fn lowest_inked_row(&self) -> Option<u32> {
        let width = self.size.width as usize;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != Rgb888::WHITE)
            .map(|(i, _)| (i / width) as u32)
            .max()
    }
}

impl OriginDimensions for PixelCaptureDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for PixelCaptureDisplay {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
                self.out_of_bounds += 1;
                continue;
            }
            self.pixels[(point.y * w + point.x) as usize] = color;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clears += 1;
        for pixel in &mut self.pixels {
            *pixel = color;
        }
        Ok(())
    }
}

fn story_view() -> RubyTextView {
    let mut view = RubyTextView::new(EgTextMeasurer::shared());
    view.set_data_text(Some(STORY_BASE), Some(STORY_ANNOTATION))
        .set_indent_count(2);
    view
}

fn underline(style: UnderlineStyle) -> DrawCommand {
    DrawCommand::Line(LineCommand {
        x1: 0,
        y1: 5,
        x2: 40,
        y2: 5,
        color: Color::BLACK,
        width: 1,
        style,
    })
}

#[test]
fn every_draw_mode_inks_pixels_inside_the_measured_box() {
    let renderer = EgRenderer::default();
    let mut view = story_view();
    for mode in [
        DrawMode::BaseOnly,
        DrawMode::AnnotationAndBase,
        DrawMode::AnnotationOnly,
    ] {
        view.set_draw_mode(mode);
        let size = view.measure(
            SizeConstraint::AtMost(DISPLAY_WIDTH as i32),
            SizeConstraint::Unbounded,
        );
        assert!(size.width <= DISPLAY_WIDTH as i32, "{:?}", mode);
        let mut display = PixelCaptureDisplay::new(DISPLAY_WIDTH, size.height.max(1) as u32 + 8);
        renderer.render_view(&mut view, &mut display).unwrap();
        assert!(display.inked() > 0, "{:?} drew nothing", mode);
        assert_eq!(display.out_of_bounds, 0, "{:?} drew off-screen", mode);
        let lowest = display.lowest_inked_row().unwrap_or(0);
        assert!(
            lowest <= size.height as u32,
            "{:?} inked row {} below measured height {}",
            mode,
            lowest,
            size.height
        );
    }
}

#[test]
fn ruby_mode_is_taller_than_base_only() {
    let mut view = story_view();
    view.set_draw_mode(DrawMode::BaseOnly);
    let base = view.measure(
        SizeConstraint::AtMost(DISPLAY_WIDTH as i32),
        SizeConstraint::Unbounded,
    );
    view.set_draw_mode(DrawMode::AnnotationAndBase);
    let ruby = view.measure(
        SizeConstraint::AtMost(DISPLAY_WIDTH as i32),
        SizeConstraint::Unbounded,
    );
    assert!(ruby.height > base.height);
}

#[test]
fn text_colors_reach_the_target() {
    let mut view = story_view();
    view.set_draw_mode(DrawMode::AnnotationAndBase)
        .set_text_color(Color::RED)
        .set_annotation_color(Color::rgb(0, 0, 255));
    let mut display = PixelCaptureDisplay::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
    EgRenderer::default()
        .render_view(&mut view, &mut display)
        .unwrap();
    assert!(display.count(Rgb888::RED) > 0);
    assert!(display.count(Rgb888::BLUE) > 0);
}

#[test]
fn dashed_underline_inks_fewer_pixels_than_solid() {
    let renderer = EgRenderer::default();
    let mut solid = PixelCaptureDisplay::new(64, 16);
    renderer
        .render_commands(&[underline(UnderlineStyle::Solid)], &mut solid)
        .unwrap();
    let mut dashed = PixelCaptureDisplay::new(64, 16);
    renderer
        .render_commands(&[underline(UnderlineStyle::Dashed)], &mut dashed)
        .unwrap();
    assert_eq!(solid.count(Rgb888::BLACK), 41);
    assert_eq!(dashed.count(Rgb888::BLACK), 21);
}

#[test]
fn clear_first_can_be_disabled() {
    let keep = EgRenderer::new(EgRenderConfig {
        clear_first: false,
        ..EgRenderConfig::default()
    });
    let mut display = PixelCaptureDisplay::new(64, 16);
    keep.render_commands(&[underline(UnderlineStyle::Solid)], &mut display)
        .unwrap();
    keep.render_commands(&[], &mut display).unwrap();
    assert_eq!(display.clears, 0);
    assert_eq!(display.count(Rgb888::BLACK), 41);

    EgRenderer::default()
        .render_commands(&[], &mut display)
        .unwrap();
    assert_eq!(display.clears, 1);
    assert_eq!(display.inked(), 0);
}
