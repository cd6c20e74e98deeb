use std::env;
use std::path::Path;
use std::process::ExitCode;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::Pixel;
use ruby_text::{DrawMode, RubyStyle, UnderlineStyle};
use ruby_text_embedded_graphics::{EgRenderer, EgTextMeasurer};
use ruby_text_render::{load_style_file, Insets, RubyTextView, SizeConstraint};

const DEFAULT_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。它长得可凶啦！\n头上长着长长的角，嘴里龇着尖尖的牙，发起怒来，就会张开血盆大口，哇哇大叫。";
const DEFAULT_ANNOTATION: &str = "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。 tā cháng dé kě xiōng lā ！ \n tóu shàng cháng zhuó cháng cháng de jiǎo ， zuǐ lǐ zī zhuó jiān jiān de yá ， fā qǐ nù lái ， jiù huì zhāng kāi xiě pén dà kǒu ， wā wā dà jiào 。";

#[derive(Clone, Debug)]
struct Args {
    base: String,
    annotation: String,
    out_dir: String,
    width: u32,
    padding: i32,
    config_path: Option<String>,
    indent: Option<usize>,
    underline: bool,
    dashed: bool,
    debug_boxes: bool,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cfg = parse_args(args)?;
    std::fs::create_dir_all(&cfg.out_dir).map_err(|e| e.to_string())?;

    let mut style = match &cfg.config_path {
        Some(path) => load_style_file(path).map_err(|e| e.to_string())?,
        None => RubyStyle::default(),
    };
    if let Some(indent) = cfg.indent {
        style.set_indent_count(indent);
    }
    if cfg.underline {
        style.set_underline(true);
    }
    if cfg.dashed {
        style.set_underline_style(UnderlineStyle::Dashed);
    }

    let mut view = RubyTextView::new(EgTextMeasurer::shared());
    view.configure(style)
        .set_padding(Insets::uniform(cfg.padding))
        .set_debug_boxes(cfg.debug_boxes)
        .set_data_text(Some(cfg.base.as_str()), Some(cfg.annotation.as_str()));
    let renderer = EgRenderer::default();

    for (mode, name) in [
        (DrawMode::BaseOnly, "base"),
        (DrawMode::AnnotationAndBase, "ruby"),
        (DrawMode::AnnotationOnly, "annotation"),
    ] {
        view.set_draw_mode(mode);
        let size = view.measure(
            SizeConstraint::Exact(cfg.width as i32),
            SizeConstraint::Unbounded,
        );
        let mut display = RgbDisplay::new(cfg.width, size.height.max(1) as u32);
        renderer
            .render_view(&mut view, &mut display)
            .map_err(|e| -> String { match e {} })?;
        let path = Path::new(&cfg.out_dir).join(format!("{}.png", name));
        display.save_png(&path)?;
        println!(
            "wrote {} ({}x{})",
            path.display(),
            display.size.width,
            display.size.height
        );
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        base: DEFAULT_BASE.to_string(),
        annotation: DEFAULT_ANNOTATION.to_string(),
        out_dir: "target/visualize".to_string(),
        width: 480,
        padding: 12,
        config_path: None,
        indent: None,
        underline: false,
        dashed: false,
        debug_boxes: false,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--base" => {
                cfg.base = args
                    .get(i + 1)
                    .ok_or_else(|| "--base requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--annotation" => {
                cfg.annotation = args
                    .get(i + 1)
                    .ok_or_else(|| "--annotation requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--out-dir" => {
                cfg.out_dir = args
                    .get(i + 1)
                    .ok_or_else(|| "--out-dir requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cfg.width = v
                    .parse::<u32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--padding" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--padding requires a value".to_string())?;
                cfg.padding = v
                    .parse::<i32>()
                    .map_err(|_| format!("invalid --padding value '{}'", v))?;
                i += 2;
            }
            "--indent" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--indent requires a value".to_string())?;
                cfg.indent = Some(
                    v.parse::<usize>()
                        .map_err(|_| format!("invalid --indent value '{}'", v))?,
                );
                i += 2;
            }
            "--config" => {
                cfg.config_path = Some(
                    args.get(i + 1)
                        .ok_or_else(|| "--config requires a value".to_string())?
                        .clone(),
                );
                i += 2;
            }
            "--underline" => {
                cfg.underline = true;
                i += 1;
            }
            "--dashed" => {
                cfg.underline = true;
                cfg.dashed = true;
                i += 1;
            }
            "--debug" => {
                cfg.debug_boxes = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    if cfg.width == 0 {
        return Err("--width must be positive".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"visualize - render ruby-text draw modes to PNG snapshots

USAGE:
  cargo run -p ruby-text-embedded-graphics --bin visualize -- [options]

OPTIONS:
  --base <text>          base text (default: built-in story)
  --annotation <text>    space-separated annotations, one per base char
  --out-dir <dir>        output directory (default: target/visualize)
  --width <px>           image width (default: 480)
  --padding <px>         padding on every side (default: 12)
  --indent <n>           indentation placeholders per paragraph
  --config <file>        JSON style configuration
  --underline            draw solid underlines
  --dashed               draw dashed underlines
  --debug                outline every layout box

OUTPUT:
  base.png, ruby.png and annotation.png in the output directory
"#
}

#[derive(Clone, Debug)]
struct RgbDisplay {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl RgbDisplay {
    fn new(width: u32, height: u32) -> Self {
        let len = width.saturating_mul(height) as usize;
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::WHITE; len],
        }
    }

    fn save_png(&self, path: &Path) -> Result<(), String> {
        let mut raw = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            raw.extend_from_slice(&[color.r(), color.g(), color.b()]);
        }
        let image = image::RgbImage::from_raw(self.size.width, self.size.height, raw)
            .ok_or_else(|| "pixel buffer does not match image size".to_string())?;
        image.save(path).map_err(|e| e.to_string())
    }
}

impl OriginDimensions for RgbDisplay {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for RgbDisplay {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= w || point.y >= h {
                continue;
            }
            let idx = (point.y as u32 * self.size.width + point.x as u32) as usize;
            self.pixels[idx] = color;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for pixel in &mut self.pixels {
            *pixel = color;
        }
        Ok(())
    }
}
