use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use ruby_text::{Color, RubyStyle};
use ruby_text_render::{load_style_file, HeuristicMeasurer, Insets, RubyTextView};
use ruby_text_render_web::{build_html, build_payload, SvgFonts};

const DEFAULT_OUT_PATH: &str = "target/web-preview/index.html";
const DEFAULT_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。它长得可凶啦！\n头上长着长长的角，嘴里龇着尖尖的牙，发起怒来，就会张开血盆大口，哇哇大叫。";
const DEFAULT_ANNOTATION: &str = "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。 tā cháng dé kě xiōng lā ！ \n tóu shàng cháng zhuó cháng cháng de jiǎo ， zuǐ lǐ zī zhuó jiān jiān de yá ， fā qǐ nù lái ， jiù huì zhāng kāi xiě pén dà kǒu ， wā wā dà jiào 。";

#[derive(Clone, Debug)]
struct Args {
    base: String,
    annotation: String,
    out_path: String,
    width: i32,
    padding: i32,
    config_path: Option<String>,
    background: Color,
    debug_boxes: bool,
    json_only: bool,
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
    let cli = parse_args(args)?;

    if cli.out_path.is_empty() {
        return Err("--out must not be empty".to_string());
    }
    if let Some(parent) = Path::new(&cli.out_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }

    let style = match &cli.config_path {
        Some(path) => load_style_file(path).map_err(|e| e.to_string())?,
        None => RubyStyle::default(),
    };
    let mut view = RubyTextView::new(Arc::new(HeuristicMeasurer::new()));
    view.configure(style)
        .set_padding(Insets::uniform(cli.padding))
        .set_debug_boxes(cli.debug_boxes)
        .set_data_text(Some(cli.base.as_str()), Some(cli.annotation.as_str()));

    let payload = build_payload(&mut view, cli.width, cli.background, &SvgFonts::default());
    let data_json = if cli.json_only {
        serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
    } else {
        serde_json::to_string(&payload).map_err(|e| e.to_string())?
    };
    let output = if cli.json_only {
        data_json
    } else {
        build_html(&data_json)
    };
    std::fs::write(&cli.out_path, output).map_err(|e| e.to_string())?;

    let sizes: Vec<String> = payload
        .modes
        .iter()
        .map(|m| format!("{:?}={}x{}", m.mode, m.width, m.height))
        .collect();
    println!(
        "wrote web preview to {} (tokens={}, {})",
        cli.out_path,
        view.document().len(),
        sizes.join(", ")
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cli = Args {
        base: DEFAULT_BASE.to_string(),
        annotation: DEFAULT_ANNOTATION.to_string(),
        out_path: DEFAULT_OUT_PATH.to_string(),
        width: 480,
        padding: 16,
        config_path: None,
        background: Color::WHITE,
        debug_boxes: false,
        json_only: false,
    };

    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--base" => {
                cli.base = args
                    .get(i + 1)
                    .ok_or_else(|| "--base requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--annotation" => {
                cli.annotation = args
                    .get(i + 1)
                    .ok_or_else(|| "--annotation requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--out" => {
                cli.out_path = args
                    .get(i + 1)
                    .ok_or_else(|| "--out requires a value".to_string())?
                    .clone();
                i += 2;
            }
            "--width" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--width requires a value".to_string())?;
                cli.width = v
                    .parse::<i32>()
                    .map_err(|_| format!("invalid --width value '{}'", v))?;
                i += 2;
            }
            "--padding" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--padding requires a value".to_string())?;
                cli.padding = v
                    .parse::<i32>()
                    .map_err(|_| format!("invalid --padding value '{}'", v))?;
                i += 2;
            }
            "--background" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--background requires a value".to_string())?;
                cli.background = Color::parse_hex(v)
                    .ok_or_else(|| format!("invalid --background value '{}'", v))?;
                i += 2;
            }
            "--config" => {
                cli.config_path = Some(
                    args.get(i + 1)
                        .ok_or_else(|| "--config requires a value".to_string())?
                        .clone(),
                );
                i += 2;
            }
            "--debug" => {
                cli.debug_boxes = true;
                i += 1;
            }
            "--json" => {
                cli.json_only = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    if cli.width <= 0 {
        return Err("--width must be positive".to_string());
    }
    if cli.padding < 0 {
        return Err("--padding must not be negative".to_string());
    }
    Ok(cli)
}

fn help_text() -> &'static str {
    r#"web-preview - static HTML preview of ruby-text draw modes

USAGE:
  cargo run -p ruby-text-render-web --bin web-preview -- [options]

OPTIONS:
  --base <text>          base text (default: built-in story)
  --annotation <text>    space-separated annotations, one per base char
  --out <file>           output path (default: target/web-preview/index.html)
  --width <px>           viewport width (default: 480)
  --padding <px>         padding on every side (default: 16)
  --background <#hex>    page background color (default: #FFFFFF)
  --config <file>        JSON style configuration
  --debug                outline every layout box
  --json                 write the raw payload JSON instead of HTML
"#
}
