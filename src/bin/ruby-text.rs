use std::env;
use std::process::ExitCode;

use ruby_text::{Color, Document, DocumentBuilder, Script};

#[derive(Clone, Debug)]
struct Args {
    base: String,
    annotation: String,
    indent_count: usize,
    base_color: Color,
    annotation_color: Color,
    json: bool,
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
    let doc = DocumentBuilder::new()
        .indent_count(cli.indent_count)
        .base_color(cli.base_color)
        .annotation_color(cli.annotation_color)
        .build_from_text(Some(cli.base.as_str()), Some(cli.annotation.as_str()));

    if cli.json {
        let json = serde_json::to_string_pretty(doc.tokens()).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }
    print_summary(&doc);
    Ok(())
}

fn print_summary(doc: &Document) {
    println!("tokens: {} (indent={})", doc.len(), doc.indent_count());
    println!("base text:         {:?}", doc.base_text());
    println!("annotation text:   {:?}", doc.annotation_text());
    println!("base markup:       {}", doc.markup(Script::Base));
    println!("annotation markup: {}", doc.markup(Script::Annotation));
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }
    let base = args
        .get(1)
        .ok_or_else(|| "missing <base> argument".to_string())?
        .clone();
    let annotation = args
        .get(2)
        .ok_or_else(|| "missing <annotation> argument".to_string())?
        .clone();

    let mut cfg = Args {
        base,
        annotation,
        indent_count: 0,
        base_color: Color::DEFAULT_TEXT,
        annotation_color: Color::DEFAULT_TEXT,
        json: false,
    };

    let mut i = 3usize;
    while i < args.len() {
        match args[i].as_str() {
            "--indent" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--indent requires a value".to_string())?;
                cfg.indent_count = v
                    .parse::<usize>()
                    .map_err(|_| format!("invalid --indent value '{}'", v))?;
                i += 2;
            }
            "--base-color" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--base-color requires a value".to_string())?;
                cfg.base_color =
                    Color::parse_hex(v).ok_or_else(|| format!("invalid --base-color '{}'", v))?;
                i += 2;
            }
            "--annotation-color" => {
                let v = args
                    .get(i + 1)
                    .ok_or_else(|| "--annotation-color requires a value".to_string())?;
                cfg.annotation_color = Color::parse_hex(v)
                    .ok_or_else(|| format!("invalid --annotation-color '{}'", v))?;
                i += 2;
            }
            "--json" => {
                cfg.json = true;
                i += 1;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"ruby-text - inspect the document built from base text and annotations

USAGE:
  cargo run --features cli --bin ruby-text -- <base> <annotation> [options]

  <annotation> holds one space-separated piece per base character.

OPTIONS:
  --indent <n>                indentation placeholders per paragraph (default: 0)
  --base-color <#hex>         default base color (default: #FF333333)
  --annotation-color <#hex>   default annotation color (default: #FF333333)
  --json                      dump the normalized tokens as JSON
"#
}
