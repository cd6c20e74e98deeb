//! Web preview helpers for `ruby-text-render`.
//!
//! Draw commands are turned into standalone SVG documents and bundled with
//! their layout geometry into a JSON payload that the preview page renders.

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

use std::fmt::Write as _;

use quick_xml::escape::{escape, partial_escape};
use ruby_text::{Color, DrawMode, Script, UnderlineStyle};
use ruby_text_render::{
    DrawCommand, MeasuredContent, MeasuredSize, RubyLayout, RubyTextView, SizeConstraint,
};
use serde::Serialize;

/// Crate marker module.
pub mod preview {
    /// Current crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Font stacks used for each script in generated SVG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvgFonts {
    pub base_family: String,
    pub annotation_family: String,
}

impl Default for SvgFonts {
    fn default() -> Self {
        Self {
            base_family: "\"Noto Sans SC\", \"PingFang SC\", \"Microsoft YaHei\", sans-serif"
                .to_string(),
            annotation_family: "\"Noto Sans\", \"Segoe UI\", Arial, sans-serif".to_string(),
        }
    }
}

fn paint(attr: &str, color: Color) -> String {
    let mut out = format!("{}=\"{}\"", attr, color.to_hex_rgb().to_ascii_lowercase());
    if color.alpha() != 0xFF {
        let _ = write!(out, " {}-opacity=\"{:.3}\"", attr, color.alpha() as f32 / 255.0);
    }
    out
}

/// Render commands as a standalone SVG document of `size`.
pub fn commands_to_svg(
    commands: &[DrawCommand],
    size: MeasuredSize,
    background: Option<Color>,
    fonts: &SvgFonts,
) -> String {
    let width = size.width.max(0);
    let height = size.height.max(0);
    let mut svg = String::with_capacity(256 + commands.len() * 96);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );
    if let Some(bg) = background {
        let _ = write!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {}/>",
            width,
            height,
            paint("fill", bg)
        );
    }
    for cmd in commands {
        match cmd {
            DrawCommand::Text(text) => {
                let family = match text.script {
                    Script::Base => &fonts.base_family,
                    Script::Annotation => &fonts.annotation_family,
                };
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"{}\" xml:space=\"preserve\" {}>{}</text>",
                    text.x,
                    text.baseline_y,
                    text.font_size,
                    escape(family.as_str()),
                    paint("fill", text.color),
                    partial_escape(text.text.as_str())
                );
            }
            DrawCommand::Line(line) => {
                let _ = write!(
                    svg,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke-width=\"{}\" {}",
                    line.x1,
                    line.y1,
                    line.x2,
                    line.y2,
                    line.width,
                    paint("stroke", line.color)
                );
                if line.style == UnderlineStyle::Dashed {
                    let _ = write!(
                        svg,
                        " stroke-dasharray=\"{w} {w}\"",
                        w = line.width.max(1)
                    );
                }
                svg.push_str("/>");
            }
            DrawCommand::Rect(rect) => {
                let _ = write!(
                    svg,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke-width=\"1\" {}/>",
                    rect.rect.left,
                    rect.rect.top,
                    rect.rect.width(),
                    rect.rect.height(),
                    paint("stroke", rect.color)
                );
            }
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Per-mode preview entry.
#[derive(Clone, Debug, Serialize)]
pub struct ModePayload {
    pub mode: DrawMode,
    pub width: i32,
    pub height: i32,
    pub line_count: usize,
    pub svg: String,
    pub commands: Vec<DrawCommand>,
    /// Token geometry when the mode is laid out as ruby pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruby: Option<RubyLayout>,
}

/// Data injected into the preview page.
#[derive(Clone, Debug, Serialize)]
pub struct PreviewPayload {
    pub version: &'static str,
    pub viewport_width: i32,
    pub base_text: String,
    pub annotation_text: String,
    pub base_markup: String,
    pub annotation_markup: String,
    pub background: String,
    pub modes: Vec<ModePayload>,
}

/// Measure and draw `view` in every draw mode at `width`, then restore the
/// view's own mode.
pub fn build_payload(
    view: &mut RubyTextView,
    width: i32,
    background: Color,
    fonts: &SvgFonts,
) -> PreviewPayload {
    let original = view.style().draw_mode();
    let mut modes = Vec::with_capacity(3);
    for mode in [
        DrawMode::BaseOnly,
        DrawMode::AnnotationAndBase,
        DrawMode::AnnotationOnly,
    ] {
        view.set_draw_mode(mode);
        let size = view.measure(SizeConstraint::AtMost(width), SizeConstraint::Unbounded);
        let commands = view.draw_commands();
        let (line_count, ruby) = match view.content() {
            MeasuredContent::Empty => (0, None),
            MeasuredContent::Ruby(layout) => (layout.line_count, Some(layout.clone())),
            MeasuredContent::Paragraph { layout, .. } => (layout.line_count(), None),
        };
        modes.push(ModePayload {
            mode,
            width: size.width,
            height: size.height,
            line_count,
            svg: commands_to_svg(&commands, size, Some(background), fonts),
            commands,
            ruby,
        });
    }
    view.set_draw_mode(original);

    PreviewPayload {
        version: preview::VERSION,
        viewport_width: width,
        base_text: view.base_text().to_string(),
        annotation_text: view.annotation_text().to_string(),
        base_markup: view.document().markup(Script::Base).to_string(),
        annotation_markup: view.document().markup(Script::Annotation).to_string(),
        background: background.to_hex_rgb().to_ascii_lowercase(),
        modes,
    }
}

/// Standalone HTML page that renders `payload_json`.
pub fn build_html(payload_json: &str) -> String {
    let safe_json = payload_json.replace("</script>", "<\\/script>");
    let template = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>ruby-text preview</title>
  <style>
    :root {
      --bg: #f2efe8;
      --panel: #fdfbf7;
      --ink: #252016;
      --muted: #675f50;
      --line: #d7cebc;
      --shadow: rgba(28, 21, 9, 0.14);
    }

    * { box-sizing: border-box; }
    body {
      margin: 0;
      color: var(--ink);
      background: var(--bg);
      font-family: "Source Sans 3", "Segoe UI", sans-serif;
    }

    main {
      display: grid;
      gap: 20px;
      padding: 20px;
    }

    .panel {
      background: var(--panel);
      border: 1px solid var(--line);
      border-radius: 18px;
      box-shadow: 0 12px 30px var(--shadow);
      padding: 16px;
    }

    h1 { margin: 0 0 4px; font-size: 1.6rem; }
    h2 { margin: 0 0 8px; font-size: 1rem; text-transform: uppercase; letter-spacing: 0.04em; }
    .meta { color: var(--muted); font-size: 0.9rem; }
    .frame { border: 1px dashed var(--line); display: inline-block; }
    pre { white-space: pre-wrap; font-size: 0.8rem; color: var(--muted); }
  </style>
</head>
<body>
  <main id="root">
    <section class="panel">
      <h1>ruby-text preview</h1>
      <div class="meta" id="meta"></div>
    </section>
  </main>
  <script id="payload" type="application/json">__INITIAL_PAYLOAD__</script>
  <script>
    const payload = JSON.parse(document.getElementById('payload').textContent);
    const root = document.getElementById('root');
    document.getElementById('meta').textContent =
      `v${payload.version} · viewport ${payload.viewport_width}px · ${payload.modes.length} modes`;

    for (const entry of payload.modes) {
      const panel = document.createElement('section');
      panel.className = 'panel';
      const title = document.createElement('h2');
      title.textContent = entry.mode.replace(/_/g, ' ');
      const meta = document.createElement('div');
      meta.className = 'meta';
      meta.textContent = `${entry.width}×${entry.height}px · ${entry.line_count} lines · ${entry.commands.length} commands`;
      const frame = document.createElement('div');
      frame.className = 'frame';
      frame.innerHTML = entry.svg;
      panel.append(title, meta, frame);
      root.append(panel);
    }

    const markup = document.createElement('section');
    markup.className = 'panel';
    const heading = document.createElement('h2');
    heading.textContent = 'markup';
    const pre = document.createElement('pre');
    pre.textContent = `${payload.base_markup}\n\n${payload.annotation_markup}`;
    markup.append(heading, pre);
    root.append(markup);
  </script>
</body>
</html>
"#;
    template.replace("__INITIAL_PAYLOAD__", &safe_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruby_text_render::{LineCommand, Rect, RectCommand, TextCommand};

    fn size(width: i32, height: i32) -> MeasuredSize {
        MeasuredSize { width, height }
    }

    #[test]
    fn text_is_escaped_and_colored() {
        let commands = vec![DrawCommand::Text(TextCommand {
            x: 3,
            baseline_y: 12,
            text: "a<b>&\"".to_string(),
            color: Color::RED,
            font_size: 14.0,
            script: Script::Annotation,
        })];
        let svg = commands_to_svg(&commands, size(40, 20), None, &SvgFonts::default());
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">a&lt;b&gt;&amp;\"</text>"));
        assert!(svg.contains("font-family=\"&quot;Noto Sans&quot;, "));
        assert!(svg.contains("fill=\"#ff0000\""));
        assert!(svg.contains("x=\"3\" y=\"12\""));
        assert!(!svg.contains("fill-opacity"));
    }

    #[test]
    fn dashed_lines_get_a_dash_array() {
        let line = LineCommand {
            x1: 0,
            y1: 4,
            x2: 20,
            y2: 4,
            color: Color::BLACK,
            width: 2,
            style: UnderlineStyle::Dashed,
        };
        let svg = commands_to_svg(
            &[DrawCommand::Line(line)],
            size(20, 8),
            None,
            &SvgFonts::default(),
        );
        assert!(svg.contains("stroke-dasharray=\"2 2\""));
        let solid = commands_to_svg(
            &[DrawCommand::Line(LineCommand {
                style: UnderlineStyle::Solid,
                ..line
            })],
            size(20, 8),
            None,
            &SvgFonts::default(),
        );
        assert!(!solid.contains("stroke-dasharray"));
    }

    #[test]
    fn translucent_colors_emit_opacity_and_background_rect() {
        let svg = commands_to_svg(
            &[DrawCommand::Rect(RectCommand {
                rect: Rect::new(1, 2, 11, 7),
                color: Color::argb(0x80, 0, 0, 0xFF),
            })],
            size(16, 16),
            Some(Color::WHITE),
            &SvgFonts::default(),
        );
        assert!(svg.contains("stroke-opacity=\"0.502\""));
        assert!(svg.contains("width=\"10\" height=\"5\""));
        assert!(svg.contains("fill=\"#ffffff\""));
    }

    #[test]
    fn html_embeds_payload_safely() {
        let html = build_html("{\"x\":\"</script>\"}");
        assert!(html.contains("<\\/script>"));
        assert!(!html.contains("__INITIAL_PAYLOAD__"));
    }
}
