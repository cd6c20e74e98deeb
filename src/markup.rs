//! Inline color markup for the paragraph (non-ruby) draw modes.
//!
//! The writer emits a minimal HTML subset: literal text, `<br/>` for explicit
//! breaks and `<font color="#RRGGBB">..</font>` for tokens carrying a color
//! override. Text is appended unescaped, one run per token; adjacent runs with
//! the same color are not merged.
//!
//! The reader turns that subset back into colored runs for paragraph layout.
//! Like an HTML reader it treats a `&` that does not start a known entity and
//! a `<` that does not start a tag as literal text, so unescaped token text
//! reads back intact.

use core::fmt;
use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::color::Color;
use crate::document::DocumentToken;
use crate::token::{Script, TokenKind};

/// Markup emitted for an explicit line break.
pub const BREAK_TAG: &str = "<br/>";

/// Build the markup for one script of a token sequence.
pub fn to_markup(tokens: &[DocumentToken], script: Script) -> String {
    let mut out = String::with_capacity(tokens.len() * 4);
    let mut previous = None;
    for token in tokens {
        if script == Script::Annotation
            && token.kind == TokenKind::Content
            && previous == Some(TokenKind::Content)
        {
            out.push(' ');
        }
        match token.kind {
            TokenKind::LineBreak => out.push_str(BREAK_TAG),
            _ => push_token_text(&mut out, token.text(script), token.override_color(script)),
        }
        previous = Some(token.kind);
    }
    out
}

fn push_token_text(out: &mut String, text: &str, color: Option<Color>) {
    match color {
        None => out.push_str(text),
        Some(color) => {
            out.push_str("<font color=\"");
            out.push_str(&color.to_hex_rgb());
            out.push_str("\">");
            out.push_str(text);
            out.push_str("</font>");
        }
    }
}

/// A run of text sharing one color. Explicit breaks appear as `'\n'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupRun {
    pub text: String,
    pub color: Color,
}

/// Markup reader failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkupError {
    /// Malformed tag structure.
    Syntax { offset: usize, message: String },
    /// Text or name bytes were not valid UTF-8.
    Encoding { offset: usize },
    /// Entity reference that could not be resolved.
    UnknownEntity { offset: usize, name: String },
}

impl MarkupError {
    /// Byte offset of the last event read successfully before the failure.
    pub fn offset(&self) -> usize {
        match self {
            Self::Syntax { offset, .. }
            | Self::Encoding { offset }
            | Self::UnknownEntity { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { offset, message } => {
                write!(f, "markup syntax error at byte {}: {}", offset, message)
            }
            Self::Encoding { offset } => write!(f, "markup encoding error at byte {}", offset),
            Self::UnknownEntity { offset, name } => {
                write!(f, "unknown entity &{}; at byte {}", name, offset)
            }
        }
    }
}

impl std::error::Error for MarkupError {}

/// Parse markup into colored runs. Unstyled text takes `default_color`.
pub fn parse_markup(markup: &str, default_color: Color) -> Result<Vec<MarkupRun>, MarkupError> {
    let mut runs = Vec::with_capacity(8);
    read_runs(&escape_stray(markup), default_color, &mut runs)?;
    Ok(runs)
}

/// Parse markup, recovering from reader errors.
///
/// Runs read before the failure are kept and the unread remainder is appended
/// verbatim in `default_color`.
pub fn parse_markup_lossy(markup: &str, default_color: Color) -> Vec<MarkupRun> {
    let markup = escape_stray(markup);
    let mut runs = Vec::with_capacity(8);
    if let Err(err) = read_runs(&markup, default_color, &mut runs) {
        log::warn!("recovering from malformed markup: {}", err);
        if let Some(rest) = markup.get(err.offset()..) {
            push_run(&mut runs, rest, default_color);
        }
    }
    runs
}

/// Concatenated text of parsed runs.
pub fn plain_text(runs: &[MarkupRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

fn read_runs(
    markup: &str,
    default_color: Color,
    runs: &mut Vec<MarkupRun>,
) -> Result<(), MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);
    // `<br>` is commonly left unclosed in HTML.
    reader.config_mut().check_end_names = false;
    let mut colors: Vec<Color> = Vec::with_capacity(4);
    let mut last_ok = 0usize;

    loop {
        let current = colors.last().copied().unwrap_or(default_color);
        match reader.read_event() {
            Ok(Event::Start(e)) => match tag_name(&e, last_ok)?.as_str() {
                "br" => push_run(runs, "\n", default_color),
                "font" => colors.push(font_color(&e).unwrap_or(current)),
                _ => colors.push(current),
            },
            Ok(Event::Empty(e)) => {
                if tag_name(&e, last_ok)? == "br" {
                    push_run(runs, "\n", default_color);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if name != "br" {
                    colors.pop();
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|_| MarkupError::Encoding { offset: last_ok })?;
                push_run(runs, &text, current);
            }
            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|_| MarkupError::Encoding { offset: last_ok })?;
                push_run(runs, &text, current);
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e
                    .decode()
                    .map_err(|_| MarkupError::Encoding { offset: last_ok })?;
                let resolved = resolve_entity(&name).ok_or_else(|| MarkupError::UnknownEntity {
                    offset: last_ok,
                    name: name.to_string(),
                })?;
                push_run(runs, &resolved, current);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(MarkupError::Syntax {
                    offset: last_ok,
                    message: err.to_string(),
                })
            }
        }
        last_ok = usize::try_from(reader.buffer_position()).unwrap_or(markup.len());
    }
    Ok(())
}

/// Escape every `&` and `<` that cannot begin an entity reference or a tag.
fn escape_stray(markup: &str) -> Cow<'_, str> {
    if !markup.contains(['&', '<']) {
        return Cow::Borrowed(markup);
    }
    let mut out = String::with_capacity(markup.len() + 8);
    for (i, ch) in markup.char_indices() {
        let rest = markup.get(i + ch.len_utf8()..).unwrap_or("");
        match ch {
            '&' if !starts_entity(rest) => out.push_str("&amp;"),
            '<' if !starts_tag(rest) => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

const MAX_ENTITY_NAME: usize = 32;

fn starts_entity(rest: &str) -> bool {
    let Some((end, _)) = rest
        .char_indices()
        .take(MAX_ENTITY_NAME + 1)
        .find(|(_, c)| *c == ';')
    else {
        return false;
    };
    let name = rest.get(..end).unwrap_or("");
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
        && resolve_entity(name).is_some()
}

/// A tag opens with a name, `/name`, `!` or `?` and closes with `>` before
/// any other `<`.
fn starts_tag(rest: &str) -> bool {
    let mut chars = rest.chars();
    let opens = match chars.next() {
        Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
        Some(c) => c.is_ascii_alphabetic() || c == '!' || c == '?',
        None => false,
    };
    opens
        && rest
            .find(['<', '>'])
            .is_some_and(|pos| rest.get(pos..).is_some_and(|tail| tail.starts_with('>')))
}

fn tag_name(e: &BytesStart<'_>, offset: usize) -> Result<String, MarkupError> {
    let name = core::str::from_utf8(e.name().as_ref())
        .map_err(|_| MarkupError::Encoding { offset })?
        .to_ascii_lowercase();
    Ok(name)
}

fn font_color(e: &BytesStart<'_>) -> Option<Color> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(b"color"))
        .and_then(|attr| {
            core::str::from_utf8(&attr.value)
                .ok()
                .and_then(Color::parse_hex)
        })
}

fn resolve_entity(name: &str) -> Option<Cow<'static, str>> {
    let mut raw = String::with_capacity(name.len() + 2);
    raw.push('&');
    raw.push_str(name);
    raw.push(';');
    quick_xml::escape::unescape(&raw)
        .ok()
        .map(|text| Cow::Owned(text.into_owned()))
        .or_else(|| (name == "nbsp").then_some(Cow::Borrowed("\u{00A0}")))
}

fn push_run(runs: &mut Vec<MarkupRun>, text: &str, color: Color) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if last.color == color {
            last.text.push_str(text);
            return;
        }
    }
    runs.push(MarkupRun {
        text: text.to_string(),
        color,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBuilder;
    use crate::token::Token;

    fn doc(tokens: &[Token], indent: usize) -> crate::document::Document {
        DocumentBuilder::new().indent_count(indent).build(tokens)
    }

    #[test]
    fn unset_overrides_emit_literal_text() {
        let d = doc(&[Token::new("你", "nǐ"), Token::new("好", "hǎo")], 0);
        assert_eq!(to_markup(d.tokens(), Script::Base), "你好");
        assert_eq!(to_markup(d.tokens(), Script::Annotation), "nǐ hǎo");
    }

    #[test]
    fn overrides_wrap_each_token_without_merging() {
        let d = doc(
            &[
                Token::with_colors("A", Color::RED, "a", Color::UNSET),
                Token::with_colors("B", Color::RED, "b", Color(0xFF00_FF00)),
            ],
            0,
        );
        assert_eq!(
            to_markup(d.tokens(), Script::Base),
            "<font color=\"#FF0000\">A</font><font color=\"#FF0000\">B</font>"
        );
        assert_eq!(
            to_markup(d.tokens(), Script::Annotation),
            "a <font color=\"#00FF00\">b</font>"
        );
    }

    #[test]
    fn breaks_and_placeholders_have_no_annotation_separator() {
        let d = doc(
            &[Token::new("A", "a"), Token::line_break(), Token::new("B", "b")],
            1,
        );
        assert_eq!(to_markup(d.tokens(), Script::Base), "\u{3000}A<br/>\u{3000}B");
        assert_eq!(
            to_markup(d.tokens(), Script::Annotation),
            "\u{3000}a<br/>\u{3000}b"
        );
    }

    #[test]
    fn generated_markup_reads_back_with_colors() {
        let d = doc(
            &[
                Token::new("A", "a"),
                Token::with_colors("B", Color::RED, "b", Color::UNSET),
                Token::line_break(),
                Token::new("C", "c"),
            ],
            0,
        );
        let runs = parse_markup(d.markup(Script::Base), Color::BLACK).unwrap();
        assert_eq!(
            runs,
            vec![
                MarkupRun {
                    text: "A".into(),
                    color: Color::BLACK
                },
                MarkupRun {
                    text: "B".into(),
                    color: Color::RED
                },
                MarkupRun {
                    text: "\nC".into(),
                    color: Color::BLACK
                },
            ]
        );
    }

    #[test]
    fn reader_accepts_unclosed_br_and_entities() {
        let runs = parse_markup("a<br>b &amp; c&#x3000;", Color::BLACK).unwrap();
        assert_eq!(plain_text(&runs), "a\nb & c\u{3000}");
    }

    #[test]
    fn nested_font_uses_innermost_color_and_restores_outer() {
        let runs = parse_markup(
            "<font color=\"#FF0000\">a<font color=\"#00FF00\">b</font>c</font>d",
            Color::BLACK,
        )
        .unwrap();
        let colors: Vec<Color> = runs.iter().map(|r| r.color).collect();
        assert_eq!(
            colors,
            vec![Color::RED, Color(0xFF00_FF00), Color::RED, Color::BLACK]
        );
    }

    #[test]
    fn stray_ampersand_and_angle_bracket_read_as_text() {
        let runs = parse_markup(
            "A&<font color=\"#FF0000\">B</font>a<b x < y &foo; &amp",
            Color::BLACK,
        )
        .unwrap();
        assert_eq!(plain_text(&runs), "A&Ba<b x < y &foo; &amp");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text, "B");
        assert_eq!(runs[1].color, Color::RED);
    }

    #[test]
    fn lossy_reader_keeps_unparsed_remainder() {
        let broken = "a<font color=\"#FF0000>b";
        assert!(parse_markup(broken, Color::BLACK).is_err());
        let runs = parse_markup_lossy(broken, Color::BLACK);
        let text = plain_text(&runs);
        assert!(text.starts_with('a'));
        assert!(text.ends_with("#FF0000>b"));
    }
}
