//! Input tokens: one base unit paired with its annotation.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Sentinel text marking an explicit line break.
pub const LINE_BREAK: &str = "\n";
/// Full-width space used on both sides of an indentation placeholder.
pub const INDENT_PLACEHOLDER: &str = "\u{3000}";
/// The placeholder as a `char`, for scanning laid-out lines.
pub const INDENT_CHAR: char = '\u{3000}';

/// Which of the two scripts a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    /// Base script (e.g. hanzi).
    Base,
    /// Phonetic annotation (e.g. pinyin).
    Annotation,
}

/// Structural role of a token, derived from its reserved sentinel text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Content,
    LineBreak,
    Indent,
}

impl TokenKind {
    /// Classify a token by its base text.
    pub fn of(base: &str) -> Self {
        match base {
            LINE_BREAK => Self::LineBreak,
            INDENT_PLACEHOLDER => Self::Indent,
            _ => Self::Content,
        }
    }
}

/// A single display unit supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Base-script text, usually one character.
    pub base: String,
    /// Annotation text, usually one syllable.
    pub annotation: String,
    /// Optional base color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<Color>,
    /// Optional annotation color override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_color: Option<Color>,
}

impl Token {
    /// Token without color overrides.
    pub fn new(base: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            annotation: annotation.into(),
            base_color: None,
            annotation_color: None,
        }
    }

    /// Token with color overrides. [`Color::UNSET`] leaves a side unset.
    pub fn with_colors(
        base: impl Into<String>,
        base_color: Color,
        annotation: impl Into<String>,
        annotation_color: Color,
    ) -> Self {
        Self {
            base: base.into(),
            annotation: annotation.into(),
            base_color: base_color.as_override(),
            annotation_color: annotation_color.as_override(),
        }
    }

    /// Explicit line break.
    pub fn line_break() -> Self {
        Self::new(LINE_BREAK, LINE_BREAK)
    }

    /// Indentation placeholder.
    pub fn indent() -> Self {
        Self::new(INDENT_PLACEHOLDER, INDENT_PLACEHOLDER)
    }

    pub fn kind(&self) -> TokenKind {
        TokenKind::of(&self.base)
    }

    pub fn is_line_break(&self) -> bool {
        self.kind() == TokenKind::LineBreak
    }

    pub fn text(&self, script: Script) -> &str {
        match script {
            Script::Base => &self.base,
            Script::Annotation => &self.annotation,
        }
    }
}

/// Pair the i-th character of `base` with the i-th space-separated piece of
/// `annotation`.
///
/// Pieces are split on single spaces, so consecutive spaces yield empty
/// pieces; trailing empty pieces are discarded. The result is truncated to
/// the shorter side.
pub fn pair_text(base: &str, annotation: &str) -> Vec<Token> {
    let mut pieces: Vec<&str> = annotation.split(' ').collect();
    while pieces.last().is_some_and(|piece| piece.is_empty()) {
        pieces.pop();
    }
    base.chars()
        .zip(pieces)
        .map(|(ch, piece)| {
            let mut unit = String::with_capacity(ch.len_utf8());
            unit.push(ch);
            Token::new(unit, piece)
        })
        .collect()
}
