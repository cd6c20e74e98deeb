//! Document model: the normalized token sequence plus its derived strings.

use serde::Serialize;

use crate::color::Color;
use crate::markup::to_markup;
use crate::token::{pair_text, Script, Token, TokenKind, INDENT_PLACEHOLDER, LINE_BREAK};

/// A token as it appears in a built [`Document`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentToken {
    /// Structural role.
    pub kind: TokenKind,
    /// Base text (sentinel text for breaks and placeholders).
    pub base: String,
    /// Annotation text.
    pub annotation: String,
    /// Caller-supplied base override, if any.
    pub base_override: Option<Color>,
    /// Caller-supplied annotation override, if any.
    pub annotation_override: Option<Color>,
    /// Base color after falling back to the document default.
    pub base_color: Color,
    /// Annotation color after falling back to the document default.
    pub annotation_color: Color,
    /// Index of the caller token this came from; `None` for inserted
    /// indentation placeholders.
    pub source_index: Option<usize>,
}

impl DocumentToken {
    fn placeholder(base_color: Color, annotation_color: Color) -> Self {
        Self {
            kind: TokenKind::Indent,
            base: INDENT_PLACEHOLDER.to_string(),
            annotation: INDENT_PLACEHOLDER.to_string(),
            base_override: None,
            annotation_override: None,
            base_color,
            annotation_color,
            source_index: None,
        }
    }

    pub fn text(&self, script: Script) -> &str {
        match script {
            Script::Base => &self.base,
            Script::Annotation => &self.annotation,
        }
    }

    /// Resolved color for a script.
    pub fn color(&self, script: Script) -> Color {
        match script {
            Script::Base => self.base_color,
            Script::Annotation => self.annotation_color,
        }
    }

    /// Caller override for a script, if one is set.
    pub fn override_color(&self, script: Script) -> Option<Color> {
        match script {
            Script::Base => self.base_override,
            Script::Annotation => self.annotation_override,
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.kind == TokenKind::LineBreak
    }

    pub fn is_indent(&self) -> bool {
        self.kind == TokenKind::Indent
    }
}

/// Ordered, normalized tokens with cached derived strings.
///
/// Documents are immutable; any change to the data, a color or the indent
/// count produces a new one through [`DocumentBuilder`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<DocumentToken>,
    base_text: String,
    annotation_text: String,
    base_markup: String,
    annotation_markup: String,
    indent_count: usize,
}

impl Document {
    /// Document with no tokens and empty derived strings.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[DocumentToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Concatenated base text of the caller tokens, breaks included.
    pub fn base_text(&self) -> &str {
        &self.base_text
    }

    /// Annotation text of the caller tokens joined by single spaces.
    pub fn annotation_text(&self) -> &str {
        &self.annotation_text
    }

    pub fn text(&self, script: Script) -> &str {
        match script {
            Script::Base => &self.base_text,
            Script::Annotation => &self.annotation_text,
        }
    }

    /// Inline color markup for one script.
    pub fn markup(&self, script: Script) -> &str {
        match script {
            Script::Base => &self.base_markup,
            Script::Annotation => &self.annotation_markup,
        }
    }

    /// Indentation placeholders inserted at each paragraph start.
    pub fn indent_count(&self) -> usize {
        self.indent_count
    }

    /// Tokens that produce geometry (everything except line breaks).
    pub fn content_tokens(&self) -> impl Iterator<Item = &DocumentToken> {
        self.tokens.iter().filter(|token| !token.is_line_break())
    }
}

/// Builds [`Document`]s from caller tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentBuilder {
    indent_count: usize,
    base_color: Color,
    annotation_color: Color,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            indent_count: 0,
            base_color: Color::DEFAULT_TEXT,
            annotation_color: Color::DEFAULT_TEXT,
        }
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholders inserted at the start and after every line break.
    pub fn indent_count(mut self, count: usize) -> Self {
        self.indent_count = count;
        self
    }

    /// Default color for base text without an override.
    pub fn base_color(mut self, color: Color) -> Self {
        self.base_color = color;
        self
    }

    /// Default color for annotation text without an override.
    pub fn annotation_color(mut self, color: Color) -> Self {
        self.annotation_color = color;
        self
    }

    /// Build from caller tokens. An empty slice yields an empty document.
    pub fn build(&self, tokens: &[Token]) -> Document {
        if tokens.is_empty() {
            return Document {
                indent_count: self.indent_count,
                ..Document::default()
            };
        }

        let breaks = tokens.iter().filter(|token| token.is_line_break()).count();
        let mut doc_tokens = Vec::with_capacity(tokens.len() + self.indent_count * (breaks + 1));
        let mut base_text = String::new();
        let mut annotation_text = String::new();

        self.push_indent(&mut doc_tokens);
        for (index, token) in tokens.iter().enumerate() {
            base_text.push_str(&token.base);
            if index > 0 {
                annotation_text.push(' ');
            }
            annotation_text.push_str(&token.annotation);

            let kind = token.kind();
            let (base, annotation) = match kind {
                TokenKind::LineBreak => (LINE_BREAK.to_string(), LINE_BREAK.to_string()),
                _ => (token.base.clone(), token.annotation.clone()),
            };
            let base_override = token.base_color.and_then(Color::as_override);
            let annotation_override = token.annotation_color.and_then(Color::as_override);
            doc_tokens.push(DocumentToken {
                kind,
                base,
                annotation,
                base_override,
                annotation_override,
                base_color: base_override.unwrap_or(self.base_color),
                annotation_color: annotation_override.unwrap_or(self.annotation_color),
                source_index: Some(index),
            });
            if kind == TokenKind::LineBreak {
                self.push_indent(&mut doc_tokens);
            }
        }

        let base_markup = to_markup(&doc_tokens, Script::Base);
        let annotation_markup = to_markup(&doc_tokens, Script::Annotation);
        log::debug!(
            "built document: {} caller tokens -> {} tokens (indent={})",
            tokens.len(),
            doc_tokens.len(),
            self.indent_count
        );
        Document {
            tokens: doc_tokens,
            base_text,
            annotation_text,
            base_markup,
            annotation_markup,
            indent_count: self.indent_count,
        }
    }

    /// Pair `base` characters with space-separated `annotation` pieces and
    /// build. `None` on either side yields an empty document.
    pub fn build_from_text(&self, base: Option<&str>, annotation: Option<&str>) -> Document {
        match (base, annotation) {
            (Some(base), Some(annotation)) => self.build(&pair_text(base, annotation)),
            _ => self.build(&[]),
        }
    }

    fn push_indent(&self, out: &mut Vec<DocumentToken>) {
        for _ in 0..self.indent_count {
            out.push(DocumentToken::placeholder(
                self.base_color,
                self.annotation_color,
            ));
        }
    }
}
