//! Document model, inline markup and style state for ruby-annotated text.
//!
//! `ruby-text` turns pairs of base text (e.g. hanzi) and phonetic annotation
//! (e.g. pinyin) into a normalized [`Document`], the inline color markup used
//! by paragraph layout, and the [`RubyStyle`] state that drives layout and
//! drawing. Geometry and rendering live in `ruby-text-render`.
//!
//! ```
//! use ruby_text::{DocumentBuilder, Script};
//!
//! let doc = DocumentBuilder::new()
//!     .indent_count(1)
//!     .build_from_text(Some("你好"), Some("nǐ hǎo"));
//! assert_eq!(doc.len(), 3);
//! assert_eq!(doc.annotation_text(), "nǐ hǎo");
//! assert_eq!(doc.markup(Script::Annotation), "\u{3000}nǐ hǎo");
//! ```

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

mod color;
mod document;
mod markup;
mod style;
mod token;

pub use color::Color;
pub use document::{Document, DocumentBuilder, DocumentToken};
pub use markup::{
    parse_markup, parse_markup_lossy, plain_text, to_markup, MarkupError, MarkupRun, BREAK_TAG,
};
pub use style::{
    DrawMode, Invalidation, RubyStyle, UnderlineConfig, UnderlineStyle, DEFAULT_ANNOTATION_RATIO,
    DEFAULT_BASE_FONT_SIZE, DEFAULT_HORIZONTAL_SPACING,
};
pub use token::{pair_text, Script, Token, TokenKind, INDENT_CHAR, INDENT_PLACEHOLDER, LINE_BREAK};
