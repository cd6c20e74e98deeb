use ruby_text::{Color, DocumentToken, Script, UnderlineStyle};
use serde::Serialize;

/// Integer rectangle with exclusive right/bottom edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    /// Left x.
    pub left: i32,
    /// Top y.
    pub top: i32,
    /// Right x (exclusive).
    pub right: i32,
    /// Bottom y (exclusive).
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Translated copy.
    pub const fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            left: self.left.saturating_add(dx),
            top: self.top.saturating_add(dy),
            right: self.right.saturating_add(dx),
            bottom: self.bottom.saturating_add(dy),
        }
    }

    /// Horizontal center, rounded down.
    pub const fn center_x(&self) -> i32 {
        self.left + self.width() / 2
    }
}

/// A document token with its computed geometry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PositionedToken {
    /// Token being placed.
    pub token: DocumentToken,
    /// 0-based visual line.
    pub line: usize,
    /// 0-based position within the line.
    pub column: usize,
    /// Annotation text box.
    pub annotation_box: Rect,
    /// Base text box, directly below the annotation box.
    pub base_box: Rect,
    /// Union of the annotation and base boxes.
    pub combined_box: Rect,
}

/// Result of one ruby layout pass, in content-local coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RubyLayout {
    /// Geometry for every non-break token, in document order.
    pub tokens: Vec<PositionedToken>,
    /// Content width after applying the width constraint.
    pub measured_width: i32,
    /// Content height after applying the height constraint.
    pub measured_height: i32,
    /// Number of visual lines (0 for an empty document).
    pub line_count: usize,
    /// Probe height of the base script at the base size.
    pub base_height: i32,
    /// Probe height of the annotation script at the annotation size.
    pub annotation_height: i32,
}

impl RubyLayout {
    /// Tokens placed on `line`.
    pub fn line(&self, line: usize) -> impl Iterator<Item = &PositionedToken> {
        self.tokens.iter().filter(move |token| token.line == line)
    }
}

/// Text draw command.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextCommand {
    /// Left x.
    pub x: i32,
    /// Baseline y.
    pub baseline_y: i32,
    /// Content.
    pub text: String,
    /// Fill color.
    pub color: Color,
    /// Font size in px.
    pub font_size: f32,
    /// Script the text belongs to, for backends that pick fonts per script.
    pub script: Script,
}

/// Straight line command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LineCommand {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Stroke color.
    pub color: Color,
    /// Stroke width in px.
    pub width: u32,
    /// Stroke pattern.
    pub style: UnderlineStyle,
}

/// Rectangle outline command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RectCommand {
    pub rect: Rect,
    /// Stroke color.
    pub color: Color,
}

/// Backend-agnostic drawing command.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Draw text.
    Text(TextCommand),
    /// Draw an underline or other straight line.
    Line(LineCommand),
    /// Outline a rectangle.
    Rect(RectCommand),
}
