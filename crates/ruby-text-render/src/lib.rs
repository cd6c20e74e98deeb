//! Ruby layout engine, paragraph layout, render IR and view facade for
//! `ruby-text`.

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

mod config;
mod metrics;
mod paragraph;
mod render_ir;
mod renderer;
mod ruby_layout;
mod view;

pub use config::{load_style_file, style_from_json, style_to_json, StyleLoadError};
pub use metrics::{is_wide_char, HeuristicMeasurer, LineMetrics, TextMeasurer};
pub use paragraph::{
    GreedyParagraphLayouter, LineRun, ParagraphLayout, ParagraphLayouter, ParagraphLine,
    ParagraphRequest,
};
pub use render_ir::{
    DrawCommand, LineCommand, PositionedToken, Rect, RectCommand, RubyLayout, TextCommand,
};
pub use renderer::{
    execute_commands, paragraph_commands, ruby_commands, AnnotationEcho, DrawSurface,
    RecordingSurface, RenderOptions,
};
pub use ruby_layout::{
    RubyLayoutEngine, RubyLayoutParams, SizeConstraint, ANNOTATION_HEIGHT_PROBE,
    BASE_HEIGHT_PROBE,
};
pub use view::{Insets, MeasuredContent, MeasuredSize, RubyTextView};
