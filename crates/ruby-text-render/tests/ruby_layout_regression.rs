use std::sync::Arc;

use ruby_text::{Document, DocumentBuilder, DrawMode, TokenKind};
use ruby_text_render::{
    DrawCommand, HeuristicMeasurer, RecordingSurface, RubyLayout, RubyLayoutEngine,
    RubyLayoutParams, RubyTextView, SizeConstraint, TextMeasurer,
};

const STORY_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。它长得可凶啦！\n头上长着长长的角，嘴里龇着尖尖的牙，发起怒来，就会张开血盆大口，哇哇大叫。";
const STORY_ANNOTATION: &str = "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。 tā cháng dé kě xiōng lā ！ \n tóu shàng cháng zhuó cháng cháng de jiǎo ， zuǐ lǐ zī zhuó jiān jiān de yá ， fā qǐ nù lái ， jiù huì zhāng kāi xiě pén dà kǒu ， wā wā dà jiào 。";

fn measurer() -> Arc<dyn TextMeasurer> {
    Arc::new(HeuristicMeasurer::new())
}

fn story(indent: usize) -> Document {
    DocumentBuilder::new()
        .indent_count(indent)
        .build_from_text(Some(STORY_BASE), Some(STORY_ANNOTATION))
}

fn params(width: i32) -> RubyLayoutParams {
    RubyLayoutParams {
        width: SizeConstraint::AtMost(width),
        ..RubyLayoutParams::default()
    }
}

fn assert_wrap_invariant(layout: &RubyLayout, available: i32) {
    for line in 0..layout.line_count {
        let tokens: Vec<_> = layout.line(line).collect();
        if tokens.len() < 2 {
            continue;
        }
        for pair in tokens.windows(2) {
            assert!(pair[0].column + 1 == pair[1].column);
            assert!(pair[0].combined_box.right <= pair[1].combined_box.left);
        }
        let right = tokens
            .iter()
            .map(|t| t.combined_box.right)
            .max()
            .unwrap_or(0);
        assert!(
            right <= available,
            "line {} ends at {} beyond {}",
            line,
            right,
            available
        );
    }
}

#[test]
fn story_positions_every_non_break_token() {
    let engine = RubyLayoutEngine::new(measurer());
    for indent in [0, 2] {
        let doc = story(indent);
        let layout = engine.layout(&doc, &params(320));
        let expected = doc
            .tokens()
            .iter()
            .filter(|t| t.kind != TokenKind::LineBreak)
            .count();
        assert_eq!(layout.tokens.len(), expected);
    }
}

#[test]
fn story_wraps_within_width_at_several_sizes() {
    let engine = RubyLayoutEngine::new(measurer());
    let doc = story(2);
    for width in [60, 120, 241, 320, 480, 1024] {
        let layout = engine.layout(&doc, &params(width));
        assert_wrap_invariant(&layout, width);
        assert!(layout.measured_width <= width);
    }
}

#[test]
fn narrower_width_never_uses_fewer_lines() {
    let engine = RubyLayoutEngine::new(measurer());
    let doc = story(0);
    let mut previous = usize::MAX;
    for width in [80, 160, 320, 640, 1280] {
        let lines = engine.layout(&doc, &params(width)).line_count;
        assert!(lines <= previous, "width {} produced {} lines", width, lines);
        previous = lines;
    }
}

#[test]
fn narrower_box_is_centered_in_its_pair() {
    let engine = RubyLayoutEngine::new(measurer());
    let layout = engine.layout(&story(0), &params(400));
    for placed in &layout.tokens {
        let (a, b) = (placed.annotation_box, placed.base_box);
        let (wide, narrow) = if a.width() >= b.width() { (a, b) } else { (b, a) };
        assert_eq!(narrow.left - wide.left, (wide.width() - narrow.width()) / 2);
        assert_eq!(placed.combined_box.left, wide.left);
        assert_eq!(b.top, a.bottom + layout_pair_spacing());
    }
}

fn layout_pair_spacing() -> i32 {
    RubyLayoutParams::default().pair_spacing
}

#[test]
fn explicit_break_restarts_with_indent_boxes() {
    let engine = RubyLayoutEngine::new(measurer());
    let layout = engine.layout(&story(2), &params(10_000));
    assert_eq!(layout.line_count, 2);
    for line in 0..2 {
        let kinds: Vec<_> = layout.line(line).take(3).map(|t| t.token.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Indent, TokenKind::Indent, TokenKind::Content]
        );
    }
    let first = layout.line(0).next().map(|t| t.annotation_box.top);
    let second = layout.line(1).next().map(|t| t.annotation_box.top);
    let advance = layout.base_height
        + layout.annotation_height
        + RubyLayoutParams::default().pair_spacing
        + RubyLayoutParams::default().vertical_spacing;
    assert_eq!(second.zip(first).map(|(s, f)| s - f), Some(advance));
}

#[test]
fn repeated_layout_is_bit_identical() {
    let engine = RubyLayoutEngine::new(measurer());
    let doc = story(1);
    let p = params(300);
    let first = engine.layout(&doc, &p);
    for _ in 0..3 {
        assert_eq!(engine.layout(&doc, &p), first);
    }
}

#[test]
fn view_draws_each_mode_without_overlapping_lines() {
    let mut view = RubyTextView::new(measurer());
    view.set_data_text(Some(STORY_BASE), Some(STORY_ANNOTATION))
        .set_indent_count(2)
        .set_underline(true);
    for mode in [
        DrawMode::BaseOnly,
        DrawMode::AnnotationAndBase,
        DrawMode::AnnotationOnly,
    ] {
        view.set_draw_mode(mode);
        let size = view.measure(SizeConstraint::AtMost(360), SizeConstraint::Unbounded);
        assert!(size.width <= 360);
        let mut surface = RecordingSurface::new();
        view.draw(&mut surface).unwrap();
        assert!(surface.texts().count() > 0, "{:?} drew no text", mode);
        assert!(surface.lines().count() > 0, "{:?} drew no underline", mode);
        let max_baseline = surface
            .texts()
            .map(|t| t.baseline_y)
            .max()
            .unwrap_or(0);
        assert!(max_baseline <= size.height, "{:?} overflows its height", mode);
    }
}

#[test]
fn ruby_commands_serialize_as_json() {
    let mut view = RubyTextView::new(measurer());
    view.set_draw_mode(DrawMode::AnnotationAndBase)
        .set_data_text(Some("你好"), Some("nǐ hǎo"));
    let commands = view.draw_commands();
    let json = serde_json::to_string(&commands).unwrap();
    assert!(json.contains("\"text\":\"nǐ\""));
    assert!(commands
        .iter()
        .all(|c| matches!(c, DrawCommand::Text(_))));
}
