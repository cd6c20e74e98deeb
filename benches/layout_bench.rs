use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ruby_text::{DocumentBuilder, DrawMode, Script};
use ruby_text_embedded_graphics::EgTextMeasurer;
use ruby_text_render::{
    GreedyParagraphLayouter, HeuristicMeasurer, ParagraphLayouter, ParagraphRequest,
    RubyLayoutEngine, RubyLayoutParams, RubyTextView, SizeConstraint, TextMeasurer,
};

const VIEW_WIDTH: i32 = 480;

const STORY_BASE: &str = "传说，在很久很久以前，有一种叫“年”的怪兽。它长得可凶啦！\n头上长着长长的角，嘴里龇着尖尖的牙，发起怒来，就会张开血盆大口，哇哇大叫。";
const STORY_ANNOTATION: &str = "chuán shuō ， zài hěn jiǔ hěn jiǔ yǐ qián ， yǒu yī zhǒng jiào “ nián ” de guài shòu 。 tā cháng dé kě xiōng lā ！ \n tóu shàng cháng zhuó cháng cháng de jiǎo ， zuǐ lǐ zī zhuó jiān jiān de yá ， fā qǐ nù lái ， jiù huì zhāng kāi xiě pén dà kǒu ， wā wā dà jiào 。";

struct PeakTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
}

#[global_allocator]
static TRACKER: PeakTracker = PeakTracker {
    current: AtomicUsize::new(0),
    peak: AtomicUsize::new(0),
};

impl PeakTracker {
    fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    fn reset_peak(&self) {
        self.peak.store(self.current(), Ordering::Relaxed);
    }

    fn grow(&self, delta: usize) {
        let now = self.current.fetch_add(delta, Ordering::Relaxed) + delta;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    fn shrink(&self, delta: usize) {
        let _ = self
            .current
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                Some(c.saturating_sub(delta))
            });
    }
}

unsafe impl GlobalAlloc for PeakTracker {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        self.shrink(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                self.grow(new_size - layout.size());
            } else {
                self.shrink(layout.size() - new_size);
            }
        }
        new_ptr
    }
}

#[derive(Clone, Debug)]
struct CaseResult {
    input: String,
    case: String,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    max_ns: u128,
    median_peak_heap_bytes: usize,
    max_peak_heap_bytes: usize,
}

fn median<T: Copy>(sorted: &[T]) -> T {
    sorted[sorted.len() / 2]
}

fn run_case<F>(input: &str, case: &str, warmup: usize, iters: usize, mut op: F) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup {
        black_box(op());
    }

    let mut times = Vec::with_capacity(iters);
    let mut peaks = Vec::with_capacity(iters);
    for _ in 0..iters {
        let baseline = TRACKER.current();
        TRACKER.reset_peak();
        let start = Instant::now();
        black_box(op());
        times.push(start.elapsed().as_nanos());
        peaks.push(TRACKER.peak().saturating_sub(baseline));
    }
    times.sort_unstable();
    peaks.sort_unstable();

    CaseResult {
        input: input.to_string(),
        case: case.to_string(),
        iterations: iters,
        min_ns: times[0],
        median_ns: median(&times),
        max_ns: times[times.len() - 1],
        median_peak_heap_bytes: median(&peaks),
        max_peak_heap_bytes: peaks[peaks.len() - 1],
    }
}

fn repeated(text: &str, sep: &str, times: usize) -> String {
    vec![text; times].join(sep)
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup = if quick { 1 } else { 3 };
    let iters = if quick { 5 } else { 25 };

    println!("# ruby-text layout benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup,
        iters
    );
    println!("input,case,iterations,min_ns,median_ns,max_ns,median_peak_heap_bytes,max_peak_heap_bytes");

    let inputs = [
        ("story", STORY_BASE.to_string(), STORY_ANNOTATION.to_string()),
        (
            "story_x16",
            repeated(STORY_BASE, "\n", 16),
            repeated(STORY_ANNOTATION, " \n ", 16),
        ),
    ];
    let measurers: [(&str, Arc<dyn TextMeasurer>); 2] = [
        ("heuristic", Arc::new(HeuristicMeasurer::new())),
        ("mono", EgTextMeasurer::shared()),
    ];

    let mut results = Vec::new();
    for (key, base, annotation) in &inputs {
        results.push(run_case(key, "build_document", warmup, iters, || {
            DocumentBuilder::new()
                .indent_count(2)
                .build_from_text(Some(base.as_str()), Some(annotation.as_str()))
                .len()
        }));

        let doc = DocumentBuilder::new()
            .indent_count(2)
            .build_from_text(Some(base.as_str()), Some(annotation.as_str()));

        for (measurer_key, measurer) in &measurers {
            let engine = RubyLayoutEngine::new(Arc::clone(measurer));
            let params = RubyLayoutParams {
                width: SizeConstraint::AtMost(VIEW_WIDTH),
                ..RubyLayoutParams::default()
            };
            results.push(run_case(
                key,
                &format!("ruby_layout_{}", measurer_key),
                warmup,
                iters,
                || engine.layout(&doc, &params).tokens.len(),
            ));

            let paragraph = GreedyParagraphLayouter::new(Arc::clone(measurer));
            let request = ParagraphRequest {
                width: VIEW_WIDTH,
                ..ParagraphRequest::default()
            };
            results.push(run_case(
                key,
                &format!("paragraph_layout_{}", measurer_key),
                warmup,
                iters,
                || {
                    paragraph
                        .layout_paragraph(doc.markup(Script::Base), &request)
                        .line_count()
                },
            ));
        }

        results.push(run_case(key, "view_measure_draw_all_modes", warmup, iters, || {
            let mut view = RubyTextView::new(Arc::new(HeuristicMeasurer::new()));
            view.set_data_text(Some(base.as_str()), Some(annotation.as_str()))
                .set_indent_count(2)
                .set_underline(true);
            let mut commands = 0;
            for mode in [
                DrawMode::BaseOnly,
                DrawMode::AnnotationAndBase,
                DrawMode::AnnotationOnly,
            ] {
                view.set_draw_mode(mode);
                view.measure(SizeConstraint::AtMost(VIEW_WIDTH), SizeConstraint::Unbounded);
                commands += view.draw_commands().len();
            }
            commands
        }));
    }

    for r in &results {
        println!(
            "{},{},{},{},{},{},{},{}",
            r.input,
            r.case,
            r.iterations,
            r.min_ns,
            r.median_ns,
            r.max_ns,
            r.median_peak_heap_bytes,
            r.max_peak_heap_bytes
        );
    }
}
