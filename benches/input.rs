//! Input parsing performance benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use termglass::input::{InputParser, InputState, process_bytes};

/// Benchmark key event parsing for various input sequences.
fn bench_key_event_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_parsing");

    let key_sequences: &[(&[u8], &str)] = &[
        (b"a", "single_char"),
        (b"\x1b[A", "arrow_up"),
        (b"\x1b[1;5C", "ctrl_right"),
        (b"\x1bOP", "f1"),
        (b"\x1b[15~", "f5"),
        (b"\x1bx", "alt_x"),
        (b"\xc3\xa9", "utf8_2byte"),
        (b"\r", "enter"),
    ];

    for (seq, name) in key_sequences {
        group.bench_function(*name, |b| {
            let mut parser = InputParser::new();
            b.iter(|| parser.parse_all(black_box(seq)));
        });
    }

    group.finish();
}

/// Benchmark SGR mouse parsing.
fn bench_mouse_event_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("mouse_parsing");

    let mouse_sequences: &[(&[u8], &str)] = &[
        (b"\x1b[<0;10;20M", "button_press"),
        (b"\x1b[<0;10;20m", "button_release"),
        (b"\x1b[<32;50;30M", "drag"),
        (b"\x1b[<35;50;30M", "move"),
        (b"\x1b[<64;10;20M", "scroll_up"),
    ];

    for (seq, name) in mouse_sequences {
        group.bench_function(*name, |b| {
            let mut parser = InputParser::new();
            b.iter(|| parser.parse_all(black_box(seq)));
        });
    }

    group.finish();
}

/// Benchmark a drag burst folded into the shared input state.
fn bench_drag_stream_into_state(c: &mut Criterion) {
    let mut stream = Vec::new();
    stream.extend_from_slice(b"\x1b[<0;10;10M");
    for i in 0..200u16 {
        stream.extend_from_slice(format!("\x1b[<32;{};{}M", 10 + i % 50, 10 + i % 20).as_bytes());
    }
    stream.extend_from_slice(b"\x1b[<0;60;30m");

    let (input, _sink) = InputState::channel();
    let sink = input.sink();
    c.bench_function("drag_stream_200_reports", |b| {
        let mut parser = InputParser::new();
        b.iter(|| {
            process_bytes(&mut parser, &sink, black_box(&stream));
            black_box(input.consume_drag_delta())
        });
    });
}

criterion_group!(
    benches,
    bench_key_event_parsing,
    bench_mouse_event_parsing,
    bench_drag_stream_into_state
);
criterion_main!(benches);
