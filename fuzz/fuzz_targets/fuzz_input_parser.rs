//! Fuzz target for the terminal input parser.
//!
//! Arbitrary byte streams must never panic, and the parser must always be
//! able to return to the ground state.

#![no_main]

use libfuzzer_sys::fuzz_target;
use termglass::input::{InputParser, InputState, MAX_SEQUENCE_LEN, process_bytes};

fuzz_target!(|data: &[u8]| {
    let mut parser = InputParser::new();
    let events = parser.parse_all(data);
    assert!(events.len() <= data.len());

    // A pending sequence is bounded and resolves or clears on request
    let _ = parser.flush_timeout();
    parser.reset();
    assert!(!parser.is_pending());

    // The same bytes split at every chunk size fold into state without panicking
    let (input, _sink) = InputState::channel();
    let sink = input.sink();
    for chunk in data.chunks(MAX_SEQUENCE_LEN / 4) {
        process_bytes(&mut parser, &sink, chunk);
    }
    let _ = input.drain_keys(usize::MAX);
    let _ = input.consume_drag_delta();
    let _ = input.consume_wheel();
});
