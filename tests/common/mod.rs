#![allow(dead_code)] // Each test binary uses a different subset
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry

use termglass::input::{InputParser, InputState, process_bytes};

/// Replay a headless terminal's output through a VT100 emulator.
pub fn screen(output: &[u8], width: u16, height: u16) -> vt100::Parser {
    let mut parser = vt100::Parser::new(height, width, 0);
    parser.process(output);
    parser
}

/// Text of one emulated screen row.
pub fn row(parser: &vt100::Parser, y: u16) -> String {
    let (_, cols) = parser.screen().size();
    (0..cols)
        .map(|x| {
            parser
                .screen()
                .cell(y, x)
                .map_or(" ".to_string(), |c| {
                    let s = c.contents();
                    if s.is_empty() { " ".to_string() } else { s }
                })
        })
        .collect()
}

/// SGR mouse report for a 1-based cell.
pub fn sgr(cb: u16, x: u16, y: u16, pressed: bool) -> Vec<u8> {
    let fin = if pressed { 'M' } else { 'm' };
    format!("\x1b[<{cb};{x};{y}{fin}").into_bytes()
}

/// Decode `bytes` as terminal input and fold it into `input`.
pub fn feed(input: &InputState, bytes: &[u8]) {
    let mut parser = InputParser::new();
    process_bytes(&mut parser, &input.sink(), bytes);
    if let Some(event) = parser.flush_timeout() {
        input.sink().apply(event);
    }
}
