//! Byte-at-a-time terminal input parser.
//!
//! The parser is a small state machine fed one byte at a time, so sequences
//! split across reads are reassembled without lookahead:
//!
//! - **Ground**: printable ASCII and control bytes map directly to key
//!   events, multi-byte UTF-8 is collected into one character, ESC starts an
//!   escape sequence.
//! - **Escape**: bytes accumulate until the sequence is recognized (SGR
//!   mouse report, CSI cursor/function key, SS3 function key, Alt+key) or
//!   grows past [`MAX_SEQUENCE_LEN`], in which case it is dropped.
//!
//! Unknown or malformed sequences never surface as errors; they are
//! discarded and parsing continues in the ground state.
//!
//! # Examples
//!
//! ```
//! use termglass::input::{Event, InputParser, KeyCode};
//! use termglass::terminal::{MouseButton, MouseEventKind};
//!
//! let mut parser = InputParser::new();
//! let events = parser.parse_all(b"\x1b[<0;10;5M\x1b[A");
//!
//! let Event::Mouse(mouse) = events[0] else { panic!() };
//! assert_eq!((mouse.x, mouse.y), (10, 5));
//! assert_eq!(mouse.button, MouseButton::Left);
//! assert_eq!(mouse.kind, MouseEventKind::Press);
//!
//! assert_eq!(events[1].key().map(|k| k.code), Some(KeyCode::Up));
//! ```

use crate::input::event::Event;
use crate::input::keyboard::{KeyCode, KeyEvent, KeyModifiers};
use crate::terminal::{MouseButton, MouseEvent, MouseEventKind};

/// Escape sequences longer than this are discarded.
pub const MAX_SEQUENCE_LEN: usize = 64;

const ESC: u8 = 0x1b;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Ground,
    Escape,
    Utf8,
}

/// Incremental input parser.
#[derive(Clone, Debug, Default)]
pub struct InputParser {
    state: State,
    seq: Vec<u8>,
    utf8: [u8; 4],
    utf8_len: usize,
    utf8_need: usize,
}

impl InputParser {
    /// Create a new input parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seq: Vec::with_capacity(MAX_SEQUENCE_LEN + 1),
            ..Self::default()
        }
    }

    /// Whether a sequence or character is partially accumulated.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state != State::Ground
    }

    /// Drop any partial sequence.
    ///
    /// Called after a terminal resize, when a sequence may have been cut in
    /// half.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.seq.clear();
        self.utf8_len = 0;
        self.utf8_need = 0;
    }

    /// Resolve a pending lone ESC as the Escape key.
    ///
    /// The reader calls this when no further byte arrived within a short
    /// window. Longer partial sequences are left alone; a slow link may
    /// still deliver the rest.
    pub fn flush_timeout(&mut self) -> Option<Event> {
        if self.state == State::Escape && self.seq.len() == 1 {
            self.reset();
            return Some(KeyEvent::key(KeyCode::Esc).into());
        }
        None
    }

    /// Parse a whole chunk, collecting every completed event.
    pub fn parse_all(&mut self, bytes: &[u8]) -> Vec<Event> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Feed one byte; returns an event when it completes one.
    pub fn feed(&mut self, byte: u8) -> Option<Event> {
        match self.state {
            State::Ground => self.feed_ground(byte),
            State::Utf8 => self.feed_utf8(byte),
            State::Escape => self.feed_escape(byte),
        }
    }

    fn feed_ground(&mut self, byte: u8) -> Option<Event> {
        match byte {
            ESC => {
                self.seq.clear();
                self.seq.push(ESC);
                self.state = State::Escape;
                None
            }
            b'\r' => Some(KeyEvent::key(KeyCode::Enter).into()),
            b'\t' => Some(KeyEvent::key(KeyCode::Tab).into()),
            0x01..=0x1a => {
                // Ctrl+A through Ctrl+Z
                let c = (byte - 1 + b'a') as char;
                Some(KeyEvent::with_ctrl(KeyCode::Char(c)).into())
            }
            0x7f => Some(KeyEvent::key(KeyCode::Backspace).into()),
            0x20..=0x7e => Some(KeyEvent::char(byte as char).into()),
            0xc2..=0xf4 => {
                self.utf8[0] = byte;
                self.utf8_len = 1;
                self.utf8_need = match byte {
                    0xc2..=0xdf => 2,
                    0xe0..=0xef => 3,
                    _ => 4,
                };
                self.state = State::Utf8;
                None
            }
            _ => None,
        }
    }

    fn feed_utf8(&mut self, byte: u8) -> Option<Event> {
        if byte & 0xc0 != 0x80 {
            // Truncated character; start over with this byte
            self.reset();
            return self.feed(byte);
        }
        self.utf8[self.utf8_len] = byte;
        self.utf8_len += 1;
        if self.utf8_len < self.utf8_need {
            return None;
        }
        let decoded = std::str::from_utf8(&self.utf8[..self.utf8_len])
            .ok()
            .and_then(|s| s.chars().next());
        self.reset();
        decoded.map(|c| KeyEvent::char(c).into())
    }

    fn feed_escape(&mut self, byte: u8) -> Option<Event> {
        self.seq.push(byte);

        if self.seq.len() == 2 {
            return match byte {
                b'[' | b'O' => None,
                ESC => {
                    // First ESC was a key press; the second starts anew
                    self.seq.truncate(1);
                    Some(KeyEvent::key(KeyCode::Esc).into())
                }
                0x20..=0x7e => {
                    self.reset();
                    Some(KeyEvent::with_alt(KeyCode::Char(byte as char)).into())
                }
                _ => {
                    self.reset();
                    Some(KeyEvent::key(KeyCode::Esc).into())
                }
            };
        }

        if self.seq[1] == b'O' {
            self.reset();
            return parse_ss3(byte);
        }

        if (0x40..=0x7e).contains(&byte) {
            let seq = std::mem::take(&mut self.seq);
            let event = parse_csi(&seq);
            self.seq = seq;
            self.reset();
            return event;
        }

        if self.seq.len() > MAX_SEQUENCE_LEN {
            self.reset();
        }
        None
    }
}

/// SS3 sequences (`ESC O x`): F1-F4 and application-mode arrows.
fn parse_ss3(byte: u8) -> Option<Event> {
    let code = match byte {
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return None,
    };
    Some(KeyEvent::key(code).into())
}

/// Complete CSI sequence `ESC [ params final`.
fn parse_csi(seq: &[u8]) -> Option<Event> {
    let (&final_byte, body) = seq.split_last()?;
    let params = body.get(2..)?;

    match final_byte {
        b'M' | b'm' => match params.split_first() {
            Some((b'<', rest)) => parse_sgr_mouse(rest, final_byte == b'M'),
            _ => None,
        },
        b'A' => modified_key(params, KeyCode::Up),
        b'B' => modified_key(params, KeyCode::Down),
        b'C' => modified_key(params, KeyCode::Right),
        b'D' => modified_key(params, KeyCode::Left),
        b'H' => modified_key(params, KeyCode::Home),
        b'F' => modified_key(params, KeyCode::End),
        b'~' => parse_tilde_key(params),
        _ => None,
    }
}

/// Split `a;b;c` into numbers; any non-numeric part yields `None`.
fn parse_numbers(params: &[u8]) -> Option<Vec<u16>> {
    if params.is_empty() {
        return Some(Vec::new());
    }
    params
        .split(|&b| b == b';')
        .map(|part| std::str::from_utf8(part).ok()?.parse::<u16>().ok())
        .collect()
}

/// Cursor keys with an optional `1;N` modifier parameter.
fn modified_key(params: &[u8], code: KeyCode) -> Option<Event> {
    let nums = parse_numbers(params)?;
    let modifiers = nums
        .get(1)
        .map_or(KeyModifiers::empty(), |&m| KeyModifiers::from_xterm_param(m));
    Some(KeyEvent::new(code, modifiers).into())
}

/// `ESC [ n ~` and `ESC [ n ; m ~` keys.
fn parse_tilde_key(params: &[u8]) -> Option<Event> {
    let nums = parse_numbers(params)?;
    let code = match nums.first()? {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11 => KeyCode::F(1),
        12 => KeyCode::F(2),
        13 => KeyCode::F(3),
        14 => KeyCode::F(4),
        15 => KeyCode::F(5),
        17 => KeyCode::F(6),
        18 => KeyCode::F(7),
        19 => KeyCode::F(8),
        20 => KeyCode::F(9),
        21 => KeyCode::F(10),
        23 => KeyCode::F(11),
        24 => KeyCode::F(12),
        _ => return None,
    };
    let modifiers = nums
        .get(1)
        .map_or(KeyModifiers::empty(), |&m| KeyModifiers::from_xterm_param(m));
    Some(KeyEvent::new(code, modifiers).into())
}

/// SGR mouse report body `b;x;y` (after `ESC [ <`).
fn parse_sgr_mouse(params: &[u8], pressed: bool) -> Option<Event> {
    let nums = parse_numbers(params)?;
    let [cb, x, y] = nums.as_slice() else {
        return None;
    };
    let (button, kind) = decode_sgr_button(*cb, pressed)?;
    let (shift, alt, ctrl) = decode_sgr_modifiers(*cb);
    Some(
        MouseEvent::new(*x, *y, button, kind)
            .with_modifiers(shift, ctrl, alt)
            .into(),
    )
}

/// Decode the SGR button byte.
///
/// Low two bits select the button (0 left, 1 middle, 2 right, 3 none),
/// bit 32 marks motion, bit 64 the wheel (64 up, 65 down). Horizontal wheel
/// codes are not reported.
#[must_use]
pub fn decode_sgr_button(cb: u16, pressed: bool) -> Option<(MouseButton, MouseEventKind)> {
    let low = cb & 0b11;
    if cb & 64 != 0 {
        return match low {
            0 => Some((MouseButton::None, MouseEventKind::ScrollUp)),
            1 => Some((MouseButton::None, MouseEventKind::ScrollDown)),
            _ => None,
        };
    }

    let button = match low {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::None,
    };

    let kind = if cb & 32 != 0 {
        if button == MouseButton::None {
            MouseEventKind::Move
        } else {
            MouseEventKind::Drag
        }
    } else if pressed {
        MouseEventKind::Press
    } else {
        MouseEventKind::Release
    };
    Some((button, kind))
}

/// Modifier bits of the SGR button byte as `(shift, alt, ctrl)`.
#[must_use]
pub fn decode_sgr_modifiers(cb: u16) -> (bool, bool, bool) {
    (cb & 4 != 0, cb & 8 != 0, cb & 16 != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bytes: &[u8]) -> Vec<Event> {
        InputParser::new().parse_all(bytes)
    }

    fn single_key(bytes: &[u8]) -> KeyEvent {
        let events = parse(bytes);
        assert_eq!(events.len(), 1, "events: {events:?}");
        *events[0].key().expect("key event")
    }

    fn single_mouse(bytes: &[u8]) -> MouseEvent {
        let events = parse(bytes);
        assert_eq!(events.len(), 1, "events: {events:?}");
        *events[0].mouse().expect("mouse event")
    }

    #[test]
    fn test_parse_char() {
        assert_eq!(single_key(b"a"), KeyEvent::char('a'));
        assert_eq!(single_key(b" "), KeyEvent::char(' '));
        assert_eq!(single_key(b"W"), KeyEvent::char('W'));
    }

    #[test]
    fn test_parse_ctrl_q() {
        let key = single_key(b"\x11");
        assert!(key.matches(KeyCode::Char('q'), KeyModifiers::CTRL));
    }

    #[test]
    fn test_parse_enter_tab_backspace() {
        assert_eq!(single_key(b"\r").code, KeyCode::Enter);
        assert_eq!(single_key(b"\t").code, KeyCode::Tab);
        assert_eq!(single_key(b"\x7f").code, KeyCode::Backspace);
    }

    #[test]
    fn test_parse_utf8() {
        assert_eq!(single_key("é".as_bytes()), KeyEvent::char('é'));
        assert_eq!(single_key("日".as_bytes()), KeyEvent::char('日'));
    }

    #[test]
    fn test_truncated_utf8_is_dropped() {
        let events = parse(&[0xe6, 0x97, b'x']);
        assert_eq!(events, vec![Event::Key(KeyEvent::char('x'))]);
    }

    #[test]
    fn test_parse_arrows() {
        assert_eq!(single_key(b"\x1b[A").code, KeyCode::Up);
        assert_eq!(single_key(b"\x1b[B").code, KeyCode::Down);
        assert_eq!(single_key(b"\x1b[C").code, KeyCode::Right);
        assert_eq!(single_key(b"\x1b[D").code, KeyCode::Left);
        assert_eq!(single_key(b"\x1bOA").code, KeyCode::Up);
    }

    #[test]
    fn test_parse_arrow_with_modifiers() {
        let key = single_key(b"\x1b[1;5C");
        assert_eq!(key.code, KeyCode::Right);
        assert!(key.ctrl());
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(single_key(b"\x1bOP").code, KeyCode::F(1));
        assert_eq!(single_key(b"\x1b[11~").code, KeyCode::F(1));
        assert_eq!(single_key(b"\x1b[15~").code, KeyCode::F(5));
        assert_eq!(single_key(b"\x1b[17~").code, KeyCode::F(6));
        assert_eq!(single_key(b"\x1b[18~").code, KeyCode::F(7));
        assert_eq!(single_key(b"\x1b[19~").code, KeyCode::F(8));
        assert!(parse(b"\x1b[16~").is_empty());
    }

    #[test]
    fn test_parse_alt_key() {
        let key = single_key(b"\x1bx");
        assert_eq!(key.code, KeyCode::Char('x'));
        assert!(key.alt());
    }

    #[test]
    fn test_lone_escape_needs_timeout() {
        let mut parser = InputParser::new();
        assert!(parser.feed(0x1b).is_none());
        assert!(parser.is_pending());
        let key = parser.flush_timeout().and_then(|e| e.key().copied());
        assert_eq!(key.map(|k| k.code), Some(KeyCode::Esc));
        assert!(!parser.is_pending());
        assert!(parser.flush_timeout().is_none());
    }

    #[test]
    fn test_double_escape() {
        let mut parser = InputParser::new();
        let events = parser.parse_all(b"\x1b\x1b[A");
        assert_eq!(events.len(), 2);
        assert!(events[0].key().unwrap().is_esc());
        assert_eq!(events[1].key().unwrap().code, KeyCode::Up);
    }

    #[test]
    fn test_partial_csi_survives_timeout() {
        let mut parser = InputParser::new();
        assert!(parser.parse_all(b"\x1b[<0;1").is_empty());
        assert!(parser.flush_timeout().is_none());
        let events = parser.parse_all(b"0;5M");
        assert_eq!(events.len(), 1);
        assert!(events[0].is_mouse());
    }

    #[test]
    fn test_parse_sgr_mouse_press_and_release() {
        let press = single_mouse(b"\x1b[<0;10;5M");
        assert_eq!((press.x, press.y), (10, 5));
        assert_eq!(press.button, MouseButton::Left);
        assert_eq!(press.kind, MouseEventKind::Press);

        let release = single_mouse(b"\x1b[<0;10;5m");
        assert_eq!(release.kind, MouseEventKind::Release);

        let right = single_mouse(b"\x1b[<2;1;1M");
        assert_eq!(right.button, MouseButton::Right);
    }

    #[test]
    fn test_parse_sgr_mouse_wheel() {
        let up = single_mouse(b"\x1b[<64;3;3M");
        assert_eq!(up.kind, MouseEventKind::ScrollUp);
        assert_eq!((up.x, up.y), (3, 3));
        let down = single_mouse(b"\x1b[<65;3;3M");
        assert_eq!(down.kind, MouseEventKind::ScrollDown);
        assert!(parse(b"\x1b[<66;3;3M").is_empty());
    }

    #[test]
    fn test_parse_sgr_mouse_motion() {
        let drag = single_mouse(b"\x1b[<32;7;8M");
        assert_eq!(drag.kind, MouseEventKind::Drag);
        assert_eq!(drag.button, MouseButton::Left);
        let hover = single_mouse(b"\x1b[<35;7;8M");
        assert_eq!(hover.kind, MouseEventKind::Move);
        assert_eq!(hover.button, MouseButton::None);
    }

    #[test]
    fn test_parse_sgr_mouse_modifiers() {
        let event = single_mouse(b"\x1b[<28;1;1M");
        assert!(event.shift);
        assert!(event.alt);
        assert!(event.ctrl);
    }

    #[test]
    fn test_malformed_mouse_dropped() {
        assert!(parse(b"\x1b[<0;10M").is_empty());
        assert!(parse(b"\x1b[<a;1;1M").is_empty());
        assert!(parse(b"\x1b[<0;1;1;1M").is_empty());
    }

    #[test]
    fn test_sequence_length_bound() {
        let mut bytes = b"\x1b[".to_vec();
        bytes.extend(std::iter::repeat_n(b'1', MAX_SEQUENCE_LEN - 1));
        bytes.extend_from_slice(b"q");
        // the last digit pushes the sequence past the bound; what follows
        // parses from the ground state
        let events = parse(&bytes);
        assert_eq!(events, vec![Event::Key(KeyEvent::char('q'))]);
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut parser = InputParser::new();
        assert!(parser.parse_all(b"\x1b[<0;1").is_empty());
        parser.reset();
        assert_eq!(parser.parse_all(b"x"), vec![Event::Key(KeyEvent::char('x'))]);
    }

    #[test]
    fn test_split_feeds_reassemble() {
        let mut parser = InputParser::new();
        let mut events = Vec::new();
        for chunk in [&b"\x1b"[..], b"[", b"1", b"5", b"~"] {
            events.extend(parser.parse_all(chunk));
        }
        assert_eq!(events, vec![Event::Key(KeyEvent::key(KeyCode::F(5)))]);
    }
}
