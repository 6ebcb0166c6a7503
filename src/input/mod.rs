//! Terminal input: escape-sequence parsing, the background reader thread and
//! the mailbox it shares with the main loop.
//!
//! ```text
//! stdin ─▶ InputReader thread ─▶ InputParser ─▶ InputSink ══▶ InputState ─▶ MainLoop
//!                                              (keys: channel, mouse: atomics)
//! ```

mod event;
mod keyboard;
mod parser;
mod reader;
mod state;

pub use event::Event;
pub use keyboard::{KeyCode, KeyEvent, KeyModifiers};
pub use parser::{InputParser, MAX_SEQUENCE_LEN, decode_sgr_button, decode_sgr_modifiers};
pub use reader::{ESCAPE_TIMEOUT, InputReader, STOP_TIMEOUT, process_bytes};
pub use state::{InputSink, InputState};

pub use crate::terminal::{MouseButton, MouseButtons, MouseEvent, MouseEventKind};
