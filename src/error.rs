//! Error types for termglass.

use std::fmt;
use std::io;

/// Result type alias for termglass operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for termglass operations.
///
/// Only setup and teardown can fail. Once the main loop is running, drawing
/// and input handling absorb bad data instead of returning errors.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal operations.
    Io(io::Error),
    /// Terminal reported an unusable size.
    InvalidDimensions { width: u32, height: u32 },
    /// Standard output is not attached to a terminal.
    NotATerminal,
    /// The background input thread could not be started or stopped.
    InputThread(String),
    /// A session worker could not be started or panicked.
    Session(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::NotATerminal => write!(f, "stdout is not a terminal"),
            Self::InputThread(msg) => write!(f, "input thread error: {msg}"),
            Self::Session(msg) => write!(f, "session worker error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
