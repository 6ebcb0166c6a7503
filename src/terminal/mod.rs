//! Terminal platform adapter.
//!
//! [`Terminal`] owns the output stream and the terminal modes the engine
//! switches on for the duration of a run (raw input, alternate screen,
//! hidden cursor, SGR mouse reporting). Every mode is restored on
//! [`cleanup`](Terminal::cleanup), which also runs on drop.

mod mouse;
mod raw;

pub use mouse::{MouseButton, MouseButtons, MouseEvent, MouseEventKind};
pub use raw::{RawModeGuard, enable_raw_mode, is_tty, poll_readable, read_fd, terminal_size};

#[cfg(test)]
pub(crate) use raw::create_pipe;

use crate::ansi::{FrameEncoder, sequences};
use crate::buffer::CellBuffer;
use crate::config::ColorMode;
use crate::event::{LogLevel, emit_log};
use std::io::{self, Write};

/// Size used when the real terminal cannot be queried.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Where the terminal size comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SizeSource {
    /// `TIOCGWINSZ` on stdout.
    Tty,
    /// Fixed size set by the caller (tests, offscreen rendering).
    Fixed,
}

/// Terminal state manager.
pub struct Terminal<W: Write> {
    writer: W,
    encoder: FrameEncoder,
    width: u16,
    height: u16,
    size_source: SizeSource,
    pending_size: Option<(u16, u16)>,
    alt_screen: bool,
    mouse_enabled: bool,
    cursor_hidden: bool,
    raw_mode_guard: Option<RawModeGuard>,
}

impl<W: Write> Terminal<W> {
    /// Create a terminal writing to `writer`, sized from the real TTY.
    pub fn new(writer: W) -> Self {
        let (width, height) = terminal_size().unwrap_or(FALLBACK_SIZE);
        Self::with_source(writer, width, height, SizeSource::Tty)
    }

    /// Create a terminal with a fixed size that never probes the TTY.
    pub fn headless(writer: W, width: u16, height: u16) -> Self {
        Self::with_source(writer, width.max(1), height.max(1), SizeSource::Fixed)
    }

    fn with_source(writer: W, width: u16, height: u16, size_source: SizeSource) -> Self {
        Self {
            writer,
            encoder: FrameEncoder::default(),
            width,
            height,
            size_source,
            pending_size: None,
            alt_screen: false,
            mouse_enabled: false,
            cursor_hidden: false,
            raw_mode_guard: None,
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Current size as `(columns, rows)`.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// The underlying writer.
    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Change the size of a headless terminal.
    ///
    /// The next [`refresh_size`](Self::refresh_size) reports it as a resize.
    pub fn set_size(&mut self, width: u16, height: u16) {
        if self.size_source == SizeSource::Fixed {
            self.pending_size = Some((width.max(1), height.max(1)));
        }
    }

    /// Re-query the size; returns true when it changed.
    pub fn refresh_size(&mut self) -> bool {
        let next = match self.size_source {
            SizeSource::Tty => match terminal_size() {
                Ok(size) => size,
                Err(_) => return false,
            },
            SizeSource::Fixed => match self.pending_size.take() {
                Some(size) => size,
                None => return false,
            },
        };
        if next == (self.width, self.height) {
            return false;
        }
        self.width = next.0;
        self.height = next.1;
        true
    }

    /// Check if terminal is in raw mode.
    #[must_use]
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode_guard.is_some()
    }

    /// Enter raw mode on stdin.
    pub fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode_guard.is_none() {
            self.raw_mode_guard = Some(enable_raw_mode()?);
        }
        Ok(())
    }

    /// Exit raw mode.
    pub fn exit_raw_mode(&mut self) {
        self.raw_mode_guard = None;
    }

    /// Switch into visualization mode: raw input (best effort), alternate
    /// screen, hidden cursor, mouse reporting, cleared screen.
    pub fn enter(&mut self) -> crate::Result<()> {
        if self.size_source == SizeSource::Tty {
            if let Err(err) = self.enter_raw_mode() {
                emit_log(
                    LogLevel::Warn,
                    &format!("raw mode unavailable, continuing without it: {err}"),
                );
            }
        }
        self.enter_alt_screen()?;
        self.hide_cursor()?;
        self.enable_mouse()?;
        self.clear()?;
        self.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.encoder.color_mode()
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.encoder.set_color_mode(mode);
    }

    /// Enter alternate screen buffer.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if !self.alt_screen {
            self.writer.write_all(sequences::ALT_SCREEN_ON.as_bytes())?;
            self.alt_screen = true;
        }
        Ok(())
    }

    /// Leave alternate screen buffer.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        if self.alt_screen {
            self.writer
                .write_all(sequences::ALT_SCREEN_OFF.as_bytes())?;
            self.alt_screen = false;
        }
        Ok(())
    }

    /// Enable mouse tracking.
    ///
    /// Always re-sends the sequence; some terminals drop the mode on resize.
    pub fn enable_mouse(&mut self) -> io::Result<()> {
        self.writer.write_all(sequences::MOUSE_ON.as_bytes())?;
        self.mouse_enabled = true;
        Ok(())
    }

    /// Disable mouse tracking.
    pub fn disable_mouse(&mut self) -> io::Result<()> {
        if self.mouse_enabled {
            self.writer.write_all(sequences::MOUSE_OFF.as_bytes())?;
            self.mouse_enabled = false;
        }
        Ok(())
    }

    /// Hide cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_HIDE.as_bytes())?;
            self.cursor_hidden = true;
        }
        Ok(())
    }

    /// Show cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_SHOW.as_bytes())?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Clear the screen and home the cursor.
    pub fn clear(&mut self) -> io::Result<()> {
        self.writer.write_all(sequences::CLEAR_SCREEN.as_bytes())?;
        self.writer.write_all(sequences::CURSOR_HOME.as_bytes())?;
        Ok(())
    }

    /// Flush a whole frame as one write.
    pub fn draw(&mut self, buffer: &CellBuffer) -> io::Result<()> {
        let bytes = self.encoder.encode(buffer);
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    /// Flush the output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Restore every mode switched on by [`enter`](Self::enter).
    pub fn cleanup(&mut self) -> io::Result<()> {
        self.writer.write_all(sequences::RESET.as_bytes())?;
        self.show_cursor()?;
        self.disable_mouse()?;
        self.leave_alt_screen()?;
        self.exit_raw_mode();
        self.flush()
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::color::Rgb;

    #[test]
    fn test_terminal_basic() {
        let terminal = Terminal::headless(Vec::new(), 40, 10);
        assert!(!terminal.alt_screen);
        assert!(!terminal.mouse_enabled);
        assert!(!terminal.is_raw_mode());
        assert_eq!(terminal.size(), (40, 10));
    }

    #[test]
    fn test_enter_emits_setup_sequences() {
        eprintln!("[TEST] test_enter_emits_setup_sequences");
        let mut output = Vec::new();
        {
            let mut terminal = Terminal::headless(&mut output, 20, 5);
            terminal.enter().unwrap();
        }
        let s = String::from_utf8_lossy(&output);
        eprintln!("[TEST] Output: {s:?}");

        assert!(s.starts_with("\x1b[?1049h\x1b[?25l\x1b[?1003h\x1b[?1006h\x1b[2J\x1b[H"));
        // cleanup on drop restores everything
        assert!(s.contains("\x1b[?25h"));
        assert!(s.contains("\x1b[?1003l\x1b[?1006l"));
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut output = Vec::new();
        {
            let mut terminal = Terminal::headless(&mut output, 20, 5);
            terminal.enter().unwrap();
            terminal.cleanup().unwrap();
            terminal.cleanup().unwrap();
        }
        let s = String::from_utf8_lossy(&output);
        assert_eq!(s.matches("\x1b[?1049l").count(), 1);
    }

    #[test]
    fn test_headless_resize() {
        let mut terminal = Terminal::headless(Vec::new(), 20, 5);
        assert!(!terminal.refresh_size());
        terminal.set_size(30, 8);
        assert!(terminal.refresh_size());
        assert_eq!(terminal.size(), (30, 8));
        assert!(!terminal.refresh_size());
        terminal.set_size(30, 8);
        assert!(!terminal.refresh_size());
    }

    #[test]
    fn test_draw_writes_frame() {
        let mut output = Vec::new();
        {
            let mut terminal = Terminal::headless(&mut output, 3, 1);
            let mut buf = CellBuffer::new(3, 1);
            buf.set(1, 0, Cell::new('z', Rgb::YELLOW, Rgb::BLUE));
            terminal.draw(&buf).unwrap();
        }
        let s = String::from_utf8_lossy(&output);
        assert!(s.starts_with("\x1b[H"));
        assert!(s.contains("\x1b[48;2;60;120;220m\x1b[38;2;255;220;0mz"));
    }
}
