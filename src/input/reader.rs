//! Background input thread.
//!
//! [`InputReader`] owns a thread that waits on stdin (or any readable file
//! descriptor), feeds the bytes through an [`InputParser`] and publishes the
//! results into an [`InputSink`]. The wait is a bounded `poll`, so the
//! thread notices a stop request within one poll interval and a lone ESC
//! can be resolved as the Escape key after a short quiet period.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::input::parser::InputParser;
use crate::input::state::InputSink;
use crate::terminal::{poll_readable, read_fd};
use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Quiet period after which a pending lone ESC becomes the Escape key.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(30);

/// Poll interval while nothing is pending.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// How long [`InputReader::stop`] waits for the thread before detaching it.
pub const STOP_TIMEOUT: Duration = Duration::from_millis(150);

/// Handle to the running input thread.
#[derive(Debug)]
pub struct InputReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputReader {
    /// Start reading stdin on a background thread.
    pub fn spawn(sink: InputSink) -> Result<Self> {
        Self::spawn_on_fd(libc::STDIN_FILENO, sink)
    }

    /// Start reading an arbitrary file descriptor.
    ///
    /// The descriptor must stay open for as long as the reader runs.
    pub fn spawn_on_fd(fd: RawFd, sink: InputSink) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("termglass-input".to_string())
            .spawn(move || read_loop(fd, &sink, &thread_stop))
            .map_err(|err| Error::InputThread(err.to_string()))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the thread to exit and wait for it, bounded by [`STOP_TIMEOUT`].
    ///
    /// A thread that does not finish in time is detached; a read stuck in
    /// the kernel is tolerated at process exit.
    pub fn stop(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let deadline = Instant::now() + STOP_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                emit_log(
                    LogLevel::Warn,
                    "input thread did not stop in time; detaching it",
                );
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        handle
            .join()
            .map_err(|_| Error::InputThread("input thread panicked".to_string()))
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Parse a chunk of raw bytes and publish the resulting events.
pub fn process_bytes(parser: &mut InputParser, sink: &InputSink, bytes: &[u8]) {
    for &byte in bytes {
        if let Some(event) = parser.feed(byte) {
            sink.apply(event);
        }
    }
}

fn read_loop(fd: RawFd, sink: &InputSink, stop: &AtomicBool) {
    let mut parser = InputParser::new();
    let mut buf = [0u8; 256];

    while !stop.load(Ordering::Acquire) {
        if sink.take_reset() {
            parser.reset();
        }

        let wait = if parser.is_pending() {
            ESCAPE_TIMEOUT
        } else {
            IDLE_POLL
        };
        match poll_readable(fd, wait) {
            Ok(false) => {
                if let Some(event) = parser.flush_timeout() {
                    sink.apply(event);
                }
            }
            Ok(true) => match read_fd(fd, &mut buf) {
                Ok(0) => {
                    // End of input; nothing more will arrive
                    if let Some(event) = parser.flush_timeout() {
                        sink.apply(event);
                    }
                    thread::sleep(IDLE_POLL);
                }
                Ok(n) => {
                    // a resize during the wait invalidates what was pending
                    if sink.take_reset() {
                        parser.reset();
                    }
                    process_bytes(&mut parser, sink, &buf[..n]);
                }
                Err(err) => {
                    emit_log(LogLevel::Warn, &format!("input read failed: {err}"));
                    break;
                }
            },
            Err(err) => {
                emit_log(LogLevel::Warn, &format!("input poll failed: {err}"));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keyboard::{KeyCode, KeyEvent};
    use crate::input::state::InputState;
    use crate::terminal::create_pipe;
    use std::io::Write;
    use std::os::unix::io::AsRawFd;

    fn wait_for<F: FnMut() -> bool>(mut cond: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_process_bytes_routes_events() {
        let (state, sink) = InputState::channel();
        let mut parser = InputParser::new();
        process_bytes(&mut parser, &sink, b"a\x1b[<64;3;3M\x1b[<0;10;5M");
        assert_eq!(state.drain_keys(8), vec![KeyEvent::char('a')]);
        assert_eq!(state.consume_wheel(), 1);
        assert_eq!(state.take_left_press(), Some((9, 4)));
    }

    #[test]
    fn test_reader_thread_reads_pipe() {
        eprintln!("[TEST] test_reader_thread_reads_pipe");
        let (read_end, mut write_end) = create_pipe().expect("pipe");
        let (state, sink) = InputState::channel();
        let mut reader = InputReader::spawn_on_fd(read_end.as_raw_fd(), sink).unwrap();
        assert!(reader.is_running());

        write_end.write_all(b"x\x1b[A").unwrap();
        let mut keys = Vec::new();
        let arrived = wait_for(|| {
            keys.extend(state.drain_keys(8));
            keys.len() >= 2
        });
        assert!(arrived, "keys: {keys:?}");
        assert_eq!(keys[0], KeyEvent::char('x'));
        assert_eq!(keys[1].code, KeyCode::Up);

        reader.stop().unwrap();
        assert!(!reader.is_running());
    }

    #[test]
    fn test_lone_escape_resolves_after_quiet_period() {
        let (read_end, mut write_end) = create_pipe().expect("pipe");
        let (state, sink) = InputState::channel();
        let mut reader = InputReader::spawn_on_fd(read_end.as_raw_fd(), sink).unwrap();

        write_end.write_all(b"\x1b").unwrap();
        let mut keys = Vec::new();
        let _ = wait_for(|| {
            keys.extend(state.drain_keys(8));
            !keys.is_empty()
        });
        assert_eq!(keys.len(), 1);
        assert!(keys[0].is_esc());
        reader.stop().unwrap();
    }

    #[test]
    fn test_reset_request_drops_partial_sequence() {
        let (read_end, mut write_end) = create_pipe().expect("pipe");
        let (state, sink) = InputState::channel();
        let reset = state.sink();
        let mut reader = InputReader::spawn_on_fd(read_end.as_raw_fd(), sink).unwrap();

        // half a mouse report, then a resize
        write_end.write_all(b"\x1b[<0;1").unwrap();
        thread::sleep(Duration::from_millis(100));
        state.request_reset();
        write_end.write_all(b"x").unwrap();

        let mut keys = Vec::new();
        let arrived = wait_for(|| {
            keys.extend(state.drain_keys(8));
            !keys.is_empty()
        });
        assert!(arrived);
        thread::sleep(Duration::from_millis(50));
        keys.extend(state.drain_keys(8));
        assert_eq!(keys, vec![KeyEvent::char('x')]);
        assert_eq!(state.take_left_press(), None);
        assert!(!reset.take_reset(), "reader consumed the request");
        reader.stop().unwrap();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (read_end, _write_end) = create_pipe().expect("pipe");
        let (_state, sink) = InputState::channel();
        let mut reader = InputReader::spawn_on_fd(read_end.as_raw_fd(), sink).unwrap();
        reader.stop().unwrap();
        reader.stop().unwrap();
    }
}
