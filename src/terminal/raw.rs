//! Raw mode terminal handling.
//!
//! Provides functions to enter and exit raw mode on Unix terminals using termios,
//! query the window size, and wait for input with a timeout so the input thread
//! can be stopped.
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc termios functions.
//! These are necessary for low-level terminal control and cannot be avoided.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

/// Saved terminal state for restoration.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Enter raw mode on the given file descriptor.
    ///
    /// Returns a guard that will restore the terminal state when dropped.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;

        let mut raw = original;

        // Input: no break, no CR to NL, no parity check, no strip, no XON/XOFF
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);

        // Output: no post processing; rows are separated with explicit CRLF
        raw.c_oflag &= !libc::OPOST;

        raw.c_cflag |= libc::CS8;

        // Local: echo off, canonical off, no extended functions, no signal
        // chars (Ctrl+Q and Ctrl+C arrive as bytes)
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1; // 100ms timeout for reads

        set_termios(fd, &raw)?;

        Ok(Self { fd, original })
    }

    /// Restore the original terminal state.
    fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Enter raw mode for stdin.
///
/// Returns a guard that restores the terminal when dropped.
pub fn enable_raw_mode() -> io::Result<RawModeGuard> {
    RawModeGuard::new(&io::stdin())
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Get the terminal size as `(columns, rows)`.
///
/// Zero dimensions are reported as an error.
pub fn terminal_size() -> io::Result<(u16, u16)> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };

    // SAFETY: ioctl with TIOCGWINSZ is safe when passed a valid winsize struct
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else if size.ws_col == 0 || size.ws_row == 0 {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal reported zero dimensions",
        ))
    } else {
        Ok((size.ws_col, size.ws_row))
    }
}

/// Wait until `fd` has bytes to read or `timeout` elapses.
///
/// Returns `Ok(true)` when readable (or at end of file). An interrupted wait
/// reports `Ok(false)`.
pub fn poll_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

    // SAFETY: pfd is a valid pollfd and nfds is 1
    let result = unsafe { libc::poll(&mut pfd, 1, millis) };

    if result == -1 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    if result > 0 && pfd.revents & libc::POLLNVAL != 0 {
        return Err(io::Error::from_raw_os_error(libc::EBADF));
    }
    Ok(result > 0)
}

/// Read available bytes from `fd` without any userspace buffering.
///
/// Returns 0 at end of file or when a raw-mode read times out.
pub fn read_fd(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: buf is valid for writes of buf.len() bytes
    let result = unsafe { libc::read(fd, buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()) };
    if result < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted || err.kind() == io::ErrorKind::WouldBlock {
            return Ok(0);
        }
        return Err(err);
    }
    Ok(result as usize)
}

/// Get termios attributes.
fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: tcgetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(termios)
    }
}

/// Set termios attributes.
fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Create a pipe and return both ends as Files for RAII cleanup.
#[cfg(test)]
pub(crate) fn create_pipe() -> io::Result<(std::fs::File, std::fs::File)> {
    use std::os::unix::io::FromRawFd;

    let mut fds = [0i32; 2];
    let result = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if result == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe() succeeded, so fds are valid
    let read_file = unsafe { std::fs::File::from_raw_fd(fds[0]) };
    let write_file = unsafe { std::fs::File::from_raw_fd(fds[1]) };
    Ok((read_file, write_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_tty_pipe_returns_false() {
        let (read_fd, write_fd) = create_pipe().expect("Failed to create pipe");
        assert!(!is_tty(&read_fd), "Read end of pipe should not be TTY");
        assert!(!is_tty(&write_fd), "Write end of pipe should not be TTY");
    }

    #[test]
    fn test_is_tty_file_returns_false() {
        let file = tempfile::tempfile().expect("Failed to create temp file");
        assert!(!is_tty(&file), "Regular file should not be TTY");
    }

    #[test]
    fn test_is_tty_with_invalid_fd() {
        struct InvalidFd;
        impl AsRawFd for InvalidFd {
            fn as_raw_fd(&self) -> RawFd {
                -1
            }
        }
        assert!(!is_tty(&InvalidFd), "Invalid fd should not be TTY");
    }

    #[test]
    fn test_terminal_size_valid_dimensions() {
        // Might fail without a TTY, but must not panic
        if let Ok((cols, rows)) = terminal_size() {
            assert!(cols > 0, "Columns should be positive");
            assert!(rows > 0, "Rows should be positive");
        }
    }

    #[test]
    fn test_raw_mode_guard_new_on_pipe_fails() {
        let (read_fd, _write_fd) = create_pipe().expect("Failed to create pipe");
        let result = RawModeGuard::new(&read_fd);
        assert!(result.is_err(), "RawModeGuard should fail on pipe");
    }

    #[test]
    fn test_get_termios_with_invalid_fd_fails() {
        assert!(get_termios(-1).is_err());
    }

    #[test]
    fn test_poll_times_out_then_reads() {
        let (read_end, mut write_end) = create_pipe().expect("Failed to create pipe");
        let fd = read_end.as_raw_fd();
        assert!(!poll_readable(fd, Duration::from_millis(10)).unwrap());

        write_end.write_all(b"\x1b[A").unwrap();
        assert!(poll_readable(fd, Duration::from_millis(100)).unwrap());

        let mut buf = [0u8; 16];
        let n = read_fd(fd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"\x1b[A");
    }

    #[test]
    fn test_poll_reports_eof_as_readable() {
        let (read_end, write_end) = create_pipe().expect("Failed to create pipe");
        drop(write_end);
        let fd = read_end.as_raw_fd();
        assert!(poll_readable(fd, Duration::from_millis(10)).unwrap());
        let mut buf = [0u8; 4];
        assert_eq!(read_fd(fd, &mut buf).unwrap(), 0);
    }
}
