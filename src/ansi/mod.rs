//! ANSI escape sequence generation.

pub mod output;
pub mod sequences;

pub use output::FrameEncoder;
pub use sequences::*;

use crate::color::Rgb;
use crate::config::ColorMode;
use std::io::{self, Write};

/// Write a u8 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

fn write_rgb(w: &mut impl Write, prefix: &[u8], color: Rgb) -> io::Result<()> {
    w.write_all(prefix)?;
    write_u8_decimal(w, color.r)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.g)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.b)?;
    w.write_all(b"m")
}

/// Write SGR sequence for foreground color to a writer.
pub fn write_fg_color(w: &mut impl Write, color: Rgb, mode: ColorMode) -> io::Result<()> {
    match mode {
        ColorMode::TrueColor => write_rgb(w, b"\x1b[38;2;", color),
        ColorMode::Console16 => {
            let idx = color.to_16_color();
            // 30-37 normal, 90-97 bright
            let code = if idx < 8 { 30 + idx } else { 90 + idx - 8 };
            w.write_all(b"\x1b[")?;
            write_u8_decimal(w, code)?;
            w.write_all(b"m")
        }
    }
}

/// Write SGR sequence for background color to a writer.
pub fn write_bg_color(w: &mut impl Write, color: Rgb, mode: ColorMode) -> io::Result<()> {
    match mode {
        ColorMode::TrueColor => write_rgb(w, b"\x1b[48;2;", color),
        ColorMode::Console16 => {
            let idx = color.to_16_color();
            // 40-47 normal, 100-107 bright
            let code = if idx < 8 { 40 + idx } else { 100 + idx - 8 };
            w.write_all(b"\x1b[")?;
            write_u8_decimal(w, code)?;
            w.write_all(b"m")
        }
    }
}
