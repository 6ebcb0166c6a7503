//! Whole-frame ANSI encoding with colour state tracking.

use crate::ansi::{self, sequences};
use crate::buffer::CellBuffer;
use crate::config::ColorMode;
use unicode_width::UnicodeWidthChar;

/// Encodes a [`CellBuffer`] into one byte string for a single write.
///
/// The output homes the cursor and writes every row left to right,
/// separated by CRLF. Colour sequences are only emitted when they differ
/// from the previous cell in the same row; each row ends with a reset so
/// the next row starts from a known state.
///
/// Glyphs the terminal would render as zero columns (controls, NUL,
/// combining marks) are written as spaces. A double-width glyph consumes
/// the following cell; one that would not fit in the last column is
/// replaced by a space.
pub struct FrameEncoder {
    buffer: Vec<u8>,
    color_mode: ColorMode,
}

impl FrameEncoder {
    #[must_use]
    pub fn new(color_mode: ColorMode) -> Self {
        Self {
            buffer: Vec::with_capacity(64 * 1024),
            color_mode,
        }
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Encode the whole buffer; the returned slice is valid until the next
    /// call.
    pub fn encode(&mut self, cells: &CellBuffer) -> &[u8] {
        self.buffer.clear();
        self.buffer.extend_from_slice(sequences::CURSOR_HOME.as_bytes());

        let (width, height) = cells.size();
        let mut utf8 = [0u8; 4];
        for y in 0..height {
            let row = cells.row(y);
            let mut current_fg = None;
            let mut current_bg = None;
            let mut x = 0;
            while x < width {
                let cell = row[x as usize];
                if current_bg != Some(cell.bg) {
                    let _ = ansi::write_bg_color(&mut self.buffer, cell.bg, self.color_mode);
                    current_bg = Some(cell.bg);
                }
                if current_fg != Some(cell.fg) {
                    let _ = ansi::write_fg_color(&mut self.buffer, cell.fg, self.color_mode);
                    current_fg = Some(cell.fg);
                }

                let (ch, advance) = match cell.ch.width() {
                    Some(1) => (cell.ch, 1),
                    Some(2) if x + 1 < width => (cell.ch, 2),
                    _ => (' ', 1),
                };
                self.buffer
                    .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                x += advance;
            }
            self.buffer.extend_from_slice(sequences::RESET.as_bytes());
            if y + 1 < height {
                self.buffer.extend_from_slice(sequences::CRLF.as_bytes());
            }
        }
        self.buffer.extend_from_slice(sequences::RESET.as_bytes());
        &self.buffer
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(ColorMode::TrueColor)
    }
}
