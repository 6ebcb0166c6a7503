//! Screen-space text and box drawing.

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::Rgb;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Box drawing glyphs for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl FrameGlyphs {
    /// Single-line box drawing characters.
    pub const SINGLE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// ASCII box drawing characters (works in all terminals).
    pub const ASCII: Self = Self {
        top_left: '+',
        top_right: '+',
        bottom_left: '+',
        bottom_right: '+',
        horizontal: '-',
        vertical: '|',
    };
}

impl Default for FrameGlyphs {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Display width of `text` in terminal columns.
#[must_use]
pub fn text_width(text: &str) -> i32 {
    i32::try_from(text.width()).unwrap_or(i32::MAX)
}

/// Display width of a single glyph; control and zero-width glyphs count as 0.
fn glyph_width(ch: char) -> i32 {
    ch.width().map_or(0, |w| w as i32)
}

/// Draw text, overwriting glyph, foreground and background.
///
/// Line breaks and zero-width characters are skipped; wide characters
/// advance two columns.
pub fn put_text(buffer: &mut CellBuffer, x: i32, y: i32, text: &str, fg: Rgb, bg: Rgb) {
    let mut col = x;
    for ch in text.chars() {
        let w = glyph_width(ch);
        if w == 0 {
            continue;
        }
        buffer.set(col, y, Cell::new(ch, fg, bg));
        col = col.saturating_add(w);
    }
}

/// Draw text, keeping whatever background is already in each cell.
///
/// Used for labels on top of rendered content and translucent chrome.
pub fn put_text_keep_bg(buffer: &mut CellBuffer, x: i32, y: i32, text: &str, fg: Rgb) {
    if y < 0 || y >= buffer.height() {
        return;
    }
    let mut col = x;
    for ch in text.chars() {
        let w = glyph_width(ch);
        if w == 0 {
            continue;
        }
        if col >= buffer.width() {
            break;
        }
        if let Some(cur) = buffer.get(col, y) {
            buffer.set(col, y, Cell::new(ch, fg, cur.bg));
        }
        col = col.saturating_add(w);
    }
}

/// Draw a rectangular frame with corners at `(x0, y0)` and `(x1, y1)`.
///
/// Border glyphs take `border` blended at `border_alpha`; the border cell
/// backgrounds (and the interior, when `fill_interior` is set) are blended
/// towards `fill` at `fill_alpha`.
#[allow(clippy::too_many_arguments)]
pub fn draw_frame(
    buffer: &mut CellBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    glyphs: FrameGlyphs,
    border: Rgb,
    border_alpha: u8,
    fill: Rgb,
    fill_alpha: u8,
    fill_interior: bool,
) {
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let edge = |buffer: &mut CellBuffer, x: i32, y: i32, ch: char| {
        buffer.blend_cell(x, y, Cell::new(ch, border, fill), border_alpha, fill_alpha, true);
    };

    edge(buffer, x0, y0, glyphs.top_left);
    edge(buffer, x1, y0, glyphs.top_right);
    edge(buffer, x0, y1, glyphs.bottom_left);
    edge(buffer, x1, y1, glyphs.bottom_right);
    for x in x0 + 1..x1 {
        edge(buffer, x, y0, glyphs.horizontal);
        edge(buffer, x, y1, glyphs.horizontal);
    }
    for y in y0 + 1..y1 {
        edge(buffer, x0, y, glyphs.vertical);
        edge(buffer, x1, y, glyphs.vertical);
    }

    if fill_interior {
        // an opaque fill hides what is underneath; a translucent one tints it
        let opaque = fill_alpha == 255 || (fill_alpha > 0 && !buffer.alpha_blend_enabled());
        for y in y0 + 1..y1 {
            for x in x0 + 1..x1 {
                if opaque {
                    buffer.set(x, y, Cell::new(' ', fill, fill));
                } else {
                    buffer.blend_bg(x, y, fill, fill_alpha);
                }
            }
        }
    }
}

const TOOLTIP_PAD_X: i32 = 2;
const TOOLTIP_BG: Rgb = Rgb::new(20, 20, 20);
const TOOLTIP_BORDER: Rgb = Rgb::new(255, 255, 255);
const TOOLTIP_FG: Rgb = Rgb::new(245, 245, 245);

/// Draw a bordered, translucent tooltip with one text row per line.
///
/// The box is shifted left/up as needed to stay on screen and never
/// covers the last row (reserved for the status bar). Lines longer than the
/// inner width are truncated.
pub fn draw_tooltip_box(
    buffer: &mut CellBuffer,
    x0: i32,
    y0: i32,
    lines: &[&str],
    bg_alpha: u8,
    border_alpha: u8,
) {
    let (width, height) = buffer.size();
    if lines.is_empty() {
        return;
    }

    let max_line = lines.iter().map(|l| text_width(l)).max().unwrap_or(0);
    let w = (max_line + TOOLTIP_PAD_X * 2).clamp(6, width.max(6));
    let h = lines.len() as i32;

    // frame spans x0..=x0+w and y0..=y0+h+1; the last row stays free
    let mut x0 = x0;
    let mut y0 = y0;
    if x0 + w > width - 1 {
        x0 = (width - 1 - w).max(0);
    }
    if y0 + h + 1 > height - 2 {
        y0 = (height - 2 - h - 1).max(0);
    }

    let opaque = (bg_alpha == 255 && border_alpha == 255) || !buffer.alpha_blend_enabled();

    draw_frame(
        buffer,
        x0,
        y0,
        x0 + w,
        y0 + h + 1,
        FrameGlyphs::SINGLE,
        TOOLTIP_BORDER,
        border_alpha,
        TOOLTIP_BG,
        255,
        false,
    );

    let inner = (w - TOOLTIP_PAD_X * 2).max(0);
    for (row, line) in lines.iter().enumerate() {
        let y = y0 + 1 + row as i32;
        if y >= height {
            break;
        }
        for x in 1..w {
            if opaque {
                buffer.set(x0 + x, y, Cell::new(' ', TOOLTIP_FG, TOOLTIP_BG));
            } else {
                buffer.blend_bg_and_fg(x0 + x, y, TOOLTIP_BG, bg_alpha, TOOLTIP_BG, bg_alpha);
            }
        }

        let clipped = truncate_to_width(line, inner);
        if opaque {
            put_text(buffer, x0 + TOOLTIP_PAD_X, y, clipped, TOOLTIP_FG, TOOLTIP_BG);
        } else {
            put_text_keep_bg(buffer, x0 + TOOLTIP_PAD_X, y, clipped, TOOLTIP_FG);
        }
    }
}

/// Longest prefix of `text` that fits in `max` columns.
pub(crate) fn truncate_to_width(text: &str, max: i32) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        used += glyph_width(ch);
        if used > max {
            return &text[..i];
        }
    }
    text
}
