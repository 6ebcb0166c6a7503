//! Cell grid render target with alpha-blended overlay operations.
//!
//! [`CellBuffer`] is the only mutable render target in the engine. Every
//! frame the main loop fills it, lets the host draw into it, composites the
//! chrome and windows on top, and hands it to the terminal for flushing.
//!
//! - **Opaque writes**: [`set`](CellBuffer::set) / [`try_set`](CellBuffer::try_set)
//! - **Blended writes**: background only, foreground only, or both with
//!   independent alphas (`0..=255`)
//!
//! Coordinates are signed screen cells. Writes outside the grid are
//! silently dropped, which lets callers rasterize shapes that hang off the
//! edge of the screen without clipping them first.
//!
//! # Examples
//!
//! ```
//! use termglass::{Cell, CellBuffer, Rgb};
//!
//! let mut buf = CellBuffer::new(80, 24);
//! buf.set(10, 5, Cell::new('@', Rgb::YELLOW, Rgb::BLACK));
//! buf.set(-1, 500, Cell::BLANK); // ignored
//!
//! // Darken the top row like a translucent ruler
//! for x in 0..buf.width() {
//!     buf.blend_bg(x, 0, Rgb::new(40, 40, 40), 120);
//! }
//! ```

mod drawing;

pub use drawing::{FrameGlyphs, draw_frame, draw_tooltip_box, put_text, put_text_keep_bg, text_width};
pub(crate) use drawing::truncate_to_width;

use crate::cell::Cell;
use crate::color::Rgb;

/// Width x height grid of [`Cell`]s.
///
/// The buffer is never resized in place; a terminal resize replaces it with
/// a fresh one.
#[derive(Clone, Debug)]
pub struct CellBuffer {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    /// When false (16-colour output), blends collapse to opaque writes.
    alpha_blend: bool,
}

impl CellBuffer {
    /// Create a blank buffer.
    ///
    /// Zero dimensions are clamped to 1 so iteration and division by the
    /// width stay well defined.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let width = i32::from(width.max(1));
        let height = i32::from(height.max(1));
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; (width * height) as usize],
            alpha_blend: true,
        }
    }

    /// Buffer dimensions as `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether blended writes actually blend.
    #[must_use]
    pub fn alpha_blend_enabled(&self) -> bool {
        self.alpha_blend
    }

    /// Enable or disable alpha compositing.
    pub fn set_alpha_blend(&mut self, enabled: bool) {
        self.alpha_blend = enabled;
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Cell at position, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Overwrite a cell; out-of-range positions are ignored.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        self.try_set(x, y, cell);
    }

    /// Overwrite a cell, reporting whether the position was inside the grid.
    pub fn try_set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    #[inline]
    fn mix(&self, top: Rgb, alpha: u8, bottom: Rgb) -> Rgb {
        if self.alpha_blend {
            Rgb::blend(top, alpha, bottom)
        } else if alpha == 0 {
            bottom
        } else {
            top
        }
    }

    /// Blend only the background; glyph and foreground are kept.
    pub fn blend_bg(&mut self, x: i32, y: i32, bg: Rgb, alpha: u8) {
        if let Some(idx) = self.index(x, y) {
            let cur = self.cells[idx];
            self.cells[idx] = cur.with_bg(self.mix(bg, alpha, cur.bg));
        }
    }

    /// Blend only the foreground; glyph and background are kept.
    pub fn blend_fg(&mut self, x: i32, y: i32, fg: Rgb, alpha: u8) {
        if let Some(idx) = self.index(x, y) {
            let cur = self.cells[idx];
            self.cells[idx] = cur.with_fg(self.mix(fg, alpha, cur.fg));
        }
    }

    /// Blend background and foreground with independent alphas.
    pub fn blend_bg_and_fg(&mut self, x: i32, y: i32, bg: Rgb, bg_alpha: u8, fg: Rgb, fg_alpha: u8) {
        if let Some(idx) = self.index(x, y) {
            let cur = self.cells[idx];
            self.cells[idx] = Cell::new(
                cur.ch,
                self.mix(fg, fg_alpha, cur.fg),
                self.mix(bg, bg_alpha, cur.bg),
            );
        }
    }

    /// Composite a whole cell on top of the current one.
    ///
    /// With `replace_char == false` a space in `top` keeps the glyph (and
    /// its colour) underneath, so blank overlays only tint the background.
    /// A NUL glyph never replaces the existing one.
    pub fn blend_cell(
        &mut self,
        x: i32,
        y: i32,
        top: Cell,
        fg_alpha: u8,
        bg_alpha: u8,
        replace_char: bool,
    ) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let cur = self.cells[idx];
        let bg = self.mix(top.bg, bg_alpha, cur.bg);
        let (ch, fg) = if replace_char || top.ch != ' ' {
            let ch = if top.ch == '\0' { cur.ch } else { top.ch };
            (ch, self.mix(top.fg, fg_alpha, cur.fg))
        } else {
            (cur.ch, cur.fg)
        };
        self.cells[idx] = Cell::new(ch, fg, bg);
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One row of cells, or an empty slice outside the grid.
    #[must_use]
    pub fn row(&self, y: i32) -> &[Cell] {
        if y < 0 || y >= self.height {
            return &[];
        }
        let start = (y * self.width) as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i as i32) % width, (i as i32) / width, *cell))
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buf = CellBuffer::new(80, 24);
        assert_eq!(buf.size(), (80, 24));
        assert_eq!(buf.cells().len(), 80 * 24);
        assert!(buf.cells().iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn test_zero_size_clamped() {
        let buf = CellBuffer::new(0, 0);
        assert_eq!(buf.size(), (1, 1));
        assert!(buf.get(0, 0).is_some());
    }

    #[test]
    fn test_set_get() {
        let mut buf = CellBuffer::new(10, 10);
        let cell = Cell::new('X', Rgb::RED, Rgb::BLUE);
        buf.set(3, 4, cell);
        assert_eq!(buf.get(3, 4), Some(cell));
        assert_eq!(buf.get(4, 3), Some(Cell::BLANK));
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut buf = CellBuffer::new(4, 4);
        let before = buf.cells().to_vec();
        let cell = Cell::new('!', Rgb::RED, Rgb::RED);
        assert!(!buf.try_set(-1, 0, cell));
        assert!(!buf.try_set(0, -1, cell));
        assert!(!buf.try_set(4, 0, cell));
        assert!(!buf.try_set(0, 4, cell));
        buf.blend_bg(100, 100, Rgb::RED, 128);
        buf.blend_cell(-5, 2, cell, 255, 255, true);
        assert_eq!(buf.cells(), &before[..]);
        assert!(buf.get(-1, -1).is_none());
    }

    #[test]
    fn test_fill() {
        let mut buf = CellBuffer::new(5, 3);
        let cell = Cell::new('.', Rgb::GRAY, Rgb::BLACK);
        buf.fill(cell);
        assert!(buf.cells().iter().all(|c| *c == cell));
    }

    #[test]
    fn test_blend_bg_keeps_glyph() {
        let mut buf = CellBuffer::new(2, 1);
        buf.set(0, 0, Cell::new('A', Rgb::RED, Rgb::BLACK));
        buf.blend_bg(0, 0, Rgb::WHITE, 128);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.ch, 'A');
        assert_eq!(cell.fg, Rgb::RED);
        assert_eq!(cell.bg, Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_blend_fg_keeps_background() {
        let mut buf = CellBuffer::new(1, 1);
        buf.set(0, 0, Cell::new('A', Rgb::BLACK, Rgb::BLUE));
        buf.blend_fg(0, 0, Rgb::WHITE, 255);
        assert_eq!(buf.get(0, 0), Some(Cell::new('A', Rgb::WHITE, Rgb::BLUE)));
    }

    #[test]
    fn test_blend_alpha_extremes() {
        let mut buf = CellBuffer::new(1, 1);
        let base = Cell::new('q', Rgb::new(1, 2, 3), Rgb::new(4, 5, 6));
        buf.set(0, 0, base);
        buf.blend_bg_and_fg(0, 0, Rgb::WHITE, 0, Rgb::WHITE, 0);
        assert_eq!(buf.get(0, 0), Some(base));

        buf.blend_bg_and_fg(0, 0, Rgb::RED, 255, Rgb::GREEN, 255);
        assert_eq!(buf.get(0, 0), Some(Cell::new('q', Rgb::GREEN, Rgb::RED)));
    }

    #[test]
    fn test_opaque_mode_collapses_blends() {
        let mut buf = CellBuffer::new(1, 1);
        buf.set_alpha_blend(false);
        buf.blend_bg(0, 0, Rgb::RED, 10);
        assert_eq!(buf.get(0, 0).unwrap().bg, Rgb::RED);
        buf.blend_bg(0, 0, Rgb::BLUE, 0);
        assert_eq!(buf.get(0, 0).unwrap().bg, Rgb::RED);
    }

    #[test]
    fn test_blend_cell_space_keeps_glyph() {
        let mut buf = CellBuffer::new(1, 1);
        buf.set(0, 0, Cell::new('#', Rgb::YELLOW, Rgb::BLACK));
        buf.blend_cell(0, 0, Cell::new(' ', Rgb::WHITE, Rgb::WHITE), 255, 255, false);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.ch, '#');
        assert_eq!(cell.fg, Rgb::YELLOW);
        assert_eq!(cell.bg, Rgb::WHITE);

        buf.blend_cell(0, 0, Cell::new('\0', Rgb::RED, Rgb::BLACK), 255, 255, true);
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.ch, '#');
        assert_eq!(cell.fg, Rgb::RED);
    }

    #[test]
    fn test_row_and_iter() {
        let mut buf = CellBuffer::new(3, 2);
        buf.set(2, 1, Cell::new('z', Rgb::WHITE, Rgb::BLACK));
        assert_eq!(buf.row(1)[2].ch, 'z');
        assert!(buf.row(2).is_empty());
        let found: Vec<_> = buf.iter_cells().filter(|(_, _, c)| c.ch == 'z').collect();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].0, found[0].1), (2, 1));
    }
}
