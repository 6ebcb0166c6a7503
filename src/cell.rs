//! Terminal cell type representing a single character position.

use crate::color::Rgb;

/// One screen (or world) position: a glyph plus foreground and background.
///
/// Cells are small `Copy` values; buffers replace them wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    /// Space, white on black.
    pub const BLANK: Self = Self::new(' ', Rgb::WHITE, Rgb::BLACK);

    /// Create a cell.
    #[must_use]
    pub const fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self { ch, fg, bg }
    }

    /// Copy of this cell with a different glyph.
    #[must_use]
    pub const fn with_char(self, ch: char) -> Self {
        Self { ch, ..self }
    }

    /// Copy of this cell with a different foreground.
    #[must_use]
    pub const fn with_fg(self, fg: Rgb) -> Self {
        Self { fg, ..self }
    }

    /// Copy of this cell with a different background.
    #[must_use]
    pub const fn with_bg(self, bg: Rgb) -> Self {
        Self { bg, ..self }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blank() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.fg, Rgb::WHITE);
        assert_eq!(cell.bg, Rgb::BLACK);
    }

    #[test]
    fn test_with_builders() {
        let cell = Cell::BLANK
            .with_char('#')
            .with_fg(Rgb::RED)
            .with_bg(Rgb::BLUE);
        assert_eq!(cell, Cell::new('#', Rgb::RED, Rgb::BLUE));
    }
}
