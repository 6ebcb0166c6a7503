//! World sources: the read-only content the engine visualizes.

use crate::cell::Cell;

/// Read-only rectangular grid of cells supplied by the host.
///
/// Coordinates outside `0..width` x `0..height` report `None`; the renderer
/// treats those as absent rather than as an error.
pub trait WorldSource {
    fn width(&self) -> i64;
    fn height(&self) -> i64;
    fn cell(&self, x: i64, y: i64) -> Option<Cell>;
}

impl<T: WorldSource + ?Sized> WorldSource for &T {
    fn width(&self) -> i64 {
        (**self).width()
    }

    fn height(&self) -> i64 {
        (**self).height()
    }

    fn cell(&self, x: i64, y: i64) -> Option<Cell> {
        (**self).cell(x, y)
    }
}

/// Vector-backed [`WorldSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    width: i64,
    height: i64,
    cells: Vec<Cell>,
}

impl GridWorld {
    /// Grid filled with `fill`.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: Cell) -> Self {
        let width = i64::from(width);
        let height = i64::from(height);
        Self {
            width,
            height,
            cells: vec![fill; (width * height) as usize],
        }
    }

    /// Grid built from a function of the cell coordinates.
    #[must_use]
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(i64, i64) -> Cell,
    {
        let width = i64::from(width);
        let height = i64::from(height);
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Replace a cell; positions outside the grid are ignored.
    pub fn set(&mut self, x: i64, y: i64, cell: Cell) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = cell;
        }
    }
}

impl WorldSource for GridWorld {
    fn width(&self) -> i64 {
        self.width
    }

    fn height(&self) -> i64 {
        self.height
    }

    fn cell(&self, x: i64, y: i64) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_grid_world_bounds() {
        let world = GridWorld::new(3, 2, Cell::BLANK.with_char('#'));
        assert_eq!(world.width(), 3);
        assert_eq!(world.height(), 2);
        assert_eq!(world.cell(2, 1).map(|c| c.ch), Some('#'));
        assert!(world.cell(3, 0).is_none());
        assert!(world.cell(-1, 0).is_none());
    }

    #[test]
    fn test_from_fn_row_major() {
        let world = GridWorld::from_fn(4, 4, |x, y| {
            Cell::new(char::from(b'a' + (y * 4 + x) as u8), Rgb::WHITE, Rgb::BLACK)
        });
        assert_eq!(world.cell(1, 2).map(|c| c.ch), Some('j'));
    }

    #[test]
    fn test_set_through_reference() {
        let mut world = GridWorld::new(2, 2, Cell::BLANK);
        world.set(1, 1, Cell::BLANK.with_char('x'));
        world.set(9, 9, Cell::BLANK.with_char('y'));
        let by_ref: &dyn WorldSource = &world;
        assert_eq!(by_ref.cell(1, 1).map(|c| c.ch), Some('x'));
    }
}
