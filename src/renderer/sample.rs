//! World sampling for one screen cell.

use crate::cell::Cell;
use crate::color::Rgb;
use crate::viewport::EPSILON;
use crate::world::WorldSource;

/// Upper bound on samples per axis when zoomed out.
pub const MAX_SAMPLES_PER_AXIS: i64 = 8;

/// Sample the world region covered by one screen cell whose top-left world
/// corner is `(wx, wy)` and which spans `world_per_cell` world units.
///
/// At or below one world cell per screen cell the single cell under the
/// corner is returned. Above that the covered block is box-sampled: colours
/// are averaged over the present cells, the glyph is the most frequent one
/// (absent cells vote for a space) with ties going to the first seen in
/// row-major order.
#[must_use]
pub fn sample<W: WorldSource + ?Sized>(world: &W, wx: f64, wy: f64, world_per_cell: f64) -> Cell {
    let x0 = (wx + EPSILON).floor() as i64;
    let y0 = (wy + EPSILON).floor() as i64;

    if world_per_cell <= 1.0 {
        return world.cell(x0, y0).unwrap_or(Cell::BLANK);
    }

    let span = (world_per_cell - EPSILON).ceil().max(1.0) as i64;
    let samples = span.min(MAX_SAMPLES_PER_AXIS);
    let stride = span as f64 / samples as f64;

    let mut acc = ColorAccumulator::default();
    let mut votes = GlyphVotes::default();
    for j in 0..samples {
        let y = y0 + (j as f64 * stride) as i64;
        for i in 0..samples {
            let x = x0 + (i as f64 * stride) as i64;
            match world.cell(x, y) {
                Some(cell) => {
                    acc.add(cell);
                    votes.add(cell.ch);
                }
                None => votes.add(' '),
            }
        }
    }

    match acc.average() {
        Some((fg, bg)) => Cell::new(votes.winner(), fg, bg),
        None => Cell::BLANK,
    }
}

#[derive(Default)]
struct ColorAccumulator {
    fg: [u32; 3],
    bg: [u32; 3],
    n: u32,
}

impl ColorAccumulator {
    fn add(&mut self, cell: Cell) {
        self.fg[0] += u32::from(cell.fg.r);
        self.fg[1] += u32::from(cell.fg.g);
        self.fg[2] += u32::from(cell.fg.b);
        self.bg[0] += u32::from(cell.bg.r);
        self.bg[1] += u32::from(cell.bg.g);
        self.bg[2] += u32::from(cell.bg.b);
        self.n += 1;
    }

    fn average(&self) -> Option<(Rgb, Rgb)> {
        if self.n == 0 {
            return None;
        }
        let avg = |sum: [u32; 3]| {
            Rgb::new(
                (sum[0] / self.n) as u8,
                (sum[1] / self.n) as u8,
                (sum[2] / self.n) as u8,
            )
        };
        Some((avg(self.fg), avg(self.bg)))
    }
}

/// Glyph frequency table preserving first-seen order.
#[derive(Default)]
struct GlyphVotes {
    counts: Vec<(char, u32)>,
}

impl GlyphVotes {
    fn add(&mut self, ch: char) {
        match self.counts.iter_mut().find(|(c, _)| *c == ch) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((ch, 1)),
        }
    }

    fn winner(&self) -> char {
        let mut best = (' ', 0);
        for &(ch, n) in &self.counts {
            if n > best.1 {
                best = (ch, n);
            }
        }
        best.0
    }
}
