//! Pure drawing functions from world space and screen space into a
//! [`CellBuffer`].
//!
//! Nothing here owns state. The main loop (through [`Frame`](crate::Frame))
//! passes the current buffer and [`Viewport`] on every call.
//!
//! # Sampling
//!
//! [`draw_world`] maps every cell of the map area (right of the left ruler,
//! below the top ruler, above the status bar) back into world space:
//!
//! - zoomed in or 1:1: the single world cell under the screen cell
//! - zoomed out: a box-sample of the covered block, see [`sample`]
//!
//! # Examples
//!
//! ```
//! use termglass::{Cell, CellBuffer, GridWorld, Rgb, Viewport, renderer};
//!
//! let world = GridWorld::new(10, 10, Cell::new('#', Rgb::GREEN, Rgb::BLACK));
//! let vp = Viewport::new(40, 20);
//! let mut buf = CellBuffer::new(40, 20);
//! renderer::draw_world(&mut buf, &vp, &world);
//! assert_eq!(buf.get(4, 1).unwrap().ch, '#');
//! ```

mod sample;

pub use sample::{MAX_SAMPLES_PER_AXIS, sample};

use crate::buffer::{CellBuffer, draw_tooltip_box, put_text, put_text_keep_bg};
use crate::cell::Cell;
use crate::color::Rgb;
use crate::viewport::Viewport;
use crate::world::WorldSource;

/// Screen rectangle `(x0, y0, x1, y1)` (exclusive end) covered by the map.
#[must_use]
pub fn map_area(buffer: &CellBuffer, viewport: &Viewport) -> (i32, i32, i32, i32) {
    let (w, h) = buffer.size();
    let (mx, my) = viewport.margins();
    (mx.min(w), my.min(h), w, (h - 1).max(my.min(h)))
}

/// Render the world into the map area of `buffer`.
pub fn draw_world<W: WorldSource + ?Sized>(buffer: &mut CellBuffer, viewport: &Viewport, world: &W) {
    let (x0, y0, x1, y1) = map_area(buffer, viewport);
    let world_per_cell = viewport.world_per_cell();
    for sy in y0..y1 {
        for sx in x0..x1 {
            let (wx, wy) = viewport.screen_to_world(sx, sy);
            buffer.set(sx, sy, sample(world, wx, wy, world_per_cell));
        }
    }
}

/// Fill the screen cells covering the world rectangle `(x, y, w, h)`.
///
/// At least one cell is drawn at the rectangle's origin, however far the
/// viewport is zoomed out.
#[allow(clippy::too_many_arguments)]
pub fn draw_rect_world(
    buffer: &mut CellBuffer,
    viewport: &Viewport,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    cell: Cell,
) {
    let (wx0, wx1) = if w < 0.0 { (x + w, x) } else { (x, x + w) };
    let (wy0, wy1) = if h < 0.0 { (y + h, y) } else { (y, y + h) };
    let (sx0, sy0) = viewport.world_to_screen(wx0, wy0);
    let (sx1, sy1) = viewport.world_to_screen(wx1, wy1);
    // far world points saturate to the i32 range
    let sx_end = sx1.saturating_sub(1).max(sx0);
    let sy_end = sy1.saturating_sub(1).max(sy0);

    let (bw, bh) = buffer.size();
    for sy in sy0.max(0)..=sy_end.min(bh - 1) {
        for sx in sx0.max(0)..=sx_end.min(bw - 1) {
            buffer.set(sx, sy, cell);
        }
    }
}

/// Draw a one-cell-wide ring of world radius `r` around `(cx, cy)`.
///
/// A screen cell is kept when the world distance from its centre to the
/// circle centre is within half a cell's world width of `r`.
pub fn draw_circle_world(
    buffer: &mut CellBuffer,
    viewport: &Viewport,
    cx: f64,
    cy: f64,
    r: f64,
    cell: Cell,
) {
    let r = r.abs();
    let zoom = viewport.zoom();
    let half_cell = 0.5 / zoom;
    let (scx, scy) = viewport.world_to_screen(cx, cy);
    let reach = ((r * zoom).ceil() as i32).saturating_add(1);

    let (bw, bh) = buffer.size();
    let ys = scy.saturating_sub(reach).max(0)..=scy.saturating_add(reach).min(bh - 1);
    for sy in ys {
        let xs = scx.saturating_sub(reach).max(0)..=scx.saturating_add(reach).min(bw - 1);
        for sx in xs {
            let (wx, wy) = viewport.screen_to_world(sx, sy);
            let dist = (wx + half_cell - cx).hypot(wy + half_cell - cy);
            if (dist - r).abs() <= half_cell {
                buffer.set(sx, sy, cell);
            }
        }
    }
}

/// Screen-space text that overwrites glyph, foreground and background.
pub fn draw_text_screen(buffer: &mut CellBuffer, sx: i32, sy: i32, text: &str, fg: Rgb, bg: Rgb) {
    put_text(buffer, sx, sy, text, fg, bg);
}

/// Screen-space text that keeps the background already in each cell.
pub fn draw_text_screen_keep_bg(buffer: &mut CellBuffer, sx: i32, sy: i32, text: &str, fg: Rgb) {
    put_text_keep_bg(buffer, sx, sy, text, fg);
}

/// Draw a tooltip box; `text` is split on `\n`, `\r\n` and `\r`.
pub fn draw_tooltip(
    buffer: &mut CellBuffer,
    x: i32,
    y: i32,
    text: &str,
    bg_alpha: u8,
    border_alpha: u8,
) {
    let lines = split_lines(text);
    draw_tooltip_box(buffer, x, y, &lines, bg_alpha, border_alpha);
}

fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split("\r\n").flat_map(|part| part.split(['\n', '\r'])).collect()
}
