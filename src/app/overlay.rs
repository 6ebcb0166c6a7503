//! Engine chrome drawn over the host scene: rulers, status bar, tooltip and
//! the help window.

use crate::buffer::{CellBuffer, put_text, put_text_keep_bg, truncate_to_width};
use crate::cell::Cell;
use crate::color::Rgb;
use crate::config::VizConfig;
use crate::renderer;
use crate::viewport::Viewport;
use crate::window::{CloseAction, Window, WindowManager};

/// Help window z order, above host windows with default z.
pub const HELP_Z: i32 = 100;

const HELP_TITLE_FG: Rgb = Rgb::new(255, 230, 120);
const HELP_TEXT_FG: Rgb = Rgb::new(230, 230, 230);
const HELP_HINT_FG: Rgb = Rgb::new(200, 220, 255);

const HELP_LINES: &[&str] = &[
    "Esc/Ctrl+Q  : quit",
    "Ctrl/Alt +- : zoom in/out (also mouse wheel)",
    "+ / -       : pan up/down",
    "0           : reset zoom",
    "Drag        : pan (left or right button)",
    "Arrows/WASD : pan",
    "Space       : step",
    "1 / 2 / 3   : autoplay off / 5 per s / 30 per s",
    "[ / ]       : autoplay slower / faster",
    "F5/F6/F7/F8 : layers (all/map/ui/overlays)",
    "C           : toggle color mode (TrueColor/16)",
    "T           : toggle tooltip",
];

/// Ruler labels round half to even.
fn label_value(v: f64) -> i64 {
    v.round_ties_even() as i64
}

/// Paint one ruler cell: a translucent tint, or an opaque blank cell when
/// blending is off.
fn ruler_cell(buffer: &mut CellBuffer, x: i32, y: i32, color: Rgb, alpha: u8, opaque: bool) {
    if opaque {
        buffer.set(x, y, Cell::new(' ', Rgb::WHITE, color));
    } else {
        buffer.blend_bg_and_fg(x, y, color, alpha, color, alpha);
    }
}

/// Top and left rulers with world coordinate labels and the cursor
/// highlight. Skipped on screens smaller than 10x5.
pub fn draw_rulers(buffer: &mut CellBuffer, viewport: &Viewport, config: &VizConfig, mouse: (i32, i32)) {
    let (w, h) = buffer.size();
    if w < 10 || h < 5 {
        return;
    }

    let bg = config.ruler_bg;
    let alpha = config.ruler_bg_alpha;
    let lw = i32::from(config.left_ruler_width.max(1));
    let opaque = !buffer.alpha_blend_enabled();

    for x in 0..w {
        ruler_cell(buffer, x, 0, bg, alpha, opaque);
    }
    for x in 0..lw.min(w) {
        for y in 1..h {
            ruler_cell(buffer, x, y, bg, alpha, opaque);
        }
    }

    for sx in lw..w {
        if sx % 10 == 0 {
            let (wx, _) = viewport.screen_to_world(sx, 1);
            put_text_keep_bg(buffer, sx, 0, &label_value(wx).to_string(), Rgb::WHITE);
        }
    }
    for sy in 1..h - 1 {
        if sy % 2 == 0 {
            let (_, wy) = viewport.screen_to_world(lw, sy);
            let label = label_value(wy).to_string();
            let label = if label.len() <= 3 {
                format!("{label:>3}")
            } else {
                label[label.len() - 3..].to_string()
            };
            put_text_keep_bg(buffer, 0, sy, &label, Rgb::WHITE);
        }
    }

    let mx = mouse.0.clamp(0, w - 1);
    let my = mouse.1.clamp(0, h - 1);
    let hi = config.ruler_highlight;
    if opaque {
        for (x, y) in [(mx, 0), (0, my)] {
            let ch = buffer.get(x, y).map_or(' ', |c| c.ch);
            buffer.set(x, y, Cell::new(ch, hi, bg));
        }
    } else {
        let ha = config.ruler_highlight_alpha;
        buffer.blend_bg_and_fg(mx, 0, hi, ha, hi, ha);
        buffer.blend_bg_and_fg(0, my, hi, ha, hi, ha);
    }
}

/// Values shown in the status bar.
#[derive(Clone, Copy, Debug)]
pub struct StatusInfo<'a> {
    pub zoom: f64,
    pub fps: f64,
    pub cell: (i64, i64),
    pub host: &'a str,
}

/// Compose the status line for a screen `width` columns wide.
#[must_use]
pub fn status_line(config: &VizConfig, info: &StatusInfo<'_>, width: i32) -> String {
    let auto = if config.autoplay {
        format!("{:.1}/s | FPS {:.1}", config.auto_steps_per_second, info.fps)
    } else {
        "off".to_string()
    };
    let mut line = format!(
        "F1 Help |  {} | {} | Zoom {:.2} | Auto {} | Cell {}, {}",
        config.color_mode.label(),
        config.layers,
        info.zoom,
        auto,
        info.cell.0,
        info.cell.1
    );

    let host = info.host.trim_end();
    if !host.trim().is_empty() {
        let room = width - line.chars().count() as i32 - 3;
        if room > 0 {
            let extra = truncate_to_width(host, room);
            line = format!("{line} | {extra:>pad$}", pad = room as usize);
        }
    }
    line
}

/// Bottom status bar, black on gray. Skipped on screens smaller than 10x3.
pub fn draw_status_bar(buffer: &mut CellBuffer, config: &VizConfig, info: &StatusInfo<'_>) {
    let (w, h) = buffer.size();
    if w < 10 || h < 3 {
        return;
    }
    let y = h - 1;
    for x in 0..w {
        buffer.set(x, y, Cell::new(' ', Rgb::BLACK, Rgb::GRAY));
    }
    let line = status_line(config, info, w);
    put_text(buffer, 0, y, truncate_to_width(&line, w), Rgb::BLACK, Rgb::GRAY);
}

/// Ask `provider` about the world cell under the cursor and draw the answer
/// next to it. Nothing is drawn while the cursor is over a window.
pub fn draw_tooltip(
    buffer: &mut CellBuffer,
    viewport: &Viewport,
    config: &VizConfig,
    windows: &WindowManager,
    mouse: (i32, i32),
    provider: &mut dyn FnMut(i64, i64) -> Option<String>,
) {
    let (mx, my) = mouse;
    if windows.is_over_window(mx, my) {
        return;
    }
    let (ix, iy) = viewport.world_cell_under_screen(mx, my);
    let Some(text) = provider(ix, iy).filter(|t| !t.is_empty()) else {
        return;
    };

    let (w, h) = buffer.size();
    let lines = text.lines().count().max(1) as i32;
    let x = (mx + 2).clamp(0, (w - 1).max(0));
    let mut y = (my + 1).clamp(0, (h - 2).max(0));
    // frame takes a row above and below the text; flip above the cursor
    // when it would run into the status bar
    if y + lines + 1 > h - 2 {
        y = (my - lines - 2).max(0);
    }
    renderer::draw_tooltip(
        buffer,
        x,
        y,
        &text,
        config.tooltip_bg_alpha,
        config.tooltip_border_alpha,
    );
}

/// The shortcut reference window, centred on a `screen_w` x `screen_h`
/// screen. Its close button destroys it.
#[must_use]
pub fn help_window(screen_w: i32, screen_h: i32) -> Window {
    let w = 64.min(screen_w - 6);
    let h = 18.min(screen_h - 6);
    let x = (screen_w - w) / 2;
    let y = (screen_h - h) / 2;

    Window::new(x, y, w, h)
        .with_bg(Rgb::new(20, 20, 24), 220)
        .with_z(HELP_Z)
        .with_border(Rgb::new(160, 160, 170), Rgb::new(255, 200, 80))
        .with_close_button(CloseAction::Destroy)
        .with_content(|buffer, win| {
            let inner = (win.width - 4).max(0);
            let bottom = win.y + win.height - 1;
            put_text_keep_bg(buffer, win.x + 2, win.y, "[ Help ]", HELP_TITLE_FG);

            let lx = win.x + 2;
            let mut ln = win.y + 2;
            for line in HELP_LINES {
                if ln >= bottom {
                    return;
                }
                put_text_keep_bg(buffer, lx, ln, truncate_to_width(line, inner), HELP_TEXT_FG);
                ln += 1;
            }
            ln += 1;
            if ln < bottom {
                let hint = "Press F1 to hide this window.";
                put_text_keep_bg(buffer, lx, ln, truncate_to_width(hint, inner), HELP_HINT_FG);
            }
        })
}
