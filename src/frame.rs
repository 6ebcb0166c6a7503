//! Per-tick drawing façade.
//!
//! A [`Frame`] borrows the loop's buffer, camera, input and settings for the
//! duration of one draw callback. World-space and screen-space helpers go
//! through the layer switches in [`VizConfig::layers`], so a host draws
//! everything unconditionally and the user decides what is shown.

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::Rgb;
use crate::config::{UiLayers, VizConfig};
use crate::input::InputState;
use crate::renderer;
use crate::viewport::Viewport;
use crate::window::WindowManager;
use crate::world::WorldSource;

/// Tooltip text for the world cell under the cursor; `None` or an empty
/// string shows nothing. `'h` is how long the provider may borrow host state.
pub type TooltipProvider<'h> = Box<dyn FnMut(i64, i64) -> Option<String> + 'h>;

/// Drawing context handed to the host draw callback.
///
/// `'a` borrows the loop's state for one callback; `'h` is the lifetime of
/// the host callbacks, so a per-frame tooltip may borrow what they borrow.
pub struct Frame<'a, 'h> {
    buffer: &'a mut CellBuffer,
    viewport: &'a Viewport,
    input: &'a InputState,
    config: &'a VizConfig,
    windows: &'a mut WindowManager,
    tooltip: Option<TooltipProvider<'h>>,
}

impl<'a, 'h> Frame<'a, 'h> {
    #[must_use]
    pub fn new(
        buffer: &'a mut CellBuffer,
        viewport: &'a Viewport,
        input: &'a InputState,
        config: &'a VizConfig,
        windows: &'a mut WindowManager,
    ) -> Self {
        Self {
            buffer,
            viewport,
            input,
            config,
            windows,
            tooltip: None,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &VizConfig {
        self.config
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        self.input
    }

    /// Screen size in cells.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        self.buffer.size()
    }

    /// Direct access to the target buffer, bypassing layer switches.
    pub fn buffer_mut(&mut self) -> &mut CellBuffer {
        self.buffer
    }

    /// The window registry, for creating or querying panels.
    pub fn windows(&mut self) -> &mut WindowManager {
        self.windows
    }

    #[must_use]
    pub fn screen_to_world(&self, sx: i32, sy: i32) -> (f64, f64) {
        self.viewport.screen_to_world(sx, sy)
    }

    #[must_use]
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (i32, i32) {
        self.viewport.world_to_screen(wx, wy)
    }

    /// Integer world cell under the mouse cursor.
    #[must_use]
    pub fn world_cell_under_mouse(&self) -> (i64, i64) {
        let (mx, my) = self.input.mouse_position();
        self.viewport.world_cell_under_screen(mx, my)
    }

    fn layer(&self, layer: UiLayers) -> bool {
        self.config.layers.contains(layer)
    }

    /// Sample `world` into the map area.
    pub fn draw_world<W: WorldSource + ?Sized>(&mut self, world: &W) {
        if self.layer(UiLayers::MAP) {
            renderer::draw_world(self.buffer, self.viewport, world);
        }
    }

    pub fn draw_rect_world(&mut self, x: f64, y: f64, w: f64, h: f64, cell: Cell) {
        if self.layer(UiLayers::OVERLAYS) {
            renderer::draw_rect_world(self.buffer, self.viewport, x, y, w, h, cell);
        }
    }

    /// One world cell.
    pub fn draw_cell_world(&mut self, x: f64, y: f64, cell: Cell) {
        self.draw_rect_world(x, y, 1.0, 1.0, cell);
    }

    pub fn draw_circle_world(&mut self, cx: f64, cy: f64, r: f64, cell: Cell) {
        if self.layer(UiLayers::OVERLAYS) {
            renderer::draw_circle_world(self.buffer, self.viewport, cx, cy, r, cell);
        }
    }

    /// Screen text overwriting the background.
    pub fn draw_text(&mut self, sx: i32, sy: i32, text: &str, fg: Rgb, bg: Rgb) {
        if self.layer(UiLayers::OVERLAYS) {
            renderer::draw_text_screen(self.buffer, sx, sy, text, fg, bg);
        }
    }

    /// Screen text over the existing background.
    pub fn draw_text_keep_bg(&mut self, sx: i32, sy: i32, text: &str, fg: Rgb) {
        if self.layer(UiLayers::OVERLAYS) {
            renderer::draw_text_screen_keep_bg(self.buffer, sx, sy, text, fg);
        }
    }

    /// Install a tooltip provider for this frame only; it takes precedence
    /// over the one passed to [`run`](crate::run).
    pub fn set_tooltip<F>(&mut self, provider: F)
    where
        F: FnMut(i64, i64) -> Option<String> + 'h,
    {
        self.tooltip = Some(Box::new(provider));
    }

    /// Hand back the per-frame tooltip provider, if one was set.
    pub(crate) fn take_tooltip(&mut self) -> Option<TooltipProvider<'h>> {
        self.tooltip.take()
    }
}
