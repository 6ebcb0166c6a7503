//! Floating, draggable panels composited over the scene.
//!
//! Windows live in a [`WindowManager`] owned by the main loop and handed to
//! host callbacks through the [`Frame`](crate::Frame); there is no global
//! registry. Windows are drawn in ascending z order (ties keep creation
//! order) and the top-most visible window under the cursor receives mouse
//! input: a left press inside it starts a drag that lasts until the button
//! is released, and scene panning is suppressed for that whole time.

use crate::buffer::{CellBuffer, FrameGlyphs, draw_frame, put_text_keep_bg, text_width};
use crate::color::Rgb;
use crate::event::emit_event;
use crate::input::{InputState, MouseButtons};
use std::fmt;

/// Text of the close button drawn on the top border.
pub const CLOSE_BUTTON: &str = "[x]";

/// Stable window handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the close button does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CloseAction {
    /// Hide the window; it can be shown again.
    #[default]
    Hide,
    /// Remove the window from the manager.
    Destroy,
}

type ContentFn = Box<dyn FnMut(&mut CellBuffer, &Window)>;
type CloseFn = Box<dyn FnMut(WindowId)>;

/// A floating panel.
pub struct Window {
    id: WindowId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub z: i32,
    pub bg: Rgb,
    pub bg_alpha: u8,
    pub border: Rgb,
    /// Border colour while the window is being dragged.
    pub border_active: Rgb,
    pub title: Option<String>,
    pub visible: bool,
    pub show_close_button: bool,
    pub close_action: CloseAction,
    active: bool,
    content: Option<ContentFn>,
    on_close: Option<CloseFn>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("z", &self.z)
            .field("visible", &self.visible)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// A visible window at `(x, y)` of `width` x `height` cells, border
    /// included. Sizes are at least 2x2.
    #[must_use]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id: WindowId(0),
            x,
            y,
            width: width.max(2),
            height: height.max(2),
            z: 0,
            bg: Rgb::new(20, 20, 24),
            bg_alpha: 255,
            border: Rgb::new(160, 160, 170),
            border_active: Rgb::new(255, 200, 80),
            title: None,
            visible: true,
            show_close_button: false,
            close_action: CloseAction::Hide,
            active: false,
            content: None,
            on_close: None,
        }
    }

    #[must_use]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    #[must_use]
    pub fn with_bg(mut self, bg: Rgb, alpha: u8) -> Self {
        self.bg = bg;
        self.bg_alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_border(mut self, border: Rgb, active: Rgb) -> Self {
        self.border = border;
        self.border_active = active;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Show a close button with the given behaviour.
    #[must_use]
    pub fn with_close_button(mut self, action: CloseAction) -> Self {
        self.show_close_button = true;
        self.close_action = action;
        self
    }

    /// Content drawn after the background and border.
    #[must_use]
    pub fn with_content<F>(mut self, content: F) -> Self
    where
        F: FnMut(&mut CellBuffer, &Window) + 'static,
    {
        self.content = Some(Box::new(content));
        self
    }

    /// Callback run when the close button is clicked.
    #[must_use]
    pub fn with_on_close<F>(mut self, on_close: F) -> Self
    where
        F: FnMut(WindowId) + 'static,
    {
        self.on_close = Some(Box::new(on_close));
        self
    }

    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Whether the window is currently being dragged.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Top-left of the area inside the border.
    #[must_use]
    pub fn inner_origin(&self) -> (i32, i32) {
        (self.x + 1, self.y + 1)
    }

    /// Whether screen cell `(x, y)` lies inside the window.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Screen cells of the close button as `(x0, y, x1)` (x1 exclusive).
    #[must_use]
    pub fn close_button_span(&self) -> Option<(i32, i32, i32)> {
        if !self.show_close_button {
            return None;
        }
        let w = text_width(CLOSE_BUTTON);
        let x0 = self.x + self.width - 1 - w;
        (x0 > self.x).then_some((x0, self.y, x0 + w))
    }

    fn hits_close_button(&self, x: i32, y: i32) -> bool {
        self.close_button_span()
            .is_some_and(|(x0, by, x1)| y == by && x >= x0 && x < x1)
    }

    /// Keep the window on a `screen_w` x `screen_h` screen where possible.
    pub fn clamp_to_screen(&mut self, screen_w: i32, screen_h: i32) {
        self.x = self.x.min(screen_w - self.width).max(0);
        self.y = self.y.min(screen_h - self.height).max(0);
    }

    fn draw(&mut self, buffer: &mut CellBuffer) {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width - 1, self.y + self.height - 1);
        let border = if self.active {
            self.border_active
        } else {
            self.border
        };
        draw_frame(
            buffer,
            x0,
            y0,
            x1,
            y1,
            FrameGlyphs::SINGLE,
            border,
            255,
            self.bg,
            self.bg_alpha,
            true,
        );

        if let Some(title) = &self.title {
            put_text_keep_bg(buffer, x0 + 2, y0, &format!(" {title} "), border);
        }
        if let Some((bx, by, _)) = self.close_button_span() {
            put_text_keep_bg(buffer, bx, by, CLOSE_BUTTON, border);
        }

        // Content gets `&self`; take it out for the call
        if let Some(mut content) = self.content.take() {
            content(buffer, self);
            self.content = Some(content);
        }
    }
}

/// Result of one round of window mouse handling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowInput {
    /// Something changed and a redraw is needed.
    pub changed: bool,
    /// A window owned the left button this tick, so its movement must not
    /// pan the scene.
    pub captured: bool,
    /// Windows whose close button was clicked.
    pub closed: Vec<WindowId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Drag {
    id: WindowId,
    grab_x: i32,
    grab_y: i32,
}

/// Ordered window collection with drag state.
#[derive(Debug, Default)]
pub struct WindowManager {
    windows: Vec<Window>,
    next_id: u64,
    drag: Option<Drag>,
}

impl WindowManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a window and return its handle.
    pub fn create(&mut self, mut window: Window) -> WindowId {
        self.next_id += 1;
        let id = WindowId(self.next_id);
        window.id = id;
        // Stable insert keeps creation order among equal z
        let pos = self.windows.partition_point(|w| w.z <= window.z);
        self.windows.insert(pos, window);
        id
    }

    /// Remove a window; returns false if it did not exist.
    pub fn destroy(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.windows.remove(pos);
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        true
    }

    fn position(&self, id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == id)
    }

    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.position(id).is_some()
    }

    /// Flip visibility; returns the new state, or `None` for an unknown id.
    pub fn toggle_visible(&mut self, id: WindowId) -> Option<bool> {
        let window = self.get_mut(id)?;
        window.visible = !window.visible;
        if !window.visible && self.drag.is_some_and(|d| d.id == id) {
            self.end_drag();
        }
        self.get(id).map(|w| w.visible)
    }

    /// Change a window's z order.
    pub fn set_z(&mut self, id: WindowId, z: i32) {
        if let Some(pos) = self.position(id) {
            let mut window = self.windows.remove(pos);
            window.z = z;
            let pos = self.windows.partition_point(|w| w.z <= z);
            self.windows.insert(pos, window);
        }
    }

    /// Windows in drawing order (lowest z first).
    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Top-most visible window containing screen cell `(x, y)`.
    #[must_use]
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        self.windows
            .iter()
            .rev()
            .find(|w| w.visible && w.contains(x, y))
            .map(|w| w.id)
    }

    /// Whether any visible window covers `(x, y)`.
    #[must_use]
    pub fn is_over_window(&self, x: i32, y: i32) -> bool {
        self.window_at(x, y).is_some()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Window currently being dragged.
    #[must_use]
    pub fn dragged(&self) -> Option<WindowId> {
        self.drag.map(|d| d.id)
    }

    fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            if let Some(window) = self.get_mut(drag.id) {
                window.active = false;
            }
        }
    }

    /// Run the close action of a window.
    pub fn close(&mut self, id: WindowId) -> bool {
        let Some(window) = self.get_mut(id) else {
            return false;
        };
        let action = window.close_action;
        if let Some(mut on_close) = window.on_close.take() {
            on_close(id);
            if let Some(window) = self.get_mut(id) {
                window.on_close = Some(on_close);
            }
        }
        match action {
            CloseAction::Hide => {
                if let Some(window) = self.get_mut(id) {
                    window.visible = false;
                }
                if self.drag.is_some_and(|d| d.id == id) {
                    self.end_drag();
                }
            }
            CloseAction::Destroy => {
                self.destroy(id);
            }
        }
        emit_event("window_closed", &id.to_string());
        true
    }

    /// Apply this tick's mouse input: press hit-testing, close buttons,
    /// drag movement and release.
    pub fn handle_mouse(&mut self, input: &InputState, screen_w: i32, screen_h: i32) -> WindowInput {
        let mut result = WindowInput::default();

        if let Some((px, py)) = input.take_left_press() {
            if let Some(id) = self.window_at(px, py) {
                let hits_close = self.get(id).is_some_and(|w| w.hits_close_button(px, py));
                if hits_close {
                    self.close(id);
                    result.closed.push(id);
                } else if let Some(window) = self.get_mut(id) {
                    window.active = true;
                    let drag = Drag {
                        id,
                        grab_x: px - window.x,
                        grab_y: py - window.y,
                    };
                    self.drag = Some(drag);
                }
                result.changed = true;
                result.captured = true;
            }
        }

        if let Some(drag) = self.drag {
            result.captured = true;
            let (mx, my) = input.mouse_position();
            if let Some(window) = self.get_mut(drag.id) {
                let (nx, ny) = (mx - drag.grab_x, my - drag.grab_y);
                if (nx, ny) != (window.x, window.y) {
                    window.x = nx;
                    window.y = ny;
                    window.clamp_to_screen(screen_w, screen_h);
                    result.changed = true;
                }
            }
            let released = input.take_left_release();
            if released || !input.buttons().contains(MouseButtons::LEFT) {
                self.end_drag();
                result.changed = true;
            }
        }

        result
    }

    /// Clamp every window onto a resized screen.
    pub fn clamp_all(&mut self, screen_w: i32, screen_h: i32) {
        for window in &mut self.windows {
            window.clamp_to_screen(screen_w, screen_h);
        }
    }

    /// Draw every visible window, lowest z first.
    pub fn draw_all(&mut self, buffer: &mut CellBuffer) {
        for window in self.windows.iter_mut().filter(|w| w.visible) {
            window.draw(buffer);
        }
    }
}
