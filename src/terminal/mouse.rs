//! Mouse event types decoded from SGR reports.

use bitflags::bitflags;

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Right,
    /// No button (for move events).
    None,
}

bitflags! {
    /// Set of buttons currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u8 {
        const LEFT = 0b0000_0001;
        const MIDDLE = 0b0000_0010;
        const RIGHT = 0b0000_0100;
    }
}

impl MouseButton {
    /// The matching bit in a [`MouseButtons`] set.
    #[must_use]
    pub fn mask(self) -> MouseButtons {
        match self {
            Self::Left => MouseButtons::LEFT,
            Self::Middle => MouseButtons::MIDDLE,
            Self::Right => MouseButtons::RIGHT,
            Self::None => MouseButtons::empty(),
        }
    }
}

/// Kind of mouse event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Button pressed.
    Press,
    /// Button released.
    Release,
    /// Mouse moved with no button held.
    Move,
    /// Mouse moved with a button held.
    Drag,
    /// Scroll wheel up.
    ScrollUp,
    /// Scroll wheel down.
    ScrollDown,
}

/// A mouse event.
///
/// Coordinates are the terminal's 1-based column and row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    pub x: u16,
    pub y: u16,
    pub button: MouseButton,
    pub kind: MouseEventKind,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub fn new(x: u16, y: u16, button: MouseButton, kind: MouseEventKind) -> Self {
        Self {
            x,
            y,
            button,
            kind,
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    /// Create a press event.
    #[must_use]
    pub fn press(x: u16, y: u16, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseEventKind::Press)
    }

    /// Create a release event.
    #[must_use]
    pub fn release(x: u16, y: u16, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseEventKind::Release)
    }

    /// Set modifier keys.
    #[must_use]
    pub fn with_modifiers(mut self, shift: bool, ctrl: bool, alt: bool) -> Self {
        self.shift = shift;
        self.ctrl = ctrl;
        self.alt = alt;
        self
    }

    /// Check if this is a click (press) event.
    #[must_use]
    pub fn is_press(&self) -> bool {
        self.kind == MouseEventKind::Press
    }

    /// Check if this is a scroll event.
    #[must_use]
    pub fn is_scroll(&self) -> bool {
        matches!(
            self.kind,
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        )
    }

    /// Check if this is a motion event (with or without a button held).
    #[must_use]
    pub fn is_motion(&self) -> bool {
        matches!(self.kind, MouseEventKind::Move | MouseEventKind::Drag)
    }

    /// Signed wheel step: +1 up, -1 down, 0 otherwise.
    #[must_use]
    pub fn wheel_delta(&self) -> i32 {
        match self.kind {
            MouseEventKind::ScrollUp => 1,
            MouseEventKind::ScrollDown => -1,
            _ => 0,
        }
    }

    /// Zero-based screen cell of the event.
    #[must_use]
    pub fn cell(&self) -> (i32, i32) {
        (
            i32::from(self.x.saturating_sub(1)),
            i32::from(self.y.saturating_sub(1)),
        )
    }
}
