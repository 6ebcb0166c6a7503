//! Thread-safe input mailbox shared by the reader thread and the main loop.
//!
//! Discrete key events travel through an unbounded channel and are drained a
//! bounded number at a time by the loop. Continuous mouse state (position,
//! held buttons, wheel and drag accumulators) lives in atomics: the reader
//! is the only writer, readers accept brief staleness but never see a torn
//! value. The cursor position is packed into one word so its two axes are
//! always read together.

use crate::input::event::Event;
use crate::input::keyboard::KeyEvent;
use crate::terminal::{MouseButton, MouseButtons, MouseEvent, MouseEventKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Default)]
struct Shared {
    position: AtomicU32,
    buttons: AtomicU8,
    wheel: AtomicI32,
    drag_dx: AtomicI32,
    drag_dy: AtomicI32,
    left_press: AtomicBool,
    left_press_position: AtomicU32,
    left_release: AtomicBool,
    mouse_moved: AtomicBool,
    dirty: AtomicBool,
    reset_requested: AtomicBool,
}

fn pack(x: i32, y: i32) -> u32 {
    let x = x.clamp(0, i32::from(u16::MAX)) as u32;
    let y = y.clamp(0, i32::from(u16::MAX)) as u32;
    (x << 16) | y
}

fn unpack(packed: u32) -> (i32, i32) {
    ((packed >> 16) as i32, (packed & 0xffff) as i32)
}

/// Loop-side half of the input mailbox.
#[derive(Debug)]
pub struct InputState {
    keys: Receiver<KeyEvent>,
    sender: Sender<KeyEvent>,
    shared: Arc<Shared>,
}

/// Writer half of the input mailbox, owned by the reader thread.
#[derive(Clone, Debug)]
pub struct InputSink {
    keys: Sender<KeyEvent>,
    shared: Arc<Shared>,
}

impl InputState {
    /// Create a connected state/sink pair.
    #[must_use]
    pub fn channel() -> (Self, InputSink) {
        let (sender, keys) = mpsc::channel();
        let shared = Arc::new(Shared::default());
        let sink = InputSink {
            keys: sender.clone(),
            shared: Arc::clone(&shared),
        };
        (
            Self {
                keys,
                sender,
                shared,
            },
            sink,
        )
    }

    /// Another writer handle for this mailbox.
    #[must_use]
    pub fn sink(&self) -> InputSink {
        InputSink {
            keys: self.sender.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Dequeue at most `max` key events in arrival order.
    pub fn drain_keys(&self, max: usize) -> Vec<KeyEvent> {
        let mut out = Vec::new();
        while out.len() < max {
            match self.keys.try_recv() {
                Ok(key) => out.push(key),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Zero-based screen cell under the cursor.
    #[must_use]
    pub fn mouse_position(&self) -> (i32, i32) {
        unpack(self.shared.position.load(Ordering::Acquire))
    }

    /// Buttons currently held.
    #[must_use]
    pub fn buttons(&self) -> MouseButtons {
        MouseButtons::from_bits_truncate(self.shared.buttons.load(Ordering::Acquire))
    }

    /// Whether a pan-capable button (left or right) is held.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.buttons()
            .intersects(MouseButtons::LEFT | MouseButtons::RIGHT)
    }

    /// Take the accumulated wheel steps (positive is up).
    pub fn consume_wheel(&self) -> i32 {
        self.shared.wheel.swap(0, Ordering::AcqRel)
    }

    /// Take the accumulated drag movement in screen cells.
    pub fn consume_drag_delta(&self) -> (i32, i32) {
        (
            self.shared.drag_dx.swap(0, Ordering::AcqRel),
            self.shared.drag_dy.swap(0, Ordering::AcqRel),
        )
    }

    /// Take the latched left-button press, if one happened since last call.
    pub fn take_left_press(&self) -> Option<(i32, i32)> {
        self.shared
            .left_press
            .swap(false, Ordering::AcqRel)
            .then(|| unpack(self.shared.left_press_position.load(Ordering::Acquire)))
    }

    /// Take the latched left-button release.
    pub fn take_left_release(&self) -> bool {
        self.shared.left_release.swap(false, Ordering::AcqRel)
    }

    /// Whether the cursor moved since the last call.
    pub fn take_mouse_moved(&self) -> bool {
        self.shared.mouse_moved.swap(false, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }

    pub fn mark_dirty(&self) {
        self.shared.dirty.store(true, Ordering::Release);
    }

    pub fn clear_dirty(&self) {
        self.shared.dirty.store(false, Ordering::Release);
    }

    /// Ask the reader to drop any partial escape sequence.
    pub fn request_reset(&self) {
        self.shared.reset_requested.store(true, Ordering::Release);
    }

    /// Drop per-tick transients that nobody consumed.
    pub fn clear_transients(&self) {
        self.shared.left_release.store(false, Ordering::Release);
        self.shared.mouse_moved.store(false, Ordering::Release);
    }
}

impl InputSink {
    /// Queue a key event.
    pub fn push_key(&self, key: KeyEvent) {
        // The loop owns the receiver; after it is gone keys have nowhere to go
        let _ = self.keys.send(key);
        self.shared.dirty.store(true, Ordering::Release);
    }

    /// Fold a mouse event into the continuous state.
    pub fn apply_mouse(&self, event: &MouseEvent) {
        let shared = &self.shared;
        let (x, y) = event.cell();
        let (prev_x, prev_y) = unpack(shared.position.swap(pack(x, y), Ordering::AcqRel));
        if (prev_x, prev_y) != (x, y) {
            shared.mouse_moved.store(true, Ordering::Release);
        }

        let mask = event.button.mask().bits();
        match event.kind {
            MouseEventKind::Press => {
                shared.buttons.fetch_or(mask, Ordering::AcqRel);
                if event.button == MouseButton::Left {
                    shared
                        .left_press_position
                        .store(pack(x, y), Ordering::Release);
                    shared.left_press.store(true, Ordering::Release);
                }
            }
            MouseEventKind::Release => {
                if event.button == MouseButton::None {
                    shared.buttons.store(0, Ordering::Release);
                } else {
                    shared.buttons.fetch_and(!mask, Ordering::AcqRel);
                }
                if matches!(event.button, MouseButton::Left | MouseButton::None) {
                    shared.left_release.store(true, Ordering::Release);
                }
            }
            MouseEventKind::Drag => {
                shared.buttons.fetch_or(mask, Ordering::AcqRel);
                if matches!(event.button, MouseButton::Left | MouseButton::Right) {
                    shared.drag_dx.fetch_add(x - prev_x, Ordering::AcqRel);
                    shared.drag_dy.fetch_add(y - prev_y, Ordering::AcqRel);
                }
            }
            MouseEventKind::Move => {
                // Motion with nothing held recovers from a lost release
                shared.buttons.store(0, Ordering::Release);
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                shared.wheel.fetch_add(event.wheel_delta(), Ordering::AcqRel);
            }
        }
        shared.dirty.store(true, Ordering::Release);
    }

    /// Route a decoded event to the key queue or the mouse state.
    pub fn apply(&self, event: Event) {
        match event {
            Event::Key(key) => self.push_key(key),
            Event::Mouse(mouse) => self.apply_mouse(&mouse),
        }
    }

    /// Take a pending reset request.
    pub fn take_reset(&self) -> bool {
        self.shared.reset_requested.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keyboard::KeyCode;

    #[test]
    fn test_drain_is_bounded_and_ordered() {
        let (state, sink) = InputState::channel();
        for i in 0..10u8 {
            sink.push_key(KeyEvent::char((b'a' + i) as char));
        }
        let first = state.drain_keys(4);
        assert_eq!(first.len(), 4);
        assert_eq!(first[0], KeyEvent::char('a'));
        assert_eq!(first[3], KeyEvent::char('d'));
        let rest = state.drain_keys(64);
        assert_eq!(rest.len(), 6);
        assert_eq!(rest[0], KeyEvent::char('e'));
        assert!(state.drain_keys(64).is_empty());
    }

    #[test]
    fn test_mouse_position_is_zero_based() {
        let (state, sink) = InputState::channel();
        sink.apply_mouse(&MouseEvent::new(10, 5, MouseButton::None, MouseEventKind::Move));
        assert_eq!(state.mouse_position(), (9, 4));
        assert!(state.take_mouse_moved());
        assert!(!state.take_mouse_moved());
        assert!(state.is_dirty());
    }

    #[test]
    fn test_wheel_accumulates_without_keys() {
        let (state, sink) = InputState::channel();
        let up = MouseEvent::new(3, 3, MouseButton::None, MouseEventKind::ScrollUp);
        let down = MouseEvent::new(3, 3, MouseButton::None, MouseEventKind::ScrollDown);
        sink.apply_mouse(&up);
        sink.apply_mouse(&up);
        sink.apply_mouse(&down);
        sink.apply_mouse(&up);
        assert_eq!(state.consume_wheel(), 2);
        assert_eq!(state.consume_wheel(), 0);
        assert!(state.drain_keys(8).is_empty());
    }

    #[test]
    fn test_drag_delta_and_buttons() {
        let (state, sink) = InputState::channel();
        sink.apply_mouse(&MouseEvent::press(5, 5, MouseButton::Left));
        assert!(state.is_dragging());
        assert_eq!(state.take_left_press(), Some((4, 4)));
        assert_eq!(state.take_left_press(), None);

        sink.apply_mouse(&MouseEvent::new(7, 6, MouseButton::Left, MouseEventKind::Drag));
        sink.apply_mouse(&MouseEvent::new(8, 4, MouseButton::Left, MouseEventKind::Drag));
        assert_eq!(state.consume_drag_delta(), (3, -1));
        assert_eq!(state.consume_drag_delta(), (0, 0));

        sink.apply_mouse(&MouseEvent::release(8, 4, MouseButton::Left));
        assert!(!state.is_dragging());
        assert!(state.take_left_release());
    }

    #[test]
    fn test_middle_drag_does_not_pan() {
        let (state, sink) = InputState::channel();
        sink.apply_mouse(&MouseEvent::press(1, 1, MouseButton::Middle));
        sink.apply_mouse(&MouseEvent::new(4, 4, MouseButton::Middle, MouseEventKind::Drag));
        assert_eq!(state.consume_drag_delta(), (0, 0));
        assert!(!state.is_dragging());
        assert!(state.buttons().contains(MouseButtons::MIDDLE));
    }

    #[test]
    fn test_move_clears_stuck_buttons() {
        let (state, sink) = InputState::channel();
        sink.apply_mouse(&MouseEvent::press(1, 1, MouseButton::Right));
        sink.apply_mouse(&MouseEvent::new(2, 2, MouseButton::None, MouseEventKind::Move));
        assert!(state.buttons().is_empty());
    }

    #[test]
    fn test_reset_request_round_trip() {
        let (state, sink) = InputState::channel();
        assert!(!sink.take_reset());
        state.request_reset();
        assert!(sink.take_reset());
        assert!(!sink.take_reset());
    }

    #[test]
    fn test_sink_from_state_feeds_same_queue() {
        let (state, _sink) = InputState::channel();
        state.sink().apply(Event::Key(KeyEvent::key(KeyCode::F(1))));
        assert_eq!(state.drain_keys(1), vec![KeyEvent::key(KeyCode::F(1))]);
    }

    #[test]
    fn test_keys_cross_threads() {
        let (state, sink) = InputState::channel();
        let handle = std::thread::spawn(move || {
            for _ in 0..100 {
                sink.push_key(KeyEvent::char('x'));
            }
        });
        handle.join().unwrap();
        assert_eq!(state.drain_keys(1000).len(), 100);
    }
}
