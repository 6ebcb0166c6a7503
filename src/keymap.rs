//! Declarative key bindings.
//!
//! A [`Keymap`] is an ordered table of `(key, required modifiers) → Command`
//! entries. Lookup returns the first entry whose key matches and whose
//! required modifiers are all held, so specific bindings (Ctrl+`+` zooms)
//! are listed ahead of general ones (`+` pans). The main loop interprets
//! the resulting [`Command`]; nothing here touches the terminal.
//!
//! # Example
//!
//! ```
//! use termglass::input::{KeyCode, KeyEvent};
//! use termglass::keymap::{Command, Keymap};
//!
//! let keymap = Keymap::default();
//! assert_eq!(keymap.lookup(&KeyEvent::char('W')), Some(Command::PanUp));
//! assert_eq!(keymap.lookup(&KeyEvent::key(KeyCode::F(5))), Some(Command::LayersAll));
//! ```

use crate::input::{KeyCode, KeyEvent, KeyModifiers};

/// Zoom factor applied by one zoom key press.
pub const KEY_ZOOM_FACTOR: f64 = 1.25;

/// Multiplier applied by one autoplay speed key press.
pub const AUTOPLAY_RATE_FACTOR: f64 = 1.25;

/// Something the main loop can do in response to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Quit,
    /// Run one step now.
    Step,
    /// Zoom in around the cursor.
    ZoomIn,
    /// Zoom out around the cursor.
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    /// Zoom 1.0 around the screen centre.
    ResetZoom,
    AutoplayOff,
    /// Autoplay at 5 steps per second.
    AutoplaySlow,
    /// Autoplay at 30 steps per second.
    AutoplayFast,
    AutoplaySlower,
    AutoplayFaster,
    ToggleHelp,
    /// Every layer on.
    LayersAll,
    /// Only the map.
    LayersMap,
    /// Rulers and status bar only.
    LayersChrome,
    ToggleOverlays,
    ToggleColorMode,
    ToggleTooltip,
}

impl Command {
    /// Pan direction as a unit step, for the pan commands.
    #[must_use]
    pub const fn pan_direction(self) -> Option<(i32, i32)> {
        match self {
            Self::PanLeft => Some((-1, 0)),
            Self::PanRight => Some((1, 0)),
            Self::PanUp => Some((0, -1)),
            Self::PanDown => Some((0, 1)),
            _ => None,
        }
    }
}

/// One row of the binding table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub key: KeyCode,
    /// Modifiers that must be held. An empty set matches the bare key,
    /// with or without Shift; any other modifier makes it a different key.
    pub modifiers: KeyModifiers,
    pub command: Command,
}

impl Binding {
    #[must_use]
    pub const fn new(key: KeyCode, modifiers: KeyModifiers, command: Command) -> Self {
        Self {
            key,
            modifiers,
            command,
        }
    }

    const fn plain(key: KeyCode, command: Command) -> Self {
        Self::new(key, KeyModifiers::empty(), command)
    }

    fn matches(&self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.key != key {
            return false;
        }
        if self.modifiers.is_empty() {
            return modifiers.difference(KeyModifiers::SHIFT).is_empty();
        }
        modifiers.contains(self.modifiers)
    }
}

/// Ordered binding table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        use Command::{
            AutoplayFast, AutoplayFaster, AutoplayOff, AutoplaySlow, AutoplaySlower, LayersAll,
            LayersChrome, LayersMap, PanDown, PanLeft, PanRight, PanUp, Quit, ResetZoom, Step,
            ToggleColorMode, ToggleHelp, ToggleOverlays, ToggleTooltip, ZoomIn, ZoomOut,
        };
        use KeyCode::{Char, Down, Esc, F, Left, Right, Up};

        let ctrl = KeyModifiers::CTRL;
        let alt = KeyModifiers::ALT;
        let bindings = vec![
            Binding::new(Char('q'), ctrl, Quit),
            Binding::plain(Esc, Quit),
            Binding::plain(Char(' '), Step),
            // zoom needs a modifier; the bare keys pan vertically
            Binding::new(Char('+'), ctrl, ZoomIn),
            Binding::new(Char('+'), alt, ZoomIn),
            Binding::new(Char('='), ctrl, ZoomIn),
            Binding::new(Char('='), alt, ZoomIn),
            Binding::new(Char('-'), ctrl, ZoomOut),
            Binding::new(Char('-'), alt, ZoomOut),
            Binding::plain(Char('+'), PanUp),
            Binding::plain(Char('='), PanUp),
            Binding::plain(Char('-'), PanDown),
            Binding::plain(Left, PanLeft),
            Binding::plain(Right, PanRight),
            Binding::plain(Up, PanUp),
            Binding::plain(Down, PanDown),
            Binding::plain(Char('a'), PanLeft),
            Binding::plain(Char('d'), PanRight),
            Binding::plain(Char('w'), PanUp),
            Binding::plain(Char('s'), PanDown),
            Binding::plain(Char('0'), ResetZoom),
            Binding::plain(Char('1'), AutoplayOff),
            Binding::plain(Char('2'), AutoplaySlow),
            Binding::plain(Char('3'), AutoplayFast),
            Binding::plain(Char('['), AutoplaySlower),
            Binding::plain(Char(']'), AutoplayFaster),
            Binding::plain(F(1), ToggleHelp),
            Binding::plain(F(5), LayersAll),
            Binding::plain(F(6), LayersMap),
            Binding::plain(F(7), LayersChrome),
            Binding::plain(F(8), ToggleOverlays),
            Binding::plain(Char('c'), ToggleColorMode),
            Binding::plain(Char('t'), ToggleTooltip),
        ];
        Self { bindings }
    }
}

impl Keymap {
    /// A keymap with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a binding that takes precedence over existing ones.
    pub fn bind(&mut self, key: KeyCode, modifiers: KeyModifiers, command: Command) {
        self.bindings
            .insert(0, Binding::new(normalize(key), modifiers, command));
    }

    /// Remove every binding for `key`.
    pub fn unbind(&mut self, key: KeyCode) {
        let key = normalize(key);
        self.bindings.retain(|b| b.key != key);
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Command bound to a key event, if any.
    ///
    /// ASCII letters match case-insensitively.
    #[must_use]
    pub fn lookup(&self, event: &KeyEvent) -> Option<Command> {
        let key = normalize(event.code);
        self.bindings
            .iter()
            .find(|b| b.matches(key, event.modifiers))
            .map(|b| b.command)
    }
}

fn normalize(key: KeyCode) -> KeyCode {
    match key {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_bindings() {
        let keymap = Keymap::default();
        assert_eq!(
            keymap.lookup(&KeyEvent::with_ctrl(KeyCode::Char('q'))),
            Some(Command::Quit)
        );
        assert_eq!(keymap.lookup(&KeyEvent::key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(keymap.lookup(&KeyEvent::char('q')), None);
    }

    #[test]
    fn test_plus_minus_need_modifier_to_zoom() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup(&KeyEvent::char('+')), Some(Command::PanUp));
        assert_eq!(keymap.lookup(&KeyEvent::char('-')), Some(Command::PanDown));
        assert_eq!(
            keymap.lookup(&KeyEvent::with_ctrl(KeyCode::Char('+'))),
            Some(Command::ZoomIn)
        );
        assert_eq!(
            keymap.lookup(&KeyEvent::with_alt(KeyCode::Char('-'))),
            Some(Command::ZoomOut)
        );
        assert_eq!(
            keymap.lookup(&KeyEvent::with_alt(KeyCode::Char('='))),
            Some(Command::ZoomIn)
        );
    }

    #[test]
    fn test_plain_bindings_reject_ctrl_and_alt() {
        let keymap = Keymap::default();
        // raw mode turns Ctrl+C into 'c' with CTRL held
        assert_eq!(keymap.lookup(&KeyEvent::with_ctrl(KeyCode::Char('c'))), None);
        for ch in ['w', 'a', 's', 'd', 't', ' '] {
            assert_eq!(keymap.lookup(&KeyEvent::with_ctrl(KeyCode::Char(ch))), None, "{ch}");
            assert_eq!(keymap.lookup(&KeyEvent::with_alt(KeyCode::Char(ch))), None, "{ch}");
        }
        let shifted = KeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT);
        assert_eq!(keymap.lookup(&shifted), Some(Command::PanUp));
        let shifted_f5 = KeyEvent::new(KeyCode::F(5), KeyModifiers::SHIFT);
        assert_eq!(keymap.lookup(&shifted_f5), Some(Command::LayersAll));
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup(&KeyEvent::char('W')), Some(Command::PanUp));
        assert_eq!(keymap.lookup(&KeyEvent::char('C')), Some(Command::ToggleColorMode));
        assert_eq!(keymap.lookup(&KeyEvent::char('t')), Some(Command::ToggleTooltip));
    }

    #[test]
    fn test_function_key_presets() {
        let keymap = Keymap::default();
        let f = |n| keymap.lookup(&KeyEvent::key(KeyCode::F(n)));
        assert_eq!(f(1), Some(Command::ToggleHelp));
        assert_eq!(f(5), Some(Command::LayersAll));
        assert_eq!(f(6), Some(Command::LayersMap));
        assert_eq!(f(7), Some(Command::LayersChrome));
        assert_eq!(f(8), Some(Command::ToggleOverlays));
        assert_eq!(f(2), None);
    }

    #[test]
    fn test_autoplay_keys() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup(&KeyEvent::char('1')), Some(Command::AutoplayOff));
        assert_eq!(keymap.lookup(&KeyEvent::char('2')), Some(Command::AutoplaySlow));
        assert_eq!(keymap.lookup(&KeyEvent::char('3')), Some(Command::AutoplayFast));
        assert_eq!(keymap.lookup(&KeyEvent::char('[')), Some(Command::AutoplaySlower));
        assert_eq!(keymap.lookup(&KeyEvent::char(']')), Some(Command::AutoplayFaster));
        assert_eq!(keymap.lookup(&KeyEvent::char(' ')), Some(Command::Step));
    }

    #[test]
    fn test_bind_overrides_and_unbind() {
        let mut keymap = Keymap::default();
        keymap.bind(KeyCode::Char('W'), KeyModifiers::empty(), Command::Step);
        assert_eq!(keymap.lookup(&KeyEvent::char('w')), Some(Command::Step));
        keymap.unbind(KeyCode::Char('w'));
        assert_eq!(keymap.lookup(&KeyEvent::char('w')), None);
        assert!(Keymap::empty().lookup(&KeyEvent::char(' ')).is_none());
    }

    #[test]
    fn test_pan_direction() {
        assert_eq!(Command::PanLeft.pan_direction(), Some((-1, 0)));
        assert_eq!(Command::PanDown.pan_direction(), Some((0, 1)));
        assert_eq!(Command::Step.pan_direction(), None);
    }
}
