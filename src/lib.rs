//! `termglass` - terminal visualization engine
//!
//! Renders a host-supplied 2D world into a cell buffer through a pannable,
//! zoomable camera, composites rulers, a status bar, tooltips and draggable
//! windows on top, and drives everything from a single-threaded loop fed by
//! a background SGR mouse and keyboard reader.
//!
//! ```no_run
//! use termglass::{Cell, GridWorld, Rgb, VizConfig};
//!
//! let world = GridWorld::new(64, 32, Cell::new('.', Rgb::GRAY, Rgb::BLACK));
//! let mut t = 0i64;
//! termglass::run(
//!     VizConfig::default().with_autoplay(10.0),
//!     || {
//!         t += 1;
//!         true
//!     },
//!     |frame, _done| frame.draw_world(&world),
//! )
//! .unwrap();
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow InputState in input etc
#![allow(clippy::struct_excessive_bools)] // Terminal state needs multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::too_many_arguments)] // Drawing primitives take a rect and a cell
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod ansi;
pub mod app;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod frame;
pub mod input;
pub mod keymap;
pub mod renderer;
pub mod session;
pub mod terminal;
pub mod viewport;
pub mod window;
pub mod world;

// Re-export core types at crate root
pub use buffer::CellBuffer;
pub use cell::Cell;
pub use color::Rgb;
pub use config::{ColorMode, UiLayers, VizConfig};
pub use error::{Error, Result};
pub use event::{
    LogLevel, clear_event_callback, clear_log_callback, emit_event, emit_log, set_event_callback,
    set_log_callback,
};
pub use viewport::Viewport;
pub use world::{GridWorld, WorldSource};

// Re-export input types
pub use input::{
    Event, InputParser, InputReader, InputState, KeyCode, KeyEvent, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

// Re-export the loop and its collaborators
pub use app::{MainLoop, TickOutcome};
pub use frame::{Frame, TooltipProvider};
pub use keymap::{Command, Keymap};
pub use session::{Session, StepGate, StepOutcome};
pub use terminal::{Terminal, is_tty};
pub use window::{CloseAction, Window, WindowId, WindowManager};

/// Visualize on stdout until the user quits.
///
/// `process` advances the host simulation by one step and returns false when
/// there is nothing left to do; rendering continues after that. `draw` paints
/// the scene for each frame and is told whether stepping has finished.
pub fn run<'h, P, D>(config: VizConfig, process: P, draw: D) -> Result<()>
where
    P: FnMut() -> bool + 'h,
    D: FnMut(&mut Frame<'_, 'h>, bool) + 'h,
{
    run_with(config, process, draw, |_, _| None, String::new)
}

/// [`run`] with a tooltip provider for the world cell under the cursor and
/// host text for the right of the status bar.
pub fn run_with<'h, P, D, T, S>(
    config: VizConfig,
    process: P,
    draw: D,
    tooltip: T,
    status: S,
) -> Result<()>
where
    P: FnMut() -> bool + 'h,
    D: FnMut(&mut Frame<'_, 'h>, bool) + 'h,
    T: FnMut(i64, i64) -> Option<String> + 'h,
    S: FnMut() -> String + 'h,
{
    let stdout = std::io::stdout();
    if !is_tty(&stdout) {
        return Err(Error::NotATerminal);
    }
    MainLoop::new(Terminal::new(stdout), config, process, draw)
        .with_tooltip(tooltip)
        .with_status(status)
        .run()
}
