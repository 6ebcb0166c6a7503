//! The main loop: input, stepping and rendering on one thread.
//!
//! Each [`tick`](MainLoop::tick) runs the same fixed sequence:
//!
//! 1. detect a terminal resize and rebuild the buffer,
//! 2. drain a bounded number of key events and run their commands,
//! 3. route the mouse to windows first, then wheel zoom and drag panning,
//! 4. work out how many steps are due (manual request + autoplay),
//! 5. step and render when anything is dirty, otherwise stay idle.
//!
//! [`run`](MainLoop::run) wraps ticks with terminal setup, the input thread
//! and frame-rate throttling. Tests drive `tick` directly against a
//! headless [`Terminal`].

mod overlay;
mod scheduler;

pub use overlay::{HELP_Z, StatusInfo, draw_rulers, draw_status_bar, draw_tooltip, help_window, status_line};
pub use scheduler::{FpsMeter, StepScheduler};

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::config::{ColorMode, UiLayers, VizConfig};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_event, emit_log};
use crate::frame::{Frame, TooltipProvider};
use crate::input::{InputReader, InputState};
use crate::keymap::{AUTOPLAY_RATE_FACTOR, Command, KEY_ZOOM_FACTOR, Keymap};
use crate::terminal::Terminal;
use crate::viewport::Viewport;
use crate::window::{WindowId, WindowManager};
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

/// Wheel zoom factor per notch.
pub const WHEEL_ZOOM_BASE: f64 = 1.1;

/// Autoplay rate of the "slow" preset.
pub const AUTOPLAY_SLOW: f64 = 5.0;

/// Autoplay rate of the "fast" preset.
pub const AUTOPLAY_FAST: f64 = 30.0;

/// Sleep when a tick had nothing to do.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

type ProcessFn<'h> = Box<dyn FnMut() -> bool + 'h>;
type DrawFn<'h> = Box<dyn FnMut(&mut Frame<'_, 'h>, bool) + 'h>;
type HostTooltipFn<'h> = Box<dyn FnMut(i64, i64) -> Option<String> + 'h>;
type StatusFn<'h> = Box<dyn FnMut() -> String + 'h>;

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// False once a quit key was handled.
    pub running: bool,
    /// A frame was drawn and flushed.
    pub rendered: bool,
    /// Step callback invocations this tick.
    pub steps: u32,
}

/// Single-threaded visualization loop.
pub struct MainLoop<'h, W: Write> {
    terminal: Terminal<W>,
    config: VizConfig,
    keymap: Keymap,
    viewport: Viewport,
    buffer: CellBuffer,
    input: InputState,
    windows: WindowManager,
    scheduler: StepScheduler,
    fps: FpsMeter,
    process: ProcessFn<'h>,
    draw: DrawFn<'h>,
    tooltip: Option<HostTooltipFn<'h>>,
    status: Option<StatusFn<'h>>,
    steps_active: bool,
    step_requested: bool,
    tooltip_enabled: bool,
    help: Option<WindowId>,
    running: bool,
}

impl<'h, W: Write> MainLoop<'h, W> {
    /// Build a loop around `terminal`.
    ///
    /// `process` is the step callback; returning false stops stepping for
    /// good while rendering continues. `draw` receives the frame and whether
    /// stepping has finished.
    pub fn new<P, D>(terminal: Terminal<W>, config: VizConfig, process: P, draw: D) -> Self
    where
        P: FnMut() -> bool + 'h,
        D: FnMut(&mut Frame<'_, 'h>, bool) + 'h,
    {
        let (width, height) = terminal.size();
        let buffer = CellBuffer::new(width, height);
        let mut viewport = Viewport::new(i32::from(width), i32::from(height))
            .with_margins(i32::from(config.left_ruler_width.max(1)), 1)
            .with_zoom_limits(config.min_zoom, config.max_zoom)
            .with_zoom(1.0);
        if config.center_at_zero {
            viewport = viewport.centered_on(0.0, 0.0);
        }

        let mut terminal = terminal;
        terminal.set_color_mode(config.color_mode);

        let (input, _sink) = InputState::channel();
        input.mark_dirty();

        Self {
            terminal,
            config,
            keymap: Keymap::default(),
            viewport,
            buffer,
            input,
            windows: WindowManager::new(),
            scheduler: StepScheduler::new(),
            fps: FpsMeter::default(),
            process: Box::new(process),
            draw: Box::new(draw),
            tooltip: None,
            status: None,
            steps_active: true,
            step_requested: false,
            tooltip_enabled: true,
            help: None,
            running: true,
        }
    }

    /// Tooltip text for the world cell under the cursor.
    #[must_use]
    pub fn with_tooltip<F>(mut self, tooltip: F) -> Self
    where
        F: FnMut(i64, i64) -> Option<String> + 'h,
    {
        self.tooltip = Some(Box::new(tooltip));
        self
    }

    /// Host text shown at the right of the status bar.
    #[must_use]
    pub fn with_status<F>(mut self, status: F) -> Self
    where
        F: FnMut() -> String + 'h,
    {
        self.status = Some(Box::new(status));
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn buffer(&self) -> &CellBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn terminal(&self) -> &Terminal<W> {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<W> {
        &mut self.terminal
    }

    #[must_use]
    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowManager {
        &mut self.windows
    }

    /// The help window, while it exists.
    #[must_use]
    pub fn help_window(&self) -> Option<WindowId> {
        self.help
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the step callback is still being invoked.
    #[must_use]
    pub fn steps_active(&self) -> bool {
        self.steps_active
    }

    #[must_use]
    pub fn tooltip_enabled(&self) -> bool {
        self.tooltip_enabled
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    /// Run until a quit key: set up the terminal, start the input thread,
    /// tick and throttle, then restore everything.
    pub fn run(mut self) -> Result<()> {
        let (width, height) = self.terminal.size();
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions {
                width: u32::from(width),
                height: u32::from(height),
            });
        }

        self.terminal.enter()?;
        emit_log(
            LogLevel::Info,
            &format!("main loop started at {width}x{height}"),
        );

        let mut reader = InputReader::spawn(self.input.sink())?;
        let result = self.run_ticks();
        let stopped = reader.stop();
        self.terminal.cleanup()?;
        emit_log(LogLevel::Info, "main loop stopped");
        result.and(stopped)
    }

    fn run_ticks(&mut self) -> Result<()> {
        let mut last = Instant::now();
        while self.running {
            let tick_start = Instant::now();
            let elapsed = tick_start.duration_since(last);
            last = tick_start;

            let outcome = self.tick(elapsed)?;
            if !outcome.rendered {
                thread::sleep(IDLE_SLEEP);
            }
            if self.config.target_fps > 0 {
                let budget = Duration::from_secs(1) / self.config.target_fps;
                if let Some(rest) = budget.checked_sub(tick_start.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }
        Ok(())
    }

    /// Run one iteration with `elapsed` wall time since the previous one.
    pub fn tick(&mut self, elapsed: Duration) -> Result<TickOutcome> {
        self.handle_resize()?;
        self.handle_keys()?;
        self.handle_mouse();

        if self.config.autoplay && self.config.continuous_render_when_autoplay {
            self.input.mark_dirty();
        }

        let mut due = u32::from(std::mem::take(&mut self.step_requested));
        due += self
            .scheduler
            .advance(elapsed, self.config.auto_steps_per_second, self.config.autoplay);

        let mut outcome = TickOutcome {
            running: self.running,
            ..TickOutcome::default()
        };
        if self.input.is_dirty() || due > 0 {
            for _ in 0..due {
                if !self.steps_active {
                    break;
                }
                outcome.steps += 1;
                self.steps_active = (self.process)();
                if !self.steps_active {
                    emit_event("steps_finished", "");
                }
            }
            self.render()?;
            self.input.clear_transients();
            outcome.rendered = true;
        }
        Ok(outcome)
    }

    fn handle_resize(&mut self) -> Result<()> {
        if !self.terminal.refresh_size() {
            return Ok(());
        }
        let (width, height) = self.terminal.size();
        self.buffer = CellBuffer::new(width, height);
        self.viewport = self
            .viewport
            .with_screen_size(i32::from(width), i32::from(height));
        self.terminal.clear()?;
        self.terminal.enable_mouse()?;
        self.input.request_reset();
        self.windows
            .clamp_all(i32::from(width), i32::from(height));
        self.input.mark_dirty();

        emit_log(LogLevel::Debug, &format!("terminal resized to {width}x{height}"));
        emit_event("resize", &format!("{width}x{height}"));
        Ok(())
    }

    fn handle_keys(&mut self) -> Result<()> {
        for key in self.input.drain_keys(self.config.max_key_events_per_tick) {
            let Some(command) = self.keymap.lookup(&key) else {
                continue;
            };
            if command == Command::Quit {
                self.running = false;
                emit_event("quit", "");
                break;
            }
            self.execute(command)?;
        }
        Ok(())
    }

    /// Apply a command as if its key had been pressed.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Quit => {
                self.running = false;
                emit_event("quit", "");
            }
            Command::Step => self.step_requested = true,
            Command::ZoomIn => self.zoom_at_cursor(KEY_ZOOM_FACTOR),
            Command::ZoomOut => self.zoom_at_cursor(1.0 / KEY_ZOOM_FACTOR),
            Command::PanLeft | Command::PanRight | Command::PanUp | Command::PanDown => {
                if let Some((dx, dy)) = command.pan_direction() {
                    self.pan_by_keys(dx, dy);
                }
            }
            Command::ResetZoom => {
                let (cx, cy) = self.viewport.screen_center();
                self.viewport = self.viewport.reset_zoom_around_screen_point(cx, cy, 1.0);
            }
            Command::AutoplayOff => self.config.autoplay = false,
            Command::AutoplaySlow => {
                self.config.autoplay = true;
                self.config.auto_steps_per_second = AUTOPLAY_SLOW;
            }
            Command::AutoplayFast => {
                self.config.autoplay = true;
                self.config.auto_steps_per_second = AUTOPLAY_FAST;
            }
            Command::AutoplaySlower => {
                self.config.auto_steps_per_second = (self.config.auto_steps_per_second
                    / AUTOPLAY_RATE_FACTOR)
                    .max(VizConfig::MIN_STEPS_PER_SECOND);
            }
            Command::AutoplayFaster => {
                self.config.auto_steps_per_second *= AUTOPLAY_RATE_FACTOR;
            }
            Command::ToggleHelp => self.toggle_help(),
            Command::LayersAll => self.config.layers = UiLayers::ALL,
            Command::LayersMap => self.config.layers = UiLayers::MAP,
            Command::LayersChrome => self.config.layers = UiLayers::RULERS | UiLayers::STATUS_BAR,
            Command::ToggleOverlays => self.config.layers.toggle(UiLayers::OVERLAYS),
            Command::ToggleColorMode => {
                self.config.color_mode = self.config.color_mode.toggled();
                self.terminal.set_color_mode(self.config.color_mode);
                self.terminal.clear()?;
            }
            Command::ToggleTooltip => self.tooltip_enabled = !self.tooltip_enabled,
        }
        self.input.mark_dirty();
        Ok(())
    }

    fn toggle_help(&mut self) {
        if let Some(id) = self.help.filter(|id| self.windows.contains(*id)) {
            self.windows.toggle_visible(id);
            return;
        }
        let (w, h) = self.buffer.size();
        self.help = Some(self.windows.create(help_window(w, h)));
    }

    fn mouse_on_screen(&self) -> (i32, i32) {
        let (mx, my) = self.input.mouse_position();
        let (w, h) = self.buffer.size();
        (mx.clamp(0, (w - 1).max(0)), my.clamp(0, (h - 1).max(0)))
    }

    fn zoom_at_cursor(&mut self, factor: f64) {
        let (sx, sy) = self.mouse_on_screen();
        let (wx, wy) = self.viewport.screen_to_world(sx, sy);
        self.viewport = self.viewport.zoomed_around(wx, wy, factor);
    }

    fn pan_by_keys(&mut self, dx: i32, dy: i32) {
        let (vw, vh) = self.viewport.visible_world_size();
        let frac = self.config.pan_key_step_frac;
        self.viewport = self
            .viewport
            .panned(f64::from(dx) * vw * frac, f64::from(dy) * vh * frac);
    }

    fn handle_mouse(&mut self) {
        let (w, h) = self.buffer.size();
        let result = self.windows.handle_mouse(&self.input, w, h);
        if result.changed {
            self.input.mark_dirty();
        }
        if self.help.is_some_and(|id| !self.windows.contains(id)) {
            self.help = None;
        }

        let wheel = self.input.consume_wheel();
        if wheel != 0 {
            self.zoom_at_cursor(WHEEL_ZOOM_BASE.powi(wheel));
            self.input.mark_dirty();
        }

        // Window drags swallow the movement; the scene only pans otherwise
        let (dx, dy) = self.input.consume_drag_delta();
        if result.captured || (dx == 0 && dy == 0) {
            return;
        }
        let mul = self.config.pan_speed / self.viewport.zoom();
        self.viewport = self
            .viewport
            .panned(-f64::from(dx) * mul, -f64::from(dy) * mul);
        self.input.mark_dirty();
    }

    fn render(&mut self) -> Result<()> {
        self.input.clear_dirty();
        self.buffer
            .set_alpha_blend(self.config.color_mode == ColorMode::TrueColor);
        self.buffer.fill(Cell::BLANK);

        let completed = !self.steps_active;
        let mut frame = Frame::new(
            &mut self.buffer,
            &self.viewport,
            &self.input,
            &self.config,
            &mut self.windows,
        );
        (self.draw)(&mut frame, completed);
        let mut frame_tooltip: Option<TooltipProvider<'h>> = frame.take_tooltip();

        let host_status = self.status.as_mut().map(|f| f()).unwrap_or_default();
        let mouse = self.input.mouse_position();

        if self.config.layers.contains(UiLayers::RULERS) {
            draw_rulers(&mut self.buffer, &self.viewport, &self.config, mouse);
        }

        self.windows.draw_all(&mut self.buffer);

        if self.tooltip_enabled && self.config.layers.contains(UiLayers::OVERLAYS) {
            let provider: Option<&mut dyn FnMut(i64, i64) -> Option<String>> =
                if let Some(p) = frame_tooltip.as_mut() {
                    Some(&mut **p)
                } else if let Some(p) = self.tooltip.as_mut() {
                    Some(&mut **p)
                } else {
                    None
                };
            if let Some(provider) = provider {
                draw_tooltip(
                    &mut self.buffer,
                    &self.viewport,
                    &self.config,
                    &self.windows,
                    mouse,
                    provider,
                );
            }
        }

        if self.config.layers.contains(UiLayers::STATUS_BAR) {
            let (cx, cy) = self.viewport.world_cell_under_screen(mouse.0, mouse.1);
            let info = StatusInfo {
                zoom: self.viewport.zoom(),
                fps: self.fps.fps(),
                cell: (cx, cy),
                host: &host_status,
            };
            draw_status_bar(&mut self.buffer, &self.config, &info);
        }

        self.terminal.draw(&self.buffer)?;

        if self.config.autoplay {
            self.fps.record_frame(Instant::now());
        }
        Ok(())
    }
}
