//! Run configuration.
//!
//! [`VizConfig`] is handed to [`run`](crate::run) once and then owned by the
//! main loop, which mutates a few fields live in response to shortcuts
//! (autoplay, step rate, layers, colour mode).

use crate::color::Rgb;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Independently toggled layers of the visualization.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct UiLayers: u8 {
        /// The sampled world.
        const MAP = 0b0000_0001;
        /// Top and left rulers.
        const RULERS = 0b0000_0010;
        /// Bottom status bar.
        const STATUS_BAR = 0b0000_0100;
        /// World-space primitives, frame text and tooltips.
        const OVERLAYS = 0b0000_1000;
        const ALL = Self::MAP.bits() | Self::RULERS.bits() | Self::STATUS_BAR.bits() | Self::OVERLAYS.bits();
    }
}

impl Default for UiLayers {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for UiLayers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        if *self == Self::ALL {
            return f.write_str("All");
        }
        let names = [
            (Self::MAP, "Map"),
            (Self::RULERS, "Rulers"),
            (Self::STATUS_BAR, "StatusBar"),
            (Self::OVERLAYS, "Overlays"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Terminal colour output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// 24-bit SGR colours with alpha compositing.
    #[default]
    TrueColor,
    /// Basic 16-colour palette; alpha blends collapse to opaque writes.
    Console16,
}

impl ColorMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::TrueColor => Self::Console16,
            Self::Console16 => Self::TrueColor,
        }
    }

    /// Short name shown in the status bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TrueColor => "TrueColor",
            Self::Console16 => "Console16",
        }
    }
}

/// Visualization settings.
#[derive(Clone, Debug, PartialEq)]
pub struct VizConfig {
    pub color_mode: ColorMode,
    /// Tick rate cap; 0 disables throttling.
    pub target_fps: u32,
    pub autoplay: bool,
    pub auto_steps_per_second: f64,
    /// Mouse drag multiplier (world units per cell at zoom 1).
    pub pan_speed: f64,
    /// Fraction of the visible world moved per pan key press.
    pub pan_key_step_frac: f64,
    pub layers: UiLayers,
    pub ruler_bg: Rgb,
    pub ruler_bg_alpha: u8,
    pub ruler_highlight: Rgb,
    pub ruler_highlight_alpha: u8,
    pub left_ruler_width: u16,
    pub tooltip_bg_alpha: u8,
    pub tooltip_border_alpha: u8,
    /// Redraw every tick while autoplay is on, even when nothing is dirty.
    pub continuous_render_when_autoplay: bool,
    /// Put world (0, 0) at the screen centre instead of the top-left map cell.
    pub center_at_zero: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Upper bound on key events handled per tick.
    pub max_key_events_per_tick: usize,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::TrueColor,
            target_fps: 30,
            autoplay: false,
            auto_steps_per_second: 5.0,
            pan_speed: 2.0,
            pan_key_step_frac: 0.10,
            layers: UiLayers::ALL,
            ruler_bg: Rgb::new(40, 40, 40),
            ruler_bg_alpha: 120,
            ruler_highlight: Rgb::new(80, 140, 240),
            ruler_highlight_alpha: 160,
            left_ruler_width: 4,
            tooltip_bg_alpha: 180,
            tooltip_border_alpha: 220,
            continuous_render_when_autoplay: true,
            center_at_zero: false,
            min_zoom: crate::viewport::DEFAULT_MIN_ZOOM,
            max_zoom: crate::viewport::DEFAULT_MAX_ZOOM,
            max_key_events_per_tick: 64,
        }
    }
}

impl VizConfig {
    /// Slowest autoplay rate reachable with the `[` shortcut.
    pub const MIN_STEPS_PER_SECOND: f64 = 0.2;

    #[must_use]
    pub fn with_autoplay(mut self, steps_per_second: f64) -> Self {
        self.autoplay = true;
        self.auto_steps_per_second = steps_per_second.max(Self::MIN_STEPS_PER_SECOND);
        self
    }

    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    #[must_use]
    pub fn with_layers(mut self, layers: UiLayers) -> Self {
        self.layers = layers;
        self
    }

    #[must_use]
    pub fn with_center_at_zero(mut self, center: bool) -> Self {
        self.center_at_zero = center;
        self
    }

    #[must_use]
    pub fn with_pan_speed(mut self, speed: f64) -> Self {
        self.pan_speed = speed;
        self
    }

    #[must_use]
    pub fn with_zoom_limits(mut self, min: f64, max: f64) -> Self {
        self.min_zoom = min;
        self.max_zoom = max;
        self
    }

    #[must_use]
    pub fn with_left_ruler_width(mut self, width: u16) -> Self {
        self.left_ruler_width = width.max(1);
        self
    }

    #[must_use]
    pub fn with_max_key_events_per_tick(mut self, max: usize) -> Self {
        self.max_key_events_per_tick = max.max(1);
        self
    }

    #[must_use]
    pub fn with_continuous_render(mut self, enabled: bool) -> Self {
        self.continuous_render_when_autoplay = enabled;
        self
    }

    /// Seconds between autoplay steps.
    #[must_use]
    pub fn step_interval(&self) -> f64 {
        1.0 / self.auto_steps_per_second.max(1e-4)
    }
}
