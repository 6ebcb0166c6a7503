//! Step timing and frame-rate measurement.

use std::time::{Duration, Instant};

/// Autoplay accumulator.
///
/// Wall time is added every tick and whole step intervals are drained from
/// it, so the number of steps after a total time `T` at rate `R` is
/// `floor(T * R)` however unevenly the ticks arrive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepScheduler {
    accumulator: f64,
}

impl StepScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds of wall time not yet turned into steps.
    #[must_use]
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Drop any partial interval.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Account for `elapsed` time and return how many steps are due.
    ///
    /// With autoplay off nothing accumulates, so switching it on later does
    /// not release a burst of steps.
    pub fn advance(&mut self, elapsed: Duration, steps_per_second: f64, autoplay: bool) -> u32 {
        if !autoplay {
            self.accumulator = 0.0;
            return 0;
        }
        let interval = 1.0 / steps_per_second.max(1e-4);
        self.accumulator += elapsed.as_secs_f64();
        let mut due = 0u32;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            due = due.saturating_add(1);
        }
        due
    }
}

/// Frames-per-second meter, recomputed once per elapsed second.
#[derive(Clone, Copy, Debug)]
pub struct FpsMeter {
    frames: u32,
    window_start: Instant,
    fps: f64,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl FpsMeter {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Last computed rate.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Count a rendered frame.
    pub fn record_frame(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = f64::from(self.frames) / elapsed;
            self.frames = 0;
            self.window_start = now;
        }
    }
}
