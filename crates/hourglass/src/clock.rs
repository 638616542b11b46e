//! # Clock Facade
//!
//! Per-tick deltas in two clock domains:
//! - **real**: wall-clock seconds, unaffected by the time scale
//! - **scaled**: host-supplied game seconds, already time-scale adjusted
//!
//! The clock does not measure scaled time itself. The host hands it one
//! [`TickSample`] per frame.

use std::time::Instant;

use crate::config::TimeConfig;

/// What the host reports once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickSample {
    /// Wall-clock seconds since startup.
    pub realtime_since_startup: f64,
    /// Scaled seconds elapsed since the previous frame.
    pub scaled_delta: f32,
}

/// The deltas produced by one [`Clock::refresh`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameDeltas {
    /// Wall-clock seconds since the previous tick.
    pub real: f32,
    /// Scaled seconds since the previous tick.
    pub scaled: f32,
}

impl FrameDeltas {
    /// Creates a pair of deltas.
    #[must_use]
    pub const fn new(real: f32, scaled: f32) -> Self {
        Self { real, scaled }
    }

    /// Returns the delta for an entry's clock domain. Never negative.
    #[inline]
    #[must_use]
    pub fn for_domain(self, realtime: bool) -> f32 {
        let delta = if realtime { self.real } else { self.scaled };
        delta.max(0.0)
    }
}

/// Real and scaled deltas plus the global time scale.
#[derive(Clone, Debug)]
pub struct Clock {
    /// Wall-clock sample from the previous tick.
    previous_realtime: Option<f64>,
    deltas: FrameDeltas,
    time_scale: f32,
    fixed_step_ratio: f32,
    /// Host fixed-step interval, kept at `fixed_step_ratio * time_scale`.
    fixed_delta: f32,
    frame_count: u64,
}

impl Clock {
    /// Creates a clock with the given scale and fixed-step proportion.
    ///
    /// An invalid scale is ignored as in [`set_time_scale`](Self::set_time_scale)
    /// and the clock starts at 1. A fixed-step ratio that is not positive
    /// and finite falls back to [`TimeConfig::DEFAULT_FIXED_STEP_RATIO`].
    #[must_use]
    pub fn new(time_scale: f32, fixed_step_ratio: f32) -> Self {
        let fixed_step_ratio = if fixed_step_ratio.is_finite() && fixed_step_ratio > 0.0 {
            fixed_step_ratio
        } else {
            tracing::warn!(fixed_step_ratio, "ignoring invalid fixed step ratio");
            TimeConfig::DEFAULT_FIXED_STEP_RATIO
        };

        let mut clock = Self {
            previous_realtime: None,
            deltas: FrameDeltas::default(),
            time_scale: 1.0,
            fixed_step_ratio,
            fixed_delta: fixed_step_ratio,
            frame_count: 0,
        };
        clock.set_time_scale(time_scale);
        clock
    }

    /// Creates a clock from a validated config.
    #[must_use]
    pub fn from_config(config: &TimeConfig) -> Self {
        Self::new(config.time_scale, config.fixed_step_ratio)
    }

    /// Ingests one frame's sample and returns the new deltas.
    ///
    /// On the first tick there is no previous wall-clock sample, so the
    /// real delta falls back to the scaled delta. A wall clock that runs
    /// backwards yields a zero real delta.
    #[allow(clippy::cast_possible_truncation)]
    pub fn refresh(&mut self, sample: TickSample) -> FrameDeltas {
        let real = match self.previous_realtime {
            None => sample.scaled_delta,
            Some(previous) if sample.realtime_since_startup < previous => {
                tracing::warn!(
                    previous,
                    current = sample.realtime_since_startup,
                    "wall clock went backwards, clamping real delta to zero"
                );
                0.0
            }
            Some(previous) => (sample.realtime_since_startup - previous) as f32,
        };

        self.previous_realtime = Some(sample.realtime_since_startup);
        self.deltas = FrameDeltas::new(real, sample.scaled_delta);
        self.frame_count += 1;
        self.deltas
    }

    /// Returns the deltas from the last refresh.
    #[inline]
    #[must_use]
    pub const fn deltas(&self) -> FrameDeltas {
        self.deltas
    }

    /// Wall-clock seconds since the previous tick.
    #[inline]
    #[must_use]
    pub const fn real_delta(&self) -> f32 {
        self.deltas.real
    }

    /// Scaled seconds since the previous tick.
    #[inline]
    #[must_use]
    pub const fn scaled_delta(&self) -> f32 {
        self.deltas.scaled
    }

    /// Returns the global time scale.
    #[inline]
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the global time scale and moves the fixed-step interval with it.
    ///
    /// Negative or non-finite scales are ignored.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if !time_scale.is_finite() || time_scale < 0.0 {
            tracing::warn!(time_scale, "ignoring invalid time scale");
            return;
        }
        self.time_scale = time_scale;
        self.fixed_delta = self.fixed_step_ratio * time_scale;
        tracing::debug!(time_scale, fixed_delta = self.fixed_delta, "time scale changed");
    }

    /// Host fixed-step interval for the current time scale.
    #[inline]
    #[must_use]
    pub const fn fixed_delta(&self) -> f32 {
        self.fixed_delta
    }

    /// Number of refreshes so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::from_config(&TimeConfig::default())
    }
}

/// Builds [`TickSample`]s from [`Instant`] for hosts without a frame clock.
///
/// The scaled delta is the wall delta multiplied by the time scale passed
/// to [`sample`](Self::sample).
#[derive(Clone, Copy, Debug)]
pub struct InstantTickSource {
    started: Instant,
    last: Option<Instant>,
}

impl InstantTickSource {
    /// Starts measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            last: None,
        }
    }

    /// Takes the sample for the current frame.
    pub fn sample(&mut self, time_scale: f32) -> TickSample {
        let now = Instant::now();
        let wall = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last = Some(now);

        TickSample {
            realtime_since_startup: now.duration_since(self.started).as_secs_f64(),
            scaled_delta: wall * time_scale,
        }
    }
}

impl Default for InstantTickSource {
    fn default() -> Self {
        Self::new()
    }
}
