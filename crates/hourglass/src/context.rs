//! # Time Context
//!
//! Owns the clock and both engines, and drives them once per host tick:
//! refresh the clock, update interpolators, update timers.
//!
//! A context can be owned directly by the host, or parked in the
//! process-wide slot on the update thread via [`with_global`],
//! [`install_global`] and [`teardown_global`].

use std::cell::RefCell;

use crate::clock::{Clock, FrameDeltas, TickSample};
use crate::config::TimeConfig;
use crate::interpolator::Interpolators;
use crate::timer::Timers;

/// Clock, timers and interpolators for one update thread.
///
/// Callbacks registered here receive `&mut TimeContext`, so a timer can
/// start an interpolation and vice versa.
pub struct TimeContext {
    clock: Clock,
    timers: Timers<TimeContext>,
    interpolators: Interpolators<TimeContext>,
    enable_timers: bool,
    enable_interpolators: bool,
}

impl TimeContext {
    /// Creates a context sized by `config`.
    ///
    /// # Panics
    ///
    /// Panics if a capacity in `config` is zero. Configs loaded through
    /// [`TimeConfig::from_toml_str`] are already validated.
    #[must_use]
    pub fn new(config: &TimeConfig) -> Self {
        tracing::debug!(
            timers = config.timer_capacity,
            interpolators = config.interpolator_capacity,
            "creating time context"
        );
        Self {
            clock: Clock::from_config(config),
            timers: Timers::new(config.timer_capacity),
            interpolators: Interpolators::new(config.interpolator_capacity),
            enable_timers: config.enable_timers,
            enable_interpolators: config.enable_interpolators,
        }
    }

    /// Runs one tick and returns the deltas that were applied.
    ///
    /// A panicking callback propagates out of here and aborts the rest of
    /// its engine's sweep.
    pub fn tick(&mut self, sample: TickSample) -> FrameDeltas {
        let deltas = self.clock.refresh(sample);

        if self.enable_interpolators {
            Interpolators::update_all(self, deltas, Self::interpolators_mut);
        }
        if self.enable_timers {
            Timers::update_all(self, deltas, Self::timers_mut);
        }

        deltas
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The clock, for changing the time scale.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// The timer engine.
    #[must_use]
    pub const fn timers(&self) -> &Timers<Self> {
        &self.timers
    }

    /// The timer engine, for creating and stopping timers.
    pub fn timers_mut(&mut self) -> &mut Timers<Self> {
        &mut self.timers
    }

    /// The interpolator engine.
    #[must_use]
    pub const fn interpolators(&self) -> &Interpolators<Self> {
        &self.interpolators
    }

    /// The interpolator engine, for creating and stopping interpolators.
    pub fn interpolators_mut(&mut self) -> &mut Interpolators<Self> {
        &mut self.interpolators
    }

    /// True if timers are updated on each tick.
    #[must_use]
    pub const fn timers_enabled(&self) -> bool {
        self.enable_timers
    }

    /// Pauses or resumes timer updates. Paused timers keep their state.
    pub fn set_timers_enabled(&mut self, enabled: bool) {
        self.enable_timers = enabled;
    }

    /// True if interpolators are updated on each tick.
    #[must_use]
    pub const fn interpolators_enabled(&self) -> bool {
        self.enable_interpolators
    }

    /// Pauses or resumes interpolator updates.
    pub fn set_interpolators_enabled(&mut self, enabled: bool) {
        self.enable_interpolators = enabled;
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new(&TimeConfig::default())
    }
}

thread_local! {
    static GLOBAL: RefCell<Option<TimeContext>> = const { RefCell::new(None) };
}

/// Runs `f` against the update thread's context, constructing a default
/// one on first use.
///
/// # Panics
///
/// Panics if called from inside another `with_global`, where the context
/// is already lent out. Use [`try_with_global`] there, or the context
/// callbacks receive as their first argument.
pub fn with_global<R>(f: impl FnOnce(&mut TimeContext) -> R) -> R {
    match try_with_global(f) {
        Some(result) => result,
        None => panic!("global time context is already borrowed"),
    }
}

/// Like [`with_global`], but returns `None` instead of running `f` when
/// called from inside another `with_global`.
pub fn try_with_global<R>(f: impl FnOnce(&mut TimeContext) -> R) -> Option<R> {
    GLOBAL.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            tracing::warn!("global time context is already borrowed");
            return None;
        };
        let context = slot.get_or_insert_with(|| {
            tracing::debug!("constructing global time context on first use");
            TimeContext::default()
        });
        Some(f(context))
    })
}

/// Installs `context` as the update thread's context.
///
/// Returns false and drops `context` if one already exists; the first
/// instance wins. Called from inside [`with_global`], the context in use
/// is the first instance.
pub fn install_global(context: TimeContext) -> bool {
    GLOBAL.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            tracing::debug!("global time context in use, keeping the first");
            return false;
        };
        if slot.is_some() {
            tracing::debug!("global time context already installed, keeping the first");
            return false;
        }
        *slot = Some(context);
        true
    })
}

/// Removes and returns the update thread's context.
///
/// Returns `None` without removing anything when called from inside
/// [`with_global`].
pub fn teardown_global() -> Option<TimeContext> {
    GLOBAL.with(|cell| cell.try_borrow_mut().ok()?.take())
}

/// True if the update thread has a context.
#[must_use]
pub fn global_installed() -> bool {
    GLOBAL.with(|cell| cell.try_borrow().map_or(true, |slot| slot.is_some()))
}
