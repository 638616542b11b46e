//! # Delayed-Action Scheduler
//!
//! Timers invoke a callback once a span of real or scaled time has elapsed,
//! then either retire or start over.
//!
//! ## Callback context
//!
//! [`Timers<C>`] lives inside some context `C` (usually
//! [`TimeContext`](crate::TimeContext)). Callbacks receive `&mut C` and the
//! firing timer's handle, so they can create or stop any timer, or reach
//! anything else the context owns, in the middle of a sweep.
//!
//! ## Firing policy
//!
//! A due timer fires at most once per [`Timers::update_all`]. After a stalled
//! frame the leftover time carries over and the backlog drains one fire per
//! tick.
//!
//! ## Retirement
//!
//! A timer retires when it is stopped or when a one-shot timer fires. Its
//! callback and tag are dropped right away; the numeric fields stay
//! readable through the handle until the slot is reused.

use std::any::Any;

use hourglass_core::{Poolable, SlotHandle, SlotPool};

use crate::clock::FrameDeltas;
use crate::error::{TimeError, TimeResult};
use crate::guard::CallbackGuard;

/// User data attached to an entry.
pub type Tag = Box<dyn Any>;

/// Callback invoked when a timer fires.
pub type OnTick<C> = Box<dyn FnMut(&mut C, TimerHandle)>;

/// Handle to a registered timer.
///
/// Stays usable after the timer retires; once its slot is reused the
/// handle resolves to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(SlotHandle);

/// A pooled timer.
pub struct Timer<C> {
    tick_length: f32,
    /// Time since the last fire.
    accumulated: f32,
    realtime: bool,
    repeats: bool,
    /// `None` only while the callback itself is running.
    on_tick: Option<OnTick<C>>,
    tag: Option<Tag>,
}

impl<C> Default for Timer<C> {
    fn default() -> Self {
        Self {
            tick_length: 0.0,
            accumulated: 0.0,
            realtime: false,
            repeats: false,
            on_tick: None,
            tag: None,
        }
    }
}

impl<C> Poolable for Timer<C> {
    fn initialize(&mut self) {
        self.accumulated = 0.0;
    }

    fn deinitialize(&mut self) {
        self.on_tick = None;
        self.tag = None;
    }
}

impl<C> Timer<C> {
    /// Seconds between fires.
    #[must_use]
    pub const fn tick_length(&self) -> f32 {
        self.tick_length
    }

    /// Seconds accumulated since the last fire.
    #[must_use]
    pub const fn accumulated(&self) -> f32 {
        self.accumulated
    }

    /// True if the timer runs on wall-clock time.
    #[must_use]
    pub const fn realtime(&self) -> bool {
        self.realtime
    }

    /// True if the timer starts over after firing.
    #[must_use]
    pub const fn repeats(&self) -> bool {
        self.repeats
    }

    /// Returns the tag if it is a `T`.
    #[must_use]
    pub fn tag<T: Any>(&self) -> Option<&T> {
        self.tag.as_deref()?.downcast_ref()
    }

    /// Returns the tag mutably if it is a `T`.
    pub fn tag_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.tag.as_deref_mut()?.downcast_mut()
    }

    /// Attaches user data, replacing any previous tag.
    pub fn set_tag(&mut self, tag: impl Any) {
        self.tag = Some(Box::new(tag));
    }

    /// Detaches and returns the tag.
    pub fn take_tag(&mut self) -> Option<Tag> {
        self.tag.take()
    }
}

/// Parameters for a new timer.
///
/// The tick callback is required; spawning without one fails.
pub struct TimerBuilder<C> {
    tick_length: f32,
    realtime: bool,
    repeats: bool,
    on_tick: Option<OnTick<C>>,
    tag: Option<Tag>,
}

impl<C> TimerBuilder<C> {
    /// A one-shot, scaled-time timer with no callback yet.
    #[must_use]
    pub fn new(tick_length: f32) -> Self {
        Self {
            tick_length,
            realtime: false,
            repeats: false,
            on_tick: None,
            tag: None,
        }
    }

    /// Runs on wall-clock time instead of scaled time.
    #[must_use]
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Starts over after each fire until stopped.
    #[must_use]
    pub fn repeats(mut self, repeats: bool) -> Self {
        self.repeats = repeats;
        self
    }

    /// Sets the callback.
    #[must_use]
    pub fn on_tick<F>(mut self, on_tick: F) -> Self
    where
        F: FnMut(&mut C, TimerHandle) + 'static,
    {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    /// Attaches user data.
    #[must_use]
    pub fn tag(mut self, tag: impl Any) -> Self {
        self.tag = Some(Box::new(tag));
        self
    }
}

/// Fixed-capacity timer engine.
pub struct Timers<C> {
    pool: SlotPool<Timer<C>>,
}

impl<C> Timers<C> {
    /// Creates an engine with room for `capacity` live timers.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            pool: SlotPool::new(capacity),
        }
    }

    /// Registers a one-shot, scaled-time timer.
    ///
    /// # Errors
    ///
    /// See [`spawn`](Self::spawn).
    pub fn create<F>(&mut self, tick_length: f32, on_tick: F) -> TimeResult<TimerHandle>
    where
        F: FnMut(&mut C, TimerHandle) + 'static,
    {
        self.spawn(TimerBuilder::new(tick_length).on_tick(on_tick))
    }

    /// Registers a timer.
    ///
    /// # Errors
    ///
    /// - [`TimeError::InvalidArgument`] if `tick_length` is not positive or
    ///   the callback is missing
    /// - [`TimeError::PoolExhausted`] if every slot is live
    pub fn spawn(&mut self, builder: TimerBuilder<C>) -> TimeResult<TimerHandle> {
        let TimerBuilder {
            tick_length,
            realtime,
            repeats,
            on_tick,
            tag,
        } = builder;

        if tick_length.is_nan() || tick_length <= 0.0 {
            return Err(TimeError::InvalidArgument {
                name: "tick_length",
                reason: "must be greater than zero",
            });
        }
        let Some(on_tick) = on_tick else {
            return Err(TimeError::InvalidArgument {
                name: "on_tick",
                reason: "a tick callback is required",
            });
        };

        let (handle, timer) = self.pool.acquire()?;
        timer.tick_length = tick_length;
        timer.realtime = realtime;
        timer.repeats = repeats;
        timer.on_tick = Some(on_tick);
        timer.tag = tag;

        Ok(TimerHandle(handle))
    }

    /// Stops a timer. Its callback will not run again, even if it is due
    /// later in the current sweep, and its callback and tag are dropped.
    ///
    /// Returns true if the timer was running. Stopping twice is a no-op.
    pub fn stop(&mut self, handle: TimerHandle) -> bool {
        self.release(handle.0)
    }

    /// Stops every timer.
    pub fn stop_all(&mut self) {
        for position in 0..self.pool.valid_count() {
            if let Some(handle) = self.pool.live_at(position) {
                self.release(handle);
            }
        }
    }

    /// True if the timer is still running.
    #[must_use]
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.pool.is_valid(handle.0)
    }

    /// Looks up a timer. Retired timers stay readable until their slot is
    /// reused, without their tag.
    #[must_use]
    pub fn get(&self, handle: TimerHandle) -> Option<&Timer<C>> {
        self.pool.get(handle.0)
    }

    /// Looks up a timer mutably.
    pub fn get_mut(&mut self, handle: TimerHandle) -> Option<&mut Timer<C>> {
        self.pool.get_mut(handle.0)
    }

    /// Number of running timers.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.pool.live_count()
    }

    /// Fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Advances every running timer by one tick and fires the due ones,
    /// in slot order, then compacts the pool.
    ///
    /// `timers` selects this engine inside `ctx`, e.g.
    /// `|ctx| &mut ctx.timers`.
    ///
    /// Timers created by a callback may or may not be visited in the same
    /// sweep. A panicking callback aborts the rest of the sweep and retires
    /// its own timer.
    pub fn update_all(ctx: &mut C, deltas: FrameDeltas, timers: fn(&mut C) -> &mut Self) {
        let mut position = 0;
        while position < timers(ctx).pool.valid_count() {
            let current = position;
            position += 1;

            // Checked per entry: an earlier callback may have stopped it.
            let Some(handle) = timers(ctx).pool.live_at(current) else {
                continue;
            };
            let Some(mut on_tick) = timers(ctx).advance(handle, deltas) else {
                continue;
            };

            let mut guard = CallbackGuard::new(&mut *ctx, move |ctx: &mut C| {
                timers(ctx).release(handle);
            });
            on_tick(guard.ctx(), TimerHandle(handle));
            guard.finish();

            timers(ctx).settle(handle, on_tick);
        }

        timers(ctx).pool.compact();
    }

    /// Accumulates the domain delta; hands out the callback if due.
    fn advance(&mut self, handle: SlotHandle, deltas: FrameDeltas) -> Option<OnTick<C>> {
        let timer = self.pool.get_mut(handle)?;
        timer.accumulated += deltas.for_domain(timer.realtime);
        if timer.accumulated < timer.tick_length {
            return None;
        }
        timer.on_tick.take()
    }

    /// Consumes one tick length, then puts the callback back or retires
    /// the timer.
    fn settle(&mut self, handle: SlotHandle, on_tick: OnTick<C>) {
        // The callback may have stopped its own timer; `on_tick` drops here.
        if !self.pool.is_valid(handle) {
            return;
        }
        let Some(timer) = self.pool.get_mut(handle) else {
            return;
        };
        timer.accumulated -= timer.tick_length;
        if timer.repeats {
            timer.on_tick = Some(on_tick);
        } else {
            self.release(handle);
        }
    }

    /// Invalidates a timer and drops its callback and tag.
    fn release(&mut self, handle: SlotHandle) -> bool {
        if !self.pool.invalidate(handle) {
            return false;
        }
        if let Some(timer) = self.pool.get_mut(handle) {
            timer.deinitialize();
        }
        true
    }
}
