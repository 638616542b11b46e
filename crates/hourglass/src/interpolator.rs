//! # Value Interpolator
//!
//! Drives a value from `start` to `end` over `length` seconds of real or
//! scaled time, shaped by an [`Easing`] curve.
//!
//! Each tick: progress advances and clamps at 1, the value is recomputed,
//! `on_step` runs, and on the tick progress reaches exactly 1 the entry
//! retires and `on_completed` runs. Stopping an interpolator from inside its
//! own `on_step` suppresses completion.
//!
//! Retired interpolators drop their callbacks and tag; the tag is still
//! readable from `on_completed`. Progress and value stay readable through
//! the handle until the slot is reused.

use std::any::Any;

use hourglass_core::{Poolable, SlotHandle, SlotPool};

use crate::clock::FrameDeltas;
use crate::easing::{EaseDirection, Easing};
use crate::error::{TimeError, TimeResult};
use crate::guard::CallbackGuard;
use crate::timer::Tag;

/// Callback invoked after every update of an interpolator.
pub type OnStep<C> = Box<dyn FnMut(&mut C, InterpolatorHandle)>;

/// Callback invoked once when an interpolator completes.
pub type OnCompleted<C> = Box<dyn FnOnce(&mut C, InterpolatorHandle)>;

/// Handle to a registered interpolator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterpolatorHandle(SlotHandle);

/// A pooled interpolation.
pub struct Interpolator<C> {
    start: f32,
    end: f32,
    range: f32,
    /// Progress per second, `1 / length`.
    speed: f32,
    progress: f32,
    value: f32,
    realtime: bool,
    direction: EaseDirection,
    easing: Easing,
    on_step: Option<OnStep<C>>,
    on_completed: Option<OnCompleted<C>>,
    tag: Option<Tag>,
}

impl<C> Default for Interpolator<C> {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            range: 0.0,
            speed: 0.0,
            progress: 0.0,
            value: 0.0,
            realtime: false,
            direction: EaseDirection::default(),
            easing: Easing::default(),
            on_step: None,
            on_completed: None,
            tag: None,
        }
    }
}

impl<C> Poolable for Interpolator<C> {
    fn initialize(&mut self) {
        self.progress = 0.0;
    }

    fn deinitialize(&mut self) {
        self.on_step = None;
        self.on_completed = None;
        self.tag = None;
    }
}

impl<C> Interpolator<C> {
    /// Starting value.
    #[must_use]
    pub const fn start(&self) -> f32 {
        self.start
    }

    /// Ending value.
    #[must_use]
    pub const fn end(&self) -> f32 {
        self.end
    }

    /// Duration in seconds.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.speed.recip()
    }

    /// Progress in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// True if the interpolator runs on wall-clock time.
    #[must_use]
    pub const fn realtime(&self) -> bool {
        self.realtime
    }

    /// Easing direction.
    #[must_use]
    pub const fn direction(&self) -> EaseDirection {
        self.direction
    }

    /// Easing curve.
    #[must_use]
    pub const fn easing(&self) -> Easing {
        self.easing
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

    /// Advances progress and recomputes the value. Returns true once
    /// progress has reached 1.
    fn advance(&mut self, delta: f32) -> bool {
        self.progress = (self.progress + self.speed * delta).min(1.0);
        if self.progress >= 1.0 {
            self.value = self.end;
            return true;
        }
        let eased = self.easing.apply(self.progress, self.direction);
        self.value = self.start + self.range * eased;
        false
    }
}

/// Parameters for a new interpolator.
///
/// [`new`](Self::new) leaves the easing unset and spawning fails until one
/// is chosen; [`linear`](Self::linear) presets it.
pub struct InterpolatorBuilder<C> {
    start: f32,
    end: f32,
    length: f32,
    realtime: bool,
    easing: Option<Easing>,
    direction: EaseDirection,
    on_step: Option<OnStep<C>>,
    on_completed: Option<OnCompleted<C>>,
    tag: Option<Tag>,
}

impl<C> InterpolatorBuilder<C> {
    /// A scaled-time, in-out interpolation with no easing chosen yet.
    #[must_use]
    pub fn new(start: f32, end: f32, length: f32) -> Self {
        Self {
            start,
            end,
            length,
            realtime: false,
            easing: None,
            direction: EaseDirection::InOut,
            on_step: None,
            on_completed: None,
            tag: None,
        }
    }

    /// A scaled-time, linear interpolation.
    #[must_use]
    pub fn linear(start: f32, end: f32, length: f32) -> Self {
        Self::new(start, end, length).easing(Easing::Linear)
    }

    /// Runs on wall-clock time instead of scaled time.
    #[must_use]
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Chooses the curve.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Chooses the curve direction.
    #[must_use]
    pub fn direction(mut self, direction: EaseDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the per-tick callback.
    #[must_use]
    pub fn on_step<F>(mut self, on_step: F) -> Self
    where
        F: FnMut(&mut C, InterpolatorHandle) + 'static,
    {
        self.on_step = Some(Box::new(on_step));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_completed<F>(mut self, on_completed: F) -> Self
    where
        F: FnOnce(&mut C, InterpolatorHandle) + 'static,
    {
        self.on_completed = Some(Box::new(on_completed));
        self
    }

    /// Attaches user data.
    #[must_use]
    pub fn tag(mut self, tag: impl Any) -> Self {
        self.tag = Some(Box::new(tag));
        self
    }
}

/// Fixed-capacity interpolator engine.
pub struct Interpolators<C> {
    pool: SlotPool<Interpolator<C>>,
}

impl<C> Interpolators<C> {
    /// Creates an engine with room for `capacity` live interpolators.
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

    /// Registers a linear, in-out, scaled-time interpolation without
    /// callbacks. Poll it with [`get`](Self::get).
    ///
    /// # Errors
    ///
    /// See [`spawn`](Self::spawn).
    pub fn create(&mut self, start: f32, end: f32, length: f32) -> TimeResult<InterpolatorHandle> {
        self.spawn(InterpolatorBuilder::linear(start, end, length))
    }

    /// Registers an interpolation.
    ///
    /// # Errors
    ///
    /// - [`TimeError::InvalidArgument`] if `length` is not positive or no
    ///   easing was chosen
    /// - [`TimeError::PoolExhausted`] if every slot is live
    pub fn spawn(&mut self, builder: InterpolatorBuilder<C>) -> TimeResult<InterpolatorHandle> {
        let InterpolatorBuilder {
            start,
            end,
            length,
            realtime,
            easing,
            direction,
            on_step,
            on_completed,
            tag,
        } = builder;

        if length.is_nan() || length <= 0.0 {
            return Err(TimeError::InvalidArgument {
                name: "length",
                reason: "must be greater than zero",
            });
        }
        let Some(easing) = easing else {
            return Err(TimeError::InvalidArgument {
                name: "easing",
                reason: "an easing curve is required",
            });
        };

        let (handle, interpolator) = self.pool.acquire()?;
        interpolator.start = start;
        interpolator.end = end;
        interpolator.range = end - start;
        interpolator.speed = length.recip();
        interpolator.value = start;
        interpolator.realtime = realtime;
        interpolator.direction = direction;
        interpolator.easing = easing;
        interpolator.on_step = on_step;
        interpolator.on_completed = on_completed;
        interpolator.tag = tag;

        Ok(InterpolatorHandle(handle))
    }

    /// Stops an interpolator. Neither callback runs again; both are
    /// dropped along with the tag.
    ///
    /// Returns true if it was running.
    pub fn stop(&mut self, handle: InterpolatorHandle) -> bool {
        self.release(handle.0)
    }

    /// Stops every interpolator without completing them.
    pub fn stop_all(&mut self) {
        for position in 0..self.pool.valid_count() {
            if let Some(slot) = self.pool.live_at(position) {
                self.release(slot);
            }
        }
    }

    /// True if the interpolator is still running.
    #[must_use]
    pub fn is_active(&self, handle: InterpolatorHandle) -> bool {
        self.pool.is_valid(handle.0)
    }

    /// Looks up an interpolator. Finished ones stay readable until their
    /// slot is reused, without their tag.
    #[must_use]
    pub fn get(&self, handle: InterpolatorHandle) -> Option<&Interpolator<C>> {
        self.pool.get(handle.0)
    }

    /// Looks up an interpolator mutably.
    pub fn get_mut(&mut self, handle: InterpolatorHandle) -> Option<&mut Interpolator<C>> {
        self.pool.get_mut(handle.0)
    }

    /// Number of running interpolators.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.pool.live_count()
    }

    /// Fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Advances every running interpolator by one tick, in slot order, then
    /// compacts the pool.
    ///
    /// `interpolators` selects this engine inside `ctx`. A panicking
    /// `on_step` aborts the rest of the sweep and retires its own entry.
    pub fn update_all(ctx: &mut C, deltas: FrameDeltas, interpolators: fn(&mut C) -> &mut Self) {
        let mut position = 0;
        while position < interpolators(ctx).pool.valid_count() {
            let current = position;
            position += 1;

            let Some(slot) = interpolators(ctx).pool.live_at(current) else {
                continue;
            };
            let handle = InterpolatorHandle(slot);

            let (finished, on_step) = {
                let engine = interpolators(ctx);
                let Some(entry) = engine.pool.get_mut(slot) else {
                    continue;
                };
                let finished = entry.advance(deltas.for_domain(entry.realtime));
                (finished, entry.on_step.take())
            };

            if let Some(mut on_step) = on_step {
                let mut guard = CallbackGuard::new(&mut *ctx, move |ctx: &mut C| {
                    interpolators(ctx).release(slot);
                });
                on_step(guard.ctx(), handle);
                guard.finish();

                let engine = interpolators(ctx);
                if engine.pool.is_valid(slot) {
                    if let Some(entry) = engine.pool.get_mut(slot) {
                        entry.on_step = Some(on_step);
                    }
                }
            }

            if finished {
                if let Some(on_completed) = interpolators(ctx).complete(slot) {
                    on_completed(ctx, handle);
                }
                // Unless `on_completed` already reused the slot.
                if let Some(entry) = interpolators(ctx).pool.get_mut(slot) {
                    entry.deinitialize();
                }
            }
        }

        interpolators(ctx).pool.compact();
    }

    /// Invalidates a finished entry and hands out its completion callback.
    /// Entries stopped during their final step are left alone.
    fn complete(&mut self, slot: SlotHandle) -> Option<OnCompleted<C>> {
        if !self.pool.invalidate(slot) {
            return None;
        }
        let entry = self.pool.get_mut(slot)?;
        entry.on_step = None;
        entry.on_completed.take()
    }

    /// Invalidates an entry and drops its callbacks and tag.
    fn release(&mut self, slot: SlotHandle) -> bool {
        if !self.pool.invalidate(slot) {
            return false;
        }
        if let Some(entry) = self.pool.get_mut(slot) {
            entry.deinitialize();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use super::*;

    struct World {
        interpolators: Interpolators<World>,
        log: Vec<String>,
        values: Vec<f32>,
        victim: Option<InterpolatorHandle>,
    }

    impl World {
        fn new(capacity: usize) -> Self {
            Self {
                interpolators: Interpolators::new(capacity),
                log: Vec::new(),
                values: Vec::new(),
                victim: None,
            }
        }

        fn tick(&mut self, real: f32, scaled: f32) {
            Interpolators::update_all(self, FrameDeltas::new(real, scaled), |w| {
                &mut w.interpolators
            });
        }
    }

    #[test]
    fn test_linear_half_way() {
        let mut world = World::new(4);
        let handle = world
            .interpolators
            .spawn(
                InterpolatorBuilder::new(0.0, 10.0, 2.0)
                    .easing(Easing::Linear)
                    .direction(EaseDirection::InOut),
            )
            .unwrap();

        world.tick(0.0, 0.5);
        world.tick(0.0, 0.5);

        let entry = world.interpolators.get(handle).unwrap();
        assert_eq!(entry.progress(), 0.5);
        assert_eq!(entry.value(), 5.0);
        assert!(world.interpolators.is_active(handle));
    }

    #[test]
    fn test_step_then_completed_on_final_tick() {
        let mut world = World::new(4);
        let handle = world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(1.0, 3.0, 1.0)
                    .on_step(|w: &mut World, me| {
                        let value = w.interpolators.get(me).unwrap().value();
                        w.values.push(value);
                        w.log.push("step".into());
                    })
                    .on_completed(|w: &mut World, me| {
                        assert!(!w.interpolators.is_active(me));
                        w.log.push("completed".into());
                    }),
            )
            .unwrap();

        world.tick(0.0, 0.5);
        world.tick(0.0, 0.75);
        world.tick(0.0, 0.75);

        assert_eq!(world.log, vec!["step", "step", "completed"]);
        assert_eq!(world.values, vec![2.0, 3.0]);
        assert!(!world.interpolators.is_active(handle));
        assert_eq!(world.interpolators.get(handle).unwrap().progress(), 1.0);
    }

    #[test]
    fn test_endpoints_for_every_curve() {
        let directions = [EaseDirection::In, EaseDirection::Out, EaseDirection::InOut];
        let mut world = World::new(Easing::BUILT_IN.len() * directions.len());

        let mut handles = Vec::new();
        for easing in Easing::BUILT_IN {
            for direction in directions {
                let handle = world
                    .interpolators
                    .spawn(
                        InterpolatorBuilder::new(-3.0, 7.25, 0.5)
                            .easing(easing)
                            .direction(direction),
                    )
                    .unwrap();
                assert_eq!(world.interpolators.get(handle).unwrap().value(), -3.0);
                handles.push(handle);
            }
        }

        world.tick(0.0, 1.0);
        for handle in handles {
            let entry = world.interpolators.get(handle).unwrap();
            assert_eq!(entry.progress(), 1.0);
            assert_eq!(entry.value(), 7.25);
        }
        assert_eq!(world.interpolators.active_count(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut world = World::new(1);
        let handle = world
            .interpolators
            .spawn(
                InterpolatorBuilder::new(0.0, 1.0, 3.0)
                    .easing(Easing::Spring)
                    .on_step(|w: &mut World, me| {
                        let progress = w.interpolators.get(me).unwrap().progress();
                        w.values.push(progress);
                    }),
            )
            .unwrap();

        for delta in [0.1, 0.0, 0.7, -5.0, 1.3, 2.0, 4.0] {
            world.tick(0.0, delta);
        }

        assert!(world.values.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(world.values.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(world.values.last(), Some(&1.0));
        assert!(!world.interpolators.is_active(handle));
    }

    #[test]
    fn test_stop_from_earlier_step_wins() {
        let mut world = World::new(4);
        world
            .interpolators
            .spawn(InterpolatorBuilder::linear(0.0, 1.0, 1.0).on_step(
                |w: &mut World, _| {
                    w.log.push("first".into());
                    if let Some(victim) = w.victim.take() {
                        w.interpolators.stop(victim);
                    }
                },
            ))
            .unwrap();
        let victim = world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(0.0, 1.0, 1.0)
                    .on_step(|w: &mut World, _| w.log.push("victim".into()))
                    .on_completed(|w: &mut World, _| w.log.push("victim done".into())),
            )
            .unwrap();
        world.victim = Some(victim);

        world.tick(0.0, 0.25);
        world.tick(0.0, 1.0);
        assert_eq!(world.log, vec!["first", "first"]);
        assert!(!world.interpolators.is_active(victim));
    }

    #[test]
    fn test_stop_in_final_step_skips_completion() {
        let mut world = World::new(2);
        world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(0.0, 1.0, 1.0)
                    .on_step(|w: &mut World, me| {
                        w.interpolators.stop(me);
                        w.log.push("step".into());
                    })
                    .on_completed(|w: &mut World, _| w.log.push("completed".into())),
            )
            .unwrap();

        world.tick(0.0, 5.0);
        assert_eq!(world.log, vec!["step"]);
        assert_eq!(world.interpolators.active_count(), 0);
    }

    #[test]
    fn test_clock_domains() {
        let mut world = World::new(2);
        let real = world
            .interpolators
            .spawn(InterpolatorBuilder::linear(0.0, 4.0, 4.0).realtime(true))
            .unwrap();
        let scaled = world.interpolators.create(0.0, 4.0, 4.0).unwrap();

        world.tick(1.0, 2.0);
        assert_eq!(world.interpolators.get(real).unwrap().value(), 1.0);
        assert_eq!(world.interpolators.get(scaled).unwrap().value(), 2.0);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut interpolators: Interpolators<()> = Interpolators::new(2);

        for bad in [0.0, -2.0, f32::NAN] {
            let err = interpolators.create(0.0, 1.0, bad).unwrap_err();
            assert!(matches!(err, TimeError::InvalidArgument { name: "length", .. }));
        }

        let err = interpolators
            .spawn(InterpolatorBuilder::new(0.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, TimeError::InvalidArgument { name: "easing", .. }));
    }

    #[test]
    fn test_exhaustion_then_reuse() {
        let mut world = World::new(1);
        let first = world.interpolators.create(0.0, 1.0, 1.0).unwrap();
        assert_eq!(
            world.interpolators.create(0.0, 1.0, 1.0).unwrap_err(),
            TimeError::PoolExhausted { capacity: 1 }
        );

        world.tick(0.0, 1.0);
        let second = world.interpolators.create(5.0, 6.0, 1.0).unwrap();
        assert!(world.interpolators.get(first).is_none());
        assert_eq!(world.interpolators.get(second).unwrap().value(), 5.0);
    }

    #[test]
    fn test_completed_can_chain() {
        let mut world = World::new(1);
        world
            .interpolators
            .spawn(InterpolatorBuilder::linear(0.0, 1.0, 1.0).on_completed(
                |w: &mut World, _| {
                    // Reuses the slot that just retired.
                    let next = w
                        .interpolators
                        .spawn(InterpolatorBuilder::linear(1.0, 0.0, 1.0).tag(String::from("back")))
                        .unwrap();
                    w.victim = Some(next);
                },
            ))
            .unwrap();

        world.tick(0.0, 1.0);
        let next = world.victim.unwrap();
        let entry = world.interpolators.get(next).unwrap();
        assert!(world.interpolators.is_active(next));
        assert_eq!(entry.tag::<String>().map(String::as_str), Some("back"));
        assert_eq!(entry.progress(), 0.0);
    }

    #[test]
    fn test_completion_sees_tag_then_drops_it() {
        let captured = Rc::new(());
        let mut world = World::new(2);

        let held = Rc::clone(&captured);
        let handle = world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(0.0, 2.0, 1.0)
                    .tag(String::from("fade"))
                    .on_step(move |_: &mut World, _| {
                        let _held = &held;
                    })
                    .on_completed(|w: &mut World, me| {
                        let tag = w.interpolators.get(me).unwrap().tag::<String>().cloned();
                        w.log.push(tag.unwrap_or_default());
                    }),
            )
            .unwrap();
        assert_eq!(Rc::strong_count(&captured), 2);

        world.tick(0.0, 1.0);
        assert_eq!(world.log, vec!["fade"]);
        let entry = world.interpolators.get(handle).unwrap();
        assert!(entry.tag::<String>().is_none());
        assert_eq!(entry.value(), 2.0);
        assert_eq!(Rc::strong_count(&captured), 1);
    }

    #[test]
    fn test_stop_drops_callbacks_and_tag() {
        let captured = Rc::new(());
        let mut world = World::new(2);

        let step = Rc::clone(&captured);
        let done = Rc::clone(&captured);
        let handle = world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(0.0, 1.0, 4.0)
                    .tag(3_i32)
                    .on_step(move |_: &mut World, _| {
                        let _held = &step;
                    })
                    .on_completed(move |_: &mut World, _| {
                        let _held = &done;
                    }),
            )
            .unwrap();
        world.tick(0.0, 1.0);
        assert_eq!(Rc::strong_count(&captured), 3);

        assert!(world.interpolators.stop(handle));
        let entry = world.interpolators.get(handle).unwrap();
        assert!(entry.tag::<i32>().is_none());
        assert_eq!(entry.progress(), 0.25);
        assert_eq!(Rc::strong_count(&captured), 1);
    }

    #[test]
    fn test_panicking_step_retires_entry() {
        let mut world = World::new(2);
        let faulty = world
            .interpolators
            .spawn(
                InterpolatorBuilder::linear(0.0, 1.0, 2.0)
                    .on_step(|_: &mut World, _| panic!("step failed"))
                    .on_completed(|w: &mut World, _| w.log.push("completed".into())),
            )
            .unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| world.tick(0.0, 1.0)));
        assert!(outcome.is_err());
        assert!(!world.interpolators.is_active(faulty));

        world.tick(0.0, 5.0);
        assert!(world.log.is_empty());
        assert_eq!(world.interpolators.active_count(), 0);
    }
}
