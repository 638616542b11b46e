//! # HOURGLASS
//!
//! Pooled, time-driven primitives for a frame-based host:
//! - **Timers**: run a callback after a delay, once or repeatedly
//! - **Interpolators**: move a value from start to end along an easing curve
//!
//! Both run in one of two clock domains, real (wall-clock) or scaled (game)
//! time, and both live in fixed-capacity slot pools so registering an entry
//! never grows memory.
//!
//! ## Frame Flow
//!
//! ```text
//! host tick ──> Clock::refresh ──> Interpolators::update_all ──> Timers::update_all
//!                (real, scaled)     (step / completed callbacks)  (tick callbacks)
//! ```
//!
//! ## Thread Safety
//!
//! None. Registration, cancellation and updates all happen on the single
//! update thread. Callbacks run synchronously inside the sweep that fired
//! them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hourglass::{EaseDirection, Easing, InterpolatorBuilder, TickSample, TimeConfig, TimeContext, TimerBuilder};
//!
//! let mut time = TimeContext::new(&TimeConfig::from_toml_file("config/time.toml")?);
//!
//! time.timers_mut().spawn(
//!     TimerBuilder::new(2.0).repeats(true).on_tick(|ctx, _| {
//!         ctx.interpolators_mut()
//!             .spawn(InterpolatorBuilder::new(0.0, 1.0, 0.25).easing(Easing::Spring))
//!             .ok();
//!     }),
//! )?;
//!
//! loop {
//!     time.tick(TickSample { realtime_since_startup: now(), scaled_delta: dt });
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod context;
pub mod easing;
pub mod error;
mod guard;
pub mod interpolator;
pub mod timer;

pub use clock::{Clock, FrameDeltas, InstantTickSource, TickSample};
pub use config::TimeConfig;
pub use context::{
    global_installed, install_global, teardown_global, try_with_global, with_global, TimeContext,
};
pub use easing::{EaseDirection, Easing, EasingFn};
pub use error::{TimeError, TimeResult};
pub use interpolator::{
    Interpolator, InterpolatorBuilder, InterpolatorHandle, Interpolators, OnCompleted, OnStep,
};
pub use timer::{OnTick, Tag, Timer, TimerBuilder, TimerHandle, Timers};
