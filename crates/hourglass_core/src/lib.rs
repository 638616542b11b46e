//! # HOURGLASS Core
//!
//! Allocation-free containers shared by the time-driven systems:
//! - A slot pool with per-slot validity, generation-checked handles and
//!   batched compaction
//! - A fixed-capacity ring buffer with head/tail insertion
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations after construction** - capacity is fixed up front
//! 2. **Single update thread** - nothing here is `Sync`-aware or locked
//! 3. **Retire now, reclaim later** - pools compact once per tick, never mid-sweep
//!
//! ## Example
//!
//! ```rust
//! use hourglass_core::{Poolable, SlotPool};
//!
//! #[derive(Default)]
//! struct Spark { life: f32 }
//! impl Poolable for Spark {}
//!
//! let mut pool: SlotPool<Spark> = SlotPool::new(64);
//! let (handle, spark) = pool.acquire().unwrap();
//! spark.life = 1.0;
//! assert!(pool.is_valid(handle));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{Poolable, PoolError, RingBuffer, RingError, RingIter, SlotHandle, SlotPool};
