//! # Memory Management
//!
//! Pre-allocated containers for zero-allocation ticking.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. During gameplay:
//! - No heap allocations
//! - Slots are recycled in place
//! - Predictable, flat latency

mod pool;
mod ring;

pub use pool::{PoolError, Poolable, SlotHandle, SlotPool};
pub use ring::{RingBuffer, RingError, RingIter};
