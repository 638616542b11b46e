//! # Slot Pool
//!
//! Fixed-capacity storage for entries that are acquired, retired and reused
//! every few frames.
//!
//! Entries live in a slot array that never moves. A separate `order` table
//! lists slot indices in iteration order: positions `0..valid_count` may hold
//! live entries or holes (retired, not yet compacted), positions
//! `valid_count..capacity` are unused. Compaction only permutes `order`, so a
//! [`SlotHandle`] stays addressable for as long as its slot is not reused.

use thiserror::Error;

/// Lifecycle hooks run by [`SlotPool::acquire`].
///
/// `deinitialize` runs first when a previously used slot is recycled,
/// `initialize` runs on every acquisition. Neither runs during compaction.
pub trait Poolable {
    /// Prepares the payload for a fresh entry.
    fn initialize(&mut self) {}

    /// Releases whatever the previous occupant left behind.
    fn deinitialize(&mut self) {}
}

/// Errors raised by a [`SlotPool`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot is live; the pool never grows.
    #[error("pool exhausted: all {capacity} slots are live")]
    Exhausted {
        /// Fixed capacity of the pool.
        capacity: usize,
    },
}

/// Handle to an entry in a [`SlotPool`].
///
/// The generation is bumped every time the slot is acquired, so a handle
/// kept past its entry's reuse resolves to nothing instead of aliasing the
/// new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotHandle {
    /// Index into the slot array.
    index: u32,
    /// Generation of the slot when the handle was issued.
    generation: u32,
}

impl SlotHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation the handle was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

struct Slot<T> {
    payload: T,
    /// Live and participating in iteration.
    valid: bool,
    /// Has held an entry at least once.
    occupied: bool,
    generation: u32,
}

/// A fixed-capacity pool with validity tracking and deferred compaction.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one engine and
/// driven from the update thread.
///
/// # Example
///
/// ```rust
/// use hourglass_core::{Poolable, SlotPool};
///
/// #[derive(Default)]
/// struct Job { remaining: f32 }
/// impl Poolable for Job {}
///
/// let mut pool: SlotPool<Job> = SlotPool::new(2);
/// let (a, _) = pool.acquire().unwrap();
/// let (_b, _) = pool.acquire().unwrap();
/// assert!(pool.acquire().is_err());
///
/// pool.invalidate(a);
/// pool.compact();
/// assert!(pool.acquire().is_ok());
/// ```
pub struct SlotPool<T> {
    /// The storage array. Entries never move.
    slots: Box<[Slot<T>]>,
    /// Slot indices in iteration order.
    order: Box<[u32]>,
    /// One past the last position that may hold a live entry.
    valid_count: usize,
    /// Number of live entries.
    live_count: usize,
}

impl<T: Poolable + Default> SlotPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit in a `u32`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        let last = u32::try_from(capacity - 1).expect("Capacity must fit in u32");

        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                payload: T::default(),
                valid: false,
                occupied: false,
                generation: 0,
            })
            .collect();

        Self {
            slots: slots.into_boxed_slice(),
            order: (0..=last).collect(),
            valid_count: 0,
            live_count: 0,
        }
    }
}

impl<T: Poolable> SlotPool<T> {
    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the high-water mark of the iteration range.
    ///
    /// Positions below it may be live or holes; positions at or above it
    /// are unused.
    #[inline]
    #[must_use]
    pub const fn valid_count(&self) -> usize {
        self.valid_count
    }

    /// Returns the number of live entries.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Acquires a slot, recycling the earliest hole before extending the
    /// iteration range.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] when every slot is live.
    pub fn acquire(&mut self) -> Result<(SlotHandle, &mut T), PoolError> {
        let hole = (0..self.valid_count).find(|&position| !self.slot_at(position).valid);

        let position = match hole {
            Some(position) => position,
            None if self.valid_count < self.slots.len() => {
                self.valid_count += 1;
                self.valid_count - 1
            }
            None => {
                let capacity = self.slots.len();
                tracing::warn!(capacity, "slot pool exhausted");
                return Err(PoolError::Exhausted { capacity });
            }
        };

        let index = self.order[position];
        let slot = &mut self.slots[index as usize];
        if slot.occupied {
            slot.payload.deinitialize();
        }
        slot.payload.initialize();
        slot.occupied = true;
        slot.valid = true;
        slot.generation = slot.generation.wrapping_add(1);
        self.live_count += 1;

        let handle = SlotHandle {
            index,
            generation: slot.generation,
        };
        Ok((handle, &mut slot.payload))
    }

    /// Returns the live entry at an iteration position, if any.
    #[inline]
    #[must_use]
    pub fn live_at(&self, position: usize) -> Option<SlotHandle> {
        if position >= self.valid_count {
            return None;
        }
        let index = self.order[position];
        let slot = &self.slots[index as usize];
        slot.valid.then_some(SlotHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Returns true if the handle refers to a live entry.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, handle: SlotHandle) -> bool {
        self.slot(handle).is_some_and(|slot| slot.valid)
    }

    /// Gets the entry a handle refers to.
    ///
    /// Retired entries stay readable until their slot is reused.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: SlotHandle) -> Option<&T> {
        self.slot(handle).map(|slot| &slot.payload)
    }

    /// Gets a mutable reference to the entry a handle refers to.
    #[inline]
    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.payload)
    }

    /// Retires an entry. Its slot stays in the iteration range as a hole
    /// until the next [`compact`](Self::compact).
    ///
    /// Returns true if the entry was live.
    pub fn invalidate(&mut self, handle: SlotHandle) -> bool {
        let Some(slot) = self.slot_mut(handle) else {
            return false;
        };
        if !slot.valid {
            return false;
        }
        slot.valid = false;
        self.live_count -= 1;
        true
    }

    /// Retires every live entry.
    pub fn invalidate_all(&mut self) {
        for &index in &self.order[..self.valid_count] {
            self.slots[index as usize].valid = false;
        }
        self.live_count = 0;
    }

    /// Packs live entries into a contiguous prefix of the iteration range.
    ///
    /// Live entries keep their relative order. Hooks are not run.
    /// Returns the number of holes reclaimed.
    pub fn compact(&mut self) -> usize {
        let mut write = 0;
        for read in 0..self.valid_count {
            if self.slot_at(read).valid {
                self.order.swap(write, read);
                write += 1;
            }
        }

        let reclaimed = self.valid_count - write;
        self.valid_count = write;
        if reclaimed > 0 {
            tracing::trace!(reclaimed, live = write, "slot pool compacted");
        }
        reclaimed
    }

    /// Iterates over live entries in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &T)> {
        self.order[..self.valid_count].iter().filter_map(move |&index| {
            let slot = &self.slots[index as usize];
            slot.valid.then_some((
                SlotHandle {
                    index,
                    generation: slot.generation,
                },
                &slot.payload,
            ))
        })
    }

    #[inline]
    fn slot_at(&self, position: usize) -> &Slot<T> {
        &self.slots[self.order[position] as usize]
    }

    #[inline]
    fn slot(&self, handle: SlotHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.occupied && slot.generation == handle.generation)
    }

    #[inline]
    fn slot_mut(&mut self, handle: SlotHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.occupied && slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        value: u32,
        inits: u32,
        deinits: u32,
    }

    impl Poolable for Probe {
        fn initialize(&mut self) {
            self.inits += 1;
        }

        fn deinitialize(&mut self) {
            self.deinits += 1;
            self.value = 0;
        }
    }

    #[test]
    fn test_pool_acquire_get() {
        let mut pool: SlotPool<Probe> = SlotPool::new(4);

        let (h1, probe) = pool.acquire().unwrap();
        probe.value = 42;

        assert_eq!(pool.get(h1).unwrap().value, 42);
        assert_eq!(pool.live_count(), 1);
        assert_eq!(pool.valid_count(), 1);
        assert!(pool.is_valid(h1));
    }

    #[test]
    fn test_pool_exhausted() {
        let mut pool: SlotPool<Probe> = SlotPool::new(2);

        let _ = pool.acquire().unwrap();
        let _ = pool.acquire().unwrap();
        assert_eq!(
            pool.acquire().map(|(h, _)| h),
            Err(PoolError::Exhausted { capacity: 2 })
        );
        assert_eq!(pool.valid_count(), 2);
    }

    #[test]
    fn test_pool_reuse_after_compact() {
        let mut pool: SlotPool<Probe> = SlotPool::new(1);

        let (h1, _) = pool.acquire().unwrap();
        assert!(pool.invalidate(h1));
        assert_eq!(pool.compact(), 1);
        assert_eq!(pool.valid_count(), 0);

        let (h2, probe) = pool.acquire().unwrap();
        assert_eq!(probe.inits, 2);
        assert_eq!(probe.deinits, 1);
        assert_eq!(h1.index(), h2.index()); // Same slot reused
        assert_ne!(h1.generation(), h2.generation());
    }

    #[test]
    fn test_pool_reuses_hole_before_compaction() {
        let mut pool: SlotPool<Probe> = SlotPool::new(3);

        let (a, _) = pool.acquire().unwrap();
        let (b, _) = pool.acquire().unwrap();
        pool.invalidate(a);

        let (c, _) = pool.acquire().unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(pool.valid_count(), 2);
        assert_eq!(pool.live_at(0), Some(c));
        assert_eq!(pool.live_at(1), Some(b));
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut pool: SlotPool<Probe> = SlotPool::new(1);

        let (old, probe) = pool.acquire().unwrap();
        probe.value = 7;
        pool.invalidate(old);

        // Retired entries stay readable until reuse.
        assert_eq!(pool.get(old).unwrap().value, 7);
        assert!(!pool.is_valid(old));

        let (new, _) = pool.acquire().unwrap();
        assert!(pool.get(old).is_none());
        assert!(!pool.invalidate(old));
        assert!(pool.is_valid(new));
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut pool: SlotPool<Probe> = SlotPool::new(2);

        let (h, _) = pool.acquire().unwrap();
        assert!(pool.invalidate(h));
        assert!(!pool.invalidate(h));
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_compact_keeps_live_order_and_skips_hooks() {
        let mut pool: SlotPool<Probe> = SlotPool::new(5);

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let (h, probe) = pool.acquire().unwrap();
                probe.value = i;
                h
            })
            .collect();
        pool.invalidate(handles[0]);
        pool.invalidate(handles[2]);

        assert_eq!(pool.compact(), 2);
        assert_eq!(pool.valid_count(), 3);

        let values: Vec<u32> = pool.iter().map(|(_, p)| p.value).collect();
        assert_eq!(values, vec![1, 3, 4]);
        assert!(pool.iter().all(|(_, p)| p.inits == 1 && p.deinits == 0));
    }

    #[test]
    fn test_compact_empty_is_noop() {
        let mut pool: SlotPool<Probe> = SlotPool::new(3);
        assert_eq!(pool.compact(), 0);
        assert_eq!(pool.valid_count(), 0);
    }

    #[test]
    fn test_invalidate_all() {
        let mut pool: SlotPool<Probe> = SlotPool::new(3);
        for _ in 0..3 {
            let _ = pool.acquire().unwrap();
        }

        pool.invalidate_all();
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.iter().count(), 0);
        assert_eq!(pool.compact(), 3);
    }
}
