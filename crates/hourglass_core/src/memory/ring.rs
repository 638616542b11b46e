//! # Ring Buffer
//!
//! Fixed-capacity circular sequence. New items go to the tail (or the head,
//! when configured); a full buffer either rejects the add or pushes the
//! opposite end forward, dropping the oldest item.
//!
//! Representation: both ends `None` is empty, exactly one end set is a
//! single item, otherwise the items run from head to tail inclusive.

use std::iter::FusedIterator;

use thiserror::Error;

/// Errors raised by a [`RingBuffer`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// The buffer is full and overwriting is disabled.
    #[error("ring buffer full: capacity {capacity}")]
    Full {
        /// Fixed capacity of the buffer.
        capacity: usize,
    },
}

/// A fixed-capacity circular buffer.
///
/// # Example
///
/// ```rust
/// use hourglass_core::RingBuffer;
///
/// let mut ring: RingBuffer<char> = RingBuffer::new(3).with_overwrite(true);
/// for c in ['a', 'b', 'c', 'd'] {
///     ring.add(c).unwrap();
/// }
/// let items: Vec<char> = ring.iter().map(|(c, _)| *c).collect();
/// assert_eq!(items, vec!['b', 'c', 'd']);
/// ```
pub struct RingBuffer<T> {
    data: Box<[T]>,
    head: Option<usize>,
    tail: Option<usize>,
    overwrite_on_full: bool,
    insert_at_head: bool,
}

impl<T: Default> RingBuffer<T> {
    /// Creates an empty buffer that appends at the tail and rejects adds
    /// when full.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            data: (0..capacity).map(|_| T::default()).collect(),
            head: None,
            tail: None,
            overwrite_on_full: false,
            insert_at_head: false,
        }
    }

    /// Resets every slot to its default value and empties the buffer.
    pub fn clear(&mut self) {
        for item in self.data.iter_mut() {
            *item = T::default();
        }
        self.head = None;
        self.tail = None;
    }
}

impl<T> RingBuffer<T> {
    /// Sets whether adding to a full buffer drops the oldest item.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite_on_full: bool) -> Self {
        self.overwrite_on_full = overwrite_on_full;
        self
    }

    /// Sets whether new items go to the head instead of the tail.
    #[must_use]
    pub fn with_insert_at_head(mut self, insert_at_head: bool) -> Self {
        self.insert_at_head = insert_at_head;
        self
    }

    /// Returns true if adding to a full buffer drops the oldest item.
    #[inline]
    #[must_use]
    pub const fn overwrite_on_full(&self) -> bool {
        self.overwrite_on_full
    }

    /// Changes the full-buffer policy.
    pub fn set_overwrite_on_full(&mut self, overwrite_on_full: bool) {
        self.overwrite_on_full = overwrite_on_full;
    }

    /// Returns true if new items go to the head.
    #[inline]
    #[must_use]
    pub const fn insert_at_head(&self) -> bool {
        self.insert_at_head
    }

    /// Changes which end receives new items.
    pub fn set_insert_at_head(&mut self, insert_at_head: bool) {
        self.insert_at_head = insert_at_head;
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of items between head and tail, inclusive.
    #[must_use]
    pub fn len(&self) -> usize {
        match (self.head, self.tail) {
            (None, None) => 0,
            (Some(_), None) | (None, Some(_)) => 1,
            (Some(head), Some(tail)) if head > tail => self.data.len() - head + tail + 1,
            (Some(head), Some(tail)) => tail - head + 1,
        }
    }

    /// Returns true if the buffer holds no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.tail.is_none()
    }

    /// Returns true if the next add would hit the full-buffer policy.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.data.len()
    }

    /// Adds an item at the configured end.
    ///
    /// Returns the slot index the item was written to.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::Full`] when the buffer is full and overwriting
    /// is disabled. The buffer is left untouched.
    pub fn add(&mut self, item: T) -> Result<usize, RingError> {
        let index = if self.insert_at_head {
            self.advance_head()?
        } else {
            self.advance_tail()?
        };
        self.data[index] = item;
        Ok(index)
    }

    /// Drops the item at the head. A single remaining item stays put.
    ///
    /// Returns true if the head moved.
    pub fn remove_head(&mut self) -> bool {
        match (self.head, self.tail) {
            (Some(head), Some(tail)) if head != tail => {
                self.head = Some(self.next_index(head));
                true
            }
            _ => false,
        }
    }

    /// Drops the item at the tail. A single remaining item stays put.
    ///
    /// Returns true if the tail moved.
    pub fn remove_tail(&mut self) -> bool {
        match (self.head, self.tail) {
            (Some(head), Some(tail)) if head != tail => {
                self.tail = Some(self.prev_index(tail));
                true
            }
            _ => false,
        }
    }

    /// Returns the item at the head.
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.head_index().map(|index| &self.data[index])
    }

    /// Returns the item at the head mutably.
    pub fn head_mut(&mut self) -> Option<&mut T> {
        self.head_index().map(|index| &mut self.data[index])
    }

    /// Returns the item at the tail.
    #[must_use]
    pub fn tail(&self) -> Option<&T> {
        self.tail_index().map(|index| &self.data[index])
    }

    /// Returns the item at the tail mutably.
    pub fn tail_mut(&mut self) -> Option<&mut T> {
        self.tail_index().map(|index| &mut self.data[index])
    }

    /// Raw slot access, regardless of whether the slot is in use.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Raw mutable slot access, regardless of whether the slot is in use.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Walks items from head to tail, yielding `(item, slot index)`.
    #[must_use]
    pub fn iter(&self) -> RingIter<'_, T> {
        RingIter {
            data: &self.data,
            cursor: self.head_index().unwrap_or(0),
            remaining: self.len(),
            forward: true,
        }
    }

    /// Walks items from tail to head, yielding `(item, slot index)`.
    #[must_use]
    pub fn iter_rev(&self) -> RingIter<'_, T> {
        RingIter {
            data: &self.data,
            cursor: self.tail_index().unwrap_or(0),
            remaining: self.len(),
            forward: false,
        }
    }

    fn head_index(&self) -> Option<usize> {
        self.head.or(self.tail)
    }

    fn tail_index(&self) -> Option<usize> {
        self.tail.or(self.head)
    }

    fn advance_tail(&mut self) -> Result<usize, RingError> {
        let (head, tail) = match (self.head, self.tail) {
            (None, None) => {
                self.tail = Some(0);
                return Ok(0);
            }
            (Some(head), Some(tail)) => (head, tail),
            (Some(only), None) | (None, Some(only)) => (only, only),
        };

        let next = self.next_index(tail);
        if next == head {
            if !self.overwrite_on_full {
                return Err(RingError::Full {
                    capacity: self.data.len(),
                });
            }
            self.head = Some(self.next_index(head));
        } else {
            self.head = Some(head);
        }
        self.tail = Some(next);
        Ok(next)
    }

    fn advance_head(&mut self) -> Result<usize, RingError> {
        let (head, tail) = match (self.head, self.tail) {
            (None, None) => {
                self.head = Some(0);
                return Ok(0);
            }
            (Some(head), Some(tail)) => (head, tail),
            (Some(only), None) | (None, Some(only)) => (only, only),
        };

        let prev = self.prev_index(head);
        if prev == tail {
            if !self.overwrite_on_full {
                return Err(RingError::Full {
                    capacity: self.data.len(),
                });
            }
            self.tail = Some(self.prev_index(tail));
        } else {
            self.tail = Some(tail);
        }
        self.head = Some(prev);
        Ok(prev)
    }

    #[inline]
    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.data.len()
    }

    #[inline]
    fn prev_index(&self, index: usize) -> usize {
        (index + self.data.len() - 1) % self.data.len()
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = (&'a T, usize);
    type IntoIter = RingIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over a [`RingBuffer`] in one direction.
///
/// Cloning the iterator restarts nothing; call [`RingBuffer::iter`] again
/// to walk from the beginning.
#[derive(Clone)]
pub struct RingIter<'a, T> {
    data: &'a [T],
    cursor: usize,
    remaining: usize,
    forward: bool,
}

impl<'a, T> Iterator for RingIter<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.cursor;
        self.remaining -= 1;
        self.cursor = if self.forward {
            (index + 1) % self.data.len()
        } else {
            (index + self.data.len() - 1) % self.data.len()
        };
        Some((&self.data[index], index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for RingIter<'_, T> {}

impl<T> FusedIterator for RingIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(ring: &RingBuffer<char>) -> Vec<(char, usize)> {
        ring.iter().map(|(c, i)| (*c, i)).collect()
    }

    #[test]
    fn test_traverse_tail_insertion() {
        let mut ring: RingBuffer<char> = RingBuffer::new(4);
        for c in ['A', 'B', 'C'] {
            ring.add(c).unwrap();
        }

        assert_eq!(ring.len(), 3);
        assert_eq!(collect(&ring), vec![('A', 0), ('B', 1), ('C', 2)]);

        let reversed: Vec<(char, usize)> = ring.iter_rev().map(|(c, i)| (*c, i)).collect();
        assert_eq!(reversed, vec![('C', 2), ('B', 1), ('A', 0)]);
    }

    #[test]
    fn test_traverse_is_restartable() {
        let mut ring: RingBuffer<char> = RingBuffer::new(2);
        ring.add('x').unwrap();
        ring.add('y').unwrap();

        assert_eq!(collect(&ring), collect(&ring));
        assert_eq!(ring.iter().len(), 2);
    }

    #[test]
    fn test_empty_and_single() {
        let mut ring: RingBuffer<char> = RingBuffer::new(3);
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
        assert_eq!(ring.iter_rev().count(), 0);
        assert!(ring.head().is_none());

        ring.add('z').unwrap();
        assert_eq!(ring.len(), 1);
        assert_eq!(collect(&ring), vec![('z', 0)]);
        assert_eq!(ring.iter_rev().count(), 1);
        assert_eq!(ring.head(), Some(&'z'));
        assert_eq!(ring.tail(), Some(&'z'));
    }

    #[test]
    fn test_full_rejects_without_mutation() {
        let mut ring: RingBuffer<char> = RingBuffer::new(3);
        for c in ['A', 'B', 'C'] {
            ring.add(c).unwrap();
        }
        assert!(ring.is_full());

        assert_eq!(ring.add('D'), Err(RingError::Full { capacity: 3 }));
        assert_eq!(collect(&ring), vec![('A', 0), ('B', 1), ('C', 2)]);
    }

    #[test]
    fn test_full_overwrites_oldest() {
        let mut ring: RingBuffer<char> = RingBuffer::new(3).with_overwrite(true);
        for c in ['A', 'B', 'C'] {
            ring.add(c).unwrap();
        }

        assert_eq!(ring.add('D'), Ok(0));
        assert_eq!(ring.len(), 3);
        assert_eq!(collect(&ring), vec![('B', 1), ('C', 2), ('D', 0)]);
    }

    #[test]
    fn test_insert_at_head() {
        let mut ring: RingBuffer<char> = RingBuffer::new(3).with_insert_at_head(true);
        for c in ['A', 'B', 'C'] {
            ring.add(c).unwrap();
        }

        assert_eq!(collect(&ring), vec![('C', 1), ('B', 2), ('A', 0)]);
        assert_eq!(ring.add('D'), Err(RingError::Full { capacity: 3 }));

        ring.set_overwrite_on_full(true);
        assert_eq!(ring.add('D'), Ok(0));
        assert_eq!(collect(&ring), vec![('D', 0), ('C', 1), ('B', 2)]);
    }

    #[test]
    fn test_remove_ends() {
        let mut ring: RingBuffer<char> = RingBuffer::new(4);
        for c in ['A', 'B', 'C'] {
            ring.add(c).unwrap();
        }

        assert!(ring.remove_head());
        assert_eq!(ring.head(), Some(&'B'));
        assert!(ring.remove_tail());
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.tail(), Some(&'B'));

        // A single item can only be dropped with clear().
        assert!(!ring.remove_head());
        assert!(!ring.remove_tail());
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_single_item_cannot_be_removed() {
        let mut ring: RingBuffer<char> = RingBuffer::new(2);
        ring.add('A').unwrap();

        assert!(!ring.remove_tail());
        assert!(!ring.remove_head());
        assert_eq!(collect(&ring), vec![('A', 0)]);
    }

    #[test]
    fn test_clear_resets_slots() {
        let mut ring: RingBuffer<u32> = RingBuffer::new(2);
        ring.add(5).unwrap();
        ring.add(6).unwrap();

        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.get(0), Some(&0));
        assert_eq!(ring.get(1), Some(&0));
        assert_eq!(ring.add(9), Ok(0));
    }

    #[test]
    fn test_wraparound_length() {
        let mut ring: RingBuffer<u32> = RingBuffer::new(4).with_overwrite(true);
        for n in 0..6 {
            ring.add(n).unwrap();
        }

        assert_eq!(ring.len(), 4);
        let items: Vec<u32> = ring.iter().map(|(n, _)| *n).collect();
        assert_eq!(items, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_capacity_one() {
        let mut ring: RingBuffer<u32> = RingBuffer::new(1);
        assert_eq!(ring.add(1), Ok(0));
        assert_eq!(ring.add(2), Err(RingError::Full { capacity: 1 }));

        ring.set_overwrite_on_full(true);
        assert_eq!(ring.add(3), Ok(0));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.head(), Some(&3));
    }
}
