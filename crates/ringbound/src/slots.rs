use crate::error::QueueError;
use crate::invariants::{
    debug_assert_bounded_len, debug_assert_index_in_range, debug_assert_occupied_read,
    debug_assert_slot_free,
};
use std::fmt;
use std::mem::MaybeUninit;
use std::ptr;

// =============================================================================
// RING LAYOUT
// =============================================================================
//
//   capacity = 8, head = 5, len = 5
//
//     0   1   2   3   4   5   6   7
//   [ d | e |   |   |   | a | b | c ]
//           ^           ^
//           tail        head
//
// - `head` is the physical index of the oldest item (next to pop).
// - `len` is the number of occupied slots.
// - `tail` is derived as `(head + len) mod capacity`, so it can never drift
//   out of step with `head` and `len`.
// - Slot at logical offset `k` (0 = oldest) lives at `wrap(k)`.
// - Slots at offsets `[len, capacity)` are uninitialized and never read.
//
// Every modular step goes through `wrap()`.
// =============================================================================

/// Fixed-capacity FIFO ring storage.
///
/// `RingSlots` is the single-threaded building block behind
/// [`BoundedQueue`](crate::BoundedQueue): it owns the slot array and the
/// head/length bookkeeping, and never overwrites an occupied slot.
/// It performs no synchronization of its own.
///
/// # Example
///
/// ```
/// use ringbound::RingSlots;
///
/// let mut ring = RingSlots::new(2).unwrap();
/// assert!(ring.push_back('a').is_ok());
/// assert!(ring.push_back('b').is_ok());
/// assert_eq!(ring.push_back('c'), Err('c')); // full, item handed back
///
/// assert_eq!(ring.pop_front(), Some('a'));
/// assert_eq!(ring.tail(), 1);
/// ```
pub struct RingSlots<T> {
    /// Slot storage; fixed-size, never grows or shrinks.
    slots: Box<[MaybeUninit<T>]>,
    /// Physical index of the oldest occupied slot.
    head: usize,
    /// Number of occupied slots.
    len: usize,
}

impl<T> RingSlots<T> {
    /// Creates an empty ring with `capacity` slots.
    ///
    /// Fails with [`QueueError::InvalidCapacity`] when `capacity` is zero and
    /// with [`QueueError::AllocationFailed`] when the slots cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity {
                requested: capacity.to_string(),
            });
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailed {
                requested: capacity,
            })?;
        slots.resize_with(capacity, MaybeUninit::uninit);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Physical index of the next slot to be popped.
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Physical index of the next slot to be written.
    #[inline]
    pub fn tail(&self) -> usize {
        self.wrap(self.len)
    }

    /// Maps a logical offset from `head` to a physical slot index.
    #[inline]
    fn wrap(&self, offset: usize) -> usize {
        // head < capacity and offset <= capacity, so one subtraction suffices.
        let capacity = self.capacity();
        let idx = self.head + offset;
        let idx = if idx >= capacity { idx - capacity } else { idx };
        debug_assert_index_in_range!("slot", idx, capacity);
        idx
    }

    // ---------------------------------------------------------------------
    // MUTATION
    // ---------------------------------------------------------------------

    /// Appends `item` at the tail.
    ///
    /// Returns `Err(item)` without touching the ring if every slot is occupied.
    pub fn push_back(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        debug_assert_slot_free!(self.len, self.capacity());

        let idx = self.tail();
        self.slots[idx].write(item);
        self.len += 1;

        debug_assert_bounded_len!(self.len, self.capacity());
        Ok(())
    }

    /// Removes and returns the item at the head, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        debug_assert_occupied_read!(0, self.len);

        let idx = self.head;
        // SAFETY: len > 0, so the slot at `head` holds an initialized item.
        // Advancing head below marks it uninitialized again, so the value is
        // moved out exactly once.
        let item = unsafe { self.slots[idx].assume_init_read() };
        self.head = self.wrap(1);
        self.len -= 1;

        Some(item)
    }

    /// Returns the item at logical offset `offset` (0 = oldest).
    pub fn get(&self, offset: usize) -> Option<&T> {
        if offset >= self.len {
            return None;
        }

        debug_assert_occupied_read!(offset, self.len);

        // SAFETY: offset < len, so the slot lies in the occupied region.
        Some(unsafe { self.slots[self.wrap(offset)].assume_init_ref() })
    }

    /// Returns the oldest item without removing it.
    #[inline]
    pub fn peek_front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Iterates over occupied items, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |offset| self.get(offset))
    }

    /// Drops every occupied item. Head and tail positions are kept.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }
}

impl<T> Drop for RingSlots<T> {
    fn drop(&mut self) {
        // Drop all occupied items in place
        for offset in 0..self.len {
            let idx = self.wrap(offset);
            // SAFETY: offset < len, so the slot is initialized and is dropped once.
            unsafe {
                ptr::drop_in_place(self.slots[idx].as_mut_ptr());
            }
        }
    }
}

impl<T> fmt::Debug for RingSlots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingSlots")
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("tail", &self.tail())
            .field("len", &self.len)
            .finish()
    }
}
