//! Debug assertion macros for ring and queue invariants.
//!
//! These macros are only active in debug builds (`#[cfg(debug_assertions)]`),
//! so there is zero overhead in release builds.
//!
//! Used by `RingSlots<T>` and `BoundedQueue<T>`.

// =============================================================================
// Bounded Occupancy
// =============================================================================

/// Assert that occupancy never exceeds capacity.
///
/// **Invariant**: `0 ≤ len ≤ capacity`
///
/// Used in: `RingSlots::push_back()` after incrementing len
macro_rules! debug_assert_bounded_len {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "bounded occupancy violated: len {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

/// Assert that a write only happens when a slot is free.
///
/// **Invariant**: no item is written while `len == capacity`
///
/// Used in: `RingSlots::push_back()` before writing the slot
macro_rules! debug_assert_slot_free {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len < $capacity,
            "write into a full ring: len {} == capacity {}",
            $len,
            $capacity
        )
    };
}

// =============================================================================
// Index Range
// =============================================================================

/// Assert that a physical slot index lies inside the ring.
///
/// **Invariant**: `head, tail ∈ [0, capacity)`
///
/// Used in: `RingSlots::wrap()`
macro_rules! debug_assert_index_in_range {
    ($name:literal, $idx:expr, $capacity:expr) => {
        debug_assert!(
            $idx < $capacity,
            "{} index {} out of range for capacity {}",
            $name,
            $idx,
            $capacity
        )
    };
}

// =============================================================================
// Occupied Range
// =============================================================================

/// Assert that we only read from the occupied region.
///
/// **Invariant**: slot `(head + offset) mod capacity` is initialized ⟺ `offset < len`
///
/// Used in: `RingSlots::pop_front()`, `RingSlots::get()` before `assume_init_*`
macro_rules! debug_assert_occupied_read {
    ($offset:expr, $len:expr) => {
        debug_assert!(
            $offset < $len,
            "read of unoccupied slot: offset {} outside occupied length {}",
            $offset,
            $len
        )
    };
}

// =============================================================================
// Waiter Bookkeeping
// =============================================================================

/// Assert that a waiter counter is not released more often than it was taken.
///
/// Used in: `BoundedQueue` after a thread wakes from a condition wait
macro_rules! debug_assert_waiter_registered {
    ($name:literal, $count:expr) => {
        debug_assert!(
            $count > 0,
            "{} waiter count underflow",
            $name
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_len;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_occupied_read;
pub(crate) use debug_assert_slot_free;
pub(crate) use debug_assert_waiter_registered;
