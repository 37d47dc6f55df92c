//! Debug assertion macros for ring buffer invariants.
//!
//! Only active in debug builds (`debug_assert!`), so the real-time paths carry
//! no extra branches in release builds.
//!
//! Used by `RingBuffer<T, N>`; the safe handles in `handle.rs` check the same
//! preconditions unconditionally.

// =============================================================================
// Bounded occupancy: 0 ≤ write_count − read_count ≤ N
// =============================================================================

/// Assert that the number of published, unread slots never exceeds capacity.
///
/// Used in: `write_commit()` after computing the new write count
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "bounded count violated: {} slots outstanding in a ring of {}",
            $count,
            $capacity
        )
    };
}

/// Assert that the consumer never releases slots the producer has not published.
///
/// Used in: `read_commit()` before advancing the read count
macro_rules! debug_assert_read_within_written {
    ($count:expr, $available:expr) => {
        debug_assert!(
            $count <= $available,
            "read_commit({}) exceeds the {} published slots",
            $count,
            $available
        )
    };
}

// =============================================================================
// Slot reservation: offset < ready count
// =============================================================================

/// Assert that a slot offset lies inside the currently reserved window.
///
/// Used in: `write_slot()` and `read_slot()`
macro_rules! debug_assert_slot_reserved {
    ($side:literal, $offset:expr, $ready:expr) => {
        debug_assert!(
            $offset < $ready,
            "{} slot offset {} outside the {} ready slots",
            $side,
            $offset,
            $ready
        )
    };
}

// =============================================================================
// Local index cache: index ∈ [0, N)
// =============================================================================

/// Assert that a side's private index stays inside the storage.
///
/// Used in: `write_commit()` and `read_commit()` after advancing the index
macro_rules! debug_assert_index_in_range {
    ($name:literal, $index:expr, $capacity:expr) => {
        debug_assert!(
            $index < $capacity,
            "{} {} escaped [0, {})",
            $name,
            $index,
            $capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_index_in_range;
pub(crate) use debug_assert_read_within_written;
pub(crate) use debug_assert_slot_reserved;
