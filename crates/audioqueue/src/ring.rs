use crate::cell::SyncCell;
use crate::invariants::{
    debug_assert_bounded_count, debug_assert_index_in_range, debug_assert_read_within_written,
    debug_assert_slot_reserved,
};
use crate::sync::{AtomicU32, Ordering};
use crossbeam_utils::CachePadded;

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Two 32-bit counters count every slot ever published (`write_count`) and
// every slot ever released (`read_count`). They only grow, wrapping at 2^32;
// occupancy is always `write_count.wrapping_sub(read_count)`, which stays
// exact across the wrap because it never exceeds N ≤ 2^31.
//
// ## Memory Ordering Protocol
//
// **Producer (write path):**
// 1. Load `write_count` with Relaxed (only the producer writes it)
// 2. Load `read_count` with Acquire (synchronizes with the consumer's commit)
// 3. Write slots `[tail_index, tail_index + n)` (protected by the protocol)
// 4. Advance `tail_index` (producer-private)
// 5. Store `write_count + n` with Release (publishes the slot writes)
//
// **Consumer (read path):**
// 1. Load `read_count` with Relaxed (only the consumer writes it)
// 2. Load `write_count` with Acquire (synchronizes with the producer's commit)
// 3. Read slots `[head_index, head_index + n)` (protected by the protocol)
// 4. Advance `head_index` (consumer-private)
// 5. Store `read_count + n` with Release (hands the slots back to the producer)
//
// A stale Acquire load only ever sees a smaller opposite counter, so each
// side can under-report its ready count but never over-report it.
//
// ## Single-Writer Invariants
//
// - `write_count`, `tail_index`: written by the producer only
// - `read_count`, `head_index`: written by the consumer only
// - `storage[i]`: owned by whichever side the counters currently assign it to
//
// =============================================================================

/// One side's published counter plus its private position in `storage`.
struct Side {
    /// Published slot count (written by the owning side, read by the other)
    count: AtomicU32,
    /// Cached `count mod N`, never touched by the other side
    index: SyncCell<usize>,
}

impl Side {
    fn new(count: u32, index: usize) -> Self {
        Self {
            count: AtomicU32::new(count),
            index: SyncCell::new(index),
        }
    }
}

/// Fixed-capacity lock-free SPSC ring buffer of `N` slots of `T`.
///
/// This is the raw core: the slot accessors and commits are `unsafe` because
/// nothing here stops two threads from claiming the same role. Most callers
/// want [`RingBuffer::split`], which hands out one [`Producer`] and one
/// [`Consumer`] and makes the role discipline a matter of ownership.
///
/// Storage is an inline `[T; N]`, default-initialized once. Slots are reused
/// in place; nothing is allocated or dropped per element.
///
/// `N` does not need to be a power of two. Indices are advanced by a single
/// conditional subtraction instead of a division either way; a power of two
/// lets the compiler turn that into a mask.
///
/// [`Producer`]: crate::Producer
/// [`Consumer`]: crate::Consumer
#[repr(C)]
pub struct RingBuffer<T, const N: usize> {
    // === PRODUCER HOT === (cache-line padded)
    producer: CachePadded<Side>,

    // === CONSUMER HOT === (cache-line padded)
    consumer: CachePadded<Side>,

    // === DATA BUFFER === (inline, no pointer indirection)
    storage: [SyncCell<T>; N],
}

// SAFETY: producer and consumer touch disjoint slots, and ownership of a slot
// moves between them only through the Release/Acquire pairs on the counters.
// Values cross threads, so `T: Send` is required; they are never shared.
unsafe impl<T: Send, const N: usize> Sync for RingBuffer<T, N> {}

impl<T, const N: usize> RingBuffer<T, N> {
    const VALID_CAPACITY: () = assert!(
        N > 0 && N <= (u32::MAX / 2) as usize,
        "RingBuffer capacity must be in 1..=2^31-1"
    );

    /// Creates an empty buffer with every slot set to `T::default()`.
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::starting_at(0)
    }

    /// Creates an empty buffer whose counters start at `count`.
    ///
    /// Lets tests drive the counters across their 2^32 wrap without pushing
    /// four billion elements first.
    pub(crate) fn starting_at(count: u32) -> Self
    where
        T: Default,
    {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;

        let index = count as usize % N;
        Self {
            producer: CachePadded::new(Side::new(count, index)),
            consumer: CachePadded::new(Side::new(count, index)),
            storage: std::array::from_fn(|_| SyncCell::new(T::default())),
        }
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns a snapshot of the number of published, unread slots.
    ///
    /// Informational only; use the ready counts for protocol decisions.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.consumer.count.load(Ordering::Relaxed);
        let written = self.producer.count.load(Ordering::Relaxed);
        (written.wrapping_sub(read) as usize).min(N)
    }

    /// Returns true if no published slot is waiting to be read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every slot holds published, unread data.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Discards every unread slot and rewinds both sides to slot 0, resetting
    /// each slot to `T::default()`.
    ///
    /// Takes `&mut self`, so neither side can be mid-operation.
    pub fn clear(&mut self)
    where
        T: Default,
    {
        for side in [&mut self.producer, &mut self.consumer] {
            side.count.store(0, Ordering::Relaxed);
            *side.index.get_mut_exclusive() = 0;
        }
        for slot in &mut self.storage {
            *slot.get_mut_exclusive() = T::default();
        }
    }

    /// `i mod N` for `i < 2N`.
    #[inline]
    fn wrap(i: usize) -> usize {
        if N.is_power_of_two() {
            i & (N - 1)
        } else if i >= N {
            i - N
        } else {
            i
        }
    }

    // ---------------------------------------------------------------------
    // PRODUCER API
    // ---------------------------------------------------------------------

    /// Number of slots the producer may fill without touching unread data.
    ///
    /// Meaningful on the producer thread; from anywhere else it is a stale
    /// (but never optimistic) estimate.
    #[inline]
    pub fn write_ready(&self) -> usize {
        let written = self.producer.count.load(Ordering::Relaxed);
        let read = self.consumer.count.load(Ordering::Acquire);
        let used = written.wrapping_sub(read) as usize;
        debug_assert_bounded_count!(used, N);
        N - used
    }

    /// Returns the slot `offset` places past the producer's position.
    ///
    /// # Safety
    ///
    /// - Only the producer thread may call this.
    /// - `offset` must be below the last value `write_ready()` returned on the
    ///   producer thread, minus anything committed since.
    /// - The returned reference must be dropped before the matching
    ///   `write_commit`, and no two live references may name the same slot.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn write_slot(&self, offset: usize) -> &mut T {
        debug_assert_slot_reserved!("write", offset, self.write_ready());
        // SAFETY: the producer is the only thread touching `tail_index`.
        let tail = unsafe { *self.producer.index.get() };
        // SAFETY: the slot lies in the producer's half per the caller's
        // contract; the consumer will not read it until it is published.
        unsafe { self.storage[Self::wrap(tail + offset)].get_mut() }
    }

    /// Publishes the next `count` slots to the consumer.
    ///
    /// # Safety
    ///
    /// - Only the producer thread may call this.
    /// - `count` must not exceed the last value `write_ready()` returned on
    ///   the producer thread, minus anything committed since.
    /// - No reference from `write_slot` may still be alive.
    #[inline]
    pub unsafe fn write_commit(&self, count: usize) {
        let written = self.producer.count.load(Ordering::Relaxed);
        let new_written = written.wrapping_add(count as u32);

        // The consumer's counter can only have grown since the producer's last
        // Acquire load, so a Relaxed load here never yields a false positive.
        debug_assert_bounded_count!(
            new_written.wrapping_sub(self.consumer.count.load(Ordering::Relaxed)) as usize,
            N
        );

        // SAFETY: the producer is the only thread touching `tail_index`.
        let tail = unsafe { self.producer.index.get_mut() };
        *tail = Self::wrap(*tail + count);
        debug_assert_index_in_range!("tail_index", *tail, N);

        // Sole writer of write_count: a Release store is the atomic add.
        self.producer.count.store(new_written, Ordering::Release);
    }

    // ---------------------------------------------------------------------
    // CONSUMER API
    // ---------------------------------------------------------------------

    /// Number of published slots the consumer may read.
    ///
    /// Meaningful on the consumer thread; from anywhere else it is a stale
    /// (but never optimistic) estimate.
    #[inline]
    pub fn read_ready(&self) -> usize {
        let written = self.producer.count.load(Ordering::Acquire);
        let read = self.consumer.count.load(Ordering::Relaxed);
        let avail = written.wrapping_sub(read) as usize;
        debug_assert_bounded_count!(avail, N);
        avail
    }

    /// Returns the slot `offset` places past the consumer's position.
    ///
    /// # Safety
    ///
    /// - Only the consumer thread may call this.
    /// - `offset` must be below the last value `read_ready()` returned on the
    ///   consumer thread, minus anything committed since.
    /// - The returned reference must be dropped before the matching
    ///   `read_commit`.
    #[inline]
    pub unsafe fn read_slot(&self, offset: usize) -> &T {
        debug_assert_slot_reserved!("read", offset, self.read_ready());
        // SAFETY: the consumer is the only thread touching `head_index`.
        let head = unsafe { *self.consumer.index.get() };
        // SAFETY: the slot was published by a Release store the consumer has
        // Acquire-loaded; the producer will not reuse it until it is released.
        unsafe { self.storage[Self::wrap(head + offset)].get() }
    }

    /// Returns the slot `offset` places past the consumer's position, mutably.
    ///
    /// Lets the consumer move a value out (`mem::take`) instead of cloning it.
    ///
    /// # Safety
    ///
    /// Same contract as [`read_slot`](Self::read_slot).
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn read_slot_mut(&self, offset: usize) -> &mut T {
        debug_assert_slot_reserved!("read", offset, self.read_ready());
        // SAFETY: the consumer is the only thread touching `head_index`.
        let head = unsafe { *self.consumer.index.get() };
        // SAFETY: as in `read_slot`; the slot is the consumer's until released.
        unsafe { self.storage[Self::wrap(head + offset)].get_mut() }
    }

    /// Hands the next `count` slots back to the producer.
    ///
    /// # Safety
    ///
    /// - Only the consumer thread may call this.
    /// - `count` must not exceed the last value `read_ready()` returned on the
    ///   consumer thread, minus anything committed since.
    /// - No reference from `read_slot` may still be alive.
    #[inline]
    pub unsafe fn read_commit(&self, count: usize) {
        let read = self.consumer.count.load(Ordering::Relaxed);
        let new_read = read.wrapping_add(count as u32);

        debug_assert_read_within_written!(
            count,
            self.producer.count.load(Ordering::Relaxed).wrapping_sub(read) as usize
        );

        // SAFETY: the consumer is the only thread touching `head_index`.
        let head = unsafe { self.consumer.index.get_mut() };
        *head = Self::wrap(*head + count);
        debug_assert_index_in_range!("head_index", *head, N);

        // Sole writer of read_count: a Release store is the atomic add.
        self.consumer.count.store(new_read, Ordering::Release);
    }
}

impl<T: Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
