//! Safe producer and consumer handles.
//!
//! [`RingBuffer::split`] turns a buffer into exactly one [`Producer`] and one
//! [`Consumer`]. Neither handle is `Clone`, so the single-writer /
//! single-reader discipline the raw buffer relies on is enforced by
//! ownership: move each handle to its thread and the roles cannot be mixed up.
//!
//! Each handle remembers the ready count it last observed. The checked slot
//! accessors and commits validate against that remembered value, which can
//! only be smaller than the true one (the other side only ever frees space or
//! publishes data), so the check is sound without touching the atomics on the
//! common path. Violations panic, the way out-of-bounds slice indexing does.
//! Real-time code that has already sized its batch from `*_ready()` can use
//! the `*_unchecked` variants, which only `debug_assert!`.

use crate::{Backoff, RingBuffer};
use std::sync::Arc;
use std::time::Instant;

impl<T, const N: usize> RingBuffer<T, N> {
    /// Splits the buffer into its producer and consumer handles.
    ///
    /// This moves the buffer into a single shared allocation; nothing is
    /// allocated afterwards.
    pub fn split(self) -> (Producer<T, N>, Consumer<T, N>) {
        let ring = Arc::new(self);
        (
            Producer {
                ring: Arc::clone(&ring),
                ready: 0,
            },
            Consumer { ring, ready: 0 },
        )
    }
}

// =============================================================================
// PRODUCER
// =============================================================================

/// The writing half of a [`RingBuffer`].
///
/// # Example
///
/// ```
/// use audioqueue::RingBuffer;
///
/// let (mut producer, mut consumer) = RingBuffer::<u32, 4>::new().split();
///
/// assert_eq!(producer.write_ready(), 4);
/// *producer.write_slot(0) = 10;
/// *producer.write_slot(1) = 20;
/// producer.write_commit(2);
///
/// assert_eq!(consumer.read_ready(), 2);
/// assert_eq!(*consumer.read_slot(0), 10);
/// assert_eq!(*consumer.read_slot(1), 20);
/// consumer.read_commit(2);
///
/// assert_eq!(producer.write_ready(), 4);
/// ```
pub struct Producer<T, const N: usize> {
    ring: Arc<RingBuffer<T, N>>,
    /// Writable slots as of the last `write_ready()`, minus commits since
    ready: usize,
}

impl<T, const N: usize> Producer<T, N> {
    /// Returns the number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true once the [`Consumer`] has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) < 2
    }

    /// Number of slots that can be written without colliding with unread data.
    ///
    /// Never blocks. The value stays valid (as a lower bound) until the next
    /// commit.
    #[inline]
    pub fn write_ready(&mut self) -> usize {
        self.ready = self.ring.write_ready();
        self.ready
    }

    /// Re-reads the ready count only when the remembered one is too small.
    #[inline]
    fn ensure_ready(&mut self, needed: usize) -> usize {
        if self.ready < needed {
            self.write_ready();
        }
        self.ready
    }

    /// Polls until at least `min` slots (capped at `N`) are writable, the
    /// consumer is dropped, or `deadline` passes, backing off in between.
    /// Returns the last observed write-ready count.
    ///
    /// Blocks; for application threads only.
    pub fn wait_write_ready(&mut self, min: usize, backoff: &mut Backoff, deadline: Instant) -> usize {
        let min = min.min(N);
        backoff.reset();
        loop {
            let ready = self.write_ready();
            if ready >= min || self.is_abandoned() || Instant::now() >= deadline {
                return ready;
            }
            backoff.wait();
        }
    }

    /// Returns the slot `offset` places past the producer's position.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below the ready count.
    #[inline]
    pub fn write_slot(&mut self, offset: usize) -> &mut T {
        let ready = self.ensure_ready(offset + 1);
        assert!(
            offset < ready,
            "write_slot({offset}) outside the {ready} writable slots"
        );
        // SAFETY: this handle is the only producer, and `offset` is inside
        // the writable window it observed.
        unsafe { self.ring.write_slot(offset) }
    }

    /// Like [`write_slot`](Self::write_slot) without the check.
    ///
    /// # Safety
    ///
    /// `offset` must be below the ready count this handle last returned,
    /// minus anything committed since.
    #[inline]
    pub unsafe fn write_slot_unchecked(&mut self, offset: usize) -> &mut T {
        // SAFETY: forwarded to the caller; the handle guarantees the role.
        unsafe { self.ring.write_slot(offset) }
    }

    /// Publishes the next `count` slots to the consumer in one atomic store.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the ready count.
    #[inline]
    pub fn write_commit(&mut self, count: usize) {
        let ready = self.ensure_ready(count);
        assert!(
            count <= ready,
            "write_commit({count}) exceeds the {ready} writable slots"
        );
        self.ready -= count;
        // SAFETY: this handle is the only producer and `count` was checked.
        unsafe { self.ring.write_commit(count) }
    }

    /// Like [`write_commit`](Self::write_commit) without the check.
    ///
    /// # Safety
    ///
    /// `count` must not exceed the ready count this handle last returned,
    /// minus anything committed since.
    #[inline]
    pub unsafe fn write_commit_unchecked(&mut self, count: usize) {
        self.ready = self.ready.saturating_sub(count);
        // SAFETY: forwarded to the caller; the handle guarantees the role.
        unsafe { self.ring.write_commit(count) }
    }

    /// Fills up to `max` slots with `fill(offset, slot)` and publishes them
    /// with a single commit. Returns the number of slots written.
    pub fn write_batch<F>(&mut self, max: usize, mut fill: F) -> usize
    where
        F: FnMut(usize, &mut T),
    {
        let n = self.write_ready().min(max);
        for offset in 0..n {
            // SAFETY: `offset < n ≤ ready`.
            fill(offset, unsafe { self.ring.write_slot(offset) });
        }
        if n > 0 {
            self.ready -= n;
            // SAFETY: `n ≤ ready`.
            unsafe { self.ring.write_commit(n) }
        }
        n
    }

    /// Writes one value. Hands it back if the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` when no slot is free.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.ensure_ready(1) == 0 {
            return Err(value);
        }
        // SAFETY: at least one slot is writable.
        unsafe {
            *self.ring.write_slot(0) = value;
        }
        self.ready -= 1;
        // SAFETY: one slot was reserved and written.
        unsafe { self.ring.write_commit(1) }
        Ok(())
    }

    /// Copies as many leading values of `values` as fit, in one commit.
    pub fn write_from_slice(&mut self, values: &[T]) -> usize
    where
        T: Clone,
    {
        self.write_batch(values.len(), |i, slot| slot.clone_from(&values[i]))
    }
}

// =============================================================================
// CONSUMER
// =============================================================================

/// The reading half of a [`RingBuffer`].
pub struct Consumer<T, const N: usize> {
    ring: Arc<RingBuffer<T, N>>,
    /// Readable slots as of the last `read_ready()`, minus commits since
    ready: usize,
}

impl<T, const N: usize> Consumer<T, N> {
    /// Returns the number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true once the [`Producer`] has been dropped.
    ///
    /// Data it published before being dropped is still readable.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) < 2
    }

    /// Number of published slots that can be read.
    #[inline]
    pub fn read_ready(&mut self) -> usize {
        self.ready = self.ring.read_ready();
        self.ready
    }

    #[inline]
    fn ensure_ready(&mut self, needed: usize) -> usize {
        if self.ready < needed {
            self.read_ready();
        }
        self.ready
    }

    /// Polls until at least `min` slots (capped at `N`) are readable, the
    /// producer is dropped, or `deadline` passes, backing off in between.
    /// Returns the last observed read-ready count.
    ///
    /// Blocks; for application threads only.
    pub fn wait_read_ready(&mut self, min: usize, backoff: &mut Backoff, deadline: Instant) -> usize {
        let min = min.min(N);
        backoff.reset();
        loop {
            let ready = self.read_ready();
            if ready >= min || self.is_abandoned() || Instant::now() >= deadline {
                return ready;
            }
            backoff.wait();
        }
    }

    /// Returns the slot `offset` places past the consumer's position.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not below the ready count.
    #[inline]
    pub fn read_slot(&mut self, offset: usize) -> &T {
        let ready = self.ensure_ready(offset + 1);
        assert!(
            offset < ready,
            "read_slot({offset}) outside the {ready} readable slots"
        );
        // SAFETY: this handle is the only consumer, and `offset` is inside
        // the published window it observed.
        unsafe { self.ring.read_slot(offset) }
    }

    /// Like [`read_slot`](Self::read_slot) without the check.
    ///
    /// # Safety
    ///
    /// `offset` must be below the ready count this handle last returned,
    /// minus anything committed since.
    #[inline]
    pub unsafe fn read_slot_unchecked(&mut self, offset: usize) -> &T {
        // SAFETY: forwarded to the caller; the handle guarantees the role.
        unsafe { self.ring.read_slot(offset) }
    }

    /// Hands the next `count` slots back to the producer in one atomic store.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the ready count.
    #[inline]
    pub fn read_commit(&mut self, count: usize) {
        let ready = self.ensure_ready(count);
        assert!(
            count <= ready,
            "read_commit({count}) exceeds the {ready} readable slots"
        );
        self.ready -= count;
        // SAFETY: this handle is the only consumer and `count` was checked.
        unsafe { self.ring.read_commit(count) }
    }

    /// Like [`read_commit`](Self::read_commit) without the check.
    ///
    /// # Safety
    ///
    /// `count` must not exceed the ready count this handle last returned,
    /// minus anything committed since.
    #[inline]
    pub unsafe fn read_commit_unchecked(&mut self, count: usize) {
        self.ready = self.ready.saturating_sub(count);
        // SAFETY: forwarded to the caller; the handle guarantees the role.
        unsafe { self.ring.read_commit(count) }
    }

    /// Passes up to `max` readable slots to `handler` in order and releases
    /// them with a single commit. Returns the number of slots consumed.
    pub fn read_batch<F>(&mut self, max: usize, mut handler: F) -> usize
    where
        F: FnMut(&T),
    {
        let n = self.read_ready().min(max);
        for offset in 0..n {
            // SAFETY: `offset < n ≤ ready`.
            handler(unsafe { self.ring.read_slot(offset) });
        }
        if n > 0 {
            self.ready -= n;
            // SAFETY: `n ≤ ready`.
            unsafe { self.ring.read_commit(n) }
        }
        n
    }

    /// Returns the oldest unread value without consuming it.
    #[inline]
    pub fn peek(&mut self) -> Option<&T> {
        if self.ensure_ready(1) == 0 {
            return None;
        }
        // SAFETY: at least one slot is readable.
        Some(unsafe { self.ring.read_slot(0) })
    }

    /// Moves the oldest unread value out, leaving `T::default()` in the slot.
    #[inline]
    pub fn pop(&mut self) -> Option<T>
    where
        T: Default,
    {
        if self.ensure_ready(1) == 0 {
            return None;
        }
        // SAFETY: at least one slot is readable and this handle owns it.
        let value = std::mem::take(unsafe { self.ring.read_slot_mut(0) });
        self.ready -= 1;
        // SAFETY: one readable slot was consumed.
        unsafe { self.ring.read_commit(1) }
        Some(value)
    }

    /// Copies up to `out.len()` values into `out`, in one commit.
    pub fn read_into(&mut self, out: &mut [T]) -> usize
    where
        T: Clone,
    {
        let mut written = 0;
        self.read_batch(out.len(), |v| {
            out[written].clone_from(v);
            written += 1;
        })
    }
}
