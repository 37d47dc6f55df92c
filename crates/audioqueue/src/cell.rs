//! Interior mutability for slots shared between the producer and the consumer.
//!
//! This is the only module where the aliasing rules are relaxed. A
//! [`SyncCell`] hands out `&T` / `&mut T` from a shared reference; it is up
//! to the ring buffer's reservation protocol to guarantee that the producer
//! and the consumer never hold references to the same cell at the same time:
//!
//! - slots in `[read_count, write_count)` belong to the consumer,
//! - slots in `[write_count, read_count + N)` belong to the producer,
//! - ownership of a slot changes hands only through a `Release` store on one
//!   counter observed by an `Acquire` load on the other side.
//!
//! The same cell type also holds each side's private index (`tail_index`,
//! `head_index`), which is only ever touched by its owning thread.
//!
//! Under the `loom` feature every access is additionally reported to loom's
//! causality tracker, so a slot touched by both threads without a
//! happens-before edge fails the model.

use std::cell::UnsafeCell;

pub(crate) struct SyncCell<T> {
    value: UnsafeCell<T>,
    #[cfg(feature = "loom")]
    access: loom::cell::UnsafeCell<()>,
}

impl<T> SyncCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
            #[cfg(feature = "loom")]
            access: loom::cell::UnsafeCell::new(()),
        }
    }

    /// Shared access to the value.
    ///
    /// # Safety
    ///
    /// No `&mut T` obtained through [`get_mut`](Self::get_mut) may be alive
    /// for the returned lifetime, on this thread or any other.
    #[inline]
    pub(crate) unsafe fn get(&self) -> &T {
        #[cfg(feature = "loom")]
        self.access.with(|_| ());
        // SAFETY: forwarded to the caller.
        unsafe { &*self.value.get() }
    }

    /// Exclusive access to the value through a shared reference.
    ///
    /// # Safety
    ///
    /// The caller must be the only party touching this cell for the
    /// returned lifetime.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn get_mut(&self) -> &mut T {
        #[cfg(feature = "loom")]
        self.access.with_mut(|_| ());
        // SAFETY: forwarded to the caller.
        unsafe { &mut *self.value.get() }
    }

    /// Exclusive access through an exclusive borrow; no protocol involved.
    #[inline]
    pub(crate) fn get_mut_exclusive(&mut self) -> &mut T {
        self.value.get_mut()
    }
}
