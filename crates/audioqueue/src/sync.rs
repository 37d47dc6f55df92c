//! Atomic types used by the ring buffer.
//!
//! With the `loom` feature the same names resolve to loom's model-checked
//! atomics, so the exact orderings used in production are the ones explored
//! by `tests/loom_tests.rs`.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{AtomicU32, Ordering};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::{AtomicU32, Ordering};
