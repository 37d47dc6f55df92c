//! audioqueue - Lock-Free Single-Producer Single-Consumer Slot Queue
//!
//! A fixed-capacity ring buffer for handing fixed-size elements (audio frames,
//! MIDI events) from a real-time context, such as a device callback that must
//! never block, allocate or lock, to an ordinary thread, and back.
//!
//! # Key Features
//!
//! - Inline `[T; N]` storage, default-initialized once and reused in place
//! - Two atomic counters and nothing else: Relaxed on the owning side,
//!   Acquire/Release across sides
//! - Reservation/commit split: fill any number of slots, publish them with one
//!   atomic store; the reader never sees a partial batch
//! - Counter wraparound handled by wrapping arithmetic, any capacity `N`
//! - Safe [`Producer`] / [`Consumer`] handles on top of the raw [`RingBuffer`]
//! - A [`DuplexBridge`] that plugs the queues into a periodic audio callback
//!
//! # Example
//!
//! ```
//! use audioqueue::RingBuffer;
//! use std::thread;
//!
//! let (mut producer, mut consumer) = RingBuffer::<u64, 1024>::new().split();
//!
//! let writer = thread::spawn(move || {
//!     let mut next = 0u64;
//!     while next < 10_000 {
//!         // claim, fill, publish
//!         let n = producer.write_ready().min(64).min((10_000 - next) as usize);
//!         for i in 0..n {
//!             *producer.write_slot(i) = next + i as u64;
//!         }
//!         producer.write_commit(n);
//!         next += n as u64;
//!     }
//! });
//!
//! let mut expected = 0u64;
//! while expected < 10_000 {
//!     let n = consumer.read_ready();
//!     for i in 0..n {
//!         assert_eq!(*consumer.read_slot(i), expected);
//!         expected += 1;
//!     }
//!     consumer.read_commit(n);
//! }
//! writer.join().unwrap();
//! ```

mod backoff;
mod bridge;
mod cell;
mod config;
mod error;
mod frame;
mod handle;
mod invariants;
mod metrics;
mod ring;
mod sync;

pub use backoff::Backoff;
pub use bridge::{CallbackFlow, CallbackStatus, DuplexBridge, FrameReader, FrameWriter};
pub use config::{BridgeConfig, OverflowPolicy};
pub use error::ConfigError;
pub use frame::{Frame, MidiMsg, MonoFrame, StereoFrame};
pub use handle::{Consumer, Producer};
pub use metrics::{BridgeMetrics, MetricsSnapshot};
pub use ring::RingBuffer;
