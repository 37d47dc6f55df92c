//! Loom-based concurrency tests for audioqueue.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! With the `loom` feature the ring buffer itself is built on loom's atomics
//! and every slot access is reported to loom's causality tracker, so these
//! tests explore the production orderings, not a copy of them. Capacities and
//! element counts are kept tiny so the interleaving space stays searchable.

#![cfg(feature = "loom")]

use audioqueue::{Consumer, Producer, RingBuffer};
use loom::thread;

/// Producer side of the protocol: claim, fill, publish, in batches of at most
/// `max_batch`, yielding whenever the buffer is full.
fn produce<const N: usize>(mut tx: Producer<u32, N>, total: u32, max_batch: usize) {
    let mut next = 0;
    while next < total {
        let n = tx.write_ready().min(max_batch).min((total - next) as usize);
        if n == 0 {
            thread::yield_now();
            continue;
        }
        for i in 0..n {
            *tx.write_slot(i) = next + i as u32;
        }
        tx.write_commit(n);
        next += n as u32;
    }
}

/// Consumer side: read everything that is ready, check it, release it.
fn consume<const N: usize>(mut rx: Consumer<u32, N>, total: u32) -> Vec<u32> {
    let mut received = Vec::new();
    while received.len() < total as usize {
        let n = rx.read_ready();
        if n == 0 {
            thread::yield_now();
            continue;
        }
        for i in 0..n {
            received.push(*rx.read_slot(i));
        }
        rx.read_commit(n);
    }
    received
}

/// FIFO across a capacity smaller than the stream, so slots are reused.
#[test]
fn loom_fifo_with_slot_reuse() {
    loom::model(|| {
        let (tx, rx) = RingBuffer::<u32, 2>::new().split();

        let producer = thread::spawn(move || produce(tx, 3, 2));
        let received = consume(rx, 3);
        producer.join().unwrap();

        assert_eq!(received, vec![0, 1, 2]);
    });
}

/// N = 1: every element is a full handoff of the only slot.
#[test]
fn loom_single_slot_handoff() {
    loom::model(|| {
        let (tx, rx) = RingBuffer::<u32, 1>::new().split();

        let producer = thread::spawn(move || produce(tx, 2, 1));
        let received = consume(rx, 2);
        producer.join().unwrap();

        assert_eq!(received, vec![0, 1]);
    });
}

/// A batch is published by one commit: the consumer sees either none of it or
/// all of it, never a prefix.
#[test]
fn loom_batch_is_atomic() {
    loom::model(|| {
        let (mut tx, mut rx) = RingBuffer::<u32, 4>::new().split();

        let producer = thread::spawn(move || {
            for i in 0..3 {
                *tx.write_slot(i) = 7;
            }
            tx.write_commit(3);
        });

        let ready = rx.read_ready();
        assert!(ready == 0 || ready == 3, "observed partial batch of {}", ready);
        for i in 0..ready {
            assert_eq!(*rx.read_slot(i), 7);
        }

        producer.join().unwrap();
    });
}

/// Ready counts observed concurrently never over-report, and add up to the
/// capacity once both sides are quiet.
#[test]
fn loom_ready_counts_are_conservative() {
    loom::model(|| {
        let ring = loom::sync::Arc::new(RingBuffer::<u32, 2>::new());
        let observer = loom::sync::Arc::clone(&ring);

        let producer = thread::spawn(move || {
            // SAFETY: this thread is the only producer.
            unsafe {
                *ring.write_slot(0) = 1;
                ring.write_commit(1);
            }
            ring
        });

        let seen = observer.read_ready();
        assert!(seen <= 1);
        assert!(observer.write_ready() >= 1);

        let ring = producer.join().unwrap();
        assert_eq!(ring.read_ready(), 1);
        assert_eq!(ring.write_ready() + ring.read_ready(), 2);
    });
}
