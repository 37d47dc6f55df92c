//! Miri-compatible tests for detecting undefined behavior.
//!
//! Run with: `cargo +nightly miri test --test miri_tests`
//!
//! Miri checks the unsafe slot accessors for aliasing violations, data races
//! between the two threads, and leaks or double drops of heap-owning values
//! reused in place. Sizes are small to keep interpretation fast.

#![cfg(not(feature = "loom"))]

use audioqueue::{MidiMsg, RingBuffer};
use std::thread;

/// Raw API round trip across the storage boundary.
#[test]
fn miri_raw_wrap_around() {
    let ring = RingBuffer::<u32, 3>::new();

    for round in 0..4u32 {
        // SAFETY: single thread plays both roles, one at a time, within ready counts.
        unsafe {
            let n = ring.write_ready();
            for i in 0..n {
                *ring.write_slot(i) = round * 10 + i as u32;
            }
            ring.write_commit(n);

            let n = ring.read_ready();
            for i in 0..n {
                assert_eq!(*ring.read_slot(i), round * 10 + i as u32);
            }
            ring.read_commit(n);
        }
    }
}

/// Heap-owning elements overwritten in place must drop the old value exactly
/// once; `pop` moves the value out and leaves a default behind.
#[test]
fn miri_heap_values_reused_in_place() {
    let (mut tx, mut rx) = RingBuffer::<String, 2>::new().split();

    for i in 0..6 {
        tx.push(format!("value-{i}")).unwrap();
        if i % 2 == 1 {
            assert_eq!(rx.pop(), Some(format!("value-{}", i - 1)));
            assert_eq!(rx.peek().map(String::as_str), Some(format!("value-{i}").as_str()));
            let mut out = [String::new()];
            assert_eq!(rx.read_into(&mut out), 1);
            assert_eq!(out[0], format!("value-{i}"));
        }
    }

    // leave something unread: dropped with the buffer
    tx.push("left behind".to_string()).unwrap();
}

/// Cross-thread handoff of non-trivial values.
#[test]
fn miri_threaded_handoff() {
    const COUNT: i32 = 50;
    let (mut tx, mut rx) = RingBuffer::<MidiMsg, 4>::new().split();

    let producer = thread::spawn(move || {
        let mut t = 0;
        while t < COUNT {
            if tx.push(MidiMsg::note_on(0, 60, 100, t)).is_ok() {
                t += 1;
            } else {
                thread::yield_now();
            }
        }
    });

    let mut expected = 0;
    while expected < COUNT {
        match rx.pop() {
            Some(msg) => {
                assert_eq!(msg.timestamp, expected);
                assert!(msg.is_note_on());
                expected += 1;
            }
            None => thread::yield_now(),
        }
    }
    producer.join().unwrap();
}
