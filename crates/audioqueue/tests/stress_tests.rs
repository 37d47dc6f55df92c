//! Multi-threaded stress tests.
//!
//! These run the producer and consumer on separate OS threads with random
//! batch sizes and check ordering end to end. The interleavings are whatever
//! the scheduler produces; `loom_tests.rs` covers the exhaustive side.

#![cfg(not(feature = "loom"))]

use audioqueue::{
    Backoff, BridgeConfig, CallbackFlow, CallbackStatus, DuplexBridge, RingBuffer, StereoFrame,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Duration, Instant};

const CAPACITY: usize = 1024;
const TOTAL: u64 = 10_000_000;
const MAX_BATCH: usize = 64;

/// 10M monotonically increasing values through a 1024-slot buffer, producer
/// batches drawn from `[1, 64]`, consumer batches random too; the consumer
/// asserts strict increase with no gaps.
#[test]
fn test_spsc_ten_million_monotonic() {
    let (mut tx, mut rx) = RingBuffer::<u64, CAPACITY>::new().split();

    let producer = thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(0xA0D1);
        let mut next = 0u64;
        while next < TOTAL {
            let want = rng.gen_range(1..=MAX_BATCH).min((TOTAL - next) as usize);
            let n = tx.write_ready().min(want);
            if n == 0 {
                std::hint::spin_loop();
                continue;
            }
            for i in 0..n {
                *tx.write_slot(i) = next + i as u64;
            }
            tx.write_commit(n);
            next += n as u64;
        }
    });

    let mut rng = StdRng::seed_from_u64(0xC0DE);
    let mut expected = 0u64;
    while expected < TOTAL {
        let want = rng.gen_range(1..=MAX_BATCH * 2);
        let n = rx.read_ready().min(want);
        if n == 0 {
            std::hint::spin_loop();
            continue;
        }
        for i in 0..n {
            let v = *rx.read_slot(i);
            assert_eq!(v, expected, "gap or reorder at element {}", expected);
            expected += 1;
        }
        rx.read_commit(n);
    }

    producer.join().unwrap();
    assert_eq!(rx.read_ready(), 0);
}

/// Same traffic through the raw buffer, shared by reference across scoped
/// threads and driven with the unchecked API.
#[test]
fn test_raw_ring_scoped_threads() {
    const COUNT: u64 = 1_000_000;
    let ring = Box::new(RingBuffer::<u64, 256>::new());

    thread::scope(|s| {
        s.spawn(|| {
            let mut next = 0u64;
            while next < COUNT {
                let n = ring.write_ready().min(32).min((COUNT - next) as usize);
                // SAFETY: this is the only producer thread and n ≤ write_ready().
                unsafe {
                    for i in 0..n {
                        *ring.write_slot(i) = next + i as u64;
                    }
                    ring.write_commit(n);
                }
                next += n as u64;
            }
        });

        let mut expected = 0u64;
        while expected < COUNT {
            let n = ring.read_ready();
            // SAFETY: this is the only consumer thread and n ≤ read_ready().
            unsafe {
                for i in 0..n {
                    assert_eq!(*ring.read_slot(i), expected + i as u64);
                }
                ring.read_commit(n);
            }
            expected += n as u64;
        }
    });

    assert!(ring.is_empty());
}

/// Both sides wait on ready counts with a backoff instead of spinning hot.
#[test]
fn test_wait_helpers_with_backoff() {
    const COUNT: u32 = 100_000;
    let (mut tx, mut rx) = RingBuffer::<u32, 64>::new().split();
    let deadline = Instant::now() + Duration::from_secs(60);

    let producer = thread::spawn(move || {
        let mut backoff = Backoff::with_park(Duration::from_micros(50));
        let mut next = 0;
        while next < COUNT {
            let n = tx.wait_write_ready(1, &mut backoff, deadline);
            assert!(n > 0, "producer timed out");
            let n = tx.write_batch(n.min((COUNT - next) as usize), |i, slot| {
                *slot = next + i as u32;
            });
            next += n as u32;
        }
    });

    let mut backoff = Backoff::with_park(Duration::from_micros(50));
    let mut expected = 0;
    while expected < COUNT {
        if let Some(v) = backoff.poll(|| rx.pop()) {
            assert_eq!(v, expected);
            expected += 1;
        } else {
            assert!(rx.wait_read_ready(1, &mut backoff, deadline) > 0, "consumer timed out");
        }
    }
    producer.join().unwrap();
}

/// A simulated device thread drives `DuplexBridge::process` while the
/// application thread echoes every captured frame back to playback.
#[test]
fn test_bridge_device_thread_loopback() {
    const CHUNK: usize = 64;
    const CALLBACKS: usize = 2_000;

    let (cap_tx, mut cap_rx) = RingBuffer::<StereoFrame, 1024>::new().split();
    let (mut play_tx, play_rx) = RingBuffer::<StereoFrame, 1024>::new().split();
    let config = BridgeConfig::default().with_chunk_frames(CHUNK);
    let mut bridge = DuplexBridge::new(&config)
        .unwrap()
        .with_capture(cap_tx)
        .with_playback(play_rx);
    let metrics = bridge.metrics();

    let device = thread::spawn(move || {
        let mut input = [0.0f32; CHUNK * 2];
        let mut output = [0.0f32; CHUNK * 2];
        let mut played = Vec::new();
        let mut sample = 0u32;
        for _ in 0..CALLBACKS {
            for s in &mut input {
                *s = sample as f32;
                sample += 1;
            }
            let flow = bridge.process(&input, &mut output, &CallbackStatus::default());
            assert_ne!(flow, CallbackFlow::Abort);
            played.extend_from_slice(&output);
            thread::yield_now();
        }
        played
    });

    // echo until the device thread finishes; frames keep their sample values
    let mut echoed = 0usize;
    while !device.is_finished() {
        while let Some(frame) = cap_rx.pop() {
            let mut f = frame;
            loop {
                match play_tx.push(f) {
                    Ok(()) => {
                        echoed += 1;
                        break;
                    }
                    Err(_) if device.is_finished() => break,
                    Err(back) => {
                        f = back;
                        thread::yield_now();
                    }
                }
            }
        }
        thread::yield_now();
    }
    let played = device.join().unwrap();

    let snap = metrics.snapshot();
    assert_eq!(snap.callbacks, CALLBACKS as u64);
    assert_eq!(snap.frames_captured + snap.frames_dropped, (CALLBACKS * CHUNK) as u64);
    assert_eq!(snap.frames_played + snap.underrun_frames, (CALLBACKS * CHUNK) as u64);
    assert!(echoed as u64 <= snap.frames_captured);

    // whatever came back out is the captured ramp, in order
    let ramp: Vec<f32> = played.into_iter().filter(|s| *s != 0.0).collect();
    assert!(ramp.windows(2).all(|w| w[0] < w[1]), "playback out of order");
}
