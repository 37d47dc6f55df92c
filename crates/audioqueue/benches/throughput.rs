use audioqueue::{BridgeConfig, CallbackStatus, DuplexBridge, RingBuffer, StereoFrame};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;

const MSG_COUNT: u64 = 1_000_000;

/// Cross-thread SPSC throughput for several producer batch sizes.
fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    for batch in [1usize, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("batch", batch), &batch, |b, &batch| {
            b.iter(|| {
                let (mut tx, mut rx) = RingBuffer::<u64, 1024>::new().split();

                let producer = thread::spawn(move || {
                    let mut sent = 0u64;
                    while sent < MSG_COUNT {
                        let n = tx.write_ready().min(batch).min((MSG_COUNT - sent) as usize);
                        if n == 0 {
                            std::hint::spin_loop();
                            continue;
                        }
                        for i in 0..n {
                            // SAFETY: i < n ≤ the ready count just observed.
                            unsafe { *tx.write_slot_unchecked(i) = sent + i as u64 };
                        }
                        // SAFETY: n ≤ the ready count just observed.
                        unsafe { tx.write_commit_unchecked(n) };
                        sent += n as u64;
                    }
                });

                let mut received = 0u64;
                while received < MSG_COUNT {
                    let n = rx.read_ready();
                    for i in 0..n {
                        // SAFETY: i < n = the ready count just observed.
                        black_box(unsafe { *rx.read_slot_unchecked(i) });
                    }
                    // SAFETY: n = the ready count just observed.
                    unsafe { rx.read_commit_unchecked(n) };
                    received += n as u64;
                }

                producer.join().unwrap();
            });
        });
    }

    group.finish();
}

/// Single-threaded cost of one bridge callback (capture + playback).
fn bench_bridge_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge");

    for chunk in [64usize, 256] {
        group.throughput(Throughput::Elements(chunk as u64));
        group.bench_with_input(BenchmarkId::new("process", chunk), &chunk, |b, &chunk| {
            let (cap_tx, mut cap_rx) = RingBuffer::<StereoFrame, 1024>::new().split();
            let (mut play_tx, play_rx) = RingBuffer::<StereoFrame, 1024>::new().split();
            let config = BridgeConfig::default().with_chunk_frames(chunk);
            let mut bridge = DuplexBridge::new(&config)
                .unwrap()
                .with_capture(cap_tx)
                .with_playback(play_rx);

            let input = vec![0.25f32; chunk * 2];
            let mut output = vec![0.0f32; chunk * 2];
            let status = CallbackStatus::default();

            b.iter(|| {
                black_box(bridge.process(&input, &mut output, &status));
                // keep both queues cycling
                cap_rx.read_batch(chunk, |f| {
                    let _ = play_tx.push(*f);
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spsc, bench_bridge_callback);
criterion_main!(benches);
