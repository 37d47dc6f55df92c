//! Full-duplex loopback over a simulated audio device.
//!
//! A device thread calls `DuplexBridge::process` once per period with a sine
//! wave as input; the application thread drains the captured frames, echoes
//! them back to playback and logs the bridge counters every second.
//!
//! Run with: `RUST_LOG=audioqueue=debug cargo run -p audioqueue --bin audioqueue-demo`
//!
//! Environment:
//! - `AQ_SECONDS`      stream length (default 3)
//! - `AQ_CHUNK_FRAMES` frames per callback (default 256)
//! - `AQ_SAMPLE_RATE`  frames per second (default 48000)

use audioqueue::{
    Backoff, BridgeConfig, CallbackFlow, CallbackStatus, DuplexBridge, RingBuffer, StereoFrame,
};
use std::error::Error;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const QUEUE_FRAMES: usize = 4096;
const TONE_HZ: f64 = 440.0;

fn env_or<T>(name: &str, default: T) -> Result<T, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    match std::env::var(name) {
        Ok(raw) => Ok(raw.trim().parse()?),
        Err(_) => Ok(default),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("audioqueue=info")),
        )
        .init();

    let seconds: u64 = env_or("AQ_SECONDS", 3)?;
    let sample_rate: f64 = env_or("AQ_SAMPLE_RATE", 48_000.0)?;
    let config = BridgeConfig::default()
        .with_sample_rate(sample_rate)
        .with_chunk_frames(env_or("AQ_CHUNK_FRAMES", 256)?)
        .with_frame_budget(seconds * sample_rate as u64);

    let (cap_tx, mut cap_rx) = RingBuffer::<StereoFrame, QUEUE_FRAMES>::new().split();
    let (mut play_tx, play_rx) = RingBuffer::<StereoFrame, QUEUE_FRAMES>::new().split();
    let mut bridge = DuplexBridge::new(&config)?
        .with_capture(cap_tx)
        .with_playback(play_rx);
    let metrics = bridge.metrics();

    info!(
        seconds,
        sample_rate,
        chunk_frames = config.chunk_frames,
        period_us = config.period().as_micros() as u64,
        "starting simulated stream"
    );

    let device = {
        let config = config.clone();
        thread::Builder::new()
            .name("device".into())
            .spawn(move || simulate_device(&mut bridge, &config))?
    };

    let mut pending: Vec<StereoFrame> = Vec::with_capacity(QUEUE_FRAMES);
    let mut last = metrics.snapshot();
    let mut last_report = Instant::now();
    let mut peak = 0.0f32;

    let mut backoff = Backoff::with_park(config.poll_interval);

    while !device.is_finished() {
        // sleep until a chunk is in or the next report is due
        let report_at = last_report + Duration::from_secs(1);
        if cap_rx.wait_read_ready(config.chunk_frames, &mut backoff, report_at) > 0 {
            pending.clear();
            cap_rx.read_batch(QUEUE_FRAMES, |frame| {
                peak = frame.samples().iter().fold(peak, |p, s| p.max(s.abs()));
                pending.push(*frame);
            });

            let echoed = play_tx.write_from_slice(&pending);
            if echoed < pending.len() {
                tracing::debug!(lost = pending.len() - echoed, "playback queue full");
            }
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let now = metrics.snapshot();
            now.report(&last);
            info!(peak, queued = play_tx.capacity() - play_tx.write_ready(), "level");
            last = now;
            last_report = Instant::now();
            peak = 0.0;
        }
    }

    let flow = device.join().map_err(|_| "device thread panicked")?;
    let total = metrics.snapshot();
    total.report(&last);
    info!(
        ?flow,
        callbacks = total.callbacks,
        captured = total.frames_captured,
        played = total.frames_played,
        dropped = total.frames_dropped,
        underrun = total.underrun_frames,
        "stream finished"
    );
    Ok(())
}

/// Plays the role of the audio driver: one callback per period until the
/// bridge stops asking for more.
fn simulate_device(
    bridge: &mut DuplexBridge<f32, 2, QUEUE_FRAMES>,
    config: &BridgeConfig,
) -> CallbackFlow {
    let period = config.period();
    let mut input = vec![0.0f32; config.chunk_frames * 2];
    let mut output = vec![0.0f32; config.chunk_frames * 2];
    let step = std::f64::consts::TAU * TONE_HZ / config.sample_rate;
    let mut phase = 0.0f64;
    let start = Instant::now();
    let mut next_tick = start;

    loop {
        for frame in input.chunks_exact_mut(2) {
            let s = (phase.sin() * 0.5) as f32;
            frame.fill(s);
            phase = (phase + step) % std::f64::consts::TAU;
        }

        let now = start.elapsed().as_secs_f64();
        let status = CallbackStatus {
            input_hw_time: now,
            callback_time: now,
            output_hw_time: now + period.as_secs_f64(),
            ..CallbackStatus::default()
        };

        let flow = bridge.process(&input, &mut output, &status);
        if flow != CallbackFlow::Continue {
            return flow;
        }

        next_tick += period;
        if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }
}
