//! Adapter between a periodic device callback and the frame queues.
//!
//! The device library (stream setup, device enumeration, sample format
//! conversion) stays outside this crate. What it contributes is a callback
//! invoked every period with an interleaved input buffer, an interleaved
//! output buffer and a status block. [`DuplexBridge::process`] is meant to be
//! called from exactly that callback:
//!
//! ```text
//!   device thread (real-time)                 application thread
//!   ─────────────────────────                 ──────────────────
//!   input  ──► FrameWriter ──► capture queue  ──► Consumer<Frame>
//!   output ◄── FrameReader ◄── playback queue ◄── Producer<Frame>
//! ```
//!
//! Nothing on the callback side allocates, locks, blocks or logs. Each
//! direction costs one Acquire load and one Release store per callback,
//! regardless of the chunk size.

use crate::{
    BridgeConfig, BridgeMetrics, ConfigError, Consumer, Frame, OverflowPolicy, Producer,
};
use std::sync::Arc;

/// Timing and xrun information the device passes to each callback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CallbackStatus {
    /// Device clock time at which the first input sample was captured
    pub input_hw_time: f64,
    /// Device clock time at which the callback was invoked
    pub callback_time: f64,
    /// Device clock time at which the first output sample will play
    pub output_hw_time: f64,
    pub input_underflow: bool,
    pub input_overflow: bool,
    pub output_underflow: bool,
    pub output_overflow: bool,
    /// The device is priming its output buffers; input is silence
    pub priming_output: bool,
}

/// What the callback tells the device to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlow {
    /// Keep calling.
    Continue,
    /// Play out what has been queued, then stop.
    Complete,
    /// Stop immediately.
    Abort,
}

impl CallbackFlow {
    /// Numeric return code used by C audio APIs (0, 1, 2).
    pub const fn code(self) -> i32 {
        match self {
            Self::Continue => 0,
            Self::Complete => 1,
            Self::Abort => 2,
        }
    }
}

// =============================================================================
// CAPTURE: device input → queue
// =============================================================================

/// Real-time writer that turns interleaved input buffers into queued frames.
pub struct FrameWriter<S, const C: usize, const N: usize> {
    producer: Producer<Frame<S, C>, N>,
    metrics: Arc<BridgeMetrics>,
}

impl<S: Copy, const C: usize, const N: usize> FrameWriter<S, C, N> {
    pub fn new(producer: Producer<Frame<S, C>, N>, metrics: Arc<BridgeMetrics>) -> Self {
        Self { producer, metrics }
    }

    /// Queues every whole frame of `samples` that fits, with one commit.
    ///
    /// Frames that do not fit are dropped and counted; a trailing partial
    /// frame is ignored. Returns the number of frames queued.
    pub fn push_interleaved(&mut self, samples: &[S]) -> usize {
        let frames = samples.len() / C;
        let queued = self.producer.write_batch(frames, |i, slot| {
            slot.0.copy_from_slice(&samples[i * C..(i + 1) * C]);
        });
        self.metrics.add_frames_captured(queued as u64);
        self.metrics.add_frames_dropped((frames - queued) as u64);
        queued
    }

    /// True once the application dropped its consumer.
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

// =============================================================================
// PLAYBACK: queue → device output
// =============================================================================

/// Real-time reader that fills interleaved output buffers from queued frames.
pub struct FrameReader<S, const C: usize, const N: usize> {
    consumer: Consumer<Frame<S, C>, N>,
    metrics: Arc<BridgeMetrics>,
}

impl<S: Copy + Default, const C: usize, const N: usize> FrameReader<S, C, N> {
    pub fn new(consumer: Consumer<Frame<S, C>, N>, metrics: Arc<BridgeMetrics>) -> Self {
        Self { consumer, metrics }
    }

    /// Fills `out` with queued frames, with one commit, and pads the rest with
    /// `S::default()` (silence). Returns the number of frames taken from the
    /// queue; the padded remainder is counted as underrun.
    pub fn pull_interleaved(&mut self, out: &mut [S]) -> usize {
        let frames = out.len() / C;
        let mut chunks = out.chunks_exact_mut(C);
        let played = self.consumer.read_batch(frames, |frame| {
            if let Some(dst) = chunks.next() {
                frame.write_interleaved(dst);
            }
        });
        for dst in chunks.by_ref() {
            dst.fill(S::default());
        }
        chunks.into_remainder().fill(S::default());

        self.metrics.add_frames_played(played as u64);
        self.metrics.add_underrun_frames((frames - played) as u64);
        played
    }

    /// True once the application dropped its producer.
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

// =============================================================================
// DUPLEX BRIDGE
// =============================================================================

/// Callback-side state for a stream with optional capture and playback.
///
/// # Example
///
/// ```
/// use audioqueue::{BridgeConfig, CallbackFlow, CallbackStatus, DuplexBridge, RingBuffer, StereoFrame};
///
/// let (capture_tx, mut capture_rx) = RingBuffer::<StereoFrame, 512>::new().split();
/// let config = BridgeConfig::default();
/// let mut bridge = DuplexBridge::new(&config)?.with_capture(capture_tx);
///
/// // inside the device callback
/// let input = [0.5f32; 2 * 256];
/// let mut output = [1.0f32; 2 * 256];
/// let flow = bridge.process(&input, &mut output, &CallbackStatus::default());
/// assert_eq!(flow, CallbackFlow::Continue);
/// assert!(output.iter().all(|s| *s == 0.0));
///
/// // on the application thread
/// assert_eq!(capture_rx.read_ready(), 256);
/// # Ok::<(), audioqueue::ConfigError>(())
/// ```
pub struct DuplexBridge<S, const C: usize, const N: usize> {
    capture: Option<FrameWriter<S, C, N>>,
    playback: Option<FrameReader<S, C, N>>,
    overflow_policy: OverflowPolicy,
    frames_left: Option<u64>,
    metrics: Arc<BridgeMetrics>,
}

impl<S: Copy + Default, const C: usize, const N: usize> DuplexBridge<S, C, N> {
    /// Creates a bridge with neither direction attached.
    pub fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
        config.validate(N)?;
        if config.channels != C {
            return Err(ConfigError::ChannelMismatch {
                expected: config.channels,
                actual: C,
            });
        }
        Ok(Self {
            capture: None,
            playback: None,
            overflow_policy: config.overflow_policy,
            frames_left: config.frame_budget,
            metrics: Arc::new(BridgeMetrics::new()),
        })
    }

    /// Routes device input into `producer`.
    pub fn with_capture(mut self, producer: Producer<Frame<S, C>, N>) -> Self {
        self.capture = Some(FrameWriter::new(producer, Arc::clone(&self.metrics)));
        self
    }

    /// Feeds device output from `consumer`.
    pub fn with_playback(mut self, consumer: Consumer<Frame<S, C>, N>) -> Self {
        self.playback = Some(FrameReader::new(consumer, Arc::clone(&self.metrics)));
        self
    }

    /// Shared counters, for the application thread to snapshot and report.
    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Handles one device callback.
    ///
    /// Queues `input`, fills `output` (silence where no playback data is
    /// queued) and decides whether the stream goes on.
    pub fn process(
        &mut self,
        input: &[S],
        output: &mut [S],
        status: &CallbackStatus,
    ) -> CallbackFlow {
        self.metrics.add_callback();
        self.metrics.add_device_status(status);

        if let Some(writer) = &mut self.capture {
            let frames = input.len() / C;
            let queued = writer.push_interleaved(input);
            if queued < frames && self.overflow_policy == OverflowPolicy::Abort {
                output.fill(S::default());
                return CallbackFlow::Abort;
            }
        }

        match &mut self.playback {
            Some(reader) => {
                reader.pull_interleaved(output);
            }
            None => output.fill(S::default()),
        }

        if let Some(left) = &mut self.frames_left {
            let frames = input.len().max(output.len()) / C;
            *left = left.saturating_sub(frames as u64);
            if *left == 0 {
                return CallbackFlow::Complete;
            }
        }

        if self.peers_gone() {
            return CallbackFlow::Complete;
        }

        CallbackFlow::Continue
    }

    /// True if at least one direction is attached and the application has
    /// dropped every handle on the other end.
    fn peers_gone(&self) -> bool {
        let capture_gone = self.capture.as_ref().map(FrameWriter::is_abandoned);
        let playback_gone = self.playback.as_ref().map(FrameReader::is_abandoned);
        match (capture_gone, playback_gone) {
            (None, None) => false,
            (a, b) => a.unwrap_or(true) && b.unwrap_or(true),
        }
    }
}
