//! Configuration for a device bridge.

use crate::ConfigError;
use std::time::Duration;

/// What the callback does when the capture queue has no room for a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// Queue what fits, drop the rest and count it.
    #[default]
    Drop,
    /// Ask the device to abort the stream.
    Abort,
}

/// Stream parameters shared out-of-band between the device callback and the
/// application thread.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    /// Frames per second.
    ///
    /// Default: 48000
    pub sample_rate: f64,

    /// Interleaved channels per frame; must match the frame type.
    ///
    /// Default: 2
    pub channels: usize,

    /// Frames the device delivers per callback.
    ///
    /// Default: 256
    pub chunk_frames: usize,

    /// Capture-side behaviour on a full queue.
    ///
    /// Default: [`OverflowPolicy::Drop`]
    pub overflow_policy: OverflowPolicy,

    /// Stop the stream (callback returns `Complete`) after this many output
    /// frames. `None` runs until the device is stopped.
    ///
    /// Default: `None`
    pub frame_budget: Option<u64>,

    /// How long the application thread sleeps when its queue is idle.
    ///
    /// Default: 5ms
    pub poll_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            channels: 2,
            chunk_frames: 256,
            overflow_policy: OverflowPolicy::Drop,
            frame_budget: None,
            poll_interval: Duration::from_millis(5),
        }
    }
}

impl BridgeConfig {
    /// Small chunks and a short poll interval.
    pub fn low_latency() -> Self {
        Self {
            chunk_frames: 64,
            poll_interval: Duration::from_millis(1),
            ..Self::default()
        }
    }

    /// Large chunks, fewer wake-ups.
    pub fn high_throughput() -> Self {
        Self {
            chunk_frames: 1024,
            poll_interval: Duration::from_millis(20),
            ..Self::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_chunk_frames(mut self, chunk_frames: usize) -> Self {
        self.chunk_frames = chunk_frames;
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frame_budget = Some(frames);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Wall-clock time covered by one callback chunk.
    ///
    /// `Duration::ZERO` if the sample rate is not a positive finite number;
    /// [`validate`](Self::validate) rejects such configs.
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f64(self.chunk_frames as f64 / self.sample_rate)
            .unwrap_or(Duration::ZERO)
    }

    /// Checks the parameters against a queue of `capacity` slots.
    pub fn validate(&self, capacity: usize) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.chunk_frames == 0 || self.chunk_frames > capacity {
            return Err(ConfigError::InvalidChunkFrames {
                chunk_frames: self.chunk_frames,
                capacity,
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}
