//! Error types for bridge configuration.
//!
//! The ring buffer itself has no error type: its only failure mode is a
//! caller breaking the slot protocol, which is a bug, not a runtime outcome.

use thiserror::Error;

/// Reasons a [`BridgeConfig`](crate::BridgeConfig) cannot drive a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Sample rate is zero, negative, or not finite.
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f64),

    /// A callback chunk must be non-empty and fit the queue in one go.
    #[error("chunk of {chunk_frames} frames does not fit a queue of {capacity} slots")]
    InvalidChunkFrames { chunk_frames: usize, capacity: usize },

    /// A frame must carry at least one sample.
    #[error("channel count must be non-zero")]
    ZeroChannels,

    /// The application side would spin without pause.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    /// The configured channel count differs from the frame type's.
    #[error("config expects {expected} channels but frames carry {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
}
