use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters updated by the real-time side of a bridge.
///
/// Every update is a single Relaxed `fetch_add`: no locks, no allocation, and
/// no ordering with respect to the audio data itself. Readers take a
/// [`MetricsSnapshot`] from any thread.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    callbacks: AtomicU64,
    frames_captured: AtomicU64,
    frames_dropped: AtomicU64,
    frames_played: AtomicU64,
    underrun_frames: AtomicU64,
    device_input_overflows: AtomicU64,
    device_input_underflows: AtomicU64,
    device_output_overflows: AtomicU64,
    device_output_underflows: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_callback(&self) {
        self.callbacks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_frames_captured(&self, n: u64) {
        if n > 0 {
            self.frames_captured.fetch_add(n, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn add_frames_dropped(&self, n: u64) {
        if n > 0 {
            self.frames_dropped.fetch_add(n, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn add_frames_played(&self, n: u64) {
        if n > 0 {
            self.frames_played.fetch_add(n, Ordering::Relaxed);
        }
    }

    #[inline]
    pub(crate) fn add_underrun_frames(&self, n: u64) {
        if n > 0 {
            self.underrun_frames.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Counts the xrun flags the device reported for one callback.
    #[inline]
    pub(crate) fn add_device_status(&self, status: &crate::CallbackStatus) {
        for (flag, counter) in [
            (status.input_overflow, &self.device_input_overflows),
            (status.input_underflow, &self.device_input_underflows),
            (status.output_overflow, &self.device_output_overflows),
            (status.output_underflow, &self.device_output_underflows),
        ] {
            if flag {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Reads every counter. Individual values are exact; the set is not a
    /// single atomic cut across counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            callbacks: self.callbacks.load(Ordering::Relaxed),
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_played: self.frames_played.load(Ordering::Relaxed),
            underrun_frames: self.underrun_frames.load(Ordering::Relaxed),
            device_input_overflows: self.device_input_overflows.load(Ordering::Relaxed),
            device_input_underflows: self.device_input_underflows.load(Ordering::Relaxed),
            device_output_overflows: self.device_output_overflows.load(Ordering::Relaxed),
            device_output_underflows: self.device_output_underflows.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BridgeMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Callbacks processed
    pub callbacks: u64,
    /// Input frames queued for the application
    pub frames_captured: u64,
    /// Input frames lost because the capture queue was full
    pub frames_dropped: u64,
    /// Output frames taken from the playback queue
    pub frames_played: u64,
    /// Output frames filled with silence because the playback queue was empty
    pub underrun_frames: u64,
    pub device_input_overflows: u64,
    pub device_input_underflows: u64,
    pub device_output_overflows: u64,
    pub device_output_underflows: u64,
}

impl MetricsSnapshot {
    /// Counter deltas between `earlier` and `self`.
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            callbacks: self.callbacks.wrapping_sub(earlier.callbacks),
            frames_captured: self.frames_captured.wrapping_sub(earlier.frames_captured),
            frames_dropped: self.frames_dropped.wrapping_sub(earlier.frames_dropped),
            frames_played: self.frames_played.wrapping_sub(earlier.frames_played),
            underrun_frames: self.underrun_frames.wrapping_sub(earlier.underrun_frames),
            device_input_overflows: self
                .device_input_overflows
                .wrapping_sub(earlier.device_input_overflows),
            device_input_underflows: self
                .device_input_underflows
                .wrapping_sub(earlier.device_input_underflows),
            device_output_overflows: self
                .device_output_overflows
                .wrapping_sub(earlier.device_output_overflows),
            device_output_underflows: self
                .device_output_underflows
                .wrapping_sub(earlier.device_output_underflows),
        }
    }

    /// True if any frame was dropped or padded, by the queues or the device.
    pub fn has_xruns(&self) -> bool {
        self.frames_dropped > 0
            || self.underrun_frames > 0
            || self.device_input_overflows > 0
            || self.device_input_underflows > 0
            || self.device_output_overflows > 0
            || self.device_output_underflows > 0
    }

    /// Logs the change since `previous`: xruns at `warn`, throughput at `debug`.
    ///
    /// Call from an application thread, never from the callback.
    pub fn report(&self, previous: &Self) {
        let delta = self.since(previous);
        if delta.has_xruns() {
            tracing::warn!(
                dropped = delta.frames_dropped,
                underrun = delta.underrun_frames,
                device_in_over = delta.device_input_overflows,
                device_in_under = delta.device_input_underflows,
                device_out_over = delta.device_output_overflows,
                device_out_under = delta.device_output_underflows,
                "audio xruns"
            );
        }
        tracing::debug!(
            callbacks = delta.callbacks,
            captured = delta.frames_captured,
            played = delta.frames_played,
            "bridge throughput"
        );
    }
}
