//! Fixed-size element types carried through the queue.
//!
//! Both are plain `Copy` data, so a slot can be overwritten in place without
//! running a destructor.

use std::ops::{Index, IndexMut};

// =============================================================================
// AUDIO FRAME
// =============================================================================

/// One interleaved audio frame: a sample for each of `C` channels.
///
/// Device callbacks deliver interleaved buffers (`L R L R ...` for stereo);
/// queueing whole frames keeps channels aligned no matter how the producer
/// and consumer batch their work.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Frame<S, const C: usize>(pub [S; C]);

impl<S: Copy + Default, const C: usize> Default for Frame<S, C> {
    fn default() -> Self {
        Self([S::default(); C])
    }
}

impl<S: Copy, const C: usize> Frame<S, C> {
    /// Number of channels.
    #[inline]
    pub const fn channels() -> usize {
        C
    }

    /// Builds a frame from the first `C` samples of `samples`.
    ///
    /// # Panics
    ///
    /// Panics if `samples` holds fewer than `C` samples.
    #[inline]
    pub fn from_interleaved(samples: &[S]) -> Self {
        Self(std::array::from_fn(|i| samples[i]))
    }

    /// Copies this frame's samples into the first `C` samples of `out`.
    #[inline]
    pub fn write_interleaved(&self, out: &mut [S]) {
        out[..C].copy_from_slice(&self.0);
    }

    /// The samples, one per channel.
    #[inline]
    pub fn samples(&self) -> &[S; C] {
        &self.0
    }
}

impl<S, const C: usize> Index<usize> for Frame<S, C> {
    type Output = S;

    fn index(&self, channel: usize) -> &S {
        &self.0[channel]
    }
}

impl<S, const C: usize> IndexMut<usize> for Frame<S, C> {
    fn index_mut(&mut self, channel: usize) -> &mut S {
        &mut self.0[channel]
    }
}

/// Mono `f32` frame.
pub type MonoFrame = Frame<f32, 1>;

/// Stereo `f32` frame.
pub type StereoFrame = Frame<f32, 2>;

// =============================================================================
// MIDI MESSAGE
// =============================================================================

/// A short MIDI message with the timestamp the input driver assigned to it.
///
/// Layout matches what MIDI input drivers hand out: up to four status/data
/// bytes plus a millisecond timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct MidiMsg {
    pub data: [u8; 4],
    pub timestamp: i32,
}

impl MidiMsg {
    const NOTE_OFF: u8 = 0x80;
    const NOTE_ON: u8 = 0x90;

    pub const fn new(data: [u8; 4], timestamp: i32) -> Self {
        Self { data, timestamp }
    }

    /// Note-on on `channel` (0-15).
    pub const fn note_on(channel: u8, key: u8, velocity: u8, timestamp: i32) -> Self {
        Self::new(
            [Self::NOTE_ON | (channel & 0x0F), key & 0x7F, velocity & 0x7F, 0],
            timestamp,
        )
    }

    /// Note-off on `channel` (0-15).
    pub const fn note_off(channel: u8, key: u8, velocity: u8, timestamp: i32) -> Self {
        Self::new(
            [Self::NOTE_OFF | (channel & 0x0F), key & 0x7F, velocity & 0x7F, 0],
            timestamp,
        )
    }

    #[inline]
    pub const fn status(&self) -> u8 {
        self.data[0]
    }

    /// Channel of a channel-voice message, `None` for system messages.
    #[inline]
    pub const fn channel(&self) -> Option<u8> {
        if self.status() >= 0x80 && self.status() < 0xF0 {
            Some(self.status() & 0x0F)
        } else {
            None
        }
    }

    /// A note-on with velocity 0 counts as a note-off.
    #[inline]
    pub const fn is_note_on(&self) -> bool {
        self.status() & 0xF0 == Self::NOTE_ON && self.data[2] != 0
    }

    #[inline]
    pub const fn is_note_off(&self) -> bool {
        let kind = self.status() & 0xF0;
        kind == Self::NOTE_OFF || (kind == Self::NOTE_ON && self.data[2] == 0)
    }
}
