//! # Crossfade Ramp
//!
//! Overwriting a ring buffer in place can leave a hard step in the stored
//! signal where a new block meets old content. A short linear gain ramp on
//! the freshly written samples masks that step.
//!
//! ```text
//! gain
//!  1.0 |            ________________
//!      |         __/
//!      |      __/
//!  0.1 |_____/
//!      +----|-----------|----------------> samples
//!           0           n (ramp length)
//! ```
//!
//! The ramp is a property of the *write*, not of the stored audio: the
//! start and end gains are fixed configuration, never derived from what was
//! in the buffer before.

use nih_plug::nih_debug_assert_eq;

/// Where the ramp is applied when writing into the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RampMode {
    /// Plain copies. Stored samples are always bit-identical to the input.
    Off,
    /// Ramp only the segment that lands at index 0 after a write is split at
    /// the end of the ring.
    #[default]
    WrapBoundary,
    /// Ramp the start of every write.
    EveryWrite,
}

/// Linear crossfade applied to newly written samples.
///
/// The `Default` value carries the gains and mode but a zero `length`, so it
/// writes plain copies until a length is set. `DelayEngine::configure()`
/// fills the length in from the ramp duration and sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    /// Gain of the first ramped sample.
    pub start_gain: f32,
    /// Gain the ramp rises to, and the gain of every sample after it.
    pub end_gain: f32,
    /// Ramp length in samples. A segment shorter than this is ramped over
    /// its whole length.
    pub length: usize,
    pub mode: RampMode,
}

impl Default for Crossfade {
    fn default() -> Self {
        Self {
            start_gain: 0.1,
            end_gain: 1.0,
            length: 0,
            mode: RampMode::default(),
        }
    }
}

impl Crossfade {
    /// A crossfade that never touches the written samples.
    pub const fn off() -> Self {
        Self {
            start_gain: 1.0,
            end_gain: 1.0,
            length: 0,
            mode: RampMode::Off,
        }
    }

    /// Start a ramp over a write of `total` samples.
    ///
    /// `n = min(length, total)`, so a short write still rises all the way
    /// from `start_gain` to `end_gain`.
    pub fn ramp(&self, total: usize) -> Ramp {
        let steps = self.length.min(total);
        let increment = if steps == 0 {
            0.0
        } else {
            (self.end_gain - self.start_gain) / steps as f32
        };

        Ramp {
            start_gain: self.start_gain,
            end_gain: self.end_gain,
            increment,
            steps,
            position: 0,
        }
    }
}

/// An in-progress ramp. One `Ramp` can be fed several segments in a row; it
/// picks up where the previous segment stopped, which is how a wrap-split
/// write gets one continuous fade across the end of the ring.
#[derive(Debug, Clone)]
pub struct Ramp {
    start_gain: f32,
    end_gain: f32,
    increment: f32,
    steps: usize,
    position: usize,
}

impl Ramp {
    /// Gain for the sample at the current position.
    #[inline]
    fn gain(&self) -> f32 {
        if self.position < self.steps {
            self.start_gain + self.increment * self.position as f32
        } else {
            self.end_gain
        }
    }

    /// `true` once every remaining sample would be written at `end_gain`.
    pub fn is_finished(&self) -> bool {
        self.position >= self.steps
    }

    /// Copy `source` into `dest`, scaling each sample by the ramp gain.
    ///
    /// Once the ramp is finished and `end_gain` is unity the remainder is a
    /// plain copy, so samples after the ramp stay bit-identical.
    ///
    /// Only the overlapping `min(dest.len(), source.len())` samples are
    /// written.
    pub fn copy(&mut self, dest: &mut [f32], source: &[f32]) {
        nih_debug_assert_eq!(dest.len(), source.len());
        let len = dest.len().min(source.len());
        let (dest, source) = (&mut dest[..len], &source[..len]);

        let mut i = 0;
        while i < dest.len() && !self.is_finished() {
            dest[i] = source[i] * self.gain();
            self.position += 1;
            i += 1;
        }

        if self.end_gain == 1.0 {
            dest[i..].copy_from_slice(&source[i..]);
        } else {
            for (d, s) in dest[i..].iter_mut().zip(&source[i..]) {
                *d = *s * self.end_gain;
            }
        }
        self.position += dest.len() - i;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
