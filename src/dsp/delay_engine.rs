//! # Delay Engine
//!
//! The engine turns a [`RingStore`] into a block-based delay: every call to
//! [`process()`](DelayEngine::process) hands back the audio from
//! `delay_time` seconds ago, one block at a time.
//!
//! ## Sizing the Ring
//!
//! ```text
//! capacity = ceil(sample_rate * max_delay_seconds) + max_block_size
//! ```
//!
//! The longest delay needs `ceil(sample_rate * max_delay_seconds)` samples
//! of history, and the block being written right now needs room on top of
//! that so it never overwrites history that is still to be read. At
//! 44100 Hz, 2 s and 512-sample blocks that is `88200 + 512 = 88712`.
//!
//! ## Reading Before Writing
//!
//! For each channel the engine first reads the history the block needs,
//! then writes the live input, and finally (once, for all channels) moves
//! the write cursor. With a delay of `d` samples and a block of `n`:
//!
//! ```text
//! output[0..d]   <- ring, starting d samples behind the write cursor
//! output[d..n]   <- input[0..n-d]   (the echo of this very block)
//! ```
//!
//! Taking the second part straight from the input keeps delays shorter than
//! the block exact, and makes `d = 0` a bit-exact pass-through.

use super::crossfade::{Crossfade, RampMode};
use super::ring_store::{RingStore, MAX_CAPACITY};
use crate::error::{DelayError, Result};

/// Everything [`DelayEngine::configure()`] needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// The longest block the host will ever pass to `process()`.
    pub max_block_size: usize,
    /// The longest delay `process()` will honour.
    pub max_delay_seconds: f32,
    pub channel_count: usize,
    /// Ramp applied when the ring is overwritten.
    pub crossfade: CrossfadeConfig,
}

/// Crossfade settings in host units; the ramp length is converted to
/// samples at configure time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeConfig {
    pub start_gain: f32,
    pub end_gain: f32,
    pub ramp_seconds: f32,
    pub mode: RampMode,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        let defaults = Crossfade::default();
        Self {
            start_gain: defaults.start_gain,
            end_gain: defaults.end_gain,
            ramp_seconds: 0.003,
            mode: defaults.mode,
        }
    }
}

impl CrossfadeConfig {
    pub fn off() -> Self {
        Self {
            start_gain: 1.0,
            end_gain: 1.0,
            ramp_seconds: 0.0,
            mode: RampMode::Off,
        }
    }

    fn to_crossfade(self, sample_rate: f32) -> Crossfade {
        Crossfade {
            start_gain: self.start_gain,
            end_gain: self.end_gain,
            length: (self.ramp_seconds.max(0.0) * sample_rate).round() as usize,
            mode: self.mode,
        }
    }
}

impl EngineConfig {
    pub fn new(
        sample_rate: f32,
        max_block_size: usize,
        max_delay_seconds: f32,
        channel_count: usize,
    ) -> Self {
        Self {
            sample_rate,
            max_block_size,
            max_delay_seconds,
            channel_count,
            crossfade: CrossfadeConfig::default(),
        }
    }

    pub fn with_crossfade(mut self, crossfade: CrossfadeConfig) -> Self {
        self.crossfade = crossfade;
        self
    }

    /// Ring capacity in samples for this configuration.
    ///
    /// # Errors
    /// [`DelayError::InvalidConfiguration`] if the history overflows `f32`
    /// or the total exceeds [`MAX_CAPACITY`].
    pub fn capacity(&self) -> Result<usize> {
        let history = (self.sample_rate * self.max_delay_seconds).ceil();
        if !history.is_finite() || history > MAX_CAPACITY as f32 {
            return Err(DelayError::config(format!(
                "{} s at {} Hz needs more than {MAX_CAPACITY} samples of history",
                self.max_delay_seconds, self.sample_rate
            )));
        }

        (history as usize)
            .checked_add(self.max_block_size)
            .filter(|capacity| *capacity <= MAX_CAPACITY)
            .ok_or_else(|| {
                DelayError::config(format!(
                    "ring for {history} samples of history plus {}-sample blocks exceeds {MAX_CAPACITY} samples",
                    self.max_block_size
                ))
            })
    }

    fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(DelayError::config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.max_block_size == 0 {
            return Err(DelayError::config("maximum block size must be at least 1"));
        }
        if !(self.max_delay_seconds.is_finite() && self.max_delay_seconds > 0.0) {
            return Err(DelayError::config(format!(
                "maximum delay must be positive, got {} s",
                self.max_delay_seconds
            )));
        }
        if self.channel_count == 0 {
            return Err(DelayError::config("channel count must be at least 1"));
        }
        Ok(())
    }
}

/// State that only exists once the engine has been configured.
#[derive(Debug)]
struct Configured {
    config: EngineConfig,
    ring: RingStore,
    /// Preallocated output, `max_block_size` samples per channel.
    delayed: Vec<Vec<f32>>,
    /// Last delay applied, after clamping.
    delay_seconds: f32,
    delay_samples: usize,
}

/// Block-based delay line over a multi-channel ring.
///
/// ```text
/// Unconfigured ──configure()──► Configured ──configure()──► Configured
///                                                          (fresh ring)
/// ```
#[derive(Debug, Default)]
pub struct DelayEngine {
    state: Option<Configured>,
}

impl DelayEngine {
    /// An unconfigured engine. Nothing is allocated until
    /// [`configure()`](Self::configure).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the ring and output block for `config`.
    ///
    /// Calling this again discards all stored audio. If `config` is invalid
    /// the engine keeps its previous state.
    pub fn configure(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;

        let ring = RingStore::new(config.channel_count, config.capacity()?)?
            .with_crossfade(config.crossfade.to_crossfade(config.sample_rate));
        let delayed = vec![vec![0.0; config.max_block_size]; config.channel_count];

        self.state = Some(Configured {
            config,
            ring,
            delayed,
            delay_seconds: 0.0,
            delay_samples: 0,
        });

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    pub fn config(&self) -> Option<&EngineConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.ring.capacity())
    }

    pub fn write_cursor(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.ring.write_cursor())
    }

    /// Delay time in seconds currently applied, after clamping.
    pub fn delay_time(&self) -> f32 {
        self.state.as_ref().map_or(0.0, |s| s.delay_seconds)
    }

    /// [`delay_time()`](Self::delay_time) in whole samples.
    pub fn delay_samples(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.delay_samples)
    }

    /// Store a delay time for
    /// [`process_with_stored_delay()`](Self::process_with_stored_delay),
    /// clamped to `[0, max_delay_seconds]`.
    ///
    /// The new value takes effect at the next block boundary as a jump.
    /// Smoothing delay changes is left to the caller.
    pub fn set_delay_time(&mut self, seconds: f32) -> Result<()> {
        let state = self.state.as_mut().ok_or(DelayError::NotConfigured)?;
        state.apply_delay(seconds);
        Ok(())
    }

    /// Swap the crossfade without touching stored audio.
    pub fn set_crossfade(&mut self, crossfade: CrossfadeConfig) -> Result<()> {
        let state = self.state.as_mut().ok_or(DelayError::NotConfigured)?;
        state
            .ring
            .set_crossfade(crossfade.to_crossfade(state.config.sample_rate));
        state.config.crossfade = crossfade;
        Ok(())
    }

    /// Silence the ring and rewind the cursor, keeping the allocation.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.ring.clear();
        }
    }

    /// Push one block of channel-major `input` through the delay and return
    /// the delayed block, same shape as the input.
    ///
    /// Nothing is modified if the call fails.
    ///
    /// # Errors
    /// * [`DelayError::NotConfigured`] before [`configure()`](Self::configure).
    /// * [`DelayError::ChannelOutOfRange`] for more channels than configured.
    /// * [`DelayError::BlockTooLarge`] for blocks over `max_block_size`.
    /// * [`DelayError::InvalidLength`] if the channels differ in length.
    pub fn process<S: AsRef<[f32]>>(
        &mut self,
        input: &[S],
        delay_time_seconds: f32,
    ) -> Result<DelayedBlock<'_>> {
        let state = self.state.as_mut().ok_or(DelayError::NotConfigured)?;
        state.apply_delay(delay_time_seconds);
        state.process(input)
    }

    /// [`process()`](Self::process) with the delay time from
    /// [`set_delay_time()`](Self::set_delay_time).
    pub fn process_with_stored_delay<S: AsRef<[f32]>>(
        &mut self,
        input: &[S],
    ) -> Result<DelayedBlock<'_>> {
        let state = self.state.as_mut().ok_or(DelayError::NotConfigured)?;
        state.process(input)
    }
}

impl Configured {
    fn apply_delay(&mut self, seconds: f32) {
        // `clamp` passes NaN through.
        let seconds = if seconds.is_nan() {
            0.0
        } else {
            seconds.clamp(0.0, self.config.max_delay_seconds)
        };
        let samples = (seconds * self.config.sample_rate).round() as usize;

        self.delay_seconds = seconds;
        self.delay_samples = samples.min(self.ring.capacity() - 1);
    }

    fn process<S: AsRef<[f32]>>(&mut self, input: &[S]) -> Result<DelayedBlock<'_>> {
        let len = self.validate_block(input)?;

        let capacity = self.ring.capacity();
        let delay = self.delay_samples;
        let read_cursor = (self.ring.write_cursor() + capacity - delay) % capacity;
        let from_ring = delay.min(len);

        for (channel, samples) in input.iter().enumerate() {
            let samples = samples.as_ref();
            let out = &mut self.delayed[channel][..len];

            // History older than this block comes from the ring, and must be
            // read before the write below can land on it.
            self.ring.read(channel, &mut out[..from_ring], read_cursor)?;
            out[from_ring..].copy_from_slice(&samples[..len - from_ring]);

            self.ring.write(channel, samples)?;
        }

        self.ring.advance_write_cursor(len);

        Ok(DelayedBlock {
            channels: &self.delayed[..input.len()],
            len,
        })
    }

    /// Returns the common block length.
    fn validate_block<S: AsRef<[f32]>>(&self, input: &[S]) -> Result<usize> {
        let channels = self.config.channel_count;
        if input.len() > channels {
            return Err(DelayError::ChannelOutOfRange {
                channel: input.len() - 1,
                channels,
            });
        }

        let len = input.first().map_or(0, |c| c.as_ref().len());
        if len > self.config.max_block_size {
            return Err(DelayError::BlockTooLarge {
                len,
                max: self.config.max_block_size,
            });
        }
        if let Some(ragged) = input.iter().find(|c| c.as_ref().len() != len) {
            return Err(DelayError::InvalidLength {
                len: ragged.as_ref().len(),
                capacity: self.ring.capacity(),
            });
        }

        Ok(len)
    }
}

/// The delayed audio produced by one [`DelayEngine::process()`] call.
///
/// Borrows the engine's preallocated output, so it has to be consumed
/// before the next block is processed.
#[derive(Debug, Clone, Copy)]
pub struct DelayedBlock<'a> {
    channels: &'a [Vec<f32>],
    len: usize,
}

impl<'a> DelayedBlock<'a> {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn channel(&self, index: usize) -> Option<&'a [f32]> {
        self.channels.get(index).map(|c| &c[..self.len])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [f32]> {
        let len = self.len;
        let channels = self.channels;
        channels.iter().map(move |c| &c[..len])
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Engine with the wrap ramp disabled so every sample is exact.
    fn exact_engine(sample_rate: f32, block: usize, max_delay: f32, channels: usize) -> DelayEngine {
        let mut engine = DelayEngine::new();
        engine
            .configure(
                EngineConfig::new(sample_rate, block, max_delay, channels)
                    .with_crossfade(CrossfadeConfig::off()),
            )
            .unwrap();
        engine
    }

    fn run_one(engine: &mut DelayEngine, input: &[Vec<f32>], delay: f32) -> Vec<Vec<f32>> {
        let block = engine.process(input, delay).unwrap();
        block.iter().map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_capacity_for_reference_configuration() {
        let config = EngineConfig::new(44100.0, 512, 2.0, 2);
        assert_eq!(config.capacity(), Ok(88712));

        let mut engine = DelayEngine::new();
        engine.configure(config).unwrap();
        assert_eq!(engine.capacity(), Some(88712));
        assert_eq!(engine.write_cursor(), Some(0));
    }

    /// The ring always holds a full block on top of the longest delay.
    #[test]
    fn test_capacity_margin() {
        for (rate, block, delay) in [(44100.0, 512, 2.0), (48000.0, 64, 0.01), (96000.0, 4096, 1.337)] {
            let config = EngineConfig::new(rate, block, delay, 1);
            let history = (rate * delay).ceil() as usize;
            assert!(config.capacity().unwrap() >= block + history);
        }
    }

    #[test]
    fn test_invalid_configurations() {
        let cases = [
            EngineConfig::new(0.0, 512, 2.0, 2),
            EngineConfig::new(-44100.0, 512, 2.0, 2),
            EngineConfig::new(f32::NAN, 512, 2.0, 2),
            EngineConfig::new(44100.0, 0, 2.0, 2),
            EngineConfig::new(44100.0, 512, 0.0, 2),
            EngineConfig::new(44100.0, 512, -1.0, 2),
            EngineConfig::new(44100.0, 512, 2.0, 0),
        ];

        for config in cases {
            let mut engine = DelayEngine::new();
            assert!(
                matches!(
                    engine.configure(config),
                    Err(DelayError::InvalidConfiguration { .. })
                ),
                "{config:?} should be rejected"
            );
            assert!(!engine.is_configured());
        }
    }

    /// Sizes that overflow the history computation or the ring limit are
    /// configuration errors, not panics or allocation aborts.
    #[test]
    fn test_oversized_configuration_is_rejected() {
        let cases = [
            EngineConfig::new(f32::MAX, 512, 2.0, 1),
            EngineConfig::new(44100.0, 512, f32::MAX, 1),
            EngineConfig::new(1e9, 512, 1e9, 1),
            EngineConfig::new(44100.0, usize::MAX, 2.0, 1),
            EngineConfig::new(44100.0, MAX_CAPACITY, 2.0, 1),
        ];

        for config in cases {
            assert!(
                matches!(config.capacity(), Err(DelayError::InvalidConfiguration { .. })),
                "{config:?} capacity should be rejected"
            );

            let mut engine = DelayEngine::new();
            assert!(
                matches!(
                    engine.configure(config),
                    Err(DelayError::InvalidConfiguration { .. })
                ),
                "{config:?} should be rejected"
            );
            assert!(!engine.is_configured());
        }
    }

    /// A rejected reconfigure leaves the running engine alone.
    #[test]
    fn test_failed_reconfigure_keeps_previous_state() {
        let mut engine = exact_engine(1000.0, 4, 0.01, 1);
        engine.process(&[vec![1.0; 4]], 0.0).unwrap();

        assert!(engine.configure(EngineConfig::new(0.0, 4, 0.01, 1)).is_err());

        assert!(engine.is_configured());
        assert_eq!(engine.capacity(), Some(14));
        assert_eq!(engine.write_cursor(), Some(4));
    }

    #[test]
    fn test_process_before_configure() {
        let mut engine = DelayEngine::new();
        let input = [vec![0.0_f32; 8]];

        assert_eq!(
            engine.process(&input, 0.1).unwrap_err(),
            DelayError::NotConfigured
        );
        assert_eq!(
            engine.set_delay_time(0.1).unwrap_err(),
            DelayError::NotConfigured
        );
    }

    #[test]
    fn test_block_too_large() {
        let mut engine = exact_engine(1000.0, 8, 0.1, 1);

        let err = engine.process(&[vec![0.0; 9]], 0.0).unwrap_err();

        assert_eq!(err, DelayError::BlockTooLarge { len: 9, max: 8 });
        assert_eq!(engine.write_cursor(), Some(0));
    }

    #[test]
    fn test_too_many_channels() {
        let mut engine = exact_engine(1000.0, 8, 0.1, 2);
        let input = vec![vec![0.0_f32; 4]; 3];

        assert!(matches!(
            engine.process(&input, 0.0),
            Err(DelayError::ChannelOutOfRange { channel: 2, channels: 2 })
        ));
    }

    /// Ragged channels are rejected before anything is written.
    #[test]
    fn test_ragged_channels() {
        let mut engine = exact_engine(1000.0, 8, 0.1, 2);
        let input = [vec![1.0_f32; 4], vec![1.0_f32; 3]];

        assert!(matches!(
            engine.process(&input, 0.0),
            Err(DelayError::InvalidLength { len: 3, .. })
        ));
        assert_eq!(engine.write_cursor(), Some(0));
    }

    /// With zero delay the output is the block that was just written.
    #[test]
    fn test_zero_delay_is_pass_through() {
        let mut engine = DelayEngine::new();
        engine
            .configure(EngineConfig::new(44100.0, 256, 0.5, 2))
            .unwrap();

        for n in 0..200 {
            let left: Vec<f32> = (0..256)
                .map(|i| ((n * 256 + i) as f32 * 0.05).sin())
                .collect();
            let right: Vec<f32> = left.iter().map(|s| -0.5 * s).collect();
            let input = [left, right];

            let block = engine.process(&input, 0.0).unwrap();

            assert_eq!(block.channel(0).unwrap(), input[0].as_slice());
            assert_eq!(block.channel(1).unwrap(), input[1].as_slice());
        }
    }

    /// An impulse comes back exactly `round(d * sample_rate)` samples later,
    /// for delays shorter than, equal to and longer than a block.
    #[test]
    fn test_impulse_delay_accuracy() {
        let sample_rate = 1000.0;
        let block = 16;

        for delay in [0.0, 0.003, 0.016, 0.0374, 0.1, 0.25] {
            let mut engine = exact_engine(sample_rate, block, 0.25, 1);
            let expected = (delay * sample_rate).round() as usize;

            let impulse_at = 5;
            let mut output = Vec::new();
            for n in 0..30 {
                let mut input = vec![0.0_f32; block];
                if n == 0 {
                    input[impulse_at] = 1.0;
                }
                let out = run_one(&mut engine, &[input], delay);
                output.extend_from_slice(&out[0]);
            }

            let found = output.iter().position(|s| *s != 0.0);
            assert_eq!(found, Some(impulse_at + expected), "delay {delay}");
            assert_eq!(output[impulse_at + expected], 1.0);
            assert_eq!(engine.delay_samples(), expected);
        }
    }

    /// The impulse still arrives on time when it crosses the end of the
    /// ring.
    #[test]
    fn test_impulse_across_wrap() {
        // capacity = 100 + 10 = 110
        let mut engine = exact_engine(1000.0, 10, 0.1, 1);
        let delay = 0.1;

        // Leave the cursor 5 samples before the end so the impulse block is
        // split, and the impulse itself lands at index 0.
        engine.process(&[vec![0.0; 5]], delay).unwrap();
        for _ in 0..10 {
            engine.process(&[vec![0.0; 10]], delay).unwrap();
        }
        assert_eq!(engine.write_cursor(), Some(105));

        let mut first = vec![0.0_f32; 10];
        first[5] = 1.0;
        let mut output = Vec::new();
        for n in 0..12 {
            let input = if n == 0 { first.clone() } else { vec![0.0; 10] };
            let out = run_one(&mut engine, &[input], delay);
            output.extend_from_slice(&out[0]);
        }

        assert_eq!(output.iter().position(|s| *s != 0.0), Some(5 + 100));
    }

    #[test]
    fn test_cursor_advances_by_block_length() {
        let mut engine = exact_engine(1000.0, 32, 0.05, 2);
        let capacity = engine.capacity().unwrap();
        let mut expected = 0;

        for b in [32, 1, 17, 32, 0, 31, 32, 32, 5] {
            let input = vec![vec![0.25_f32; b]; 2];
            engine.process(&input, 0.02).unwrap();
            expected = (expected + b) % capacity;
            assert_eq!(engine.write_cursor(), Some(expected));
        }
    }

    /// 44.1 kHz, 512-sample blocks, 2 s: the cursor first wraps on the
    /// 174th block and lands on 376.
    #[test]
    fn test_reference_wrap_point() {
        let mut engine = DelayEngine::new();
        engine
            .configure(EngineConfig::new(44100.0, 512, 2.0, 2))
            .unwrap();
        let silence = vec![vec![0.0_f32; 512]; 2];

        for _ in 0..173 {
            engine.process(&silence, 0.5).unwrap();
        }
        assert_eq!(engine.write_cursor(), Some(88576));

        engine.process(&silence, 0.5).unwrap();
        assert_eq!(engine.write_cursor(), Some(376));
    }

    #[test]
    fn test_delay_time_is_clamped() {
        let mut engine = exact_engine(1000.0, 8, 0.5, 1);

        engine.set_delay_time(3.0).unwrap();
        assert_relative_eq!(engine.delay_time(), 0.5);
        assert_eq!(engine.delay_samples(), 500);

        engine.set_delay_time(-1.0).unwrap();
        assert_relative_eq!(engine.delay_time(), 0.0);
        assert_eq!(engine.delay_samples(), 0);

        engine.set_delay_time(f32::NAN).unwrap();
        assert_eq!(engine.delay_samples(), 0);

        engine.process(&[vec![0.0; 8]], 0.1234).unwrap();
        assert_relative_eq!(engine.delay_time(), 0.1234);
        assert_eq!(engine.delay_samples(), 123);
    }

    #[test]
    fn test_stored_delay_is_used() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 1);
        engine.set_delay_time(0.002).unwrap();

        let out = engine
            .process_with_stored_delay(&[vec![1.0, 2.0, 3.0, 4.0]])
            .unwrap();

        assert_eq!(out.channel(0).unwrap(), &[0.0, 0.0, 1.0, 2.0]);
    }

    /// A delay longer than the block reads back the previous blocks.
    #[test]
    fn test_block_sequence_echo() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 2);
        let delay = 0.006;

        let a = [vec![1.0, 2.0, 3.0, 4.0], vec![-1.0, -2.0, -3.0, -4.0]];
        let b = [vec![5.0, 6.0, 7.0, 8.0], vec![-5.0, -6.0, -7.0, -8.0]];
        let c = [vec![0.0; 4], vec![0.0; 4]];

        assert_eq!(run_one(&mut engine, &a, delay)[0], vec![0.0; 4]);
        assert_eq!(run_one(&mut engine, &b, delay)[0], vec![0.0, 0.0, 1.0, 2.0]);
        let out = run_one(&mut engine, &c, delay);
        assert_eq!(out[0], vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(out[1], vec![-3.0, -4.0, -5.0, -6.0]);
    }

    /// Fewer input channels than configured only touches those channels.
    #[test]
    fn test_mono_input_on_stereo_engine() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 2);

        let block = engine.process(&[vec![1.0; 4]], 0.0).unwrap();

        assert_eq!(block.num_channels(), 1);
        assert_eq!(block.len(), 4);
        assert!(block.channel(1).is_none());
    }

    #[test]
    fn test_reconfigure_discards_audio() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 1);
        engine.process(&[vec![1.0; 4]], 0.004).unwrap();

        engine
            .configure(EngineConfig::new(1000.0, 4, 0.1, 1).with_crossfade(CrossfadeConfig::off()))
            .unwrap();

        assert_eq!(engine.write_cursor(), Some(0));
        let out = run_one(&mut engine, &[vec![0.0; 4]], 0.004);
        assert_eq!(out[0], vec![0.0; 4]);
    }

    #[test]
    fn test_reset_silences_history() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 1);
        engine.process(&[vec![1.0; 4]], 0.004).unwrap();

        engine.reset();

        assert_eq!(engine.write_cursor(), Some(0));
        let out = run_one(&mut engine, &[vec![0.0; 4]], 0.004);
        assert_eq!(out[0], vec![0.0; 4]);
    }

    /// With the default ramp, audio that crossed the end of the ring comes
    /// back attenuated at the start of the head segment only.
    #[test]
    fn test_default_ramp_only_touches_wrapped_segment() {
        // capacity = 20 + 10 = 30, ramp = 3 ms = 3 samples
        let mut engine = DelayEngine::new();
        engine
            .configure(EngineConfig::new(1000.0, 10, 0.02, 1))
            .unwrap();
        let delay = 0.02;
        let ones = vec![1.0_f32; 10];

        let mut output = Vec::new();
        for _ in 0..6 {
            output.extend_from_slice(&run_one(&mut engine, &[ones.clone()], delay)[0]);
        }

        // Block 2 ends exactly at the end of the ring and block 3 starts at
        // 0, so nothing is split. Everything echoes back at unity.
        assert_eq!(&output[20..], &[1.0; 40]);

        // Shift the cursor by 5 so the next block straddles the end.
        let mut engine = DelayEngine::new();
        engine
            .configure(EngineConfig::new(1000.0, 10, 0.02, 1))
            .unwrap();
        engine.process(&[vec![0.0; 5]], delay).unwrap();
        for _ in 0..2 {
            engine.process(&[ones.clone()], delay).unwrap();
        }
        assert_eq!(engine.write_cursor(), Some(25));
        // Written at 25..30 (exact) and 0..5 (ramped from 0.1).
        engine.process(&[ones.clone()], delay).unwrap();

        let mut output = Vec::new();
        for _ in 0..3 {
            output.extend_from_slice(&run_one(&mut engine, &[vec![0.0; 10]], delay)[0]);
        }
        // That block comes back 20 samples later, i.e. at 10..20 here.
        assert_eq!(&output[10..15], &[1.0; 5]);
        assert_abs_diff_eq!(output[15], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(output[16], 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(output[17], 0.7, epsilon = 1e-6);
        assert_eq!(&output[18..20], &[1.0, 1.0]);
    }

    #[test]
    fn test_set_crossfade_keeps_audio() {
        let mut engine = exact_engine(1000.0, 4, 0.1, 1);
        engine.process(&[vec![1.0, 2.0, 3.0, 4.0]], 0.004).unwrap();

        engine.set_crossfade(CrossfadeConfig::default()).unwrap();

        let out = run_one(&mut engine, &[vec![0.0; 4]], 0.004);
        assert_eq!(out[0], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            engine.config().unwrap().crossfade.mode,
            RampMode::WrapBoundary
        );
    }
}
