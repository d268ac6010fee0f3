//! # Ring Delay: A Block-Based Circular-Buffer Delay (AU/VST3/CLAP)
//!
//! A delay effect whose core is a multi-channel ring buffer written and read
//! a whole block at a time. Built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug); AUv2 comes from the
//! CLAP build through `clap-wrapper`.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬──────────────────────────────────────── × (1 - mix) ───┐
//!         │                                                        │
//!         │    ┌──────────────────────────────────────────┐        │
//!         └───►│ DelayEngine                              │        │
//!              │   read block from ring (delay behind)    │        │
//!              │   write input block into ring            │        │
//!              │   advance write cursor once              │        │
//!              └──────────────────────┬───────────────────┘        │
//!                                     │                            │
//!                                     └──── × mix ───────────────►(+)──► Output
//! ```
//!
//! There is no feedback path: each input sample is heard once dry and once
//! as an echo.
//!
//! The engine itself ([`DelayEngine`]) has no dependency on the plugin and
//! can be driven by any host that calls `configure()` once and `process()`
//! once per block.

pub mod dsp;
pub mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;
use params::{PluginParams, MAX_DELAY_MS};

pub use dsp::crossfade::{Crossfade, RampMode};
pub use dsp::delay_engine::{CrossfadeConfig, DelayEngine, DelayedBlock, EngineConfig};
pub use dsp::ring_store::RingStore;
pub use error::DelayError;

/// The plugin: parameters shared with the host, plus the engine owned by
/// the audio thread.
struct RingDelay {
    params: Arc<PluginParams>,

    /// Configured in `initialize()`, which nih-plug never runs concurrently
    /// with `process()`.
    engine: DelayEngine,
}

impl Default for RingDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            engine: DelayEngine::new(),
        }
    }
}

impl Plugin for RingDelay {
    const NAME: &'static str = "Ring Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first, since most DAW tracks are stereo; mono as a fallback.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // The delay time is read once per block.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the ring for the host's sample rate and largest block.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        let config = EngineConfig::new(
            buffer_config.sample_rate,
            buffer_config.max_buffer_size as usize,
            MAX_DELAY_MS / 1000.0,
            num_channels,
        );

        match self.engine.configure(config) {
            Ok(()) => {
                nih_log!(
                    "delay ring: {} samples x {} channels at {} Hz",
                    self.engine.capacity().unwrap_or_default(),
                    num_channels,
                    buffer_config.sample_rate
                );
                true
            }
            Err(err) => {
                nih_error!("cannot configure delay engine: {err}");
                false
            }
        }
    }

    /// Playback stopped: drop stored echoes so they don't come back on the
    /// next play.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One delay time per block. See `params.rs` for why it isn't
        // smoothed.
        let delay_seconds = self.params.delay_seconds();

        let delayed = match self.engine.process(buffer.as_slice_immutable(), delay_seconds) {
            Ok(delayed) => delayed,
            Err(err) => {
                // Never pass on half-processed audio.
                for channel in buffer.as_slice() {
                    channel.fill(0.0);
                }
                return ProcessStatus::Error(err.as_static_str());
            }
        };

        for (sample_idx, mut channel_samples) in buffer.iter_samples().enumerate() {
            let mix = self.params.mix.smoothed.next();

            for (channel_idx, sample) in channel_samples.iter_mut().enumerate() {
                let Some(wet) = delayed.channel(channel_idx) else {
                    continue;
                };
                *sample = mix_sample(*sample, wet[sample_idx], mix);
            }
        }

        // Without feedback the tail is exactly one delay period.
        ProcessStatus::Tail(self.engine.delay_samples() as u32)
    }
}

/// Linear dry/wet blend: `mix = 0` is dry only, `mix = 1` is wet only.
fn mix_sample(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

impl ClapPlugin for RingDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.ring-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A block-based circular-buffer delay with click-free buffer wrap");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for RingDelay {
    // `*b"..."` turns the 16-character ASCII literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssRingDelay01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(RingDelay);
nih_export_vst3!(RingDelay);

// AUv2 entry point for Logic Pro, generated from the CLAP export.
clap_wrapper::export_auv2!();
