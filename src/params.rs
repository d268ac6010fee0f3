//! # Plugin Parameters
//!
//! Only two knobs: how far back the echo reaches, and how much of it is
//! mixed in. Each parameter has a unique string ID (`#[id = "..."]`) that
//! the host uses to save and recall presets, so those IDs never change.
//!
//! ## Why the delay time has no smoother
//!
//! The engine takes one delay time per block and jumps straight to it. A
//! smoothed parameter would still be sampled once per block, so it would
//! only turn one jump into a staircase of smaller jumps. Moving the knob
//! while audio plays can click; mix changes are smoothed per sample and
//! never do.

use nih_plug::prelude::*;

/// Longest delay the plugin offers, in milliseconds. The ring is sized from
/// this in `initialize()`.
pub const MAX_DELAY_MS: f32 = 2000.0;

#[derive(Params)]
pub struct PluginParams {
    /// **Delay Time**: distance between the dry signal and its echo.
    ///
    /// Range: 0 ms (echo sits on top of the dry signal) to 2000 ms.
    /// Skewed so the short, slapback end of the range gets more knob travel.
    #[id = "delay"]
    pub delay_time: FloatParam,

    /// **Mix**: 0% dry only, 100% echo only.
    #[id = "mix"]
    pub mix: FloatParam,
}

impl Default for PluginParams {
    fn default() -> Self {
        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                500.0,
                FloatRange::Skewed {
                    min: 0.0,
                    max: MAX_DELAY_MS,
                    factor: FloatRange::skew_factor(-1.0),
                },
            )
            .with_unit(" ms")
            .with_step_size(0.1),

            mix: FloatParam::new("Mix", 0.50, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_smoother(SmoothingStyle::Linear(20.0))
                .with_value_to_string(formatters::v2s_f32_percentage(1))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }
}

impl PluginParams {
    /// Current delay time in seconds, as the engine wants it.
    pub fn delay_seconds(&self) -> f32 {
        self.delay_time.value() / 1000.0
    }
}
