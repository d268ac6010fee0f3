//! # Errors
//!
//! Everything that can go wrong here is a configuration mistake or a broken
//! contract between the host and the engine. There is no I/O and nothing is
//! worth retrying, so every variant is reported once and the caller decides
//! whether to refuse the configuration or silence the block.

use thiserror::Error;

/// Result type alias for delay engine operations.
pub type Result<T> = std::result::Result<T, DelayError>;

/// Errors raised by [`RingStore`](crate::dsp::ring_store::RingStore) and
/// [`DelayEngine`](crate::dsp::delay_engine::DelayEngine).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelayError {
    /// Bad sample rate, block size, delay bound or channel count.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// `process()` was called before a successful `configure()`.
    #[error("delay engine used before it was configured")]
    NotConfigured,

    /// The host passed a longer block than it declared at configure time.
    #[error("block of {len} samples exceeds the configured maximum of {max}")]
    BlockTooLarge { len: usize, max: usize },

    #[error("channel {channel} out of range ({channels} channels configured)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    /// A single transfer longer than one revolution of the ring, or
    /// channels of different lengths within one block.
    #[error("invalid length {len} for a ring of {capacity} samples")]
    InvalidLength { len: usize, capacity: usize },
}

impl DelayError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// A short, static description for hosts that only accept `&'static str`
    /// (nih-plug's `ProcessStatus::Error`).
    pub fn as_static_str(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "invalid delay configuration",
            Self::NotConfigured => "delay engine not configured",
            Self::BlockTooLarge { .. } => "block larger than the configured maximum",
            Self::ChannelOutOfRange { .. } => "channel out of range",
            Self::InvalidLength { .. } => "invalid block length",
        }
    }
}
