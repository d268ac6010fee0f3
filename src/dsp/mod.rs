//! # DSP Building Blocks
//!
//! - **`crossfade`**: the gain ramp applied to freshly written samples so
//!   overwriting the ring doesn't leave an audible step.
//! - **`ring_store`**: fixed-capacity multi-channel circular storage with
//!   wrap-split block reads and writes.
//! - **`delay_engine`**: sizes a ring for a sample rate and maximum delay,
//!   and turns each input block into its delayed counterpart.

pub mod crossfade;
pub mod delay_engine;
pub mod ring_store;
