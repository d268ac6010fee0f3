//! # Ring Store (Multi-Channel Circular Buffer)
//!
//! The ring store is the tape loop behind the delay: one fixed-size array
//! per channel and a single write cursor shared by all of them.
//!
//! ## Block-Based Writing
//!
//! Samples arrive a block at a time (typically 64-1024 samples), not one by
//! one. A block that fits before the end of the ring is one contiguous copy.
//! A block that doesn't is split in two:
//!
//! ```text
//!   ┌────────┬──────────────────┬──────────┐
//!   │  head  │      older       │   tail   │
//!   └────────┴──────────────────┴──────────┘
//!   0                           ▲          capacity
//!                          write_cursor
//!
//!   tail = capacity - write_cursor
//!   head = count - tail
//! ```
//!
//! Reads use exactly the same split, starting from any cursor the caller
//! chooses.
//!
//! ## One Cursor, Advanced Once Per Block
//!
//! [`write()`](RingStore::write) never moves the cursor. The caller writes
//! every channel of a block and then calls
//! [`advance_write_cursor()`](RingStore::advance_write_cursor) once, so all
//! channels land at the same position and stay phase-aligned.

use super::crossfade::{Crossfade, RampMode};
use crate::error::{DelayError, Result};

/// Largest ring, in samples per channel, that [`RingStore::configure()`]
/// will try to allocate (16 GiB of `f32` per channel).
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Fixed-capacity, multi-channel sample storage.
///
/// All memory is allocated in [`new()`](Self::new) or
/// [`configure()`](Self::configure). Reading, writing and advancing never
/// allocate.
#[derive(Debug, Clone)]
pub struct RingStore {
    /// One array of `capacity` samples per channel, zero at start.
    channels: Vec<Box<[f32]>>,

    capacity: usize,

    /// Where the next block is written. Always in `[0, capacity)`.
    write_cursor: usize,

    crossfade: Crossfade,
}

impl RingStore {
    /// Allocate a zeroed ring of `capacity` samples for each of
    /// `channel_count` channels.
    ///
    /// The store starts with [`Crossfade::off()`]; use
    /// [`with_crossfade()`](Self::with_crossfade) to ramp writes.
    pub fn new(channel_count: usize, capacity: usize) -> Result<Self> {
        let mut store = Self {
            channels: Vec::new(),
            capacity: 0,
            write_cursor: 0,
            crossfade: Crossfade::off(),
        };
        store.configure(channel_count, capacity)?;
        Ok(store)
    }

    /// Builder-style variant of [`set_crossfade()`](Self::set_crossfade).
    pub fn with_crossfade(mut self, crossfade: Crossfade) -> Self {
        self.crossfade = crossfade;
        self
    }

    /// Discard everything and reallocate. Old audio is gone afterwards and
    /// the cursor is back at 0.
    ///
    /// On error the store is left exactly as it was, including when the
    /// allocation itself fails.
    pub fn configure(&mut self, channel_count: usize, capacity: usize) -> Result<()> {
        if channel_count == 0 {
            return Err(DelayError::config("channel count must be at least 1"));
        }
        if capacity == 0 {
            return Err(DelayError::config("ring capacity must be at least 1 sample"));
        }
        if capacity > MAX_CAPACITY {
            return Err(DelayError::config(format!(
                "ring capacity of {capacity} samples exceeds the limit of {MAX_CAPACITY}"
            )));
        }

        let alloc_failed = || {
            DelayError::config(format!(
                "cannot allocate {channel_count} channels of {capacity} samples"
            ))
        };
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(channel_count)
            .map_err(|_| alloc_failed())?;
        for _ in 0..channel_count {
            let mut storage: Vec<f32> = Vec::new();
            storage
                .try_reserve_exact(capacity)
                .map_err(|_| alloc_failed())?;
            storage.resize(capacity, 0.0);
            channels.push(storage.into_boxed_slice());
        }

        self.channels = channels;
        self.capacity = capacity;
        self.write_cursor = 0;

        Ok(())
    }

    /// Replace the ramp used by subsequent writes. Doesn't allocate, so it
    /// is safe to call between blocks.
    pub fn set_crossfade(&mut self, crossfade: Crossfade) {
        self.crossfade = crossfade;
    }

    pub fn crossfade(&self) -> &Crossfade {
        &self.crossfade
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Write `source` into `channel` starting at the write cursor.
    ///
    /// The cursor is *not* advanced; see
    /// [`advance_write_cursor()`](Self::advance_write_cursor).
    ///
    /// # Errors
    /// * [`DelayError::ChannelOutOfRange`] if `channel` doesn't exist.
    /// * [`DelayError::InvalidLength`] if `source` is longer than the ring.
    pub fn write(&mut self, channel: usize, source: &[f32]) -> Result<()> {
        let count = source.len();
        self.check(channel, count)?;

        let capacity = self.capacity;
        let start = self.write_cursor;
        let crossfade = self.crossfade;
        let storage = &mut self.channels[channel];

        if start + count <= capacity {
            let dest = &mut storage[start..start + count];
            match crossfade.mode {
                RampMode::EveryWrite => crossfade.ramp(count).copy(dest, source),
                RampMode::Off | RampMode::WrapBoundary => dest.copy_from_slice(source),
            }
        } else {
            let tail = capacity - start;
            let head = count - tail;
            let (tail_src, head_src) = source.split_at(tail);

            match crossfade.mode {
                RampMode::Off => {
                    storage[start..].copy_from_slice(tail_src);
                    storage[..head].copy_from_slice(head_src);
                }
                RampMode::WrapBoundary => {
                    storage[start..].copy_from_slice(tail_src);
                    crossfade
                        .ramp(head)
                        .copy(&mut storage[..head], head_src);
                }
                RampMode::EveryWrite => {
                    let mut ramp = crossfade.ramp(count);
                    ramp.copy(&mut storage[start..], tail_src);
                    ramp.copy(&mut storage[..head], head_src);
                }
            }
        }

        Ok(())
    }

    /// Fill `destination` with samples from `channel`, starting at
    /// `start_cursor` (taken modulo the capacity).
    ///
    /// Reads never apply a ramp: what comes out is exactly what is stored.
    ///
    /// # Errors
    /// Same as [`write()`](Self::write).
    pub fn read(&self, channel: usize, destination: &mut [f32], start_cursor: usize) -> Result<()> {
        let count = destination.len();
        self.check(channel, count)?;

        let capacity = self.capacity;
        let start = start_cursor % capacity;
        let storage = &self.channels[channel];

        if start + count <= capacity {
            destination.copy_from_slice(&storage[start..start + count]);
        } else {
            let tail = capacity - start;
            let (tail_dst, head_dst) = destination.split_at_mut(tail);
            tail_dst.copy_from_slice(&storage[start..]);
            head_dst.copy_from_slice(&storage[..count - tail]);
        }

        Ok(())
    }

    /// Move the write cursor forward by `count` samples, wrapping at the end
    /// of the ring. Call once per block, after every channel was written.
    pub fn advance_write_cursor(&mut self, count: usize) {
        self.write_cursor = (self.write_cursor + count % self.capacity) % self.capacity;
    }

    /// Zero every channel and move the cursor back to 0 without
    /// reallocating.
    pub fn clear(&mut self) {
        for storage in &mut self.channels {
            storage.fill(0.0);
        }
        self.write_cursor = 0;
    }

    fn check(&self, channel: usize, count: usize) -> Result<()> {
        if channel >= self.channels.len() {
            return Err(DelayError::ChannelOutOfRange {
                channel,
                channels: self.channels.len(),
            });
        }
        if count > self.capacity {
            return Err(DelayError::InvalidLength {
                len: count,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
