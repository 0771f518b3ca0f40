//! Reservoir sampling of raw rows
//!
//! The sampler keeps at most `k` rows in a slot-addressed buffer. The first
//! `k` rows fill the slots left to right; every later row is admitted with
//! probability `k / rows_seen` and overwrites a slot chosen by a second,
//! independent draw. With `k == 0` every row is kept.
//!
//! The acceptance test divides by the number of rows seen *before* the
//! current one and the slot comes from a separate draw. A given seed always
//! selects the same rows.
//!
//! The generator is xoshiro256++ seeded through SplitMix64, followed by
//! [`WARMUP_DRAWS`] discarded draws. Samples taken with the 48-bit linear
//! congruential generator of `java.util.Random` cannot be reproduced.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::value::RawRow;

/// Number of generator outputs discarded after seeding
pub const WARMUP_DRAWS: usize = 100;

/// Slot-addressed storage for sampled rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    /// Requested capacity; 0 means unbounded
    capacity: usize,

    /// Occupied slots form a prefix while filling, then the full range
    slots: Vec<Option<RawRow>>,
}

impl SampleBuffer {
    /// Create a buffer with exactly `capacity` empty slots, or an empty
    /// growable buffer when `capacity` is 0
    pub fn new(capacity: usize) -> Self {
        let slots = if capacity == 0 {
            Vec::new()
        } else {
            vec![None; capacity]
        };
        Self { capacity, slots }
    }

    /// Get the configured capacity (0 = unbounded)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer grows without bound
    pub fn is_unbounded(&self) -> bool {
        self.capacity == 0
    }

    /// Get the number of addressable slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Get the number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Get the row in a slot
    pub fn get(&self, slot: usize) -> Option<&RawRow> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Iterate over occupied slots in slot order
    pub fn rows(&self) -> impl Iterator<Item = &RawRow> {
        self.slots.iter().flatten()
    }

    /// Consume the buffer, yielding occupied rows in slot order
    pub fn into_rows(self) -> impl Iterator<Item = RawRow> {
        self.slots.into_iter().flatten()
    }

    fn put(&mut self, slot: usize, row: RawRow) {
        self.slots[slot] = Some(row);
    }

    fn push(&mut self, row: RawRow) {
        self.slots.push(Some(row));
    }
}

/// Single-pass reservoir sampler over raw rows
#[derive(Debug, Clone)]
pub struct ReservoirSampler {
    capacity: usize,
    seed: u64,
    rows_seen: u64,
    buffer: SampleBuffer,
    rng: Xoshiro256PlusPlus,
}

impl ReservoirSampler {
    /// Create a sampler with capacity `k` (0 = keep everything) and a seed
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            capacity,
            seed,
            rows_seen: 0,
            buffer: SampleBuffer::new(capacity),
            rng: warmed_rng(seed),
        }
    }

    /// Reset to an empty buffer of `k` slots with a freshly seeded generator
    pub fn configure(&mut self, capacity: usize, seed: u64) {
        debug!(capacity, seed, "configuring reservoir");
        *self = Self::new(capacity, seed);
    }

    /// Get the configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the configured seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the number of rows offered so far
    pub fn rows_seen(&self) -> u64 {
        self.rows_seen
    }

    /// Get the sample buffer
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Take the sample buffer, leaving an empty one of the same capacity
    pub fn take_buffer(&mut self) -> SampleBuffer {
        std::mem::replace(&mut self.buffer, SampleBuffer::new(self.capacity))
    }

    /// Offer the next row of the stream. Rejected rows are dropped.
    pub fn offer(&mut self, row: RawRow) {
        let k = self.capacity;

        if k == 0 {
            self.buffer.push(row);
        } else if self.rows_seen < k as u64 {
            self.buffer.put(self.rows_seen as usize, row);
        } else {
            let r: f64 = self.rng.gen();
            if r < k as f64 / self.rows_seen as f64 {
                let r2: f64 = self.rng.gen();
                let slot = ((k as f64 * r2) as usize).min(k - 1);
                self.buffer.put(slot, row);
            }
        }

        self.rows_seen += 1;
    }
}

fn warmed_rng(seed: u64) -> Xoshiro256PlusPlus {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    for _ in 0..WARMUP_DRAWS {
        let _: f64 = rng.gen();
    }
    rng
}
