//! Deterministic PRNG used for level generation.
//!
//! A 31-bit linear congruential generator: the same seed always yields the
//! same sequence of draws, which is what makes levels reproducible and lets
//! the server re-derive a level from (index, seed) during re-validation.
//! Deliberately not backed by an external RNG crate, whose stream could shift
//! between versions.

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LCG_MASK: u64 = 0x7FFF_FFFF;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            state: seed & LCG_MASK,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Next draw in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT))
            & LCG_MASK;
        self.state as f64 / (LCG_MASK + 1) as f64
    }

    /// Next integer in [min, max], inclusive on both ends.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if min > max {
            return min;
        }
        min + (self.next_f64() * (max - min + 1) as f64) as i64
    }

    /// In-place Fisher-Yates shuffle driven by `next_int`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Uniform pick. `None` on an empty slice rather than a panic.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_int(0, items.len() as i64 - 1) as usize;
        Some(&items[idx])
    }
}
