// Deterministic, portable pseudo-random number generator.
//
// Implements Mulberry32: a 32-bit counter advanced by a fixed odd constant,
// followed by two xor-shift/multiply avalanche rounds. The output is the
// mixed 32-bit word scaled into [0, 1). This is a hand-rolled implementation
// with zero external dependencies so that every platform produces the same
// stream for the same seed.
//
// This crate is the single source of randomness for the generator: every
// musical decision in `y2k_music` draws from one `SongRng` instance, in a
// fixed order. Higher-level helpers (`chance`, `range_f64`, `pick_weighted`)
// are defined purely in terms of `next_f64`, so each one advances the state
// by a known number of steps.
//
// **Critical constraint: determinism.** The core mixing function must stay
// bit-for-bit identical. Changing the constant, the shift amounts, or the
// scaling breaks every stored seed. The reference values in the tests below
// pin the construction.

use serde::{Deserialize, Serialize};

/// Increment added to the state before each output.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32 as a float, used to scale a `u32` into [0, 1).
const U32_SPAN: f64 = 4_294_967_296.0;

/// Mulberry32 PRNG, the generator's sole source of randomness.
///
/// A song is a pure function of the seed and the resolved configuration, so
/// one `SongRng` is created per generation call and threaded through every
/// stage by `&mut`. Never share an instance between concurrent generations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRng {
    state: u32,
}

impl SongRng {
    /// Create a new PRNG from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Generate the next mixed `u32` in the sequence.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut x = self.state;
        x = (x ^ (x >> 15)).wrapping_mul(x | 1);
        x ^= x.wrapping_add((x ^ (x >> 7)).wrapping_mul(x | 61));
        x ^ (x >> 14)
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Exactly one state step per call.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / U32_SPAN
    }

    /// Return `true` with probability `p`.
    ///
    /// Always consumes one draw, even for `p <= 0.0` or `p >= 1.0`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Linear interpolation between `low` and `high` by one draw.
    ///
    /// Unlike a half-open range helper, `low == high` is allowed and simply
    /// returns `low`.
    pub fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Pick a key from an ordered list of `(key, weight)` pairs.
    ///
    /// Draws `r = next * total`, then walks the list subtracting weights and
    /// returns the first key that brings `r` to zero or below. If floating
    /// error means no key is hit, the last key is returned. List order is
    /// significant: it is both the walk order and the fallback.
    ///
    /// Panics if `items` is empty.
    pub fn pick_weighted<K: Copy>(&mut self, items: &[(K, f64)]) -> K {
        assert!(!items.is_empty(), "pick_weighted: items must not be empty");
        let total: f64 = items.iter().map(|&(_, w)| w).sum();
        let mut r = self.next_f64() * total;
        for &(key, weight) in items {
            r -= weight;
            if r <= 0.0 {
                return key;
            }
        }
        items[items.len() - 1].0
    }
}
