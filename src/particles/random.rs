//! Per-particle xorshift32 stream
//!
//! Every lane carries its own 32-bit state in `ParticleData::random_state`.
//! xorshift32 maps any non-zero state to a non-zero state, so a stream seeded
//! with `index + 1` never reaches the reserved zero value.

use crate::constants::random::{UNIT_FLOAT_SCALE, ZERO_STATE_REPLACEMENT};

/// Advance a state by one xorshift32 step
#[inline]
pub fn advance(state: u32) -> u32 {
    let mut x = if state == 0 { ZERO_STATE_REPLACEMENT } else { state };
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    x
}

/// Advance the state in place and return a float in [0, 1)
#[inline]
pub fn next_unit(state: &mut u32) -> f32 {
    *state = advance(*state);
    (*state >> 8) as f32 * UNIT_FLOAT_SCALE
}

/// Seed for the lane at `index`
#[inline]
pub fn seed_for_index(index: u32) -> u32 {
    index.wrapping_add(1).max(1)
}
