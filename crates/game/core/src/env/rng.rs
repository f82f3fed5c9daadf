//! RNG oracle for deterministic random number generation.
//!
//! Every roll in the resolution pipeline (parry, auto-counter, loot chance) is
//! derived from the field seed, a per-field nonce and the rolling agent, so a
//! replay with the same seed and inputs resolves identically.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn random(&self, seed: u64) -> f64 {
        self.next_u32(seed) as f64 / (u32::MAX as f64 + 1.0)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Roll purpose, mixed into the seed so one resolution can roll several
/// independent values for the same agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RollContext {
    Parry = 0,
    Counter = 1,
    Loot = 2,
}

/// Compute deterministic seed from field state components.
///
/// * `field_seed` - Base seed set when the field is created
/// * `nonce` - Roll sequence number (increments each roll)
/// * `agent_index` - Arena index of the rolling agent
/// * `context` - Purpose of the roll
pub fn compute_seed(field_seed: u64, nonce: u64, agent_index: u32, context: RollContext) -> u64 {
    // SplitMix64 / FxHash style combiners
    let mut hash = field_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (agent_index as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u32 as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
