//! Seedable random number streams.
//!
//! Every stochastic concern of the simulation draws from its own named stream. A stream is seeded
//! from the base seed offset by the hash of its name, so drawing more numbers for one concern
//! (say, a larger branching factor producing more spread draws) never shifts the sequence seen by
//! another (the death coin flips).
mod sampling_algorithms;

use log::trace;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub use sampling_algorithms::sample_multiple_from_known_length;

use crate::hashing::hash_str;

/// Name of the stream used to choose exposure counts and exposed neighbors.
pub const SPREAD_STREAM: &str = "SpreadRng";
/// Name of the stream used for the per-node death coin flip.
pub const OUTCOME_STREAM: &str = "OutcomeRng";

fn seed_stream<R: SeedableRng>(base_seed: u64, name: &str) -> R {
    let seed = base_seed.wrapping_add(hash_str(name));
    trace!("creating new RNG (seed={base_seed}) for stream {name}");
    R::seed_from_u64(seed)
}

/// The random streams owned by one simulation instance.
///
/// Generic over the generator so tests can inject any `Rng`; the simulation uses `SmallRng`.
pub struct RngStreams<R: Rng = SmallRng> {
    spread: R,
    outcome: R,
}

impl<R: Rng + SeedableRng> RngStreams<R> {
    /// Creates both streams from a single base seed.
    #[must_use]
    pub fn from_seed(base_seed: u64) -> Self {
        Self {
            spread: seed_stream(base_seed, SPREAD_STREAM),
            outcome: seed_stream(base_seed, OUTCOME_STREAM),
        }
    }
}

impl<R: Rng> RngStreams<R> {
    /// Uses the given generators as-is.
    pub fn from_rngs(spread: R, outcome: R) -> Self {
        Self { spread, outcome }
    }

    pub fn spread(&mut self) -> &mut R {
        &mut self.spread
    }

    pub fn outcome(&mut self) -> &mut R {
        &mut self.outcome
    }
}
