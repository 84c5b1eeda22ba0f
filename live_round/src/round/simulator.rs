//! Random result synthesis for demo builds and the simulated dealer.

use super::models::{MAX_CARDS, MAX_POINTS, MIN_CARDS, RoundResult};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Chance that the first two cards of a side form a pair (8-deck shoe)
const PAIR_PROBABILITY: f64 = 0.0747;

/// Produces plausible random round results.
///
/// Results are shaped like real outcomes (points, pairs, card count) but do
/// not follow third-card rules.
#[derive(Debug)]
pub struct ResultSimulator {
    rng: StdRng,
}

impl Default for ResultSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSimulator {
    /// Create a simulator seeded from the OS
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible simulator
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a random result for `round_id`
    pub fn synthesize(&mut self, round_id: &str) -> RoundResult {
        let player_points = self.rng.random_range(0..=MAX_POINTS);
        let banker_points = self.rng.random_range(0..=MAX_POINTS);
        let card_count = self.rng.random_range(MIN_CARDS..=MAX_CARDS);
        let player_pair = self.rng.random_bool(PAIR_PROBABILITY);
        let banker_pair = self.rng.random_bool(PAIR_PROBABILITY);

        RoundResult::new(round_id, player_points, banker_points, card_count)
            .with_pairs(player_pair, banker_pair)
    }

    /// Draw a placeholder result tagged as degraded
    pub fn synthesize_degraded(&mut self, round_id: &str) -> RoundResult {
        let mut result = self.synthesize(round_id);
        result.degraded = true;
        result
    }
}
