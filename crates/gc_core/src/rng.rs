//! Deterministic, per-subsystem-seeded randomness (spec.md §6 `random_seed`).
//! Grounded on the teacher's `systems::DeterministicRng`: split one root
//! seed into independent per-subsystem streams so adding a second
//! randomized subsystem later doesn't perturb this one's draw sequence.

use rand::rngs::StdRng;
use rand::SeedableRng;

const GOLDEN_RATIO: u64 = 0x9e3779b9;

pub struct DeterministicRng {
    pub ai_rng: StdRng,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        DeterministicRng {
            ai_rng: StdRng::seed_from_u64(seed.wrapping_mul(GOLDEN_RATIO).wrapping_add(0)),
        }
    }
}
