use rand::{rngs::StdRng, Rng, SeedableRng};

/// Construct a deterministic RNG from a fixed seed.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Draw a new seed from OS entropy, for runs that should differ per participant.
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen()
}
