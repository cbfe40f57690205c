use rand::{rngs::OsRng, rngs::StdRng, Rng, SeedableRng};

/// Source of uniformly distributed integers.
pub trait RandomSource {
    /// Draw a value from the closed range `[min, max]`.
    ///
    /// The caller must ensure `min <= max`.
    fn next(&mut self, min: i32, max: i32) -> i32;
}

/// Random source backed by the operating system.
///
/// Draws are not predictable across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next(&mut self, min: i32, max: i32) -> i32 {
        OsRng.gen_range(min..=max)
    }
}

/// Seeded random source for reproducible runs.
#[derive(Clone, Debug)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next(&mut self, min: i32, max: i32) -> i32 {
        self.0.gen_range(min..=max)
    }
}
