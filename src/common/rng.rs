//! Seedable randomness shared by every gameplay draw.

use bevy::prelude::*;
use std::ops::RangeInclusive;

use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Resource, Debug, Clone)]
pub struct GameRng(ChaCha8Rng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

/// Uniform draw over `range`; an inverted range yields its start instead of panicking.
pub fn draw_inclusive<T>(range: &RangeInclusive<T>, rng: &mut impl Rng) -> T
where
    T: SampleUniform + PartialOrd + Copy,
{
    if range.start() > range.end() {
        return *range.start();
    }
    rng.gen_range(range.clone())
}
