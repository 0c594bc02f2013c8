//! Spawn planning: population cap, side choice and the safe-distance rule.

use bevy::prelude::*;
use rand::Rng;

use crate::common::rng::draw_inclusive;
use crate::common::tunables::{AdversaryTunables, KindTunables, SpawnTunables};
use crate::plugins::clock::TaskHandle;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdversaryKind {
    Grunt,
    Brute,
}

impl AdversaryKind {
    pub fn stats(self, cfg: &AdversaryTunables) -> KindTunables {
        match self {
            Self::Grunt => cfg.grunt,
            Self::Brute => cfg.brute,
        }
    }

    /// Weighted pick between the kinds.
    pub fn pick(cfg: &AdversaryTunables, rng: &mut impl Rng) -> Self {
        let total = cfg.grunt.weight + cfg.brute.weight;
        if total == 0 || rng.gen_range(0..total) < cfg.grunt.weight {
            Self::Grunt
        } else {
            Self::Brute
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub x: f32,
    pub kind: AdversaryKind,
}

/// Owns the repeating `SpawnWave` handle for the current run.
#[derive(Resource, Debug, Default)]
pub struct SpawnerState {
    pub wave: Option<TaskHandle>,
}

pub struct SpawnPolicy<'a> {
    pub spawn: &'a SpawnTunables,
    pub kinds: &'a AdversaryTunables,
}

impl SpawnPolicy<'_> {
    /// Where the next adversary goes, or `None` at the population cap.
    ///
    /// Samples a uniformly chosen half of the world until a point clears the
    /// safe distance. After `max_attempts` misses it takes the point of that
    /// half farthest from the avatar.
    pub fn plan(&self, active: usize, avatar_x: f32, rng: &mut impl Rng) -> Option<SpawnPlan> {
        if active >= self.spawn.cap {
            return None;
        }
        let half = if rng.gen_bool(0.5) { &self.spawn.left } else { &self.spawn.right };

        let sampled = (0..self.spawn.max_attempts)
            .map(|_| draw_inclusive(half, rng))
            .find(|x| (x - avatar_x).abs() >= self.spawn.safe_distance);

        let x = sampled.unwrap_or_else(|| {
            let (lo, hi) = (*half.start(), *half.end());
            let x = if (lo - avatar_x).abs() >= (hi - avatar_x).abs() { lo } else { hi };
            debug!("spawn sampling exhausted, falling back to x {x}");
            x
        });

        Some(SpawnPlan { x, kind: AdversaryKind::pick(self.kinds, rng) })
    }
}
