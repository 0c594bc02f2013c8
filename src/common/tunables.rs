//! Tunable gameplay constants.
//!
//! Every number the rules depend on lives here so a run can be retuned (or a
//! test can pin values) without touching the systems.

use std::ops::RangeInclusive;
use std::time::Duration;

use bevy::prelude::*;

use crate::common::error::TunablesError;
use crate::plugins::combat::damage::DamageTable;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub world: WorldTunables,
    pub avatar: AvatarTunables,
    pub spells: SpellTunables,
    pub damage: DamageTable,
    pub adversary: AdversaryTunables,
    pub spawn: SpawnTunables,
    pub progression: ProgressionTunables,
}

#[derive(Debug, Clone)]
pub struct WorldTunables {
    pub width: f32,
    /// Height of the walkable surface.
    pub floor_top: f32,
    /// Anything whose feet drop below this y has fallen out of the world.
    pub kill_plane: f32,
    pub wall_height: f32,
    pub gravity: f32,
}

#[derive(Debug, Clone)]
pub struct AvatarTunables {
    pub max_health: i32,
    pub speed: f32,
    pub jump_speed: f32,
    pub gravity_scale: f32,
    pub half_size: Vec2,
    pub spawn_x: f32,
    pub invincibility: Duration,
}

#[derive(Debug, Clone)]
pub struct ProjectileTunables {
    pub speed: f32,
    pub gravity_scale: f32,
    pub time_to_live: Duration,
    pub cooldown: Duration,
    pub muzzle_offset: f32,
    pub radius: f32,
}

#[derive(Debug, Clone)]
pub struct SpellTunables {
    pub avatar: ProjectileTunables,
    pub adversary: ProjectileTunables,
    /// Vertical offsets of a volley, in the order extra projectiles unlock.
    pub volley_offsets: Vec<f32>,
    pub base_volley: usize,
    /// Delay between touching world geometry and destruction. Zero destroys immediately.
    pub world_hit_grace: Duration,
}

impl SpellTunables {
    /// Volley pattern at `level`: one extra projectile per level, capped by the offset table.
    pub fn volley_for_level(&self, level: u32) -> &[f32] {
        let extra = level.saturating_sub(1) as usize;
        let count = self.base_volley.saturating_add(extra).min(self.volley_offsets.len());
        &self.volley_offsets[..count]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KindTunables {
    pub max_health: i32,
    pub chase_factor: f32,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct AdversaryTunables {
    pub near_threshold: f32,
    pub far_threshold: f32,
    pub chase_speed: f32,
    pub half_size: Vec2,
    pub swing: Duration,
    pub region_size: Vec2,
    pub region_offset: f32,
    /// Grounded adversaries jump with probability `1 / jump_odds` per tick.
    pub jump_odds: u32,
    pub jump_impulse: RangeInclusive<f32>,
    /// Idle grounded adversaries cast with probability `1 / spell_odds` per tick.
    pub spell_odds: u32,
    pub experience: u32,
    pub grunt: KindTunables,
    pub brute: KindTunables,
}

#[derive(Debug, Clone)]
pub struct SpawnTunables {
    pub interval: Duration,
    pub cap: usize,
    pub safe_distance: f32,
    pub left: RangeInclusive<f32>,
    pub right: RangeInclusive<f32>,
    pub max_attempts: u32,
    /// Spawn height above the floor top.
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct ProgressionTunables {
    pub first_threshold: u32,
    pub increment: u32,
    pub effect: Duration,
    pub pulse: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            world: WorldTunables {
                width: 2000.0,
                floor_top: 0.0,
                kill_plane: -240.0,
                wall_height: 640.0,
                gravity: 2000.0,
            },
            avatar: AvatarTunables {
                max_health: 100,
                speed: 400.0,
                jump_speed: 800.0,
                gravity_scale: 2.0,
                half_size: Vec2::new(14.0, 30.0),
                spawn_x: 1000.0,
                invincibility: Duration::from_millis(1000),
            },
            spells: SpellTunables {
                avatar: ProjectileTunables {
                    speed: 300.0,
                    gravity_scale: 0.05,
                    time_to_live: Duration::from_millis(3000),
                    cooldown: Duration::from_millis(800),
                    muzzle_offset: 25.0,
                    radius: 8.0,
                },
                adversary: ProjectileTunables {
                    speed: 400.0,
                    gravity_scale: 0.25,
                    time_to_live: Duration::from_millis(1000),
                    cooldown: Duration::from_millis(2000),
                    muzzle_offset: 20.0,
                    radius: 6.0,
                },
                volley_offsets: vec![0.0, 20.0, 30.0, 10.0, 40.0],
                base_volley: 3,
                world_hit_grace: Duration::ZERO,
            },
            damage: DamageTable::default(),
            adversary: AdversaryTunables {
                near_threshold: 30.0,
                far_threshold: 100.0,
                chase_speed: 100.0,
                half_size: Vec2::new(14.0, 30.0),
                swing: Duration::from_millis(1000),
                region_size: Vec2::new(40.0, 20.0),
                region_offset: 20.0,
                jump_odds: 200,
                jump_impulse: 200.0..=800.0,
                spell_odds: 300,
                experience: 1000,
                grunt: KindTunables { max_health: 50, chase_factor: 1.0, weight: 3 },
                brute: KindTunables { max_health: 100, chase_factor: 0.7, weight: 1 },
            },
            spawn: SpawnTunables {
                interval: Duration::from_millis(250),
                cap: 10,
                safe_distance: 100.0,
                left: 100.0..=1000.0,
                right: 1000.0..=1900.0,
                max_attempts: 32,
                height: 40.0,
            },
            progression: ProgressionTunables {
                first_threshold: 2000,
                increment: 5000,
                effect: Duration::from_millis(2000),
                pulse: Duration::from_millis(16),
            },
        }
    }
}

fn non_empty(name: &'static str, range: &RangeInclusive<f32>) -> Result<(), TunablesError> {
    if range.start() > range.end() {
        return Err(TunablesError::EmptyRange { name, start: *range.start(), end: *range.end() });
    }
    Ok(())
}

fn positive(name: &'static str, ok: bool) -> Result<(), TunablesError> {
    if ok { Ok(()) } else { Err(TunablesError::NotPositive(name)) }
}

impl Tunables {
    /// Check the invariants the rules rely on.
    pub fn validate(&self) -> Result<(), TunablesError> {
        self.damage.validate()?;

        positive("avatar max health", self.avatar.max_health > 0)?;
        positive("avatar invincibility", !self.avatar.invincibility.is_zero())?;
        positive("avatar spell cooldown", !self.spells.avatar.cooldown.is_zero())?;
        positive("adversary spell cooldown", !self.spells.adversary.cooldown.is_zero())?;
        positive("avatar spell time-to-live", !self.spells.avatar.time_to_live.is_zero())?;
        positive("adversary spell time-to-live", !self.spells.adversary.time_to_live.is_zero())?;
        if self.spells.volley_offsets.is_empty() || self.spells.base_volley == 0 {
            return Err(TunablesError::EmptyVolley);
        }

        let adv = &self.adversary;
        if adv.near_threshold > adv.far_threshold {
            return Err(TunablesError::Thresholds { near: adv.near_threshold, far: adv.far_threshold });
        }
        positive("melee window", !adv.swing.is_zero())?;
        positive("jump odds", adv.jump_odds > 0)?;
        positive("spell odds", adv.spell_odds > 0)?;
        positive("grunt health", adv.grunt.max_health > 0)?;
        positive("brute health", adv.brute.max_health > 0)?;
        positive("kind weights", adv.grunt.weight + adv.brute.weight > 0)?;
        non_empty("jump impulse", &adv.jump_impulse)?;

        positive("spawn interval", !self.spawn.interval.is_zero())?;
        positive("population cap", self.spawn.cap > 0)?;
        non_empty("left spawn half", &self.spawn.left)?;
        non_empty("right spawn half", &self.spawn.right)?;

        positive("first level threshold", self.progression.first_threshold > 0)?;
        positive("level-up effect", !self.progression.effect.is_zero())?;
        positive("level-up pulse", !self.progression.pulse.is_zero())?;
        Ok(())
    }
}
