//! Casting: cooldown gate plus volley layout.
//!
//! `cast_projectile` is the rule; `spawn_projectile` turns its output into
//! physics entities and arms each expiry.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::ProjectileTunables;
use crate::plugins::clock::{GameScheduler, Task};
use crate::plugins::combat::{ActionGate, Faction, Facing, Lifecycle};

use super::components::Projectile;

/// Everything needed to spawn one projectile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpec {
    pub owner: Faction,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub radius: f32,
    pub time_to_live: Duration,
}

/// Close the caster's gate and lay out one projectile per vertical offset.
///
/// Returns an empty volley while the gate is closed. Reopening is scheduled
/// here, independent of any projectile's lifetime.
#[allow(clippy::too_many_arguments)]
pub fn cast_projectile(
    gate: &mut ActionGate,
    caster: Entity,
    origin: Vec2,
    owner: Faction,
    facing: Facing,
    pattern: &[f32],
    cfg: &ProjectileTunables,
    scheduler: &mut GameScheduler,
) -> Vec<ProjectileSpec> {
    if !gate.try_begin(caster, cfg.cooldown, scheduler) {
        return Vec::new();
    }
    let dir = facing.sign();
    pattern
        .iter()
        .map(|offset| ProjectileSpec {
            owner,
            position: origin + Vec2::new(dir * cfg.muzzle_offset, *offset),
            velocity: Vec2::new(dir * cfg.speed, 0.0),
            gravity_scale: cfg.gravity_scale,
            radius: cfg.radius,
            time_to_live: cfg.time_to_live,
        })
        .collect()
}

pub fn projectile_layers(owner: Faction) -> CollisionLayers {
    match owner {
        Faction::Avatar => CollisionLayers::new(Layer::AvatarSpell, [Layer::World, Layer::Adversary]),
        Faction::Adversary => CollisionLayers::new(Layer::AdversarySpell, [Layer::World, Layer::Avatar]),
    }
}

pub fn spawn_projectile(commands: &mut Commands, spec: &ProjectileSpec, scheduler: &mut GameScheduler) -> Entity {
    let e = commands.spawn_empty().id();
    let expiry = scheduler.schedule_once(spec.time_to_live, Task::ExpireProjectile(e));
    let color = match spec.owner {
        Faction::Avatar => Color::srgb(0.45, 0.8, 1.0),
        Faction::Adversary => Color::srgb(0.95, 0.35, 0.6),
    };

    commands.entity(e).insert((
        Name::new("Projectile"),
        Projectile::new(spec.owner, expiry),
        Lifecycle::Active,
        Sprite {
            color,
            custom_size: Some(Vec2::splat(spec.radius * 2.0)),
            ..default()
        },
        Transform::from_translation(spec.position.extend(2.0)),
        RigidBody::Dynamic,
        Collider::circle(spec.radius),
        Sensor,
        CollisionEventsEnabled,
        GravityScale(spec.gravity_scale),
        LinearVelocity(spec.velocity),
        projectile_layers(spec.owner),
        DespawnOnExit(GameState::InGame),
    ));
    e
}
