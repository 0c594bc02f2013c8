//! Transient melee hit regions.
//!
//! A region lives for one swing window. Every fixed step it overlaps the
//! avatar it writes a contact `Hit`; the avatar's invincibility window keeps
//! that to one landed hit per window.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::avatar::Avatar;
use crate::plugins::clock::{Task, TaskDue};
use crate::plugins::combat::damage::DamageKind;
use crate::plugins::combat::{aabb_overlap, Facing, Hit, Lifecycle};

use super::brain::AdversaryBrain;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MeleeRegion {
    pub owner: Entity,
    pub half_size: Vec2,
}

pub fn spawn_region(commands: &mut Commands, owner: Entity, at: Vec2, facing: Facing, tunables: &Tunables) -> Entity {
    let cfg = &tunables.adversary;
    let center = at + Vec2::new(facing.sign() * cfg.region_offset, 0.0);
    commands
        .spawn((
            Name::new("MeleeRegion"),
            MeleeRegion { owner, half_size: cfg.region_size * 0.5 },
            Lifecycle::Active,
            Transform::from_translation(center.extend(1.5)),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

pub fn melee_contacts(
    tunables: Res<Tunables>,
    q_avatar: Query<(Entity, &Transform, &Lifecycle), With<Avatar>>,
    q_regions: Query<(&MeleeRegion, &Transform, &Lifecycle), Without<Avatar>>,
    mut hits: MessageWriter<Hit>,
) {
    let Ok((avatar, avatar_tf, avatar_life)) = q_avatar.single() else {
        return;
    };
    if !avatar_life.is_active() {
        return;
    }
    let a = avatar_tf.translation.truncate();
    for (region, tf, life) in &q_regions {
        if life.is_active() && aabb_overlap(tf.translation.truncate(), region.half_size, a, tunables.avatar.half_size) {
            hits.write(Hit { target: avatar, kind: DamageKind::Contact });
        }
    }
}

pub fn end_melee_swing(
    mut due: MessageReader<TaskDue>,
    mut q_brains: Query<(&mut AdversaryBrain, &Lifecycle)>,
    mut q_regions: Query<&mut Lifecycle, (With<MeleeRegion>, Without<AdversaryBrain>)>,
) {
    for TaskDue { task, .. } in due.read() {
        let Task::EndMeleeSwing { adversary, region } = *task else { continue };
        if let Ok(mut life) = q_regions.get_mut(region) {
            life.destroy();
        }
        let Ok((mut brain, life)) = q_brains.get_mut(adversary) else {
            continue;
        };
        if life.is_active() && brain.region() == Some(region) {
            brain.end_swing();
        }
    }
}

/// Regions whose adversary is gone or destroyed go with it.
pub fn retire_orphan_regions(
    mut q_regions: Query<(&MeleeRegion, &mut Lifecycle)>,
    q_owners: Query<&Lifecycle, Without<MeleeRegion>>,
) {
    for (region, mut life) in &mut q_regions {
        let owner_alive = q_owners.get(region.owner).is_ok_and(|l| l.is_active());
        if !owner_alive && life.destroy() {
            trace!("orphaned melee region retired");
        }
    }
}
