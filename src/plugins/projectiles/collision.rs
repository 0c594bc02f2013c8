use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::tunables::Tunables;
use crate::plugins::clock::GameScheduler;
use crate::plugins::combat::damage::DamageKind;
use crate::plugins::combat::{Faction, Hit, Lifecycle};

use super::components::Projectile;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

/// Damage band for a spell cast by `owner`.
#[inline]
fn damage_kind(owner: Faction) -> DamageKind {
    match owner {
        Faction::Avatar => DamageKind::Avatar,
        Faction::Adversary => DamageKind::Spell,
    }
}

/// Turn this step's projectile contacts into `Hit`s and retirements.
///
/// The contact list is snapshotted before anything is applied; a projectile
/// retired by an earlier contact in the list ignores the rest.
pub fn detect_projectile_contacts(
    mut started: MessageReader<CollisionStart>,
    tunables: Res<Tunables>,
    mut scheduler: ResMut<GameScheduler>,
    mut q_projectiles: Query<(&mut Projectile, &mut Lifecycle)>,
    q_targets: Query<(&Faction, &Lifecycle), Without<Projectile>>,
    q_layers: Query<&CollisionLayers>,
    mut hits: MessageWriter<Hit>,
) {
    let contacts: Vec<_> = started.read().map(targets).collect();

    for (t1, t2) in contacts {
        let p1 = q_projectiles.contains(t1.collider);
        let p2 = q_projectiles.contains(t2.collider);
        if !(p1 ^ p2) {
            continue; // exactly one projectile
        }
        let (spell_side, other_side) = if p1 { (t1, t2) } else { (t2, t1) };

        let Ok((mut projectile, mut life)) = q_projectiles.get_mut(spell_side.collider) else {
            continue;
        };
        if !life.is_active() {
            continue;
        }

        // WORLD: destroy now, or within the grace delay
        if q_layers
            .get(other_side.collider)
            .is_ok_and(|layers| is_in_layer(layers, Layer::World))
        {
            let delay = tunables.spells.world_hit_grace;
            if delay.is_zero() {
                projectile.retire(&mut life, &mut scheduler);
            } else {
                projectile.expire_within(spell_side.collider, delay, &mut scheduler);
            }
            continue;
        }

        // ENTITY: opposing faction only
        let target = other_side.gameplay_owner();
        let Ok((faction, target_life)) = q_targets.get(target) else {
            continue;
        };
        if !projectile.owner.opposes(*faction) || !target_life.is_active() {
            trace!("projectile ignored {target:?}");
            continue;
        }

        projectile.retire(&mut life, &mut scheduler);
        hits.write(Hit { target, kind: damage_kind(projectile.owner) });
    }
}
