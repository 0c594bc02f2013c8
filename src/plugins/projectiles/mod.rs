//! Projectiles plugin: spells in flight, from cast to retirement.
//!
//! # Data flow
//! ```text
//!   FixedUpdate (SimSet::Attack / SimSet::Ai)
//!     casters call cast::cast_projectile
//!       - closes the caster's ActionGate, schedules RestoreAction
//!       - returns one ProjectileSpec per offset of the volley
//!     cast::spawn_projectile
//!       - spawns the sensor body, schedules ExpireProjectile (time-to-live)
//!
//!   FixedPostUpdate (CombatSet::Detect), after avian's CollisionStart
//!     collision::detect_projectile_contacts
//!       - world geometry   -> retire (or pull expiry forward to the grace delay)
//!       - opposing faction -> retire + Hit
//!       - own faction      -> ignored
//!
//!   FixedUpdate (SimSet::Callbacks)
//!     expire_projectiles: ExpireProjectile -> retire
//! ```
//!
//! Every path ends in `Projectile::retire`, which only acts on the first
//! call; the entity itself is despawned by the combat plugin in `PostUpdate`.

pub mod cast;
pub mod collision;
pub mod components;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::clock::{GameScheduler, Task, TaskDue};
use crate::plugins::combat::Lifecycle;
use crate::plugins::run::{CombatSet, SimSet};

pub use cast::{cast_projectile, spawn_projectile, ProjectileSpec};
pub use components::Projectile;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            expire_projectiles
                .in_set(SimSet::Callbacks)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            collision::detect_projectile_contacts
                .in_set(CombatSet::Detect)
                .run_if(in_state(GameState::InGame)),
        );
    }
}

pub fn expire_projectiles(
    mut due: MessageReader<TaskDue>,
    mut scheduler: ResMut<GameScheduler>,
    mut q: Query<(&mut Projectile, &mut Lifecycle)>,
) {
    for TaskDue { task, .. } in due.read() {
        let Task::ExpireProjectile(e) = *task else { continue };
        let Ok((mut projectile, mut life)) = q.get_mut(e) else {
            continue;
        };
        if projectile.retire(&mut life, &mut scheduler) {
            trace!("projectile {e:?} expired");
        }
    }
}
