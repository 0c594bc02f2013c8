//! Combat plugin: entity records, damage table and the hit resolver.
//!
//! Schedules:
//! - FixedUpdate (`SimSet::Callbacks`): invincibility and cooldown timers ending.
//! - FixedPostUpdate (`CombatSet::Resolve`): apply every `Hit` written by detectors.
//! - PostUpdate: despawn whatever was destroyed during the fixed steps.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::clock::{GameScheduler, Task, TaskDue};
use crate::plugins::run::{CombatSet, SimSet};

pub mod components;
pub mod damage;
pub mod resolver;

pub use components::{ActionGate, Faction, Facing, Invincibility, Lifecycle, Vitals};
pub use resolver::{AdversaryDefeated, Hit, HitOutcome};

pub fn plugin(app: &mut App) {
    app.add_message::<Hit>()
        .add_message::<AdversaryDefeated>()
        .add_systems(
            FixedUpdate,
            (clear_invincibility, restore_action)
                .in_set(SimSet::Callbacks)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            resolver::resolve_hits
                .in_set(CombatSet::Resolve)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(PostUpdate, despawn_destroyed);
}

/// Axis-aligned overlap of two boxes given by centre and half extents.
#[inline]
pub fn aabb_overlap(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> bool {
    (a.x - b.x).abs() <= a_half.x + b_half.x && (a.y - b.y).abs() <= a_half.y + b_half.y
}

pub fn clear_invincibility(
    mut due: MessageReader<TaskDue>,
    scheduler: Res<GameScheduler>,
    mut q: Query<&mut Invincibility>,
) {
    for TaskDue { task, .. } in due.read() {
        let Task::ClearInvincibility(e) = *task else { continue };
        let Ok(mut inv) = q.get_mut(e) else { continue };
        if inv.expire(scheduler.now()) {
            trace!("{e:?} invincibility over");
        }
    }
}

pub fn restore_action(mut due: MessageReader<TaskDue>, mut q: Query<(&mut ActionGate, &Lifecycle)>) {
    for TaskDue { task, .. } in due.read() {
        let Task::RestoreAction(e) = *task else { continue };
        let Ok((mut gate, life)) = q.get_mut(e) else { continue };
        if life.is_active() {
            gate.restore();
        }
    }
}

/// Structural cleanup stays out of the fixed step.
fn despawn_destroyed(mut commands: Commands, q: Query<(Entity, &Lifecycle)>) {
    for (e, life) in &q {
        if !life.is_active() {
            commands.entity(e).despawn();
        }
    }
}
