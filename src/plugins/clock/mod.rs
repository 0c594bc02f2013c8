//! Clock plugin: the simulation's delay queue.
//!
//! Pipeline:
//! - FixedUpdate (`SimSet::Timers`): advance the scheduler by the fixed step and
//!   publish one `TaskDue` message per fired task.
//! - FixedUpdate (`SimSet::Callbacks`): each feature plugin consumes the variants
//!   it owns. Consumers must re-check that the target still exists and is active.
//! - OnExit(InGame): everything still queued is dropped with the run.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::run::SimSet;

mod scheduler;

pub use scheduler::{Fired, Scheduler, TaskHandle};

/// Every deferred action in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Damage invincibility window elapsed.
    ClearInvincibility(Entity),
    /// Cast cooldown elapsed.
    RestoreAction(Entity),
    /// Projectile time-to-live (or grace delay) elapsed.
    ExpireProjectile(Entity),
    /// Melee window over; `region` is the transient hit region.
    EndMeleeSwing { adversary: Entity, region: Entity },
    /// Level-up effect re-assertion tick.
    LevelUpPulse(Entity),
    /// Level-up effect window over.
    EndLevelUp(Entity),
    /// Spawner interval.
    SpawnWave,
}

pub type GameScheduler = Scheduler<Task>;

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDue {
    pub handle: TaskHandle,
    pub task: Task,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<GameScheduler>()
        .add_message::<TaskDue>()
        .add_systems(
            FixedUpdate,
            tick_scheduler
                .in_set(SimSet::Timers)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(OnExit(GameState::InGame), clear_scheduler);
}

pub fn tick_scheduler(
    time: Res<Time<Fixed>>,
    mut scheduler: ResMut<GameScheduler>,
    mut due: MessageWriter<TaskDue>,
) {
    for Fired { handle, task } in scheduler.advance(time.delta()) {
        trace!("task due: {task:?}");
        due.write(TaskDue { handle, task });
    }
}

fn clear_scheduler(mut scheduler: ResMut<GameScheduler>) {
    debug!("run over, dropping {} scheduled tasks", scheduler.len());
    scheduler.clear();
}
