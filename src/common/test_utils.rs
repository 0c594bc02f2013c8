//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; we call `world.flush()` after
//! running so queued commands are applied before assertions.

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::{rng::GameRng, tunables::Tunables};
use crate::plugins::clock::{Fired, GameScheduler, TaskDue};
use crate::plugins::combat::{AdversaryDefeated, Hit};
use crate::plugins::feedback::Cue;
use crate::plugins::run::RunStatus;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

fn collect<M: Message + Clone>(mut reader: MessageReader<M>) -> Vec<M> {
    reader.read().cloned().collect()
}

/// Every message of type `M` currently buffered in the world.
pub fn drain_messages<M: Message + Clone>(world: &mut World) -> Vec<M> {
    run_system_once(world, collect::<M>)
}

/// Make sure the message buffer for `M` exists.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

/// Drop buffered messages of type `M` so the next one-shot reader only sees new ones.
pub fn clear_messages<M: Message>(world: &mut World) {
    ensure_messages::<M>(world);
    world.resource_mut::<Messages<M>>().clear();
}

/// A world carrying the shared gameplay resources with a pinned seed.
pub fn gameplay_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(GameRng::seeded(7));
    world.insert_resource(GameScheduler::default());
    world.insert_resource(RunStatus::default());
    ensure_messages::<TaskDue>(&mut world);
    ensure_messages::<Hit>(&mut world);
    ensure_messages::<AdversaryDefeated>(&mut world);
    ensure_messages::<Cue>(&mut world);
    world
}

/// Advance the scheduler by `dt` and publish what fired, like one `tick_scheduler` run.
pub fn advance_clock(world: &mut World, dt: std::time::Duration) -> usize {
    clear_messages::<TaskDue>(world);
    let fired = world.resource_mut::<GameScheduler>().advance(dt);
    let n = fired.len();
    for Fired { handle, task } in fired {
        world.write_message(TaskDue { handle, task });
    }
    n
}
