//! Adversaries plugin: spawning, per-tick behavior and melee.
//!
//! ```text
//! OnEnter(InGame)      start the repeating SpawnWave task (handle kept in SpawnerState)
//! SimSet::Callbacks    SpawnWave    -> SpawnPolicy::plan -> spawn_adversary
//!                      EndMeleeSwing -> region destroyed, brain back to Idle
//! SimSet::Ai           decide() for every active adversary; swings, jumps, spells
//! CombatSet::Detect    orphaned regions retired, live regions hit the avatar
//! ```
//!
//! Destruction is owned by the combat resolver, which cancels the brain's
//! swing timer and cooldown before the entity is despawned.

pub mod brain;
pub mod melee;
pub mod spawner;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::{
    layers::Layer,
    rng::{draw_inclusive, GameRng},
    state::GameState,
    tunables::Tunables,
};
use crate::plugins::avatar::Avatar;
use crate::plugins::clock::{GameScheduler, Task, TaskDue};
use crate::plugins::combat::{ActionGate, Faction, Facing, Invincibility, Lifecycle, Vitals};
use crate::plugins::feedback::{Clip, Cue};
use crate::plugins::physics::is_grounded;
use crate::plugins::projectiles::{cast_projectile, spawn_projectile};
use crate::plugins::run::{CombatSet, SimSet};

pub use brain::{decide, AdversaryBrain, BehaviorState, Decision, Senses};
pub use melee::MeleeRegion;
pub use spawner::{AdversaryKind, SpawnPlan, SpawnPolicy, SpawnerState};

#[derive(Component, Debug)]
pub struct Adversary;

pub fn plugin(app: &mut App) {
    app.init_resource::<SpawnerState>()
        .add_systems(OnEnter(GameState::InGame), start_spawner)
        .add_systems(OnExit(GameState::InGame), stop_spawner)
        .add_systems(
            FixedUpdate,
            (
                (spawn_wave, melee::end_melee_swing).in_set(SimSet::Callbacks),
                drive_adversaries.in_set(SimSet::Ai),
            )
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            (melee::retire_orphan_regions, melee::melee_contacts)
                .chain()
                .in_set(CombatSet::Detect)
                .run_if(in_state(GameState::InGame)),
        );
}

fn start_spawner(tunables: Res<Tunables>, mut scheduler: ResMut<GameScheduler>, mut state: ResMut<SpawnerState>) {
    if let Some(old) = state.wave.take() {
        scheduler.cancel(old);
    }
    state.wave = Some(scheduler.schedule_repeating(tunables.spawn.interval, Task::SpawnWave));
}

fn stop_spawner(mut scheduler: ResMut<GameScheduler>, mut state: ResMut<SpawnerState>) {
    if let Some(wave) = state.wave.take() {
        scheduler.cancel(wave);
    }
}

pub fn spawn_adversary(commands: &mut Commands, plan: SpawnPlan, tunables: &Tunables) -> Entity {
    let cfg = &tunables.adversary;
    let stats = plan.kind.stats(cfg);
    let layers = CollisionLayers::new(Layer::Adversary, [Layer::World, Layer::AvatarSpell]);
    let size = cfg.half_size * 2.0;
    let color = match plan.kind {
        AdversaryKind::Grunt => Color::srgb(0.9, 0.25, 0.25),
        AdversaryKind::Brute => Color::srgb(0.6, 0.15, 0.2),
    };

    commands
        .spawn((
            (
                Name::new("Adversary"),
                Adversary,
                Faction::Adversary,
                plan.kind,
                Vitals::new(stats.max_health),
                Invincibility::default(),
                ActionGate::default(),
                Lifecycle::Active,
                Facing::Left,
                AdversaryBrain::default(),
            ),
            (
                Sprite {
                    color,
                    custom_size: Some(size),
                    ..default()
                },
                Transform::from_xyz(
                    plan.x,
                    tunables.world.floor_top + tunables.spawn.height + cfg.half_size.y,
                    1.0,
                ),
                RigidBody::Dynamic,
                Collider::rectangle(size.x, size.y),
                LockedAxes::ROTATION_LOCKED,
                layers,
                LinearVelocity::ZERO,
                DespawnOnExit(GameState::InGame),
            ),
        ))
        .id()
}

pub fn spawn_wave(
    mut commands: Commands,
    mut due: MessageReader<TaskDue>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    q_avatar: Query<&Transform, With<Avatar>>,
    q_adversaries: Query<&Lifecycle, With<Adversary>>,
) {
    let waves = due.read().filter(|d| d.task == Task::SpawnWave).count();
    if waves == 0 {
        return;
    }
    let Ok(avatar_tf) = q_avatar.single() else {
        return;
    };

    let policy = SpawnPolicy { spawn: &tunables.spawn, kinds: &tunables.adversary };
    let mut active = q_adversaries.iter().filter(|l| l.is_active()).count();

    for _ in 0..waves {
        let Some(plan) = policy.plan(active, avatar_tf.translation.x, &mut *rng) else {
            trace!("spawn skipped: population cap {} reached", tunables.spawn.cap);
            return;
        };
        let e = spawn_adversary(&mut commands, plan, &tunables);
        active += 1;
        debug!("spawned {:?} {e:?} at x {:.0} ({active} active)", plan.kind, plan.x);
    }
}

#[allow(clippy::type_complexity)]
pub fn drive_adversaries(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<GameScheduler>,
    q_avatar: Query<&Transform, (With<Avatar>, Without<Adversary>)>,
    mut q_adversaries: Query<
        (
            Entity,
            &Transform,
            &AdversaryKind,
            &Lifecycle,
            &mut LinearVelocity,
            &mut Facing,
            &mut AdversaryBrain,
            &mut ActionGate,
        ),
        With<Adversary>,
    >,
    mut cues: MessageWriter<Cue>,
) {
    let Ok(avatar_tf) = q_avatar.single() else {
        return;
    };
    let cfg = &tunables.adversary;
    let avatar_x = avatar_tf.translation.x;

    for (e, tf, kind, life, mut vel, mut facing, mut brain, mut gate) in &mut q_adversaries {
        if !life.is_active() {
            continue;
        }
        let feet = tf.translation.y - cfg.half_size.y;
        let grounded = is_grounded(feet, vel.y, tunables.world.floor_top);
        let senses = Senses {
            dx: avatar_x - tf.translation.x,
            grounded,
            attacking: brain.is_attacking(),
            jump_roll: grounded && rng.gen_ratio(1, cfg.jump_odds.max(1)),
        };
        let chase_speed = cfg.chase_speed * kind.stats(cfg).chase_factor;
        let decision = decide(&senses, cfg, chase_speed);

        if let Some(f) = decision.facing {
            *facing = f;
        }
        if let Some(vx) = decision.velocity_x {
            vel.x = vx;
        }
        if brain.state != decision.state {
            let clip = match decision.state {
                BehaviorState::Idle => Some(Clip::Idle),
                BehaviorState::Chasing => Some(Clip::Run),
                BehaviorState::Attacking | BehaviorState::Airborne => None,
            };
            if let Some(clip) = clip {
                cues.write(Cue::Animation { entity: e, clip });
            }
        }
        brain.state = decision.state;

        if decision.start_swing {
            let region = melee::spawn_region(&mut commands, e, tf.translation.truncate(), *facing, &tunables);
            brain.begin_swing(e, region, cfg.swing, &mut scheduler);
            cues.write(Cue::Animation { entity: e, clip: Clip::Attack });
        } else if decision.jump {
            vel.y = draw_inclusive(&cfg.jump_impulse, &mut *rng);
            cues.write(Cue::Animation { entity: e, clip: Clip::Jump });
        } else if decision.state == BehaviorState::Idle && rng.gen_ratio(1, cfg.spell_odds.max(1)) {
            let volley = cast_projectile(
                &mut gate,
                e,
                tf.translation.truncate(),
                Faction::Adversary,
                *facing,
                &[0.0],
                &tunables.spells.adversary,
                &mut scheduler,
            );
            for spec in &volley {
                spawn_projectile(&mut commands, spec, &mut scheduler);
            }
            if !volley.is_empty() {
                cues.write(Cue::Animation { entity: e, clip: Clip::Cast });
            }
        }
    }
}

#[cfg(test)]
mod tests;
