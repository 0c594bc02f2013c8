use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::test_utils::{advance_clock, drain_messages, gameplay_world, run_system_once};
use crate::common::tunables::{AdversaryTunables, Tunables};
use crate::plugins::avatar::Avatar;
use crate::plugins::clock::{GameScheduler, Task, TaskDue};
use crate::plugins::combat::damage::DamageKind;
use crate::plugins::combat::resolver::resolve_hits;
use crate::plugins::combat::{Facing, Hit, Lifecycle};

use super::melee::{end_melee_swing, melee_contacts, retire_orphan_regions};
use super::*;

fn cfg() -> AdversaryTunables {
    Tunables::default().adversary
}

fn senses(dx: f32) -> Senses {
    Senses { dx, grounded: true, attacking: false, jump_roll: false }
}

/// Gameplay world where random jumps and spells never trigger.
fn calm_world() -> World {
    let mut world = gameplay_world();
    {
        let mut t = world.resource_mut::<Tunables>();
        t.adversary.jump_odds = u32::MAX;
        t.adversary.spell_odds = u32::MAX;
    }
    world
}

fn spawn_avatar_at(world: &mut World, x: f32) -> Entity {
    let y = Tunables::default().avatar.half_size.y;
    world.spawn((Avatar, Transform::from_xyz(x, y, 1.0), Lifecycle::Active)).id()
}

fn spawn_grounded_adversary(world: &mut World, x: f32) -> Entity {
    let plan = SpawnPlan { x, kind: AdversaryKind::Grunt };
    let tunables = world.resource::<Tunables>().clone();
    let mut queue = bevy::ecs::world::CommandQueue::default();
    let e = {
        let mut commands = Commands::new(&mut queue, world);
        spawn_adversary(&mut commands, plan, &tunables)
    };
    queue.apply(world);
    world.get_mut::<Transform>(e).unwrap().translation.y = tunables.adversary.half_size.y;
    e
}

// --------------------------------------------------------------------------------------
// State machine
// --------------------------------------------------------------------------------------

#[test]
fn near_avatar_starts_a_swing() {
    let d = decide(&senses(-20.0), &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Attacking);
    assert!(d.start_swing);
    assert_eq!(d.velocity_x, Some(0.0));
    assert_eq!(d.facing, Some(Facing::Left));
}

#[test]
fn far_avatar_is_chased() {
    let d = decide(&senses(350.0), &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Chasing);
    assert_eq!(d.velocity_x, Some(100.0));
    assert_eq!(d.facing, Some(Facing::Right));

    let d = decide(&senses(-350.0), &cfg(), 70.0);
    assert_eq!(d.velocity_x, Some(-70.0));
}

#[test]
fn between_thresholds_idles() {
    for dx in [30.0, 60.0, -100.0] {
        let d = decide(&senses(dx), &cfg(), 100.0);
        assert_eq!(d.state, BehaviorState::Idle, "dx {dx}");
        assert_eq!(d.velocity_x, Some(0.0));
        assert!(!d.start_swing);
    }
}

#[test]
fn attack_wins_when_thresholds_overlap() {
    let mut c = cfg();
    c.near_threshold = 100.0;
    c.far_threshold = 50.0;
    let d = decide(&senses(80.0), &c, 100.0);
    assert_eq!(d.state, BehaviorState::Attacking);
    assert!(d.start_swing);
}

#[test]
fn no_second_swing_while_one_is_in_flight() {
    let d = decide(&Senses { attacking: true, ..senses(5.0) }, &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Attacking);
    assert!(!d.start_swing);
}

#[test]
fn airborne_keeps_momentum_but_still_turns() {
    let d = decide(&Senses { grounded: false, ..senses(-500.0) }, &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Airborne);
    assert_eq!(d.velocity_x, None);
    assert_eq!(d.facing, Some(Facing::Left));
    assert!(!d.jump);
}

#[test]
fn jump_roll_lifts_off_unless_attacking() {
    let d = decide(&Senses { jump_roll: true, ..senses(300.0) }, &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Airborne);
    assert!(d.jump);
    assert_eq!(d.velocity_x, Some(100.0));

    let d = decide(&Senses { jump_roll: true, ..senses(10.0) }, &cfg(), 100.0);
    assert_eq!(d.state, BehaviorState::Attacking);
    assert!(!d.jump);
}

// --------------------------------------------------------------------------------------
// Spawner
// --------------------------------------------------------------------------------------

#[test]
fn plan_respects_cap_and_safe_distance() {
    let t = Tunables::default();
    let policy = SpawnPolicy { spawn: &t.spawn, kinds: &t.adversary };
    let mut rng = GameRng::seeded(3);

    assert_eq!(policy.plan(10, 1000.0, &mut rng), None);

    for avatar_x in [100.0, 550.0, 1000.0, 1450.0, 1900.0] {
        for _ in 0..200 {
            let plan = policy.plan(9, avatar_x, &mut rng).unwrap();
            assert!((plan.x - avatar_x).abs() >= 100.0, "{} too close to {avatar_x}", plan.x);
            assert!((100.0..=1900.0).contains(&plan.x));
        }
    }
}

#[test]
fn unsatisfiable_distance_falls_back_to_the_far_end() {
    let mut t = Tunables::default();
    t.spawn.safe_distance = 5000.0;
    t.spawn.max_attempts = 4;
    let policy = SpawnPolicy { spawn: &t.spawn, kinds: &t.adversary };
    let mut rng = GameRng::seeded(11);

    for _ in 0..50 {
        let x = policy.plan(0, 300.0, &mut rng).unwrap().x;
        // Left half [100, 1000] -> 1000, right half [1000, 1900] -> 1900.
        assert!(x == 1000.0 || x == 1900.0, "x {x}");
    }
}

#[test]
fn inverted_spawn_halves_fall_back_to_their_start() {
    let mut t = Tunables::default();
    t.spawn.left = 1000.0..=100.0;
    t.spawn.right = 1900.0..=1000.0;
    let policy = SpawnPolicy { spawn: &t.spawn, kinds: &t.adversary };
    let mut rng = GameRng::seeded(13);

    for _ in 0..50 {
        let x = policy.plan(0, 300.0, &mut rng).unwrap().x;
        assert!(x == 1000.0 || x == 1900.0, "x {x}");
    }
}

#[test]
fn kind_weights_are_honoured() {
    let mut c = cfg();
    let mut rng = GameRng::seeded(5);
    let picks: Vec<_> = (0..400).map(|_| AdversaryKind::pick(&c, &mut rng)).collect();
    assert!(picks.contains(&AdversaryKind::Grunt));
    assert!(picks.contains(&AdversaryKind::Brute));

    c.brute.weight = 0;
    assert!((0..100).all(|_| AdversaryKind::pick(&c, &mut rng) == AdversaryKind::Grunt));
    assert_eq!(AdversaryKind::Brute.stats(&c).max_health, 100);
}

#[test]
fn wave_at_cap_spawns_nothing_until_one_falls() {
    let mut world = calm_world();
    spawn_avatar_at(&mut world, 1000.0);
    let first = spawn_grounded_adversary(&mut world, 150.0);
    for i in 1..10 {
        spawn_grounded_adversary(&mut world, 150.0 + i as f32 * 10.0);
    }

    let wave = world.resource_mut::<GameScheduler>().schedule_repeating(Duration::from_millis(250), Task::SpawnWave);
    advance_clock(&mut world, Duration::from_millis(250));
    run_system_once(&mut world, spawn_wave);
    assert_eq!(world.query::<&Adversary>().iter(&world).count(), 10);

    *world.get_mut::<Lifecycle>(first).unwrap() = Lifecycle::Destroyed;
    advance_clock(&mut world, Duration::from_millis(250));
    run_system_once(&mut world, spawn_wave);

    let mut q = world.query_filtered::<(&Transform, &Lifecycle), With<Adversary>>();
    let active: Vec<f32> = q
        .iter(&world)
        .filter(|(_, l)| l.is_active())
        .map(|(tf, _)| tf.translation.x)
        .collect();
    assert_eq!(active.len(), 10);
    assert!(active.iter().all(|x| (x - 1000.0).abs() >= 100.0));
    assert!(world.resource::<GameScheduler>().is_pending(wave));
}

#[test]
fn spawned_adversary_starts_at_full_health() {
    let mut world = calm_world();
    let e = spawn_grounded_adversary(&mut world, 400.0);
    assert_eq!(world.get::<crate::plugins::combat::Vitals>(e).unwrap().health, 50);
    assert_eq!(*world.get::<Faction>(e).unwrap(), Faction::Adversary);
    let layers = world.get::<CollisionLayers>(e).unwrap();
    assert!(layers.filters.has_all(crate::common::layers::Layer::AvatarSpell));
    assert!(!layers.filters.has_all(crate::common::layers::Layer::AdversarySpell));
}

// --------------------------------------------------------------------------------------
// Behavior in the world
// --------------------------------------------------------------------------------------

#[test]
fn chaser_moves_toward_the_avatar() {
    let mut world = calm_world();
    spawn_avatar_at(&mut world, 1000.0);
    let e = spawn_grounded_adversary(&mut world, 400.0);

    run_system_once(&mut world, drive_adversaries);

    assert_eq!(world.get::<LinearVelocity>(e).unwrap().x, 100.0);
    assert_eq!(*world.get::<Facing>(e).unwrap(), Facing::Right);
    assert_eq!(world.get::<AdversaryBrain>(e).unwrap().state, BehaviorState::Chasing);
}

#[test]
fn melee_swing_hits_then_ends() {
    let mut world = calm_world();
    let avatar = spawn_avatar_at(&mut world, 1000.0);
    let e = spawn_grounded_adversary(&mut world, 1020.0);

    run_system_once(&mut world, drive_adversaries);

    let brain = world.get::<AdversaryBrain>(e).unwrap().clone();
    assert!(brain.is_attacking());
    let region = brain.region().unwrap();
    // Region sits toward the avatar.
    assert_eq!(world.get::<Transform>(region).unwrap().translation.x, 1000.0);

    // A second tick does not start another swing.
    run_system_once(&mut world, drive_adversaries);
    assert_eq!(world.query::<&MeleeRegion>().iter(&world).count(), 1);

    run_system_once(&mut world, melee_contacts);
    assert_eq!(
        drain_messages::<Hit>(&mut world),
        vec![Hit { target: avatar, kind: DamageKind::Contact }]
    );

    advance_clock(&mut world, Duration::from_millis(1000));
    run_system_once(&mut world, end_melee_swing);
    assert!(!world.get::<Lifecycle>(region).unwrap().is_active());
    let brain = world.get::<AdversaryBrain>(e).unwrap();
    assert!(!brain.is_attacking());
    assert_eq!(brain.state, BehaviorState::Idle);
}

#[test]
fn killing_a_swinging_adversary_cancels_the_swing_and_its_region() {
    let mut world = calm_world();
    spawn_avatar_at(&mut world, 1000.0);
    let e = spawn_grounded_adversary(&mut world, 1020.0);
    run_system_once(&mut world, drive_adversaries);
    let region = world.get::<AdversaryBrain>(e).unwrap().region().unwrap();

    world.resource_mut::<Tunables>().damage.avatar = 60..=60;
    world.write_message(Hit { target: e, kind: DamageKind::Avatar });
    run_system_once(&mut world, resolve_hits);

    assert!(!world.get::<Lifecycle>(e).unwrap().is_active());
    assert!(world.resource::<GameScheduler>().is_empty());

    run_system_once(&mut world, retire_orphan_regions);
    assert!(!world.get::<Lifecycle>(region).unwrap().is_active());

    // The cancelled task never arrives; a stray one is still harmless.
    let handle = world.resource_mut::<GameScheduler>().schedule_once(Duration::ZERO, Task::SpawnWave);
    world.write_message(TaskDue { handle, task: Task::EndMeleeSwing { adversary: e, region } });
    run_system_once(&mut world, end_melee_swing);
    assert!(!world.get::<AdversaryBrain>(e).unwrap().is_attacking());
}
