use std::time::Duration;

use bevy::prelude::*;

use crate::common::test_utils::{
    advance_clock, drain_messages, ensure_messages, gameplay_world, run_system_once,
};
use crate::common::tunables::{ProgressionTunables, Tunables};
use crate::plugins::adversaries::Adversary;
use crate::plugins::avatar::Avatar;
use crate::plugins::clock::GameScheduler;
use crate::plugins::combat::damage::DamageKind;
use crate::plugins::combat::{clear_invincibility, AdversaryDefeated, Hit, Invincibility, Lifecycle, Vitals};
use crate::plugins::feedback::{Cue, SoundCue};

use super::*;

fn rules() -> ProgressionTunables {
    Tunables::default().progression
}

fn progression_world() -> World {
    let mut world = gameplay_world();
    ensure_messages::<LevelUp>(&mut world);
    world
}

fn spawn_avatar(world: &mut World, progression: Progression, health: i32) -> Entity {
    world
        .spawn((
            Avatar,
            Transform::from_xyz(500.0, 30.0, 1.0),
            progression,
            Vitals { health, max_health: 100 },
            Invincibility::default(),
            LevelUpEffect::default(),
            Lifecycle::default(),
        ))
        .id()
}

#[test]
fn starts_at_level_one() {
    let p = Progression::new(&rules());
    assert_eq!(p, Progression { level: 1, experience: 0, to_next: 2000 });
}

#[test]
fn overflow_carries_into_the_next_level() {
    let mut p = Progression { level: 1, experience: 1800, to_next: 2000 };
    assert_eq!(p.gain_experience(300, &rules()), 1);
    assert_eq!(p, Progression { level: 2, experience: 100, to_next: 7000 });
}

#[test]
fn one_large_award_can_cross_several_thresholds() {
    let mut p = Progression::new(&rules());
    // 2000 + 7000 + 12000 = 21000 to reach level 4.
    assert_eq!(p.gain_experience(21_500, &rules()), 3);
    assert_eq!(p, Progression { level: 4, experience: 500, to_next: 17_000 });
}

#[test]
fn split_awards_match_a_single_award() {
    let r = rules();
    for (a, b) in [(0, 0), (1999, 1), (1000, 1000), (300, 40_000), (12_345, 6789), (2000, 7000)] {
        let mut split = Progression::new(&r);
        split.gain_experience(a, &r);
        split.gain_experience(b, &r);

        let mut whole = Progression::new(&r);
        whole.gain_experience(a + b, &r);

        assert_eq!((split.level, split.experience), (whole.level, whole.experience), "{a} + {b}");
        assert!(whole.experience < whole.to_next);
    }
}

#[test]
fn kill_award_levels_up_restores_health_and_starts_the_effect() {
    let mut world = progression_world();
    let avatar = spawn_avatar(&mut world, Progression { level: 1, experience: 1800, to_next: 2000 }, 40);

    world.write_message(AdversaryDefeated { adversary: Entity::PLACEHOLDER, experience: 300 });
    run_system_once(&mut world, award_experience);

    assert_eq!(
        *world.get::<Progression>(avatar).unwrap(),
        Progression { level: 2, experience: 100, to_next: 7000 }
    );
    assert_eq!(world.get::<Vitals>(avatar).unwrap().health, 100);
    assert!(world.get::<LevelUpEffect>(avatar).unwrap().is_active());
    assert!(world.get::<Invincibility>(avatar).unwrap().is_active());
    assert_eq!(drain_messages::<LevelUp>(&mut world), vec![LevelUp { avatar, level: 2 }]);

    let aura = world.get::<LevelUpEffect>(avatar).unwrap().aura().unwrap();
    assert!(world.get::<LevelUpAura>(aura).is_some());

    // The window holds for its whole duration...
    advance_clock(&mut world, Duration::from_millis(1990));
    run_system_once(&mut world, pulse_level_up);
    run_system_once(&mut world, end_level_up);
    assert!(world.get::<LevelUpEffect>(avatar).unwrap().is_active());

    // ...and both flags drop together at the end.
    advance_clock(&mut world, Duration::from_millis(10));
    run_system_once(&mut world, pulse_level_up);
    run_system_once(&mut world, end_level_up);
    assert!(!world.get::<LevelUpEffect>(avatar).unwrap().is_active());
    assert!(!world.get::<Invincibility>(avatar).unwrap().is_active());
    assert!(world.get_entity(aura).is_err());
    assert!(world.resource::<GameScheduler>().is_empty());
    assert!(drain_messages::<Cue>(&mut world).contains(&Cue::StopSound(SoundCue::LevelUp)));
}

#[test]
fn multi_level_award_runs_one_effect() {
    let mut world = progression_world();
    let avatar = spawn_avatar(&mut world, Progression::new(&rules()), 10);

    world.write_message(AdversaryDefeated { adversary: Entity::PLACEHOLDER, experience: 9000 });
    run_system_once(&mut world, award_experience);

    assert_eq!(world.get::<Progression>(avatar).unwrap().level, 3);
    assert_eq!(drain_messages::<LevelUp>(&mut world).len(), 2);
    assert_eq!(world.query::<&LevelUpAura>().iter(&world).count(), 1);
    // Pulse + end + invincibility clear.
    assert_eq!(world.resource::<GameScheduler>().len(), 3);
}

#[test]
fn pulse_restores_invincibility_cleared_early() {
    let mut world = progression_world();
    let avatar = spawn_avatar(&mut world, Progression::new(&rules()), 100);
    world.write_message(AdversaryDefeated { adversary: Entity::PLACEHOLDER, experience: 2000 });
    run_system_once(&mut world, award_experience);

    // Something outside the effect drops the flag.
    let mut inv = std::mem::take(&mut *world.get_mut::<Invincibility>(avatar).unwrap());
    inv.release(&mut world.resource_mut::<GameScheduler>());
    assert!(!world.get::<Invincibility>(avatar).unwrap().is_active());

    advance_clock(&mut world, Duration::from_millis(16));
    run_system_once(&mut world, pulse_level_up);

    let inv = world.get::<Invincibility>(avatar).unwrap();
    assert!(inv.is_active());
    assert_eq!(inv.until(), Some(Duration::from_millis(2000)));
}

#[test]
fn aura_hits_adversaries_touching_the_avatar() {
    let mut world = progression_world();
    let avatar = spawn_avatar(&mut world, Progression::new(&rules()), 100);
    let near = world
        .spawn((Adversary, Transform::from_xyz(510.0, 30.0, 1.0), Lifecycle::default()))
        .id();
    world.spawn((Adversary, Transform::from_xyz(900.0, 30.0, 1.0), Lifecycle::default()));

    // No effect, no aura.
    run_system_once(&mut world, aura_contacts);
    assert!(drain_messages::<Hit>(&mut world).is_empty());

    world.write_message(AdversaryDefeated { adversary: Entity::PLACEHOLDER, experience: 2000 });
    run_system_once(&mut world, award_experience);
    run_system_once(&mut world, aura_contacts);

    assert_eq!(drain_messages::<Hit>(&mut world), vec![Hit { target: near, kind: DamageKind::Aura }]);
    assert!(world.get::<LevelUpEffect>(avatar).unwrap().is_active());
}

#[test]
fn effect_ending_inside_a_longer_damage_window_keeps_that_window() {
    let mut world = progression_world();
    world.resource_mut::<Tunables>().progression.effect = Duration::from_millis(500);
    let avatar = spawn_avatar(&mut world, Progression::new(&rules()), 100);

    // Damage window from t=0 to t=1000.
    let mut inv = std::mem::take(&mut *world.get_mut::<Invincibility>(avatar).unwrap());
    inv.grant(avatar, Duration::from_millis(1000), &mut world.resource_mut::<GameScheduler>());
    *world.get_mut::<Invincibility>(avatar).unwrap() = inv;

    // Effect from t=100 to t=600.
    advance_clock(&mut world, Duration::from_millis(100));
    world.write_message(AdversaryDefeated { adversary: Entity::PLACEHOLDER, experience: 2000 });
    run_system_once(&mut world, award_experience);
    assert!(world.get::<LevelUpEffect>(avatar).unwrap().is_active());

    advance_clock(&mut world, Duration::from_millis(500));
    run_system_once(&mut world, pulse_level_up);
    run_system_once(&mut world, end_level_up);

    assert!(!world.get::<LevelUpEffect>(avatar).unwrap().is_active());
    let inv = world.get::<Invincibility>(avatar).unwrap();
    assert!(inv.is_active());
    assert_eq!(inv.until(), Some(Duration::from_millis(1000)));

    advance_clock(&mut world, Duration::from_millis(400));
    run_system_once(&mut world, clear_invincibility);
    assert!(!world.get::<Invincibility>(avatar).unwrap().is_active());
    assert!(world.resource::<GameScheduler>().is_empty());
}
