//! Progression plugin: experience, levels and the level-up effect.
//!
//! - FixedPostUpdate (`CombatSet::Detect`): while the effect runs, adversaries
//!   touching the avatar are hit by the aura.
//! - FixedPostUpdate (`CombatSet::Progress`): every `AdversaryDefeated` feeds
//!   the avatar's experience; each level crossed restores health, writes a
//!   `LevelUp` and tries to start the effect.
//! - FixedUpdate (`SimSet::Callbacks`): effect pulse and end.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::{ProgressionTunables, Tunables};
use crate::plugins::adversaries::Adversary;
use crate::plugins::avatar::Avatar;
use crate::plugins::clock::{GameScheduler, Task, TaskDue, TaskHandle};
use crate::plugins::combat::damage::DamageKind;
use crate::plugins::combat::{aabb_overlap, AdversaryDefeated, Hit, Invincibility, Lifecycle, Vitals};
use crate::plugins::feedback::{Cue, SoundCue};
use crate::plugins::run::{CombatSet, SimSet};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    pub level: u32,
    pub experience: u32,
    pub to_next: u32,
}

impl Progression {
    pub fn new(rules: &ProgressionTunables) -> Self {
        Self { level: 1, experience: 0, to_next: rules.first_threshold }
    }

    /// Add `amount` and carry the overflow through as many levels as it covers.
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32, rules: &ProgressionTunables) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.to_next > 0 && self.experience >= self.to_next {
            self.experience -= self.to_next;
            self.level += 1;
            self.to_next = self.to_next.saturating_add(rules.increment);
            gained += 1;
        }
        gained
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub avatar: Entity,
    pub level: u32,
}

/// Exclusive level-up window. Owns its pulse and end handles.
#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct LevelUpEffect {
    pulse: Option<TaskHandle>,
    end: Option<TaskHandle>,
    aura: Option<Entity>,
}

impl LevelUpEffect {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.end.is_some()
    }

    pub fn aura(&self) -> Option<Entity> {
        self.aura
    }

    /// `false` (and nothing scheduled) while an effect is already running.
    pub fn begin(
        &mut self,
        owner: Entity,
        invincibility: &mut Invincibility,
        rules: &ProgressionTunables,
        scheduler: &mut GameScheduler,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        invincibility.grant(owner, rules.effect, scheduler);
        self.pulse = Some(scheduler.schedule_repeating(rules.pulse, Task::LevelUpPulse(owner)));
        self.end = Some(scheduler.schedule_once(rules.effect, Task::EndLevelUp(owner)));
        true
    }

    pub fn attach_aura(&mut self, aura: Entity) {
        self.aura = Some(aura);
    }

    /// Re-grant invincibility for whatever is left of the window.
    pub fn reassert(&self, owner: Entity, invincibility: &mut Invincibility, scheduler: &mut GameScheduler) -> bool {
        let Some(end) = self.end.and_then(|h| scheduler.deadline(h)) else {
            return false;
        };
        let remaining = end.saturating_sub(scheduler.now());
        !remaining.is_zero() && invincibility.grant(owner, remaining, scheduler)
    }

    /// Clear the effect and the invincibility it granted. A damage window
    /// reaching past the effect's end is left running. Returns the aura to remove.
    pub fn finish(&mut self, invincibility: &mut Invincibility, scheduler: &mut GameScheduler) -> Option<Entity> {
        let end = self.end.take()?;
        let ends_at = scheduler.deadline(end).unwrap_or_else(|| scheduler.now());
        scheduler.cancel(end);
        if let Some(pulse) = self.pulse.take() {
            scheduler.cancel(pulse);
        }
        if invincibility.until().is_none_or(|until| until <= ends_at) {
            invincibility.release(scheduler);
        }
        self.aura.take()
    }
}

/// Visual anchored to the avatar while the effect runs.
#[derive(Component, Debug)]
pub struct LevelUpAura;

pub fn plugin(app: &mut App) {
    app.add_message::<LevelUp>()
        .add_systems(
            FixedUpdate,
            (pulse_level_up, end_level_up)
                .in_set(SimSet::Callbacks)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            (
                aura_contacts.in_set(CombatSet::Detect),
                award_experience.in_set(CombatSet::Progress),
            )
                .run_if(in_state(GameState::InGame)),
        );
}

pub fn award_experience(
    mut commands: Commands,
    mut defeated: MessageReader<AdversaryDefeated>,
    tunables: Res<Tunables>,
    mut scheduler: ResMut<GameScheduler>,
    mut q_avatar: Query<
        (Entity, &Transform, &mut Progression, &mut Vitals, &mut Invincibility, &mut LevelUpEffect),
        With<Avatar>,
    >,
    mut level_ups: MessageWriter<LevelUp>,
    mut cues: MessageWriter<Cue>,
) {
    let Ok((avatar, tf, mut progression, mut vitals, mut invincibility, mut effect)) = q_avatar.single_mut()
    else {
        defeated.clear();
        return;
    };
    let rules = &tunables.progression;

    for award in defeated.read() {
        let first = progression.level;
        let gained = progression.gain_experience(award.experience, rules);
        debug!(
            "+{} xp from {:?}: {}/{}",
            award.experience, award.adversary, progression.experience, progression.to_next
        );

        for level in (first + 1)..=(first + gained) {
            vitals.restore_full();
            level_ups.write(LevelUp { avatar, level });
            cues.write(Cue::Sound(SoundCue::LevelUp));
            info!("level up: {level}");

            if effect.begin(avatar, &mut invincibility, rules, &mut scheduler) {
                let aura = commands
                    .spawn((
                        Name::new("LevelUpAura"),
                        LevelUpAura,
                        Sprite {
                            color: Color::srgba(1.0, 0.85, 0.3, 0.35),
                            custom_size: Some(tunables.avatar.half_size * 3.0),
                            ..default()
                        },
                        Transform::from_translation(tf.translation.with_z(0.5)),
                        DespawnOnExit(GameState::InGame),
                    ))
                    .id();
                effect.attach_aura(aura);
            }
        }
    }
}

fn pulse_level_up(
    mut due: MessageReader<TaskDue>,
    mut scheduler: ResMut<GameScheduler>,
    mut q_avatar: Query<(&Transform, &LevelUpEffect, &mut Invincibility, &Lifecycle), Without<LevelUpAura>>,
    mut q_aura: Query<&mut Transform, With<LevelUpAura>>,
) {
    for TaskDue { task, .. } in due.read() {
        let Task::LevelUpPulse(e) = *task else { continue };
        let Ok((tf, effect, mut invincibility, life)) = q_avatar.get_mut(e) else {
            continue;
        };
        if !life.is_active() || !effect.is_active() {
            continue;
        }
        if effect.reassert(e, &mut invincibility, &mut scheduler) {
            trace!("level-up invincibility re-asserted on {e:?}");
        }
        if let Some(mut aura_tf) = effect.aura().and_then(|a| q_aura.get_mut(a).ok()) {
            aura_tf.translation.x = tf.translation.x;
            aura_tf.translation.y = tf.translation.y;
        }
    }
}

fn end_level_up(
    mut commands: Commands,
    mut due: MessageReader<TaskDue>,
    mut scheduler: ResMut<GameScheduler>,
    mut q_avatar: Query<(&mut LevelUpEffect, &mut Invincibility, &Lifecycle)>,
    mut cues: MessageWriter<Cue>,
) {
    for TaskDue { task, .. } in due.read() {
        let Task::EndLevelUp(e) = *task else { continue };
        let Ok((mut effect, mut invincibility, life)) = q_avatar.get_mut(e) else {
            continue;
        };
        if !life.is_active() {
            continue;
        }
        if !effect.is_active() {
            continue;
        }
        if let Some(aura) = effect.finish(&mut invincibility, &mut scheduler) {
            commands.entity(aura).try_despawn();
        }
        cues.write(Cue::StopSound(SoundCue::LevelUp));
        debug!("level-up effect over on {e:?}");
    }
}

/// Adversaries overlapping the avatar during the effect.
pub fn aura_contacts(
    tunables: Res<Tunables>,
    q_avatar: Query<(&Transform, &LevelUpEffect), With<Avatar>>,
    q_adversaries: Query<(Entity, &Transform, &Lifecycle), With<Adversary>>,
    mut hits: MessageWriter<Hit>,
) {
    let Ok((avatar_tf, effect)) = q_avatar.single() else {
        return;
    };
    if !effect.is_active() {
        return;
    }
    let a = avatar_tf.translation.truncate();
    for (e, tf, life) in &q_adversaries {
        if life.is_active()
            && aabb_overlap(a, tunables.avatar.half_size, tf.translation.truncate(), tunables.adversary.half_size)
        {
            hits.write(Hit { target: e, kind: DamageKind::Aura });
        }
    }
}

#[cfg(test)]
mod tests;
