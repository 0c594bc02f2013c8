//! Combat resolver: the single writer of `Vitals`.
//!
//! Producers (projectile contacts, melee regions, the level-up aura) only
//! write `Hit` intents. This system rolls the damage table per hit, applies
//! it, and branches on faction for what happens next:
//!
//! ```text
//!   Hit ──> roll ──> apply_hit ──┬─ Ignored               (invincible: nothing)
//!                                ├─ Avatar hurt           -> invincibility window
//!                                ├─ Avatar defeated       -> RunStatus::terminal
//!                                └─ Adversary defeated    -> destroy, cancel timers,
//!                                                            AdversaryDefeated (once)
//! ```

use bevy::prelude::*;

use crate::common::{rng::GameRng, tunables::Tunables};
use crate::plugins::adversaries::AdversaryBrain;
use crate::plugins::clock::GameScheduler;
use crate::plugins::feedback::{Cue, SoundCue};
use crate::plugins::run::RunStatus;

use super::components::{ActionGate, Faction, Invincibility, Lifecycle, Vitals};
use super::damage::DamageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was invincible; nothing changed.
    Ignored,
    Wounded { remaining: i32 },
    Defeated { remaining: i32 },
}

/// Subtract `amount` unless the target is invincible.
///
/// Does not start an invincibility window itself: only the avatar gets one,
/// and that is the caller's faction branch.
pub fn apply_hit(vitals: &mut Vitals, invincibility: &Invincibility, amount: i32) -> HitOutcome {
    debug_assert!(amount >= 0, "negative damage {amount}");
    if invincibility.is_active() {
        return HitOutcome::Ignored;
    }
    vitals.health -= amount.max(0);
    if vitals.is_depleted() {
        HitOutcome::Defeated { remaining: vitals.health }
    } else {
        HitOutcome::Wounded { remaining: vitals.health }
    }
}

/// Damage intent.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: Entity,
    pub kind: DamageKind,
}

/// Written exactly once per destroyed adversary.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdversaryDefeated {
    pub adversary: Entity,
    pub experience: u32,
}

pub fn resolve_hits(
    mut hits: MessageReader<Hit>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<GameScheduler>,
    mut status: ResMut<RunStatus>,
    mut q_targets: Query<(
        &Faction,
        &mut Vitals,
        &mut Invincibility,
        &mut Lifecycle,
        Option<&mut ActionGate>,
        Option<&mut AdversaryBrain>,
    )>,
    mut defeated: MessageWriter<AdversaryDefeated>,
    mut cues: MessageWriter<Cue>,
) {
    for hit in hits.read() {
        let Ok((faction, mut vitals, mut invincibility, mut life, gate, brain)) =
            q_targets.get_mut(hit.target)
        else {
            trace!("hit on missing target {:?}", hit.target);
            continue;
        };
        if !life.is_active() {
            continue;
        }

        let amount = tunables.damage.roll(hit.kind, &mut *rng);
        let outcome = apply_hit(&mut vitals, &invincibility, amount);

        match (*faction, outcome) {
            (_, HitOutcome::Ignored) => {
                trace!("{:?} ignored {amount} ({:?}) while invincible", hit.target, hit.kind);
            }
            (Faction::Avatar, HitOutcome::Wounded { remaining } | HitOutcome::Defeated { remaining }) => {
                invincibility.grant(hit.target, tunables.avatar.invincibility, &mut scheduler);
                cues.write(Cue::Sound(SoundCue::Hit));
                debug!("avatar took {amount} ({:?}), health {remaining}", hit.kind);
                if matches!(outcome, HitOutcome::Defeated { .. }) {
                    info!("avatar defeated");
                    status.terminal = true;
                }
            }
            (Faction::Adversary, HitOutcome::Wounded { remaining }) => {
                debug!("adversary {:?} took {amount}, health {remaining}", hit.target);
            }
            (Faction::Adversary, HitOutcome::Defeated { .. }) => {
                if !life.destroy() {
                    continue;
                }
                invincibility.release(&mut scheduler);
                if let Some(mut gate) = gate {
                    gate.release(&mut scheduler);
                }
                if let Some(mut brain) = brain {
                    brain.release(&mut scheduler);
                }
                debug!("adversary {:?} destroyed", hit.target);
                defeated.write(AdversaryDefeated {
                    adversary: hit.target,
                    experience: tunables.adversary.experience,
                });
            }
        }
    }
}
