//! Per-adversary behavior: a pure transition function plus the record it drives.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::tunables::AdversaryTunables;
use crate::plugins::clock::{GameScheduler, Task, TaskHandle};
use crate::plugins::combat::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    #[default]
    Idle,
    Chasing,
    Attacking,
    Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Swing {
    timer: TaskHandle,
    region: Entity,
}

#[derive(Component, Debug, Default, Clone, PartialEq)]
pub struct AdversaryBrain {
    pub state: BehaviorState,
    swing: Option<Swing>,
}

impl AdversaryBrain {
    /// A melee swing is in flight.
    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.swing.is_some()
    }

    pub fn region(&self) -> Option<Entity> {
        self.swing.map(|s| s.region)
    }

    /// Track a swing and schedule its end. `false` if one is already running.
    pub fn begin_swing(
        &mut self,
        owner: Entity,
        region: Entity,
        window: Duration,
        scheduler: &mut GameScheduler,
    ) -> bool {
        if self.is_attacking() {
            return false;
        }
        let timer = scheduler.schedule_once(window, Task::EndMeleeSwing { adversary: owner, region });
        self.swing = Some(Swing { timer, region });
        self.state = BehaviorState::Attacking;
        true
    }

    /// Swing window over: back to re-evaluation from Idle.
    pub fn end_swing(&mut self) -> Option<Entity> {
        let swing = self.swing.take()?;
        self.state = BehaviorState::Idle;
        Some(swing.region)
    }

    /// Owner destroyed: cancel the swing timer. The region is left to orphan cleanup.
    pub fn release(&mut self, scheduler: &mut GameScheduler) {
        if let Some(swing) = self.swing.take() {
            scheduler.cancel(swing.timer);
        }
    }
}

/// What an adversary knows this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Senses {
    /// Avatar x minus own x.
    pub dx: f32,
    pub grounded: bool,
    pub attacking: bool,
    /// The per-tick jump draw came up.
    pub jump_roll: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub state: BehaviorState,
    pub facing: Option<Facing>,
    /// `None` keeps the current horizontal velocity.
    pub velocity_x: Option<f32>,
    pub start_swing: bool,
    pub jump: bool,
}

/// One tick of the state machine.
///
/// Attacking wins whenever the near threshold is met; mid-air adversaries keep
/// their momentum until they land.
pub fn decide(senses: &Senses, cfg: &AdversaryTunables, chase_speed: f32) -> Decision {
    let facing = Facing::toward(senses.dx);
    let hold = |state, velocity_x| Decision { state, facing, velocity_x, start_swing: false, jump: false };

    if senses.attacking {
        return hold(BehaviorState::Attacking, senses.grounded.then_some(0.0));
    }
    if !senses.grounded {
        return hold(BehaviorState::Airborne, None);
    }

    let distance = senses.dx.abs();
    if distance < cfg.near_threshold {
        return Decision { start_swing: true, ..hold(BehaviorState::Attacking, Some(0.0)) };
    }

    let mut decision = if distance > cfg.far_threshold {
        hold(BehaviorState::Chasing, Some(senses.dx.signum() * chase_speed))
    } else {
        hold(BehaviorState::Idle, Some(0.0))
    };
    if senses.jump_roll {
        decision.state = BehaviorState::Airborne;
        decision.jump = true;
    }
    decision
}
