//! Entity record shared by the avatar and adversaries.
//!
//! Timed state owns the handle of the task that will end it, so whoever
//! destroys the entity can cancel that task instead of trusting the queue.

use std::time::Duration;

use bevy::prelude::*;

use crate::plugins::clock::{GameScheduler, Task, TaskHandle};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Avatar,
    Adversary,
}

impl Faction {
    /// Whether `self` may damage `other`.
    #[inline]
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Destroyed entities stay in the world until `PostUpdate` despawns them.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Active,
    Destroyed,
}

impl Lifecycle {
    #[inline]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// `true` only on the Active -> Destroyed transition.
    pub fn destroy(&mut self) -> bool {
        let was_active = self.is_active();
        *self = Self::Destroyed;
        was_active
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Facing that looks along `dx`; `None` when `dx` is zero.
    pub fn toward(dx: f32) -> Option<Self> {
        if dx < 0.0 {
            Some(Self::Left)
        } else if dx > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    /// May dip below zero until the destroy/terminal check runs.
    pub health: i32,
    pub max_health: i32,
}

impl Vitals {
    pub fn new(max_health: i32) -> Self {
        Self { health: max_health, max_health }
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.health <= 0
    }

    pub fn restore_full(&mut self) {
        self.health = self.max_health;
    }
}

/// Damage immunity window.
///
/// Windows compose by their end time: granting one that ends earlier than the
/// current window changes nothing, a later one replaces the owned timer.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Invincibility {
    until: Option<Duration>,
    timer: Option<TaskHandle>,
}

impl Invincibility {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.until.is_some()
    }

    pub fn until(&self) -> Option<Duration> {
        self.until
    }

    pub fn timer(&self) -> Option<TaskHandle> {
        self.timer
    }

    /// Returns `true` if the window was extended.
    pub fn grant(&mut self, owner: Entity, window: Duration, scheduler: &mut GameScheduler) -> bool {
        let end = scheduler.now() + window;
        if self.until.is_some_and(|until| until >= end) {
            return false;
        }
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
        self.until = Some(end);
        self.timer = Some(scheduler.schedule_once(window, Task::ClearInvincibility(owner)));
        true
    }

    /// Clear the window if its deadline has passed.
    pub fn expire(&mut self, now: Duration) -> bool {
        match self.until {
            Some(until) if until <= now => {
                self.until = None;
                self.timer = None;
                true
            }
            _ => false,
        }
    }

    pub fn release(&mut self, scheduler: &mut GameScheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
        self.until = None;
    }
}

/// Cooldown flag guarding casts.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ActionGate {
    ready: bool,
    timer: Option<TaskHandle>,
}

impl Default for ActionGate {
    fn default() -> Self {
        Self { ready: true, timer: None }
    }
}

impl ActionGate {
    #[inline]
    pub fn can_act(&self) -> bool {
        self.ready
    }

    /// Close the gate and schedule its reopening. `false` while on cooldown.
    pub fn try_begin(&mut self, owner: Entity, cooldown: Duration, scheduler: &mut GameScheduler) -> bool {
        if !self.ready {
            return false;
        }
        self.ready = false;
        self.timer = Some(scheduler.schedule_once(cooldown, Task::RestoreAction(owner)));
        true
    }

    pub fn restore(&mut self) {
        self.ready = true;
        self.timer = None;
    }

    pub fn release(&mut self, scheduler: &mut GameScheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }
}
