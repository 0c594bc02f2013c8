use std::time::Duration;

use bevy::prelude::*;

use crate::plugins::clock::{GameScheduler, Task, TaskHandle};
use crate::plugins::combat::{Faction, Lifecycle};

/// A spell in flight. Its `Lifecycle` is the Active/Destroyed state.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub owner: Faction,
    expiry: Option<TaskHandle>,
}

impl Projectile {
    pub fn new(owner: Faction, expiry: TaskHandle) -> Self {
        Self { owner, expiry: Some(expiry) }
    }

    pub fn expiry(&self) -> Option<TaskHandle> {
        self.expiry
    }

    /// Destroy the projectile and cancel its expiry. Later calls are no-ops.
    pub fn retire(&mut self, life: &mut Lifecycle, scheduler: &mut GameScheduler) -> bool {
        if !life.destroy() {
            return false;
        }
        if let Some(expiry) = self.expiry.take() {
            scheduler.cancel(expiry);
        }
        true
    }

    /// Bring the expiry forward to `delay` from now. Never pushes it back.
    pub fn expire_within(&mut self, me: Entity, delay: Duration, scheduler: &mut GameScheduler) -> bool {
        let target = scheduler.now() + delay;
        if let Some(current) = self.expiry.and_then(|h| scheduler.deadline(h)) {
            if current <= target {
                return false;
            }
        }
        if let Some(old) = self.expiry.take() {
            scheduler.cancel(old);
        }
        self.expiry = Some(scheduler.schedule_once(delay, Task::ExpireProjectile(me)));
        true
    }
}
