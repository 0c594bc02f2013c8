//! Damage table: what a hit of each kind is worth.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::common::error::TunablesError;
use crate::common::rng::draw_inclusive as draw;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageKind {
    /// Adversary melee region touching the avatar.
    Contact,
    /// Adversary spell striking the avatar.
    Spell,
    /// Avatar spell striking an adversary.
    Avatar,
    /// Adversary touching the avatar during the level-up effect.
    Aura,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageTable {
    pub contact: RangeInclusive<i32>,
    pub spell: RangeInclusive<i32>,
    pub avatar: RangeInclusive<i32>,
    pub aura: i32,
}

impl Default for DamageTable {
    fn default() -> Self {
        Self {
            contact: 5..=9,
            spell: 10..=15,
            avatar: 100..=200,
            aura: 9999,
        }
    }
}

impl DamageTable {
    /// Fresh uniform draw for one hit. Never negative.
    pub fn roll(&self, kind: DamageKind, rng: &mut impl Rng) -> i32 {
        let amount = match kind {
            DamageKind::Contact => draw(&self.contact, rng),
            DamageKind::Spell => draw(&self.spell, rng),
            DamageKind::Avatar => draw(&self.avatar, rng),
            DamageKind::Aura => self.aura,
        };
        amount.max(0)
    }

    /// Contact rolls < spell rolls < avatar rolls, all bands non-empty.
    pub fn validate(&self) -> Result<(), TunablesError> {
        for (name, band) in [("contact", &self.contact), ("spell", &self.spell), ("avatar", &self.avatar)] {
            if band.start() > band.end() || *band.start() < 0 {
                return Err(TunablesError::EmptyRange {
                    name,
                    start: *band.start() as f32,
                    end: *band.end() as f32,
                });
            }
        }
        if self.contact.end() >= self.spell.start() {
            return Err(TunablesError::DamageOrdering { lower: "contact", upper: "spell" });
        }
        if self.spell.end() >= self.avatar.start() {
            return Err(TunablesError::DamageOrdering { lower: "spell", upper: "avatar" });
        }
        Ok(())
    }
}
