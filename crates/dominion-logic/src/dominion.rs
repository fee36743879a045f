//! Dominion snapshot and operation kinds.
//!
//! The calculators never see the full game record. Callers copy the
//! numeric fields they need into a [`DominionState`] (ratios are already
//! derived from units and land by the military layer) and pass an
//! [`OpsContext`] describing the surrounding round and realms.

use serde::{Deserialize, Serialize};

use crate::improvements::Improvements;
use crate::land::Land;

/// Which half of the ops model a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Spy,
    Wizard,
}

/// Espionage operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpyOpKind {
    /// Information gathering (castle spy, survey dominion, ...).
    Info,
    /// Resource theft.
    Theft,
    /// Hostile sabotage and assassination.
    Black,
}

/// Spell categories that target another dominion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellKind {
    /// Clear sight, vision, revelation.
    Info,
    /// Fireball, lightning bolt, plague, ...
    Hostile,
}

/// Numeric snapshot of a dominion as seen by the ops calculators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DominionState {
    pub land: Land,
    pub building_wizard_guild: u32,

    pub peasants: i64,
    pub max_peasant_population: i64,

    /// Spies (and assassins) per acre, with offensive modifiers applied.
    pub spy_ratio_offense: f64,
    pub spy_ratio_defense: f64,
    pub wizard_ratio_offense: f64,
    pub wizard_ratio_defense: f64,

    /// Spy/wizard strength, in percent (0–100).
    pub spy_strength: f64,
    pub wizard_strength: f64,

    /// Resilience (0–1000), gained when targeted and decaying hourly.
    pub spy_resilience: i32,
    pub wizard_resilience: i32,
    /// Mastery, gained from successful hostile ops.
    pub spy_mastery: i32,
    pub wizard_mastery: i32,

    /// Additive `spy_losses` multipliers from active spells and techs
    /// (-0.25 = 25% fewer spies lost).
    pub spy_losses_spell_perk: f64,
    pub spy_losses_tech_perk: f64,

    /// Lifetime points invested into improvements.
    pub stat_total_investment: i64,
    pub improvements: Improvements,
    /// Extra improvement efficiency from masonries and perks.
    pub improvement_efficiency_bonus: f64,
}

impl DominionState {
    pub fn total_land(&self) -> u32 {
        self.land.total()
    }

    pub fn resilience(&self, discipline: Discipline) -> i32 {
        match discipline {
            Discipline::Spy => self.spy_resilience,
            Discipline::Wizard => self.wizard_resilience,
        }
    }

    pub fn mastery(&self, discipline: Discipline) -> i32 {
        match discipline {
            Discipline::Spy => self.spy_mastery,
            Discipline::Wizard => self.wizard_mastery,
        }
    }

    pub fn offense_ratio(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Spy => self.spy_ratio_offense,
            Discipline::Wizard => self.wizard_ratio_offense,
        }
    }

    pub fn defense_ratio(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Spy => self.spy_ratio_defense,
            Discipline::Wizard => self.wizard_ratio_defense,
        }
    }

    pub fn strength(&self, discipline: Discipline) -> f64 {
        match discipline {
            Discipline::Spy => self.spy_strength,
            Discipline::Wizard => self.wizard_strength,
        }
    }
}

/// Facts about the round and the two realms involved in an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsContext {
    /// Both realms have declared war on each other.
    pub mutual_war: bool,
    /// Current day of the round (day 1 is the first day).
    pub day_in_round: u32,
}
