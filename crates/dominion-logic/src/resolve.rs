//! Rolling an espionage op or spell into an outcome.
//!
//! The formulas in [`crate::ops`] say how likely an op is to land and
//! what failure costs. This module rolls the dice and bundles every
//! consequence into an [`OpsOutcome`] the caller can apply to its
//! records: units to remove, mastery to add to the performer, and
//! resilience to add to the target.
//!
//! Success grants mastery for theft and black ops and for hostile
//! spells; info ops and info spells never do. Only hostile actions
//! raise the target's resilience.
//!
//! ```
//! use dominion_logic::config::OpsConfig;
//! use dominion_logic::dominion::{DominionState, OpsContext, SpyOpKind};
//! use dominion_logic::resolve::resolve_spy_op;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let me = DominionState { spy_ratio_offense: 1.0, ..Default::default() };
//! let undefended = DominionState::default();
//! let mut rng = StdRng::seed_from_u64(7);
//! let (ctx, config) = (OpsContext::default(), OpsConfig::default());
//! let outcome = resolve_spy_op(&me, &undefended, SpyOpKind::Info, 500, &ctx, &config, &mut rng);
//! assert!(outcome.success);
//! assert_eq!(outcome.units_lost, 0);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::OpsConfig;
use crate::dominion::{Discipline, DominionState, OpsContext, SpellKind, SpyOpKind};
use crate::ops;

/// Everything that follows from one op or spell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpsOutcome {
    pub success: bool,
    /// The success chance that was rolled against.
    pub chance: f64,
    /// Spies, assassins or wizards killed (failure only).
    pub units_lost: u64,
    /// Archmages killed (failed hostile spells only).
    pub archmages_lost: u64,
    /// Mastery gained by the performer (success only).
    pub mastery_gained: i32,
    /// Resilience gained by the target (successful hostile actions only).
    pub target_resilience_gained: i32,
}

/// Wizards and archmages committed to a spell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellCasters {
    pub wizards: u64,
    pub archmages: u64,
}

fn units_killed(sent: u64, fraction: f64) -> u64 {
    (sent as f64 * fraction.max(0.0)).floor() as u64
}

fn roll<R: Rng + ?Sized>(chance: f64, rng: &mut R) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

/// Roll a spy operation sending `units_sent` spies (or assassins for
/// black ops).
pub fn resolve_spy_op<R: Rng + ?Sized>(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpyOpKind,
    units_sent: u64,
    ctx: &OpsContext,
    config: &OpsConfig,
    rng: &mut R,
) -> OpsOutcome {
    let chance = ops::spy_op_success_chance(dominion, target, kind, config);
    let success = roll(chance, rng);
    log::debug!("spy op {:?}: chance={:.4} success={}", kind, chance, success);

    if !success {
        let fraction = match kind {
            SpyOpKind::Black => ops::assassin_losses(dominion, target, kind, ctx, config),
            SpyOpKind::Info | SpyOpKind::Theft => {
                ops::spy_losses(dominion, target, kind, ctx, config)
            }
        };
        return OpsOutcome {
            success,
            chance,
            units_lost: units_killed(units_sent, fraction),
            ..Default::default()
        };
    }

    let mastery_gained = match kind {
        SpyOpKind::Info => 0,
        SpyOpKind::Theft | SpyOpKind::Black => {
            ops::mastery_change(dominion, target, Discipline::Spy, config)
        }
    };
    let target_resilience_gained = match kind {
        SpyOpKind::Black => ops::resilience_gain(target, Discipline::Spy, config),
        SpyOpKind::Info | SpyOpKind::Theft => 0,
    };

    OpsOutcome {
        success,
        chance,
        mastery_gained,
        target_resilience_gained,
        ..Default::default()
    }
}

/// Roll a spell cast on another dominion.
pub fn resolve_spell<R: Rng + ?Sized>(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpellKind,
    casters: SpellCasters,
    ctx: &OpsContext,
    config: &OpsConfig,
    rng: &mut R,
) -> OpsOutcome {
    let chance = ops::spell_success_chance(dominion, target, kind, config);
    let success = roll(chance, rng);
    log::debug!("spell {:?}: chance={:.4} success={}", kind, chance, success);

    if !success {
        let wizards = ops::wizard_losses(dominion, target, kind, ctx, config);
        let archmages = ops::archmage_losses(dominion, target, kind, ctx, config);
        return OpsOutcome {
            success,
            chance,
            units_lost: units_killed(casters.wizards, wizards),
            archmages_lost: units_killed(casters.archmages, archmages),
            ..Default::default()
        };
    }

    match kind {
        SpellKind::Info => OpsOutcome {
            success,
            chance,
            ..Default::default()
        },
        SpellKind::Hostile => OpsOutcome {
            success,
            chance,
            mastery_gained: ops::mastery_change(dominion, target, Discipline::Wizard, config),
            target_resilience_gained: ops::resilience_gain(target, Discipline::Wizard, config),
            ..Default::default()
        },
    }
}
