//! Espionage and spell calculations.
//!
//! Everything here is a pure function of dominion snapshots, the op
//! context and an [`OpsConfig`]. The game server calls these when an op
//! is performed; the op center calls the vulnerability helpers to show
//! how exposed a target is.
//!
//! # Success chance
//!
//! Chances compare the performer's offensive ratio with the target's
//! defensive ratio, nudged by the strength difference:
//!
//! ```
//! use dominion_logic::config::OpsConfig;
//! use dominion_logic::ops::info_operation_success_chance;
//!
//! let config = OpsConfig::default();
//! let even = info_operation_success_chance(0.5, 0.5, 100.0, 100.0, &config);
//! let strong = info_operation_success_chance(1.0, 0.5, 100.0, 100.0, &config);
//! assert!(strong > even);
//! assert!(strong <= 0.98);
//! ```
//!
//! # Casualties
//!
//! A failed op kills a fraction of the units sent. The base percentage
//! comes from the ratio comparison; wizard guilds, spells, techs, spy
//! mastery and mutual war then scale it.
//!
//! # Spell vulnerability
//!
//! Fireball only reaches a slice of the peasantry and lightning only a
//! slice of improvements. Defensive wizard ratio and spires shrink that
//! slice multiplicatively.

use crate::config::{CasualtyBand, OpsConfig, SuccessCurve};
use crate::dominion::{Discipline, DominionState, OpsContext, SpellKind, SpyOpKind};
use crate::improvements::{improvement_multiplier_bonus, improvement_total, ImprovementType};

// ── Success chances ─────────────────────────────────────────────────────

/// Success bonus (or penalty) from the strength difference.
pub fn success_modifier(self_strength: f64, target_strength: f64, config: &OpsConfig) -> f64 {
    (self_strength - target_strength) / config.strength_divisor
}

fn curve_success_chance(
    curve: &SuccessCurve,
    self_ratio: f64,
    target_ratio: f64,
    self_strength: f64,
    target_strength: f64,
    config: &OpsConfig,
) -> f64 {
    // An undefended target cannot stop anything
    if target_ratio == 0.0 {
        return 1.0;
    }

    let relative_ratio = self_ratio / target_ratio;
    let chance = curve
        .base
        .powf(2.0 / (relative_ratio * curve.ratio_factor).powf(curve.exponent))
        + success_modifier(self_strength, target_strength, config);

    // Negative ratios produce NaN; treat them as hopeless.
    if chance.is_nan() {
        return curve.min;
    }
    chance.clamp(curve.min, curve.max)
}

/// Chance of success for an info operation or info spell.
pub fn info_operation_success_chance(
    self_ratio: f64,
    target_ratio: f64,
    self_strength: f64,
    target_strength: f64,
    config: &OpsConfig,
) -> f64 {
    curve_success_chance(
        &config.info_success,
        self_ratio,
        target_ratio,
        self_strength,
        target_strength,
        config,
    )
}

/// Chance of success for a theft operation.
pub fn theft_operation_success_chance(
    self_ratio: f64,
    target_ratio: f64,
    self_strength: f64,
    target_strength: f64,
    config: &OpsConfig,
) -> f64 {
    curve_success_chance(
        &config.theft_success,
        self_ratio,
        target_ratio,
        self_strength,
        target_strength,
        config,
    )
}

/// Chance of success for a black operation or hostile spell.
pub fn black_operation_success_chance(
    self_ratio: f64,
    target_ratio: f64,
    self_strength: f64,
    target_strength: f64,
    config: &OpsConfig,
) -> f64 {
    curve_success_chance(
        &config.black_success,
        self_ratio,
        target_ratio,
        self_strength,
        target_strength,
        config,
    )
}

/// Success chance for a spy op, reading ratios and strengths from the snapshots.
pub fn spy_op_success_chance(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpyOpKind,
    config: &OpsConfig,
) -> f64 {
    curve_success_chance(
        config.spy_success_curve(kind),
        dominion.spy_ratio_offense,
        target.spy_ratio_defense,
        dominion.spy_strength,
        target.spy_strength,
        config,
    )
}

/// Success chance for a spell cast on another dominion.
pub fn spell_success_chance(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpellKind,
    config: &OpsConfig,
) -> f64 {
    curve_success_chance(
        config.spell_success_curve(kind),
        dominion.wizard_ratio_offense,
        target.wizard_ratio_defense,
        dominion.wizard_strength,
        target.wizard_strength,
        config,
    )
}

// ── Casualties ──────────────────────────────────────────────────────────

/// Base casualty percentage from the defensive/offensive ratio comparison.
fn casualty_percentage(band: &CasualtyBand, self_ratio: f64, target_ratio: f64) -> f64 {
    if self_ratio <= 0.0 {
        log::warn!("casualties requested with zero offensive ratio, using band max");
        return band.max;
    }
    (band.base * (target_ratio / self_ratio)).clamp(band.min, band.max)
}

/// Casualty multiplier from wizard guilds (1.0 = no reduction).
fn guild_casualty_multiplier(dominion: &DominionState, config: &OpsConfig) -> f64 {
    let total_land = dominion.total_land();
    if total_land == 0 {
        return 1.0;
    }
    let guild_share = f64::from(dominion.building_wizard_guild) / f64::from(total_land);
    1.0 - (guild_share * config.guild_casualty_reduction).min(config.guild_casualty_reduction_max)
}

/// Fraction of spies killed after a failed operation.
pub fn spy_losses(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpyOpKind,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    let percentage = casualty_percentage(
        config.spy_casualties(kind),
        dominion.spy_ratio_offense,
        target.spy_ratio_defense,
    );

    let mut multiplier = guild_casualty_multiplier(dominion, config);
    multiplier += dominion.spy_losses_spell_perk;
    multiplier += dominion.spy_losses_tech_perk;
    multiplier += f64::from(dominion.spy_mastery) / config.mastery.scale
        * config.mastery.max_spy_loss_bonus;

    if ctx.mutual_war {
        multiplier *= config.mutual_war_casualty_multiplier;
    }

    multiplier = multiplier.max(config.spy_casualty_multiplier_floor);

    percentage / 100.0 * multiplier
}

/// Fraction of assassins killed after a failed operation.
pub fn assassin_losses(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpyOpKind,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    spy_losses(dominion, target, kind, ctx, config)
}

/// Fraction of wizards killed after a failed spell. Only hostile spells
/// cost wizards.
pub fn wizard_losses(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpellKind,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    if kind != SpellKind::Hostile {
        return 0.0;
    }

    let percentage = casualty_percentage(
        &config.hostile_wizard_casualties,
        dominion.wizard_ratio_offense,
        target.wizard_ratio_defense,
    );

    let mut multiplier = guild_casualty_multiplier(dominion, config);
    if ctx.mutual_war {
        multiplier *= config.mutual_war_casualty_multiplier;
    }

    percentage / 100.0 * multiplier
}

/// Fraction of archmages killed after a failed spell.
pub fn archmage_losses(
    dominion: &DominionState,
    target: &DominionState,
    kind: SpellKind,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    wizard_losses(dominion, target, kind, ctx, config) / config.archmage_loss_divisor
}

// ── Resilience & mastery ────────────────────────────────────────────────

/// Resilience gained by a dominion when an op lands on it, capped so
/// resilience never exceeds the maximum.
pub fn resilience_gain(
    dominion: &DominionState,
    discipline: Discipline,
    config: &OpsConfig,
) -> i32 {
    let gain = config.resilience.gain(discipline);
    let current = dominion.resilience(discipline);
    if current.saturating_add(gain) > config.resilience.max {
        return config.resilience.max.saturating_sub(current);
    }
    gain
}

/// Hourly resilience change (negative), never dropping below zero.
pub fn resilience_decay(
    dominion: &DominionState,
    discipline: Discipline,
    config: &OpsConfig,
) -> i32 {
    config
        .resilience
        .decay(discipline)
        .max(dominion.resilience(discipline).saturating_neg())
}

/// Mastery gained by `dominion` for a successful op against `target`.
///
/// Hitting a target with more mastery is worth more; hitting a much
/// weaker one is worth nothing.
pub fn mastery_change(
    dominion: &DominionState,
    target: &DominionState,
    discipline: Discipline,
    config: &OpsConfig,
) -> i32 {
    let cap = config.mastery.difference_cap.max(0);
    let mut difference = target
        .mastery(discipline)
        .saturating_sub(dominion.mastery(discipline))
        .clamp(-cap, cap);
    // Push the floor just below the rounding boundary so the largest gap yields 0.
    if difference == -cap {
        difference = difference.saturating_sub(1);
    }

    let change = (config.mastery.base_gain
        + f64::from(difference) / config.mastery.difference_divisor)
        .round();
    change.max(0.0) as i32
}

// ── Damage reduction & vulnerability ────────────────────────────────────

/// Damage reduction from the dominion's defensive spy or wizard ratio.
///
/// The ratio needed for a given reduction scales from 0.5 on day 4 to
/// 1.5 on day 44.
pub fn damage_reduction(
    dominion: &DominionState,
    discipline: Discipline,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    let ratio = dominion.defense_ratio(discipline);
    if ratio <= 0.0 {
        return 0.0;
    }

    let dr = &config.damage_reduction;
    let days = (i64::from(ctx.day_in_round) - dr.grace_days).clamp(0, dr.scaling_days.max(0));
    let days_modifier = dr.requirement_per_day * days as f64 + dr.base_requirement;
    let modified_ratio = ratio / days_modifier;

    dr.max
        .min(dr.coefficient * (1.0 + dr.ratio_multiplier * modified_ratio).log10())
}

/// Spires bonus used for spell protection.
pub fn spires_protection(dominion: &DominionState, config: &OpsConfig) -> f64 {
    improvement_multiplier_bonus(
        &dominion.improvements,
        ImprovementType::Spires,
        dominion.total_land(),
        dominion.improvement_efficiency_bonus,
        config,
    )
}

/// Combined multiplier (0–1) applied to spell damage after wizard ratio
/// and spires protection.
pub fn spell_vulnerability_protection_modifier(
    dominion: &DominionState,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    let ratio_protection = damage_reduction(dominion, Discipline::Wizard, ctx, config);
    let spires = spires_protection(dominion, config);
    (1.0 - ratio_protection) * (1.0 - spires)
}

/// Fraction of max peasants that fireball can reach.
pub fn peasant_vulnerability_modifier(
    dominion: &DominionState,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    spell_vulnerability_protection_modifier(dominion, ctx, config) * config.peasant_vulnerability
}

/// Peasants shielded from fireball damage.
pub fn peasants_protected(dominion: &DominionState, ctx: &OpsContext, config: &OpsConfig) -> i64 {
    let vulnerability = peasant_vulnerability_modifier(dominion, ctx, config);
    let max_peasants = dominion.max_peasant_population.max(0);
    (max_peasants as f64 * (1.0 - vulnerability)).round() as i64
}

/// Current peasants above the protected amount.
pub fn peasants_unprotected(dominion: &DominionState, ctx: &OpsContext, config: &OpsConfig) -> i64 {
    (dominion.peasants - peasants_protected(dominion, ctx, config)).max(0)
}

/// Peasants fireball could kill at full population.
pub fn peasants_vulnerable(dominion: &DominionState, ctx: &OpsContext, config: &OpsConfig) -> i64 {
    let max_peasants = dominion.max_peasant_population.max(0);
    (max_peasants - peasants_protected(dominion, ctx, config)).max(0)
}

/// Fraction of improvements that lightning can reach.
pub fn improvement_vulnerability_modifier(
    dominion: &DominionState,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> f64 {
    spell_vulnerability_protection_modifier(dominion, ctx, config)
        * config.improvement_vulnerability
}

/// Improvement points shielded from lightning, based on lifetime investment.
pub fn improvements_protected(
    dominion: &DominionState,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> i64 {
    let vulnerability = improvement_vulnerability_modifier(dominion, ctx, config);
    let investments =
        (dominion.stat_total_investment - dominion.improvements.indestructible()).max(0);
    (investments as f64 * (1.0 - vulnerability)).round() as i64
}

fn unprotected_share(
    dominion: &DominionState,
    destroyable: i64,
    protected: i64,
    improvement: Option<ImprovementType>,
) -> i64 {
    if destroyable == 0 {
        return 0;
    }

    let modifier = match improvement {
        Some(t) => (dominion.improvements.get(t) as f64 / destroyable as f64).max(0.0),
        None => 1.0,
    };

    ((destroyable - protected) as f64 * modifier).round().max(0.0) as i64
}

/// Current improvement points lightning can destroy right now, optionally
/// limited to one improvement's share.
pub fn improvements_unprotected(
    dominion: &DominionState,
    improvement: Option<ImprovementType>,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> i64 {
    let protected = improvements_protected(dominion, ctx, config);
    let destroyable =
        improvement_total(&dominion.improvements) - dominion.improvements.indestructible();
    unprotected_share(dominion, destroyable, protected, improvement)
}

/// Improvement points lightning could destroy at full investment,
/// optionally limited to one improvement's share.
pub fn improvements_vulnerable(
    dominion: &DominionState,
    improvement: Option<ImprovementType>,
    ctx: &OpsContext,
    config: &OpsConfig,
) -> i64 {
    let protected = improvements_protected(dominion, ctx, config);
    let destroyable = dominion.stat_total_investment - dominion.improvements.indestructible();
    unprotected_share(dominion, destroyable, protected, improvement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::improvements::Improvements;
    use crate::land::Land;

    const EPS: f64 = 1e-9;

    fn config() -> OpsConfig {
        OpsConfig::default()
    }

    fn dominion() -> DominionState {
        DominionState {
            land: Land::even(100), // 700 acres
            spy_ratio_offense: 0.5,
            spy_ratio_defense: 0.5,
            wizard_ratio_offense: 0.5,
            wizard_ratio_defense: 0.5,
            spy_strength: 100.0,
            wizard_strength: 100.0,
            ..Default::default()
        }
    }

    // ── success ──

    #[test]
    fn success_modifier_scales_by_thousand() {
        assert!((success_modifier(100.0, 70.0, &config()) - 0.03).abs() < EPS);
        assert!((success_modifier(70.0, 100.0, &config()) + 0.03).abs() < EPS);
    }

    #[test]
    fn undefended_target_always_succeeds() {
        let c = config();
        assert!((info_operation_success_chance(0.1, 0.0, 0.0, 100.0, &c) - 1.0).abs() < EPS);
        assert!((theft_operation_success_chance(0.1, 0.0, 0.0, 100.0, &c) - 1.0).abs() < EPS);
        assert!((black_operation_success_chance(0.1, 0.0, 0.0, 100.0, &c) - 1.0).abs() < EPS);
    }

    #[test]
    fn info_chance_at_equal_ratios() {
        let c = config();
        let expected = 0.8f64.powf(2.0 / 1.4f64.powf(1.2));
        let chance = info_operation_success_chance(0.5, 0.5, 100.0, 100.0, &c);
        assert!((chance - expected).abs() < EPS);
    }

    #[test]
    fn black_chance_at_equal_ratios() {
        let c = config();
        let expected = 0.7f64.powf(2.0 / 1.3f64.powf(1.2));
        let chance = black_operation_success_chance(1.0, 1.0, 100.0, 100.0, &c);
        assert!((chance - expected).abs() < EPS);
        let theft = theft_operation_success_chance(1.0, 1.0, 100.0, 100.0, &c);
        assert!((chance - theft).abs() < EPS);
    }

    #[test]
    fn chances_clamped() {
        let c = config();
        assert!((info_operation_success_chance(100.0, 0.01, 100.0, 0.0, &c) - 0.98).abs() < EPS);
        assert!((theft_operation_success_chance(100.0, 0.01, 100.0, 0.0, &c) - 0.97).abs() < EPS);
        assert!((black_operation_success_chance(0.001, 5.0, 0.0, 100.0, &c) - 0.01).abs() < EPS);
    }

    #[test]
    fn zero_offense_hits_floor() {
        let c = config();
        assert!((info_operation_success_chance(0.0, 0.5, 100.0, 100.0, &c) - 0.01).abs() < EPS);
    }

    #[test]
    fn strength_shifts_chance() {
        let c = config();
        let full = black_operation_success_chance(0.5, 0.5, 100.0, 100.0, &c);
        let tired = black_operation_success_chance(0.5, 0.5, 60.0, 100.0, &c);
        assert!((full - tired - 0.04).abs() < EPS);
    }

    #[test]
    fn snapshot_chances_use_right_ratios() {
        let c = config();
        let mut me = dominion();
        me.spy_ratio_offense = 1.0;
        me.wizard_ratio_offense = 0.25;
        let them = dominion();
        let spy = spy_op_success_chance(&me, &them, SpyOpKind::Theft, &c);
        assert!((spy - theft_operation_success_chance(1.0, 0.5, 100.0, 100.0, &c)).abs() < EPS);
        let spell = spell_success_chance(&me, &them, SpellKind::Hostile, &c);
        assert!((spell - black_operation_success_chance(0.25, 0.5, 100.0, 100.0, &c)).abs() < EPS);
        let info = spell_success_chance(&me, &them, SpellKind::Info, &c);
        assert!((info - info_operation_success_chance(0.25, 0.5, 100.0, 100.0, &c)).abs() < EPS);
    }

    // ── casualties ──

    #[test]
    fn spy_losses_equal_ratio_no_modifiers() {
        let c = config();
        let ctx = OpsContext::default();
        let d = dominion();
        assert!((spy_losses(&d, &d, SpyOpKind::Theft, &ctx, &c) - 0.01).abs() < EPS);
        assert!((spy_losses(&d, &d, SpyOpKind::Black, &ctx, &c) - 0.01).abs() < EPS);
        assert!((spy_losses(&d, &d, SpyOpKind::Info, &ctx, &c) - 0.0025).abs() < EPS);
    }

    #[test]
    fn spy_losses_band_clamped() {
        let c = config();
        let ctx = OpsContext::default();
        let me = dominion();
        let mut fortress = dominion();
        fortress.spy_ratio_defense = 10.0;
        // 1% * 20 clamped to 1.5%
        assert!((spy_losses(&me, &fortress, SpyOpKind::Black, &ctx, &c) - 0.015).abs() < EPS);
        // 0.25% * 20 clamped to 1%
        assert!((spy_losses(&me, &fortress, SpyOpKind::Info, &ctx, &c) - 0.01).abs() < EPS);

        let mut open = dominion();
        open.spy_ratio_defense = 0.01;
        assert!((spy_losses(&me, &open, SpyOpKind::Theft, &ctx, &c) - 0.005).abs() < EPS);
    }

    #[test]
    fn guilds_reduce_losses_up_to_cap() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.building_wizard_guild = 35; // 5% of land * 2.5 = 12.5%
        let target = dominion();
        assert!((spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c) - 0.00875).abs() < EPS);

        me.building_wizard_guild = 350; // capped at 25%
        assert!((spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c) - 0.0075).abs() < EPS);
    }

    #[test]
    fn landless_guilds_give_no_reduction() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.land = Land::default();
        me.building_wizard_guild = 50;
        let target = dominion();
        assert!((spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c) - 0.01).abs() < EPS);
        assert!((wizard_losses(&me, &target, SpellKind::Hostile, &ctx, &c) - 0.01).abs() < EPS);
    }

    #[test]
    fn mastery_and_perks_reduce_spy_losses() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.spy_mastery = 500; // -25%
        me.spy_losses_spell_perk = -0.25;
        let target = dominion();
        // multiplier 1 - 0.25 - 0.25 = 0.5
        assert!((spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c) - 0.005).abs() < EPS);
    }

    #[test]
    fn spy_loss_multiplier_floor() {
        let c = config();
        let ctx = OpsContext {
            mutual_war: true,
            ..Default::default()
        };
        let mut me = dominion();
        me.spy_mastery = 1000;
        me.spy_losses_spell_perk = -0.25;
        me.spy_losses_tech_perk = -0.25;
        let target = dominion();
        assert!((spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c) - 0.002).abs() < EPS);
    }

    #[test]
    fn mutual_war_reduces_losses() {
        let c = config();
        let peace = OpsContext::default();
        let war = OpsContext {
            mutual_war: true,
            ..Default::default()
        };
        let d = dominion();
        let at_peace = spy_losses(&d, &d, SpyOpKind::Black, &peace, &c);
        let at_war = spy_losses(&d, &d, SpyOpKind::Black, &war, &c);
        assert!((at_war - at_peace * 0.8).abs() < EPS);

        let wiz_peace = wizard_losses(&d, &d, SpellKind::Hostile, &peace, &c);
        let wiz_war = wizard_losses(&d, &d, SpellKind::Hostile, &war, &c);
        assert!((wiz_war - wiz_peace * 0.8).abs() < EPS);
    }

    #[test]
    fn assassins_match_spies() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.building_wizard_guild = 20;
        let mut target = dominion();
        target.spy_ratio_defense = 0.8;
        assert!(
            (assassin_losses(&me, &target, SpyOpKind::Black, &ctx, &c)
                - spy_losses(&me, &target, SpyOpKind::Black, &ctx, &c))
            .abs()
                < EPS
        );
    }

    #[test]
    fn only_hostile_spells_lose_wizards() {
        let c = config();
        let ctx = OpsContext::default();
        let d = dominion();
        assert!(wizard_losses(&d, &d, SpellKind::Info, &ctx, &c).abs() < EPS);
        assert!(archmage_losses(&d, &d, SpellKind::Info, &ctx, &c).abs() < EPS);
        assert!((wizard_losses(&d, &d, SpellKind::Hostile, &ctx, &c) - 0.01).abs() < EPS);
    }

    #[test]
    fn wizard_losses_ignore_spy_mastery_and_perks() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.spy_mastery = 1000;
        me.spy_losses_spell_perk = -0.5;
        let target = dominion();
        assert!((wizard_losses(&me, &target, SpellKind::Hostile, &ctx, &c) - 0.01).abs() < EPS);
    }

    #[test]
    fn archmages_lose_a_tenth() {
        let c = config();
        let ctx = OpsContext::default();
        let me = dominion();
        let mut target = dominion();
        target.wizard_ratio_defense = 0.6;
        let wizards = wizard_losses(&me, &target, SpellKind::Hostile, &ctx, &c);
        let archmages = archmage_losses(&me, &target, SpellKind::Hostile, &ctx, &c);
        assert!((archmages - wizards / 10.0).abs() < EPS);
    }

    #[test]
    fn zero_offense_losses_use_band_max() {
        let c = config();
        let ctx = OpsContext::default();
        let mut me = dominion();
        me.spy_ratio_offense = 0.0;
        let target = dominion();
        assert!((spy_losses(&me, &target, SpyOpKind::Theft, &ctx, &c) - 0.015).abs() < EPS);
    }

    // ── resilience ──

    #[test]
    fn resilience_gain_normal() {
        let c = config();
        let d = dominion();
        assert_eq!(resilience_gain(&d, Discipline::Spy, &c), 10);
        assert_eq!(resilience_gain(&d, Discipline::Wizard, &c), 12);
    }

    #[test]
    fn resilience_gain_capped() {
        let c = config();
        let mut d = dominion();
        d.spy_resilience = 995;
        d.wizard_resilience = 1000;
        assert_eq!(resilience_gain(&d, Discipline::Spy, &c), 5);
        assert_eq!(resilience_gain(&d, Discipline::Wizard, &c), 0);
        d.spy_resilience = 990;
        assert_eq!(resilience_gain(&d, Discipline::Spy, &c), 10);
    }

    #[test]
    fn resilience_decay_floored() {
        let c = config();
        let mut d = dominion();
        d.spy_resilience = 500;
        d.wizard_resilience = 3;
        assert_eq!(resilience_decay(&d, Discipline::Spy, &c), -8);
        assert_eq!(resilience_decay(&d, Discipline::Wizard, &c), -3);
        d.wizard_resilience = 0;
        assert_eq!(resilience_decay(&d, Discipline::Wizard, &c), 0);
    }

    #[test]
    fn resilience_extremes_saturate() {
        let c = config();
        let mut d = dominion();
        d.spy_resilience = i32::MIN;
        d.wizard_resilience = i32::MAX;
        assert_eq!(resilience_gain(&d, Discipline::Spy, &c), 10);
        assert_eq!(resilience_gain(&d, Discipline::Wizard, &c), 1000 - i32::MAX);
        // lifting back toward zero, clipped to the i32 range
        assert_eq!(resilience_decay(&d, Discipline::Spy, &c), i32::MAX);
        assert_eq!(resilience_decay(&d, Discipline::Wizard, &c), -5);
    }

    // ── mastery ──

    #[test]
    fn mastery_change_table() {
        let c = config();
        let me = dominion();
        let mut target = dominion();
        let cases = [
            (0, 3),
            (100, 4),     // 3.5 rounds away from zero
            (500, 6),     // 5.5 → 6
            (2000, 6),    // capped at +500
            (-100, 3),    // 2.5 → 3
            (-300, 2),    // 1.5 → 2
            (-499, 1),    // 0.505 → 1
            (-500, 0),    // -501 → 0.495 → 0
            (-5000, 0),   // clamped
        ];
        for (target_mastery, expected) in cases {
            target.spy_mastery = target_mastery;
            assert_eq!(
                mastery_change(&me, &target, Discipline::Spy, &c),
                expected,
                "target mastery {}",
                target_mastery
            );
        }
    }

    #[test]
    fn mastery_extremes_saturate() {
        let c = config();
        let mut me = dominion();
        let mut target = dominion();
        me.spy_mastery = i32::MIN;
        target.spy_mastery = i32::MAX;
        assert_eq!(mastery_change(&me, &target, Discipline::Spy, &c), 6);
        me.spy_mastery = i32::MAX;
        target.spy_mastery = i32::MIN;
        assert_eq!(mastery_change(&me, &target, Discipline::Spy, &c), 0);
    }

    #[test]
    fn hand_built_negative_limits_do_not_panic() {
        let mut c = config();
        c.mastery.difference_cap = -1;
        c.damage_reduction.scaling_days = -1;
        let d = dominion();
        // cap treated as 0: gap -1 → 2.995 → 3
        assert_eq!(mastery_change(&d, &d, Discipline::Spy, &c), 3);
        // no scaling: requirement stays at 0.5
        let mut defender = dominion();
        defender.spy_ratio_defense = 0.25;
        let ctx = OpsContext {
            mutual_war: false,
            day_in_round: 30,
        };
        let reduction = damage_reduction(&defender, Discipline::Spy, &ctx, &c);
        assert!((reduction - 0.72 * 3.0f64.log10()).abs() < EPS);
    }

    #[test]
    fn mastery_uses_discipline() {
        let c = config();
        let me = dominion();
        let target = DominionState {
            wizard_mastery: 400,
            ..dominion()
        };
        assert_eq!(mastery_change(&me, &target, Discipline::Wizard, &c), 5);
        assert_eq!(mastery_change(&me, &target, Discipline::Spy, &c), 3);
    }

    // ── damage reduction ──

    #[test]
    fn no_ratio_no_reduction() {
        let c = config();
        let mut d = dominion();
        d.wizard_ratio_defense = 0.0;
        let ctx = OpsContext {
            day_in_round: 20,
            ..Default::default()
        };
        assert!(damage_reduction(&d, Discipline::Wizard, &ctx, &c).abs() < EPS);
    }

    #[test]
    fn damage_reduction_curve() {
        let c = config();
        let d = dominion(); // ratio 0.5
        let early = OpsContext {
            day_in_round: 2,
            ..Default::default()
        };
        // modifier 0.5 → ratio 1.0 → 0.72 * log10(5) ≈ 0.503 → capped 0.5
        assert!((damage_reduction(&d, Discipline::Spy, &early, &c) - 0.5).abs() < EPS);

        let mid = OpsContext {
            day_in_round: 24,
            ..Default::default()
        };
        // modifier 1.0 → ratio 0.5 → 0.72 * log10(3)
        let expected = 0.72 * 3.0f64.log10();
        assert!((damage_reduction(&d, Discipline::Spy, &mid, &c) - expected).abs() < EPS);

        let late = OpsContext {
            day_in_round: 80,
            ..Default::default()
        };
        // modifier capped at 1.5
        let expected = 0.72 * (1.0 + 4.0 * 0.5 / 1.5f64).log10();
        assert!((damage_reduction(&d, Discipline::Wizard, &late, &c) - expected).abs() < EPS);
    }

    // ── vulnerability ──

    #[test]
    fn unprotected_dominion_vulnerability() {
        let c = config();
        let ctx = OpsContext::default();
        let d = DominionState {
            wizard_ratio_defense: 0.0,
            max_peasant_population: 10_000,
            peasants: 9_000,
            ..dominion()
        };
        assert!((spell_vulnerability_protection_modifier(&d, &ctx, &c) - 1.0).abs() < EPS);
        assert!((peasant_vulnerability_modifier(&d, &ctx, &c) - 0.5).abs() < EPS);
        assert_eq!(peasants_protected(&d, &ctx, &c), 5_000);
        assert_eq!(peasants_unprotected(&d, &ctx, &c), 4_000);
        assert_eq!(peasants_vulnerable(&d, &ctx, &c), 5_000);
    }

    #[test]
    fn peasants_below_protection_are_safe() {
        let c = config();
        let ctx = OpsContext::default();
        let d = DominionState {
            wizard_ratio_defense: 0.0,
            max_peasant_population: 10_000,
            peasants: 3_000,
            ..dominion()
        };
        assert_eq!(peasants_unprotected(&d, &ctx, &c), 0);
    }

    #[test]
    fn negative_max_peasants_treated_as_zero() {
        let c = config();
        let ctx = OpsContext::default();
        let d = DominionState {
            max_peasant_population: -50,
            peasants: 10,
            ..dominion()
        };
        assert_eq!(peasants_protected(&d, &ctx, &c), 0);
        assert_eq!(peasants_vulnerable(&d, &ctx, &c), 0);
        assert_eq!(peasants_unprotected(&d, &ctx, &c), 10);
    }

    #[test]
    fn wizard_ratio_and_spires_stack() {
        let c = config();
        let ctx = OpsContext {
            day_in_round: 24,
            ..Default::default()
        };
        let d = DominionState {
            improvements: Improvements {
                spires: 400_000,
                ..Default::default()
            },
            ..dominion()
        };
        let ratio = damage_reduction(&d, Discipline::Wizard, &ctx, &c);
        let spires = spires_protection(&d, &c);
        assert!(spires > 0.0);
        let modifier = spell_vulnerability_protection_modifier(&d, &ctx, &c);
        assert!((modifier - (1.0 - ratio) * (1.0 - spires)).abs() < EPS);
        assert!(modifier < 1.0 - ratio);
    }

    fn invested() -> DominionState {
        DominionState {
            wizard_ratio_defense: 0.0,
            stat_total_investment: 120_000,
            improvements: Improvements {
                science: 20_000,
                keep: 30_000,
                walls: 50_000,
                spires: 10_000,
                harbor: 10_000,
                ..Default::default()
            },
            ..dominion()
        }
    }

    #[test]
    fn improvements_protection() {
        let c = OpsConfig {
            // keep spires out of the arithmetic
            improvements: crate::improvements::ImprovementConfig {
                spires: crate::improvements::ImprovementCurve {
                    maximum: 0.0,
                    coefficient: 5000.0,
                },
                ..Default::default()
            },
            ..config()
        };
        let ctx = OpsContext::default();
        let d = invested();
        assert!((improvement_vulnerability_modifier(&d, &ctx, &c) - 0.25).abs() < EPS);
        // (120k - 20k) * 0.75
        assert_eq!(improvements_protected(&d, &ctx, &c), 75_000);
        // current destroyable 100k - 75k
        assert_eq!(improvements_unprotected(&d, None, &ctx, &c), 25_000);
        assert_eq!(improvements_vulnerable(&d, None, &ctx, &c), 25_000);
        // walls hold half of the destroyable points
        assert_eq!(
            improvements_unprotected(&d, Some(ImprovementType::Walls), &ctx, &c),
            12_500
        );
    }

    #[test]
    fn damaged_improvements_below_protection() {
        let c = OpsConfig {
            improvements: crate::improvements::ImprovementConfig {
                spires: crate::improvements::ImprovementCurve {
                    maximum: 0.0,
                    coefficient: 5000.0,
                },
                ..Default::default()
            },
            ..config()
        };
        let ctx = OpsContext::default();
        let mut d = invested();
        // lightning has already taken the keep
        d.improvements.keep = 0;
        assert_eq!(improvements_unprotected(&d, None, &ctx, &c), 0);
        assert_eq!(improvements_vulnerable(&d, None, &ctx, &c), 25_000);
    }

    #[test]
    fn nothing_destroyable() {
        let c = config();
        let ctx = OpsContext::default();
        let d = DominionState {
            stat_total_investment: 20_000,
            improvements: Improvements {
                spires: 10_000,
                harbor: 10_000,
                ..Default::default()
            },
            ..dominion()
        };
        assert_eq!(improvements_unprotected(&d, None, &ctx, &c), 0);
        assert_eq!(improvements_vulnerable(&d, Some(ImprovementType::Keep), &ctx, &c), 0);
    }
}
