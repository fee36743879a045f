//! Tunable constants for the ops model.
//!
//! Every number the calculators use lives in [`OpsConfig`]. The default
//! is the live game balance; rounds with custom balance load overrides
//! from JSON, where any omitted field keeps its default.
//!
//! ```
//! use dominion_logic::config::{validate_config, OpsConfig};
//!
//! let config = OpsConfig::from_json(r#"{ "peasant_vulnerability": 0.4 }"#).unwrap();
//! assert!((config.peasant_vulnerability - 0.4).abs() < 1e-12);
//! assert!(validate_config(&OpsConfig::default()).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dominion::{Discipline, SpellKind, SpyOpKind};
use crate::error::OpsError;
use crate::improvements::ImprovementConfig;

/// Shape of a success-chance curve:
/// `base ^ (2 / ((relative_ratio * ratio_factor) ^ exponent))`, clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessCurve {
    pub base: f64,
    pub ratio_factor: f64,
    pub exponent: f64,
    pub min: f64,
    pub max: f64,
}

/// Casualty percentages for a failed operation, before multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CasualtyBand {
    /// Percentage lost at equal ratios.
    pub base: f64,
    pub min: f64,
    pub max: f64,
}

/// Resilience gain per op received and hourly decay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    pub spy_gain: i32,
    pub wizard_gain: i32,
    /// Negative: resilience lost per hour.
    pub spy_decay: i32,
    pub wizard_decay: i32,
    pub max: i32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            spy_gain: 10,
            wizard_gain: 12,
            spy_decay: -8,
            wizard_decay: -5,
            max: 1000,
        }
    }
}

impl ResilienceConfig {
    pub fn gain(&self, discipline: Discipline) -> i32 {
        match discipline {
            Discipline::Spy => self.spy_gain,
            Discipline::Wizard => self.wizard_gain,
        }
    }

    pub fn decay(&self, discipline: Discipline) -> i32 {
        match discipline {
            Discipline::Spy => self.spy_decay,
            Discipline::Wizard => self.wizard_decay,
        }
    }
}

/// Logarithmic damage-reduction curve from defensive ratio.
///
/// The ratio needed for full protection scales with the round: from
/// `base_requirement` on day `grace_days` up by `requirement_per_day`
/// for `scaling_days` days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageReductionConfig {
    pub grace_days: i64,
    pub scaling_days: i64,
    pub base_requirement: f64,
    pub requirement_per_day: f64,
    pub coefficient: f64,
    pub ratio_multiplier: f64,
    pub max: f64,
}

impl Default for DamageReductionConfig {
    fn default() -> Self {
        Self {
            grace_days: 4,
            scaling_days: 40,
            base_requirement: 0.5,
            requirement_per_day: 0.025,
            coefficient: 0.72,
            ratio_multiplier: 4.0,
            max: 0.5,
        }
    }
}

/// Mastery awarded for a successful op, scaled by the mastery gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    pub base_gain: f64,
    /// Mastery gap is clamped to `±difference_cap`.
    pub difference_cap: i32,
    pub difference_divisor: f64,
    /// Mastery at which the spy-loss reduction is fully applied.
    pub scale: f64,
    /// Spy-loss multiplier change at `scale` mastery (-0.5 = -50%).
    pub max_spy_loss_bonus: f64,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            base_gain: 3.0,
            difference_cap: 500,
            difference_divisor: 200.0,
            scale: 1000.0,
            max_spy_loss_bonus: -0.5,
        }
    }
}

/// All tunable constants of the ops model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    /// Divisor turning a strength difference into a success bonus.
    pub strength_divisor: f64,
    pub info_success: SuccessCurve,
    pub theft_success: SuccessCurve,
    pub black_success: SuccessCurve,

    pub info_spy_casualties: CasualtyBand,
    pub theft_spy_casualties: CasualtyBand,
    pub black_spy_casualties: CasualtyBand,
    pub hostile_wizard_casualties: CasualtyBand,

    /// Casualty reduction per fraction of land built as wizard guilds.
    pub guild_casualty_reduction: f64,
    pub guild_casualty_reduction_max: f64,
    pub mutual_war_casualty_multiplier: f64,
    /// Lowest the spy casualty multiplier can go after all bonuses.
    pub spy_casualty_multiplier_floor: f64,
    pub archmage_loss_divisor: f64,

    pub resilience: ResilienceConfig,
    pub damage_reduction: DamageReductionConfig,
    pub mastery: MasteryConfig,

    /// Fraction of max peasants exposed to fireball before protection.
    pub peasant_vulnerability: f64,
    /// Fraction of improvements exposed to lightning before protection.
    pub improvement_vulnerability: f64,
    pub improvements: ImprovementConfig,
}

impl Default for OpsConfig {
    fn default() -> Self {
        let hostile = SuccessCurve {
            base: 0.7,
            ratio_factor: 1.3,
            exponent: 1.2,
            min: 0.01,
            max: 0.97,
        };
        let hostile_casualties = CasualtyBand {
            base: 1.0,
            min: 0.5,
            max: 1.5,
        };
        Self {
            strength_divisor: 1000.0,
            info_success: SuccessCurve {
                base: 0.8,
                ratio_factor: 1.4,
                exponent: 1.2,
                min: 0.01,
                max: 0.98,
            },
            theft_success: hostile,
            black_success: hostile,
            info_spy_casualties: CasualtyBand {
                base: 0.25,
                min: 0.25,
                max: 1.0,
            },
            theft_spy_casualties: hostile_casualties,
            black_spy_casualties: hostile_casualties,
            hostile_wizard_casualties: hostile_casualties,
            guild_casualty_reduction: 2.5,
            guild_casualty_reduction_max: 0.25,
            mutual_war_casualty_multiplier: 0.8,
            spy_casualty_multiplier_floor: 0.2,
            archmage_loss_divisor: 10.0,
            resilience: ResilienceConfig::default(),
            damage_reduction: DamageReductionConfig::default(),
            mastery: MasteryConfig::default(),
            peasant_vulnerability: 0.5,
            improvement_vulnerability: 0.25,
            improvements: ImprovementConfig::default(),
        }
    }
}

impl OpsConfig {
    /// Parse a JSON override on top of the defaults and validate it.
    pub fn from_json(json: &str) -> Result<Self, OpsError> {
        let config: OpsConfig = serde_json::from_str(json)?;
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(OpsError::InvalidConfig(errors));
        }
        log::debug!("loaded ops config override ({} bytes)", json.len());
        Ok(config)
    }

    pub fn spy_success_curve(&self, kind: SpyOpKind) -> &SuccessCurve {
        match kind {
            SpyOpKind::Info => &self.info_success,
            SpyOpKind::Theft => &self.theft_success,
            SpyOpKind::Black => &self.black_success,
        }
    }

    /// Info spells share the info-op curve, hostile spells the black-op curve.
    pub fn spell_success_curve(&self, kind: SpellKind) -> &SuccessCurve {
        match kind {
            SpellKind::Info => &self.info_success,
            SpellKind::Hostile => &self.black_success,
        }
    }

    pub fn spy_casualties(&self, kind: SpyOpKind) -> &CasualtyBand {
        match kind {
            SpyOpKind::Info => &self.info_spy_casualties,
            SpyOpKind::Theft => &self.theft_spy_casualties,
            SpyOpKind::Black => &self.black_spy_casualties,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("{0} must be within 0..=1, got {1}")]
    InvalidFraction(&'static str, f64),
    #[error("{0} has min {1} above max {2}")]
    InvertedRange(&'static str, f64, f64),
    #[error("resilience {0} must be negative or zero, got {1}")]
    PositiveDecay(&'static str, i32),
}

fn check_curve(name: &'static str, curve: &SuccessCurve, errors: &mut Vec<ConfigError>) {
    if !(curve.base > 0.0 && curve.base < 1.0) {
        errors.push(ConfigError::InvalidFraction(name, curve.base));
    }
    if curve.ratio_factor <= 0.0 || curve.exponent <= 0.0 {
        errors.push(ConfigError::NonPositive(name));
    }
    if curve.min > curve.max {
        errors.push(ConfigError::InvertedRange(name, curve.min, curve.max));
    }
    if curve.min < 0.0 || curve.max > 1.0 {
        errors.push(ConfigError::InvalidFraction(name, curve.max.max(-curve.min)));
    }
}

fn check_band(name: &'static str, band: &CasualtyBand, errors: &mut Vec<ConfigError>) {
    if band.min > band.max {
        errors.push(ConfigError::InvertedRange(name, band.min, band.max));
    }
    if band.base < 0.0 || band.min < 0.0 {
        errors.push(ConfigError::NonPositive(name));
    }
}

fn check_fraction(name: &'static str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::InvalidFraction(name, value));
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &OpsConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.strength_divisor <= 0.0 {
        errors.push(ConfigError::NonPositive("strength_divisor"));
    }
    check_curve("info_success", &config.info_success, &mut errors);
    check_curve("theft_success", &config.theft_success, &mut errors);
    check_curve("black_success", &config.black_success, &mut errors);

    check_band("info_spy_casualties", &config.info_spy_casualties, &mut errors);
    check_band("theft_spy_casualties", &config.theft_spy_casualties, &mut errors);
    check_band("black_spy_casualties", &config.black_spy_casualties, &mut errors);
    check_band(
        "hostile_wizard_casualties",
        &config.hostile_wizard_casualties,
        &mut errors,
    );

    check_fraction(
        "guild_casualty_reduction_max",
        config.guild_casualty_reduction_max,
        &mut errors,
    );
    check_fraction(
        "mutual_war_casualty_multiplier",
        config.mutual_war_casualty_multiplier,
        &mut errors,
    );
    check_fraction(
        "spy_casualty_multiplier_floor",
        config.spy_casualty_multiplier_floor,
        &mut errors,
    );
    if config.archmage_loss_divisor <= 0.0 {
        errors.push(ConfigError::NonPositive("archmage_loss_divisor"));
    }

    let res = &config.resilience;
    if res.max <= 0 {
        errors.push(ConfigError::NonPositive("resilience.max"));
    }
    if res.spy_decay > 0 {
        errors.push(ConfigError::PositiveDecay("spy_decay", res.spy_decay));
    }
    if res.wizard_decay > 0 {
        errors.push(ConfigError::PositiveDecay("wizard_decay", res.wizard_decay));
    }

    let dr = &config.damage_reduction;
    if dr.base_requirement <= 0.0 {
        errors.push(ConfigError::NonPositive("damage_reduction.base_requirement"));
    }
    if dr.grace_days < 0 {
        errors.push(ConfigError::NonPositive("damage_reduction.grace_days"));
    }
    if dr.scaling_days < 0 {
        errors.push(ConfigError::NonPositive("damage_reduction.scaling_days"));
    }
    // Largest ratio requirement, reached once scaling stops.
    let final_requirement =
        dr.requirement_per_day * dr.scaling_days.max(0) as f64 + dr.base_requirement;
    if final_requirement <= 0.0 {
        errors.push(ConfigError::NonPositive("damage_reduction final requirement"));
    }
    check_fraction("damage_reduction.max", dr.max, &mut errors);

    let mastery = &config.mastery;
    if mastery.difference_cap < 0 {
        errors.push(ConfigError::NonPositive("mastery.difference_cap"));
    }
    if mastery.difference_divisor <= 0.0 {
        errors.push(ConfigError::NonPositive("mastery.difference_divisor"));
    }
    if mastery.scale <= 0.0 {
        errors.push(ConfigError::NonPositive("mastery.scale"));
    }

    check_fraction("peasant_vulnerability", config.peasant_vulnerability, &mut errors);
    check_fraction(
        "improvement_vulnerability",
        config.improvement_vulnerability,
        &mut errors,
    );

    errors
}
