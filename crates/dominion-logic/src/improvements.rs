//! Castle improvements: invested points and the bonus curve they produce.
//!
//! Each improvement type converts invested points into a multiplier
//! bonus that approaches a per-type maximum. Larger dominions need more
//! points for the same bonus:
//!
//! ```text
//! bonus = maximum * (1 - exp(-points / (coefficient * total_land + offset)))
//! ```
//!
//! ```
//! use dominion_logic::config::OpsConfig;
//! use dominion_logic::improvements::{improvement_multiplier_bonus, ImprovementType, Improvements};
//!
//! let improvements = Improvements { spires: 200_000, ..Default::default() };
//! let config = OpsConfig::default();
//! let spires = ImprovementType::Spires;
//! let bonus = improvement_multiplier_bonus(&improvements, spires, 1000, 0.0, &config);
//! assert!(bonus > 0.0 && bonus < 0.6);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::OpsConfig;

/// Improvement categories a dominion can invest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementType {
    Science,
    Keep,
    Towers,
    Spires,
    Forges,
    Walls,
    Harbor,
}

impl ImprovementType {
    pub const ALL: [ImprovementType; 7] = [
        ImprovementType::Science,
        ImprovementType::Keep,
        ImprovementType::Towers,
        ImprovementType::Spires,
        ImprovementType::Forges,
        ImprovementType::Walls,
        ImprovementType::Harbor,
    ];

    /// Whether lightning damage can destroy points in this improvement.
    pub fn is_destroyable(self) -> bool {
        !matches!(self, ImprovementType::Spires | ImprovementType::Harbor)
    }
}

/// Points currently invested per improvement type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Improvements {
    pub science: i64,
    pub keep: i64,
    pub towers: i64,
    pub spires: i64,
    pub forges: i64,
    pub walls: i64,
    pub harbor: i64,
}

impl Improvements {
    pub fn get(&self, improvement: ImprovementType) -> i64 {
        match improvement {
            ImprovementType::Science => self.science,
            ImprovementType::Keep => self.keep,
            ImprovementType::Towers => self.towers,
            ImprovementType::Spires => self.spires,
            ImprovementType::Forges => self.forges,
            ImprovementType::Walls => self.walls,
            ImprovementType::Harbor => self.harbor,
        }
    }

    /// Points in improvements lightning cannot touch (spires + harbor).
    pub fn indestructible(&self) -> i64 {
        self.spires + self.harbor
    }
}

/// Sum of all currently invested improvement points.
pub fn improvement_total(improvements: &Improvements) -> i64 {
    ImprovementType::ALL
        .iter()
        .map(|&t| improvements.get(t))
        .sum()
}

/// Per-type shape of the improvement bonus curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImprovementCurve {
    /// Bonus ceiling as a fraction (0.6 = +60%).
    pub maximum: f64,
    /// Points per acre needed to move along the curve.
    pub coefficient: f64,
}

/// Curve parameters for every improvement type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprovementConfig {
    pub science: ImprovementCurve,
    pub keep: ImprovementCurve,
    pub towers: ImprovementCurve,
    pub spires: ImprovementCurve,
    pub forges: ImprovementCurve,
    pub walls: ImprovementCurve,
    pub harbor: ImprovementCurve,
    /// Flat points added to the land-scaled denominator.
    pub land_offset: f64,
}

impl Default for ImprovementConfig {
    fn default() -> Self {
        let curve = |maximum, coefficient| ImprovementCurve {
            maximum,
            coefficient,
        };
        Self {
            science: curve(0.2, 4000.0),
            keep: curve(0.3, 4000.0),
            towers: curve(0.6, 5000.0),
            spires: curve(0.6, 5000.0),
            forges: curve(0.3, 7500.0),
            walls: curve(0.3, 7500.0),
            harbor: curve(0.6, 5000.0),
            land_offset: 15000.0,
        }
    }
}

impl ImprovementConfig {
    pub fn curve(&self, improvement: ImprovementType) -> ImprovementCurve {
        match improvement {
            ImprovementType::Science => self.science,
            ImprovementType::Keep => self.keep,
            ImprovementType::Towers => self.towers,
            ImprovementType::Spires => self.spires,
            ImprovementType::Forges => self.forges,
            ImprovementType::Walls => self.walls,
            ImprovementType::Harbor => self.harbor,
        }
    }
}

/// Multiplier bonus granted by one improvement type.
///
/// `efficiency_bonus` stacks multiplicatively on top of the curve
/// (masonries, racial perks). Result is rounded to four decimals.
pub fn improvement_multiplier_bonus(
    improvements: &Improvements,
    improvement: ImprovementType,
    total_land: u32,
    efficiency_bonus: f64,
    config: &OpsConfig,
) -> f64 {
    let points = improvements.get(improvement).max(0) as f64;
    let curve = config.improvements.curve(improvement);
    let denominator = curve.coefficient * f64::from(total_land) + config.improvements.land_offset;
    if denominator <= 0.0 {
        return 0.0;
    }

    let bonus = curve.maximum * (1.0 - (-points / denominator).exp()) * (1.0 + efficiency_bonus);
    (bonus * 10_000.0).round() / 10_000.0
}
