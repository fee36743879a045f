//! Land types and acreage.

use serde::{Deserialize, Serialize};

/// The seven land types a dominion can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandType {
    Plain,
    Mountain,
    Swamp,
    Cavern,
    Forest,
    Hill,
    Water,
}

impl LandType {
    /// All land types in display order.
    pub const ALL: [LandType; 7] = [
        LandType::Plain,
        LandType::Mountain,
        LandType::Swamp,
        LandType::Cavern,
        LandType::Forest,
        LandType::Hill,
        LandType::Water,
    ];

    /// Key used in game data (`land_plain`, ...).
    pub fn key(self) -> &'static str {
        match self {
            LandType::Plain => "plain",
            LandType::Mountain => "mountain",
            LandType::Swamp => "swamp",
            LandType::Cavern => "cavern",
            LandType::Forest => "forest",
            LandType::Hill => "hill",
            LandType::Water => "water",
        }
    }

    /// Human-readable plural name.
    pub fn display_name(self) -> &'static str {
        match self {
            LandType::Plain => "Plains",
            LandType::Mountain => "Mountains",
            LandType::Swamp => "Swamp",
            LandType::Cavern => "Caverns",
            LandType::Forest => "Forests",
            LandType::Hill => "Hills",
            LandType::Water => "Water",
        }
    }
}

/// Acres held per land type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Land {
    pub plain: u32,
    pub mountain: u32,
    pub swamp: u32,
    pub cavern: u32,
    pub forest: u32,
    pub hill: u32,
    pub water: u32,
}

impl Land {
    /// Land spread evenly across all seven types.
    pub fn even(per_type: u32) -> Self {
        Self {
            plain: per_type,
            mountain: per_type,
            swamp: per_type,
            cavern: per_type,
            forest: per_type,
            hill: per_type,
            water: per_type,
        }
    }

    pub fn get(&self, land_type: LandType) -> u32 {
        match land_type {
            LandType::Plain => self.plain,
            LandType::Mountain => self.mountain,
            LandType::Swamp => self.swamp,
            LandType::Cavern => self.cavern,
            LandType::Forest => self.forest,
            LandType::Hill => self.hill,
            LandType::Water => self.water,
        }
    }

    /// Total acreage across all land types, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        LandType::ALL
            .iter()
            .fold(0u32, |acc, &t| acc.saturating_add(self.get(t)))
    }
}
