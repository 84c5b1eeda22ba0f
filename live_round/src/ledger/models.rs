//! Bet ledger data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stake amount in minor currency units (cents).
pub type Chips = i64;

/// Mapping of bet category to staked amount.
pub type Stakes = BTreeMap<BetCategory, Chips>;

/// Default ceiling for a single bet category.
pub const DEFAULT_CATEGORY_MAX: Chips = 10_000;

/// Default ceiling for the sum of all categories in one round.
pub const DEFAULT_ROUND_MAX: Chips = 50_000;

/// Wager types offered at the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetCategory {
    Banker,
    Player,
    Tie,
    BankerPair,
    PlayerPair,
    Big,
    Small,
    SuperSix,
}

impl BetCategory {
    /// Every category, in ledger order.
    pub const ALL: [Self; 8] = [
        Self::Banker,
        Self::Player,
        Self::Tie,
        Self::BankerPair,
        Self::PlayerPair,
        Self::Big,
        Self::Small,
        Self::SuperSix,
    ];

    /// Position of the category inside [`BetCategory::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for BetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetCategory::Banker => write!(f, "banker"),
            BetCategory::Player => write!(f, "player"),
            BetCategory::Tie => write!(f, "tie"),
            BetCategory::BankerPair => write!(f, "banker_pair"),
            BetCategory::PlayerPair => write!(f, "player_pair"),
            BetCategory::Big => write!(f, "big"),
            BetCategory::Small => write!(f, "small"),
            BetCategory::SuperSix => write!(f, "super_six"),
        }
    }
}

impl std::str::FromStr for BetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "banker" => Ok(Self::Banker),
            "player" => Ok(Self::Player),
            "tie" => Ok(Self::Tie),
            "banker_pair" => Ok(Self::BankerPair),
            "player_pair" => Ok(Self::PlayerPair),
            "big" => Ok(Self::Big),
            "small" => Ok(Self::Small),
            "super_six" => Ok(Self::SuperSix),
            other => Err(format!("unknown bet category: {other}")),
        }
    }
}

/// Stake ceilings enforced by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    /// Ceiling applied to every category without an override
    pub category_max: Chips,

    /// Per-category ceilings that replace `category_max`
    #[serde(default)]
    pub category_overrides: BTreeMap<BetCategory, Chips>,

    /// Ceiling for the sum across all categories
    pub round_max: Chips,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_MAX, DEFAULT_ROUND_MAX)
    }
}

impl BetLimits {
    #[must_use]
    pub fn new(category_max: Chips, round_max: Chips) -> Self {
        Self {
            category_max,
            category_overrides: BTreeMap::new(),
            round_max,
        }
    }

    /// Replace the ceiling of a single category.
    #[must_use]
    pub fn with_override(mut self, category: BetCategory, max: Chips) -> Self {
        self.category_overrides.insert(category, max);
        self
    }

    /// Ceiling for `category`.
    #[must_use]
    pub fn category_limit(&self, category: BetCategory) -> Chips {
        self.category_overrides
            .get(&category)
            .copied()
            .unwrap_or(self.category_max)
    }

    /// Validate limits
    pub fn validate(&self) -> Result<(), String> {
        if self.category_max <= 0 {
            return Err("Category limit must be positive".to_string());
        }

        if self.round_max <= 0 {
            return Err("Round limit must be positive".to_string());
        }

        if let Some((category, max)) = self.category_overrides.iter().find(|(_, max)| **max <= 0)
        {
            return Err(format!("Limit for {category} must be positive, got {max}"));
        }

        Ok(())
    }
}

/// Frozen bet order handed to the backend when betting closes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetOrder {
    pub round_id: String,
    pub stakes: Stakes,
    pub total: Chips,
}

impl BetOrder {
    #[must_use]
    pub fn new(round_id: impl Into<String>, stakes: Stakes) -> Self {
        let total = stakes.values().sum();
        Self {
            round_id: round_id.into(),
            stakes,
            total,
        }
    }

    /// Amount staked on `category` in this order.
    #[must_use]
    pub fn stake(&self, category: BetCategory) -> Chips {
        self.stakes.get(&category).copied().unwrap_or(0)
    }
}
