//! Per-round stake aggregation.

use super::{
    errors::{BetError, BetResult},
    models::{BetCategory, BetLimits, Chips, Stakes},
};

/// Running stake totals for the round in progress.
///
/// Every category has a slot; a slot at zero means nothing is staked there.
/// Failed operations never touch the totals.
#[derive(Debug, Clone)]
pub struct BetLedger {
    stakes: [Chips; BetCategory::ALL.len()],
    total: Chips,
    limits: BetLimits,
}

impl Default for BetLedger {
    fn default() -> Self {
        Self::new(BetLimits::default())
    }
}

impl BetLedger {
    /// Create an empty ledger enforcing `limits`
    #[must_use]
    pub fn new(limits: BetLimits) -> Self {
        Self {
            stakes: [0; BetCategory::ALL.len()],
            total: 0,
            limits,
        }
    }

    /// Add a stake to `category`
    ///
    /// # Arguments
    ///
    /// * `category` - Bet category
    /// * `amount` - Stake in minor units, must be positive
    ///
    /// # Returns
    ///
    /// * `BetResult<Chips>` - New running total of the category
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount <= 0`
    /// * `CategoryLimitExceeded` if the category ceiling would be exceeded
    /// * `RoundLimitExceeded` if the round ceiling would be exceeded
    pub fn place_bet(&mut self, category: BetCategory, amount: Chips) -> BetResult<Chips> {
        if amount <= 0 {
            return Err(BetError::InvalidAmount(amount));
        }

        let current = self.stakes[category.index()];
        let limit = self.limits.category_limit(category);
        let category_total = current
            .checked_add(amount)
            .filter(|total| *total <= limit)
            .ok_or(BetError::CategoryLimitExceeded {
                category,
                current,
                requested: amount,
                limit,
            })?;

        let round_total = self
            .total
            .checked_add(amount)
            .filter(|total| *total <= self.limits.round_max)
            .ok_or(BetError::RoundLimitExceeded {
                current: self.total,
                requested: amount,
                limit: self.limits.round_max,
            })?;

        self.stakes[category.index()] = category_total;
        self.total = round_total;

        log::debug!("Bet {amount} on {category}, category total {category_total}");
        Ok(category_total)
    }

    /// Remove up to `amount` from `category`, clamping at zero.
    ///
    /// Returns the amount actually removed.
    pub fn cancel_bet(&mut self, category: BetCategory, amount: Chips) -> BetResult<Chips> {
        if amount <= 0 {
            return Err(BetError::InvalidAmount(amount));
        }

        let slot = &mut self.stakes[category.index()];
        let removed = amount.min(*slot);
        *slot -= removed;
        self.total -= removed;

        log::debug!("Cancelled {removed} of {amount} requested on {category}");
        Ok(removed)
    }

    /// Amount staked on `category` (0 if none)
    #[must_use]
    pub fn amount(&self, category: BetCategory) -> Chips {
        self.stakes[category.index()]
    }

    /// Owned copy of all non-zero stakes
    #[must_use]
    pub fn snapshot(&self) -> Stakes {
        BetCategory::ALL
            .iter()
            .filter_map(|category| {
                let amount = self.stakes[category.index()];
                (amount > 0).then_some((*category, amount))
            })
            .collect()
    }

    /// Reset every category to zero
    pub fn clear(&mut self) {
        self.stakes = [0; BetCategory::ALL.len()];
        self.total = 0;
    }

    /// Sum across all categories
    #[must_use]
    pub fn total(&self) -> Chips {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub fn limits(&self) -> &BetLimits {
        &self.limits
    }
}
