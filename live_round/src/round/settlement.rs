//! Payout computation for a closed bet order.

use super::models::{Outcome, RoundResult};
use crate::ledger::{BetCategory, BetOrder, Chips};
use serde::{Deserialize, Serialize};

/// Payout of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    pub category: BetCategory,
    pub stake: Chips,
    /// Amount returned to the player including the stake, 0 on a loss
    pub payout: Chips,
}

/// Payouts of a whole bet order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub lines: Vec<SettlementLine>,
    pub total_stake: Chips,
    pub total_payout: Chips,
}

impl Settlement {
    /// Settle `order` against `result`
    #[must_use]
    pub fn compute(order: &BetOrder, result: &RoundResult) -> Self {
        let lines: Vec<SettlementLine> = order
            .stakes
            .iter()
            .map(|(category, stake)| SettlementLine {
                category: *category,
                stake: *stake,
                payout: payout(*category, *stake, result),
            })
            .collect();

        let total_stake = lines.iter().fold(0, |acc: Chips, l| acc.saturating_add(l.stake));
        let total_payout = lines
            .iter()
            .fold(0, |acc: Chips, l| acc.saturating_add(l.payout));

        Self {
            lines,
            total_stake,
            total_payout,
        }
    }

    /// Player's net gain (negative when the house wins)
    #[must_use]
    pub fn net(&self) -> Chips {
        self.total_payout.saturating_sub(self.total_stake)
    }

    #[must_use]
    pub fn line(&self, category: BetCategory) -> Option<&SettlementLine> {
        self.lines.iter().find(|l| l.category == category)
    }
}

/// Amount returned for `stake` on `category`. Fractional chips round down.
fn payout(category: BetCategory, stake: Chips, result: &RoundResult) -> Chips {
    let win = |numerator: Chips, denominator: Chips| {
        stake.saturating_add(stake.saturating_mul(numerator) / denominator)
    };

    match (category, result.outcome) {
        (BetCategory::Player, Outcome::PlayerWin) => win(1, 1),
        (BetCategory::Banker, Outcome::BankerWin) if result.banker_points == 6 => win(1, 2),
        (BetCategory::Banker, Outcome::BankerWin) => win(95, 100),
        (BetCategory::Player | BetCategory::Banker, Outcome::Tie) => stake,
        (BetCategory::Tie, Outcome::Tie) => win(8, 1),
        (BetCategory::PlayerPair, _) if result.player_pair => win(11, 1),
        (BetCategory::BankerPair, _) if result.banker_pair => win(11, 1),
        (BetCategory::Big, _) if result.is_big() => win(54, 100),
        (BetCategory::Small, _) if !result.is_big() => win(3, 2),
        (BetCategory::SuperSix, _) if result.is_super_six() => win(12, 1),
        _ => 0,
    }
}
