//! Bet ledger error types.

use super::models::{BetCategory, Chips};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a stake is rejected. The round continues after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BetError {
    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(Chips),

    /// Category ceiling would be exceeded
    #[error("Limit exceeded for {category}: staked {current}, requested {requested}, limit {limit}")]
    CategoryLimitExceeded {
        category: BetCategory,
        current: Chips,
        requested: Chips,
        limit: Chips,
    },

    /// Round ceiling would be exceeded
    #[error("Round limit exceeded: staked {current}, requested {requested}, limit {limit}")]
    RoundLimitExceeded {
        current: Chips,
        requested: Chips,
        limit: Chips,
    },
}

/// Result type for ledger operations
pub type BetResult<T> = Result<T, BetError>;
