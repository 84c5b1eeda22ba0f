//! Bet ledger for the round in progress.
//!
//! This module implements:
//! - Running stake totals per bet category
//! - Per-category and per-round ceilings
//! - Clamped bet cancellation
//! - Frozen bet orders handed over when betting closes
//!
//! ## Example
//!
//! ```
//! use live_round::ledger::{BetCategory, BetLedger, BetLimits};
//!
//! let mut ledger = BetLedger::new(BetLimits::new(10_000, 50_000));
//! ledger.place_bet(BetCategory::Banker, 6000).unwrap();
//! assert!(ledger.place_bet(BetCategory::Banker, 5000).is_err());
//! assert_eq!(ledger.total(), 6000);
//! ```

pub mod book;
pub mod errors;
pub mod models;

pub use book::BetLedger;
pub use errors::{BetError, BetResult};
pub use models::{
    BetCategory, BetLimits, BetOrder, Chips, DEFAULT_CATEGORY_MAX, DEFAULT_ROUND_MAX, Stakes,
};
