//! Round lifecycle for a single live table.
//!
//! This module implements:
//! - RoundOrchestrator: the `Idle -> Betting -> Dealing -> Result -> Idle` state machine
//! - Result hand-over from the dealer side, with a grace window and fallback policy
//! - Settlement of the closed bet order against the result
//! - A bounded history of finished rounds
//!
//! ## Example
//!
//! ```
//! use live_round::events::EventBus;
//! use live_round::ledger::BetCategory;
//! use live_round::round::{Phase, RoundConfig, RoundOrchestrator, RoundResult, RoundStart};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::new());
//! let mut orchestrator = RoundOrchestrator::new(RoundConfig::default(), bus);
//!
//! orchestrator.start_round(RoundStart::new("R1", 1, "T1", "D1", 15.0)).unwrap();
//! orchestrator.submit_bet(BetCategory::Player, 100).unwrap();
//!
//! orchestrator.advance(15.0);
//! assert_eq!(orchestrator.phase(), Phase::Dealing);
//!
//! orchestrator.deliver_result(RoundResult::new("R1", 8, 3, 4)).unwrap();
//! orchestrator.complete_dealing().unwrap();
//! assert_eq!(orchestrator.phase(), Phase::Result);
//! ```

pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod orchestrator;
pub mod settlement;
pub mod simulator;

pub use config::{BETTING_WARNING_SECS, ResultPolicy, RoundConfig};
pub use errors::{Command, OrchestratorResult, RoundError};
pub use history::{HistoryStats, RoundHistory, RoundRecord};
pub use models::{
    MAX_CARDS, MAX_POINTS, MIN_CARDS, Outcome, Phase, ResultDelivery, Round, RoundResult,
    RoundStart,
};
pub use orchestrator::RoundOrchestrator;
pub use settlement::{Settlement, SettlementLine};
pub use simulator::ResultSimulator;
