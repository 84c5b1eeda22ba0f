//! Round orchestrator error types.

use super::models::Phase;
use crate::ledger::BetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Commands accepted by the orchestrator, used to describe rejections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    StartRound,
    SubmitBet,
    CancelBet,
    DeliverResult,
    CompleteDealing,
    ManualAdvance,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::StartRound => write!(f, "start_round"),
            Command::SubmitBet => write!(f, "submit_bet"),
            Command::CancelBet => write!(f, "cancel_bet"),
            Command::DeliverResult => write!(f, "deliver_result"),
            Command::CompleteDealing => write!(f, "complete_dealing"),
            Command::ManualAdvance => write!(f, "manual_advance"),
        }
    }
}

/// Round orchestrator errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    /// Stake rejected by the ledger
    #[error(transparent)]
    Bet(#[from] BetError),

    /// Command arrived in a phase that does not accept it; the round continues
    #[error("{command} not allowed during {phase} phase")]
    Sequence { command: Command, phase: Phase },

    /// Command would break the phase order
    #[error("Illegal transition: {command} during {phase} phase")]
    IllegalTransition { command: Command, phase: Phase },

    /// Round numbers must strictly increase
    #[error("Round number {got} does not follow {last}")]
    NonMonotonicRound { last: u64, got: u64 },

    /// Round id reused from the previous round
    #[error("Round id {0} already used")]
    DuplicateRoundId(String),

    /// Negative or non-finite phase duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),

    /// Delivered result failed validation
    #[error("Invalid result: {0}")]
    InvalidResult(String),

    /// A result for this round is already held
    #[error("Result already delivered for round {0}")]
    ResultAlreadyDelivered(String),

    /// No authoritative result arrived within the grace period
    #[error("No result for round {round_id} within {grace_secs}s")]
    ResultTimeout { round_id: String, grace_secs: f64 },

    /// The round actor is no longer running
    #[error("Round actor is closed")]
    ActorClosed,
}

impl RoundError {
    /// Errors that leave the round running unchanged
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RoundError::ResultTimeout { .. } | RoundError::ActorClosed
        )
    }
}

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, RoundError>;
