//! Event payloads published by the orchestrator.

use crate::{
    ledger::{BetOrder, Chips, Stakes},
    round::{Phase, Round, RoundResult, Settlement},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel key for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RoundStarted,
    BettingPhaseStarted,
    BettingPhaseEnding,
    BettingPhaseEnded,
    DealingPhaseStarted,
    DealingCompleted,
    RoundResultAvailable,
    GameStateChanged,
    BetLedgerChanged,
    Error,
}

impl EventKind {
    pub const ALL: [Self; 10] = [
        Self::RoundStarted,
        Self::BettingPhaseStarted,
        Self::BettingPhaseEnding,
        Self::BettingPhaseEnded,
        Self::DealingPhaseStarted,
        Self::DealingCompleted,
        Self::RoundResultAvailable,
        Self::GameStateChanged,
        Self::BetLedgerChanged,
        Self::Error,
    ];
}

/// Category of a published error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No authoritative result arrived within the grace period; round aborted
    ResultTimeout,
    /// No authoritative result arrived; a placeholder result was synthesized
    DegradedResult,
    /// Operator reset
    Reset,
    /// External fatal error
    Fatal,
}

/// Lifecycle notifications for observers (UI, statistics, network senders)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    RoundStarted {
        round: Round,
    },
    BettingPhaseStarted {
        round_id: String,
        duration_secs: f64,
    },
    BettingPhaseEnding {
        round_id: String,
        remaining_secs: f64,
    },
    BettingPhaseEnded {
        round_id: String,
        order: BetOrder,
    },
    DealingPhaseStarted {
        round_id: String,
        duration_secs: f64,
    },
    DealingCompleted {
        round_id: String,
    },
    RoundResultAvailable {
        round_id: String,
        result: RoundResult,
        settlement: Settlement,
    },
    GameStateChanged {
        round_id: Option<String>,
        old: Phase,
        new: Phase,
    },
    BetLedgerChanged {
        round_id: String,
        stakes: Stakes,
        total: Chips,
    },
    Error {
        round_id: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl RoundEvent {
    /// Channel this event is delivered on
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RoundStarted { .. } => EventKind::RoundStarted,
            Self::BettingPhaseStarted { .. } => EventKind::BettingPhaseStarted,
            Self::BettingPhaseEnding { .. } => EventKind::BettingPhaseEnding,
            Self::BettingPhaseEnded { .. } => EventKind::BettingPhaseEnded,
            Self::DealingPhaseStarted { .. } => EventKind::DealingPhaseStarted,
            Self::DealingCompleted { .. } => EventKind::DealingCompleted,
            Self::RoundResultAvailable { .. } => EventKind::RoundResultAvailable,
            Self::GameStateChanged { .. } => EventKind::GameStateChanged,
            Self::BetLedgerChanged { .. } => EventKind::BetLedgerChanged,
            Self::Error { .. } => EventKind::Error,
        }
    }

    /// Encode as one JSON line, tagged with the event name
    ///
    /// # Errors
    ///
    /// Returns an error if a payload cannot be represented in JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for RoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStarted { round } => write!(
                f,
                "round {} (#{}) started at table {} with dealer {}",
                round.round_id, round.round_number, round.table_id, round.dealer_id
            ),
            Self::BettingPhaseStarted {
                round_id,
                duration_secs,
            } => write!(f, "round {round_id}: betting open for {duration_secs}s"),
            Self::BettingPhaseEnding {
                round_id,
                remaining_secs,
            } => write!(f, "round {round_id}: betting closes in {remaining_secs:.0}s"),
            Self::BettingPhaseEnded { round_id, order } => write!(
                f,
                "round {round_id}: betting closed with {} staked",
                order.total
            ),
            Self::DealingPhaseStarted {
                round_id,
                duration_secs,
            } => write!(f, "round {round_id}: dealing for {duration_secs}s"),
            Self::DealingCompleted { round_id } => write!(f, "round {round_id}: dealing complete"),
            Self::RoundResultAvailable {
                round_id,
                result,
                settlement,
            } => write!(
                f,
                "round {round_id}: {} ({}-{}), paid {}",
                result.outcome, result.player_points, result.banker_points, settlement.total_payout
            ),
            Self::GameStateChanged { old, new, .. } => write!(f, "phase {old} -> {new}"),
            Self::BetLedgerChanged {
                round_id, total, ..
            } => write!(f, "round {round_id}: ledger total {total}"),
            Self::Error {
                round_id, message, ..
            } => match round_id {
                Some(id) => write!(f, "round {id}: error: {message}"),
                None => write!(f, "error: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let event = RoundEvent::DealingCompleted {
            round_id: "R1".to_string(),
        };
        assert_eq!(event.kind(), EventKind::DealingCompleted);

        let event = RoundEvent::GameStateChanged {
            round_id: None,
            old: Phase::Result,
            new: Phase::Idle,
        };
        assert_eq!(event.kind(), EventKind::GameStateChanged);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = RoundEvent::BettingPhaseEnding {
            round_id: "R1".to_string(),
            remaining_secs: 4.0,
        };
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["event"], "betting_phase_ending");
        assert_eq!(json["round_id"], "R1");
    }

    #[test]
    fn test_display() {
        let event = RoundEvent::Error {
            round_id: Some("R9".to_string()),
            kind: ErrorKind::ResultTimeout,
            message: "no result".to_string(),
        };
        assert_eq!(event.to_string(), "round R9: error: no result");
    }
}
