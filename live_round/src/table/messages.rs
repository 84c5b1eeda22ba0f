//! Round actor message types.

use crate::{
    events::{EventKind, RoundEvent, SubscriptionId},
    ledger::{BetCategory, Chips, Stakes},
    round::{
        HistoryStats, OrchestratorResult, Phase, ResultDelivery, Round, RoundResult, RoundStart,
    },
};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

/// Messages that can be sent to a RoundActor
#[derive(Debug)]
pub enum RoundMessage {
    /// Open betting for a new round
    StartRound {
        start: RoundStart,
        response: oneshot::Sender<OrchestratorResult<Round>>,
    },

    /// Place a stake
    SubmitBet {
        category: BetCategory,
        amount: Chips,
        response: oneshot::Sender<OrchestratorResult<Chips>>,
    },

    /// Withdraw part of a stake
    CancelBet {
        category: BetCategory,
        amount: Chips,
        response: oneshot::Sender<OrchestratorResult<Chips>>,
    },

    /// Result from the dealer side
    DeliverResult {
        result: RoundResult,
        response: oneshot::Sender<OrchestratorResult<ResultDelivery>>,
    },

    /// Cards are on the table
    CompleteDealing {
        response: oneshot::Sender<OrchestratorResult<()>>,
    },

    /// Force the next transition (operator)
    ManualAdvance {
        response: oneshot::Sender<OrchestratorResult<Phase>>,
    },

    /// Abandon the round and return to idle (operator)
    Reset {
        reason: String,
        response: oneshot::Sender<()>,
    },

    /// Abandon the round after an external fatal error
    Fail {
        message: String,
        response: oneshot::Sender<()>,
    },

    /// Get current round state
    GetState {
        response: oneshot::Sender<RoundStateResponse>,
    },

    /// Get current stakes
    GetLedger { response: oneshot::Sender<Stakes> },

    /// Forward events of `kinds` into `sender`
    Subscribe {
        kinds: Vec<EventKind>,
        sender: mpsc::Sender<RoundEvent>,
        response: oneshot::Sender<SubscriptionId>,
    },

    /// Stop forwarding to a subscriber
    Unsubscribe { id: SubscriptionId },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Round state response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStateResponse {
    /// Table ID
    pub table_id: String,
    /// Current phase
    pub phase: Phase,
    /// Running round, or the last one while idle
    pub round: Option<Round>,
    /// Seconds left on the active timer
    pub remaining_secs: f64,
    /// Dealing complete, result not yet in
    pub awaiting_result: bool,
    /// Current stakes
    pub stakes: Stakes,
    /// Sum of the stakes
    pub total: Chips,
    /// Most recent settled result
    pub last_result: Option<RoundResult>,
    /// Counts over the retained history
    pub stats: HistoryStats,
}
