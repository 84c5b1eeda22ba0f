//! Round actor implementation with async message handling.

use super::messages::{RoundMessage, RoundStateResponse};
use crate::{
    events::{EventBus, EventKind, RoundEvent, SubscriptionId},
    ledger::{BetCategory, Chips, Stakes},
    round::{
        OrchestratorResult, Phase, ResultDelivery, Round, RoundConfig, RoundError,
        RoundOrchestrator, RoundResult, RoundStart,
    },
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Duration, Instant, MissedTickBehavior, interval},
};

/// Inbox capacity of a round actor
const INBOX_CAPACITY: usize = 100;

/// Round actor handle for sending messages
#[derive(Debug, Clone)]
pub struct RoundHandle {
    sender: mpsc::Sender<RoundMessage>,
    table_id: String,
}

impl RoundHandle {
    /// Create a new round handle
    pub fn new(sender: mpsc::Sender<RoundMessage>, table_id: impl Into<String>) -> Self {
        Self {
            sender,
            table_id: table_id.into(),
        }
    }

    /// Get table ID
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Send a message to the actor
    ///
    /// # Errors
    ///
    /// Returns `ActorClosed` if the actor has stopped.
    pub async fn send(&self, message: RoundMessage) -> OrchestratorResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoundError::ActorClosed)
    }

    /// Send a message built around a fresh responder and await the reply
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoundMessage,
    ) -> OrchestratorResult<T> {
        let (response, reply) = oneshot::channel();
        self.send(build(response)).await?;
        reply.await.map_err(|_| RoundError::ActorClosed)
    }

    pub async fn start_round(&self, start: RoundStart) -> OrchestratorResult<Round> {
        self.request(|response| RoundMessage::StartRound { start, response })
            .await?
    }

    pub async fn submit_bet(&self, category: BetCategory, amount: Chips) -> OrchestratorResult<Chips> {
        self.request(|response| RoundMessage::SubmitBet {
            category,
            amount,
            response,
        })
        .await?
    }

    pub async fn cancel_bet(&self, category: BetCategory, amount: Chips) -> OrchestratorResult<Chips> {
        self.request(|response| RoundMessage::CancelBet {
            category,
            amount,
            response,
        })
        .await?
    }

    pub async fn deliver_result(&self, result: RoundResult) -> OrchestratorResult<ResultDelivery> {
        self.request(|response| RoundMessage::DeliverResult { result, response })
            .await?
    }

    pub async fn complete_dealing(&self) -> OrchestratorResult<()> {
        self.request(|response| RoundMessage::CompleteDealing { response })
            .await?
    }

    pub async fn manual_advance(&self) -> OrchestratorResult<Phase> {
        self.request(|response| RoundMessage::ManualAdvance { response })
            .await?
    }

    pub async fn reset(&self, reason: impl Into<String>) -> OrchestratorResult<()> {
        let reason = reason.into();
        self.request(|response| RoundMessage::Reset { reason, response })
            .await
    }

    pub async fn fail(&self, message: impl Into<String>) -> OrchestratorResult<()> {
        let message = message.into();
        self.request(|response| RoundMessage::Fail { message, response })
            .await
    }

    pub async fn state(&self) -> OrchestratorResult<RoundStateResponse> {
        self.request(|response| RoundMessage::GetState { response })
            .await
    }

    pub async fn ledger(&self) -> OrchestratorResult<Stakes> {
        self.request(|response| RoundMessage::GetLedger { response })
            .await
    }

    /// Receive events of `kinds` on a bounded channel of `capacity`.
    ///
    /// Events are dropped while the channel is full.
    pub async fn subscribe(
        &self,
        kinds: &[EventKind],
        capacity: usize,
    ) -> OrchestratorResult<(SubscriptionId, mpsc::Receiver<RoundEvent>)> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let kinds = kinds.to_vec();
        let id = self
            .request(|response| RoundMessage::Subscribe {
                kinds,
                sender,
                response,
            })
            .await?;
        Ok((id, receiver))
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> OrchestratorResult<()> {
        self.send(RoundMessage::Unsubscribe { id }).await
    }

    /// Stop the actor; pending timers are abandoned
    pub async fn close(&self) -> OrchestratorResult<()> {
        self.request(|response| RoundMessage::Close { response })
            .await
    }
}

/// Actor running the rounds of a single table
#[derive(Debug)]
pub struct RoundActor {
    /// Table ID
    table_id: String,

    /// Round state machine
    orchestrator: RoundOrchestrator,

    /// Message inbox
    inbox: mpsc::Receiver<RoundMessage>,

    /// Instant up to which the orchestrator has been advanced
    clock: Instant,

    /// Is actor closed
    is_closed: bool,
}

impl RoundActor {
    /// Create a new round actor
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `config` - Round configuration
    /// * `bus` - Event bus shared with observers
    ///
    /// # Returns
    ///
    /// * `(RoundActor, RoundHandle)` - Actor and handle for sending messages
    pub fn new(
        table_id: impl Into<String>,
        config: RoundConfig,
        bus: Arc<EventBus>,
    ) -> (Self, RoundHandle) {
        Self::with_orchestrator(table_id, RoundOrchestrator::new(config, bus))
    }

    /// Wrap an already composed orchestrator
    pub fn with_orchestrator(
        table_id: impl Into<String>,
        orchestrator: RoundOrchestrator,
    ) -> (Self, RoundHandle) {
        let table_id = table_id.into();
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            table_id: table_id.clone(),
            orchestrator,
            inbox,
            clock: Instant::now(),
            is_closed: false,
        };

        (actor, RoundHandle::new(sender, table_id))
    }

    /// Run the actor event loop until closed or every handle is dropped
    pub async fn run(mut self) {
        log::info!("Round actor for table {} starting", self.table_id);

        let poll = Duration::from_millis(self.orchestrator.config().poll_interval_ms.max(1));
        let mut poll_interval = interval(poll);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.clock = Instant::now();

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        break;
                    };

                    // Commands observe the timers as of their arrival
                    self.catch_up();
                    self.handle_message(message);

                    if self.is_closed {
                        break;
                    }
                }

                _ = poll_interval.tick() => {
                    self.catch_up();
                }
            }
        }

        log::info!("Round actor for table {} closed", self.table_id);
    }

    /// Advance the orchestrator by the time elapsed since the last call
    fn catch_up(&mut self) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.clock);
        self.clock = now;
        self.orchestrator.advance(elapsed.as_secs_f64());
    }

    /// Handle a round message
    fn handle_message(&mut self, message: RoundMessage) {
        match message {
            RoundMessage::StartRound { start, response } => {
                let _ = response.send(self.orchestrator.start_round(start));
            }

            RoundMessage::SubmitBet {
                category,
                amount,
                response,
            } => {
                let result = self.orchestrator.submit_bet(category, amount);
                if let Err(e) = &result {
                    log::debug!("Table {}: bet rejected: {e}", self.table_id);
                }
                let _ = response.send(result);
            }

            RoundMessage::CancelBet {
                category,
                amount,
                response,
            } => {
                let _ = response.send(self.orchestrator.cancel_bet(category, amount));
            }

            RoundMessage::DeliverResult { result, response } => {
                let _ = response.send(self.orchestrator.deliver_result(result));
            }

            RoundMessage::CompleteDealing { response } => {
                let _ = response.send(self.orchestrator.complete_dealing());
            }

            RoundMessage::ManualAdvance { response } => {
                let _ = response.send(self.orchestrator.manual_advance());
            }

            RoundMessage::Reset { reason, response } => {
                self.orchestrator.reset(&reason);
                let _ = response.send(());
            }

            RoundMessage::Fail { message, response } => {
                self.orchestrator.fail(&message);
                let _ = response.send(());
            }

            RoundMessage::GetState { response } => {
                let _ = response.send(self.get_state());
            }

            RoundMessage::GetLedger { response } => {
                let _ = response.send(self.orchestrator.ledger_snapshot());
            }

            RoundMessage::Subscribe {
                kinds,
                sender,
                response,
            } => {
                let id = self.orchestrator.bus().forward(&kinds, sender);
                log::debug!(
                    "Subscriber {id:?} attached to table {} ({} kinds)",
                    self.table_id,
                    kinds.len()
                );
                let _ = response.send(id);
            }

            RoundMessage::Unsubscribe { id } => {
                self.orchestrator.bus().unsubscribe_all(id);
                log::debug!("Subscriber {id:?} detached from table {}", self.table_id);
            }

            RoundMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn get_state(&self) -> RoundStateResponse {
        let ledger = self.orchestrator.ledger();
        let history = self.orchestrator.history();

        RoundStateResponse {
            table_id: self.table_id.clone(),
            phase: self.orchestrator.phase(),
            round: self.orchestrator.current_round().cloned(),
            remaining_secs: self.orchestrator.remaining(),
            awaiting_result: self.orchestrator.is_awaiting_result(),
            stakes: ledger.snapshot(),
            total: ledger.total(),
            last_result: history.latest().map(|record| record.result.clone()),
            stats: history.stats(),
        }
    }
}
