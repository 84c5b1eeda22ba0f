//! Round orchestrator state machine.

use super::{
    config::{BETTING_WARNING_SECS, ResultPolicy, RoundConfig},
    errors::{Command, OrchestratorResult, RoundError},
    history::{RoundHistory, RoundRecord},
    models::{Phase, ResultDelivery, Round, RoundResult, RoundStart},
    settlement::Settlement,
    simulator::ResultSimulator,
};
use crate::{
    events::{ErrorKind, EventBus, RoundEvent},
    ledger::{BetCategory, BetLedger, BetOrder, Chips, Stakes},
    timer::{PhaseTimer, TimerSignal},
};
use std::sync::Arc;

/// Drives one table through `Idle -> Betting -> Dealing -> Result -> Idle`.
///
/// The orchestrator owns the bet ledger and the phase timer. It never reads a
/// clock: the owner calls [`RoundOrchestrator::advance`] with elapsed time and
/// forwards commands from the gateway. Every transition publishes on the
/// injected [`EventBus`] before the call returns.
#[derive(Debug)]
pub struct RoundOrchestrator {
    config: RoundConfig,
    bus: Arc<EventBus>,
    phase: Phase,
    ledger: BetLedger,
    timer: PhaseTimer,
    /// Most recent round; kept while idle until the next one supersedes it
    round: Option<Round>,
    /// Ledger frozen when betting closed
    order: Option<BetOrder>,
    /// Result delivered before dealing completed
    pending_result: Option<RoundResult>,
    /// Dealing is complete and the grace timer is running
    awaiting_result: bool,
    /// Closing warning already published this round
    warned: bool,
    history: RoundHistory,
    simulator: ResultSimulator,
}

impl RoundOrchestrator {
    /// Create an idle orchestrator publishing on `bus`.
    ///
    /// `config` is expected to pass [`RoundConfig::validate`].
    #[must_use]
    pub fn new(config: RoundConfig, bus: Arc<EventBus>) -> Self {
        Self {
            ledger: BetLedger::new(config.limits.clone()),
            timer: PhaseTimer::new(config.tick_interval_secs),
            history: RoundHistory::new(config.history_len),
            config,
            bus,
            phase: Phase::Idle,
            round: None,
            order: None,
            pending_result: None,
            awaiting_result: false,
            warned: false,
            simulator: ResultSimulator::new(),
        }
    }

    /// Replace the placeholder result source
    #[must_use]
    pub fn with_simulator(mut self, simulator: ResultSimulator) -> Self {
        self.simulator = simulator;
        self
    }

    // === Commands ===

    /// Open betting for a new round
    ///
    /// # Errors
    ///
    /// * `IllegalTransition` if a round is already running
    /// * `InvalidDuration` if the betting window is negative or not finite
    /// * `DuplicateRoundId` / `NonMonotonicRound` if the round does not follow the previous one
    pub fn start_round(&mut self, start: RoundStart) -> OrchestratorResult<Round> {
        if self.phase != Phase::Idle {
            return Err(RoundError::IllegalTransition {
                command: Command::StartRound,
                phase: self.phase,
            });
        }

        if !start.betting_duration.is_finite() || start.betting_duration < 0.0 {
            return Err(RoundError::InvalidDuration(start.betting_duration));
        }

        if let Some(previous) = &self.round {
            if previous.round_id == start.round_id {
                return Err(RoundError::DuplicateRoundId(start.round_id));
            }
            if start.round_number <= previous.round_number {
                return Err(RoundError::NonMonotonicRound {
                    last: previous.round_number,
                    got: start.round_number,
                });
            }
        }

        let round = Round::from(start);
        self.ledger.clear();
        self.order = None;
        self.pending_result = None;
        self.awaiting_result = false;
        self.warned = false;
        self.round = Some(round.clone());
        self.restart_timer(round.betting_duration);

        log::info!(
            "Round {} (#{}) started at table {}",
            round.round_id,
            round.round_number,
            round.table_id
        );

        self.publish(RoundEvent::RoundStarted {
            round: round.clone(),
        });
        self.set_phase(Phase::Betting);
        self.publish(RoundEvent::BettingPhaseStarted {
            round_id: round.round_id.clone(),
            duration_secs: round.betting_duration,
        });

        Ok(round)
    }

    /// Stake `amount` on `category`; returns the new category total
    ///
    /// # Errors
    ///
    /// * `Sequence` outside the betting phase
    /// * `Bet` if the ledger rejects the stake
    pub fn submit_bet(&mut self, category: BetCategory, amount: Chips) -> OrchestratorResult<Chips> {
        self.require(Phase::Betting, Command::SubmitBet)?;
        let total = self.ledger.place_bet(category, amount)?;
        self.publish_ledger();
        Ok(total)
    }

    /// Withdraw up to `amount` from `category`; returns the amount removed
    pub fn cancel_bet(&mut self, category: BetCategory, amount: Chips) -> OrchestratorResult<Chips> {
        self.require(Phase::Betting, Command::CancelBet)?;
        let removed = self.ledger.cancel_bet(category, amount)?;
        if removed > 0 {
            self.publish_ledger();
        }
        Ok(removed)
    }

    /// Hand over the authoritative result for the round being dealt.
    ///
    /// Results arriving while idle or already showing a result, or carrying
    /// another round's id, are dropped with a warning. Results flagged as
    /// degraded are rejected; only the grace timeout synthesizes those.
    pub fn deliver_result(&mut self, result: RoundResult) -> OrchestratorResult<ResultDelivery> {
        match self.phase {
            Phase::Betting => Err(RoundError::Sequence {
                command: Command::DeliverResult,
                phase: self.phase,
            }),
            Phase::Idle | Phase::Result => {
                log::warn!(
                    "Dropping result for round {} received during {} phase",
                    result.round_id,
                    self.phase
                );
                Ok(ResultDelivery::Dropped)
            }
            Phase::Dealing => {
                let round_id = self.round_id();
                if result.round_id != round_id {
                    log::warn!(
                        "Dropping result for round {} while dealing round {}",
                        result.round_id,
                        round_id
                    );
                    return Ok(ResultDelivery::Dropped);
                }

                result.validate().map_err(RoundError::InvalidResult)?;
                if result.degraded {
                    return Err(RoundError::InvalidResult(
                        "Degraded placeholders cannot be delivered".to_string(),
                    ));
                }

                if self.pending_result.is_some() {
                    return Err(RoundError::ResultAlreadyDelivered(round_id));
                }

                if self.awaiting_result {
                    self.enter_result(result);
                    Ok(ResultDelivery::Applied)
                } else {
                    log::debug!("Round {round_id}: result held until dealing completes");
                    self.pending_result = Some(result);
                    Ok(ResultDelivery::Accepted)
                }
            }
        }
    }

    /// External signal that the cards are on the table
    pub fn complete_dealing(&mut self) -> OrchestratorResult<()> {
        self.require(Phase::Dealing, Command::CompleteDealing)?;
        if self.awaiting_result {
            return Err(RoundError::Sequence {
                command: Command::CompleteDealing,
                phase: self.phase,
            });
        }
        self.finish_dealing();
        Ok(())
    }

    /// Cancel the active timer and force the next transition.
    ///
    /// Returns the phase entered.
    pub fn manual_advance(&mut self) -> OrchestratorResult<Phase> {
        match self.phase {
            Phase::Idle => {
                return Err(RoundError::Sequence {
                    command: Command::ManualAdvance,
                    phase: self.phase,
                });
            }
            Phase::Betting => self.close_betting(),
            Phase::Dealing if self.awaiting_result => self.on_result_timeout(),
            Phase::Dealing => self.finish_dealing(),
            Phase::Result => self.finish_round(),
        }
        Ok(self.phase)
    }

    /// Operator reset back to idle from any phase
    pub fn reset(&mut self, reason: &str) {
        self.abort(ErrorKind::Reset, reason.to_string());
    }

    /// External fatal error; the round is abandoned
    pub fn fail(&mut self, message: &str) {
        self.abort(ErrorKind::Fatal, message.to_string());
    }

    /// Feed `elapsed` seconds to the active phase timer and apply the
    /// resulting transitions.
    ///
    /// Leftover time after an expiry is not carried into the next phase.
    pub fn advance(&mut self, elapsed: f64) {
        for signal in self.timer.advance(elapsed) {
            match signal {
                TimerSignal::Tick { remaining } => self.on_tick(remaining),
                TimerSignal::Expired => self.on_expired(),
            }
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The running round, or the last one while idle
    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    #[must_use]
    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    #[must_use]
    pub fn ledger_snapshot(&self) -> Stakes {
        self.ledger.snapshot()
    }

    /// Order frozen when betting closed
    #[must_use]
    pub fn submitted_order(&self) -> Option<&BetOrder> {
        self.order.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    /// Seconds left on the active timer, 0 when none is running
    #[must_use]
    pub fn remaining(&self) -> f64 {
        if self.timer.is_running() {
            self.timer.remaining()
        } else {
            0.0
        }
    }

    /// Dealing is complete but no result has arrived yet
    #[must_use]
    pub fn is_awaiting_result(&self) -> bool {
        self.awaiting_result
    }

    #[must_use]
    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    // === Transitions ===

    fn on_tick(&mut self, remaining: f64) {
        if self.phase == Phase::Betting && !self.warned && remaining <= BETTING_WARNING_SECS {
            self.warned = true;
            self.publish(RoundEvent::BettingPhaseEnding {
                round_id: self.round_id(),
                remaining_secs: remaining,
            });
        }
    }

    fn on_expired(&mut self) {
        match self.phase {
            Phase::Betting => self.close_betting(),
            Phase::Dealing if self.awaiting_result => self.on_result_timeout(),
            Phase::Dealing => self.finish_dealing(),
            Phase::Result => self.finish_round(),
            Phase::Idle => log::debug!("Ignoring timer expiry while idle"),
        }
    }

    fn close_betting(&mut self) {
        let round_id = self.round_id();
        let order = BetOrder::new(round_id.clone(), self.ledger.snapshot());
        self.order = Some(order.clone());

        log::info!(
            "Round {round_id}: betting closed, {} staked across {} categories",
            order.total,
            order.stakes.len()
        );

        self.publish(RoundEvent::BettingPhaseEnded {
            round_id: round_id.clone(),
            order,
        });
        self.restart_timer(self.config.dealing_duration_secs);
        self.set_phase(Phase::Dealing);
        self.publish(RoundEvent::DealingPhaseStarted {
            round_id,
            duration_secs: self.config.dealing_duration_secs,
        });
    }

    fn finish_dealing(&mut self) {
        self.timer.cancel();
        let round_id = self.round_id();
        self.publish(RoundEvent::DealingCompleted {
            round_id: round_id.clone(),
        });

        match self.pending_result.take() {
            Some(result) => self.enter_result(result),
            None => {
                log::info!(
                    "Round {round_id}: waiting up to {}s for result",
                    self.config.result_grace_secs
                );
                self.awaiting_result = true;
                self.restart_timer(self.config.result_grace_secs);
            }
        }
    }

    fn on_result_timeout(&mut self) {
        self.awaiting_result = false;
        let round_id = self.round_id();
        let error = RoundError::ResultTimeout {
            round_id: round_id.clone(),
            grace_secs: self.config.result_grace_secs,
        };

        match self.config.result_policy {
            ResultPolicy::Simulated => {
                log::warn!("{error}; synthesizing placeholder result");
                self.publish(RoundEvent::Error {
                    round_id: Some(round_id.clone()),
                    kind: ErrorKind::DegradedResult,
                    message: error.to_string(),
                });
                let result = self.simulator.synthesize_degraded(&round_id);
                self.enter_result(result);
            }
            ResultPolicy::Authoritative => {
                self.abort(ErrorKind::ResultTimeout, error.to_string());
            }
        }
    }

    fn enter_result(&mut self, result: RoundResult) {
        self.timer.cancel();
        self.awaiting_result = false;

        let round_id = self.round_id();
        let order = self
            .order
            .clone()
            .unwrap_or_else(|| BetOrder::new(round_id.clone(), Stakes::new()));
        let settlement = Settlement::compute(&order, &result);

        if let Some(round) = self.round.clone() {
            self.history.push(RoundRecord {
                round,
                result: result.clone(),
                settlement: settlement.clone(),
            });
        }

        log::info!(
            "Round {round_id}: {} ({}-{}), payout {} on {} staked",
            result.outcome,
            result.player_points,
            result.banker_points,
            settlement.total_payout,
            settlement.total_stake
        );

        self.set_phase(Phase::Result);
        self.publish(RoundEvent::RoundResultAvailable {
            round_id,
            result,
            settlement,
        });
        self.restart_timer(self.config.result_display_secs);
    }

    fn finish_round(&mut self) {
        self.timer.cancel();
        self.set_phase(Phase::Idle);
        log::debug!("Round {} finished", self.round_id());
    }

    fn abort(&mut self, kind: ErrorKind, message: String) {
        self.timer.cancel();
        self.ledger.clear();
        self.order = None;
        self.pending_result = None;
        self.awaiting_result = false;

        let round_id = (self.phase != Phase::Idle).then(|| self.round_id());
        if self.phase != Phase::Idle {
            self.set_phase(Phase::Idle);
        }

        match kind {
            ErrorKind::Reset => log::warn!("Reset to idle: {message}"),
            _ => log::error!("Round aborted: {message}"),
        }

        self.publish(RoundEvent::Error {
            round_id,
            kind,
            message,
        });
    }

    // === Helpers ===

    fn require(&self, phase: Phase, command: Command) -> OrchestratorResult<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(RoundError::Sequence {
                command,
                phase: self.phase,
            })
        }
    }

    fn restart_timer(&mut self, duration: f64) {
        self.timer.cancel();
        if let Err(e) = self.timer.start(duration) {
            log::error!("Round {}: {e}, expiring immediately", self.round_id());
            // Cannot fail: the timer was cancelled above and zero is a valid duration
            let _ = self.timer.start(0.0);
        }
    }

    fn set_phase(&mut self, new: Phase) {
        let old = self.phase;
        debug_assert!(
            new == old.next() || new == Phase::Idle,
            "illegal phase change {old} -> {new}"
        );
        self.phase = new;
        self.publish(RoundEvent::GameStateChanged {
            round_id: self.round.as_ref().map(|r| r.round_id.clone()),
            old,
            new,
        });
    }

    fn publish_ledger(&self) {
        self.publish(RoundEvent::BetLedgerChanged {
            round_id: self.round_id(),
            stakes: self.ledger.snapshot(),
            total: self.ledger.total(),
        });
    }

    fn publish(&self, event: RoundEvent) {
        log::debug!("{event}");
        self.bus.publish(&event);
    }

    fn round_id(&self) -> String {
        self.round
            .as_ref()
            .map(|r| r.round_id.clone())
            .unwrap_or_default()
    }
}
