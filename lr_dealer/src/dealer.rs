//! Simulated participants around a round actor: bettors and the card shoe.

use live_round::{
    events::{EventKind, RoundEvent},
    ledger::{BetCategory, Chips},
    round::{OrchestratorResult, Phase, ResultDelivery, ResultSimulator, RoundError, RoundStart},
    table::RoundHandle,
};
use rand::Rng;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use uuid::Uuid;

/// Smallest chip a simulated bettor uses
const CHIP: Chips = 10;

/// Bets each simulated bettor attempts per round
const BETS_PER_BETTOR: usize = 3;

/// Drives rounds on one table and plays the dealer side of each round
pub struct Dealer {
    handle: RoundHandle,
    events: mpsc::Receiver<RoundEvent>,
    table_id: String,
    dealer_id: String,
    betting_secs: f64,
    bettors: usize,
    drop_result_rate: f64,
    shoe: Arc<Mutex<ResultSimulator>>,
    round_number: u64,
}

impl Dealer {
    /// Attach a dealer to a running actor
    ///
    /// # Errors
    ///
    /// Returns `ActorClosed` if the actor has already stopped.
    pub async fn attach(
        handle: RoundHandle,
        dealer_id: String,
        betting_secs: f64,
        bettors: usize,
        drop_result_rate: f64,
    ) -> OrchestratorResult<Self> {
        let (_, events) = handle
            .subscribe(&[EventKind::DealingPhaseStarted, EventKind::GameStateChanged], 64)
            .await?;

        Ok(Self {
            table_id: handle.table_id().to_string(),
            handle,
            events,
            dealer_id,
            betting_secs,
            bettors,
            drop_result_rate,
            shoe: Arc::new(Mutex::new(ResultSimulator::new())),
            round_number: 0,
        })
    }

    /// Run one round from start until the table is idle again
    ///
    /// # Errors
    ///
    /// Returns an error if the actor rejects the round or stops mid-round.
    pub async fn run_round(&mut self) -> OrchestratorResult<()> {
        self.round_number += 1;
        let start = RoundStart::new(
            Uuid::new_v4().to_string(),
            self.round_number,
            self.table_id.clone(),
            self.dealer_id.clone(),
            self.betting_secs,
        );
        let round = self.handle.start_round(start).await?;
        log::info!("Dealer {} opened round #{}", self.dealer_id, round.round_number);

        let _bettors = Bettors(
            (0..self.bettors)
                .map(|seat| tokio::spawn(place_bets(self.handle.clone(), seat, self.betting_secs)))
                .collect(),
        );

        while let Some(event) = self.events.recv().await {
            match event {
                RoundEvent::DealingPhaseStarted {
                    round_id,
                    duration_secs,
                } => {
                    tokio::spawn(deal(
                        self.handle.clone(),
                        Arc::clone(&self.shoe),
                        round_id,
                        duration_secs,
                        self.drop_result_rate,
                    ));
                }
                RoundEvent::GameStateChanged {
                    new: Phase::Idle, ..
                } => return Ok(()),
                _ => {}
            }
        }

        Err(RoundError::ActorClosed)
    }
}

/// Bettor tasks of one round, aborted once the round is over or the actor is gone
struct Bettors(Vec<JoinHandle<()>>);

impl Drop for Bettors {
    fn drop(&mut self) {
        for bettor in &self.0 {
            bettor.abort();
        }
    }
}

/// A bettor placing a few random stakes spread over the betting window
async fn place_bets(handle: RoundHandle, seat: usize, betting_secs: f64) {
    for _ in 0..BETS_PER_BETTOR {
        let (delay, category, amount) = {
            let mut rng = rand::rng();
            let delay = rng.random_range(0.0..=betting_secs / BETS_PER_BETTOR as f64);
            let category = BetCategory::ALL[rng.random_range(0..BetCategory::ALL.len())];
            let amount = CHIP * rng.random_range(1..=50);
            (delay, category, amount)
        };
        sleep(Duration::from_secs_f64(delay)).await;

        match handle.submit_bet(category, amount).await {
            Ok(total) => log::debug!("Seat {seat}: {amount} on {category} (now {total})"),
            Err(RoundError::ActorClosed) => return,
            Err(e) => log::debug!("Seat {seat}: {e}"),
        }
    }
}

/// The shoe: finishes dealing at a random point and reports the result,
/// unless it stays silent
async fn deal(
    handle: RoundHandle,
    shoe: Arc<Mutex<ResultSimulator>>,
    round_id: String,
    dealing_secs: f64,
    drop_result_rate: f64,
) {
    let (deal_time, silent) = {
        let mut rng = rand::rng();
        (
            rng.random_range(0.5..=1.0) * dealing_secs,
            rng.random_bool(drop_result_rate),
        )
    };
    sleep(Duration::from_secs_f64(deal_time)).await;

    if silent {
        log::warn!("Shoe lost the result of round {round_id}");
        return;
    }

    let result = shoe
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .synthesize(&round_id);

    match handle.deliver_result(result).await {
        Ok(ResultDelivery::Dropped) => log::warn!("Result of round {round_id} came too late"),
        Ok(_) => {
            if let Err(e) = handle.complete_dealing().await {
                log::debug!("Round {round_id}: {e}");
            }
        }
        Err(e) => log::error!("Round {round_id}: result rejected: {e}"),
    }
}
