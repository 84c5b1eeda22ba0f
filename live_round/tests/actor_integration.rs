/// Integration tests for the round actor
///
/// These tests run a RoundActor on a paused tokio clock so that phase timers
/// elapse deterministically.
use live_round::{
    events::{ErrorKind, EventBus, EventKind, RoundEvent},
    ledger::BetCategory,
    round::{Phase, ResultDelivery, RoundConfig, RoundError, RoundResult, RoundStart},
    table::{RoundActor, RoundHandle},
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, time::sleep};

fn spawn(config: RoundConfig) -> (RoundHandle, Arc<EventBus>) {
    let bus = Arc::new(EventBus::new());
    let (actor, handle) = RoundActor::new("T1", config, Arc::clone(&bus));
    tokio::spawn(actor.run());
    (handle, bus)
}

fn drain(receiver: &mut mpsc::Receiver<RoundEvent>) -> Vec<RoundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn transitions(events: &[RoundEvent]) -> Vec<(Phase, Phase)> {
    events
        .iter()
        .filter_map(|e| match e {
            RoundEvent::GameStateChanged { old, new, .. } => Some((*old, *new)),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_round_runs_on_its_own_clock() {
    let (handle, _) = spawn(RoundConfig::default());
    let (_, mut events) = handle.subscribe(&EventKind::ALL, 256).await.unwrap();

    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 3.0))
        .await
        .unwrap();
    handle.submit_bet(BetCategory::Banker, 100).await.unwrap();
    handle.submit_bet(BetCategory::Tie, 20).await.unwrap();

    sleep(Duration::from_millis(2900)).await;
    assert_eq!(handle.state().await.unwrap().phase, Phase::Betting);

    sleep(Duration::from_millis(200)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.phase, Phase::Dealing);
    assert_eq!(state.total, 120);

    assert_eq!(
        handle
            .deliver_result(RoundResult::new("R1", 3, 6, 5))
            .await
            .unwrap(),
        ResultDelivery::Accepted
    );

    sleep(Duration::from_secs(5)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.phase, Phase::Result);
    assert_eq!(state.last_result.unwrap().banker_points, 6);

    sleep(Duration::from_secs(4)).await;
    assert_eq!(handle.state().await.unwrap().phase, Phase::Idle);

    let events = drain(&mut events);
    assert_eq!(
        transitions(&events),
        vec![
            (Phase::Idle, Phase::Betting),
            (Phase::Betting, Phase::Dealing),
            (Phase::Dealing, Phase::Result),
            (Phase::Result, Phase::Idle),
        ]
    );

    let settlement = events
        .iter()
        .find_map(|e| match e {
            RoundEvent::RoundResultAvailable { settlement, .. } => Some(settlement.clone()),
            _ => None,
        })
        .unwrap();
    // Banker wins with 6: pays half
    assert_eq!(settlement.total_payout, 150);
}

#[tokio::test(start_paused = true)]
async fn test_warning_before_betting_closes() {
    let (handle, _) = spawn(RoundConfig::default());
    let (_, mut events) = handle
        .subscribe(&[EventKind::BettingPhaseEnding], 16)
        .await
        .unwrap();

    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 10.0))
        .await
        .unwrap();

    sleep(Duration::from_millis(4500)).await;
    assert!(drain(&mut events).is_empty());

    sleep(Duration::from_millis(1000)).await;
    let warnings = drain(&mut events);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        RoundEvent::BettingPhaseEnding { remaining_secs, .. } if (remaining_secs - 5.0).abs() < 1e-6
    ));

    sleep(Duration::from_secs(6)).await;
    assert!(drain(&mut events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_result_aborts_round() {
    let (handle, _) = spawn(RoundConfig::default());
    let (_, mut errors) = handle.subscribe(&[EventKind::Error], 16).await.unwrap();

    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 1.0))
        .await
        .unwrap();
    handle.submit_bet(BetCategory::Player, 500).await.unwrap();

    // Betting 1s, dealing 5s, then grace 3s
    sleep(Duration::from_millis(6500)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.phase, Phase::Dealing);
    assert!(state.awaiting_result);

    sleep(Duration::from_secs(3)).await;
    let state = handle.state().await.unwrap();
    assert_eq!(state.phase, Phase::Idle);
    assert!(state.stakes.is_empty());

    let errors = drain(&mut errors);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        RoundEvent::Error {
            kind: ErrorKind::ResultTimeout,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_late_result_within_grace() {
    let (handle, _) = spawn(RoundConfig::default());
    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 1.0))
        .await
        .unwrap();

    sleep(Duration::from_millis(7000)).await;
    assert!(handle.state().await.unwrap().awaiting_result);

    assert_eq!(
        handle
            .deliver_result(RoundResult::new("R1", 9, 9, 4))
            .await
            .unwrap(),
        ResultDelivery::Applied
    );
    assert_eq!(handle.state().await.unwrap().phase, Phase::Result);
}

#[tokio::test(start_paused = true)]
async fn test_manual_advance_and_reset() {
    let (handle, _) = spawn(RoundConfig::default());
    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 60.0))
        .await
        .unwrap();

    assert_eq!(handle.manual_advance().await, Ok(Phase::Dealing));
    assert!(matches!(
        handle.submit_bet(BetCategory::Big, 10).await,
        Err(RoundError::Sequence { .. })
    ));

    handle.reset("table maintenance").await.unwrap();
    assert_eq!(handle.state().await.unwrap().phase, Phase::Idle);

    // The abandoned betting window never expires into a new transition
    sleep(Duration::from_secs(90)).await;
    assert_eq!(handle.state().await.unwrap().phase, Phase::Idle);

    assert!(matches!(
        handle
            .start_round(RoundStart::new("R1", 2, "T1", "D1", 10.0))
            .await,
        Err(RoundError::DuplicateRoundId(_))
    ));
    handle
        .start_round(RoundStart::new("R2", 2, "T1", "D1", 10.0))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_dropped_subscriber_is_removed() {
    let (handle, bus) = spawn(RoundConfig::default());
    let (_, events) = handle
        .subscribe(&[EventKind::RoundStarted, EventKind::BetLedgerChanged], 4)
        .await
        .unwrap();
    assert_eq!(bus.subscriber_count(EventKind::RoundStarted), 1);

    drop(events);
    handle
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 10.0))
        .await
        .unwrap();

    assert_eq!(bus.subscriber_count(EventKind::RoundStarted), 0);
    assert_eq!(bus.subscriber_count(EventKind::BetLedgerChanged), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_through_handle() {
    let (handle, bus) = spawn(RoundConfig::default());
    let (id, _events) = handle
        .subscribe(&[EventKind::DealingCompleted], 4)
        .await
        .unwrap();
    assert_eq!(bus.subscriber_count(EventKind::DealingCompleted), 1);

    handle.unsubscribe(id).await.unwrap();
    handle.state().await.unwrap();
    assert_eq!(bus.subscriber_count(EventKind::DealingCompleted), 0);
}

#[tokio::test(start_paused = true)]
async fn test_actor_stops_when_handles_dropped() {
    let (actor, handle) = RoundActor::new("T1", RoundConfig::default(), Arc::new(EventBus::new()));
    let task = tokio::spawn(actor.run());

    let second = handle.clone();
    drop(handle);
    assert_eq!(second.table_id(), "T1");
    drop(second);

    task.await.unwrap();
}
