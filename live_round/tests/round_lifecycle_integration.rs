/// Integration tests for the round lifecycle
///
/// These tests drive a RoundOrchestrator through complete rounds and check
/// the events observed on the bus, the ledger, and the settled history.
use live_round::{
    events::{ErrorKind, EventBus, EventKind, RoundEvent},
    ledger::{BetCategory, BetError, BetLimits},
    round::{
        Outcome, Phase, ResultDelivery, ResultPolicy, ResultSimulator, RoundConfig, RoundError,
        RoundOrchestrator, RoundResult, RoundStart,
    },
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

type Recorded = Arc<Mutex<Vec<RoundEvent>>>;

fn setup(config: RoundConfig) -> (RoundOrchestrator, Recorded) {
    let bus = Arc::new(EventBus::new());
    let events: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    bus.subscribe_all(Arc::new(move |event: &RoundEvent| {
        sink.lock().unwrap().push(event.clone());
    }));

    let orchestrator = RoundOrchestrator::new(config, bus).with_simulator(ResultSimulator::seeded(11));
    (orchestrator, events)
}

fn kinds(events: &Recorded) -> Vec<EventKind> {
    events.lock().unwrap().iter().map(RoundEvent::kind).collect()
}

fn phases(events: &Recorded) -> Vec<Phase> {
    let events = events.lock().unwrap();
    let mut phases = Vec::new();
    for event in events.iter() {
        if let RoundEvent::GameStateChanged { old, new, .. } = event {
            if phases.is_empty() {
                phases.push(*old);
            }
            phases.push(*new);
        }
    }
    phases
}

#[test]
fn test_betting_closes_after_window() {
    let (mut orchestrator, events) = setup(RoundConfig::default());

    orchestrator
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 3.0))
        .unwrap();
    orchestrator.submit_bet(BetCategory::Banker, 100).unwrap();

    let snapshot = orchestrator.ledger_snapshot();
    assert_eq!(snapshot.into_iter().collect::<Vec<_>>(), vec![(BetCategory::Banker, 100)]);

    orchestrator.advance(1.0);
    orchestrator.advance(1.0);
    assert_eq!(orchestrator.phase(), Phase::Betting);
    orchestrator.advance(1.0);

    let kinds = kinds(&events);
    let ended = kinds.iter().position(|k| *k == EventKind::BettingPhaseEnded);
    let dealing = kinds.iter().position(|k| *k == EventKind::DealingPhaseStarted);
    assert!(ended.is_some());
    assert!(ended < dealing);

    let order = events
        .lock()
        .unwrap()
        .iter()
        .find_map(|e| match e {
            RoundEvent::BettingPhaseEnded { order, .. } => Some(order.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(order.round_id, "R1");
    assert_eq!(order.stake(BetCategory::Banker), 100);
    assert_eq!(order.total, 100);
}

#[test]
fn test_category_ceiling_rejects_second_bet() {
    let (mut orchestrator, _) = setup(RoundConfig {
        limits: BetLimits::new(10_000, 50_000),
        ..RoundConfig::default()
    });
    orchestrator
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 15.0))
        .unwrap();

    orchestrator.submit_bet(BetCategory::Banker, 6000).unwrap();
    let err = orchestrator.submit_bet(BetCategory::Banker, 5000).unwrap_err();

    assert_eq!(
        err,
        RoundError::Bet(BetError::CategoryLimitExceeded {
            category: BetCategory::Banker,
            current: 6000,
            requested: 5000,
            limit: 10_000,
        })
    );
    assert!(err.is_recoverable());
    assert_eq!(orchestrator.ledger().amount(BetCategory::Banker), 6000);
    assert_eq!(orchestrator.ledger().total(), 6000);
}

#[test]
fn test_result_while_idle_is_dropped() {
    let (mut orchestrator, events) = setup(RoundConfig::default());

    let delivery = orchestrator
        .deliver_result(RoundResult::new("R1", 5, 6, 5))
        .unwrap();

    assert_eq!(delivery, ResultDelivery::Dropped);
    assert_eq!(orchestrator.phase(), Phase::Idle);
    assert!(!kinds(&events).contains(&EventKind::RoundResultAvailable));
}

#[test]
fn test_several_rounds_build_history() {
    let (mut orchestrator, events) = setup(RoundConfig {
        dealing_duration_secs: 2.0,
        result_display_secs: 1.0,
        ..RoundConfig::default()
    });

    let scores = [(8, 3), (2, 7), (4, 4)];
    for (i, (player, banker)) in scores.into_iter().enumerate() {
        let number = i as u64 + 1;
        let round_id = format!("R{number}");
        orchestrator
            .start_round(RoundStart::new(&round_id, number, "T1", "D1", 2.0))
            .unwrap();
        orchestrator.submit_bet(BetCategory::Player, 100).unwrap();
        orchestrator.advance(2.0);

        orchestrator
            .deliver_result(RoundResult::new(&round_id, player, banker, 4))
            .unwrap();
        orchestrator.advance(2.0);
        orchestrator.advance(1.0);
        assert_eq!(orchestrator.phase(), Phase::Idle);
    }

    let history = orchestrator.history();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.outcomes(),
        vec![Outcome::PlayerWin, Outcome::BankerWin, Outcome::Tie]
    );

    let stats = history.stats();
    assert_eq!(stats.player_wins, 1);
    assert_eq!(stats.banker_wins, 1);
    assert_eq!(stats.ties, 1);

    // Player wins 1:1, loses, then pushes on the tie
    let payouts: Vec<i64> = history.iter().map(|r| r.settlement.total_payout).collect();
    assert_eq!(payouts, vec![200, 0, 100]);

    let started = kinds(&events)
        .into_iter()
        .filter(|k| *k == EventKind::RoundStarted)
        .count();
    assert_eq!(started, 3);
}

#[test]
fn test_grace_timeout_then_next_round() {
    let (mut orchestrator, events) = setup(RoundConfig {
        dealing_duration_secs: 1.0,
        result_grace_secs: 2.0,
        ..RoundConfig::default()
    });

    orchestrator
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 1.0))
        .unwrap();
    orchestrator.submit_bet(BetCategory::Tie, 50).unwrap();
    orchestrator.advance(1.0);
    orchestrator.advance(1.0);
    assert!(orchestrator.is_awaiting_result());

    orchestrator.advance(2.0);
    assert_eq!(orchestrator.phase(), Phase::Idle);
    assert!(orchestrator.ledger().is_empty());
    assert!(orchestrator.history().is_empty());

    let timeout = events.lock().unwrap().iter().any(|e| {
        matches!(
            e,
            RoundEvent::Error {
                kind: ErrorKind::ResultTimeout,
                round_id: Some(id),
                ..
            } if id == "R1"
        )
    });
    assert!(timeout);

    // A late result for the abandoned round changes nothing
    assert_eq!(
        orchestrator.deliver_result(RoundResult::new("R1", 1, 2, 4)),
        Ok(ResultDelivery::Dropped)
    );

    orchestrator
        .start_round(RoundStart::new("R2", 2, "T1", "D1", 1.0))
        .unwrap();
    assert_eq!(orchestrator.phase(), Phase::Betting);
}

#[test]
fn test_simulated_policy_keeps_table_moving() {
    let (mut orchestrator, _) = setup(RoundConfig {
        dealing_duration_secs: 1.0,
        result_grace_secs: 1.0,
        result_display_secs: 1.0,
        ..RoundConfig::simulated()
    });
    assert_eq!(orchestrator.config().result_policy, ResultPolicy::Simulated);

    for number in 1..=5u64 {
        orchestrator
            .start_round(RoundStart::new(format!("R{number}"), number, "T1", "D1", 1.0))
            .unwrap();
        for _ in 0..4 {
            orchestrator.advance(1.0);
        }
        assert_eq!(orchestrator.phase(), Phase::Idle);
    }

    let stats = orchestrator.history().stats();
    assert_eq!(stats.rounds, 5);
    assert_eq!(stats.degraded, 5);
}

#[test]
fn test_bus_subscriber_added_mid_round_sees_later_events_only() {
    let (mut orchestrator, _) = setup(RoundConfig::default());
    orchestrator
        .start_round(RoundStart::new("R1", 1, "T1", "D1", 1.0))
        .unwrap();

    let late: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&late);
    orchestrator.bus().subscribe(
        EventKind::GameStateChanged,
        Arc::new(move |event: &RoundEvent| sink.lock().unwrap().push(event.clone())),
    );

    orchestrator.advance(1.0);
    assert_eq!(phases(&late), vec![Phase::Betting, Phase::Dealing]);
}

fn duration() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 0.0f64..20.0]
}

proptest! {
    #[test]
    fn test_phase_sequence_for_any_durations(
        betting in duration(),
        dealing in duration(),
        display in duration(),
        step in 0.05f64..3.0,
    ) {
        let (mut orchestrator, events) = setup(RoundConfig {
            dealing_duration_secs: dealing,
            result_display_secs: display,
            ..RoundConfig::default()
        });

        orchestrator
            .start_round(RoundStart::new("R1", 1, "T1", "D1", betting))
            .unwrap();

        let mut delivered = false;
        for _ in 0..2000 {
            if orchestrator.phase() == Phase::Idle {
                break;
            }
            if orchestrator.phase() == Phase::Dealing && !delivered {
                orchestrator
                    .deliver_result(RoundResult::new("R1", 6, 2, 5))
                    .unwrap();
                delivered = true;
            }
            orchestrator.advance(step);
        }

        prop_assert_eq!(
            phases(&events),
            vec![Phase::Idle, Phase::Betting, Phase::Dealing, Phase::Result, Phase::Idle]
        );

        let warnings = kinds(&events)
            .into_iter()
            .filter(|k| *k == EventKind::BettingPhaseEnding)
            .count();
        prop_assert!(warnings <= 1);
        // A tick of 1s inside a window longer than 5s always lands on the threshold
        if betting > 5.0 + f64::EPSILON {
            prop_assert_eq!(warnings, 1);
        }
    }

    #[test]
    fn test_bets_outside_betting_never_mutate(amount in 1i64..5000, category_index in 0usize..8) {
        let (mut orchestrator, _) = setup(RoundConfig::default());
        let category = BetCategory::ALL[category_index];

        let idle = orchestrator.submit_bet(category, amount);
        let is_sequence_error = matches!(idle, Err(RoundError::Sequence { .. }));
        prop_assert!(is_sequence_error);

        orchestrator
            .start_round(RoundStart::new("R1", 1, "T1", "D1", 1.0))
            .unwrap();
        orchestrator.submit_bet(category, amount).unwrap();
        orchestrator.advance(1.0);

        let dealing = orchestrator.submit_bet(category, amount);
        let is_sequence_error = matches!(dealing, Err(RoundError::Sequence { .. }));
        prop_assert!(is_sequence_error);
        prop_assert_eq!(orchestrator.ledger().total(), amount);
    }
}
