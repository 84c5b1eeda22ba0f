//! Bounded record of finished rounds for statistics consumers.

use super::{
    models::{Outcome, Round, RoundResult},
    settlement::Settlement,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: Round,
    pub result: RoundResult,
    pub settlement: Settlement,
}

/// Aggregate counts over the retained records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub rounds: usize,
    pub banker_wins: usize,
    pub player_wins: usize,
    pub ties: usize,
    pub player_pairs: usize,
    pub banker_pairs: usize,
    pub degraded: usize,
}

/// Ring of the most recent round records
#[derive(Debug, Clone)]
pub struct RoundHistory {
    records: VecDeque<RoundRecord>,
    capacity: usize,
}

impl RoundHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when full
    pub fn push(&mut self, record: RoundRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    #[must_use]
    pub fn latest(&self) -> Option<&RoundRecord> {
        self.records.back()
    }

    /// Records from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Outcomes from oldest to newest, as drawn on a bead road
    #[must_use]
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.records.iter().map(|r| r.result.outcome).collect()
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        self.records
            .iter()
            .fold(HistoryStats::default(), |mut stats, record| {
                let result = &record.result;
                stats.rounds += 1;
                match result.outcome {
                    Outcome::BankerWin => stats.banker_wins += 1,
                    Outcome::PlayerWin => stats.player_wins += 1,
                    Outcome::Tie => stats.ties += 1,
                }
                stats.player_pairs += usize::from(result.player_pair);
                stats.banker_pairs += usize::from(result.banker_pair);
                stats.degraded += usize::from(result.degraded);
                stats
            })
    }
}
