//! Round data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the round cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Betting,
    Dealing,
    Result,
}

impl Phase {
    /// The phase that follows this one in a normal round
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Phase::Idle => Phase::Betting,
            Phase::Betting => Phase::Dealing,
            Phase::Dealing => Phase::Result,
            Phase::Result => Phase::Idle,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Betting => write!(f, "betting"),
            Phase::Dealing => write!(f, "dealing"),
            Phase::Result => write!(f, "result"),
        }
    }
}

/// Round-start command as received from the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStart {
    pub round_id: String,
    pub round_number: u64,
    pub table_id: String,
    pub dealer_id: String,
    /// Betting window in seconds
    pub betting_duration: f64,
}

impl RoundStart {
    pub fn new(
        round_id: impl Into<String>,
        round_number: u64,
        table_id: impl Into<String>,
        dealer_id: impl Into<String>,
        betting_duration: f64,
    ) -> Self {
        Self {
            round_id: round_id.into(),
            round_number,
            table_id: table_id.into(),
            dealer_id: dealer_id.into(),
            betting_duration,
        }
    }
}

/// Identity of one round. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_id: String,
    pub round_number: u64,
    pub table_id: String,
    pub dealer_id: String,
    pub start_time: DateTime<Utc>,
    pub betting_duration: f64,
}

impl From<RoundStart> for Round {
    fn from(value: RoundStart) -> Self {
        Self {
            round_id: value.round_id,
            round_number: value.round_number,
            table_id: value.table_id,
            dealer_id: value.dealer_id,
            start_time: Utc::now(),
            betting_duration: value.betting_duration,
        }
    }
}

/// Main hand outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    BankerWin,
    PlayerWin,
    Tie,
}

impl Outcome {
    /// Outcome implied by the two point totals
    #[must_use]
    pub fn from_points(player_points: u8, banker_points: u8) -> Self {
        match player_points.cmp(&banker_points) {
            std::cmp::Ordering::Greater => Outcome::PlayerWin,
            std::cmp::Ordering::Less => Outcome::BankerWin,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BankerWin => write!(f, "banker wins"),
            Outcome::PlayerWin => write!(f, "player wins"),
            Outcome::Tie => write!(f, "tie"),
        }
    }
}

/// Highest baccarat point total
pub const MAX_POINTS: u8 = 9;

/// Fewest cards dealt in a hand (two per side)
pub const MIN_CARDS: u8 = 4;

/// Most cards dealt in a hand (third card on both sides)
pub const MAX_CARDS: u8 = 6;

/// Outcome of a round, supplied by the dealer service or synthesized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round_id: String,
    pub player_points: u8,
    pub banker_points: u8,
    pub outcome: Outcome,
    pub player_pair: bool,
    pub banker_pair: bool,
    /// Total cards dealt to both sides
    pub card_count: u8,
    /// Placeholder synthesized without an authoritative source
    #[serde(default)]
    pub degraded: bool,
}

impl RoundResult {
    /// Build a result whose outcome follows from the points
    #[must_use]
    pub fn new(
        round_id: impl Into<String>,
        player_points: u8,
        banker_points: u8,
        card_count: u8,
    ) -> Self {
        Self {
            round_id: round_id.into(),
            player_points,
            banker_points,
            outcome: Outcome::from_points(player_points, banker_points),
            player_pair: false,
            banker_pair: false,
            card_count,
            degraded: false,
        }
    }

    #[must_use]
    pub fn with_pairs(mut self, player_pair: bool, banker_pair: bool) -> Self {
        self.player_pair = player_pair;
        self.banker_pair = banker_pair;
        self
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.player_points > MAX_POINTS || self.banker_points > MAX_POINTS {
            return Err(format!(
                "Points must be between 0 and {MAX_POINTS}, got {}-{}",
                self.player_points, self.banker_points
            ));
        }

        if !(MIN_CARDS..=MAX_CARDS).contains(&self.card_count) {
            return Err(format!(
                "Card count must be between {MIN_CARDS} and {MAX_CARDS}, got {}",
                self.card_count
            ));
        }

        let implied = Outcome::from_points(self.player_points, self.banker_points);
        if implied != self.outcome {
            return Err(format!(
                "Outcome {} contradicts points {}-{}",
                self.outcome, self.player_points, self.banker_points
            ));
        }

        Ok(())
    }

    /// Banker won holding six points
    #[must_use]
    pub fn is_super_six(&self) -> bool {
        self.outcome == Outcome::BankerWin && self.banker_points == 6
    }

    /// Five or six cards were dealt
    #[must_use]
    pub fn is_big(&self) -> bool {
        self.card_count > MIN_CARDS
    }
}

/// What happened to a delivered result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultDelivery {
    /// Held until dealing completes
    Accepted,
    /// Dealing had already completed; the round moved to Result
    Applied,
    /// Late, stale or duplicate delivery; ignored
    Dropped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle() {
        let mut phase = Phase::default();
        let mut seen = vec![phase];
        for _ in 0..4 {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                Phase::Idle,
                Phase::Betting,
                Phase::Dealing,
                Phase::Result,
                Phase::Idle
            ]
        );
    }

    #[test]
    fn test_outcome_from_points() {
        assert_eq!(Outcome::from_points(8, 3), Outcome::PlayerWin);
        assert_eq!(Outcome::from_points(2, 7), Outcome::BankerWin);
        assert_eq!(Outcome::from_points(5, 5), Outcome::Tie);
    }

    #[test]
    fn test_round_from_start() {
        let start = RoundStart::new("R1", 1, "T1", "D1", 15.0);
        let round = Round::from(start);
        assert_eq!(round.round_id, "R1");
        assert_eq!(round.round_number, 1);
        assert_eq!(round.betting_duration, 15.0);
    }

    #[test]
    fn test_result_validation() {
        assert!(RoundResult::new("R1", 9, 2, 4).validate().is_ok());
        assert!(RoundResult::new("R1", 10, 2, 4).validate().is_err());
        assert!(RoundResult::new("R1", 1, 2, 3).validate().is_err());
        assert!(RoundResult::new("R1", 1, 2, 7).validate().is_err());

        let mut result = RoundResult::new("R1", 1, 2, 5);
        result.outcome = Outcome::PlayerWin;
        assert!(result.validate().is_err());
    }

    #[test]
    fn test_result_flags() {
        let result = RoundResult::new("R1", 4, 6, 5);
        assert!(result.is_super_six());
        assert!(result.is_big());

        let result = RoundResult::new("R1", 6, 6, 4);
        assert!(!result.is_super_six());
        assert!(!result.is_big());
    }

    #[test]
    fn test_result_degraded_defaults_false_when_missing() {
        let json = r#"{"round_id":"R1","player_points":3,"banker_points":1,"outcome":"player_win","player_pair":false,"banker_pair":true,"card_count":5}"#;
        let result: RoundResult = serde_json::from_str(json).unwrap();
        assert!(!result.degraded);
        assert!(result.banker_pair);
    }
}
