//! Round orchestrator configuration.

use crate::{ledger::BetLimits, timer::DEFAULT_TICK_INTERVAL_SECS};
use serde::{Deserialize, Serialize};

/// Seconds before betting closes at which the closing warning fires.
///
/// Fixed for every round; not part of [`RoundConfig`].
pub const BETTING_WARNING_SECS: f64 = 5.0;

/// What to do when no result arrives before the grace period runs out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultPolicy {
    /// Abort the round; outcomes are never fabricated
    #[default]
    Authoritative,
    /// Synthesize a degraded placeholder result (demo and test builds)
    Simulated,
}

impl std::fmt::Display for ResultPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultPolicy::Authoritative => write!(f, "authoritative"),
            ResultPolicy::Simulated => write!(f, "simulated"),
        }
    }
}

impl std::str::FromStr for ResultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "authoritative" => Ok(Self::Authoritative),
            "simulated" => Ok(Self::Simulated),
            other => Err(format!("unknown result policy: {other}")),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Dealing phase length in seconds (default: 5)
    pub dealing_duration_secs: f64,

    /// How long the result stays on display before the table idles (default: 4)
    pub result_display_secs: f64,

    /// Extra wait for a late result once dealing is complete (default: 3)
    pub result_grace_secs: f64,

    /// Spacing of timer ticks in seconds (default: 1)
    pub tick_interval_secs: f64,

    /// How often the actor feeds elapsed time to the orchestrator
    pub poll_interval_ms: u64,

    /// Missing-result handling
    pub result_policy: ResultPolicy,

    /// Stake ceilings
    pub limits: BetLimits,

    /// Number of finished rounds kept for statistics
    pub history_len: usize,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            dealing_duration_secs: 5.0,
            result_display_secs: 4.0,
            result_grace_secs: 3.0,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            poll_interval_ms: 100,
            result_policy: ResultPolicy::Authoritative,
            limits: BetLimits::default(),
            history_len: 64,
        }
    }
}

impl RoundConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let durations = [
            ("Dealing duration", self.dealing_duration_secs),
            ("Result display", self.result_display_secs),
            ("Result grace", self.result_grace_secs),
        ];
        for (name, secs) in durations {
            if !secs.is_finite() || secs < 0.0 {
                return Err(format!("{name} must be a non-negative number of seconds"));
            }
        }

        if !self.tick_interval_secs.is_finite() || self.tick_interval_secs <= 0.0 {
            return Err("Tick interval must be positive".to_string());
        }

        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be positive".to_string());
        }

        self.limits.validate()
    }

    /// Configuration for demo builds that fill in missing results
    #[must_use]
    pub fn simulated() -> Self {
        Self {
            result_policy: ResultPolicy::Simulated,
            ..Self::default()
        }
    }
}
