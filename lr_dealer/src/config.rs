//! Dealer configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use live_round::{
    ledger::{BetLimits, DEFAULT_CATEGORY_MAX, DEFAULT_ROUND_MAX},
    round::{ResultPolicy, RoundConfig},
};

/// Default betting window in seconds
pub const DEFAULT_BETTING_SECS: f64 = 15.0;

/// Complete dealer configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct DealerConfig {
    /// Table the rounds run on
    pub table_id: String,
    /// Dealer identity stamped on every round
    pub dealer_id: String,
    /// Rounds to run before exiting, 0 runs forever
    pub rounds: u64,
    /// Betting window in seconds
    pub betting_secs: f64,
    /// Number of simulated bettors
    pub bettors: usize,
    /// Probability that the simulated shoe never reports a result
    pub drop_result_rate: f64,
    /// Orchestrator configuration
    pub round: RoundConfig,
}

impl DealerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `table_id_override` - Optional table ID override (from CLI args)
    /// * `rounds_override` - Optional round count override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<DealerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if `RESULT_POLICY` names an unknown policy
    pub fn from_env(
        table_id_override: Option<String>,
        rounds_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let defaults = RoundConfig::default();

        let table_id = table_id_override
            .or_else(|| std::env::var("TABLE_ID").ok())
            .unwrap_or_else(|| "table-1".to_string());
        let dealer_id = std::env::var("DEALER_ID").unwrap_or_else(|_| "dealer-1".to_string());

        let result_policy = match std::env::var("RESULT_POLICY") {
            Ok(value) => value
                .parse::<ResultPolicy>()
                .map_err(|reason| ConfigError::Invalid {
                    var: "RESULT_POLICY".to_string(),
                    reason,
                })?,
            Err(_) => ResultPolicy::default(),
        };

        let round = RoundConfig {
            dealing_duration_secs: parse_env_or("DEALING_SECS", defaults.dealing_duration_secs),
            result_display_secs: parse_env_or("RESULT_SECS", defaults.result_display_secs),
            result_grace_secs: parse_env_or("RESULT_GRACE_SECS", defaults.result_grace_secs),
            result_policy,
            limits: BetLimits::new(
                parse_env_or("CATEGORY_MAX", DEFAULT_CATEGORY_MAX),
                parse_env_or("ROUND_MAX", DEFAULT_ROUND_MAX),
            ),
            ..defaults
        };

        Ok(DealerConfig {
            table_id,
            dealer_id,
            rounds: rounds_override.unwrap_or_else(|| parse_env_or("ROUNDS", 0)),
            betting_secs: parse_env_or("BETTING_SECS", DEFAULT_BETTING_SECS),
            bettors: parse_env_or("BETTORS", 4),
            drop_result_rate: parse_env_or("DROP_RESULT_RATE", 0.1),
            round,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TABLE_ID".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if !self.betting_secs.is_finite() || self.betting_secs < 0.0 {
            return Err(ConfigError::Invalid {
                var: "BETTING_SECS".to_string(),
                reason: format!("Must be a non-negative number, got {}", self.betting_secs),
            });
        }

        if !(0.0..=1.0).contains(&self.drop_result_rate) {
            return Err(ConfigError::Invalid {
                var: "DROP_RESULT_RATE".to_string(),
                reason: "Must be between 0 and 1".to_string(),
            });
        }

        self.round
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "round timings/limits".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
