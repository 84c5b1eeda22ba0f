//! Countdown driven by explicitly supplied elapsed time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default spacing between tick notifications (1 second)
pub const DEFAULT_TICK_INTERVAL_SECS: f64 = 1.0;

/// Slack absorbed when comparing accumulated float seconds.
const EPSILON: f64 = 1e-9;

/// Timer errors
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum TimerError {
    /// `start` called while a countdown is running
    #[error("Timer already running with {remaining:.2}s remaining")]
    AlreadyRunning { remaining: f64 },

    /// Negative or non-finite duration
    #[error("Invalid timer duration: {0}")]
    InvalidDuration(f64),
}

/// Result type for timer operations
pub type TimerResult<T> = Result<T, TimerError>;

/// Lifecycle of a single countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Expired,
    Cancelled,
}

/// Notifications produced while advancing a running timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimerSignal {
    /// A tick boundary was crossed with time still left
    Tick { remaining: f64 },
    /// Countdown reached zero. Emitted exactly once per start.
    Expired,
}

/// Cancellable phase countdown.
///
/// The timer never reads a clock. The owner feeds it elapsed seconds from a
/// monotonic source via [`PhaseTimer::advance`] and acts on the returned
/// signals, so every transition stays on the owner's thread.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    tick_interval: f64,
    duration: f64,
    remaining: f64,
    until_tick: f64,
    state: TimerState,
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL_SECS)
    }
}

impl PhaseTimer {
    /// Create an idle timer ticking every `tick_interval` seconds.
    ///
    /// A non-positive or non-finite interval falls back to the default.
    #[must_use]
    pub fn new(tick_interval: f64) -> Self {
        let tick_interval = if tick_interval.is_finite() && tick_interval > 0.0 {
            tick_interval
        } else {
            DEFAULT_TICK_INTERVAL_SECS
        };

        Self {
            tick_interval,
            duration: 0.0,
            remaining: 0.0,
            until_tick: tick_interval,
            state: TimerState::Idle,
        }
    }

    /// Begin counting down from `duration` seconds
    ///
    /// # Errors
    ///
    /// * `AlreadyRunning` if a countdown is in progress (cancel it first)
    /// * `InvalidDuration` if `duration` is negative or not finite
    pub fn start(&mut self, duration: f64) -> TimerResult<()> {
        if self.state == TimerState::Running {
            return Err(TimerError::AlreadyRunning {
                remaining: self.remaining,
            });
        }

        if !duration.is_finite() || duration < 0.0 {
            return Err(TimerError::InvalidDuration(duration));
        }

        self.duration = duration;
        self.remaining = duration;
        self.until_tick = self.tick_interval;
        self.state = TimerState::Running;
        Ok(())
    }

    /// Consume `elapsed` seconds of countdown.
    ///
    /// Yields one `Tick` per tick boundary crossed while time remains, then a
    /// single `Expired` once the countdown hits zero. A stopped timer yields
    /// nothing.
    pub fn advance(&mut self, elapsed: f64) -> Vec<TimerSignal> {
        let mut signals = Vec::new();
        if self.state != TimerState::Running {
            return signals;
        }

        let mut left = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            0.0
        };

        loop {
            if self.remaining <= EPSILON {
                self.remaining = 0.0;
                self.state = TimerState::Expired;
                signals.push(TimerSignal::Expired);
                break;
            }

            let step = self.until_tick.min(self.remaining);
            if left + EPSILON < step {
                self.remaining -= left;
                self.until_tick -= left;
                break;
            }

            left = (left - step).max(0.0);
            self.remaining -= step;
            self.until_tick -= step;

            if self.until_tick <= EPSILON {
                self.until_tick = self.tick_interval;
                if self.remaining > EPSILON {
                    signals.push(TimerSignal::Tick {
                        remaining: self.remaining,
                    });
                }
            }
        }

        signals
    }

    /// Stop counting and drop the pending expiry. No-op when not running.
    pub fn cancel(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Cancelled;
        }
    }

    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }
}
