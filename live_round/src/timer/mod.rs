//! Phase countdown timer.
//!
//! The timer is advanced by its owner with elapsed monotonic time and answers
//! with tick and expiry signals. It has no background task of its own, so a
//! cancelled timer can never deliver a late expiry.

pub mod phase_timer;

pub use phase_timer::{
    DEFAULT_TICK_INTERVAL_SECS, PhaseTimer, TimerError, TimerResult, TimerSignal, TimerState,
};
