//! # Live Round
//!
//! Round orchestration for a live-dealer baccarat table.
//!
//! A table cycles through four phases, each announced on an event bus so that
//! UI, audio and networking layers can react without knowing about each other:
//!
//! - **Idle**: No round running
//! - **Betting**: Bets are accepted against per-category and per-round ceilings
//! - **Dealing**: Betting is closed; the bet order is frozen and the cards are dealt
//! - **Result**: The outcome is shown and the order is settled
//!
//! ## Core Modules
//!
//! - [`events`]: Event bus and round event types
//! - [`ledger`]: Stake bookkeeping for the open betting window
//! - [`timer`]: Tick-on-call phase countdown
//! - [`round`]: The orchestrator state machine, settlement and history
//! - [`table`]: Async actor wrapping an orchestrator
//!
//! ## Example
//!
//! ```
//! use live_round::{EventBus, Phase, RoundConfig, RoundOrchestrator, RoundStart};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::new());
//! let mut orchestrator = RoundOrchestrator::new(RoundConfig::default(), bus);
//! orchestrator.start_round(RoundStart::new("R1", 1, "T1", "D1", 10.0)).unwrap();
//! assert_eq!(orchestrator.phase(), Phase::Betting);
//! ```

/// Event bus and round events.
pub mod events;
pub use events::{ErrorKind, EventBus, EventKind, RoundEvent};

/// Stake bookkeeping.
pub mod ledger;
pub use ledger::{BetCategory, BetError, BetLedger, BetLimits, BetOrder, Chips};

/// Round state machine.
pub mod round;
pub use round::{
    Phase, ResultDelivery, ResultPolicy, Round, RoundConfig, RoundError, RoundOrchestrator,
    RoundResult, RoundStart,
};

/// Async actor per table.
pub mod table;
pub use table::{RoundActor, RoundHandle};

/// Phase countdown.
pub mod timer;
pub use timer::PhaseTimer;
