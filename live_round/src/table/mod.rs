//! Table module running a round orchestrator as an async actor.
//!
//! This module implements:
//! - RoundActor: owns one orchestrator and drives its timers from a tokio interval
//! - RoundHandle: cloneable front door for commands, queries and event subscriptions
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox. Every
//! transition, ledger mutation and event publication happens on that task, so
//! no lock guards orchestrator state. Before a command is applied the actor
//! advances the orchestrator to the command's arrival time.
//!
//! ## Example
//!
//! ```no_run
//! use live_round::events::EventBus;
//! use live_round::round::{RoundConfig, RoundStart};
//! use live_round::table::RoundActor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = Arc::new(EventBus::new());
//!     let (actor, handle) = RoundActor::new("T1", RoundConfig::default(), bus);
//!     tokio::spawn(actor.run());
//!
//!     handle
//!         .start_round(RoundStart::new("R1", 1, "T1", "D1", 15.0))
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod actor;
pub mod messages;

pub use actor::{RoundActor, RoundHandle};
pub use messages::{RoundMessage, RoundStateResponse};
