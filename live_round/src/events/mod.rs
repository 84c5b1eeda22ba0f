//! Event bus decoupling the orchestrator from its observers.
//!
//! The bus is an ordinary value: whoever composes the orchestrator creates it,
//! shares it behind an `Arc`, and drops it at teardown.
//!
//! ## Example
//!
//! ```
//! use live_round::events::{EventBus, EventKind, RoundEvent};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::new());
//! bus.subscribe(
//!     EventKind::DealingCompleted,
//!     Arc::new(|event: &RoundEvent| println!("{event}")),
//! );
//! bus.publish(&RoundEvent::DealingCompleted { round_id: "R1".to_string() });
//! ```

pub mod bus;
pub mod models;

pub use bus::{EventBus, EventHandler, SubscriptionId};
pub use models::{ErrorKind, EventKind, RoundEvent};
