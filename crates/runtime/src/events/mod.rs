//! Topic-based event bus for replicated inventory changes.
//!
//! The worker publishes deltas, snapshots and session notifications to
//! specific topics, and consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{InventoryEvent, SessionEvent};
