//! Worker tasks that back the runtime orchestration.
//!
//! The inventory worker owns the authoritative store and is the only task
//! that ever calls into the engine.

mod inventory;

pub use inventory::{Command, InventoryWorker};
