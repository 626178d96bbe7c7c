//! Runtime orchestration for the authoritative inventory.
//!
//! This crate wraps [`inventory_core::InventoryService`] in a single worker
//! task so any number of producers can issue requests while the engine keeps
//! its single-threaded guarantees. Consumers embed [`Runtime`] to issue
//! requests through [`RuntimeHandle`] and subscribe to replicated changes.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for change replication
//! - [`mirror`] keeps a client-side read-only copy of replicated state
//! - [`scenario`] drives scripted request sequences against a handle
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod mirror;
pub mod runtime;
pub mod scenario;

mod workers;

pub use api::{InventoryRequest, InventoryResponse, Result, RuntimeError, RuntimeHandle};
pub use events::{Event, EventBus, InventoryEvent, SessionEvent, Topic};
pub use mirror::ClientMirror;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use scenario::{ScenarioReport, ScenarioRunner};
