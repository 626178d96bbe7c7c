//! Deterministic inventory data model and movement engine.
//!
//! `inventory-core` defines the canonical containment rules (placement, move,
//! stack, swap, split, cycle detection, totals) and exposes pure, synchronous
//! APIs that can be reused by the runtime, tooling, and tests. All state
//! mutation flows through [`engine::InventoryService`]; supporting crates depend
//! on the types re-exported here.
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use config::{EmptyTagPolicy, InventoryConfig, RepairPolicy};
pub use engine::{
    AddItemResult, ContainerDebugInfo, IntegrityIssue, IntegrityReport, InventoryError,
    InventoryService, MoveResult, MoveStatus, SlotDebugEntry,
};
pub use env::{
    ContainerDefinition, DefinitionOracle, DefinitionsSnapshot, ItemDefinition, TagSet,
};
pub use error::{CoreError, ErrorSeverity};
pub use state::{
    ChangeKind, ContainerInstance, ContainerTotals, ContainerUid, ContainerUpdate, DefinitionId,
    InventoryDelta, InventorySnapshot, InventoryState, ItemInstance, ItemLocation, ItemUid,
    ItemUpdate, Slot, SlotId, SlotRequest,
};
