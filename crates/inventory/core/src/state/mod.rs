//! Instance records and the store that owns them.
//!
//! Everything here is plain data. Placement rules live in [`crate::engine`].
mod container;
mod delta;
mod ids;
mod item;
mod store;

pub use container::{ContainerInstance, ContainerTotals, Slot};
pub use delta::{ChangeKind, ContainerUpdate, InventoryDelta, InventorySnapshot, ItemUpdate};
pub use ids::{ContainerUid, DefinitionId, ItemUid, SlotId, SlotRequest};
pub use item::{ItemInstance, ItemLocation};
pub use store::InventoryState;

pub(crate) use delta::ChangeTracker;
