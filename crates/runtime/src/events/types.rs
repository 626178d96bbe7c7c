//! Event types for different topics.

use inventory_core::{ContainerInstance, ContainerUid, InventoryDelta, InventorySnapshot, ItemInstance};
use serde::{Deserialize, Serialize};

/// Changes to the authoritative store, replicated to every client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    /// Records touched by one mutating request.
    Delta(InventoryDelta),

    /// Full copy of the store, sent on refresh.
    Snapshot(InventorySnapshot),

    /// A mutating request was rejected and left the store untouched.
    OperationFailed {
        request: String,
        code: String,
        message: String,
    },
}

/// Container viewing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ContainerOpened {
        container: ContainerInstance,
        items: Vec<ItemInstance>,
    },
    /// Sent on an explicit close and when an open container is destroyed.
    ContainerClosed { container: ContainerUid },
}
