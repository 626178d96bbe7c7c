//! Client → server requests and their typed replies.
//!
//! Each request maps onto exactly one [`inventory_core::InventoryService`]
//! call. The worker answers every request with exactly one response.

use inventory_core::{
    AddItemResult, ContainerUid, DefinitionId, InventoryError, InventorySnapshot, ItemInstance,
    ItemUid, MoveResult, SlotRequest,
};
use serde::{Deserialize, Serialize};

use super::errors::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryRequest {
    CreateItem {
        definition: DefinitionId,
        quantity: u32,
    },
    CreateContainer {
        definition: DefinitionId,
    },
    MoveItem {
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    },
    SplitItem {
        item: ItemUid,
        target: ContainerUid,
        quantity: u32,
        slot: SlotRequest,
    },
    AddItem {
        item: ItemUid,
        container: ContainerUid,
    },
    RemoveItem {
        item: ItemUid,
    },
    DestroyItem {
        item: ItemUid,
    },
    OpenContainer {
        container: ContainerUid,
    },
    CloseContainer {
        container: ContainerUid,
    },
    /// Republish the full store as a snapshot event.
    Refresh,
}

impl InventoryRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateItem { .. } => "create_item",
            Self::CreateContainer { .. } => "create_container",
            Self::MoveItem { .. } => "move_item",
            Self::SplitItem { .. } => "split_item",
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::DestroyItem { .. } => "destroy_item",
            Self::OpenContainer { .. } => "open_container",
            Self::CloseContainer { .. } => "close_container",
            Self::Refresh => "refresh",
        }
    }

    /// Open, close, and refresh never touch the store.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::OpenContainer { .. } | Self::CloseContainer { .. } | Self::Refresh
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryResponse {
    Item(ItemInstance),
    Container(ContainerUid),
    Moved(MoveResult),
    Added(AddItemResult),
    /// Outcome of remove, destroy, open and close.
    Ack(bool),
    Snapshot(InventorySnapshot),
    Rejected(InventoryError),
}

impl InventoryResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Item(_) => "item",
            Self::Container(_) => "container",
            Self::Moved(_) => "moved",
            Self::Added(_) => "added",
            Self::Ack(_) => "ack",
            Self::Snapshot(_) => "snapshot",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Converts a response that did not match the caller's expectation into
    /// an error. `Rejected` keeps its inventory error.
    pub(crate) fn unexpected(self, request: &'static str) -> RuntimeError {
        match self {
            Self::Rejected(error) => RuntimeError::Inventory(error),
            other => RuntimeError::UnexpectedResponse {
                request,
                response: other.kind(),
            },
        }
    }
}
