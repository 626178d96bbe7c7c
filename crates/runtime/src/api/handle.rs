//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for every
//! inventory request, read-only queries, and topic subscriptions.
use tokio::sync::{broadcast, mpsc, oneshot};

use inventory_core::{
    AddItemResult, ContainerDebugInfo, ContainerInstance, ContainerUid, DefinitionId,
    IntegrityReport, InventorySnapshot, ItemInstance, ItemUid, MoveResult, SlotRequest,
};

use super::errors::{Result, RuntimeError};
use super::request::{InventoryRequest, InventoryResponse};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Send a raw request and wait for its response.
    pub async fn request(&self, request: InventoryRequest) -> Result<InventoryResponse> {
        self.call(|reply| Command::Request { request, reply }).await
    }

    async fn call<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    pub async fn create_item(
        &self,
        definition: impl Into<DefinitionId>,
        quantity: u32,
    ) -> Result<ItemInstance> {
        let request = InventoryRequest::CreateItem {
            definition: definition.into(),
            quantity,
        };
        match self.request(request).await? {
            InventoryResponse::Item(item) => Ok(item),
            other => Err(other.unexpected("create_item")),
        }
    }

    pub async fn create_container(&self, definition: impl Into<DefinitionId>) -> Result<ContainerUid> {
        let request = InventoryRequest::CreateContainer {
            definition: definition.into(),
        };
        match self.request(request).await? {
            InventoryResponse::Container(uid) => Ok(uid),
            other => Err(other.unexpected("create_container")),
        }
    }

    /// Move request. Rule violations come back inside the [`MoveResult`], not
    /// as an `Err`.
    pub async fn move_item(
        &self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    ) -> Result<MoveResult> {
        let request = InventoryRequest::MoveItem {
            item,
            target,
            slot,
            quantity,
        };
        match self.request(request).await? {
            InventoryResponse::Moved(result) => Ok(result),
            other => Err(other.unexpected("move_item")),
        }
    }

    pub async fn split_item(
        &self,
        item: ItemUid,
        target: ContainerUid,
        quantity: u32,
        slot: SlotRequest,
    ) -> Result<MoveResult> {
        let request = InventoryRequest::SplitItem {
            item,
            target,
            quantity,
            slot,
        };
        match self.request(request).await? {
            InventoryResponse::Moved(result) => Ok(result),
            other => Err(other.unexpected("split_item")),
        }
    }

    pub async fn add_item(&self, item: ItemUid, container: ContainerUid) -> Result<AddItemResult> {
        match self.request(InventoryRequest::AddItem { item, container }).await? {
            InventoryResponse::Added(result) => Ok(result),
            other => Err(other.unexpected("add_item")),
        }
    }

    pub async fn remove_item(&self, item: ItemUid) -> Result<bool> {
        match self.request(InventoryRequest::RemoveItem { item }).await? {
            InventoryResponse::Ack(done) => Ok(done),
            other => Err(other.unexpected("remove_item")),
        }
    }

    pub async fn destroy_item(&self, item: ItemUid) -> Result<bool> {
        match self.request(InventoryRequest::DestroyItem { item }).await? {
            InventoryResponse::Ack(done) => Ok(done),
            other => Err(other.unexpected("destroy_item")),
        }
    }

    /// Opens a viewing session; the contents arrive on [`Topic::Session`].
    pub async fn open_container(&self, container: ContainerUid) -> Result<bool> {
        match self.request(InventoryRequest::OpenContainer { container }).await? {
            InventoryResponse::Ack(opened) => Ok(opened),
            other => Err(other.unexpected("open_container")),
        }
    }

    pub async fn close_container(&self, container: ContainerUid) -> Result<bool> {
        match self.request(InventoryRequest::CloseContainer { container }).await? {
            InventoryResponse::Ack(closed) => Ok(closed),
            other => Err(other.unexpected("close_container")),
        }
    }

    /// Returns the full store and republishes it on [`Topic::Inventory`].
    pub async fn refresh(&self) -> Result<InventorySnapshot> {
        match self.request(InventoryRequest::Refresh).await? {
            InventoryResponse::Snapshot(snapshot) => Ok(snapshot),
            other => Err(other.unexpected("refresh")),
        }
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    pub async fn find_item(&self, item: ItemUid) -> Result<Option<ItemInstance>> {
        self.call(|reply| Command::FindItem { item, reply }).await
    }

    pub async fn find_container(&self, container: ContainerUid) -> Result<Option<ContainerInstance>> {
        self.call(|reply| Command::FindContainer { container, reply })
            .await
    }

    pub async fn items_in_container(&self, container: ContainerUid) -> Result<Vec<ItemInstance>> {
        self.call(|reply| Command::ItemsInContainer { container, reply })
            .await
    }

    pub async fn orphan_items(&self) -> Result<Vec<ItemInstance>> {
        self.call(|reply| Command::OrphanItems { reply }).await
    }

    pub async fn debug_info(&self, container: ContainerUid) -> Result<Option<ContainerDebugInfo>> {
        self.call(|reply| Command::DebugInfo { container, reply })
            .await
    }

    /// Dry run of a move.
    pub async fn can_move_item(
        &self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    ) -> Result<bool> {
        self.call(|reply| Command::CanMove {
            item,
            target,
            slot,
            quantity,
            reply,
        })
        .await
    }

    pub async fn validate(&self) -> Result<IntegrityReport> {
        self.call(|reply| Command::Validate { reply }).await
    }

    /// Runs the integrity repair and returns how many records were rewritten.
    pub async fn repair(&self) -> Result<usize> {
        self.call(|reply| Command::Repair { reply }).await
    }

    /// Current store without publishing anything.
    pub async fn snapshot(&self) -> Result<InventorySnapshot> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Inventory` - Deltas, snapshots and failed requests
    /// - `Topic::Session` - Containers opened and closed
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
