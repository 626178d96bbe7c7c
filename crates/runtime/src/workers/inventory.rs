//! Inventory worker that owns the authoritative [`InventoryService`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them to the
//! engine one at a time, and publishes the resulting changes to the EventBus.

use std::collections::HashSet;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use inventory_core::{
    ContainerDebugInfo, ContainerInstance, ContainerUid, CoreError, IntegrityReport,
    InventoryError, InventoryService, InventorySnapshot, ItemInstance, ItemUid, SlotRequest,
};

use crate::api::{InventoryRequest, InventoryResponse};
use crate::events::{Event, EventBus, InventoryEvent, SessionEvent};

/// Commands that can be sent to the inventory worker
pub enum Command {
    /// A client request; answered with exactly one response.
    Request {
        request: InventoryRequest,
        reply: oneshot::Sender<InventoryResponse>,
    },
    FindItem {
        item: ItemUid,
        reply: oneshot::Sender<Option<ItemInstance>>,
    },
    FindContainer {
        container: ContainerUid,
        reply: oneshot::Sender<Option<ContainerInstance>>,
    },
    ItemsInContainer {
        container: ContainerUid,
        reply: oneshot::Sender<Vec<ItemInstance>>,
    },
    OrphanItems {
        reply: oneshot::Sender<Vec<ItemInstance>>,
    },
    DebugInfo {
        container: ContainerUid,
        reply: oneshot::Sender<Option<ContainerDebugInfo>>,
    },
    CanMove {
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
        reply: oneshot::Sender<bool>,
    },
    Validate {
        reply: oneshot::Sender<IntegrityReport>,
    },
    /// Repairs the store and publishes whatever the repair rewrote.
    Repair {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        reply: oneshot::Sender<InventorySnapshot>,
    },
}

/// Background task that serializes every producer onto one engine.
pub struct InventoryWorker {
    service: InventoryService,
    open_containers: HashSet<ContainerUid>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl InventoryWorker {
    pub fn new(
        service: InventoryService,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            items = service.state().item_count(),
            containers = service.state().container_count(),
            "InventoryWorker initialized"
        );

        Self {
            service,
            open_containers: HashSet::new(),
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Exits once every handle has been dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!("InventoryWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Request { request, reply } => {
                let response = self.handle_request(request);
                if reply.send(response).is_err() {
                    debug!("Request reply channel closed (caller dropped)");
                }
            }
            Command::FindItem { item, reply } => {
                let found = self.service.find_item(item).cloned();
                if reply.send(found).is_err() {
                    debug!("FindItem reply channel closed (caller dropped)");
                }
            }
            Command::FindContainer { container, reply } => {
                let found = self.service.find_container(container).cloned();
                if reply.send(found).is_err() {
                    debug!("FindContainer reply channel closed (caller dropped)");
                }
            }
            Command::ItemsInContainer { container, reply } => {
                if reply.send(self.items_in(container)).is_err() {
                    debug!("ItemsInContainer reply channel closed (caller dropped)");
                }
            }
            Command::OrphanItems { reply } => {
                let orphans = self
                    .service
                    .get_orphan_items()
                    .into_iter()
                    .cloned()
                    .collect();
                if reply.send(orphans).is_err() {
                    debug!("OrphanItems reply channel closed (caller dropped)");
                }
            }
            Command::DebugInfo { container, reply } => {
                if reply
                    .send(self.service.container_debug_info(container))
                    .is_err()
                {
                    debug!("DebugInfo reply channel closed (caller dropped)");
                }
            }
            Command::CanMove {
                item,
                target,
                slot,
                quantity,
                reply,
            } => {
                let allowed = self.service.can_move_item(item, target, slot, quantity);
                if reply.send(allowed).is_err() {
                    debug!("CanMove reply channel closed (caller dropped)");
                }
            }
            Command::Validate { reply } => {
                let report = self.service.integrity_report();
                if !report.is_valid() {
                    warn!(issues = report.len(), "integrity check found issues");
                }
                if reply.send(report).is_err() {
                    debug!("Validate reply channel closed (caller dropped)");
                }
            }
            Command::Repair { reply } => {
                let repaired = self.service.repair_data_integrity();
                self.publish_delta();
                if reply.send(repaired).is_err() {
                    debug!("Repair reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.service.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_request(&mut self, request: InventoryRequest) -> InventoryResponse {
        let kind = request.kind();
        let mutating = request.is_mutating();
        debug!(request = kind, mutating, "handling inventory request");

        let response = match request {
            InventoryRequest::CreateItem {
                definition,
                quantity,
            } => match self.service.create_item(&definition, quantity) {
                Ok(uid) => match self.service.find_item(uid) {
                    Some(item) => InventoryResponse::Item(item.clone()),
                    None => InventoryResponse::Rejected(InventoryError::Failed(format!(
                        "created item {uid} is missing from the store"
                    ))),
                },
                Err(err) => InventoryResponse::Rejected(err),
            },
            InventoryRequest::CreateContainer { definition } => {
                match self.service.create_container(&definition) {
                    Ok(uid) => InventoryResponse::Container(uid),
                    Err(err) => InventoryResponse::Rejected(err),
                }
            }
            InventoryRequest::MoveItem {
                item,
                target,
                slot,
                quantity,
            } => InventoryResponse::Moved(self.service.try_move_item(item, target, slot, quantity)),
            InventoryRequest::SplitItem {
                item,
                target,
                quantity,
                slot,
            } => InventoryResponse::Moved(self.service.split_item(item, target, quantity, slot)),
            InventoryRequest::AddItem { item, container } => {
                InventoryResponse::Added(self.service.try_add_item_to_container(item, container))
            }
            InventoryRequest::RemoveItem { item } => {
                let outcome = self.service.remove_from_container(item);
                self.acknowledge(kind, outcome)
            }
            InventoryRequest::DestroyItem { item } => {
                let owned = self
                    .service
                    .find_item(item)
                    .and_then(|record| record.owned_container);
                let outcome = self.service.destroy_item(item);
                if outcome.is_ok() {
                    self.close_destroyed(owned);
                }
                self.acknowledge(kind, outcome)
            }
            InventoryRequest::OpenContainer { container } => {
                InventoryResponse::Ack(self.open_container(container))
            }
            InventoryRequest::CloseContainer { container } => {
                InventoryResponse::Ack(self.close_container(container))
            }
            InventoryRequest::Refresh => {
                let snapshot = self.service.snapshot();
                self.event_bus
                    .publish(InventoryEvent::Snapshot(snapshot.clone()));
                InventoryResponse::Snapshot(snapshot)
            }
        };

        self.report_failure(kind, &response);
        if mutating {
            self.publish_delta();
        }
        response
    }

    fn acknowledge(
        &self,
        request: &'static str,
        outcome: Result<(), InventoryError>,
    ) -> InventoryResponse {
        match outcome {
            Ok(()) => InventoryResponse::Ack(true),
            Err(err) => {
                self.publish_failure(request, err.error_code(), err.to_string());
                InventoryResponse::Ack(false)
            }
        }
    }

    /// Publishes `OperationFailed` for responses that carry their own status.
    fn report_failure(&self, request: &'static str, response: &InventoryResponse) {
        match response {
            InventoryResponse::Rejected(err) => {
                self.publish_failure(request, err.error_code(), err.to_string());
            }
            InventoryResponse::Moved(result) => {
                if let Some(code) = result.status.error_code() {
                    self.publish_failure(request, code, result.message.clone());
                }
            }
            InventoryResponse::Added(result) => {
                if let Some(code) = result.status.error_code() {
                    self.publish_failure(request, code, result.message.clone());
                }
            }
            _ => {}
        }
    }

    fn publish_failure(&self, request: &'static str, code: &str, message: String) {
        warn!(request, code, %message, "inventory request failed");
        self.event_bus.publish(InventoryEvent::OperationFailed {
            request: request.to_owned(),
            code: code.to_owned(),
            message,
        });
    }

    /// Drains the engine's change set; empty sets are not published.
    fn publish_delta(&mut self) {
        let delta = self.service.take_delta();
        if delta.is_empty() {
            return;
        }
        debug!(
            items = delta.updated_items.len(),
            removed_items = delta.removed_items.len(),
            containers = delta.updated_containers.len(),
            removed_containers = delta.removed_containers.len(),
            "publishing inventory delta"
        );
        self.event_bus.publish(InventoryEvent::Delta(delta));
    }

    fn items_in(&self, container: ContainerUid) -> Vec<ItemInstance> {
        self.service
            .get_items_in_container(container)
            .into_iter()
            .cloned()
            .collect()
    }

    fn open_container(&mut self, uid: ContainerUid) -> bool {
        let Some(container) = self.service.find_container(uid).cloned() else {
            warn!(container = %uid, "cannot open unknown container");
            return false;
        };
        self.open_containers.insert(uid);
        let items = self.items_in(uid);
        debug!(container = %uid, items = items.len(), "container opened");
        self.event_bus
            .publish(Event::Session(SessionEvent::ContainerOpened { container, items }));
        true
    }

    fn close_container(&mut self, uid: ContainerUid) -> bool {
        if !self.open_containers.remove(&uid) {
            debug!(container = %uid, "close requested for a container that is not open");
            return false;
        }
        self.event_bus
            .publish(SessionEvent::ContainerClosed { container: uid });
        true
    }

    /// Closes every open session whose container no longer exists after a
    /// destroy cascade rooted at an item owning `owned`.
    fn close_destroyed(&mut self, owned: Option<ContainerUid>) {
        if owned.is_none() {
            return;
        }
        let gone: Vec<ContainerUid> = self
            .open_containers
            .iter()
            .copied()
            .filter(|uid| self.service.find_container(*uid).is_none())
            .collect();
        for uid in gone {
            self.close_container(uid);
        }
    }
}
