//! Client-side read-only copy of the replicated inventory.
//!
//! A [`ClientMirror`] never calls into the engine. It is rebuilt from
//! snapshots and kept current by applying deltas and session events in the
//! order they were published.

use std::collections::{HashMap, HashSet};

use inventory_core::{
    ContainerInstance, ContainerUid, InventoryDelta, InventorySnapshot, ItemInstance, ItemUid,
};

use crate::events::{Event, InventoryEvent, SessionEvent};

#[derive(Debug, Clone, Default)]
pub struct ClientMirror {
    items: HashMap<ItemUid, ItemInstance>,
    containers: HashMap<ContainerUid, ContainerInstance>,
    open: HashSet<ContainerUid>,
}

impl ClientMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mirror that starts from a full snapshot.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let mut mirror = Self::new();
        mirror.apply_snapshot(snapshot);
        mirror
    }

    /// Applies any runtime event. Failure notifications carry no state and
    /// are ignored.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::Inventory(InventoryEvent::Snapshot(snapshot)) => {
                self.apply_snapshot(snapshot.clone())
            }
            Event::Inventory(InventoryEvent::Delta(delta)) => self.apply_delta(delta),
            Event::Inventory(InventoryEvent::OperationFailed { .. }) => {}
            Event::Session(SessionEvent::ContainerOpened { container, items }) => {
                self.open.insert(container.uid);
                self.containers.insert(container.uid, container.clone());
                for item in items {
                    self.items.insert(item.uid, item.clone());
                }
            }
            Event::Session(SessionEvent::ContainerClosed { container }) => {
                self.open.remove(container);
            }
        }
    }

    /// Replaces every cached record. Open sessions survive as long as their
    /// container is still present.
    pub fn apply_snapshot(&mut self, snapshot: InventorySnapshot) {
        self.items = snapshot
            .items
            .into_iter()
            .map(|item| (item.uid, item))
            .collect();
        self.containers = snapshot
            .containers
            .into_iter()
            .map(|container| (container.uid, container))
            .collect();
        self.open.retain(|uid| self.containers.contains_key(uid));
    }

    pub fn apply_delta(&mut self, delta: &InventoryDelta) {
        for update in &delta.updated_items {
            self.items.insert(update.item.uid, update.item.clone());
        }
        for uid in &delta.removed_items {
            self.items.remove(uid);
        }
        for update in &delta.updated_containers {
            self.containers
                .insert(update.container.uid, update.container.clone());
        }
        for uid in &delta.removed_containers {
            self.containers.remove(uid);
            self.open.remove(uid);
        }
    }

    pub fn get_cached_item(&self, uid: ItemUid) -> Option<&ItemInstance> {
        self.items.get(&uid)
    }

    pub fn get_cached_container(&self, uid: ContainerUid) -> Option<&ContainerInstance> {
        self.containers.get(&uid)
    }

    /// Cached items of a container in slot order.
    pub fn items_in_container(&self, uid: ContainerUid) -> Vec<&ItemInstance> {
        let Some(container) = self.containers.get(&uid) else {
            return Vec::new();
        };
        container
            .occupied()
            .filter_map(|(_, item)| self.items.get(&item))
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn open_containers(&self) -> impl Iterator<Item = ContainerUid> + '_ {
        self.open.iter().copied()
    }

    pub fn is_open(&self, uid: ContainerUid) -> bool {
        self.open.contains(&uid)
    }
}
