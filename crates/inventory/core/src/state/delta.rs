use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{ContainerInstance, ContainerUid, InventoryState, ItemInstance, ItemUid};

bitflags! {
    /// Which parts of an item or container record changed since the last
    /// delta was taken.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChangeKind: u8 {
        const CREATED    = 1 << 0;
        const LOCATION   = 1 << 1;
        const QUANTITY   = 1 << 2;
        const SLOTS      = 1 << 3;
        const LINKS      = 1 << 4;
        const TOTALS     = 1 << 5;
        const DEBUG_NAME = 1 << 6;
    }
}

/// Accumulates touched ids between two calls to [`ChangeTracker::take`].
///
/// Only metadata is recorded while operations run; record values are copied
/// out of the store when the delta is materialized.
#[derive(Clone, Debug, Default)]
pub(crate) struct ChangeTracker {
    items: BTreeMap<ItemUid, ChangeKind>,
    containers: BTreeMap<ContainerUid, ChangeKind>,
    removed_items: Vec<ItemUid>,
    removed_containers: Vec<ContainerUid>,
}

impl ChangeTracker {
    pub(crate) fn item(&mut self, uid: ItemUid, kind: ChangeKind) {
        *self.items.entry(uid).or_default() |= kind;
    }

    pub(crate) fn container(&mut self, uid: ContainerUid, kind: ChangeKind) {
        *self.containers.entry(uid).or_default() |= kind;
    }

    pub(crate) fn item_removed(&mut self, uid: ItemUid) {
        self.items.remove(&uid);
        self.removed_items.push(uid);
    }

    pub(crate) fn container_removed(&mut self, uid: ContainerUid) {
        self.containers.remove(&uid);
        self.removed_containers.push(uid);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.containers.is_empty()
            && self.removed_items.is_empty()
            && self.removed_containers.is_empty()
    }

    /// Drains the tracker into a delta holding copies of the current records.
    pub(crate) fn take(&mut self, state: &InventoryState) -> InventoryDelta {
        let tracker = core::mem::take(self);

        let updated_items = tracker
            .items
            .into_iter()
            .filter_map(|(uid, changes)| {
                state.item(uid).map(|item| ItemUpdate {
                    item: item.clone(),
                    changes,
                })
            })
            .collect();

        let updated_containers = tracker
            .containers
            .into_iter()
            .filter_map(|(uid, changes)| {
                state.container(uid).map(|container| ContainerUpdate {
                    container: container.clone(),
                    changes,
                })
            })
            .collect();

        InventoryDelta {
            updated_items,
            removed_items: tracker.removed_items,
            updated_containers,
            removed_containers: tracker.removed_containers,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemUpdate {
    pub item: ItemInstance,
    pub changes: ChangeKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerUpdate {
    pub container: ContainerInstance,
    pub changes: ChangeKind,
}

/// Incremental change set republished to clients after mutating operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryDelta {
    pub updated_items: Vec<ItemUpdate>,
    pub removed_items: Vec<ItemUid>,
    pub updated_containers: Vec<ContainerUpdate>,
    pub removed_containers: Vec<ContainerUid>,
}

impl InventoryDelta {
    /// Returns true if nothing changed (e.g. a rejected request).
    pub fn is_empty(&self) -> bool {
        self.updated_items.is_empty()
            && self.removed_items.is_empty()
            && self.updated_containers.is_empty()
            && self.removed_containers.is_empty()
    }
}

/// Whole-state copy sent to clients on refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventorySnapshot {
    pub items: Vec<ItemInstance>,
    pub containers: Vec<ContainerInstance>,
}

impl InventorySnapshot {
    pub fn from_state(state: &InventoryState) -> Self {
        let mut items: Vec<ItemInstance> = state.items().cloned().collect();
        let mut containers: Vec<ContainerInstance> = state.containers().cloned().collect();
        items.sort_by_key(|item| item.uid);
        containers.sort_by_key(|container| container.uid);
        Self { items, containers }
    }
}
