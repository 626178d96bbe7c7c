use std::collections::HashMap;

use super::{ContainerInstance, ContainerUid, ItemInstance, ItemUid};

/// The authoritative instance store: id → live record for items and containers.
///
/// The store is deliberately dumb. It knows nothing about definitions or
/// placement rules; [`crate::engine::InventoryService`] is the only writer and
/// keeps both tables consistent with each other.
#[derive(Clone, Debug, Default)]
pub struct InventoryState {
    items: HashMap<ItemUid, ItemInstance>,
    containers: HashMap<ContainerUid, ContainerInstance>,
}

impl InventoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, uid: ItemUid) -> Option<&ItemInstance> {
        self.items.get(&uid)
    }

    pub fn item_mut(&mut self, uid: ItemUid) -> Option<&mut ItemInstance> {
        self.items.get_mut(&uid)
    }

    pub fn container(&self, uid: ContainerUid) -> Option<&ContainerInstance> {
        self.containers.get(&uid)
    }

    pub fn container_mut(&mut self, uid: ContainerUid) -> Option<&mut ContainerInstance> {
        self.containers.get_mut(&uid)
    }

    pub fn contains_item(&self, uid: ItemUid) -> bool {
        self.items.contains_key(&uid)
    }

    pub fn contains_container(&self, uid: ContainerUid) -> bool {
        self.containers.contains_key(&uid)
    }

    pub fn insert_item(&mut self, item: ItemInstance) {
        self.items.insert(item.uid, item);
    }

    pub fn insert_container(&mut self, container: ContainerInstance) {
        self.containers.insert(container.uid, container);
    }

    pub fn remove_item(&mut self, uid: ItemUid) -> Option<ItemInstance> {
        self.items.remove(&uid)
    }

    pub fn remove_container(&mut self, uid: ContainerUid) -> Option<ContainerInstance> {
        self.containers.remove(&uid)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemInstance> {
        self.items.values()
    }

    pub fn containers(&self) -> impl Iterator<Item = &ContainerInstance> {
        self.containers.values()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub(crate) fn item_uids(&self) -> Vec<ItemUid> {
        self.items.keys().copied().collect()
    }

    pub(crate) fn container_uids(&self) -> Vec<ContainerUid> {
        self.containers.keys().copied().collect()
    }
}
