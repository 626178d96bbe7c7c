//! Creation, detachment, and destruction of instances.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use super::{InventoryError, InventoryService};
use crate::env::ContainerDefinition;
use crate::state::{ChangeKind, ContainerInstance, ContainerUid, DefinitionId, ItemInstance, ItemUid};

impl InventoryService {
    /// Creates an orphan item.
    ///
    /// The quantity is clamped into `1..=max_stack` (forced to 1 for
    /// non-stackable definitions). If the definition declares a container, the
    /// container is created too and the two are linked. Nothing is inserted
    /// when either definition is missing.
    pub fn create_item(
        &mut self,
        definition: &DefinitionId,
        quantity: u32,
    ) -> Result<ItemUid, InventoryError> {
        let item_def = self
            .require_item_definition(definition)
            .inspect_err(|err| warn!(%definition, %err, "cannot create item"))?;

        let owned_def = match &item_def.container {
            Some(container) => Some(
                self.require_container_definition(container)
                    .inspect_err(|err| warn!(%definition, %err, "cannot create item storage"))?,
            ),
            None => None,
        };

        let uid = ItemUid::generate();
        let mut item = ItemInstance::new(uid, definition.clone(), item_def.clamp_quantity(quantity));
        if let Some(owned_def) = owned_def {
            let container = self.insert_container(&owned_def, Some(uid));
            item.owned_container = Some(container);
        }

        info!(
            item = %uid,
            %definition,
            quantity = item.quantity,
            owned_container = ?item.owned_container,
            "created item"
        );
        self.state.insert_item(item);
        self.changes.item(uid, ChangeKind::CREATED);
        self.refresh_totals();
        Ok(uid)
    }

    /// Creates a free-standing container with every slot empty.
    pub fn create_container(
        &mut self,
        definition: &DefinitionId,
    ) -> Result<ContainerUid, InventoryError> {
        let container_def = self
            .require_container_definition(definition)
            .inspect_err(|err| warn!(%definition, %err, "cannot create container"))?;
        let uid = self.insert_container(&container_def, None);
        self.refresh_totals();
        Ok(uid)
    }

    fn insert_container(
        &mut self,
        definition: &ContainerDefinition,
        owner: Option<ItemUid>,
    ) -> ContainerUid {
        let uid = ContainerUid::generate();
        let mut container =
            ContainerInstance::new(uid, definition.id.clone(), definition.effective_slot_count());
        container.owner_item = owner;

        info!(
            container = %uid,
            definition = %definition.id,
            slots = container.slot_count(),
            owner = ?owner,
            "created container"
        );
        self.state.insert_container(container);
        self.changes.container(uid, ChangeKind::CREATED);
        uid
    }

    /// Detaches a placed item from its slot, leaving it as an orphan.
    pub fn remove_from_container(&mut self, item: ItemUid) -> Result<(), InventoryError> {
        let from = self
            .detach(item)
            .inspect_err(|err| warn!(%item, %err, "remove rejected"))?;
        debug!(%item, container = %from, "item removed from container");
        self.refresh_totals();
        Ok(())
    }

    /// Destroys an item, cascading through its owned container.
    ///
    /// Runs in two phases: the full set of doomed items and containers is
    /// collected first, then everything is removed. A broken reference found
    /// during collection is logged and skipped; it never aborts the cascade
    /// halfway through.
    pub fn destroy_item(&mut self, item: ItemUid) -> Result<(), InventoryError> {
        let root = self
            .require_item(item)
            .inspect_err(|err| warn!(%item, %err, "destroy rejected"))?;
        let placed = root.location.is_some();

        let (items, containers) = self.collect_destroy_set(item);

        if placed {
            self.detach(item)?;
        }
        for container in &containers {
            self.state.remove_container(*container);
            self.changes.container_removed(*container);
        }
        for doomed in &items {
            self.state.remove_item(*doomed);
            self.changes.item_removed(*doomed);
        }

        info!(
            %item,
            items = items.len(),
            containers = containers.len(),
            "destroyed item"
        );
        self.refresh_totals();
        Ok(())
    }

    /// Items and containers reachable from `root` through owned containers.
    fn collect_destroy_set(&self, root: ItemUid) -> (Vec<ItemUid>, Vec<ContainerUid>) {
        let mut items = Vec::new();
        let mut containers = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![root];

        while let Some(uid) = pending.pop() {
            if !seen.insert(uid) {
                error!(item = %uid, "item reached twice while collecting destroy set");
                continue;
            }
            let Some(item) = self.state.item(uid) else {
                error!(item = %uid, "slot references a missing item; skipping");
                continue;
            };
            items.push(uid);

            let Some(owned) = item.owned_container else {
                continue;
            };
            match self.state.container(owned) {
                Some(container) => {
                    containers.push(owned);
                    pending.extend(container.occupied().map(|(_, inner)| inner));
                }
                None => error!(item = %uid, container = %owned, "owned container is missing"),
            }
        }

        (items, containers)
    }

    /// Clears the item's slot and location. Returns the container it left.
    pub(super) fn detach(&mut self, uid: ItemUid) -> Result<ContainerUid, InventoryError> {
        let item = self.require_item(uid)?;
        let location = item.location.ok_or_else(|| {
            InventoryError::InvalidTarget(format!("item {uid} is not in a container"))
        })?;
        let owned = item.owned_container;

        match self.state.container_mut(location.container) {
            Some(container) => match container.slot_mut(location.slot) {
                Some(slot) if slot.item == Some(uid) => slot.item = None,
                Some(slot) => error!(
                    item = %uid,
                    container = %location.container,
                    slot = %location.slot,
                    occupant = ?slot.item,
                    "slot does not reference the item it should hold"
                ),
                None => error!(
                    item = %uid,
                    container = %location.container,
                    slot = %location.slot,
                    "item location points past the last slot"
                ),
            },
            None => error!(item = %uid, container = %location.container, "item location references a missing container"),
        }
        self.changes.container(location.container, ChangeKind::SLOTS);

        if let Some(item) = self.state.item_mut(uid) {
            item.location = None;
        }
        self.changes.item(uid, ChangeKind::LOCATION);

        if let Some(owned) = owned {
            self.set_parent_link(owned, None);
        }

        self.mark_dirty(location.container);
        Ok(location.container)
    }

    pub(super) fn set_parent_link(&mut self, container: ContainerUid, parent: Option<ContainerUid>) {
        if let Some(record) = self.state.container_mut(container) {
            record.parent_container = parent;
            self.changes.container(container, ChangeKind::LINKS);
        } else {
            error!(%container, "owned container is missing");
        }
    }

    pub fn set_item_debug_name(
        &mut self,
        item: ItemUid,
        name: impl Into<String>,
    ) -> Result<(), InventoryError> {
        let record = self
            .state
            .item_mut(item)
            .ok_or_else(|| InventoryError::unknown_item(item))?;
        record.debug_name = Some(name.into());
        self.changes.item(item, ChangeKind::DEBUG_NAME);
        Ok(())
    }

    pub fn set_container_debug_name(
        &mut self,
        container: ContainerUid,
        name: impl Into<String>,
    ) -> Result<(), InventoryError> {
        let record = self
            .state
            .container_mut(container)
            .ok_or_else(|| InventoryError::unknown_container(container))?;
        record.debug_name = Some(name.into());
        self.changes.container(container, ChangeKind::DEBUG_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::MoveStatus;
    use crate::state::{SlotId, SlotRequest};

    #[test]
    fn create_container_then_find_round_trips() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();

        let found = service.find_container(backpack).unwrap();
        assert_eq!(found.uid, backpack);
        assert_eq!(found.slot_count(), 8);
        assert!(found.owner_item.is_none());
    }

    #[test]
    fn create_item_clamps_quantity() {
        let mut service = service();
        let potion = service.create_item(&def("Potion"), 50).unwrap();
        let sword = service.create_item(&def("Sword"), 3).unwrap();
        let empty = service.create_item(&def("Potion"), 0).unwrap();

        assert_eq!(service.find_item(potion).unwrap().quantity, 20);
        assert_eq!(service.find_item(sword).unwrap().quantity, 1);
        assert_eq!(service.find_item(empty).unwrap().quantity, 1);
        assert!(service.find_item(potion).unwrap().is_orphan());
    }

    #[test]
    fn create_item_links_owned_container() {
        let mut service = service();
        let bag = service.create_item(&def("Bag"), 1).unwrap();

        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        let container = service.find_container(storage).unwrap();
        assert_eq!(container.owner_item, Some(bag));
        assert_eq!(container.parent_container, None);
        assert_eq!(container.slot_count(), 4);
    }

    #[test]
    fn missing_definitions_insert_nothing() {
        let mut service = service();
        let err = service.create_item(&def("Nope"), 1).unwrap_err();
        assert_eq!(err.status(), MoveStatus::InvalidDefinition);

        let err = service.create_item(&def("Broken"), 1).unwrap_err();
        assert_eq!(err.status(), MoveStatus::InvalidDefinition);

        assert!(service.create_container(&def("Nope")).is_err());
        assert_eq!(service.state().item_count(), 0);
        assert_eq!(service.state().container_count(), 0);
    }

    #[test]
    fn remove_from_container_orphans_without_deleting() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = service.create_item(&def("Bag"), 1).unwrap();
        service.add_item_to_container(bag, chest, SlotId(2)).unwrap();
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        assert_eq!(service.find_container(storage).unwrap().parent_container, Some(chest));

        service.remove_from_container(bag).unwrap();

        assert!(service.find_item(bag).unwrap().is_orphan());
        assert_eq!(service.find_container(chest).unwrap().occupant(SlotId(2)), None);
        assert_eq!(service.find_container(storage).unwrap().parent_container, None);
        assert!(service.remove_from_container(bag).is_err());
    }

    #[test]
    fn destroying_container_item_cascades() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = service.create_item(&def("Bag"), 1).unwrap();
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        service.add_item_to_container(bag, chest, SlotId(0)).unwrap();

        let contents: Vec<_> = ["Potion", "Ration", "Sword"]
            .into_iter()
            .map(|id| {
                let item = service.create_item(&def(id), 2).unwrap();
                let result = service.try_move_item(item, storage, SlotRequest::Auto, None);
                assert_eq!(result.status, MoveStatus::Success);
                item
            })
            .collect();
        assert_eq!(service.get_items_in_container(storage).len(), 3);

        service.destroy_item(bag).unwrap();

        assert!(service.find_item(bag).is_none());
        assert!(service.find_container(storage).is_none());
        for item in contents {
            assert!(service.find_item(item).is_none());
        }
        assert_eq!(service.find_container(chest).unwrap().occupied_count(), 0);
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn destroy_cascades_through_nested_bags() {
        let mut service = service();
        let outer = service.create_item(&def("Crate"), 1).unwrap();
        let outer_storage = service.find_item(outer).unwrap().owned_container.unwrap();
        let inner = service.create_item(&def("Bag"), 1).unwrap();
        let inner_storage = service.find_item(inner).unwrap().owned_container.unwrap();
        let potion = service.create_item(&def("Potion"), 5).unwrap();

        service.add_item_to_container(inner, outer_storage, SlotId(0)).unwrap();
        service.add_item_to_container(potion, inner_storage, SlotId(0)).unwrap();

        service.destroy_item(outer).unwrap();
        assert_eq!(service.state().item_count(), 0);
        assert_eq!(service.state().container_count(), 0);

        let delta = service.take_delta();
        assert_eq!(delta.removed_items.len(), 3);
        assert_eq!(delta.removed_containers.len(), 2);
    }

    #[test]
    fn destroy_unknown_item_fails() {
        let mut service = service();
        assert!(service.destroy_item(crate::ItemUid::generate()).is_err());
    }

    #[test]
    fn debug_names_are_used_as_labels() {
        let mut service = service();
        let potion = service.create_item(&def("Potion"), 1).unwrap();
        service.set_item_debug_name(potion, "red potion").unwrap();
        assert_eq!(service.find_item(potion).unwrap().label(), "red potion");
        assert!(service
            .set_container_debug_name(crate::ContainerUid::generate(), "x")
            .is_err());
    }
}
