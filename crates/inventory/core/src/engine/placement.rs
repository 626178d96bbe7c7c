//! Acceptance rules and raw placement.

use std::collections::HashSet;

use tracing::{debug, error, info, trace, warn};

use super::{AddItemResult, InventoryError, InventoryService};
use crate::config::EmptyTagPolicy;
use crate::env::ItemDefinition;
use crate::state::{ChangeKind, ContainerUid, ItemLocation, ItemUid, SlotId};

/// The parts of an item that acceptance depends on. Lets the engine ask
/// "would this many units fit" without materializing a split instance.
#[derive(Clone, Copy, Debug)]
pub(super) struct Probe<'a> {
    pub definition: &'a ItemDefinition,
    pub quantity: u32,
    pub owned_container: Option<ContainerUid>,
}

impl InventoryService {
    /// Checks whether `item` (at its full quantity) may be placed into
    /// `container`, returning the lowest free slot on success.
    ///
    /// Checks run in a fixed order so the first failure is reported:
    /// container definition, item definition, tags, nesting and cycles,
    /// volume, free slot.
    pub fn can_add_item_to_container(
        &self,
        item: ItemUid,
        container: ContainerUid,
    ) -> Result<SlotId, InventoryError> {
        let target = self.require_container(container)?;
        self.require_container_definition(&target.definition)?;
        let record = self.require_item(item)?;
        let definition = self.require_item_definition(&record.definition)?;
        let probe = Probe {
            definition: &definition,
            quantity: record.quantity,
            owned_container: record.owned_container,
        };
        self.check_acceptance(&probe, container, 0)?;
        self.first_empty_slot(container)
    }

    /// Places an orphan item into a specific empty slot without running the
    /// acceptance checks. Callers are expected to have validated first.
    pub fn add_item_to_container(
        &mut self,
        item: ItemUid,
        container: ContainerUid,
        slot: SlotId,
    ) -> Result<(), InventoryError> {
        self.place(item, container, slot)?;
        self.refresh_totals();
        Ok(())
    }

    /// Checked placement of an orphan item into the first free slot.
    pub fn try_add_item_to_container(
        &mut self,
        item: ItemUid,
        container: ContainerUid,
    ) -> AddItemResult {
        let outcome = self.require_item(item).and_then(|record| {
            if record.location.is_some() {
                return Err(InventoryError::InvalidTarget(format!(
                    "item {item} is already placed; move it instead"
                )));
            }
            self.can_add_item_to_container(item, container)
        });

        let slot = match outcome {
            Ok(slot) => slot,
            Err(err) => {
                warn!(%item, %container, %err, "add rejected");
                return err.into();
            }
        };

        if let Err(err) = self.place(item, container, slot) {
            return err.into();
        }
        self.refresh_totals();
        info!(%item, %container, %slot, "item added to container");
        AddItemResult::placed(slot)
    }

    /// Runs every acceptance rule except the free-slot requirement.
    ///
    /// `outgoing_volume` is credited against the container's used volume; swaps
    /// use it for the item leaving the container in exchange.
    pub(super) fn check_acceptance(
        &self,
        probe: &Probe<'_>,
        target: ContainerUid,
        outgoing_volume: u32,
    ) -> Result<(), InventoryError> {
        let container = self.require_container(target)?;
        let container_def = self.require_container_definition(&container.definition)?;
        let item_def = probe.definition;

        let tags_ok = if container_def.allowed_tags.is_empty() {
            self.config.empty_tag_policy == EmptyTagPolicy::AcceptAll
        } else {
            item_def.tags.intersects(&container_def.allowed_tags)
        };
        if !tags_ok {
            return Err(InventoryError::TypeMismatch {
                item: item_def.id.clone(),
                container: container_def.id.clone(),
            });
        }

        if item_def.has_container() {
            if !container_def.allow_nested_containers {
                return Err(InventoryError::ContainerRejected(format!(
                    "'{}' does not accept nested containers",
                    container_def.id
                )));
            }
            if let Some(limit) = container_def.volume_limit {
                if item_def.volume >= limit {
                    return Err(InventoryError::VolumeExceeded {
                        required: item_def.volume,
                        available: limit,
                    });
                }
            }
            if let Some(owned) = probe.owned_container {
                if self.would_create_cycle(owned, target) {
                    return Err(InventoryError::CycleDetected {
                        item_container: owned,
                        target,
                    });
                }
            }
        }

        if let Some(limit) = container_def.volume_limit {
            let used = self
                .get_container_used_volume(target)
                .saturating_sub(outgoing_volume);
            let incoming = self.probe_volume(probe);
            if used.saturating_add(incoming) > limit {
                return Err(InventoryError::VolumeExceeded {
                    required: incoming,
                    available: limit.saturating_sub(used),
                });
            }
        }

        Ok(())
    }

    pub(super) fn first_empty_slot(&self, container: ContainerUid) -> Result<SlotId, InventoryError> {
        self.require_container(container)?
            .first_empty_slot()
            .ok_or(InventoryError::ContainerFull(container))
    }

    /// True if putting the container `item_container` inside `target` would
    /// make it its own ancestor.
    ///
    /// Walks up from `target` through each container's owner item and that
    /// item's current container, stopping at an orphan owner, a free-standing
    /// container, or a broken link. A revisited container also counts as a
    /// cycle.
    pub fn would_create_cycle(&self, item_container: ContainerUid, target: ContainerUid) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(target);

        while let Some(uid) = current {
            if uid == item_container || !visited.insert(uid) {
                return true;
            }
            current = self
                .state
                .container(uid)
                .and_then(|container| container.owner_item)
                .and_then(|owner| self.state.item(owner))
                .and_then(|owner| owner.container());
        }
        false
    }

    /// Writes the placement: item location, slot occupancy, and the parent link
    /// of the item's own container.
    pub(super) fn place(
        &mut self,
        item: ItemUid,
        container: ContainerUid,
        slot: SlotId,
    ) -> Result<(), InventoryError> {
        let record = self.require_item(item)?;
        debug_assert!(record.location.is_none(), "placing an item that is still placed");
        if record.location.is_some() {
            error!(%item, "placement requested for an item that is already placed");
            return Err(InventoryError::Failed(format!("item {item} is already placed")));
        }
        let owned = record.owned_container;

        let target = self
            .state
            .container_mut(container)
            .ok_or_else(|| InventoryError::unknown_container(container))?;
        let cell = target
            .slot_mut(slot)
            .ok_or_else(|| InventoryError::unknown_slot(container, slot))?;
        debug_assert!(cell.is_empty(), "placing into an occupied slot");
        if let Some(occupant) = cell.item {
            error!(%item, %container, %slot, %occupant, "placement requested for an occupied slot");
            return Err(InventoryError::Failed(format!("slot {slot} is occupied")));
        }
        cell.item = Some(item);
        self.changes.container(container, ChangeKind::SLOTS);

        if let Some(record) = self.state.item_mut(item) {
            record.location = Some(ItemLocation::new(container, slot));
        }
        self.changes.item(item, ChangeKind::LOCATION);

        if let Some(owned) = owned {
            self.set_parent_link(owned, Some(container));
        }

        self.mark_dirty(container);
        trace!(%item, %container, %slot, "placed");
        Ok(())
    }

    pub(super) fn probe_volume(&self, probe: &Probe<'_>) -> u32 {
        let unit = probe.definition.volume;
        let base = unit.saturating_mul(probe.quantity);
        match probe.owned_container {
            Some(owned) => base.max(unit.saturating_add(self.get_container_used_volume(owned))),
            None => base,
        }
    }

    pub(super) fn log_rejection(&self, item: ItemUid, target: ContainerUid, err: &InventoryError) {
        debug!(%item, %target, %err, "placement rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{InventoryError, MoveStatus};
    use crate::config::{EmptyTagPolicy, InventoryConfig};
    use crate::state::SlotId;

    #[test]
    fn add_places_item_in_requested_slot() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = service.create_item(&def("Potion"), 10).unwrap();

        service.add_item_to_container(potion, backpack, SlotId(0)).unwrap();

        let items = service.get_items_in_container(backpack);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 10);
        assert_eq!(items[0].slot(), Some(SlotId(0)));
    }

    #[test]
    fn unchecked_add_refuses_broken_preconditions_gracefully() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = service.create_item(&def("Potion"), 1).unwrap();
        assert!(service.add_item_to_container(potion, backpack, SlotId(99)).is_err());
        assert!(service.find_item(potion).unwrap().is_orphan());
    }

    #[test]
    fn try_add_uses_first_free_slot() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let first = service.create_item(&def("Sword"), 1).unwrap();
        let second = service.create_item(&def("Sword"), 1).unwrap();

        assert_eq!(service.try_add_item_to_container(first, backpack).slot, Some(SlotId(0)));
        assert_eq!(service.try_add_item_to_container(second, backpack).slot, Some(SlotId(1)));

        let again = service.try_add_item_to_container(first, backpack);
        assert_eq!(again.status, MoveStatus::InvalidTarget);
    }

    #[test]
    fn nested_container_rejected_by_backpack() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let bag = service.create_item(&def("Bag"), 1).unwrap();

        let err = service.can_add_item_to_container(bag, backpack).unwrap_err();
        assert_eq!(err.status(), MoveStatus::ContainerRejected);

        let result = service.try_add_item_to_container(bag, backpack);
        assert_eq!(result.status, MoveStatus::ContainerRejected);
        assert!(service.find_item(bag).unwrap().is_orphan());
    }

    #[test]
    fn cycle_through_owner_chain_is_detected() {
        let mut service = service();
        // P owns X, Q owns Y. P goes into Y, then Q into X would close the loop.
        let p = service.create_item(&def("Bag"), 1).unwrap();
        let x = service.find_item(p).unwrap().owned_container.unwrap();
        let q = service.create_item(&def("Crate"), 1).unwrap();
        let y = service.find_item(q).unwrap().owned_container.unwrap();

        assert!(service.try_add_item_to_container(p, y).is_success());

        let err = service.can_add_item_to_container(q, x).unwrap_err();
        assert_eq!(err.status(), MoveStatus::CycleDetected);
        assert!(service.would_create_cycle(y, x));
        assert!(!service.would_create_cycle(x, y));
    }

    #[test]
    fn container_cannot_go_inside_itself() {
        let mut service = service();
        let bag = service.create_item(&def("Bag"), 1).unwrap();
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        let err = service.can_add_item_to_container(bag, storage).unwrap_err();
        assert_eq!(err.status(), MoveStatus::CycleDetected);
    }

    #[test]
    fn empty_allowed_tags_reject_everything_by_default() {
        let mut service = service();
        let locker = service.create_container(&def("Locker")).unwrap();
        let potion = service.create_item(&def("Potion"), 1).unwrap();
        let err = service.can_add_item_to_container(potion, locker).unwrap_err();
        assert_eq!(err.status(), MoveStatus::TypeMismatch);
    }

    #[test]
    fn empty_allowed_tags_accept_everything_when_configured() {
        let mut service =
            service_with(InventoryConfig::default().with_empty_tag_policy(EmptyTagPolicy::AcceptAll));
        let locker = service.create_container(&def("Locker")).unwrap();
        let potion = service.create_item(&def("Potion"), 1).unwrap();
        assert_eq!(service.can_add_item_to_container(potion, locker), Ok(SlotId(0)));
    }

    #[test]
    fn tag_mismatch_is_reported() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        let relic = service.create_item(&def("Relic"), 1).unwrap();
        let backpack = service.create_container(&def("Backpack")).unwrap();

        assert_eq!(
            service.can_add_item_to_container(sword, pouch).unwrap_err().status(),
            MoveStatus::TypeMismatch
        );
        assert_eq!(
            service.can_add_item_to_container(relic, backpack).unwrap_err().status(),
            MoveStatus::TypeMismatch
        );
    }

    #[test]
    fn volume_limit_is_enforced() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        let rations = service.create_item(&def("Ration"), 4).unwrap();
        let more = service.create_item(&def("Ration"), 2).unwrap();

        assert!(service.try_add_item_to_container(rations, pouch).is_success());
        assert_eq!(service.get_container_used_volume(pouch), 8);

        let result = service.try_add_item_to_container(more, pouch);
        assert_eq!(result.status, MoveStatus::VolumeExceeded);
    }

    #[test]
    fn full_container_reports_container_full() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        for _ in 0..2 {
            let potion = service.create_item(&def("Potion"), 1).unwrap();
            assert!(service.try_add_item_to_container(potion, pouch).is_success());
        }
        let extra = service.create_item(&def("Potion"), 1).unwrap();
        assert_eq!(
            service.can_add_item_to_container(extra, pouch).unwrap_err().status(),
            MoveStatus::ContainerFull
        );
    }

    #[test]
    fn unknown_ids_are_invalid_targets() {
        let mut service = service();
        let potion = service.create_item(&def("Potion"), 1).unwrap();
        let err = service
            .can_add_item_to_container(potion, crate::ContainerUid::generate())
            .unwrap_err();
        assert_eq!(err.status(), MoveStatus::InvalidTarget);
    }

    #[test]
    fn container_definition_is_resolved_before_item_definition() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        service.state.container_mut(backpack).unwrap().definition = def("RetiredBackpack");
        service.state.item_mut(sword).unwrap().definition = def("RetiredSword");

        let err = service
            .can_add_item_to_container(sword, backpack)
            .unwrap_err();

        assert_eq!(err, InventoryError::InvalidDefinition(def("RetiredBackpack")));
    }
}
