//! Move, stack, swap, and split.
//!
//! Dispatch for [`InventoryService::try_move_item`]:
//!
//! | source vs target      | target slot          | action                                   |
//! |-----------------------|----------------------|------------------------------------------|
//! | same container        | auto                 | rejected, an explicit slot is required   |
//! | same container        | holds the source     | rejected, nothing to do                  |
//! | any                   | empty                | relocate (partial: new instance)         |
//! | any                   | same stackable def   | stack                                    |
//! | any                   | container item       | place inside it, else swap               |
//! | any                   | other item           | swap (full quantity only)                |
//! | different container   | auto                 | empty slot, else stack, else nest        |
//!
//! Orphan sources are accepted and behave like cross-container moves.

use tracing::{debug, error, trace, warn};

use super::placement::Probe;
use super::{InventoryError, InventoryService, MoveResult};
use crate::state::{
    ChangeKind, ContainerUid, ItemInstance, ItemLocation, ItemUid, SlotId, SlotRequest,
};

impl InventoryService {
    /// Top-level move entry point.
    ///
    /// `quantity` of `None` (or zero) moves the whole stack. Never returns an
    /// error; failures are reported through [`MoveResult::status`].
    pub fn try_move_item(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    ) -> MoveResult {
        debug!(%item, %target, ?slot, ?quantity, "move requested");
        let result = match self.move_item(item, target, slot, quantity) {
            Ok(result) => result,
            Err(err) => {
                warn!(%item, %target, ?slot, %err, "move rejected");
                MoveResult::failure(&err)
            }
        };
        self.refresh_totals();
        result
    }

    /// Moves the whole stack.
    pub fn quick_move_item(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
    ) -> MoveResult {
        self.try_move_item(item, target, slot, None)
    }

    /// Moves `quantity` units. A quantity below the item's own always leaves
    /// the original instance where it was.
    pub fn split_item(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        quantity: u32,
        slot: SlotRequest,
    ) -> MoveResult {
        if quantity == 0 {
            return InventoryError::Failed("split quantity must be positive".into()).into();
        }
        self.try_move_item(item, target, slot, Some(quantity))
    }

    /// Dry run of [`Self::try_move_item`] against a scratch copy of the store.
    pub fn can_move_item(
        &self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    ) -> bool {
        let mut scratch = self.scratch_copy();
        scratch
            .move_item(item, target, slot, quantity)
            .is_ok_and(|result| result.is_success())
    }

    /// Merges up to `quantity` units of `source` into `target`.
    pub fn stack_items(&mut self, source: ItemUid, target: ItemUid, quantity: u32) -> MoveResult {
        let result = self
            .stack(source, target, quantity)
            .unwrap_or_else(|err| MoveResult::failure(&err));
        self.refresh_totals();
        result
    }

    /// Exchanges the locations of two placed items, both or neither.
    pub fn swap_items(&mut self, a: ItemUid, b: ItemUid) -> MoveResult {
        let result = self
            .swap(a, b)
            .unwrap_or_else(|err| MoveResult::failure(&err));
        self.refresh_totals();
        result
    }

    fn move_item(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotRequest,
        quantity: Option<u32>,
    ) -> Result<MoveResult, InventoryError> {
        let source = self.require_item(item)?;
        let available = source.quantity;
        let from = source.container();
        self.require_container(target)?;

        let quantity = match quantity {
            None | Some(0) => available,
            Some(requested) => requested,
        };
        if quantity > available {
            return Err(InventoryError::Failed(format!(
                "requested {quantity} units but item {item} holds {available}"
            )));
        }

        if from == Some(target) {
            return self.move_within_container(item, target, slot, quantity);
        }
        match slot {
            SlotRequest::Exact(slot) => self.move_to_slot(item, target, slot, quantity),
            SlotRequest::Auto => self.move_auto_slot(item, target, quantity),
        }
    }

    fn move_within_container(
        &mut self,
        item: ItemUid,
        container: ContainerUid,
        slot: SlotRequest,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let SlotRequest::Exact(slot) = slot else {
            return Err(InventoryError::InvalidTarget(
                "moving within a container needs an explicit slot".into(),
            ));
        };
        let occupant = self.occupant_of(container, slot)?;

        match occupant {
            None => Ok(self.transfer_to_empty_slot(item, container, slot, quantity)),
            Some(occupant) if occupant == item => Err(InventoryError::InvalidTarget(format!(
                "item {item} already occupies slot {slot}"
            ))),
            Some(occupant) => self.resolve_occupied_slot(item, occupant, quantity),
        }
    }

    fn move_to_slot(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotId,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        match self.occupant_of(target, slot)? {
            None => self.move_to_empty_slot(item, target, slot, quantity),
            Some(occupant) => self.resolve_occupied_slot(item, occupant, quantity),
        }
    }

    fn occupant_of(
        &self,
        container: ContainerUid,
        slot: SlotId,
    ) -> Result<Option<ItemUid>, InventoryError> {
        self.require_container(container)?
            .slot(slot)
            .map(|cell| cell.item)
            .ok_or_else(|| InventoryError::unknown_slot(container, slot))
    }

    fn move_auto_slot(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let container = self.require_container(target)?;
        let empty = container.first_empty_slot();
        let occupants: Vec<ItemUid> = container
            .occupied()
            .map(|(_, occupant)| occupant)
            .filter(|occupant| *occupant != item)
            .collect();

        if let Some(slot) = empty {
            return self.move_to_empty_slot(item, target, slot, quantity);
        }

        let source_definition = self.require_item(item)?.definition.clone();
        let stackable = self
            .require_item_definition(&source_definition)?
            .is_stackable();

        if stackable {
            for occupant in &occupants {
                let same = self
                    .state
                    .item(*occupant)
                    .is_some_and(|record| record.definition == source_definition);
                if !same {
                    continue;
                }
                match self.stack(item, *occupant, quantity) {
                    Ok(result) => return Ok(result),
                    Err(err) => trace!(%item, %occupant, %err, "stack candidate refused"),
                }
            }
        }

        for occupant in &occupants {
            let nests = self
                .state
                .item(*occupant)
                .is_some_and(|record| record.owned_container.is_some());
            if !nests {
                continue;
            }
            match self.move_into_item_container(item, *occupant, quantity) {
                Ok(result) => return Ok(result),
                Err(err) => trace!(%item, %occupant, %err, "nested candidate refused"),
            }
        }

        Err(InventoryError::ContainerFull(target))
    }

    /// Stack, nest, or swap against whatever occupies the requested slot.
    fn resolve_occupied_slot(
        &mut self,
        item: ItemUid,
        occupant: ItemUid,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let source_definition = self.require_item(item)?.definition.clone();
        let Some(target) = self.state.item(occupant) else {
            error!(%occupant, "slot references a missing item");
            return Err(InventoryError::Failed(format!(
                "slot references missing item {occupant}"
            )));
        };
        let same_definition = target.definition == source_definition;
        let nests = target.owned_container.is_some();

        // Same definition always resolves as a stack; a full or
        // non-stackable occupant reports StackLimitReached.
        if same_definition {
            return self.stack(item, occupant, quantity);
        }

        if nests {
            let refused = match self.move_into_item_container(item, occupant, quantity) {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };
            debug!(%item, %occupant, %refused, "container item refused, trying swap");
            return self
                .swap_for_move(item, occupant, quantity)
                .map_err(|swap| {
                    InventoryError::ContainerRejected(format!(
                        "item {occupant} refused the item ({refused}) and a swap failed ({swap})"
                    ))
                });
        }

        self.swap_for_move(item, occupant, quantity)
    }

    fn swap_for_move(
        &mut self,
        item: ItemUid,
        occupant: ItemUid,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let available = self.require_item(item)?.quantity;
        if quantity < available {
            return Err(InventoryError::Failed(
                "a partial stack cannot be swapped".into(),
            ));
        }
        self.swap(item, occupant)
    }

    fn move_to_empty_slot(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotId,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let record = self.require_item(item)?;
        let owned_container = record.owned_container;
        let definition = self.require_item_definition(&record.definition)?;
        let probe = Probe {
            definition: &definition,
            quantity,
            owned_container,
        };
        if let Err(err) = self.check_acceptance(&probe, target, 0) {
            self.log_rejection(item, target, &err);
            return Err(err);
        }
        Ok(self.transfer_to_empty_slot(item, target, slot, quantity))
    }

    fn move_into_item_container(
        &mut self,
        item: ItemUid,
        container_item: ItemUid,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        let inner = self
            .require_item(container_item)?
            .owned_container
            .ok_or_else(|| {
                InventoryError::ContainerRejected(format!("item {container_item} has no storage"))
            })?;
        if self.require_item(item)?.container() == Some(inner) {
            return Err(InventoryError::InvalidTarget(format!(
                "item {item} is already inside {container_item}"
            )));
        }
        let slot = self.first_empty_slot(inner)?;
        self.move_to_empty_slot(item, inner, slot, quantity)
            .map(MoveResult::nested)
    }

    /// Moves `quantity` units into an empty slot that has already been
    /// validated. A full move relocates the instance; a partial one leaves it
    /// in place and creates a new instance for the moved units.
    fn transfer_to_empty_slot(
        &mut self,
        item: ItemUid,
        target: ContainerUid,
        slot: SlotId,
        quantity: u32,
    ) -> MoveResult {
        let Some(source) = self.state.item(item) else {
            return InventoryError::unknown_item(item).into();
        };
        let available = source.quantity;
        let from = source.container();

        if quantity >= available {
            if from.is_some() {
                if let Err(err) = self.detach(item) {
                    return err.into();
                }
            }
            if let Err(err) = self.place(item, target, slot) {
                return err.into();
            }
            debug!(%item, %target, %slot, quantity, "item relocated");
            return MoveResult::success(quantity, target);
        }

        let split_uid = ItemUid::generate();
        let mut split = ItemInstance::new(split_uid, source.definition.clone(), quantity);
        split.debug_name = source.debug_name.clone();

        self.state.insert_item(split);
        self.changes.item(split_uid, ChangeKind::CREATED);
        self.adjust_quantity(item, |q| q - quantity);
        if let Some(from) = from {
            self.mark_dirty(from);
        }
        if let Err(err) = self.place(split_uid, target, slot) {
            error!(%split_uid, %err, "split placement failed after validation");
            self.adjust_quantity(item, |q| q + quantity);
            self.state.remove_item(split_uid);
            self.changes.item_removed(split_uid);
            return err.into();
        }

        debug!(%item, new_item = %split_uid, %target, %slot, quantity, "stack split");
        MoveResult::success(quantity, target).with_new_item(Some(split_uid))
    }

    fn stack(
        &mut self,
        source: ItemUid,
        target: ItemUid,
        quantity: u32,
    ) -> Result<MoveResult, InventoryError> {
        if source == target {
            return Err(InventoryError::InvalidTarget(
                "an item cannot be stacked onto itself".into(),
            ));
        }
        let source_record = self.require_item(source)?;
        let target_record = self.require_item(target)?;
        if source_record.definition != target_record.definition {
            return Err(InventoryError::TypeMismatch {
                item: source_record.definition.clone(),
                container: target_record.definition.clone(),
            });
        }
        let definition = self.require_item_definition(&source_record.definition)?;
        let quantity = quantity.min(source_record.quantity);
        let source_container = source_record.container();
        let target_container = target_record.container();

        let room = definition
            .effective_max_stack()
            .saturating_sub(target_record.quantity);
        if room == 0 {
            return Err(InventoryError::StackLimitReached(target));
        }
        let mut movable = quantity.min(room);

        if let Some(container) = target_container.filter(|c| Some(*c) != source_container) {
            let limit = self
                .state
                .container(container)
                .and_then(|record| self.definitions.container_definition(&record.definition))
                .and_then(|def| def.volume_limit);
            if let Some(limit) = limit {
                let free = limit.saturating_sub(self.get_container_used_volume(container));
                let by_volume = free.checked_div(definition.volume).unwrap_or(u32::MAX);
                if by_volume == 0 {
                    return Err(InventoryError::VolumeExceeded {
                        required: definition.volume,
                        available: free,
                    });
                }
                movable = movable.min(by_volume);
            }
        }

        self.adjust_quantity(target, |q| q + movable);
        if let Some(container) = target_container {
            self.mark_dirty(container);
        }

        let left = self.adjust_quantity(source, |q| q - movable);
        if left == 0 {
            self.destroy_item(source)?;
        } else if let Some(container) = source_container {
            self.mark_dirty(container);
        }

        debug!(%source, %target, moved = movable, requested = quantity, "stacked");
        Ok(MoveResult::transferred(movable, quantity, target_container))
    }

    fn swap(&mut self, a: ItemUid, b: ItemUid) -> Result<MoveResult, InventoryError> {
        if a == b {
            return Err(InventoryError::InvalidTarget(
                "an item cannot be swapped with itself".into(),
            ));
        }
        let first = self.require_item(a)?;
        let second = self.require_item(b)?;
        let (Some(loc_a), Some(loc_b)) = (first.location, second.location) else {
            return Err(InventoryError::Failed(
                "both items must be placed to swap".into(),
            ));
        };
        let moved = first.quantity;
        let (owned_a, owned_b) = (first.owned_container, second.owned_container);

        for (uid, loc) in [(a, loc_a), (b, loc_b)] {
            let occupant = self
                .state
                .container(loc.container)
                .and_then(|container| container.slot(loc.slot))
                .and_then(|slot| slot.item);
            if occupant != Some(uid) {
                error!(
                    item = %uid,
                    container = %loc.container,
                    slot = %loc.slot,
                    ?occupant,
                    "slot and item disagree; swap aborted"
                );
                return Err(InventoryError::Failed(format!(
                    "slot {} of container {} does not hold item {uid}",
                    loc.slot, loc.container
                )));
            }
        }

        if loc_a.container != loc_b.container {
            let volume_a = self.get_item_total_volume(a);
            let volume_b = self.get_item_total_volume(b);
            self.check_swap_side(a, loc_b.container, volume_b)?;
            self.check_swap_side(b, loc_a.container, volume_a)?;
        }

        self.write_slot(loc_a, b);
        self.write_slot(loc_b, a);
        self.write_location(a, loc_b);
        self.write_location(b, loc_a);
        if let Some(owned) = owned_a {
            self.set_parent_link(owned, Some(loc_b.container));
        }
        if let Some(owned) = owned_b {
            self.set_parent_link(owned, Some(loc_a.container));
        }
        self.mark_dirty(loc_a.container);
        self.mark_dirty(loc_b.container);

        debug!(%a, %b, "items swapped");
        Ok(MoveResult::swapped(moved, b, loc_b.container))
    }

    /// Acceptance of `item` into `target` while `outgoing_volume` leaves it.
    fn check_swap_side(
        &self,
        item: ItemUid,
        target: ContainerUid,
        outgoing_volume: u32,
    ) -> Result<(), InventoryError> {
        let record = self.require_item(item)?;
        let definition = self.require_item_definition(&record.definition)?;
        let probe = Probe {
            definition: &definition,
            quantity: record.quantity,
            owned_container: record.owned_container,
        };
        self.check_acceptance(&probe, target, outgoing_volume)
    }

    fn write_slot(&mut self, location: ItemLocation, item: ItemUid) {
        if let Some(cell) = self
            .state
            .container_mut(location.container)
            .and_then(|container| container.slot_mut(location.slot))
        {
            cell.item = Some(item);
        }
        self.changes.container(location.container, ChangeKind::SLOTS);
    }

    fn write_location(&mut self, item: ItemUid, location: ItemLocation) {
        if let Some(record) = self.state.item_mut(item) {
            record.location = Some(location);
        }
        self.changes.item(item, ChangeKind::LOCATION);
    }

    /// Applies `f` to the item's quantity and returns the new value.
    fn adjust_quantity(&mut self, item: ItemUid, f: impl FnOnce(u32) -> u32) -> u32 {
        let Some(record) = self.state.item_mut(item) else {
            return 0;
        };
        record.quantity = f(record.quantity);
        let quantity = record.quantity;
        self.changes.item(item, ChangeKind::QUANTITY);
        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{InventoryService, MoveStatus};
    use crate::state::{ContainerUid, ItemUid, SlotId, SlotRequest};

    fn placed(
        service: &mut InventoryService,
        definition: &str,
        quantity: u32,
        container: ContainerUid,
        slot: u16,
    ) -> ItemUid {
        let item = service.create_item(&def(definition), quantity).unwrap();
        service
            .add_item_to_container(item, container, SlotId(slot))
            .unwrap();
        item
    }

    fn total_quantity(service: &InventoryService) -> u32 {
        service.state().items().map(|item| item.quantity).sum()
    }

    #[test]
    fn partial_stack_onto_occupied_slot() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let first = placed(&mut service, "Potion", 10, backpack, 0);
        let second = service.create_item(&def("Potion"), 15).unwrap();

        let result = service.try_move_item(second, backpack, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::PartialSuccess);
        assert_eq!(result.moved_quantity, 10);
        assert_eq!(result.remaining_quantity, 5);
        assert_eq!(service.find_item(first).unwrap().quantity, 20);
        let survivor = service.find_item(second).unwrap();
        assert_eq!(survivor.quantity, 5);
        assert!(survivor.is_orphan());
        assert_eq!(total_quantity(&service), 25);
    }

    #[test]
    fn full_stack_destroys_source() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let target = placed(&mut service, "Potion", 5, backpack, 0);
        let source = placed(&mut service, "Potion", 4, backpack, 1);

        let result = service.try_move_item(source, backpack, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::Success);
        assert_eq!(result.moved_quantity, 4);
        assert!(service.find_item(source).is_none());
        assert_eq!(service.find_item(target).unwrap().quantity, 9);
        assert_eq!(service.find_container(backpack).unwrap().occupant(SlotId(1)), None);
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn stacking_onto_full_stack_reports_limit() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        placed(&mut service, "Potion", 20, backpack, 0);
        let source = placed(&mut service, "Potion", 3, backpack, 1);

        let result = service.try_move_item(source, backpack, SlotRequest::Exact(SlotId(0)), None);
        assert_eq!(result.status, MoveStatus::StackLimitReached);
        assert_eq!(service.find_item(source).unwrap().slot(), Some(SlotId(1)));
    }

    #[test]
    fn same_non_stackable_definition_reports_limit_instead_of_swapping() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let first = placed(&mut service, "Sword", 1, backpack, 0);
        let second = placed(&mut service, "Sword", 1, backpack, 1);
        service.take_delta();

        let result = service.try_move_item(second, backpack, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::StackLimitReached);
        assert_eq!(result.swapped_with, None);
        assert_eq!(service.find_item(first).unwrap().slot(), Some(SlotId(0)));
        assert_eq!(service.find_item(second).unwrap().slot(), Some(SlotId(1)));
        assert!(service.take_delta().is_empty());
    }

    #[test]
    fn same_container_item_definition_reports_limit_instead_of_nesting() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let outer = placed(&mut service, "Bag", 1, chest, 0);
        let inner = placed(&mut service, "Bag", 1, chest, 1);
        let storage = service.find_item(outer).unwrap().owned_container.unwrap();

        let result = service.try_move_item(inner, chest, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::StackLimitReached);
        assert!(!result.moved_into_item);
        assert_eq!(service.find_item(inner).unwrap().container(), Some(chest));
        assert_eq!(service.find_item(inner).unwrap().slot(), Some(SlotId(1)));
        assert_eq!(service.find_container(storage).unwrap().occupied_count(), 0);
    }

    #[test]
    fn move_onto_own_slot_is_rejected_without_mutation() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        let a = placed(&mut service, "Potion", 1, pouch, 0);
        placed(&mut service, "Ration", 1, pouch, 1);
        service.take_delta();

        let result = service.try_move_item(a, pouch, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::InvalidTarget);
        assert_eq!(service.find_container(pouch).unwrap().occupied_count(), 2);
        assert!(service.take_delta().is_empty());
    }

    #[test]
    fn same_container_auto_slot_is_rejected() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = placed(&mut service, "Sword", 1, backpack, 0);
        let result = service.try_move_item(sword, backpack, SlotRequest::Auto, None);
        assert_eq!(result.status, MoveStatus::InvalidTarget);
    }

    #[test]
    fn relocate_within_container() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = placed(&mut service, "Sword", 1, backpack, 0);

        let result = service.try_move_item(sword, backpack, SlotRequest::Exact(SlotId(6)), None);

        assert_eq!(result.status, MoveStatus::Success);
        let container = service.find_container(backpack).unwrap();
        assert_eq!(container.occupant(SlotId(0)), None);
        assert_eq!(container.occupant(SlotId(6)), Some(sword));
        assert_eq!(service.find_item(sword).unwrap().slot(), Some(SlotId(6)));
    }

    #[test]
    fn partial_move_creates_new_instance() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let chest = service.create_container(&def("Chest")).unwrap();
        let potion = placed(&mut service, "Potion", 12, backpack, 2);

        let result = service.split_item(potion, chest, 5, SlotRequest::Auto);

        assert_eq!(result.status, MoveStatus::Success);
        let new_item = result.new_item.unwrap();
        assert_ne!(new_item, potion);
        let original = service.find_item(potion).unwrap();
        assert_eq!(original.quantity, 7);
        assert_eq!(original.container(), Some(backpack));
        let split = service.find_item(new_item).unwrap();
        assert_eq!(split.quantity, 5);
        assert_eq!(split.container(), Some(chest));
        assert_eq!(total_quantity(&service), 12);
    }

    #[test]
    fn partial_move_within_container_splits_too() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = placed(&mut service, "Potion", 6, backpack, 0);

        let result = service.split_item(potion, backpack, 2, SlotRequest::Exact(SlotId(3)));

        let new_item = result.new_item.unwrap();
        assert_eq!(service.find_item(potion).unwrap().slot(), Some(SlotId(0)));
        assert_eq!(service.find_item(new_item).unwrap().slot(), Some(SlotId(3)));
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn split_rejects_zero_and_excess() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = placed(&mut service, "Potion", 3, backpack, 0);
        let chest = service.create_container(&def("Chest")).unwrap();

        assert_eq!(
            service.split_item(potion, chest, 0, SlotRequest::Auto).status,
            MoveStatus::Failed
        );
        assert_eq!(
            service.try_move_item(potion, chest, SlotRequest::Auto, Some(4)).status,
            MoveStatus::Failed
        );
    }

    #[test]
    fn different_items_swap_within_container() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = placed(&mut service, "Sword", 1, backpack, 0);
        let potion = placed(&mut service, "Potion", 3, backpack, 1);

        let result = service.try_move_item(sword, backpack, SlotRequest::Exact(SlotId(1)), None);

        assert_eq!(result.status, MoveStatus::SwapPerformed);
        assert_eq!(result.swapped_with, Some(potion));
        assert_eq!(service.find_item(sword).unwrap().slot(), Some(SlotId(1)));
        assert_eq!(service.find_item(potion).unwrap().slot(), Some(SlotId(0)));
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn swap_across_full_containers() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        for slot in 0..8 {
            placed(&mut service, "Potion", 1, backpack, slot);
        }
        let ration = placed(&mut service, "Ration", 1, pouch, 0);
        placed(&mut service, "Ration", 1, pouch, 1);
        let potion = service.find_container(backpack).unwrap().occupant(SlotId(4)).unwrap();

        let result = service.try_move_item(ration, backpack, SlotRequest::Exact(SlotId(4)), None);

        assert_eq!(result.status, MoveStatus::SwapPerformed);
        assert_eq!(service.find_item(potion).unwrap().container(), Some(pouch));
        assert_eq!(service.find_item(ration).unwrap().container(), Some(backpack));
    }

    #[test]
    fn swap_respects_target_rules() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        let sword = placed(&mut service, "Sword", 1, backpack, 0);
        let potion = placed(&mut service, "Potion", 1, pouch, 0);

        let result = service.try_move_item(sword, pouch, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::TypeMismatch);
        assert_eq!(service.find_item(sword).unwrap().container(), Some(backpack));
        assert_eq!(service.find_item(potion).unwrap().container(), Some(pouch));
    }

    #[test]
    fn partial_stack_cannot_be_swapped() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = placed(&mut service, "Potion", 6, backpack, 0);
        placed(&mut service, "Sword", 1, backpack, 1);
        let result = service.try_move_item(potion, backpack, SlotRequest::Exact(SlotId(1)), Some(2));
        assert_eq!(result.status, MoveStatus::Failed);
        assert_eq!(service.find_item(potion).unwrap().quantity, 6);
    }

    #[test]
    fn dropping_onto_container_item_places_inside() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = placed(&mut service, "Bag", 1, chest, 0);
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        let sword = placed(&mut service, "Sword", 1, chest, 1);

        let result = service.try_move_item(sword, chest, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::Success);
        assert!(result.moved_into_item);
        assert_eq!(result.target_container, Some(storage));
        assert_eq!(service.find_item(sword).unwrap().container(), Some(storage));
        assert_eq!(service.find_item(bag).unwrap().slot(), Some(SlotId(0)));
    }

    #[test]
    fn refused_by_container_item_falls_back_to_swap() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = placed(&mut service, "Bag", 1, chest, 0);
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        for slot in 0..4 {
            placed(&mut service, "Potion", 1, storage, slot);
        }
        let sword = placed(&mut service, "Sword", 1, chest, 1);

        let result = service.try_move_item(sword, chest, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::SwapPerformed);
        assert_eq!(service.find_item(bag).unwrap().slot(), Some(SlotId(1)));
        assert_eq!(service.find_item(sword).unwrap().slot(), Some(SlotId(0)));
    }

    #[test]
    fn refused_by_container_item_and_swap_reports_rejection() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let bag = placed(&mut service, "Bag", 1, chest, 0);
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        for slot in 0..4 {
            placed(&mut service, "Potion", 1, storage, slot);
        }
        let sword = placed(&mut service, "Sword", 1, backpack, 0);

        // The bag is full and the backpack refuses nested containers.
        let result = service.try_move_item(sword, chest, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::ContainerRejected);
        assert_eq!(service.find_item(sword).unwrap().container(), Some(backpack));
    }

    #[test]
    fn auto_slot_prefers_empty_slot_then_stack_then_nest() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let existing = placed(&mut service, "Potion", 5, chest, 0);
        let bag = placed(&mut service, "Bag", 1, chest, 1);
        placed(&mut service, "Sword", 1, chest, 2);

        let first = service.create_item(&def("Ration"), 1).unwrap();
        let result = service.try_move_item(first, chest, SlotRequest::Auto, None);
        assert_eq!(service.find_item(first).unwrap().slot(), Some(SlotId(3)));
        assert_eq!(result.status, MoveStatus::Success);

        let potion = service.create_item(&def("Potion"), 3).unwrap();
        let result = service.try_move_item(potion, chest, SlotRequest::Auto, None);
        assert_eq!(result.status, MoveStatus::Success);
        assert_eq!(service.find_item(existing).unwrap().quantity, 8);
        assert!(service.find_item(potion).is_none());

        let sword = service.create_item(&def("Sword"), 1).unwrap();
        let result = service.try_move_item(sword, chest, SlotRequest::Auto, None);
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        assert!(result.moved_into_item);
        assert_eq!(service.find_item(sword).unwrap().container(), Some(storage));
    }

    #[test]
    fn auto_slot_without_room_reports_full() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        placed(&mut service, "Potion", 20, pouch, 0);
        placed(&mut service, "Ration", 1, pouch, 1);
        let ration = service.create_item(&def("Ration"), 1).unwrap();
        let potion = service.create_item(&def("Potion"), 1).unwrap();

        assert_eq!(
            service.try_move_item(potion, pouch, SlotRequest::Auto, None).status,
            MoveStatus::ContainerFull
        );
        // Rations have room to stack but the pouch volume is capped at 10.
        let result = service.try_move_item(ration, pouch, SlotRequest::Auto, None);
        assert_eq!(result.status, MoveStatus::ContainerFull);
    }

    #[test]
    fn cross_container_stack_is_capped_by_volume() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let target = placed(&mut service, "Ration", 2, pouch, 0);
        let source = placed(&mut service, "Ration", 6, backpack, 0);

        // 4 volume used of 10, rations take 2 each: only 3 fit.
        let result = service.try_move_item(source, pouch, SlotRequest::Exact(SlotId(0)), None);

        assert_eq!(result.status, MoveStatus::PartialSuccess);
        assert_eq!(result.moved_quantity, 3);
        assert_eq!(result.remaining_quantity, 3);
        assert_eq!(service.find_item(target).unwrap().quantity, 5);
        assert_eq!(service.get_container_used_volume(pouch), 10);
    }

    #[test]
    fn nested_move_updates_parent_links() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let other = service.create_container(&def("Chest")).unwrap();
        let bag = placed(&mut service, "Bag", 1, chest, 0);
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();

        let result = service.quick_move_item(bag, other, SlotRequest::Auto);

        assert_eq!(result.status, MoveStatus::Success);
        assert_eq!(service.find_container(storage).unwrap().parent_container, Some(other));
        assert_eq!(service.find_container(chest).unwrap().occupied_count(), 0);
    }

    #[test]
    fn moving_container_into_its_own_contents_is_a_cycle() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let outer = placed(&mut service, "Crate", 1, chest, 0);
        let outer_storage = service.find_item(outer).unwrap().owned_container.unwrap();
        let inner = placed(&mut service, "Bag", 1, outer_storage, 0);
        let inner_storage = service.find_item(inner).unwrap().owned_container.unwrap();

        let result = service.try_move_item(outer, inner_storage, SlotRequest::Auto, None);
        assert_eq!(result.status, MoveStatus::CycleDetected);
        assert_eq!(service.find_item(outer).unwrap().container(), Some(chest));
    }

    #[test]
    fn can_move_item_does_not_mutate() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let chest = service.create_container(&def("Chest")).unwrap();
        let potion = placed(&mut service, "Potion", 4, backpack, 0);
        service.take_delta();

        assert!(service.can_move_item(potion, chest, SlotRequest::Auto, Some(2)));
        assert!(!service.can_move_item(potion, chest, SlotRequest::Auto, Some(9)));
        assert!(!service.can_move_item(potion, backpack, SlotRequest::Auto, None));

        assert_eq!(service.find_item(potion).unwrap().quantity, 4);
        assert_eq!(service.state().item_count(), 1);
        assert!(!service.has_pending_changes());
    }

    #[test]
    fn unknown_ids_are_invalid_targets() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = service.create_item(&def("Potion"), 1).unwrap();

        assert_eq!(
            service
                .try_move_item(ItemUid::generate(), backpack, SlotRequest::Auto, None)
                .status,
            MoveStatus::InvalidTarget
        );
        assert_eq!(
            service
                .try_move_item(potion, ContainerUid::generate(), SlotRequest::Auto, None)
                .status,
            MoveStatus::InvalidTarget
        );
        assert_eq!(
            service
                .try_move_item(potion, backpack, SlotRequest::Exact(SlotId(42)), None)
                .status,
            MoveStatus::InvalidTarget
        );
    }

    #[test]
    fn swap_requires_both_items_placed() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = placed(&mut service, "Sword", 1, backpack, 0);
        let loose = service.create_item(&def("Ration"), 1).unwrap();
        assert_eq!(service.swap_items(sword, loose).status, MoveStatus::Failed);
        assert_eq!(service.swap_items(sword, sword).status, MoveStatus::InvalidTarget);
    }

    #[test]
    fn stack_items_between_orphans() {
        let mut service = service();
        let a = service.create_item(&def("Potion"), 18).unwrap();
        let b = service.create_item(&def("Potion"), 5).unwrap();
        let result = service.stack_items(b, a, 5);
        assert_eq!(result.status, MoveStatus::PartialSuccess);
        assert_eq!(result.moved_quantity + result.remaining_quantity, 5);
        assert_eq!(result.target_container, None);
        assert_eq!(total_quantity(&service), 23);

        let sword = service.create_item(&def("Sword"), 1).unwrap();
        assert_eq!(service.stack_items(sword, a, 1).status, MoveStatus::TypeMismatch);
    }
}
