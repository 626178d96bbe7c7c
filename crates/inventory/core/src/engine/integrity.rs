//! Full-scan consistency checks between item locations and container slots.

use std::collections::HashMap;
use std::fmt;

use tracing::{error, info, warn};

use super::InventoryService;
use crate::config::RepairPolicy;
use crate::state::{ChangeKind, ContainerUid, ItemLocation, ItemUid, SlotId};

/// One disagreement found by [`InventoryService::integrity_report`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegrityIssue {
    /// Item claims a container that does not exist.
    MissingContainer {
        item: ItemUid,
        container: ContainerUid,
    },
    /// Item claims a slot index past the container's last slot.
    SlotOutOfRange {
        item: ItemUid,
        container: ContainerUid,
        slot: SlotId,
    },
    /// Item claims a slot that holds something else, or nothing.
    SlotMismatch {
        item: ItemUid,
        container: ContainerUid,
        slot: SlotId,
        occupant: Option<ItemUid>,
    },
    /// Slot references an item that does not exist.
    MissingItem {
        container: ContainerUid,
        slot: SlotId,
        item: ItemUid,
    },
    /// Slot references an item whose recorded location is elsewhere.
    LocationMismatch {
        container: ContainerUid,
        slot: SlotId,
        item: ItemUid,
        recorded: Option<ItemLocation>,
    },
    /// Owned container's parent link does not follow its owner item.
    ParentLinkMismatch {
        container: ContainerUid,
        expected: Option<ContainerUid>,
        recorded: Option<ContainerUid>,
    },
    /// Owner item and owned container do not point at each other.
    OwnerLinkMismatch {
        item: ItemUid,
        container: ContainerUid,
    },
    ZeroQuantity {
        item: ItemUid,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContainer { item, container } => {
                write!(f, "item {item} references missing container {container}")
            }
            Self::SlotOutOfRange {
                item,
                container,
                slot,
            } => write!(f, "item {item} claims slot {slot} past the end of container {container}"),
            Self::SlotMismatch {
                item,
                container,
                slot,
                occupant: Some(occupant),
            } => write!(
                f,
                "item {item} claims slot {slot} of container {container}, which holds {occupant}"
            ),
            Self::SlotMismatch {
                item,
                container,
                slot,
                occupant: None,
            } => write!(
                f,
                "item {item} claims slot {slot} of container {container}, which is empty"
            ),
            Self::MissingItem {
                container,
                slot,
                item,
            } => write!(f, "slot {slot} of container {container} references missing item {item}"),
            Self::LocationMismatch {
                container,
                slot,
                item,
                recorded,
            } => write!(
                f,
                "slot {slot} of container {container} holds item {item}, which records {recorded:?}"
            ),
            Self::ParentLinkMismatch {
                container,
                expected,
                recorded,
            } => write!(
                f,
                "container {container} records parent {recorded:?}, owner is in {expected:?}"
            ),
            Self::OwnerLinkMismatch { item, container } => {
                write!(f, "item {item} and container {container} disagree on ownership")
            }
            Self::ZeroQuantity { item } => write!(f, "item {item} has zero quantity"),
        }
    }
}

/// Every issue found by one scan, items first, each group ordered by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegrityReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl InventoryService {
    /// Scans every record without mutating anything.
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut issues = Vec::new();

        let mut items = self.state.item_uids();
        items.sort();
        for uid in items {
            let Some(item) = self.state.item(uid) else {
                continue;
            };
            if item.quantity == 0 {
                issues.push(IntegrityIssue::ZeroQuantity { item: uid });
            }
            if let Some(location) = item.location {
                if let Some(issue) = self.check_item_location(uid, location) {
                    issues.push(issue);
                }
            }
            if let Some(owned) = item.owned_container {
                let linked = self
                    .state
                    .container(owned)
                    .is_some_and(|container| container.owner_item == Some(uid));
                if !linked {
                    issues.push(IntegrityIssue::OwnerLinkMismatch {
                        item: uid,
                        container: owned,
                    });
                }
            }
        }

        let mut containers = self.state.container_uids();
        containers.sort();
        for uid in containers {
            let Some(container) = self.state.container(uid) else {
                continue;
            };
            for (slot, item) in container.occupied() {
                match self.state.item(item) {
                    None => issues.push(IntegrityIssue::MissingItem {
                        container: uid,
                        slot,
                        item,
                    }),
                    Some(record) if record.location != Some(ItemLocation::new(uid, slot)) => {
                        issues.push(IntegrityIssue::LocationMismatch {
                            container: uid,
                            slot,
                            item,
                            recorded: record.location,
                        });
                    }
                    Some(_) => {}
                }
            }

            let Some(owner) = container.owner_item else {
                continue;
            };
            match self.state.item(owner) {
                Some(record) => {
                    if record.owned_container != Some(uid) {
                        issues.push(IntegrityIssue::OwnerLinkMismatch {
                            item: owner,
                            container: uid,
                        });
                    }
                    let expected = record.container();
                    if container.parent_container != expected {
                        issues.push(IntegrityIssue::ParentLinkMismatch {
                            container: uid,
                            expected,
                            recorded: container.parent_container,
                        });
                    }
                }
                None => issues.push(IntegrityIssue::OwnerLinkMismatch {
                    item: owner,
                    container: uid,
                }),
            }
        }

        IntegrityReport { issues }
    }

    fn check_item_location(&self, item: ItemUid, location: ItemLocation) -> Option<IntegrityIssue> {
        let ItemLocation { container, slot } = location;
        let Some(record) = self.state.container(container) else {
            return Some(IntegrityIssue::MissingContainer { item, container });
        };
        let Some(cell) = record.slot(slot) else {
            return Some(IntegrityIssue::SlotOutOfRange {
                item,
                container,
                slot,
            });
        };
        (cell.item != Some(item)).then_some(IntegrityIssue::SlotMismatch {
            item,
            container,
            slot,
            occupant: cell.item,
        })
    }

    /// Logs every issue at error level and returns `true` when none were found.
    pub fn validate_data_integrity(&self) -> bool {
        let report = self.integrity_report();
        for issue in &report.issues {
            error!(%issue, "integrity check failed");
        }
        if !report.is_valid() {
            warn!(issues = report.len(), "inventory data is inconsistent");
        }
        report.is_valid()
    }

    /// Reconciles items with the slots that reference them and returns the
    /// number of records rewritten.
    ///
    /// Slot occupancy always wins: an item referenced by a slot gets that slot
    /// as its location. [`RepairPolicy::SlotAuthoritative`] stops there, so an
    /// item that points at a slot nothing references stays inconsistent.
    /// [`RepairPolicy::Bidirectional`] also clears dangling and duplicate slot
    /// references, lets unclaimed items take the empty slot they point at (or
    /// orphans them), and re-derives parent links.
    pub fn repair_data_integrity(&mut self) -> usize {
        let policy = self.config.repair_policy;
        let bidirectional = policy == RepairPolicy::Bidirectional;
        let mut repaired = 0;
        let mut claimed: HashMap<ItemUid, ItemLocation> = HashMap::new();

        let mut containers = self.state.container_uids();
        containers.sort();
        for &container in &containers {
            let occupied: Vec<(SlotId, ItemUid)> = self
                .state
                .container(container)
                .map(|record| record.occupied().collect())
                .unwrap_or_default();

            for (slot, item) in occupied {
                let location = ItemLocation::new(container, slot);
                if !self.state.contains_item(item) {
                    if bidirectional {
                        self.write_occupant(location, None);
                        repaired += 1;
                    }
                    continue;
                }
                if let Some(first) = claimed.get(&item) {
                    error!(%item, first = ?first, duplicate = ?location, "item referenced by two slots");
                    if bidirectional {
                        self.write_occupant(location, None);
                        repaired += 1;
                    }
                    continue;
                }
                claimed.insert(item, location);

                let recorded = self.state.item(item).and_then(|record| record.location);
                if recorded != Some(location) {
                    self.relocate_record(item, Some(location));
                    repaired += 1;
                }
            }
        }

        if bidirectional {
            repaired += self.repair_unclaimed_items(&mut claimed);
            repaired += self.repair_parent_links(&containers);
        }

        for container in containers {
            if let Some(record) = self.state.container_mut(container) {
                record.totals.dirty = true;
            }
        }
        self.refresh_totals();

        info!(repaired, ?policy, "integrity repair finished");
        repaired
    }

    fn repair_unclaimed_items(&mut self, claimed: &mut HashMap<ItemUid, ItemLocation>) -> usize {
        let mut repaired = 0;
        let mut items = self.state.item_uids();
        items.sort();

        for item in items {
            if claimed.contains_key(&item) {
                continue;
            }
            let Some(location) = self.state.item(item).and_then(|record| record.location) else {
                continue;
            };
            let slot_is_free = self
                .state
                .container(location.container)
                .and_then(|container| container.slot(location.slot))
                .is_some_and(|cell| cell.is_empty());

            if slot_is_free {
                self.write_occupant(location, Some(item));
                claimed.insert(item, location);
            } else {
                warn!(%item, ?location, "orphaning item with an unusable location");
                self.relocate_record(item, None);
            }
            repaired += 1;
        }
        repaired
    }

    fn repair_parent_links(&mut self, containers: &[ContainerUid]) -> usize {
        let mut repaired = 0;
        for &container in containers {
            let Some(record) = self.state.container(container) else {
                continue;
            };
            let Some(owner) = record.owner_item else {
                continue;
            };
            let expected = self.state.item(owner).and_then(|item| item.container());
            if record.parent_container != expected {
                self.set_parent_link(container, expected);
                repaired += 1;
            }
        }
        repaired
    }

    fn write_occupant(&mut self, location: ItemLocation, item: Option<ItemUid>) {
        if let Some(cell) = self
            .state
            .container_mut(location.container)
            .and_then(|container| container.slot_mut(location.slot))
        {
            cell.item = item;
            self.changes.container(location.container, ChangeKind::SLOTS);
        }
    }

    /// Rewrites the item's location and the parent link of its own container.
    fn relocate_record(&mut self, item: ItemUid, location: Option<ItemLocation>) {
        let Some(record) = self.state.item_mut(item) else {
            return;
        };
        record.location = location;
        let owned = record.owned_container;
        self.changes.item(item, ChangeKind::LOCATION);
        if let Some(owned) = owned {
            self.set_parent_link(owned, location.map(|loc| loc.container));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::config::InventoryConfig;

    fn corrupt_location(service: &mut InventoryService, item: ItemUid, location: Option<ItemLocation>) {
        service.state.item_mut(item).unwrap().location = location;
    }

    #[test]
    fn consistent_store_validates() {
        let mut service = service();
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = service.create_item(&def("Bag"), 1).unwrap();
        service.add_item_to_container(bag, chest, SlotId(1)).unwrap();
        service.create_item(&def("Potion"), 3).unwrap();

        assert!(service.integrity_report().is_valid());
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn slot_wins_over_item_location() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        service.add_item_to_container(sword, backpack, SlotId(0)).unwrap();
        corrupt_location(&mut service, sword, Some(ItemLocation::new(backpack, SlotId(5))));

        let report = service.integrity_report();
        assert_eq!(report.len(), 2);
        assert!(report.issues.contains(&IntegrityIssue::SlotMismatch {
            item: sword,
            container: backpack,
            slot: SlotId(5),
            occupant: None,
        }));
        assert!(!service.validate_data_integrity());

        assert_eq!(service.repair_data_integrity(), 1);
        assert_eq!(service.find_item(sword).unwrap().slot(), Some(SlotId(0)));
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn validation_is_read_only() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        corrupt_location(&mut service, sword, Some(ItemLocation::new(backpack, SlotId(2))));
        service.take_delta();

        assert!(!service.validate_data_integrity());
        assert!(!service.validate_data_integrity());
        assert!(!service.has_pending_changes());
        assert_eq!(service.find_item(sword).unwrap().slot(), Some(SlotId(2)));
    }

    #[test]
    fn slot_authoritative_repair_leaves_unreferenced_claims() {
        let mut service = service();
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        corrupt_location(&mut service, sword, Some(ItemLocation::new(backpack, SlotId(2))));

        assert_eq!(service.repair_data_integrity(), 0);
        assert!(!service.validate_data_integrity());
    }

    #[test]
    fn bidirectional_repair_claims_empty_slot() {
        let mut service =
            service_with(InventoryConfig::default().with_repair_policy(RepairPolicy::Bidirectional));
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        corrupt_location(&mut service, sword, Some(ItemLocation::new(backpack, SlotId(2))));

        assert_eq!(service.repair_data_integrity(), 1);
        assert_eq!(service.find_container(backpack).unwrap().occupant(SlotId(2)), Some(sword));
        assert_eq!(service.get_container_used_weight(backpack), 5);
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn bidirectional_repair_clears_dangling_and_orphans_losers() {
        let mut service =
            service_with(InventoryConfig::default().with_repair_policy(RepairPolicy::Bidirectional));
        let backpack = service.create_container(&def("Backpack")).unwrap();
        let potion = service.create_item(&def("Potion"), 2).unwrap();
        let sword = service.create_item(&def("Sword"), 1).unwrap();
        service.add_item_to_container(potion, backpack, SlotId(0)).unwrap();

        // Slot 3 points at nothing alive; the sword claims the potion's slot.
        service.state.container_mut(backpack).unwrap().slots[3].item = Some(ItemUid::generate());
        corrupt_location(&mut service, sword, Some(ItemLocation::new(backpack, SlotId(0))));
        assert!(!service.validate_data_integrity());

        assert_eq!(service.repair_data_integrity(), 2);
        assert!(service.find_item(sword).unwrap().is_orphan());
        assert_eq!(service.find_container(backpack).unwrap().occupant(SlotId(3)), None);
        assert_eq!(service.find_container(backpack).unwrap().occupant(SlotId(0)), Some(potion));
        assert!(service.validate_data_integrity());
    }

    #[test]
    fn parent_links_are_checked_and_rederived() {
        let mut service =
            service_with(InventoryConfig::default().with_repair_policy(RepairPolicy::Bidirectional));
        let chest = service.create_container(&def("Chest")).unwrap();
        let bag = service.create_item(&def("Bag"), 1).unwrap();
        let storage = service.find_item(bag).unwrap().owned_container.unwrap();
        service.add_item_to_container(bag, chest, SlotId(0)).unwrap();
        service.state.container_mut(storage).unwrap().parent_container = None;

        let report = service.integrity_report();
        assert_eq!(
            report.issues,
            vec![IntegrityIssue::ParentLinkMismatch {
                container: storage,
                expected: Some(chest),
                recorded: None,
            }]
        );

        assert_eq!(service.repair_data_integrity(), 1);
        assert_eq!(service.find_container(storage).unwrap().parent_container, Some(chest));
    }

    #[test]
    fn issues_render_readably() {
        let item = ItemUid::generate();
        let issue = IntegrityIssue::ZeroQuantity { item };
        assert_eq!(issue.to_string(), format!("item {item} has zero quantity"));
    }
}
