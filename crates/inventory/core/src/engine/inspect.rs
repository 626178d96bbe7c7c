//! Read-only debug views for tooling and logs.

use std::fmt;

use super::InventoryService;
use crate::state::{ContainerUid, DefinitionId, ItemUid, SlotId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotDebugEntry {
    pub slot: SlotId,
    pub item: Option<ItemUid>,
    pub label: Option<String>,
    pub definition: Option<DefinitionId>,
    pub quantity: u32,
}

/// Snapshot of one container's occupancy and totals.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerDebugInfo {
    pub uid: ContainerUid,
    pub definition: DefinitionId,
    pub label: String,
    pub slot_count: usize,
    pub used_slots: usize,
    pub volume_used: u32,
    pub volume_limit: Option<u32>,
    pub weight: u32,
    pub owner_item: Option<ItemUid>,
    pub parent_container: Option<ContainerUid>,
    pub slots: Vec<SlotDebugEntry>,
}

impl ContainerDebugInfo {
    /// Fraction of the volume limit in use; `None` when unlimited.
    pub fn usage_fraction(&self) -> Option<f32> {
        self.volume_limit
            .filter(|limit| *limit > 0)
            .map(|limit| self.volume_used as f32 / limit as f32)
    }
}

impl fmt::Display for ContainerDebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{} slots, weight {}, volume {}",
            self.label, self.uid, self.used_slots, self.slot_count, self.weight, self.volume_used
        )?;
        match self.volume_limit {
            Some(limit) => writeln!(f, "/{limit}")?,
            None => writeln!(f)?,
        }
        for entry in &self.slots {
            match (&entry.item, &entry.label) {
                (Some(item), Some(label)) => {
                    writeln!(f, "  {} {} x{} ({item})", entry.slot, label, entry.quantity)?
                }
                (Some(item), None) => writeln!(f, "  {} <missing {item}>", entry.slot)?,
                (None, _) => writeln!(f, "  {} -", entry.slot)?,
            }
        }
        Ok(())
    }
}

impl InventoryService {
    pub fn container_debug_info(&self, uid: ContainerUid) -> Option<ContainerDebugInfo> {
        let container = self.state.container(uid)?;
        let volume_limit = self
            .definitions
            .container_definition(&container.definition)
            .and_then(|def| def.volume_limit);

        let slots = container
            .slots
            .iter()
            .map(|cell| {
                let record = cell.item.and_then(|item| self.state.item(item));
                SlotDebugEntry {
                    slot: cell.id,
                    item: cell.item,
                    label: record.map(|item| item.label().to_owned()),
                    definition: record.map(|item| item.definition.clone()),
                    quantity: record.map_or(0, |item| item.quantity),
                }
            })
            .collect();

        Some(ContainerDebugInfo {
            uid,
            definition: container.definition.clone(),
            label: container.label().to_owned(),
            slot_count: container.slot_count(),
            used_slots: container.occupied_count(),
            volume_used: self.get_container_used_volume(uid),
            volume_limit,
            weight: self.get_container_used_weight(uid),
            owner_item: container.owner_item,
            parent_container: container.parent_container,
            slots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use crate::state::SlotId;

    #[test]
    fn debug_info_lists_every_slot() {
        let mut service = service();
        let pouch = service.create_container(&def("Pouch")).unwrap();
        service.set_container_debug_name(pouch, "belt pouch").unwrap();
        let potion = service.create_item(&def("Potion"), 4).unwrap();
        service.add_item_to_container(potion, pouch, SlotId(1)).unwrap();

        let info = service.container_debug_info(pouch).unwrap();
        assert_eq!(info.label, "belt pouch");
        assert_eq!(info.slot_count, 2);
        assert_eq!(info.used_slots, 1);
        assert_eq!(info.volume_used, 4);
        assert_eq!(info.volume_limit, Some(10));
        assert_eq!(info.usage_fraction(), Some(0.4));
        assert_eq!(info.slots[0].item, None);
        assert_eq!(info.slots[1].item, Some(potion));
        assert_eq!(info.slots[1].quantity, 4);

        let rendered = info.to_string();
        assert!(rendered.starts_with("belt pouch"));
        assert!(rendered.contains("#1 Potion x4"));
    }

    #[test]
    fn unknown_container_has_no_debug_info() {
        let service = service();
        assert!(service.container_debug_info(crate::ContainerUid::generate()).is_none());
    }
}
