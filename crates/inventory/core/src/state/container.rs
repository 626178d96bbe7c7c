use super::{ContainerUid, DefinitionId, ItemUid, SlotId};

/// One addressable position in a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    pub id: SlotId,
    pub item: Option<ItemUid>,
}

impl Slot {
    pub const fn empty(id: SlotId) -> Self {
        Self { id, item: None }
    }

    pub const fn is_empty(&self) -> bool {
        self.item.is_none()
    }
}

/// Cached aggregate of a container's contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerTotals {
    pub volume: u32,
    pub weight: u32,
    pub dirty: bool,
}

impl Default for ContainerTotals {
    fn default() -> Self {
        Self {
            volume: 0,
            weight: 0,
            dirty: true,
        }
    }
}

/// A live container record in the instance store.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerInstance {
    pub uid: ContainerUid,
    pub definition: DefinitionId,
    pub slots: Vec<Slot>,
    /// Item whose definition declared this container, if any.
    pub owner_item: Option<ItemUid>,
    /// Container currently holding `owner_item`; `None` while the owner is an
    /// orphan or for free-standing containers.
    pub parent_container: Option<ContainerUid>,
    pub totals: ContainerTotals,
    pub debug_name: Option<String>,
}

impl ContainerInstance {
    pub fn new(uid: ContainerUid, definition: DefinitionId, slot_count: u16) -> Self {
        Self {
            uid,
            definition,
            slots: (0..slot_count).map(|i| Slot::empty(SlotId(i))).collect(),
            owner_item: None,
            parent_container: None,
            totals: ContainerTotals::default(),
            debug_name: None,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot.index())
    }

    pub fn slot_mut(&mut self, slot: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(slot.index())
    }

    /// Occupant of `slot`, or `None` when empty or out of range.
    pub fn occupant(&self, slot: SlotId) -> Option<ItemUid> {
        self.slot(slot).and_then(|s| s.item)
    }

    /// Lowest-index empty slot.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.slots.iter().find(|s| s.is_empty()).map(|s| s.id)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (SlotId, ItemUid)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.item.map(|item| (s.id, item)))
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    pub fn label(&self) -> &str {
        self.debug_name
            .as_deref()
            .unwrap_or_else(|| self.definition.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_container_has_empty_slots_in_order() {
        let container = ContainerInstance::new(ContainerUid::generate(), "Backpack".into(), 8);
        assert_eq!(container.slot_count(), 8);
        assert_eq!(container.first_empty_slot(), Some(SlotId(0)));
        assert_eq!(container.occupied_count(), 0);
        assert!(container.totals.dirty);
        assert!(container.slot(SlotId(8)).is_none());
    }
}
