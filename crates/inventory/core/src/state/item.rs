use super::{ContainerUid, DefinitionId, ItemUid, SlotId};

/// Where a placed item lives: a container and one of its slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemLocation {
    pub container: ContainerUid,
    pub slot: SlotId,
}

impl ItemLocation {
    pub const fn new(container: ContainerUid, slot: SlotId) -> Self {
        Self { container, slot }
    }
}

/// A live item record in the instance store.
///
/// `location == None` means the item is an orphan (not placed anywhere).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInstance {
    pub uid: ItemUid,
    pub definition: DefinitionId,
    pub quantity: u32,
    pub location: Option<ItemLocation>,
    pub owned_container: Option<ContainerUid>,
    pub debug_name: Option<String>,
}

impl ItemInstance {
    pub fn new(uid: ItemUid, definition: DefinitionId, quantity: u32) -> Self {
        Self {
            uid,
            definition,
            quantity,
            location: None,
            owned_container: None,
            debug_name: None,
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.location.is_none()
    }

    pub fn container(&self) -> Option<ContainerUid> {
        self.location.map(|loc| loc.container)
    }

    pub fn slot(&self) -> Option<SlotId> {
        self.location.map(|loc| loc.slot)
    }

    /// Label used in logs and debug dumps: the debug name when set, otherwise
    /// the definition id.
    pub fn label(&self) -> &str {
        self.debug_name
            .as_deref()
            .unwrap_or_else(|| self.definition.as_str())
    }
}
