use std::collections::BTreeMap;

use super::{ContainerDefinition, DefinitionOracle, ItemDefinition};
use crate::state::DefinitionId;

/// In-memory definition tables.
///
/// Content loaders build one of these from catalog files; tests build them
/// inline with the `with_*` helpers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinitionsSnapshot {
    items: BTreeMap<DefinitionId, ItemDefinition>,
    containers: BTreeMap<DefinitionId, ContainerDefinition>,
}

impl DefinitionsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        items: impl IntoIterator<Item = ItemDefinition>,
        containers: impl IntoIterator<Item = ContainerDefinition>,
    ) -> Self {
        let mut snapshot = Self::new();
        for item in items {
            snapshot.insert_item(item);
        }
        for container in containers {
            snapshot.insert_container(container);
        }
        snapshot
    }

    /// Inserts an item definition, returning the one it replaced.
    pub fn insert_item(&mut self, definition: ItemDefinition) -> Option<ItemDefinition> {
        self.items.insert(definition.id.clone(), definition)
    }

    pub fn insert_container(
        &mut self,
        definition: ContainerDefinition,
    ) -> Option<ContainerDefinition> {
        self.containers.insert(definition.id.clone(), definition)
    }

    pub fn with_item(mut self, definition: ItemDefinition) -> Self {
        self.insert_item(definition);
        self
    }

    pub fn with_container(mut self, definition: ContainerDefinition) -> Self {
        self.insert_container(definition);
        self
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    pub fn containers(&self) -> impl Iterator<Item = &ContainerDefinition> {
        self.containers.values()
    }

    /// Item definitions whose `container` points at a definition that is not
    /// in this snapshot.
    pub fn dangling_container_refs(&self) -> Vec<(&DefinitionId, &DefinitionId)> {
        self.items
            .values()
            .filter_map(|item| item.container.as_ref().map(|c| (&item.id, c)))
            .filter(|(_, container)| !self.containers.contains_key(*container))
            .collect()
    }
}

impl DefinitionOracle for DefinitionsSnapshot {
    fn item_definition(&self, id: &DefinitionId) -> Option<ItemDefinition> {
        self.items.get(id).cloned()
    }

    fn container_definition(&self, id: &DefinitionId) -> Option<ContainerDefinition> {
        self.containers.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reports_absence() {
        let snapshot = DefinitionsSnapshot::new()
            .with_item(ItemDefinition::new("Bag").with_container("BagStorage"))
            .with_container(ContainerDefinition::new("Backpack"));

        assert!(snapshot.item_definition(&"Bag".into()).is_some());
        assert!(snapshot.item_definition(&"Missing".into()).is_none());
        assert!(snapshot.container_definition(&"Backpack".into()).is_some());
        assert_eq!(snapshot.dangling_container_refs().len(), 1);
    }
}
