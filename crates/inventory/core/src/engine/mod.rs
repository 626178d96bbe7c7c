//! Placement and movement pipeline.
//!
//! The [`InventoryService`] is the single writer of [`InventoryState`]. Every
//! public operation validates its preconditions against the definition oracle,
//! mutates the store through stable ids, records what it touched for the next
//! [`InventoryDelta`], and refreshes cached container totals before returning.
//! Callers only ever receive borrowed views or copies; there is no way to
//! mutate a record outside this module.

mod inspect;
mod integrity;
mod lifecycle;
mod metrics;
mod movement;
mod placement;
mod result;

pub use inspect::{ContainerDebugInfo, SlotDebugEntry};
pub use integrity::{IntegrityIssue, IntegrityReport};
pub use result::{AddItemResult, InventoryError, MoveResult, MoveStatus};

use std::sync::Arc;

use crate::config::InventoryConfig;
use crate::env::{ContainerDefinition, DefinitionOracle, ItemDefinition};
use crate::state::{
    ChangeTracker, ContainerInstance, ContainerUid, DefinitionId, InventoryDelta,
    InventorySnapshot, InventoryState, ItemInstance, ItemUid,
};

/// Owns the instance store and applies the containment rules to it.
///
/// Single-threaded by construction: every method runs to completion on the
/// caller's thread. Embedders with several producers serialize access at their
/// boundary (see the runtime worker).
pub struct InventoryService {
    state: InventoryState,
    definitions: Arc<dyn DefinitionOracle>,
    config: InventoryConfig,
    changes: ChangeTracker,
}

impl InventoryService {
    pub fn new(definitions: Arc<dyn DefinitionOracle>, config: InventoryConfig) -> Self {
        tracing::info!(
            empty_tag_policy = ?config.empty_tag_policy,
            repair_policy = ?config.repair_policy,
            cache_totals = config.cache_totals,
            "inventory service initialized"
        );
        Self {
            state: InventoryState::new(),
            definitions,
            config,
            changes: ChangeTracker::default(),
        }
    }

    /// Convenience constructor with the default configuration.
    pub fn with_definitions(definitions: impl DefinitionOracle + 'static) -> Self {
        Self::new(Arc::new(definitions), InventoryConfig::default())
    }

    pub fn state(&self) -> &InventoryState {
        &self.state
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn definitions(&self) -> &dyn DefinitionOracle {
        self.definitions.as_ref()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn find_item(&self, uid: ItemUid) -> Option<&ItemInstance> {
        self.state.item(uid)
    }

    pub fn find_container(&self, uid: ContainerUid) -> Option<&ContainerInstance> {
        self.state.container(uid)
    }

    /// Items occupying the container's slots, in slot order.
    pub fn get_items_in_container(&self, uid: ContainerUid) -> Vec<&ItemInstance> {
        let Some(container) = self.state.container(uid) else {
            return Vec::new();
        };
        container
            .occupied()
            .filter_map(|(slot, item)| {
                let found = self.state.item(item);
                if found.is_none() {
                    tracing::error!(container = %uid, %slot, %item, "slot references a missing item");
                }
                found
            })
            .collect()
    }

    /// Items not placed in any container, ordered by id.
    pub fn get_orphan_items(&self) -> Vec<&ItemInstance> {
        let mut orphans: Vec<_> = self.state.items().filter(|i| i.is_orphan()).collect();
        orphans.sort_by_key(|item| item.uid);
        orphans
    }

    /// Every live container, ordered by id.
    pub fn get_all_containers(&self) -> Vec<&ContainerInstance> {
        let mut containers: Vec<_> = self.state.containers().collect();
        containers.sort_by_key(|container| container.uid);
        containers
    }

    /// Summed quantity of every live instance of `definition`.
    pub fn count_items_by_type(&self, definition: &DefinitionId) -> u32 {
        self.state
            .items()
            .filter(|item| &item.definition == definition)
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    pub fn item_definition(&self, id: &DefinitionId) -> Option<ItemDefinition> {
        self.definitions.item_definition(id)
    }

    pub fn container_definition(&self, id: &DefinitionId) -> Option<ContainerDefinition> {
        self.definitions.container_definition(id)
    }

    // ========================================================================
    // Network projection support
    // ========================================================================

    /// Full copy of the store, for client refreshes.
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot::from_state(&self.state)
    }

    /// Drains everything touched since the previous call.
    pub fn take_delta(&mut self) -> InventoryDelta {
        self.changes.take(&self.state)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    // ========================================================================
    // Internal lookups
    // ========================================================================

    fn require_item(&self, uid: ItemUid) -> Result<&ItemInstance, InventoryError> {
        self.state
            .item(uid)
            .ok_or_else(|| InventoryError::unknown_item(uid))
    }

    fn require_container(&self, uid: ContainerUid) -> Result<&ContainerInstance, InventoryError> {
        self.state
            .container(uid)
            .ok_or_else(|| InventoryError::unknown_container(uid))
    }

    fn require_item_definition(&self, id: &DefinitionId) -> Result<ItemDefinition, InventoryError> {
        self.definitions
            .item_definition(id)
            .ok_or_else(|| InventoryError::InvalidDefinition(id.clone()))
    }

    fn require_container_definition(
        &self,
        id: &DefinitionId,
    ) -> Result<ContainerDefinition, InventoryError> {
        self.definitions
            .container_definition(id)
            .ok_or_else(|| InventoryError::InvalidDefinition(id.clone()))
    }

    /// Throwaway copy used for dry runs. Shares the oracle, not the tracker.
    fn scratch_copy(&self) -> Self {
        Self {
            state: self.state.clone(),
            definitions: Arc::clone(&self.definitions),
            config: self.config.clone(),
            changes: ChangeTracker::default(),
        }
    }
}
