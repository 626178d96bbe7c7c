//! Volume and weight accounting with dirty-flag caching.

use std::collections::HashSet;

use tracing::{error, trace};

use super::InventoryService;
use crate::state::{ChangeKind, ContainerUid, ItemInstance, ItemUid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Totals {
    volume: u32,
    weight: u32,
}

impl InventoryService {
    /// Summed total volume of everything in the container's slots.
    /// Unknown containers weigh and measure zero.
    pub fn get_container_used_volume(&self, container: ContainerUid) -> u32 {
        self.container_totals(container, &mut HashSet::new()).volume
    }

    /// Summed total weight of the container's contents, nested contents
    /// included.
    pub fn get_container_used_weight(&self, container: ContainerUid) -> u32 {
        self.container_totals(container, &mut HashSet::new()).weight
    }

    /// `unit * quantity`, or for container items
    /// `max(unit * quantity, unit + contents)`.
    pub fn get_item_total_volume(&self, item: ItemUid) -> u32 {
        self.state
            .item(item)
            .map_or(0, |record| self.item_totals(record, &mut HashSet::new()).volume)
    }

    /// `unit * quantity` plus the weight of the owned container's contents.
    pub fn get_item_total_weight(&self, item: ItemUid) -> u32 {
        self.state
            .item(item)
            .map_or(0, |record| self.item_totals(record, &mut HashSet::new()).weight)
    }

    fn container_totals(&self, uid: ContainerUid, visiting: &mut HashSet<ContainerUid>) -> Totals {
        let Some(container) = self.state.container(uid) else {
            return Totals::default();
        };
        if self.config.cache_totals && !container.totals.dirty {
            return Totals {
                volume: container.totals.volume,
                weight: container.totals.weight,
            };
        }
        if !visiting.insert(uid) {
            error!(container = %uid, "containment cycle found while summing totals");
            return Totals::default();
        }

        let mut totals = Totals::default();
        for (slot, item) in container.occupied() {
            match self.state.item(item) {
                Some(record) => {
                    let item_totals = self.item_totals(record, visiting);
                    totals.volume = totals.volume.saturating_add(item_totals.volume);
                    totals.weight = totals.weight.saturating_add(item_totals.weight);
                }
                None => error!(container = %uid, %slot, %item, "slot references a missing item"),
            }
        }

        visiting.remove(&uid);
        totals
    }

    fn item_totals(&self, item: &ItemInstance, visiting: &mut HashSet<ContainerUid>) -> Totals {
        let Some(definition) = self.definitions.item_definition(&item.definition) else {
            error!(item = %item.uid, definition = %item.definition, "live item has no definition");
            return Totals::default();
        };
        let volume = definition.volume.saturating_mul(item.quantity);
        let weight = definition.weight.saturating_mul(item.quantity);

        match item.owned_container {
            Some(owned) => {
                let contents = self.container_totals(owned, visiting);
                Totals {
                    volume: volume.max(definition.volume.saturating_add(contents.volume)),
                    weight: weight.saturating_add(contents.weight),
                }
            }
            None => Totals { volume, weight },
        }
    }

    /// Flags the container and every ancestor reachable through parent links.
    pub(super) fn mark_dirty(&mut self, container: ContainerUid) {
        let mut visited = HashSet::new();
        let mut current = Some(container);
        while let Some(uid) = current {
            if !visited.insert(uid) {
                error!(container = %uid, "parent links form a cycle");
                break;
            }
            let Some(record) = self.state.container_mut(uid) else {
                break;
            };
            record.totals.dirty = true;
            current = record.parent_container;
        }
    }

    /// Recomputes every dirty container's cached totals.
    pub(super) fn refresh_totals(&mut self) {
        if !self.config.cache_totals {
            return;
        }
        let dirty: Vec<ContainerUid> = self
            .state
            .containers()
            .filter(|container| container.totals.dirty)
            .map(|container| container.uid)
            .collect();

        let fresh: Vec<(ContainerUid, Totals)> = dirty
            .into_iter()
            .map(|uid| (uid, self.container_totals(uid, &mut HashSet::new())))
            .collect();

        for (uid, totals) in fresh {
            if let Some(container) = self.state.container_mut(uid) {
                let changed = container.totals.volume != totals.volume
                    || container.totals.weight != totals.weight;
                container.totals.volume = totals.volume;
                container.totals.weight = totals.weight;
                container.totals.dirty = false;
                if changed {
                    self.changes.container(uid, ChangeKind::TOTALS);
                }
                trace!(container = %uid, volume = totals.volume, weight = totals.weight, "totals refreshed");
            }
        }
    }
}
