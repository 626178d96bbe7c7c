//! Container catalog loader.

use std::path::Path;

use inventory_core::{ContainerDefinition, InventoryConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

/// Container catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerCatalog {
    pub containers: Vec<ContainerDefinition>,
}

/// Loader for container catalog from RON files.
pub struct ContainerLoader;

impl ContainerLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ContainerDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a catalog. Slot counts outside the supported range are kept as
    /// authored and clamped when instances are created.
    pub fn parse(content: &str) -> LoadResult<Vec<ContainerDefinition>> {
        let catalog: ContainerCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse container catalog RON: {}", e))?;

        let mut seen = std::collections::HashSet::new();
        for container in &catalog.containers {
            if !seen.insert(container.id.clone()) {
                anyhow::bail!("Container '{}' is defined more than once", container.id);
            }
            if container.effective_slot_count() != container.slot_count {
                warn!(
                    container = %container.id,
                    authored = container.slot_count,
                    min = InventoryConfig::MIN_SLOT_COUNT,
                    max = InventoryConfig::MAX_SLOT_COUNT,
                    "slot count out of range, will be clamped"
                );
            }
        }

        Ok(catalog.containers)
    }
}
