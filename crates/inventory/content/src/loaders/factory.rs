//! Content factory for building the definition oracle from data files.

use std::path::{Path, PathBuf};

use inventory_core::{ContainerDefinition, DefinitionsSnapshot, InventoryConfig, ItemDefinition};
use tracing::{info, warn};

use crate::loaders::{ConfigLoader, ContainerLoader, ItemLoader, LoadResult, ScenarioLoader};
use crate::scenario::Scenario;

/// Content factory that loads all inventory content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── items.ron
/// ├── containers.ron
/// └── scenarios/
///     └── demo.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`, falling back to the
    /// defaults when the file does not exist.
    pub fn load_config(&self) -> LoadResult<InventoryConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            warn!(path = %path.display(), "no config file, using defaults");
            return Ok(InventoryConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load item catalog from `items.ron`.
    pub fn load_items(&self) -> LoadResult<Vec<ItemDefinition>> {
        let path = self.data_dir.join("items.ron");
        ItemLoader::load(&path)
    }

    /// Load container catalog from `containers.ron`.
    pub fn load_containers(&self) -> LoadResult<Vec<ContainerDefinition>> {
        let path = self.data_dir.join("containers.ron");
        ContainerLoader::load(&path)
    }

    /// Load both catalogs into one snapshot.
    ///
    /// Fails when an item declares a container definition that is not in the
    /// container catalog, so broken content is caught at load time instead of
    /// at the first `create_item`.
    pub fn load_definitions(&self) -> LoadResult<DefinitionsSnapshot> {
        let snapshot = DefinitionsSnapshot::from_parts(self.load_items()?, self.load_containers()?);

        let dangling = snapshot.dangling_container_refs();
        if !dangling.is_empty() {
            let listed: Vec<String> = dangling
                .iter()
                .map(|(item, container)| format!("{item} -> {container}"))
                .collect();
            anyhow::bail!("Items reference unknown containers: {}", listed.join(", "));
        }

        info!(
            items = snapshot.item_count(),
            containers = snapshot.container_count(),
            data_dir = %self.data_dir.display(),
            "definitions loaded"
        );
        Ok(snapshot)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use inventory_core::DefinitionOracle;

    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_content_loads() {
        let factory = ContentFactory::bundled();
        let definitions = factory.load_definitions().unwrap();
        assert!(definitions.item_definition(&"Potion".into()).is_some());
        assert!(definitions.container_definition(&"Backpack".into()).is_some());
        factory.load_config().unwrap();
        let scenario = factory.load_scenario("demo").unwrap();
        assert!(!scenario.steps.is_empty());
    }

    #[test]
    fn dangling_container_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("items.ron"),
            r#"(items: [(id: "Bag", stackable: false, container: Some("Nowhere"))])"#,
        )
        .unwrap();
        fs::write(dir.path().join("containers.ron"), "(containers: [])").unwrap();

        let err = ContentFactory::new(dir.path()).load_definitions().unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContentFactory::new(dir.path()).load_config().unwrap();
        assert_eq!(config, InventoryConfig::default());
    }
}
