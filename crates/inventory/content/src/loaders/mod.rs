//! Content loaders for reading inventory data from files.
//!
//! Each loader turns one RON/TOML file into core types; [`ContentFactory`]
//! ties them together into a [`inventory_core::DefinitionsSnapshot`].

pub mod config;
pub mod container;
pub mod factory;
pub mod item;
pub mod scenario;

pub use config::ConfigLoader;
pub use container::{ContainerCatalog, ContainerLoader};
pub use factory::ContentFactory;
pub use item::{ItemCatalog, ItemLoader};
pub use scenario::ScenarioLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
