//! Data-driven inventory content and loaders.
//!
//! This crate implements the definition lookup side of the inventory:
//! - Item catalogs (data-driven via RON)
//! - Container catalogs (data-driven via RON)
//! - Engine configuration (data-driven via TOML)
//! - Scripted scenarios (data-driven via RON)
//!
//! Content is consumed through [`inventory_core::DefinitionOracle`] and never
//! appears in instance state.

pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use scenario::{Scenario, ScenarioStep};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContainerCatalog, ContainerLoader, ContentFactory, ItemCatalog, ItemLoader,
    ScenarioLoader,
};
