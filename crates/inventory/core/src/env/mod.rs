//! Read-only definition data consumed by the engine.
//!
//! The [`DefinitionOracle`] trait is the Definition Lookup boundary: the engine
//! only ever asks "what is definition X", and absence is reported as `None`.
mod definitions;
mod snapshot;

pub use definitions::{ContainerDefinition, ItemDefinition, TagSet};
pub use snapshot::DefinitionsSnapshot;

use crate::state::DefinitionId;

/// Pure, synchronous lookup of immutable item and container templates.
///
/// Implementations must be side-effect free and idempotent.
pub trait DefinitionOracle: Send + Sync {
    fn item_definition(&self, id: &DefinitionId) -> Option<ItemDefinition>;

    fn container_definition(&self, id: &DefinitionId) -> Option<ContainerDefinition>;
}

impl<T: DefinitionOracle + ?Sized> DefinitionOracle for std::sync::Arc<T> {
    fn item_definition(&self, id: &DefinitionId) -> Option<ItemDefinition> {
        (**self).item_definition(id)
    }

    fn container_definition(&self, id: &DefinitionId) -> Option<ContainerDefinition> {
        (**self).container_definition(id)
    }
}
