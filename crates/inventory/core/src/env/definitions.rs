use std::collections::BTreeSet;

use crate::config::InventoryConfig;
use crate::state::DefinitionId;

/// Set of hierarchical gameplay tags (`"Item.Consumable.Potion"`).
///
/// A tag matches a query tag when it is equal to it or is a dotted child of
/// it, so an item tagged `Item.Consumable` satisfies a container allowing
/// `Item`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True if `tag` itself, or any of its dotted parents, is in the set.
    pub fn matches(&self, tag: &str) -> bool {
        self.0.iter().any(|query| tag_matches(tag, query))
    }

    /// True if any tag of `self` matches any tag of `query`.
    pub fn intersects(&self, query: &TagSet) -> bool {
        self.0.iter().any(|tag| query.matches(tag))
    }
}

fn tag_matches(tag: &str, query: &str) -> bool {
    match tag.strip_prefix(query) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable item template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ItemDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub description: String,
    /// Per-unit weight.
    pub weight: u32,
    /// Per-unit volume.
    pub volume: u32,
    pub stackable: bool,
    pub max_stack_size: u32,
    pub tags: TagSet,
    /// Container definition instantiated alongside each instance, if any.
    pub container: Option<DefinitionId>,
    pub visual_class: Option<String>,
}

impl ItemDefinition {
    pub fn new(id: impl Into<DefinitionId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// Largest quantity a single instance may hold.
    ///
    /// Items that own a container never stack: two bags merged into one
    /// instance would have to merge their contents too.
    pub fn effective_max_stack(&self) -> u32 {
        if self.stackable && !self.has_container() {
            self.max_stack_size.max(1)
        } else {
            1
        }
    }

    pub fn is_stackable(&self) -> bool {
        self.effective_max_stack() > 1
    }

    /// Clamps a requested quantity into `1..=effective_max_stack()`.
    pub fn clamp_quantity(&self, quantity: u32) -> u32 {
        quantity.clamp(1, self.effective_max_stack())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unit(mut self, weight: u32, volume: u32) -> Self {
        self.weight = weight;
        self.volume = volume;
        self
    }

    pub fn with_stack(mut self, stackable: bool, max_stack_size: u32) -> Self {
        self.stackable = stackable;
        self.max_stack_size = max_stack_size;
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_container(mut self, container: impl Into<DefinitionId>) -> Self {
        self.container = Some(container.into());
        self
    }
}

impl Default for ItemDefinition {
    fn default() -> Self {
        Self {
            id: DefinitionId::default(),
            name: String::new(),
            description: String::new(),
            weight: InventoryConfig::DEFAULT_UNIT_WEIGHT,
            volume: InventoryConfig::DEFAULT_UNIT_VOLUME,
            stackable: true,
            max_stack_size: InventoryConfig::DEFAULT_MAX_STACK,
            tags: TagSet::new(),
            container: None,
            visual_class: None,
        }
    }
}

/// Immutable container template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainerDefinition {
    pub id: DefinitionId,
    pub name: String,
    pub description: String,
    pub slot_count: u16,
    /// Maximum summed volume of the contents; `None` disables the check.
    pub volume_limit: Option<u32>,
    pub allowed_tags: TagSet,
    pub allow_nested_containers: bool,
    pub widget_class: Option<String>,
}

impl ContainerDefinition {
    pub fn new(id: impl Into<DefinitionId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Slot count clamped into the supported range.
    pub fn effective_slot_count(&self) -> u16 {
        InventoryConfig::clamp_slot_count(self.slot_count)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_slots(mut self, slot_count: u16) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn with_volume_limit(mut self, limit: u32) -> Self {
        self.volume_limit = Some(limit);
        self
    }

    pub fn with_allowed_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.allowed_tags = tags.into_iter().collect();
        self
    }

    pub fn with_nesting(mut self, allow: bool) -> Self {
        self.allow_nested_containers = allow;
        self
    }
}

impl Default for ContainerDefinition {
    fn default() -> Self {
        Self {
            id: DefinitionId::default(),
            name: String::new(),
            description: String::new(),
            slot_count: InventoryConfig::DEFAULT_SLOT_COUNT,
            volume_limit: None,
            allowed_tags: TagSet::new(),
            allow_nested_containers: false,
            widget_class: None,
        }
    }
}
