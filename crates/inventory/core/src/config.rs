/// How a container definition with an empty allowed-tag set is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EmptyTagPolicy {
    /// An empty allowed-tag set accepts nothing (every item is a `TypeMismatch`).
    #[default]
    RejectAll,
    /// An empty allowed-tag set accepts every item.
    AcceptAll,
}

/// Which side wins when the integrity repair finds a disagreement between an
/// item's recorded location and the container slot table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepairPolicy {
    /// Slot occupancy is ground truth. Items are rewritten to match the slot
    /// that references them; nothing else is touched.
    #[default]
    SlotAuthoritative,
    /// Slot occupancy still wins for referenced items, but the reverse
    /// mismatches are also fixed: an item pointing at an empty slot claims it,
    /// and dangling item locations or slot occupants are cleared.
    Bidirectional,
}

/// Inventory configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InventoryConfig {
    pub empty_tag_policy: EmptyTagPolicy,
    pub repair_policy: RepairPolicy,
    /// Keep per-container volume/weight totals cached behind a dirty flag.
    /// When disabled, totals are recomputed on every query.
    pub cache_totals: bool,
}

impl InventoryConfig {
    // ===== compile-time limits =====
    pub const MIN_SLOT_COUNT: u16 = 1;
    pub const MAX_SLOT_COUNT: u16 = 100;

    // ===== definition defaults =====
    pub const DEFAULT_SLOT_COUNT: u16 = 20;
    pub const DEFAULT_MAX_STACK: u32 = 99;
    pub const DEFAULT_UNIT_WEIGHT: u32 = 1;
    pub const DEFAULT_UNIT_VOLUME: u32 = 1;

    pub fn new() -> Self {
        Self {
            empty_tag_policy: EmptyTagPolicy::default(),
            repair_policy: RepairPolicy::default(),
            cache_totals: true,
        }
    }

    pub fn with_empty_tag_policy(mut self, policy: EmptyTagPolicy) -> Self {
        self.empty_tag_policy = policy;
        self
    }

    pub fn with_repair_policy(mut self, policy: RepairPolicy) -> Self {
        self.repair_policy = policy;
        self
    }

    pub fn with_cache_totals(mut self, enabled: bool) -> Self {
        self.cache_totals = enabled;
        self
    }

    /// Clamps an authored slot count into the supported range.
    pub fn clamp_slot_count(count: u16) -> u16 {
        count.clamp(Self::MIN_SLOT_COUNT, Self::MAX_SLOT_COUNT)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self::new()
    }
}
