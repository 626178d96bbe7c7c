//! Outcome types shared by every placement and movement operation.

use crate::error::{CoreError, ErrorSeverity};
use crate::state::{ContainerUid, DefinitionId, ItemUid, SlotId};

/// Single discriminant callers branch on after any move-like request.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveStatus {
    Success,
    PartialSuccess,
    SwapPerformed,
    InvalidDefinition,
    TypeMismatch,
    ContainerRejected,
    CycleDetected,
    VolumeExceeded,
    ContainerFull,
    StackLimitReached,
    InvalidTarget,
    Failed,
}

impl MoveStatus {
    /// True for every non-error outcome, including partial stacks and swaps.
    pub const fn is_success(self) -> bool {
        matches!(
            self,
            Self::Success | Self::PartialSuccess | Self::SwapPerformed
        )
    }

    /// Stable wire name, e.g. `"ContainerFull"`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Error code for failure statuses; `None` for successes.
    pub const fn error_code(self) -> Option<&'static str> {
        match self {
            Self::Success | Self::PartialSuccess | Self::SwapPerformed => None,
            Self::InvalidDefinition => Some("INVENTORY_INVALID_DEFINITION"),
            Self::TypeMismatch => Some("INVENTORY_TYPE_MISMATCH"),
            Self::ContainerRejected => Some("INVENTORY_CONTAINER_REJECTED"),
            Self::CycleDetected => Some("INVENTORY_CYCLE_DETECTED"),
            Self::VolumeExceeded => Some("INVENTORY_VOLUME_EXCEEDED"),
            Self::ContainerFull => Some("INVENTORY_CONTAINER_FULL"),
            Self::StackLimitReached => Some("INVENTORY_STACK_LIMIT_REACHED"),
            Self::InvalidTarget => Some("INVENTORY_INVALID_TARGET"),
            Self::Failed => Some("INVENTORY_FAILED"),
        }
    }
}

/// Internal failure of an engine operation.
///
/// Every variant corresponds to exactly one failure [`MoveStatus`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryError {
    #[error("definition '{0}' not found")]
    InvalidDefinition(DefinitionId),

    #[error("item '{item}' is not allowed in container '{container}'")]
    TypeMismatch {
        item: DefinitionId,
        container: DefinitionId,
    },

    #[error("container rejected the item: {0}")]
    ContainerRejected(String),

    #[error("placing container {item_container} into {target} would make it its own ancestor")]
    CycleDetected {
        item_container: ContainerUid,
        target: ContainerUid,
    },

    #[error("volume {required} exceeds the {available} still available")]
    VolumeExceeded { required: u32, available: u32 },

    #[error("container {0} has no free slot or merge target")]
    ContainerFull(ContainerUid),

    #[error("stack of item {0} is already at its limit")]
    StackLimitReached(ItemUid),

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

impl InventoryError {
    pub fn status(&self) -> MoveStatus {
        match self {
            Self::InvalidDefinition(_) => MoveStatus::InvalidDefinition,
            Self::TypeMismatch { .. } => MoveStatus::TypeMismatch,
            Self::ContainerRejected(_) => MoveStatus::ContainerRejected,
            Self::CycleDetected { .. } => MoveStatus::CycleDetected,
            Self::VolumeExceeded { .. } => MoveStatus::VolumeExceeded,
            Self::ContainerFull(_) => MoveStatus::ContainerFull,
            Self::StackLimitReached(_) => MoveStatus::StackLimitReached,
            Self::InvalidTarget(_) => MoveStatus::InvalidTarget,
            Self::Failed(_) => MoveStatus::Failed,
        }
    }

    pub(crate) fn unknown_item(uid: ItemUid) -> Self {
        Self::InvalidTarget(format!("item {uid} does not exist"))
    }

    pub(crate) fn unknown_container(uid: ContainerUid) -> Self {
        Self::InvalidTarget(format!("container {uid} does not exist"))
    }

    pub(crate) fn unknown_slot(container: ContainerUid, slot: SlotId) -> Self {
        Self::InvalidTarget(format!("slot {slot} is out of range for container {container}"))
    }
}

impl CoreError for InventoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ContainerFull(_) | Self::StackLimitReached(_) | Self::VolumeExceeded { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::InvalidDefinition(_)
            | Self::TypeMismatch { .. }
            | Self::ContainerRejected(_)
            | Self::CycleDetected { .. }
            | Self::InvalidTarget(_) => ErrorSeverity::Validation,
            Self::Failed(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        self.status().error_code().unwrap_or("INVENTORY_FAILED")
    }
}

/// Result of a move, stack, swap, or split.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveResult {
    pub status: MoveStatus,
    pub moved_quantity: u32,
    pub remaining_quantity: u32,
    /// Human-readable detail for failures; empty on success.
    pub message: String,
    /// Id of the instance created for the moved portion of a partial move.
    pub new_item: Option<ItemUid>,
    /// The item that traded places with the source on a swap.
    pub swapped_with: Option<ItemUid>,
    /// Container the moved units ended up in.
    pub target_container: Option<ContainerUid>,
    /// True when the units were placed inside a container-item occupying the
    /// requested slot instead of the slot itself.
    pub moved_into_item: bool,
}

impl MoveResult {
    fn with_status(status: MoveStatus) -> Self {
        Self {
            status,
            moved_quantity: 0,
            remaining_quantity: 0,
            message: String::new(),
            new_item: None,
            swapped_with: None,
            target_container: None,
            moved_into_item: false,
        }
    }

    pub fn success(moved: u32, target: ContainerUid) -> Self {
        Self {
            moved_quantity: moved,
            target_container: Some(target),
            ..Self::with_status(MoveStatus::Success)
        }
    }

    /// `Success` when everything requested moved, otherwise `PartialSuccess`.
    pub fn transferred(moved: u32, requested: u32, target: Option<ContainerUid>) -> Self {
        let status = if moved >= requested {
            MoveStatus::Success
        } else {
            MoveStatus::PartialSuccess
        };
        Self {
            moved_quantity: moved,
            remaining_quantity: requested.saturating_sub(moved),
            target_container: target,
            ..Self::with_status(status)
        }
    }

    pub fn swapped(moved: u32, other: ItemUid, target: ContainerUid) -> Self {
        Self {
            moved_quantity: moved,
            swapped_with: Some(other),
            target_container: Some(target),
            ..Self::with_status(MoveStatus::SwapPerformed)
        }
    }

    pub fn failure(error: &InventoryError) -> Self {
        Self {
            message: error.to_string(),
            ..Self::with_status(error.status())
        }
    }

    pub fn with_new_item(mut self, uid: Option<ItemUid>) -> Self {
        self.new_item = uid;
        self
    }

    pub fn nested(mut self) -> Self {
        self.moved_into_item = true;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// True when the request was satisfied in full.
    pub fn is_complete(&self) -> bool {
        self.is_success() && self.remaining_quantity == 0
    }
}

impl From<InventoryError> for MoveResult {
    fn from(error: InventoryError) -> Self {
        Self::failure(&error)
    }
}

/// Result of a checked placement of an orphan item into the first free slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddItemResult {
    pub status: MoveStatus,
    pub slot: Option<SlotId>,
    pub message: String,
}

impl AddItemResult {
    pub fn placed(slot: SlotId) -> Self {
        Self {
            status: MoveStatus::Success,
            slot: Some(slot),
            message: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl From<InventoryError> for AddItemResult {
    fn from(error: InventoryError) -> Self {
        Self {
            status: error.status(),
            slot: None,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_three_statuses_count_as_success() {
        let successes: Vec<_> = MoveStatus::iter().filter(|s| s.is_success()).collect();
        assert_eq!(
            successes,
            vec![
                MoveStatus::Success,
                MoveStatus::PartialSuccess,
                MoveStatus::SwapPerformed
            ]
        );
    }

    #[test]
    fn every_failure_has_an_error_code() {
        for status in MoveStatus::iter() {
            assert_eq!(status.error_code().is_none(), status.is_success(), "{status}");
        }
    }

    #[test]
    fn error_maps_to_matching_status() {
        let err = InventoryError::ContainerFull(ContainerUid::generate());
        assert_eq!(err.status(), MoveStatus::ContainerFull);
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(err.error_code(), "INVENTORY_CONTAINER_FULL");

        let result = MoveResult::from(err);
        assert!(!result.is_success());
        assert!(!result.message.is_empty());
    }

    #[test]
    fn transferred_reports_partial_remainder() {
        let target = ContainerUid::generate();
        let partial = MoveResult::transferred(10, 15, Some(target));
        assert_eq!(partial.status, MoveStatus::PartialSuccess);
        assert_eq!(partial.moved_quantity + partial.remaining_quantity, 15);
        assert!(!partial.is_complete());

        let full = MoveResult::transferred(5, 5, None);
        assert_eq!(full.status, MoveStatus::Success);
        assert!(full.is_complete());
    }
}
