//! Scripted inventory scenarios.
//!
//! A scenario is an ordered list of requests that refer to instances by alias
//! rather than by id, since ids are only assigned when the step runs.

use inventory_core::{DefinitionId, MoveStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Aliases bound by the steps, in order of first appearance.
    pub fn declared_aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = Vec::new();
        for step in &self.steps {
            if let Some(alias) = step.binds() {
                if !aliases.contains(&alias) {
                    aliases.push(alias);
                }
            }
        }
        aliases
    }
}

/// One request in a scenario. `expect` fields, when set, name the status the
/// step must produce.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScenarioStep {
    CreateContainer {
        alias: String,
        definition: DefinitionId,
    },
    CreateItem {
        alias: String,
        definition: DefinitionId,
        quantity: u32,
    },
    /// Binds `alias` to the container owned by `item`.
    OwnedContainer {
        item: String,
        alias: String,
    },
    Add {
        item: String,
        container: String,
        expect: Option<MoveStatus>,
    },
    Move {
        item: String,
        container: String,
        slot: Option<u16>,
        quantity: Option<u32>,
        /// Alias for the instance created by a partial move.
        split_as: Option<String>,
        expect: Option<MoveStatus>,
    },
    Remove {
        item: String,
    },
    Destroy {
        item: String,
    },
    /// Asserts an item's quantity, or that it no longer exists when `None`.
    ExpectQuantity {
        item: String,
        quantity: Option<u32>,
    },
    Validate {
        expect: bool,
    },
    Repair,
    Dump {
        container: String,
    },
}

impl ScenarioStep {
    /// Alias this step introduces, if any.
    pub fn binds(&self) -> Option<&str> {
        match self {
            Self::CreateContainer { alias, .. }
            | Self::CreateItem { alias, .. }
            | Self::OwnedContainer { alias, .. } => Some(alias.as_str()),
            Self::Move {
                split_as: Some(alias),
                ..
            } => Some(alias.as_str()),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateContainer { .. } => "create_container",
            Self::CreateItem { .. } => "create_item",
            Self::OwnedContainer { .. } => "owned_container",
            Self::Add { .. } => "add",
            Self::Move { .. } => "move",
            Self::Remove { .. } => "remove",
            Self::Destroy { .. } => "destroy",
            Self::ExpectQuantity { .. } => "expect_quantity",
            Self::Validate { .. } => "validate",
            Self::Repair => "repair",
            Self::Dump { .. } => "dump",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_collected_once_in_order() {
        let scenario = Scenario {
            name: "aliases".into(),
            description: String::new(),
            steps: vec![
                ScenarioStep::CreateContainer {
                    alias: "pack".into(),
                    definition: "Backpack".into(),
                },
                ScenarioStep::CreateItem {
                    alias: "potion".into(),
                    definition: "Potion".into(),
                    quantity: 5,
                },
                ScenarioStep::Move {
                    item: "potion".into(),
                    container: "pack".into(),
                    slot: None,
                    quantity: Some(2),
                    split_as: Some("half".into()),
                    expect: None,
                },
                ScenarioStep::Repair,
            ],
        };
        assert_eq!(scenario.declared_aliases(), vec!["pack", "potion", "half"]);
        assert_eq!(scenario.steps[3].kind(), "repair");
    }
}
