//! Scenario loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::scenario::{Scenario, ScenarioStep};

pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid scenario {}: {}", path.display(), e))
    }

    /// Parses a scenario and checks that every alias is bound before use.
    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        let mut bound: Vec<&str> = Vec::new();
        for (index, step) in scenario.steps.iter().enumerate() {
            for alias in referenced_aliases(step) {
                if !bound.contains(&alias) {
                    anyhow::bail!(
                        "step {} ({}) uses alias '{}' before it is bound",
                        index,
                        step.kind(),
                        alias
                    );
                }
            }
            if let Some(alias) = step.binds() {
                bound.push(alias);
            }
        }

        Ok(scenario)
    }
}

fn referenced_aliases(step: &ScenarioStep) -> Vec<&str> {
    match step {
        ScenarioStep::CreateContainer { .. }
        | ScenarioStep::CreateItem { .. }
        | ScenarioStep::Validate { .. }
        | ScenarioStep::Repair => Vec::new(),
        ScenarioStep::OwnedContainer { item, .. }
        | ScenarioStep::Remove { item }
        | ScenarioStep::Destroy { item }
        | ScenarioStep::ExpectQuantity { item, .. } => vec![item.as_str()],
        ScenarioStep::Add {
            item, container, ..
        }
        | ScenarioStep::Move {
            item, container, ..
        } => vec![item.as_str(), container.as_str()],
        ScenarioStep::Dump { container } => vec![container.as_str()],
    }
}
