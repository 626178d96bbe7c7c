//! Scenario execution against a running inventory.
//!
//! Scenarios name instances by alias. The runner binds each alias to the id
//! the runtime assigns when the step runs and checks every declared
//! expectation, stopping at the first step that does not hold.

use std::collections::HashMap;

use tracing::{debug, info};

use inventory_content::{Scenario, ScenarioStep};
use inventory_core::{ContainerDebugInfo, ContainerUid, ItemUid, MoveStatus, SlotId, SlotRequest};

use crate::api::{Result, RuntimeError, RuntimeHandle};

/// What a completed scenario produced.
#[derive(Clone, Debug, Default)]
pub struct ScenarioReport {
    pub name: String,
    pub steps_run: usize,
    /// One entry per `Dump` step, in order.
    pub dumps: Vec<ContainerDebugInfo>,
}

pub struct ScenarioRunner {
    handle: RuntimeHandle,
    items: HashMap<String, ItemUid>,
    containers: HashMap<String, ContainerUid>,
}

impl ScenarioRunner {
    pub fn new(handle: RuntimeHandle) -> Self {
        Self {
            handle,
            items: HashMap::new(),
            containers: HashMap::new(),
        }
    }

    /// Id bound to an item alias by a previous run.
    pub fn item(&self, alias: &str) -> Option<ItemUid> {
        self.items.get(alias).copied()
    }

    pub fn container(&self, alias: &str) -> Option<ContainerUid> {
        self.containers.get(alias).copied()
    }

    pub async fn run(&mut self, scenario: &Scenario) -> Result<ScenarioReport> {
        info!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            "running scenario"
        );

        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            ..Default::default()
        };

        for (index, step) in scenario.steps.iter().enumerate() {
            debug!(step = index, kind = step.kind(), "scenario step");
            if let Some(dump) = self.run_step(index, step).await? {
                report.dumps.push(dump);
            }
            report.steps_run += 1;
        }

        info!(
            scenario = %scenario.name,
            steps = report.steps_run,
            "scenario completed"
        );
        Ok(report)
    }

    async fn run_step(
        &mut self,
        index: usize,
        step: &ScenarioStep,
    ) -> Result<Option<ContainerDebugInfo>> {
        let fail = |reason: String| RuntimeError::ScenarioFailed {
            step: index,
            kind: step.kind(),
            reason,
        };

        match step {
            ScenarioStep::CreateContainer { alias, definition } => {
                let uid = self.handle.create_container(definition.clone()).await?;
                self.containers.insert(alias.clone(), uid);
            }
            ScenarioStep::CreateItem {
                alias,
                definition,
                quantity,
            } => {
                let item = self
                    .handle
                    .create_item(definition.clone(), *quantity)
                    .await?;
                self.items.insert(alias.clone(), item.uid);
            }
            ScenarioStep::OwnedContainer { item, alias } => {
                let uid = self.item_uid(item)?;
                let owned = self
                    .handle
                    .find_item(uid)
                    .await?
                    .and_then(|record| record.owned_container)
                    .ok_or_else(|| fail(format!("item '{item}' owns no container")))?;
                self.containers.insert(alias.clone(), owned);
            }
            ScenarioStep::Add {
                item,
                container,
                expect,
            } => {
                let result = self
                    .handle
                    .add_item(self.item_uid(item)?, self.container_uid(container)?)
                    .await?;
                check_status(result.status, *expect, &result.message).map_err(fail)?;
            }
            ScenarioStep::Move {
                item,
                container,
                slot,
                quantity,
                split_as,
                expect,
            } => {
                let slot = SlotRequest::from(slot.map(SlotId));
                let result = self
                    .handle
                    .move_item(
                        self.item_uid(item)?,
                        self.container_uid(container)?,
                        slot,
                        *quantity,
                    )
                    .await?;
                check_status(result.status, *expect, &result.message).map_err(fail)?;

                if let Some(alias) = split_as {
                    let uid = result
                        .new_item
                        .ok_or_else(|| fail(format!("move created no instance for '{alias}'")))?;
                    self.items.insert(alias.clone(), uid);
                }
            }
            ScenarioStep::Remove { item } => {
                if !self.handle.remove_item(self.item_uid(item)?).await? {
                    return Err(fail(format!("item '{item}' could not be removed")));
                }
            }
            ScenarioStep::Destroy { item } => {
                if !self.handle.destroy_item(self.item_uid(item)?).await? {
                    return Err(fail(format!("item '{item}' could not be destroyed")));
                }
            }
            ScenarioStep::ExpectQuantity { item, quantity } => {
                let actual = self
                    .handle
                    .find_item(self.item_uid(item)?)
                    .await?
                    .map(|record| record.quantity);
                if actual != *quantity {
                    return Err(fail(format!(
                        "item '{item}' has quantity {actual:?}, expected {quantity:?}"
                    )));
                }
            }
            ScenarioStep::Validate { expect } => {
                let report = self.handle.validate().await?;
                if report.is_valid() != *expect {
                    let issues: Vec<String> =
                        report.issues.iter().map(ToString::to_string).collect();
                    return Err(fail(format!(
                        "integrity valid = {}, expected {expect}; issues: [{}]",
                        report.is_valid(),
                        issues.join("; ")
                    )));
                }
            }
            ScenarioStep::Repair => {
                let repaired = self.handle.repair().await?;
                debug!(repaired, "scenario repair finished");
            }
            ScenarioStep::Dump { container } => {
                let uid = self.container_uid(container)?;
                let info = self
                    .handle
                    .debug_info(uid)
                    .await?
                    .ok_or_else(|| fail(format!("container '{container}' no longer exists")))?;
                return Ok(Some(info));
            }
        }
        Ok(None)
    }

    fn item_uid(&self, alias: &str) -> Result<ItemUid> {
        self.item(alias)
            .ok_or_else(|| RuntimeError::UnknownAlias(alias.to_owned()))
    }

    fn container_uid(&self, alias: &str) -> Result<ContainerUid> {
        self.container(alias)
            .ok_or_else(|| RuntimeError::UnknownAlias(alias.to_owned()))
    }
}

/// Without an explicit expectation any successful status passes.
fn check_status(
    actual: MoveStatus,
    expected: Option<MoveStatus>,
    message: &str,
) -> std::result::Result<(), String> {
    let holds = match expected {
        Some(expected) => actual == expected,
        None => actual.is_success(),
    };
    if holds {
        Ok(())
    } else {
        Err(format!(
            "got {actual} ({message}), expected {}",
            expected.map_or("a success".to_owned(), |status| status.to_string())
        ))
    }
}
