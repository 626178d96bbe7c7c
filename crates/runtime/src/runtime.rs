//! High-level runtime orchestrator.
//!
//! The runtime owns the inventory worker, wires up command/event channels, and
//! exposes a builder-based API for clients to reach the authoritative store.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use inventory_core::{DefinitionOracle, InventoryConfig, InventoryService};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, InventoryWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub inventory: InventoryConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inventory: InventoryConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that hosts the authoritative inventory
///
/// Runtime owns the worker; [`RuntimeHandle`] provides a cloneable façade for
/// clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker drains queued commands and stops once every outstanding
    /// handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    definitions: Option<Arc<dyn DefinitionOracle>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            definitions: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine policies
    pub fn inventory_config(mut self, inventory: InventoryConfig) -> Self {
        self.config.inventory = inventory;
        self
    }

    /// Set the definition lookup the engine validates against
    pub fn definitions(mut self, definitions: impl DefinitionOracle + 'static) -> Self {
        self.definitions = Some(Arc::new(definitions));
        self
    }

    /// Share an already wrapped definition lookup
    pub fn shared_definitions(mut self, definitions: Arc<dyn DefinitionOracle>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let definitions = self.definitions.ok_or(RuntimeError::MissingDefinitions)?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let service = InventoryService::new(definitions, self.config.inventory);
        let worker = InventoryWorker::new(service, command_rx, event_bus);

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
