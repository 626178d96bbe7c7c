//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, rejected inventory requests, and
//! scenario execution so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use inventory_core::InventoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("inventory worker command channel closed")]
    CommandChannelClosed,

    #[error("inventory worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("inventory worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("runtime requires definitions to be configured before building")]
    MissingDefinitions,

    #[error("{request} request answered with {response}")]
    UnexpectedResponse {
        request: &'static str,
        response: &'static str,
    },

    #[error("scenario references unknown alias '{0}'")]
    UnknownAlias(String),

    #[error("scenario step {step} ({kind}) failed: {reason}")]
    ScenarioFailed {
        step: usize,
        kind: &'static str,
        reason: String,
    },
}
