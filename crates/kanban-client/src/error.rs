//! Error types for the board controller and CLI.

use kanban_cache::CacheError;
use kanban_drag::DragError;
use kanban_gateway::GatewayError;
use kanban_persistence::PersistenceError;
use kanban_reconciler::ReconcileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Drag(#[from] DragError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// A command that needs a login was run without one.
    #[error("not logged in (run `kanban login` first)")]
    NotLoggedIn,

    /// The entity is not on the open board.
    #[error("{kind} {id} is not on this board")]
    NotOnBoard { kind: &'static str, id: i64 },

    /// A background move task panicked or was aborted.
    #[error("move task failed: {0}")]
    MoveTask(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
