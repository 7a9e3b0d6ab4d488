//! Error types for move reconciliation.

use std::time::Duration;

use kanban_cache::CacheError;
use kanban_drag::EntityRef;
use kanban_gateway::GatewayError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// The entity already has a move pending and the policy rejects overlap.
    #[error("a move of {0} is already in flight")]
    InFlightConflict(EntityRef),

    /// The gateway rejected or failed the move. The layout was rolled back.
    #[error("move failed: {0}")]
    Persistence(GatewayError),

    /// No response within the move timeout. The layout was rolled back.
    #[error("move timed out after {0:?}")]
    Timeout(Duration),

    /// The entity (or its destination) no longer exists; the board was refetched.
    #[error("{0} no longer exists")]
    StaleReference(EntityRef),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ReconcileError {
    /// True for failures that left the layout rolled back to its pre-drag state.
    pub fn rolled_back(&self) -> bool {
        matches!(
            self,
            ReconcileError::Persistence(_)
                | ReconcileError::Timeout(_)
                | ReconcileError::StaleReference(_)
        )
    }
}

/// Result type for reconciler operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
