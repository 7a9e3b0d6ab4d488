//! Error types for the cache crate.

use kanban_gateway::GatewayError;
use kanban_models::BoardId;
use thiserror::Error;

/// Errors that can occur while loading board data.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// A fetch failed. Nothing from the load was stored.
    #[error("failed to load board: {0}")]
    Gateway(#[from] GatewayError),

    /// The board has no cached data.
    #[error("board {0} is not loaded")]
    NotLoaded(BoardId),
}

impl CacheError {
    /// True if the failure means the board (or part of it) no longer exists.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, CacheError::Gateway(err) if err.is_stale_reference())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
