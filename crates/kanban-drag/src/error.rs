//! Error types for drag sessions.

use thiserror::Error;

use crate::entity::EntityRef;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DragError {
    /// A drag is already active; only one may run at a time.
    #[error("a drag is already in progress for {0}")]
    AlreadyDragging(EntityRef),

    #[error("no drag in progress")]
    NotDragging,

    /// A keyboard command was sent to a pointer-driven drag.
    #[error("the active drag is not keyboard driven")]
    NotKeyboardDrag,

    #[error("the active drag is not pointer driven")]
    NotPointerDrag,

    /// The entity has no measured region.
    #[error("no droppable registered for {0}")]
    UnknownEntity(EntityRef),
}

/// Result type for drag operations.
pub type Result<T> = std::result::Result<T, DragError>;
