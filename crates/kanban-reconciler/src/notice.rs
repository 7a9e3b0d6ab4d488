//! User-visible notices raised by reconciliation.

use std::fmt;

use kanban_drag::EntityRef;
use kanban_models::BoardId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A move was rolled back. Sent exactly once per failed move.
    MoveFailed { entity: EntityRef, reason: String },
    /// Local data referenced something the server no longer has; the
    /// board was refetched.
    StaleBoard(BoardId),
    /// A move that timed out was committed by the server after all.
    LateCommit { entity: EntityRef },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MoveFailed { entity, reason } => {
                write!(f, "Could not move {entity}: {reason}")
            }
            Notice::StaleBoard(board) => {
                write!(f, "Board {board} changed on the server and was reloaded")
            }
            Notice::LateCommit { entity } => {
                write!(f, "The move of {entity} was saved after it timed out")
            }
        }
    }
}
