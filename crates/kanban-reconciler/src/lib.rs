//! Kanban Reconciler - turning drops into authoritative moves.
//!
//! - **layout**: the visible, ordered arrangement of a board, kept as the
//!   confirmed base plus the moves still awaiting the server
//! - **position**: index-based position math (`array_move`, `position_at`)
//! - **plan**: drop intent to concrete [`MoveIntent`]
//! - **reconciler**: optimistic apply, one request per move, rollback,
//!   in-flight guard and timeout

pub mod config;
pub mod error;
pub mod layout;
pub mod notice;
pub mod plan;
pub mod position;
pub mod reconciler;

#[cfg(test)]
mod testing;

pub use config::{ConflictPolicy, ReconcilerConfig};
pub use error::{ReconcileError, Result};
pub use layout::{BoardLayout, MoveTicket, OptimisticLayout, SharedLayout};
pub use notice::Notice;
pub use plan::{plan_column_to, plan_move, plan_task_to, MoveIntent, Slot};
pub use position::{array_move, position_at};
pub use reconciler::{MoveOutcome, MoveReconciler};
