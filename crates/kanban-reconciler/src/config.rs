//! Reconciler configuration.

use std::time::Duration;

use kanban_core::DEFAULT_MOVE_TIMEOUT;

/// What to do when an entity is moved again before its previous move resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Fail the second move with `InFlightConflict`.
    #[default]
    Reject,
    /// Wait, in arrival order, until the pending move resolves.
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// How long a move request may run before the layout reverts.
    pub move_timeout: Duration,
    pub conflict_policy: ConflictPolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            move_timeout: DEFAULT_MOVE_TIMEOUT,
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Defaults with the move timeout taken from the environment.
    pub fn from_env() -> Self {
        Self::default().with_move_timeout(kanban_core::move_timeout())
    }

    pub fn with_move_timeout(mut self, timeout: Duration) -> Self {
        self.move_timeout = timeout;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}
