//! MoveReconciler - optimistic moves with server reconciliation.
//!
//! A move is planned against the visible layout, applied to it at once,
//! and sent to the gateway as a one-shot spawned request bounded by the
//! move timeout:
//!
//! - success folds the move into the confirmed base, invalidates the
//!   affected query keys and rebases on a fresh load;
//! - failure drops only this move from the view and raises one
//!   `MoveFailed` notice; a `NotFound` additionally refetches the whole
//!   board;
//! - timeout drops the move and hands the still-running request to a
//!   watcher, which holds the entity's in-flight guard until the request
//!   resolves and reports a late success as `LateCommit`.
//!
//! Other moves still in flight stay visible through all of these.
//!
//! Requests are never retried.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use kanban_cache::{BoardCache, QueryKey};
use kanban_drag::{DropIntent, EntityRef};
use kanban_gateway::{BoardGateway, GatewayError};
use kanban_models::{BoardId, ColumnId, MoveColumnRequest, MoveTaskRequest, TaskId};

use crate::config::{ConflictPolicy, ReconcilerConfig};
use crate::error::{ReconcileError, Result};
use crate::layout::{BoardLayout, MoveTicket, SharedLayout};
use crate::notice::Notice;
use crate::plan::{plan_column_to, plan_move, plan_task_to, MoveIntent, Slot};

/// How a submitted move ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing to do; no request was sent.
    NoOp,
    /// The server accepted the move.
    Committed(MoveIntent),
}

type InFlight = Arc<Mutex<HashMap<EntityRef, Arc<tokio::sync::Mutex<()>>>>>;

/// Persists moves and keeps the visible layout consistent with the server.
#[derive(Clone)]
pub struct MoveReconciler {
    cache: Arc<BoardCache>,
    config: ReconcilerConfig,
    in_flight: InFlight,
    notice_tx: broadcast::Sender<Notice>,
}

impl std::fmt::Debug for MoveReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveReconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MoveReconciler {
    pub fn new(cache: Arc<BoardCache>, config: ReconcilerConfig) -> Self {
        let (notice_tx, _) = broadcast::channel(256);
        Self {
            cache,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            notice_tx,
        }
    }

    pub fn cache(&self) -> &Arc<BoardCache> {
        &self.cache
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Subscribes to user-visible notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// True while a move of `entity` has not resolved.
    pub fn is_in_flight(&self, entity: EntityRef) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&entity)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Reconciles a completed drag.
    pub async fn submit(&self, layout: &SharedLayout, drop: &DropIntent) -> Result<MoveOutcome> {
        let entity = drop.dragged.entity_ref();
        if drop.is_noop() {
            debug!(entity = %entity, "Dropped onto itself");
            return Ok(MoveOutcome::NoOp);
        }
        self.run(layout, entity, |current| plan_move(current, drop))
            .await
    }

    /// Moves a task without a drag gesture.
    pub async fn move_task(
        &self,
        layout: &SharedLayout,
        task: TaskId,
        column: ColumnId,
        slot: Slot,
    ) -> Result<MoveOutcome> {
        self.run(layout, EntityRef::Task(task), |current| {
            plan_task_to(current, task, column, slot)
        })
        .await
    }

    /// Moves a column to `index` among the other columns.
    pub async fn move_column(
        &self,
        layout: &SharedLayout,
        column: ColumnId,
        index: usize,
    ) -> Result<MoveOutcome> {
        self.run(layout, EntityRef::Column(column), |current| {
            plan_column_to(current, column, index)
        })
        .await
    }

    async fn acquire(&self, entity: EntityRef) -> Result<OwnedMutexGuard<()>> {
        let lock = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.retain(|_, lock| Arc::strong_count(lock) > 1);
            in_flight.entry(entity).or_default().clone()
        };
        match self.config.conflict_policy {
            ConflictPolicy::Reject => lock.try_lock_owned().map_err(|_| {
                warn!(entity = %entity, "Move rejected, previous move still in flight");
                ReconcileError::InFlightConflict(entity)
            }),
            ConflictPolicy::Queue => {
                debug!(entity = %entity, "Waiting for in-flight move");
                Ok(lock.lock_owned().await)
            }
        }
    }

    async fn run<F>(&self, layout: &SharedLayout, entity: EntityRef, plan: F) -> Result<MoveOutcome>
    where
        F: FnOnce(&BoardLayout) -> Result<Option<MoveIntent>>,
    {
        let guard = self.acquire(entity).await?;

        let planned = {
            let mut current = layout.write().await;
            let board = current.view().board_id();
            match plan(current.view()) {
                Ok(Some(intent)) => current
                    .push(intent)
                    .map(|ticket| Some((ticket, intent, board)))
                    .ok_or((ReconcileError::StaleReference(entity), board)),
                Ok(None) => Ok(None),
                Err(err) => Err((err, board)),
            }
        };
        let (ticket, intent, board) = match planned {
            Ok(Some(planned)) => planned,
            Ok(None) => {
                debug!(entity = %entity, "Move leaves the layout unchanged");
                return Ok(MoveOutcome::NoOp);
            }
            Err((err, board)) => {
                // Nothing was applied, so only the refetch is reported.
                if matches!(err, ReconcileError::StaleReference(_)) {
                    self.refetch_stale(layout, board).await;
                }
                return Err(err);
            }
        };

        info!(
            entity = %entity,
            position = intent.position(),
            "Move applied optimistically"
        );
        let mut request = tokio::spawn(send(self.cache.gateway().clone(), intent));

        match tokio::time::timeout(self.config.move_timeout, &mut request).await {
            Ok(joined) => {
                let result = joined.unwrap_or_else(|err| {
                    Err(GatewayError::Transport(format!("move request aborted: {err}")))
                });
                match result {
                    Ok(()) => {
                        self.commit(layout, board, ticket, &intent).await;
                        Ok(MoveOutcome::Committed(intent))
                    }
                    Err(err) => Err(self.roll_back(layout, board, ticket, entity, err).await),
                }
            }
            Err(_) => {
                warn!(
                    entity = %entity,
                    timeout_ms = self.config.move_timeout.as_millis() as u64,
                    "Move timed out, rolling back"
                );
                layout.write().await.discard(ticket);
                self.notify_failed(entity, "the server did not respond in time");
                self.watch_late(layout.clone(), board, entity, request, guard);
                Err(ReconcileError::Timeout(self.config.move_timeout))
            }
        }
    }

    async fn commit(&self, layout: &SharedLayout, board: BoardId, ticket: MoveTicket, intent: &MoveIntent) {
        info!(entity = %intent.entity(), "Move committed");
        layout.write().await.confirm(ticket);
        if let MoveIntent::Column { .. } = intent {
            self.cache.invalidate_key(QueryKey::Columns(board)).await;
        }
        self.cache.invalidate_key(QueryKey::Tasks(board)).await;
        if let Err(err) = self.reload(layout, board).await {
            warn!(board_id = %board, error = %err, "Refetch after move failed, keeping local order");
        }
    }

    async fn roll_back(
        &self,
        layout: &SharedLayout,
        board: BoardId,
        ticket: MoveTicket,
        entity: EntityRef,
        err: GatewayError,
    ) -> ReconcileError {
        warn!(entity = %entity, error = %err, "Move failed, rolling back");
        layout.write().await.discard(ticket);
        self.notify_failed(entity, &err.to_string());

        if err.is_stale_reference() {
            self.refetch_stale(layout, board).await;
            return ReconcileError::StaleReference(entity);
        }
        ReconcileError::Persistence(err)
    }

    /// Loads the board and makes it the confirmed base; moves still in
    /// flight stay visible on top.
    async fn reload(&self, layout: &SharedLayout, board: BoardId) -> Result<()> {
        let snapshot = self.cache.load(board).await?;
        layout.write().await.rebase(BoardLayout::from_snapshot(&snapshot));
        Ok(())
    }

    async fn refetch_stale(&self, layout: &SharedLayout, board: BoardId) {
        info!(board_id = %board, "Stale reference, refetching board");
        self.cache.invalidate(board).await;
        if let Err(err) = self.reload(layout, board).await {
            warn!(board_id = %board, error = %err, "Board refetch failed");
        }
        self.emit(Notice::StaleBoard(board));
    }

    fn watch_late(
        &self,
        layout: SharedLayout,
        board: BoardId,
        entity: EntityRef,
        request: JoinHandle<kanban_gateway::Result<()>>,
        guard: OwnedMutexGuard<()>,
    ) {
        let reconciler = self.clone();
        tokio::spawn(async move {
            let committed = match request.await {
                Ok(Ok(())) => {
                    info!(entity = %entity, "Timed-out move committed late");
                    reconciler.cache.invalidate(board).await;
                    if let Err(err) = reconciler.reload(&layout, board).await {
                        warn!(board_id = %board, error = %err, "Refetch after late commit failed");
                    }
                    true
                }
                Ok(Err(err)) => {
                    debug!(entity = %entity, error = %err, "Timed-out move failed");
                    false
                }
                Err(err) => {
                    warn!(entity = %entity, error = %err, "Timed-out move request aborted");
                    false
                }
            };
            drop(guard);
            if committed {
                reconciler.emit(Notice::LateCommit { entity });
            }
        });
    }

    fn notify_failed(&self, entity: EntityRef, reason: &str) {
        self.emit(Notice::MoveFailed {
            entity,
            reason: reason.to_string(),
        });
    }

    fn emit(&self, notice: Notice) {
        // No subscribers is fine.
        let _ = self.notice_tx.send(notice);
    }
}

async fn send(gateway: Arc<dyn BoardGateway>, intent: MoveIntent) -> kanban_gateway::Result<()> {
    match intent {
        MoveIntent::Task {
            task,
            to_column,
            position,
            ..
        } => {
            let request = MoveTaskRequest {
                to_column_id: to_column,
                position: Some(position),
            };
            gateway.move_task(task, request).await.map(|_| ())
        }
        MoveIntent::Column {
            column, position, ..
        } => {
            gateway
                .move_column(column, MoveColumnRequest { position })
                .await
                .map(|_| ())
        }
    }
}
