//! BoardCache - query-keyed board state with invalidation.
//!
//! Each board has three query keys ([`QueryKey`]). A key carries an epoch
//! that every invalidation bumps. A load records the epochs it started
//! from; when it finishes, its results are stored regardless (last write
//! wins) but a key whose epoch moved in the meantime stays stale, so the
//! next read refetches.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use kanban_gateway::BoardGateway;
use kanban_models::{sort_columns, BoardDetail, BoardId, Column, ColumnId, TaskSummary};

use crate::error::{CacheError, Result};
use crate::grouping::tasks_by_column;
use crate::key::QueryKey;

/// Notifications sent to cache subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Fresh data for a board was stored.
    Loaded(BoardId),
    /// A key was marked stale.
    Invalidated(QueryKey),
}

/// A consistent view of one board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub board: BoardDetail,
    /// Columns ordered by position, ties in fetch order.
    pub columns: Vec<Column>,
    /// Tasks of every column, flattened in column order.
    pub tasks: Vec<TaskSummary>,
}

impl BoardSnapshot {
    pub fn board_id(&self) -> BoardId {
        self.board.id()
    }

    /// Per-column ordered task lists.
    pub fn tasks_by_column(&self) -> HashMap<ColumnId, Vec<TaskSummary>> {
        tasks_by_column(&self.columns, &self.tasks)
    }
}

struct Slot<T> {
    value: Option<T>,
    epoch: u64,
    stale: bool,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            epoch: 0,
            stale: true,
        }
    }
}

impl<T> Slot<T> {
    fn is_fresh(&self) -> bool {
        self.value.is_some() && !self.stale
    }

    fn invalidate(&mut self) {
        self.epoch += 1;
        self.stale = true;
    }

    /// Stores a fetch result; it only counts as fresh if no invalidation
    /// happened since `started_epoch`.
    fn store(&mut self, value: T, started_epoch: u64) {
        self.value = Some(value);
        self.stale = self.epoch != started_epoch;
    }
}

#[derive(Default)]
struct BoardEntry {
    board: Slot<BoardDetail>,
    columns: Slot<Vec<Column>>,
    tasks: Slot<Vec<TaskSummary>>,
}

impl BoardEntry {
    fn epochs(&self) -> (u64, u64, u64) {
        (self.board.epoch, self.columns.epoch, self.tasks.epoch)
    }

    fn snapshot(&self) -> Option<BoardSnapshot> {
        Some(BoardSnapshot {
            board: self.board.value.clone()?,
            columns: self.columns.value.clone()?,
            tasks: self.tasks.value.clone()?,
        })
    }
}

/// Query-keyed cache of board, column and task data.
pub struct BoardCache {
    gateway: Arc<dyn BoardGateway>,
    entries: RwLock<HashMap<BoardId, BoardEntry>>,
    event_tx: broadcast::Sender<CacheEvent>,
}

impl BoardCache {
    pub fn new(gateway: Arc<dyn BoardGateway>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            gateway,
            entries: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn BoardGateway> {
        &self.gateway
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    /// Returns the board, fetching whatever is missing or stale.
    ///
    /// Tasks are fetched per column concurrently; if any column fails the
    /// whole load fails and nothing from it is stored.
    pub async fn load(&self, board_id: BoardId) -> Result<BoardSnapshot> {
        let (fresh, epochs, cached_columns) = {
            let entries = self.entries.read().await;
            match entries.get(&board_id) {
                Some(entry)
                    if entry.board.is_fresh()
                        && entry.columns.is_fresh()
                        && entry.tasks.is_fresh() =>
                {
                    if let Some(snapshot) = entry.snapshot() {
                        debug!(board_id = %board_id, "Serving board from cache");
                        return Ok(snapshot);
                    }
                    (
                        (false, false, false),
                        entry.epochs(),
                        entry.columns.value.clone(),
                    )
                }
                Some(entry) => (
                    (
                        entry.board.is_fresh(),
                        entry.columns.is_fresh(),
                        entry.tasks.is_fresh(),
                    ),
                    entry.epochs(),
                    entry.columns.value.clone(),
                ),
                None => ((false, false, false), (0, 0, 0), None),
            }
        };
        let (board_fresh, columns_fresh, tasks_fresh) = fresh;

        debug!(
            board_id = %board_id,
            refetch_board = !board_fresh,
            refetch_columns = !columns_fresh,
            refetch_tasks = !tasks_fresh,
            "Loading board"
        );

        let board_fut = async {
            if board_fresh {
                Ok(None)
            } else {
                self.gateway.get_board(board_id).await.map(Some)
            }
        };
        let columns_fut = async {
            match cached_columns.filter(|_| columns_fresh) {
                Some(columns) => Ok((columns, false)),
                None => self.gateway.list_columns(board_id).await.map(|c| (c, true)),
            }
        };
        let (board, (mut columns, columns_fetched)) =
            tokio::try_join!(board_fut, columns_fut).map_err(|err| {
                warn!(board_id = %board_id, error = %err, "Board load failed");
                CacheError::from(err)
            })?;
        sort_columns(&mut columns);

        // New column set means the cached task list may be incomplete.
        let tasks = if tasks_fresh && !columns_fetched {
            None
        } else {
            let per_column = try_join_all(
                columns
                    .iter()
                    .map(|column| self.gateway.list_tasks(column.id)),
            )
            .await
            .map_err(|err| {
                warn!(board_id = %board_id, error = %err, "Task fan-out failed");
                CacheError::from(err)
            })?;
            Some(per_column.into_iter().flatten().collect::<Vec<_>>())
        };

        let snapshot = {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(board_id).or_default();
            let (board_epoch, columns_epoch, tasks_epoch) = epochs;

            if let Some(board) = board {
                entry.board.store(board, board_epoch);
            }
            if columns_fetched {
                entry.columns.store(columns.clone(), columns_epoch);
            }
            if let Some(tasks) = tasks {
                entry.tasks.store(tasks, tasks_epoch);
            }
            entry
                .snapshot()
                .ok_or(CacheError::NotLoaded(board_id))?
        };

        info!(
            board_id = %board_id,
            columns = snapshot.columns.len(),
            tasks = snapshot.tasks.len(),
            "Board loaded"
        );
        self.emit(CacheEvent::Loaded(board_id));
        Ok(snapshot)
    }

    /// Cached data for a board, without fetching. May be stale.
    pub async fn snapshot(&self, board_id: BoardId) -> Option<BoardSnapshot> {
        self.entries
            .read()
            .await
            .get(&board_id)
            .and_then(BoardEntry::snapshot)
    }

    /// Marks every key of a board stale.
    pub async fn invalidate(&self, board_id: BoardId) {
        for key in QueryKey::all(board_id) {
            self.invalidate_key(key).await;
        }
    }

    /// Marks one key stale.
    pub async fn invalidate_key(&self, key: QueryKey) {
        {
            let mut entries = self.entries.write().await;
            let entry = entries.entry(key.board_id()).or_default();
            match key {
                QueryKey::Board(_) => entry.board.invalidate(),
                QueryKey::Columns(_) => entry.columns.invalidate(),
                QueryKey::Tasks(_) => entry.tasks.invalidate(),
            }
        }
        debug!(key = %key, "Query invalidated");
        self.emit(CacheEvent::Invalidated(key));
    }

    /// True if the key has no data or was invalidated.
    pub async fn is_stale(&self, key: QueryKey) -> bool {
        let entries = self.entries.read().await;
        match entries.get(&key.board_id()) {
            None => true,
            Some(entry) => match key {
                QueryKey::Board(_) => !entry.board.is_fresh(),
                QueryKey::Columns(_) => !entry.columns.is_fresh(),
                QueryKey::Tasks(_) => !entry.tasks.is_fresh(),
            },
        }
    }

    /// Current epoch of a key; bumps on every invalidation.
    pub async fn epoch(&self, key: QueryKey) -> u64 {
        let entries = self.entries.read().await;
        entries.get(&key.board_id()).map_or(0, |entry| match key {
            QueryKey::Board(_) => entry.board.epoch,
            QueryKey::Columns(_) => entry.columns.epoch,
            QueryKey::Tasks(_) => entry.tasks.epoch,
        })
    }

    /// Drops all cached data for a board.
    pub async fn evict(&self, board_id: BoardId) -> bool {
        self.entries.write().await.remove(&board_id).is_some()
    }
}
