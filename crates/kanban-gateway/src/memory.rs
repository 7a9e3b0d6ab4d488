//! In-memory gateway for tests, demos and offline use.
//!
//! Behaves like the REST server for the [`BoardGateway`] subset: moves use
//! insert-at semantics (siblings at or after the target position shift
//! down by one), a missing position appends, and unknown ids yield
//! [`GatewayError::NotFound`]. Failures and latency can be injected per
//! operation, and every call is counted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use kanban_models::{
    sort_columns, sort_tasks, Board, BoardDetail, BoardId, Column, ColumnId, CreateColumnRequest,
    MoveColumnRequest, MoveTaskRequest, TaskDetail, TaskId, TaskSummary, UserId, Visibility,
};

use crate::error::{GatewayError, Result};
use crate::gateway::BoardGateway;

/// Gateway operations, used to target injected failures and latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetBoard,
    ListColumns,
    ListTasks,
    MoveTask,
    CreateColumn,
    MoveColumn,
}

#[derive(Default)]
struct MemoryState {
    boards: Vec<Board>,
    columns: Vec<Column>,
    tasks: Vec<TaskSummary>,
    next_id: i64,
    failures: HashMap<Operation, VecDeque<GatewayError>>,
    latency: HashMap<Operation, Duration>,
    calls: HashMap<Operation, usize>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// [`BoardGateway`] backed by in-process state.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Seeding ---

    /// Adds a private board and returns its id.
    pub fn add_board(&self, name: impl Into<String>) -> BoardId {
        let mut state = self.lock();
        let id = BoardId::new(state.allocate_id());
        let now = Utc::now();
        state.boards.push(Board {
            id,
            name: name.into(),
            visibility: Visibility::Private,
            owner_id: UserId::new(1),
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Adds a column at an explicit position.
    pub fn add_column(&self, board: BoardId, name: impl Into<String>, position: i64) -> ColumnId {
        let mut state = self.lock();
        let id = ColumnId::new(state.allocate_id());
        state.columns.push(Column::new(id, board, name, position));
        id
    }

    /// Adds a task at an explicit position.
    pub fn add_task(&self, column: ColumnId, title: impl Into<String>, position: i64) -> TaskId {
        let mut state = self.lock();
        let id = TaskId::new(state.allocate_id());
        state
            .tasks
            .push(TaskSummary::builder(id, column, title).position(position).build());
        id
    }

    /// Removes a task, as if another client deleted it.
    pub fn remove_task(&self, task: TaskId) -> bool {
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task);
        state.tasks.len() != before
    }

    // --- Fault injection ---

    /// Makes the next call of `operation` fail with `error`. Queued
    /// failures are consumed in order.
    pub fn fail_next(&self, operation: Operation, error: GatewayError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delays every call of `operation` by `delay` before it takes effect.
    pub fn set_latency(&self, operation: Operation, delay: Duration) {
        self.lock().latency.insert(operation, delay);
    }

    // --- Inspection ---

    /// Number of calls made to `operation`, including failed ones.
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn move_calls(&self) -> usize {
        self.calls(Operation::MoveTask) + self.calls(Operation::MoveColumn)
    }

    /// Tasks of a column in server order.
    pub fn tasks_in(&self, column: ColumnId) -> Vec<TaskSummary> {
        let mut tasks: Vec<TaskSummary> = self
            .lock()
            .tasks
            .iter()
            .filter(|t| t.column_id == column)
            .cloned()
            .collect();
        sort_tasks(&mut tasks);
        tasks
    }

    /// Columns of a board in server order.
    pub fn columns_of(&self, board: BoardId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .lock()
            .columns
            .iter()
            .filter(|c| c.board_id == board)
            .cloned()
            .collect();
        sort_columns(&mut columns);
        columns
    }

    /// Records the call, applies latency, then pops an injected failure.
    async fn enter(&self, operation: Operation) -> Result<()> {
        let delay = {
            let mut state = self.lock();
            *state.calls.entry(operation).or_insert(0) += 1;
            state.latency.get(&operation).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .lock()
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(err) => {
                debug!(?operation, error = %err, "Injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> GatewayError {
    GatewayError::NotFound(format!("{kind} {id} not found"))
}

/// Shifts every sibling at or after `position` down by one, making room
/// for an insert at `position`.
fn shift_siblings<'a>(positions: impl Iterator<Item = &'a mut i64>, position: i64) {
    for p in positions {
        if *p >= position {
            *p += 1;
        }
    }
}

#[async_trait]
impl BoardGateway for InMemoryGateway {
    async fn get_board(&self, board: BoardId) -> Result<BoardDetail> {
        self.enter(Operation::GetBoard).await?;
        let found = self
            .lock()
            .boards
            .iter()
            .find(|b| b.id == board)
            .cloned()
            .ok_or_else(|| not_found(BoardId::kind(), board))?;
        Ok(BoardDetail {
            board: found,
            columns: self.columns_of(board),
            members: Vec::new(),
            labels: Vec::new(),
        })
    }

    async fn list_columns(&self, board: BoardId) -> Result<Vec<Column>> {
        self.enter(Operation::ListColumns).await?;
        let state = self.lock();
        if !state.boards.iter().any(|b| b.id == board) {
            return Err(not_found(BoardId::kind(), board));
        }
        Ok(state
            .columns
            .iter()
            .filter(|c| c.board_id == board)
            .cloned()
            .collect())
    }

    async fn list_tasks(&self, column: ColumnId) -> Result<Vec<TaskSummary>> {
        self.enter(Operation::ListTasks).await?;
        let state = self.lock();
        if !state.columns.iter().any(|c| c.id == column) {
            return Err(not_found(ColumnId::kind(), column));
        }
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.column_id == column)
            .cloned()
            .collect())
    }

    async fn move_task(&self, task: TaskId, request: MoveTaskRequest) -> Result<TaskDetail> {
        self.enter(Operation::MoveTask).await?;
        let mut state = self.lock();

        if !state.columns.iter().any(|c| c.id == request.to_column_id) {
            return Err(not_found(ColumnId::kind(), request.to_column_id));
        }
        if !state.tasks.iter().any(|t| t.id == task) {
            return Err(not_found(TaskId::kind(), task));
        }

        let destination = request.to_column_id;
        let position = match request.position {
            Some(position) => {
                shift_siblings(
                    state
                        .tasks
                        .iter_mut()
                        .filter(|t| t.column_id == destination && t.id != task)
                        .map(|t| &mut t.position),
                    position,
                );
                position
            }
            None => {
                state
                    .tasks
                    .iter()
                    .filter(|t| t.column_id == destination && t.id != task)
                    .map(|t| t.position)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };

        let moved = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task)
            .ok_or_else(|| not_found(TaskId::kind(), task))?;
        moved.column_id = destination;
        moved.position = position;

        debug!(task_id = %task, column_id = %destination, position, "Task moved");

        let now = Utc::now();
        Ok(TaskDetail {
            id: moved.id,
            title: moved.title.clone(),
            description: moved.description.clone(),
            status: moved.status,
            position: moved.position,
            column_id: moved.column_id,
            due_date: moved.due_date.clone(),
            created_at: now,
            updated_at: now,
            assignees: Vec::new(),
            labels: moved.labels.clone(),
            comment_count: 0,
            attachment_count: 0,
        })
    }

    async fn create_column(&self, board: BoardId, request: CreateColumnRequest) -> Result<Column> {
        self.enter(Operation::CreateColumn).await?;
        if request.name.trim().is_empty() {
            let mut fields = std::collections::BTreeMap::new();
            fields.insert("name".to_string(), "must not be blank".to_string());
            return Err(GatewayError::Validation {
                message: "Validation failed".to_string(),
                fields,
            });
        }

        let mut state = self.lock();
        if !state.boards.iter().any(|b| b.id == board) {
            return Err(not_found(BoardId::kind(), board));
        }
        let position = match request.position {
            Some(position) => {
                shift_siblings(
                    state
                        .columns
                        .iter_mut()
                        .filter(|c| c.board_id == board)
                        .map(|c| &mut c.position),
                    position,
                );
                position
            }
            None => {
                state
                    .columns
                    .iter()
                    .filter(|c| c.board_id == board)
                    .map(|c| c.position)
                    .max()
                    .unwrap_or(0)
                    + 1
            }
        };

        let id = ColumnId::new(state.allocate_id());
        let column = Column::new(id, board, request.name, position);
        state.columns.push(column.clone());
        Ok(column)
    }

    async fn move_column(&self, column: ColumnId, request: MoveColumnRequest) -> Result<Column> {
        self.enter(Operation::MoveColumn).await?;
        let mut state = self.lock();

        let board = state
            .columns
            .iter()
            .find(|c| c.id == column)
            .map(|c| c.board_id)
            .ok_or_else(|| not_found(ColumnId::kind(), column))?;

        shift_siblings(
            state
                .columns
                .iter_mut()
                .filter(|c| c.board_id == board && c.id != column)
                .map(|c| &mut c.position),
            request.position,
        );

        let moved = state
            .columns
            .iter_mut()
            .find(|c| c.id == column)
            .ok_or_else(|| not_found(ColumnId::kind(), column))?;
        moved.position = request.position;
        Ok(moved.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (InMemoryGateway, BoardId, ColumnId, ColumnId) {
        let gateway = InMemoryGateway::new();
        let board = gateway.add_board("Sprint 1");
        let todo = gateway.add_column(board, "To Do", 1);
        let doing = gateway.add_column(board, "Doing", 2);
        (gateway, board, todo, doing)
    }

    fn titles(tasks: &[TaskSummary]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_reads() {
        let (gateway, board, todo, _) = seeded();
        gateway.add_task(todo, "A", 1);

        let detail = gateway.get_board(board).await.unwrap();
        assert_eq!(detail.name(), "Sprint 1");
        assert_eq!(detail.columns.len(), 2);

        assert_eq!(gateway.list_columns(board).await.unwrap().len(), 2);
        assert_eq!(gateway.list_tasks(todo).await.unwrap().len(), 1);
        assert_eq!(gateway.calls(Operation::ListTasks), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (gateway, _, _, _) = seeded();
        assert!(gateway
            .get_board(BoardId::new(999))
            .await
            .unwrap_err()
            .is_stale_reference());
        assert!(gateway
            .list_tasks(ColumnId::new(999))
            .await
            .unwrap_err()
            .is_stale_reference());
    }

    #[tokio::test]
    async fn test_move_task_inserts_and_shifts() {
        let (gateway, _, todo, doing) = seeded();
        let a = gateway.add_task(todo, "A", 1);
        gateway.add_task(doing, "X", 1);
        gateway.add_task(doing, "Y", 2);

        let detail = gateway
            .move_task(
                a,
                MoveTaskRequest {
                    to_column_id: doing,
                    position: Some(2),
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.column_id, doing);
        assert_eq!(titles(&gateway.tasks_in(doing)), vec!["X", "A", "Y"]);
        assert!(gateway.tasks_in(todo).is_empty());
        assert_eq!(gateway.move_calls(), 1);
    }

    #[tokio::test]
    async fn test_move_task_without_position_appends() {
        let (gateway, _, todo, doing) = seeded();
        let a = gateway.add_task(todo, "A", 1);
        gateway.add_task(doing, "X", 4);

        let detail = gateway
            .move_task(
                a,
                MoveTaskRequest {
                    to_column_id: doing,
                    position: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.position, 5);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let (gateway, _, todo, doing) = seeded();
        let a = gateway.add_task(todo, "A", 1);
        gateway.fail_next(Operation::MoveTask, GatewayError::Transport("offline".into()));

        let request = MoveTaskRequest {
            to_column_id: doing,
            position: Some(1),
        };
        assert!(gateway.move_task(a, request).await.is_err());
        assert_eq!(titles(&gateway.tasks_in(todo)), vec!["A"]);

        assert!(gateway.move_task(a, request).await.is_ok());
        assert_eq!(gateway.calls(Operation::MoveTask), 2);
    }

    #[tokio::test]
    async fn test_create_and_move_column() {
        let (gateway, board, todo, doing) = seeded();

        let done = gateway
            .create_column(
                board,
                CreateColumnRequest {
                    name: "Done".into(),
                    position: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.position, 3);

        gateway
            .move_column(done.id, MoveColumnRequest { position: 1 })
            .await
            .unwrap();
        let order: Vec<ColumnId> = gateway.columns_of(board).iter().map(|c| c.id).collect();
        assert_eq!(order, vec![done.id, todo, doing]);
    }

    #[tokio::test]
    async fn test_create_column_validates_name() {
        let (gateway, board, _, _) = seeded();
        let err = gateway
            .create_column(
                board,
                CreateColumnRequest {
                    name: "  ".into(),
                    position: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_latency_delays_effect() {
        let (gateway, _, todo, doing) = seeded();
        let a = gateway.add_task(todo, "A", 1);
        gateway.set_latency(Operation::MoveTask, Duration::from_millis(50));

        let started = std::time::Instant::now();
        gateway
            .move_task(
                a,
                MoveTaskRequest {
                    to_column_id: doing,
                    position: None,
                },
            )
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
