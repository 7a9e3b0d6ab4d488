//! The gateway seam used by the board core.

use async_trait::async_trait;

use kanban_models::{
    BoardDetail, BoardId, Column, ColumnId, CreateColumnRequest, MoveColumnRequest,
    MoveTaskRequest, TaskDetail, TaskId, TaskSummary,
};

use crate::error::Result;

/// Remote operations the board cache and move reconciler depend on.
///
/// Implemented over HTTP by [`HttpGateway`](crate::HttpGateway) and in
/// memory by [`InMemoryGateway`](crate::InMemoryGateway). The trait is
/// object-safe so the core can hold an `Arc<dyn BoardGateway>`.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Fetches a board with its embedded columns, members and labels.
    async fn get_board(&self, board: BoardId) -> Result<BoardDetail>;

    /// Fetches the columns of a board.
    async fn list_columns(&self, board: BoardId) -> Result<Vec<Column>>;

    /// Fetches the task summaries of one column.
    async fn list_tasks(&self, column: ColumnId) -> Result<Vec<TaskSummary>>;

    /// Moves a task to a column and position in a single call.
    async fn move_task(&self, task: TaskId, request: MoveTaskRequest) -> Result<TaskDetail>;

    /// Creates a column on a board.
    async fn create_column(&self, board: BoardId, request: CreateColumnRequest) -> Result<Column>;

    /// Moves a column to a new position within its board.
    async fn move_column(&self, column: ColumnId, request: MoveColumnRequest) -> Result<Column>;
}
