//! Shared fixtures for unit tests.

use kanban_cache::BoardSnapshot;
use kanban_models::{Board, BoardDetail, BoardId, Column, ColumnId, TaskId, TaskSummary, UserId, Visibility};

use crate::layout::BoardLayout;

/// "Sprint 1": To Do (1) holding A, B, C at positions 1..=3 and an empty Doing (2).
pub(crate) fn layout() -> BoardLayout {
    let board = BoardId::new(1);
    let todo = ColumnId::new(1);
    let doing = ColumnId::new(2);
    let columns = vec![
        Column::new(todo, board, "To Do", 1),
        Column::new(doing, board, "Doing", 2),
    ];
    let tasks = vec![
        TaskSummary::builder(TaskId::new(10), todo, "A").position(1).build(),
        TaskSummary::builder(TaskId::new(11), todo, "B").position(2).build(),
        TaskSummary::builder(TaskId::new(12), todo, "C").position(3).build(),
    ];
    let now = chrono::Utc::now();
    let snapshot = BoardSnapshot {
        board: BoardDetail {
            board: Board {
                id: board,
                name: "Sprint 1".to_string(),
                visibility: Visibility::Private,
                owner_id: UserId::new(1),
                created_at: now,
                updated_at: now,
            },
            columns: columns.clone(),
            members: vec![],
            labels: vec![],
        },
        columns,
        tasks,
    };
    BoardLayout::from_snapshot(&snapshot)
}
