//! Builders for locally constructed entities.
//!
//! The in-memory gateway and tests create tasks and columns without a
//! server; these builders fill the fields a server would otherwise assign.

use crate::column::Column;
use crate::ids::{BoardId, ColumnId, TaskId};
use crate::label::LabelBrief;
use crate::task::{TaskStatus, TaskSummary};

/// Builder for [`TaskSummary`] values with a fluent API.
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    id: TaskId,
    column_id: ColumnId,
    title: String,
    position: i64,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<String>,
    labels: Vec<LabelBrief>,
}

impl TaskBuilder {
    /// Creates a builder with the required fields. Position defaults to 1.
    pub fn new(id: TaskId, column_id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            id,
            column_id,
            title: title.into(),
            position: 1,
            description: None,
            status: TaskStatus::Open,
            due_date: None,
            labels: Vec::new(),
        }
    }

    pub fn position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn due(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    /// Adds a label.
    pub fn label(mut self, label: LabelBrief) -> Self {
        self.labels.push(label);
        self
    }

    pub fn build(self) -> TaskSummary {
        TaskSummary {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            position: self.position,
            column_id: self.column_id,
            due_date: self.due_date,
            labels: self.labels,
        }
    }
}

/// Builder for [`Column`] values.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    id: ColumnId,
    board_id: BoardId,
    name: String,
    position: i64,
}

impl ColumnBuilder {
    pub fn new(id: ColumnId, board_id: BoardId, name: impl Into<String>) -> Self {
        Self {
            id,
            board_id,
            name: name.into(),
            position: 1,
        }
    }

    pub fn position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    pub fn build(self) -> Column {
        Column::new(self.id, self.board_id, self.name, self.position)
    }
}

impl TaskSummary {
    /// Creates a builder for a task.
    pub fn builder(id: TaskId, column_id: ColumnId, title: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(id, column_id, title)
    }
}

impl Column {
    /// Creates a builder for a column.
    pub fn builder(id: ColumnId, board_id: BoardId, name: impl Into<String>) -> ColumnBuilder {
        ColumnBuilder::new(id, board_id, name)
    }
}
