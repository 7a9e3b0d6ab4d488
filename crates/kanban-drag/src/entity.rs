//! What can be dragged and what can be dropped on.

use std::fmt;

use kanban_models::{Column, ColumnId, TaskId, TaskSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Column,
    Task,
}

/// Identity of a draggable or droppable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Column(ColumnId),
    Task(TaskId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Column(_) => EntityKind::Column,
            EntityRef::Task(_) => EntityKind::Task,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Column(id) => write!(f, "column:{id}"),
            EntityRef::Task(id) => write!(f, "task:{id}"),
        }
    }
}

/// The dragged entity with a copy of its pre-drag data, used to render
/// the floating preview.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEntity {
    Column(Column),
    Task(TaskSummary),
}

impl DragEntity {
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            DragEntity::Column(column) => EntityRef::Column(column.id),
            DragEntity::Task(task) => EntityRef::Task(task.id),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.entity_ref().kind()
    }

    /// Column the entity lives in (a column's own id for columns).
    pub fn column_id(&self) -> ColumnId {
        match self {
            DragEntity::Column(column) => column.id,
            DragEntity::Task(task) => task.column_id,
        }
    }

    /// Preview label.
    pub fn title(&self) -> &str {
        match self {
            DragEntity::Column(column) => &column.name,
            DragEntity::Task(task) => &task.title,
        }
    }
}
