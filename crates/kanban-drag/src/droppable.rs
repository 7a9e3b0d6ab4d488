//! Measured drop regions.

use kanban_models::{ColumnId, TaskId};

use crate::entity::{EntityKind, EntityRef};
use crate::geometry::Rect;

/// A region that can receive a drop, as measured from the rendered layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Droppable {
    pub target: EntityRef,
    pub rect: Rect,
    /// Nesting depth; task cards sit inside column bodies.
    pub depth: u32,
    /// Owning column (the column itself for column regions).
    pub column: ColumnId,
}

impl Droppable {
    pub fn for_column(id: ColumnId, rect: Rect) -> Self {
        Self {
            target: EntityRef::Column(id),
            rect,
            depth: 0,
            column: id,
        }
    }

    pub fn for_task(id: TaskId, column: ColumnId, rect: Rect) -> Self {
        Self {
            target: EntityRef::Task(id),
            rect,
            depth: 1,
            column,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.target.kind()
    }
}

/// Column regions ordered left to right, ties in registration order.
pub(crate) fn columns_in_order(droppables: &[Droppable]) -> Vec<&Droppable> {
    let mut columns: Vec<&Droppable> = droppables
        .iter()
        .filter(|d| d.kind() == EntityKind::Column)
        .collect();
    columns.sort_by(|a, b| a.rect.x.total_cmp(&b.rect.x));
    columns
}

/// Task regions of a column ordered top to bottom, optionally skipping one task.
pub(crate) fn tasks_in_order(
    droppables: &[Droppable],
    column: ColumnId,
    skip: Option<EntityRef>,
) -> Vec<&Droppable> {
    let mut tasks: Vec<&Droppable> = droppables
        .iter()
        .filter(|d| d.kind() == EntityKind::Task && d.column == column)
        .filter(|d| Some(d.target) != skip)
        .collect();
    tasks.sort_by(|a, b| a.rect.y.total_cmp(&b.rect.y));
    tasks
}
