//! Turning a drop into a concrete move.

use kanban_drag::{DropIntent, EntityRef, Placement};
use kanban_models::{ColumnId, TaskId};

use crate::error::{ReconcileError, Result};
use crate::layout::BoardLayout;
use crate::position::position_at;

/// A move to persist: destination list index plus the position sent to
/// the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Task {
        task: TaskId,
        from_column: ColumnId,
        to_column: ColumnId,
        /// Index among the destination's other tasks.
        index: usize,
        position: i64,
    },
    Column {
        column: ColumnId,
        /// Index among the board's other columns.
        index: usize,
        position: i64,
    },
}

impl MoveIntent {
    pub fn entity(&self) -> EntityRef {
        match self {
            MoveIntent::Task { task, .. } => EntityRef::Task(*task),
            MoveIntent::Column { column, .. } => EntityRef::Column(*column),
        }
    }

    pub fn position(&self) -> i64 {
        match self {
            MoveIntent::Task { position, .. } | MoveIntent::Column { position, .. } => *position,
        }
    }
}

/// Where in a column's list a task should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Top,
    Bottom,
    /// Index among the column's other tasks, clamped to the end.
    Index(usize),
}

fn after(placement: Placement) -> bool {
    matches!(placement, Placement::After | Placement::Bottom)
}

/// Plans the move a drop asks for. `None` means nothing would change.
pub fn plan_move(layout: &BoardLayout, drop: &DropIntent) -> Result<Option<MoveIntent>> {
    if drop.is_noop() {
        return Ok(None);
    }
    let over = drop.over;
    let stale = || ReconcileError::StaleReference(over.target);

    match drop.dragged.entity_ref() {
        EntityRef::Task(task) => {
            let (column, slot) = match over.target {
                EntityRef::Task(target) => {
                    let (column, _) = layout.locate(target).ok_or_else(stale)?;
                    let index = layout
                        .tasks(column)
                        .iter()
                        .filter(|t| t.id != task)
                        .position(|t| t.id == target)
                        .ok_or_else(stale)?;
                    let index = if after(over.placement) { index + 1 } else { index };
                    (column, Slot::Index(index))
                }
                EntityRef::Column(column) => {
                    let slot = if after(over.placement) { Slot::Bottom } else { Slot::Top };
                    (column, slot)
                }
            };
            plan_task_to(layout, task, column, slot)
        }
        EntityRef::Column(column) => {
            let target = match over.target {
                EntityRef::Column(target) => target,
                EntityRef::Task(_) => over.column,
            };
            if target == column {
                return Ok(None);
            }
            let index = layout
                .columns()
                .iter()
                .filter(|c| c.id != column)
                .position(|c| c.id == target)
                .ok_or(ReconcileError::StaleReference(EntityRef::Column(target)))?;
            let index = if after(over.placement) { index + 1 } else { index };
            plan_column_to(layout, column, index)
        }
    }
}

/// Plans moving a task into `column` at `slot`.
pub fn plan_task_to(
    layout: &BoardLayout,
    task: TaskId,
    column: ColumnId,
    slot: Slot,
) -> Result<Option<MoveIntent>> {
    let (from_column, from_index) = layout
        .locate(task)
        .ok_or(ReconcileError::StaleReference(EntityRef::Task(task)))?;
    if layout.column(column).is_none() {
        return Err(ReconcileError::StaleReference(EntityRef::Column(column)));
    }

    let siblings: Vec<i64> = layout
        .tasks(column)
        .iter()
        .filter(|t| t.id != task)
        .map(|t| t.position)
        .collect();
    let index = match slot {
        Slot::Top => 0,
        Slot::Bottom => siblings.len(),
        Slot::Index(index) => index.min(siblings.len()),
    };
    if column == from_column && index == from_index {
        return Ok(None);
    }

    Ok(Some(MoveIntent::Task {
        task,
        from_column,
        to_column: column,
        index,
        position: position_at(&siblings, index),
    }))
}

/// Plans moving a column to `index` among the other columns.
pub fn plan_column_to(layout: &BoardLayout, column: ColumnId, index: usize) -> Result<Option<MoveIntent>> {
    let from = layout
        .column_index(column)
        .ok_or(ReconcileError::StaleReference(EntityRef::Column(column)))?;
    let siblings: Vec<i64> = layout
        .columns()
        .iter()
        .filter(|c| c.id != column)
        .map(|c| c.position)
        .collect();
    let index = index.min(siblings.len());
    if index == from {
        return Ok(None);
    }

    Ok(Some(MoveIntent::Column {
        column,
        index,
        position: position_at(&siblings, index),
    }))
}
