//! Derived per-column view of a board's tasks.

use std::collections::HashMap;

use tracing::debug;

use kanban_models::{sort_tasks, Column, ColumnId, TaskSummary};

/// Groups a flattened task list by column.
///
/// Every column gets an entry, empty if it has no tasks. Tasks whose
/// column is not among `columns` are dropped. Each bucket is ordered by
/// ascending position, ties keeping input order.
pub fn tasks_by_column(
    columns: &[Column],
    tasks: &[TaskSummary],
) -> HashMap<ColumnId, Vec<TaskSummary>> {
    let mut buckets: HashMap<ColumnId, Vec<TaskSummary>> =
        columns.iter().map(|c| (c.id, Vec::new())).collect();

    let mut dropped = 0usize;
    for task in tasks {
        match buckets.get_mut(&task.column_id) {
            Some(bucket) => bucket.push(task.clone()),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "Dropped tasks referencing unknown columns");
    }

    for bucket in buckets.values_mut() {
        sort_tasks(bucket);
    }
    buckets
}
