//! Synthetic board layout.
//!
//! Headless callers (CLI, tests) have no rendered layout to measure, so
//! this computes regions for a conventional board: columns side by side,
//! task cards stacked under a header, and a trailing empty drop area.

use kanban_models::{ColumnId, TaskId};

use crate::droppable::Droppable;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub column_width: f64,
    pub column_gap: f64,
    pub header_height: f64,
    pub padding: f64,
    pub card_height: f64,
    pub card_gap: f64,
    /// Empty area kept below the last card of the tallest column.
    pub footer_height: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            column_width: 280.0,
            column_gap: 16.0,
            header_height: 48.0,
            padding: 8.0,
            card_height: 72.0,
            card_gap: 8.0,
            footer_height: 96.0,
        }
    }
}

impl GridMetrics {
    fn column_x(&self, index: usize) -> f64 {
        index as f64 * (self.column_width + self.column_gap)
    }

    /// Height shared by all columns holding at most `max_tasks` cards.
    pub fn column_height(&self, max_tasks: usize) -> f64 {
        self.header_height + max_tasks as f64 * (self.card_height + self.card_gap) + self.footer_height
    }

    pub fn column_rect(&self, index: usize, max_tasks: usize) -> Rect {
        Rect::new(self.column_x(index), 0.0, self.column_width, self.column_height(max_tasks))
    }

    pub fn task_rect(&self, column_index: usize, task_index: usize) -> Rect {
        Rect::new(
            self.column_x(column_index) + self.padding,
            self.header_height + task_index as f64 * (self.card_height + self.card_gap),
            self.column_width - 2.0 * self.padding,
            self.card_height,
        )
    }

    /// Regions for ordered columns and their ordered tasks. Each column
    /// is registered before its tasks.
    pub fn measure(&self, columns: &[(ColumnId, Vec<TaskId>)]) -> Vec<Droppable> {
        let max_tasks = columns.iter().map(|(_, tasks)| tasks.len()).max().unwrap_or(0);
        let mut droppables = Vec::new();
        for (column_index, (column, tasks)) in columns.iter().enumerate() {
            droppables.push(Droppable::for_column(
                *column,
                self.column_rect(column_index, max_tasks),
            ));
            for (task_index, task) in tasks.iter().enumerate() {
                droppables.push(Droppable::for_task(
                    *task,
                    *column,
                    self.task_rect(column_index, task_index),
                ));
            }
        }
        droppables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRef;

    #[test]
    fn test_measure_layout() {
        let metrics = GridMetrics::default();
        let c1 = ColumnId::new(1);
        let c2 = ColumnId::new(2);
        let droppables = metrics.measure(&[
            (c1, vec![TaskId::new(10), TaskId::new(11)]),
            (c2, vec![]),
        ]);

        assert_eq!(droppables.len(), 4);
        assert_eq!(droppables[0].target, EntityRef::Column(c1));
        assert_eq!(droppables[3].target, EntityRef::Column(c2));
        assert_eq!(droppables[3].rect.x, 296.0);
        // Cards are stacked inside their column.
        assert!(droppables[2].rect.top() > droppables[1].rect.bottom());
        assert!(droppables[0].rect.bottom() > droppables[2].rect.bottom());
        assert_eq!(droppables[0].rect.height, droppables[3].rect.height);
    }
}
