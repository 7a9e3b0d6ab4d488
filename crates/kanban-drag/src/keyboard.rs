//! Keyboard sensor.
//!
//! A picked-up entity moves one slot at a time in list order. Each move
//! relocates the dragged rect onto the chosen slot and then resolves the
//! target with the same collision and placement routines as the pointer
//! path.

use tracing::debug;

use kanban_models::ColumnId;

use crate::controller::{DragController, DragEvent, DragSession, InputMode, SessionState};
use crate::droppable::{columns_in_order, tasks_in_order};
use crate::entity::{DragEntity, EntityRef};
use crate::error::{DragError, Result};
use crate::geometry::{Point, Rect};

/// Offset from a neighbour's center that keeps slot placement unambiguous.
const KEYBOARD_NUDGE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn vector(self) -> Point {
        match self {
            Direction::Up => Point::new(0.0, -1.0),
            Direction::Down => Point::new(0.0, 1.0),
            Direction::Left => Point::new(-1.0, 0.0),
            Direction::Right => Point::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyboardCursor {
    /// Insertion index among the column's other tasks.
    Task { column: ColumnId, index: usize },
    /// Index into the left-to-right column order.
    Column { index: usize },
}

impl DragController {
    /// Starts a keyboard drag immediately (no activation distance).
    pub fn pick_up(&mut self, entity: DragEntity, rect: Rect) -> Result<DragEvent> {
        self.busy()?;
        let dragged = entity.entity_ref();
        let cursor = self.home_cursor(dragged)?;

        let mut session = DragSession::new(entity, InputMode::Keyboard, rect, rect.center());
        session.cursor = Some(cursor);
        session.over = self.resolve_over(&session);
        self.state = SessionState::Dragging(session);

        debug!(entity = %dragged, "keyboard drag started");
        Ok(DragEvent::Started(dragged))
    }

    /// Moves the picked-up entity one slot. Returns `None` when already at
    /// the edge in that direction.
    pub fn key_move(&mut self, direction: Direction) -> Result<Option<DragEvent>> {
        let mut session = self.keyboard_session()?.clone();
        let dragged = session.entity.entity_ref();
        let home = self.home_cursor(dragged)?;
        let cursor = session.cursor.ok_or(DragError::NotKeyboardDrag)?;

        let next = match cursor {
            KeyboardCursor::Task { column, index } => {
                self.next_task_slot(dragged, column, index, direction)
            }
            KeyboardCursor::Column { index } => self.next_column_slot(index, direction),
        };
        let Some(next) = next else {
            return Ok(None);
        };

        session.rect = if next == home {
            session.origin_rect
        } else {
            self.slot_rect(dragged, next, home, session.origin_rect)
                .ok_or(DragError::UnknownEntity(dragged))?
        };
        session.cursor = Some(next);
        session.direction = direction.vector();

        let over = self.resolve_over(&session);
        session.over = over;
        self.state = SessionState::Dragging(session);
        Ok(Some(DragEvent::Over(over)))
    }

    /// Drops the picked-up entity on its current target.
    pub fn key_drop(&mut self) -> Result<DragEvent> {
        self.keyboard_session()?;
        self.finish()
    }

    fn keyboard_session(&self) -> Result<&DragSession> {
        match &self.state {
            SessionState::Dragging(session) if session.input == InputMode::Keyboard => Ok(session),
            SessionState::Dragging(_) => Err(DragError::NotKeyboardDrag),
            SessionState::Idle => Err(DragError::NotDragging),
        }
    }

    /// Slot the entity occupies in the measured layout.
    fn home_cursor(&self, dragged: EntityRef) -> Result<KeyboardCursor> {
        let unknown = DragError::UnknownEntity(dragged);
        match dragged {
            EntityRef::Task(_) => {
                let column = self
                    .droppables
                    .iter()
                    .find(|d| d.target == dragged)
                    .map(|d| d.column)
                    .ok_or_else(|| unknown.clone())?;
                let index = tasks_in_order(&self.droppables, column, None)
                    .iter()
                    .position(|d| d.target == dragged)
                    .ok_or(unknown)?;
                Ok(KeyboardCursor::Task { column, index })
            }
            EntityRef::Column(_) => {
                let index = columns_in_order(&self.droppables)
                    .iter()
                    .position(|d| d.target == dragged)
                    .ok_or(unknown)?;
                Ok(KeyboardCursor::Column { index })
            }
        }
    }

    fn next_task_slot(
        &self,
        dragged: EntityRef,
        column: ColumnId,
        index: usize,
        direction: Direction,
    ) -> Option<KeyboardCursor> {
        let others = |column| tasks_in_order(&self.droppables, column, Some(dragged)).len();
        let (column, index) = match direction {
            Direction::Up => (column, index.checked_sub(1)?),
            Direction::Down if index < others(column) => (column, index + 1),
            Direction::Down => return None,
            Direction::Left | Direction::Right => {
                let columns = columns_in_order(&self.droppables);
                let current = columns.iter().position(|d| d.column == column)?;
                let next = if direction == Direction::Left {
                    current.checked_sub(1)?
                } else {
                    current + 1
                };
                let target = columns.get(next)?.column;
                (target, index.min(others(target)))
            }
        };
        Some(KeyboardCursor::Task { column, index })
    }

    fn next_column_slot(&self, index: usize, direction: Direction) -> Option<KeyboardCursor> {
        let next = match direction {
            Direction::Left => index.checked_sub(1)?,
            Direction::Right => index + 1,
            Direction::Up | Direction::Down => return None,
        };
        (next < columns_in_order(&self.droppables).len()).then_some(KeyboardCursor::Column { index: next })
    }

    /// Dragged rect positioned on a slot away from home.
    fn slot_rect(
        &self,
        dragged: EntityRef,
        slot: KeyboardCursor,
        home: KeyboardCursor,
        origin: Rect,
    ) -> Option<Rect> {
        match slot {
            KeyboardCursor::Task { column, index } => {
                let others = tasks_in_order(&self.droppables, column, Some(dragged));
                if let Some(next) = others.get(index) {
                    let center = next.rect.center();
                    return Some(origin.with_center(Point::new(center.x, center.y - KEYBOARD_NUDGE)));
                }
                if let Some(last) = others.last() {
                    let center = last.rect.center();
                    return Some(origin.with_center(Point::new(center.x, center.y + KEYBOARD_NUDGE)));
                }
                columns_in_order(&self.droppables)
                    .into_iter()
                    .find(|d| d.column == column)
                    .map(|d| d.rect)
            }
            KeyboardCursor::Column { index } => {
                let target = *columns_in_order(&self.droppables).get(index)?;
                let center = target.rect.center();
                let nudge = match home {
                    KeyboardCursor::Column { index: home } if index < home => -KEYBOARD_NUDGE,
                    _ => KEYBOARD_NUDGE,
                };
                Some(origin.with_center(Point::new(center.x + nudge, center.y)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::OverTarget;
    use crate::metrics::GridMetrics;
    use crate::placement::Placement;
    use kanban_models::{BoardId, Column, TaskId, TaskSummary};

    fn board() -> (DragController, GridMetrics) {
        let metrics = GridMetrics::default();
        let mut controller = DragController::default();
        controller.set_droppables(metrics.measure(&[
            (ColumnId::new(1), vec![TaskId::new(10), TaskId::new(11), TaskId::new(12)]),
            (ColumnId::new(2), vec![TaskId::new(20)]),
            (ColumnId::new(3), vec![]),
        ]));
        (controller, metrics)
    }

    fn over(event: Option<DragEvent>) -> OverTarget {
        match event {
            Some(DragEvent::Over(Some(over))) => over,
            other => panic!("expected a target, got {other:?}"),
        }
    }

    fn pick_task(controller: &mut DragController, metrics: &GridMetrics) {
        let task = TaskSummary::builder(TaskId::new(10), ColumnId::new(1), "A").build();
        controller
            .pick_up(DragEntity::Task(task), metrics.task_rect(0, 0))
            .unwrap();
    }

    #[test]
    fn test_pick_up_targets_self() {
        let (mut controller, metrics) = board();
        pick_task(&mut controller, &metrics);
        let session = controller.active().unwrap();
        assert_eq!(session.input(), InputMode::Keyboard);
        assert_eq!(session.over().unwrap().target, EntityRef::Task(TaskId::new(10)));
        assert!(controller.pointer_up(Point::default()).is_err());
    }

    #[test]
    fn test_move_down_within_column() {
        let (mut controller, metrics) = board();
        pick_task(&mut controller, &metrics);

        let first = over(controller.key_move(Direction::Down).unwrap());
        assert_eq!(first.target, EntityRef::Task(TaskId::new(12)));
        assert_eq!(first.placement, Placement::Before);

        let second = over(controller.key_move(Direction::Down).unwrap());
        assert_eq!(second.target, EntityRef::Task(TaskId::new(12)));
        assert_eq!(second.placement, Placement::After);

        assert_eq!(controller.key_move(Direction::Down).unwrap(), None);
    }

    #[test]
    fn test_returning_home_targets_self() {
        let (mut controller, metrics) = board();
        pick_task(&mut controller, &metrics);
        controller.key_move(Direction::Down).unwrap();
        let back = over(controller.key_move(Direction::Up).unwrap());
        assert_eq!(back.target, EntityRef::Task(TaskId::new(10)));
        assert_eq!(controller.key_move(Direction::Up).unwrap(), None);

        let DragEvent::Dropped(intent) = controller.key_drop().unwrap() else {
            panic!("expected drop");
        };
        assert!(intent.is_noop());
    }

    #[test]
    fn test_move_across_columns() {
        let (mut controller, metrics) = board();
        pick_task(&mut controller, &metrics);

        let doing = over(controller.key_move(Direction::Right).unwrap());
        assert_eq!(doing.target, EntityRef::Task(TaskId::new(20)));
        assert_eq!(doing.placement, Placement::Before);

        let done = over(controller.key_move(Direction::Right).unwrap());
        assert_eq!(done.target, EntityRef::Column(ColumnId::new(3)));
        assert_eq!(done.placement, Placement::Top);
        assert_eq!(controller.key_move(Direction::Right).unwrap(), None);

        let DragEvent::Dropped(intent) = controller.key_drop().unwrap() else {
            panic!("expected drop");
        };
        assert_eq!(intent.over.column, ColumnId::new(3));
        assert!(!controller.is_dragging());
    }

    /// Pointer drag of task 10 whose rect ends up centered on `center`.
    fn pointer_over(metrics: &GridMetrics, center: Point) -> OverTarget {
        let (mut controller, _) = board();
        let rect = metrics.task_rect(0, 0);
        let task = TaskSummary::builder(TaskId::new(10), ColumnId::new(1), "A").build();
        controller.pointer_down(DragEntity::Task(task), rect, rect.center()).unwrap();
        controller.pointer_move(center);
        controller.active().unwrap().over().unwrap()
    }

    #[test]
    fn test_key_move_matches_pointer_drag_to_same_slot() {
        let (_, metrics) = board();
        let slot_center = |column: usize, task: usize| {
            let center = metrics.task_rect(column, task).center();
            Point::new(center.x, center.y - KEYBOARD_NUDGE)
        };

        let (mut controller, _) = board();
        pick_task(&mut controller, &metrics);
        let by_key = over(controller.key_move(Direction::Right).unwrap());
        let by_pointer = pointer_over(&metrics, slot_center(1, 0));
        assert_eq!(by_key, by_pointer);
        assert_eq!(by_pointer.target, EntityRef::Task(TaskId::new(20)));
        assert_eq!(by_pointer.placement, Placement::Before);

        let (mut controller, _) = board();
        pick_task(&mut controller, &metrics);
        let by_key = over(controller.key_move(Direction::Down).unwrap());
        assert_eq!(by_key, pointer_over(&metrics, slot_center(0, 2)));
    }

    #[test]
    fn test_column_moves_horizontally_only() {
        let (mut controller, metrics) = board();
        let column = Column::new(ColumnId::new(1), BoardId::new(1), "To Do", 1);
        controller
            .pick_up(DragEntity::Column(column), metrics.column_rect(0, 3))
            .unwrap();

        assert_eq!(controller.key_move(Direction::Down).unwrap(), None);
        assert_eq!(controller.key_move(Direction::Left).unwrap(), None);

        let right = over(controller.key_move(Direction::Right).unwrap());
        assert_eq!(right.target, EntityRef::Column(ColumnId::new(2)));
        assert_eq!(right.placement, Placement::After);

        let home = over(controller.key_move(Direction::Left).unwrap());
        assert_eq!(home.target, EntityRef::Column(ColumnId::new(1)));
    }

    #[test]
    fn test_keyboard_requires_a_keyboard_drag() {
        let (mut controller, metrics) = board();
        assert_eq!(controller.key_drop().unwrap_err(), DragError::NotDragging);

        let rect = metrics.task_rect(0, 0);
        let task = TaskSummary::builder(TaskId::new(10), ColumnId::new(1), "A").build();
        controller.pointer_down(DragEntity::Task(task.clone()), rect, rect.center()).unwrap();
        controller.pointer_move(Point::new(rect.center().x + 20.0, rect.center().y));
        assert_eq!(
            controller.key_move(Direction::Down).unwrap_err(),
            DragError::NotKeyboardDrag
        );
        assert!(matches!(
            controller.pick_up(DragEntity::Task(task), rect),
            Err(DragError::AlreadyDragging(_))
        ));
    }

    #[test]
    fn test_unknown_entity() {
        let (mut controller, metrics) = board();
        let task = TaskSummary::builder(TaskId::new(99), ColumnId::new(1), "?").build();
        assert_eq!(
            controller.pick_up(DragEntity::Task(task), metrics.task_rect(0, 0)).unwrap_err(),
            DragError::UnknownEntity(EntityRef::Task(TaskId::new(99)))
        );
        assert!(!controller.is_dragging());
    }
}
