//! End-to-end behaviour of the board core: grouping, drag sessions and
//! move reconciliation against an in-memory gateway.

use std::sync::Arc;

use kanban_cache::tasks_by_column;
use kanban_client::{BoardAction, BoardController, ClientError, ControllerConfig};
use kanban_drag::{Direction, DragError, DragEvent, EntityRef, Point};
use kanban_gateway::{BoardGateway, GatewayError, InMemoryGateway, Operation};
use kanban_models::{BoardId, Column, ColumnId, TaskId, TaskSummary};
use kanban_reconciler::{MoveIntent, MoveOutcome, Notice};

struct Sprint {
    gateway: Arc<InMemoryGateway>,
    controller: BoardController,
    todo: ColumnId,
    doing: ColumnId,
    done: ColumnId,
    a: TaskId,
    b: TaskId,
}

/// "Sprint 1": To Do [A, B], Doing [], Done [].
async fn sprint() -> Sprint {
    let gateway = Arc::new(InMemoryGateway::new());
    let board = gateway.add_board("Sprint 1");
    let todo = gateway.add_column(board, "To Do", 1);
    let doing = gateway.add_column(board, "Doing", 2);
    let done = gateway.add_column(board, "Done", 3);
    let a = gateway.add_task(todo, "A", 1);
    let b = gateway.add_task(todo, "B", 2);

    let shared: Arc<dyn BoardGateway> = gateway.clone();
    let controller = BoardController::open(shared, board, ControllerConfig::default())
        .await
        .unwrap();

    Sprint {
        gateway,
        controller,
        todo,
        doing,
        done,
        a,
        b,
    }
}

fn center(controller: &BoardController, entity: EntityRef) -> Point {
    controller.rect_of(entity).unwrap().center()
}

fn ids(tasks: &[TaskSummary]) -> Vec<TaskId> {
    tasks.iter().map(|t| t.id).collect()
}

#[test]
fn test_grouping_partitions_tasks_by_column() {
    let board = BoardId::new(1);
    let columns = vec![
        Column::new(ColumnId::new(1), board, "To Do", 1),
        Column::new(ColumnId::new(2), board, "Doing", 2),
        Column::new(ColumnId::new(3), board, "Done", 3),
    ];
    let tasks = vec![
        TaskSummary::builder(TaskId::new(10), ColumnId::new(1), "A").position(1).build(),
        TaskSummary::builder(TaskId::new(11), ColumnId::new(2), "B").position(1).build(),
        TaskSummary::builder(TaskId::new(12), ColumnId::new(1), "C").position(2).build(),
        TaskSummary::builder(TaskId::new(13), ColumnId::new(99), "Orphan").position(1).build(),
    ];

    let buckets = tasks_by_column(&columns, &tasks);

    assert_eq!(buckets.len(), 3);
    assert_eq!(ids(&buckets[&ColumnId::new(1)]), vec![TaskId::new(10), TaskId::new(12)]);
    assert_eq!(ids(&buckets[&ColumnId::new(2)]), vec![TaskId::new(11)]);
    assert!(buckets[&ColumnId::new(3)].is_empty());

    for (column, bucket) in &buckets {
        assert!(bucket.iter().all(|t| t.column_id == *column));
    }
    let mut all: Vec<TaskId> = buckets.values().flat_map(|b| ids(b)).collect();
    all.sort();
    assert_eq!(all, vec![TaskId::new(10), TaskId::new(11), TaskId::new(12)]);
}

#[tokio::test]
async fn test_drop_onto_self_sends_nothing() {
    let mut s = sprint().await;
    let before = s.controller.layout().await;

    // Keyboard: pick up and drop straight away.
    s.controller.pick_up(EntityRef::Task(s.a)).await.unwrap();
    let action = s.controller.key_drop().unwrap();
    assert!(matches!(action, BoardAction::None));

    // Pointer: past the activation distance but still over itself.
    let at = center(&s.controller, EntityRef::Task(s.a));
    s.controller.pointer_down(EntityRef::Task(s.a), at).await.unwrap();
    let events = s.controller.pointer_move(Point::new(at.x + 5.0, at.y));
    assert!(events.contains(&DragEvent::Started(EntityRef::Task(s.a))));
    let action = s.controller.pointer_up(Point::new(at.x + 5.0, at.y)).unwrap();
    assert!(matches!(action, BoardAction::None));

    assert_eq!(s.gateway.move_calls(), 0);
    assert_eq!(s.controller.layout().await, before);
}

#[tokio::test]
async fn test_drag_to_top_goes_below_minimum_position() {
    let mut s = sprint().await;
    let c = s.gateway.add_task(s.todo, "C", 3);
    s.controller.refresh().await.unwrap();

    s.controller.pick_up(EntityRef::Task(c)).await.unwrap();
    s.controller.key_move(Direction::Up).unwrap();
    let over = s.controller.key_move(Direction::Up).unwrap();
    assert!(matches!(over, Some(DragEvent::Over(Some(o))) if o.target == EntityRef::Task(s.a)));

    let BoardAction::Moving(pending) = s.controller.key_drop().unwrap() else {
        panic!("expected a move");
    };

    let layout = s.controller.layout().await;
    assert_eq!(ids(layout.tasks(s.todo)), vec![c, s.a, s.b]);

    let MoveOutcome::Committed(MoveIntent::Task { position, to_column, .. }) =
        pending.outcome().await.unwrap()
    else {
        panic!("expected a committed task move");
    };
    assert_eq!(to_column, s.todo);
    assert!(position < 1);
    assert_eq!(s.gateway.move_calls(), 1);
    assert_eq!(ids(&s.gateway.tasks_in(s.todo)), vec![c, s.a, s.b]);
}

#[tokio::test]
async fn test_failed_move_restores_previous_list() {
    let mut s = sprint().await;
    s.gateway.fail_next(
        Operation::MoveTask,
        GatewayError::Transport("connection reset".into()),
    );
    let mut notices = s.controller.notices();
    let before = s.controller.layout().await;

    let from = center(&s.controller, EntityRef::Task(s.a));
    let to = Point::new(from.x + 296.0, from.y);
    s.controller.pointer_down(EntityRef::Task(s.a), from).await.unwrap();
    s.controller.pointer_move(to);
    let BoardAction::Moving(pending) = s.controller.pointer_up(to).unwrap() else {
        panic!("expected a move");
    };

    let err = pending.outcome().await.unwrap_err();
    assert!(matches!(err, ClientError::Reconcile(ref e) if e.rolled_back()));

    let after = s.controller.layout().await;
    assert_eq!(after, before);
    assert_eq!(after.tasks(s.todo), before.tasks(s.todo));
    assert!(after.tasks(s.doing).is_empty());

    assert!(matches!(notices.try_recv(), Ok(Notice::MoveFailed { .. })));
    assert!(notices.try_recv().is_err());
    assert_eq!(s.gateway.move_calls(), 1);
}

#[tokio::test]
async fn test_second_drag_is_rejected_while_dragging() {
    let mut s = sprint().await;
    let from = center(&s.controller, EntityRef::Task(s.a));
    s.controller.pointer_down(EntityRef::Task(s.a), from).await.unwrap();
    s.controller.pointer_move(Point::new(from.x, from.y + 20.0));
    assert!(s.controller.active_drag().is_some());

    let b = center(&s.controller, EntityRef::Task(s.b));
    let err = s.controller.pointer_down(EntityRef::Task(s.b), b).await.unwrap_err();
    assert!(matches!(err, ClientError::Drag(DragError::AlreadyDragging(_))));
    let err = s.controller.pick_up(EntityRef::Task(s.b)).await.unwrap_err();
    assert!(matches!(err, ClientError::Drag(DragError::AlreadyDragging(_))));

    assert_eq!(
        s.controller.active_drag().map(|d| d.entity().entity_ref()),
        Some(EntityRef::Task(s.a))
    );

    assert_eq!(s.controller.cancel(), Some(DragEvent::Cancelled));
    assert!(s.controller.pick_up(EntityRef::Task(s.b)).await.is_ok());
}

#[tokio::test]
async fn test_small_movement_is_a_click() {
    let mut s = sprint().await;
    let at = center(&s.controller, EntityRef::Task(s.b));

    s.controller.pointer_down(EntityRef::Task(s.b), at).await.unwrap();
    let events = s.controller.pointer_move(Point::new(at.x + 1.5, at.y + 1.5));
    assert!(events.is_empty());
    assert!(s.controller.active_drag().is_none());

    let action = s.controller.pointer_up(Point::new(at.x + 1.5, at.y + 1.5)).unwrap();
    assert!(matches!(action, BoardAction::OpenTask(id) if id == s.b));
    assert_eq!(s.gateway.move_calls(), 0);
}

#[tokio::test]
async fn test_sprint_drag_into_empty_doing() {
    let mut s = sprint().await;
    let doing_before: Vec<i64> = s.gateway.tasks_in(s.doing).iter().map(|t| t.position).collect();

    let from = center(&s.controller, EntityRef::Task(s.a));
    let to = Point::new(from.x + 296.0, from.y);
    s.controller.pointer_down(EntityRef::Task(s.a), from).await.unwrap();
    let events = s.controller.pointer_move(to);
    assert!(events
        .iter()
        .any(|e| matches!(e, DragEvent::Over(Some(o)) if o.target == EntityRef::Column(s.doing))));

    let BoardAction::Moving(pending) = s.controller.pointer_up(to).unwrap() else {
        panic!("expected a move");
    };
    let MoveOutcome::Committed(MoveIntent::Task { task, to_column, position, .. }) =
        pending.outcome().await.unwrap()
    else {
        panic!("expected a committed task move");
    };

    assert_eq!(task, s.a);
    assert_eq!(to_column, s.doing);
    assert!(doing_before.iter().all(|p| position > *p));
    assert_eq!(s.gateway.move_calls(), 1);

    let layout = s.controller.layout().await;
    assert_eq!(ids(layout.tasks(s.doing)), vec![s.a]);
    assert_eq!(ids(layout.tasks(s.todo)), vec![s.b]);
    assert!(layout.tasks(s.done).is_empty());
    assert_eq!(layout.locate(s.a), Some((s.doing, 0)));
}

#[tokio::test]
async fn test_moving_a_deleted_task_reloads_the_board() {
    let mut s = sprint().await;
    let mut notices = s.controller.notices();
    s.gateway.remove_task(s.a);

    let from = center(&s.controller, EntityRef::Task(s.a));
    let to = Point::new(from.x + 296.0, from.y);
    s.controller.pointer_down(EntityRef::Task(s.a), from).await.unwrap();
    s.controller.pointer_move(to);
    let BoardAction::Moving(pending) = s.controller.pointer_up(to).unwrap() else {
        panic!("expected a move");
    };
    assert!(pending.outcome().await.is_err());

    let layout = s.controller.layout().await;
    assert_eq!(layout.locate(s.a), None);
    assert_eq!(ids(layout.tasks(s.todo)), vec![s.b]);

    assert!(matches!(notices.recv().await, Ok(Notice::MoveFailed { .. })));
    assert!(matches!(notices.recv().await, Ok(Notice::StaleBoard(_))));
}
