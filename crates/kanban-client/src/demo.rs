//! Scripted drag session against an in-memory board.
//!
//! Builds a small "Sprint 1" board, drags the first card into the empty
//! "Doing" column with either the pointer or the keyboard sensor, and
//! prints every event, the reconciliation outcome and the resulting
//! board. With `fail` the move request is rejected so the rollback and
//! the failure notice can be seen.

use std::sync::Arc;
use std::time::Duration;

use kanban_drag::{Direction, DragEvent, EntityRef, Point};
use kanban_gateway::{BoardGateway, GatewayError, InMemoryGateway, Operation};
use kanban_models::{BoardId, ColumnId, TaskId};
use kanban_reconciler::{BoardLayout, MoveOutcome};
use tracing::info;

use crate::board::{BoardAction, BoardController, ControllerConfig};
use crate::error::{ClientError, Result};

/// Steps the pointer takes between press and release.
const POINTER_STEPS: u32 = 8;

/// The demo board and the ids the script refers to.
pub struct DemoBoard {
    pub gateway: Arc<InMemoryGateway>,
    pub board: BoardId,
    pub todo: ColumnId,
    pub doing: ColumnId,
    pub done: ColumnId,
    pub card: TaskId,
}

/// Seeds an in-memory gateway with the "Sprint 1" board.
pub fn seed() -> DemoBoard {
    let gateway = Arc::new(InMemoryGateway::new());
    let board = gateway.add_board("Sprint 1");
    let todo = gateway.add_column(board, "To Do", 1);
    let doing = gateway.add_column(board, "Doing", 2);
    let done = gateway.add_column(board, "Done", 3);

    let card = gateway.add_task(todo, "Design schema", 1);
    gateway.add_task(todo, "Write API", 2);
    gateway.add_task(todo, "Review PR", 3);
    gateway.add_task(done, "Set up repo", 1);

    DemoBoard {
        gateway,
        board,
        todo,
        doing,
        done,
        card,
    }
}

pub async fn run(fail: bool, keyboard: bool) -> Result<()> {
    let demo = seed();
    demo.gateway
        .set_latency(Operation::MoveTask, Duration::from_millis(150));
    if fail {
        demo.gateway.fail_next(
            Operation::MoveTask,
            GatewayError::Server {
                status: 500,
                message: "demo failure".into(),
            },
        );
    }

    let gateway: Arc<dyn BoardGateway> = demo.gateway.clone();
    let mut controller = BoardController::open(gateway, demo.board, ControllerConfig::default()).await?;
    let mut notices = controller.notices();

    println!("Before:");
    print_layout(&controller.layout().await);

    let entity = EntityRef::Task(demo.card);
    let action = if keyboard {
        drag_with_keyboard(&mut controller, entity).await?
    } else {
        drag_with_pointer(&mut controller, entity, demo.doing).await?
    };

    match action {
        BoardAction::Moving(pending) => {
            println!("Optimistic:");
            print_layout(&controller.layout().await);

            match pending.outcome().await {
                Ok(MoveOutcome::Committed(intent)) => {
                    println!("Saved {} at position {}", intent.entity(), intent.position());
                }
                Ok(MoveOutcome::NoOp) => println!("Nothing to save"),
                Err(ClientError::Reconcile(err)) => {
                    info!(error = %err, rolled_back = err.rolled_back(), "Move failed");
                }
                Err(err) => return Err(err),
            }
        }
        BoardAction::OpenTask(task) => println!("Clicked task #{}", task),
        BoardAction::None => println!("Dropped where it started"),
    }

    while let Ok(notice) = notices.try_recv() {
        println!("! {}", notice);
    }

    println!("After:");
    print_layout(&controller.layout().await);
    println!("Move requests sent: {}", demo.gateway.move_calls());
    Ok(())
}

async fn drag_with_pointer(
    controller: &mut BoardController,
    entity: EntityRef,
    to: ColumnId,
) -> Result<BoardAction> {
    let from = controller
        .rect_of(entity)
        .ok_or(kanban_drag::DragError::UnknownEntity(entity))?
        .center();
    let target = controller
        .rect_of(EntityRef::Column(to))
        .ok_or(kanban_drag::DragError::UnknownEntity(EntityRef::Column(to)))?;
    let dest = Point::new(target.center().x, from.y);

    controller.pointer_down(entity, from).await?;
    for step in 1..=POINTER_STEPS {
        let t = f64::from(step) / f64::from(POINTER_STEPS);
        let at = Point::new(from.x + (dest.x - from.x) * t, from.y + (dest.y - from.y) * t);
        for event in controller.pointer_move(at) {
            print_event(&event);
        }
    }
    controller.pointer_up(dest)
}

async fn drag_with_keyboard(controller: &mut BoardController, entity: EntityRef) -> Result<BoardAction> {
    print_event(&controller.pick_up(entity).await?);
    if let Some(event) = controller.key_move(Direction::Right)? {
        print_event(&event);
    }
    controller.key_drop()
}

fn print_event(event: &DragEvent) {
    match event {
        DragEvent::Started(entity) => println!("  start {}", entity),
        DragEvent::Over(Some(over)) => {
            println!("  over {} ({:?})", over.target, over.placement)
        }
        DragEvent::Over(None) => println!("  over nothing"),
        DragEvent::Dropped(intent) => println!("  drop on {}", intent.over.target),
        DragEvent::Cancelled => println!("  cancelled"),
        DragEvent::Click(entity) => println!("  click {}", entity),
    }
}

fn print_layout(layout: &BoardLayout) {
    for column in layout.columns() {
        let titles: Vec<String> = layout
            .tasks(column.id)
            .iter()
            .map(|t| format!("{}({})", t.title, t.position))
            .collect();
        println!("  {:<8} {}", column.name, titles.join(", "));
    }
}
