//! Drag session state machine for pointer input.
//!
//! A press records a pending activation. The drag only starts once the
//! pointer has moved at least [`DragConfig::activation_distance`]; a
//! release before that is reported as a click. While dragging, every
//! move recomputes the hovered target with the configured
//! [`CollisionStrategy`] and the result is handed out on release as a
//! [`DropIntent`].

use tracing::{debug, trace};

use kanban_models::ColumnId;

use crate::collision::{ClosestCorners, CollisionStrategy, DEFAULT_TIE_EPSILON};
use crate::droppable::{tasks_in_order, Droppable};
use crate::entity::{DragEntity, EntityKind, EntityRef};
use crate::error::{DragError, Result};
use crate::geometry::{Point, Rect};
use crate::keyboard::KeyboardCursor;
use crate::placement::{self, Placement};

/// Default pointer travel, in pixels, before a press becomes a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 3.0;

/// Drag controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    pub activation_distance: f64,
    pub tie_epsilon: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }
}

impl DragConfig {
    pub fn with_activation_distance(mut self, distance: f64) -> Self {
        self.activation_distance = distance;
        self
    }

    pub fn with_tie_epsilon(mut self, epsilon: f64) -> Self {
        self.tie_epsilon = epsilon;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Pointer,
    Keyboard,
}

/// The region currently hovered and where a drop would land relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverTarget {
    pub target: EntityRef,
    /// Column owning the target (the target itself for columns).
    pub column: ColumnId,
    pub placement: Placement,
}

/// An active drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub(crate) entity: DragEntity,
    pub(crate) input: InputMode,
    pub(crate) origin_rect: Rect,
    pub(crate) rect: Rect,
    pub(crate) over: Option<OverTarget>,
    pub(crate) pointer_origin: Point,
    pub(crate) last_pointer: Point,
    /// Sign of the most recent movement on each axis.
    pub(crate) direction: Point,
    pub(crate) cursor: Option<KeyboardCursor>,
}

impl DragSession {
    pub(crate) fn new(entity: DragEntity, input: InputMode, rect: Rect, pointer: Point) -> Self {
        Self {
            entity,
            input,
            origin_rect: rect,
            rect,
            over: None,
            pointer_origin: pointer,
            last_pointer: pointer,
            direction: Point::default(),
            cursor: None,
        }
    }

    /// Pre-drag copy of the dragged entity, for the floating preview.
    pub fn entity(&self) -> &DragEntity {
        &self.entity
    }

    pub fn input(&self) -> InputMode {
        self.input
    }

    /// Where the preview is drawn now.
    pub fn ghost_rect(&self) -> Rect {
        self.rect
    }

    pub fn origin_rect(&self) -> Rect {
        self.origin_rect
    }

    pub fn over(&self) -> Option<OverTarget> {
        self.over
    }

    fn track_direction(&mut self, delta: Point) {
        if delta.x != 0.0 {
            self.direction.x = delta.x.signum();
        }
        if delta.y != 0.0 {
            self.direction.y = delta.y.signum();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Dragging(DragSession),
}

/// What a completed drag asks the reconciler to do.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIntent {
    pub dragged: DragEntity,
    pub over: OverTarget,
}

impl DropIntent {
    /// Dropped onto itself.
    pub fn is_noop(&self) -> bool {
        self.dragged.entity_ref() == self.over.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    Started(EntityRef),
    Over(Option<OverTarget>),
    Dropped(DropIntent),
    Cancelled,
    /// Press and release without reaching the activation distance.
    Click(EntityRef),
}

#[derive(Debug, Clone)]
struct PendingPress {
    entity: DragEntity,
    rect: Rect,
    at: Point,
}

/// Tracks at most one drag at a time and resolves what it hovers.
pub struct DragController {
    pub(crate) config: DragConfig,
    strategy: Box<dyn CollisionStrategy>,
    pub(crate) droppables: Vec<Droppable>,
    pub(crate) state: SessionState,
    pending: Option<PendingPress>,
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("config", &self.config)
            .field("droppables", &self.droppables.len())
            .field("state", &self.state)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(DragConfig::default())
    }
}

impl DragController {
    /// Creates a controller using closest-corners detection.
    pub fn new(config: DragConfig) -> Self {
        let strategy = Box::new(ClosestCorners::new(config.tie_epsilon));
        Self {
            config,
            strategy,
            droppables: Vec::new(),
            state: SessionState::Idle,
            pending: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn CollisionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Replaces the measured drop regions.
    pub fn set_droppables(&mut self, droppables: Vec<Droppable>) {
        self.droppables = droppables;
    }

    pub fn droppables(&self) -> &[Droppable] {
        &self.droppables
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SessionState::Dragging(_))
    }

    /// The active drag, if any.
    pub fn active(&self) -> Option<&DragSession> {
        match &self.state {
            SessionState::Dragging(session) => Some(session),
            SessionState::Idle => None,
        }
    }

    pub(crate) fn busy(&self) -> Result<()> {
        if let Some(session) = self.active() {
            return Err(DragError::AlreadyDragging(session.entity.entity_ref()));
        }
        if let Some(pending) = &self.pending {
            return Err(DragError::AlreadyDragging(pending.entity.entity_ref()));
        }
        Ok(())
    }

    /// Pointer pressed on a draggable whose current bounds are `rect`.
    pub fn pointer_down(&mut self, entity: DragEntity, rect: Rect, at: Point) -> Result<()> {
        self.busy()?;
        trace!(entity = %entity.entity_ref(), "pointer down");
        self.pending = Some(PendingPress { entity, rect, at });
        Ok(())
    }

    /// Pointer moved. Returns the events this movement produced.
    pub fn pointer_move(&mut self, at: Point) -> Vec<DragEvent> {
        let mut events = Vec::new();

        if let Some(pending) = self.pending.take() {
            if at.distance(pending.at) < self.config.activation_distance {
                self.pending = Some(pending);
                return events;
            }
            let entity = pending.entity.entity_ref();
            debug!(entity = %entity, "drag started");
            let session = DragSession::new(pending.entity, InputMode::Pointer, pending.rect, pending.at);
            self.state = SessionState::Dragging(session);
            events.push(DragEvent::Started(entity));
        }

        let over = {
            let SessionState::Dragging(session) = &mut self.state else {
                return events;
            };
            if session.input != InputMode::Pointer {
                return events;
            }
            session.track_direction(at.delta_from(session.last_pointer));
            session.last_pointer = at;
            session.rect = session.origin_rect.translate(at.delta_from(session.pointer_origin));
            let session = session.clone();
            self.resolve_over(&session)
        };

        if self.update_over(over) {
            events.push(DragEvent::Over(over));
        }
        events
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, at: Point) -> Result<DragEvent> {
        if let Some(pending) = self.pending.take() {
            let entity = pending.entity.entity_ref();
            debug!(entity = %entity, "press released below activation distance");
            return Ok(DragEvent::Click(entity));
        }
        match self.active() {
            Some(session) if session.input == InputMode::Pointer => {}
            Some(_) => return Err(DragError::NotPointerDrag),
            None => return Err(DragError::NotDragging),
        }
        self.pointer_move(at);
        self.finish()
    }

    /// Abandons the active drag or pending press. The layout is untouched.
    pub fn cancel(&mut self) -> Option<DragEvent> {
        self.pending = None;
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Dragging(session) => {
                debug!(entity = %session.entity.entity_ref(), "drag cancelled");
                Some(DragEvent::Cancelled)
            }
            SessionState::Idle => None,
        }
    }

    /// Ends the active drag, yielding its drop intent.
    pub(crate) fn finish(&mut self) -> Result<DragEvent> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Dragging(session) => match session.over {
                Some(over) => {
                    debug!(
                        entity = %session.entity.entity_ref(),
                        target = %over.target,
                        placement = ?over.placement,
                        "drag dropped"
                    );
                    Ok(DragEvent::Dropped(DropIntent {
                        dragged: session.entity,
                        over,
                    }))
                }
                None => {
                    debug!(entity = %session.entity.entity_ref(), "dropped outside any target");
                    Ok(DragEvent::Cancelled)
                }
            },
            SessionState::Idle => Err(DragError::NotDragging),
        }
    }

    /// Stores a newly resolved target. Returns true when it changed.
    pub(crate) fn update_over(&mut self, over: Option<OverTarget>) -> bool {
        let SessionState::Dragging(session) = &mut self.state else {
            return false;
        };
        if session.over == over {
            return false;
        }
        trace!(target = ?over.map(|o| o.target), "drag over");
        session.over = over;
        true
    }

    /// Runs collision detection and placement for the session's current rect.
    pub(crate) fn resolve_over(&self, session: &DragSession) -> Option<OverTarget> {
        let dragged = session.entity.entity_ref();
        let candidates: Vec<&Droppable> = match dragged.kind() {
            EntityKind::Column => self
                .droppables
                .iter()
                .filter(|d| d.kind() == EntityKind::Column)
                .collect(),
            EntityKind::Task => self.droppables.iter().collect(),
        };
        let winner = *candidates.get(self.strategy.detect(&session.rect, &candidates)?)?;

        let placement = match (dragged.kind(), winner.target) {
            (_, target) if target == dragged => Placement::Before,
            (EntityKind::Task, EntityRef::Task(_)) => {
                placement::vertical(&session.rect, &winner.rect, session.direction.y)
            }
            (EntityKind::Task, EntityRef::Column(column)) => {
                let last = tasks_in_order(&self.droppables, column, Some(dragged))
                    .last()
                    .map(|d| d.rect);
                placement::column_edge(&session.rect, last.as_ref(), session.direction.y)
            }
            (EntityKind::Column, _) => {
                placement::horizontal(&session.rect, &winner.rect, session.direction.x)
            }
        };

        Some(OverTarget {
            target: winner.target,
            column: winner.column,
            placement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::GridMetrics;
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

    fn task(id: i64, column: i64) -> DragEntity {
        DragEntity::Task(TaskSummary::builder(TaskId::new(id), ColumnId::new(column), "t").build())
    }

    fn press(controller: &mut DragController, metrics: &GridMetrics, id: i64, ci: usize, ti: usize) -> Point {
        let rect = metrics.task_rect(ci, ti);
        let at = rect.center();
        controller
            .pointer_down(task(id, ci as i64 + 1), rect, at)
            .unwrap();
        at
    }

    #[test]
    fn test_small_movement_is_a_click() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 10, 0, 0);

        assert!(controller.pointer_move(Point::new(at.x + 2.0, at.y)).is_empty());
        assert!(!controller.is_dragging());
        assert_eq!(
            controller.pointer_up(Point::new(at.x + 2.0, at.y)).unwrap(),
            DragEvent::Click(EntityRef::Task(TaskId::new(10)))
        );
        assert_eq!(controller.state(), &SessionState::Idle);
    }

    #[test]
    fn test_activation_then_drop_on_self_is_noop() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 11, 0, 1);

        let events = controller.pointer_move(Point::new(at.x, at.y + 5.0));
        assert_eq!(events[0], DragEvent::Started(EntityRef::Task(TaskId::new(11))));
        assert!(controller.is_dragging());
        assert_eq!(
            controller.active().unwrap().ghost_rect(),
            metrics.task_rect(0, 1).translate(Point::new(0.0, 5.0))
        );

        let DragEvent::Dropped(intent) = controller.pointer_up(Point::new(at.x, at.y + 5.0)).unwrap() else {
            panic!("expected drop");
        };
        assert!(intent.is_noop());
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_second_drag_is_rejected() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 10, 0, 0);
        controller.pointer_move(Point::new(at.x + 10.0, at.y));
        assert!(controller.is_dragging());

        let err = controller
            .pointer_down(task(20, 2), metrics.task_rect(1, 0), metrics.task_rect(1, 0).center())
            .unwrap_err();
        assert_eq!(err, DragError::AlreadyDragging(EntityRef::Task(TaskId::new(10))));
        assert_eq!(
            controller.active().unwrap().entity().entity_ref(),
            EntityRef::Task(TaskId::new(10))
        );
    }

    #[test]
    fn test_drag_down_over_next_task_places_after() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 10, 0, 0);
        // Slightly past the next card's center.
        let events = controller.pointer_move(Point::new(at.x, at.y + 85.0));
        let over = controller.active().unwrap().over().unwrap();
        assert!(events.contains(&DragEvent::Over(Some(over))));
        assert_eq!(over.target, EntityRef::Task(TaskId::new(11)));
        assert_eq!(over.placement, Placement::After);
    }

    #[test]
    fn test_drag_up_over_previous_task_places_before() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 12, 0, 2);
        controller.pointer_move(Point::new(at.x, at.y - 165.0));
        let over = controller.active().unwrap().over().unwrap();
        assert_eq!(over.target, EntityRef::Task(TaskId::new(10)));
        assert_eq!(over.placement, Placement::Before);
    }

    #[test]
    fn test_drag_into_empty_column() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 10, 0, 0);
        let dx = metrics.column_width + metrics.column_gap;
        controller.pointer_move(Point::new(at.x + dx, at.y));
        controller.pointer_move(Point::new(at.x + 2.0 * dx, at.y));

        let DragEvent::Dropped(intent) = controller.pointer_up(Point::new(at.x + 2.0 * dx, at.y)).unwrap() else {
            panic!("expected drop");
        };
        assert_eq!(intent.over.target, EntityRef::Column(ColumnId::new(3)));
        assert_eq!(intent.over.column, ColumnId::new(3));
        assert!(!intent.is_noop());
    }

    #[test]
    fn test_column_drag_only_targets_columns() {
        let (mut controller, metrics) = board();
        let rect = metrics.column_rect(0, 3);
        let at = rect.center();
        let column = DragEntity::Column(Column::new(ColumnId::new(1), BoardId::new(1), "To Do", 1));
        controller.pointer_down(column, rect, at).unwrap();
        controller.pointer_move(Point::new(at.x + 300.0, at.y));

        let over = controller.active().unwrap().over().unwrap();
        assert_eq!(over.target, EntityRef::Column(ColumnId::new(2)));
        assert_eq!(over.placement, Placement::After);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let (mut controller, metrics) = board();
        let at = press(&mut controller, &metrics, 10, 0, 0);
        controller.pointer_move(Point::new(at.x + 40.0, at.y));

        assert_eq!(controller.cancel(), Some(DragEvent::Cancelled));
        assert!(controller.active().is_none());
        assert_eq!(controller.cancel(), None);
        assert_eq!(controller.pointer_up(at).unwrap_err(), DragError::NotDragging);
    }
}
