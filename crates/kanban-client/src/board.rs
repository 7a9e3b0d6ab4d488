//! BoardController - one open board.
//!
//! Composes the board cache, the visible layout, the drag controller and
//! the move reconciler. Input handlers return a [`BoardAction`]: clicks
//! on cards open the task, drops start a reconciliation that runs in the
//! background so input keeps flowing while the request is pending.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use kanban_cache::{BoardCache, QueryKey};
use kanban_drag::{
    Direction, DragConfig, DragController, DragEntity, DragEvent, DragSession, Droppable,
    EntityRef, GridMetrics, Point,
};
use kanban_gateway::BoardGateway;
use kanban_models::{BoardId, Column, ColumnId, CreateColumnRequest, TaskId};
use kanban_reconciler::{
    BoardLayout, MoveOutcome, MoveReconciler, Notice, OptimisticLayout, ReconcilerConfig,
    SharedLayout, Slot,
};

use crate::error::{ClientError, Result};

/// Settings for a [`BoardController`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    pub drag: DragConfig,
    pub reconciler: ReconcilerConfig,
    pub metrics: GridMetrics,
}

impl ControllerConfig {
    pub fn with_drag(mut self, drag: DragConfig) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_reconciler(mut self, reconciler: ReconcilerConfig) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn with_metrics(mut self, metrics: GridMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

/// A reconciliation running in the background.
#[derive(Debug)]
pub struct PendingMove {
    entity: EntityRef,
    handle: JoinHandle<kanban_reconciler::Result<MoveOutcome>>,
}

impl PendingMove {
    pub fn entity(&self) -> EntityRef {
        self.entity
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the server's verdict.
    pub async fn outcome(self) -> Result<MoveOutcome> {
        match self.handle.await {
            Ok(result) => Ok(result?),
            Err(err) => Err(ClientError::MoveTask(err.to_string())),
        }
    }
}

/// What the host should do after a release.
#[derive(Debug)]
pub enum BoardAction {
    None,
    /// A card was clicked: show its detail view.
    OpenTask(TaskId),
    /// A drop was handed to the reconciler.
    Moving(PendingMove),
}

pub struct BoardController {
    board_id: BoardId,
    cache: Arc<BoardCache>,
    reconciler: MoveReconciler,
    layout: SharedLayout,
    drag: DragController,
    metrics: GridMetrics,
}

impl std::fmt::Debug for BoardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardController")
            .field("board_id", &self.board_id)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

impl BoardController {
    /// Loads a board and prepares it for interaction.
    pub async fn open(
        gateway: Arc<dyn BoardGateway>,
        board_id: BoardId,
        config: ControllerConfig,
    ) -> Result<Self> {
        let cache = Arc::new(BoardCache::new(gateway));
        Self::open_with_cache(cache, board_id, config).await
    }

    /// Like [`open`](Self::open) but shares an existing cache.
    pub async fn open_with_cache(
        cache: Arc<BoardCache>,
        board_id: BoardId,
        config: ControllerConfig,
    ) -> Result<Self> {
        let snapshot = cache.load(board_id).await?;
        let layout = BoardLayout::from_snapshot(&snapshot);
        info!(
            board_id = %board_id,
            board = %snapshot.board.name(),
            columns = layout.columns().len(),
            tasks = layout.task_count(),
            "Board opened"
        );

        let mut drag = DragController::new(config.drag);
        drag.set_droppables(config.metrics.measure(&layout.slots()));

        Ok(Self {
            board_id,
            reconciler: MoveReconciler::new(cache.clone(), config.reconciler),
            cache,
            layout: Arc::new(RwLock::new(OptimisticLayout::new(layout))),
            drag,
            metrics: config.metrics,
        })
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Copy of the visible layout.
    pub async fn layout(&self) -> BoardLayout {
        self.layout.read().await.view().clone()
    }

    pub fn shared_layout(&self) -> SharedLayout {
        self.layout.clone()
    }

    pub fn cache(&self) -> &Arc<BoardCache> {
        &self.cache
    }

    pub fn reconciler(&self) -> &MoveReconciler {
        &self.reconciler
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// The active drag, for rendering the floating preview.
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.active()
    }

    pub fn droppables(&self) -> &[Droppable] {
        self.drag.droppables()
    }

    /// Region of an entity in the current layout.
    pub fn rect_of(&self, entity: EntityRef) -> Option<kanban_drag::Rect> {
        self.drag
            .droppables()
            .iter()
            .find(|d| d.target == entity)
            .map(|d| d.rect)
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.reconciler.subscribe()
    }

    async fn remeasure(&mut self) {
        if self.drag.is_dragging() {
            return;
        }
        let slots = self.layout.read().await.view().slots();
        self.drag.set_droppables(self.metrics.measure(&slots));
    }

    async fn drag_entity(&self, entity: EntityRef) -> Result<DragEntity> {
        let guard = self.layout.read().await;
        let layout = guard.view();
        match entity {
            EntityRef::Task(id) => layout
                .task(id)
                .cloned()
                .map(DragEntity::Task)
                .ok_or(ClientError::NotOnBoard { kind: TaskId::kind(), id: id.get() }),
            EntityRef::Column(id) => layout
                .column(id)
                .cloned()
                .map(DragEntity::Column)
                .ok_or(ClientError::NotOnBoard { kind: ColumnId::kind(), id: id.get() }),
        }
    }

    // --- Pointer input ---

    pub async fn pointer_down(&mut self, entity: EntityRef, at: Point) -> Result<()> {
        self.remeasure().await;
        let dragged = self.drag_entity(entity).await?;
        let rect = self
            .rect_of(entity)
            .ok_or(kanban_drag::DragError::UnknownEntity(entity))?;
        self.drag.pointer_down(dragged, rect, at)?;
        Ok(())
    }

    pub fn pointer_move(&mut self, at: Point) -> Vec<DragEvent> {
        self.drag.pointer_move(at)
    }

    pub fn pointer_up(&mut self, at: Point) -> Result<BoardAction> {
        let event = self.drag.pointer_up(at)?;
        Ok(self.handle_end(event))
    }

    // --- Keyboard input ---

    pub async fn pick_up(&mut self, entity: EntityRef) -> Result<DragEvent> {
        self.remeasure().await;
        let dragged = self.drag_entity(entity).await?;
        let rect = self
            .rect_of(entity)
            .ok_or(kanban_drag::DragError::UnknownEntity(entity))?;
        Ok(self.drag.pick_up(dragged, rect)?)
    }

    pub fn key_move(&mut self, direction: Direction) -> Result<Option<DragEvent>> {
        Ok(self.drag.key_move(direction)?)
    }

    pub fn key_drop(&mut self) -> Result<BoardAction> {
        let event = self.drag.key_drop()?;
        Ok(self.handle_end(event))
    }

    /// Escape or unmount. The layout is left as it was before the drag.
    pub fn cancel(&mut self) -> Option<DragEvent> {
        self.drag.cancel()
    }

    fn handle_end(&mut self, event: DragEvent) -> BoardAction {
        match event {
            DragEvent::Click(EntityRef::Task(task)) => {
                debug!(task_id = %task, "Card clicked");
                BoardAction::OpenTask(task)
            }
            DragEvent::Dropped(intent) if intent.is_noop() => BoardAction::None,
            DragEvent::Dropped(intent) => {
                let entity = intent.dragged.entity_ref();
                let reconciler = self.reconciler.clone();
                let layout = self.layout.clone();
                let handle = tokio::spawn(async move { reconciler.submit(&layout, &intent).await });
                BoardAction::Moving(PendingMove { entity, handle })
            }
            _ => BoardAction::None,
        }
    }

    // --- Non-drag operations ---

    /// Moves a task without a gesture and waits for the result.
    pub async fn move_task_to(&self, task: TaskId, column: ColumnId, slot: Slot) -> Result<MoveOutcome> {
        Ok(self
            .reconciler
            .move_task(&self.layout, task, column, slot)
            .await?)
    }

    /// Moves a column to `index` among the other columns.
    pub async fn move_column_to(&self, column: ColumnId, index: usize) -> Result<MoveOutcome> {
        Ok(self
            .reconciler
            .move_column(&self.layout, column, index)
            .await?)
    }

    /// Appends a column to the board.
    pub async fn create_column(&self, name: impl Into<String>) -> Result<Column> {
        let request = CreateColumnRequest {
            name: name.into(),
            position: None,
        };
        let column = self
            .cache
            .gateway()
            .create_column(self.board_id, request)
            .await?;
        info!(board_id = %self.board_id, column_id = %column.id, "Column created");

        self.cache
            .invalidate_key(QueryKey::Columns(self.board_id))
            .await;
        self.cache.invalidate_key(QueryKey::Tasks(self.board_id)).await;
        self.reload().await?;
        Ok(column)
    }

    /// Drops cached data and reloads the board.
    pub async fn refresh(&self) -> Result<()> {
        self.cache.invalidate(self.board_id).await;
        self.reload().await
    }

    async fn reload(&self) -> Result<()> {
        let snapshot = self.cache.load(self.board_id).await?;
        self.layout
            .write()
            .await
            .rebase(BoardLayout::from_snapshot(&snapshot));
        Ok(())
    }
}
