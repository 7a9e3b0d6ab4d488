//! The visible arrangement of one board.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use kanban_cache::BoardSnapshot;
use kanban_models::{BoardId, Column, ColumnId, TaskId, TaskSummary};

use crate::plan::MoveIntent;
use crate::position::{array_move, renumber_from};

/// Layout shared between the view and in-flight reconciliations.
pub type SharedLayout = Arc<RwLock<OptimisticLayout>>;

/// Ordered columns and the ordered tasks of each column.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    board_id: BoardId,
    columns: Vec<Column>,
    tasks: HashMap<ColumnId, Vec<TaskSummary>>,
}

impl BoardLayout {
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        Self {
            board_id: snapshot.board_id(),
            columns: snapshot.columns.clone(),
            tasks: snapshot.tasks_by_column(),
        }
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Ordered tasks of a column; empty for unknown columns.
    pub fn tasks(&self, column: ColumnId) -> &[TaskSummary] {
        self.tasks.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Column and index of a task.
    pub fn locate(&self, task: TaskId) -> Option<(ColumnId, usize)> {
        self.columns.iter().find_map(|column| {
            self.tasks(column.id)
                .iter()
                .position(|t| t.id == task)
                .map(|index| (column.id, index))
        })
    }

    pub fn task(&self, task: TaskId) -> Option<&TaskSummary> {
        let (column, index) = self.locate(task)?;
        self.tasks(column).get(index)
    }

    /// Column ids with their ordered task ids, for measuring drop regions.
    pub fn slots(&self) -> Vec<(ColumnId, Vec<TaskId>)> {
        self.columns
            .iter()
            .map(|column| {
                let tasks = self.tasks(column.id).iter().map(|t| t.id).collect();
                (column.id, tasks)
            })
            .collect()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }

    /// Applies a planned move locally. Returns false if the moved entity
    /// is not in this layout.
    pub fn apply(&mut self, intent: &MoveIntent) -> bool {
        match *intent {
            MoveIntent::Task {
                task,
                to_column,
                index,
                position,
                ..
            } => {
                let Some((from_column, from_index)) = self.locate(task) else {
                    return false;
                };
                if self.column(to_column).is_none() {
                    return false;
                }
                let Some(mut moved) = self
                    .tasks
                    .get_mut(&from_column)
                    .map(|tasks| tasks.remove(from_index))
                else {
                    return false;
                };
                moved.column_id = to_column;
                moved.position = position;

                let destination = self.tasks.entry(to_column).or_default();
                let index = index.min(destination.len());
                destination.insert(index, moved);
                renumber_from(destination, index, |t| &mut t.position);
                true
            }
            MoveIntent::Column {
                column,
                index,
                position,
            } => {
                let Some(from) = self.column_index(column) else {
                    return false;
                };
                self.columns[from].position = position;
                array_move(&mut self.columns, from, index);
                let index = index.min(self.columns.len() - 1);
                renumber_from(&mut self.columns, index, |c| &mut c.position);
                true
            }
        }
    }
}

/// Handle on one unconfirmed move in an [`OptimisticLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveTicket(u64);

/// The last server-confirmed layout plus the moves still awaiting the
/// server.
///
/// The visible layout is always the confirmed base with every pending
/// move replayed in submission order. Settling one move rebuilds the
/// view from that base, so it never undoes or resurrects another move.
#[derive(Debug, Clone)]
pub struct OptimisticLayout {
    base: BoardLayout,
    pending: Vec<(MoveTicket, MoveIntent)>,
    view: BoardLayout,
    next_ticket: u64,
}

impl OptimisticLayout {
    pub fn new(base: BoardLayout) -> Self {
        Self {
            view: base.clone(),
            base,
            pending: Vec::new(),
            next_ticket: 0,
        }
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Self {
        Self::new(BoardLayout::from_snapshot(snapshot))
    }

    /// What the user sees: confirmed state plus pending moves.
    pub fn view(&self) -> &BoardLayout {
        &self.view
    }

    /// Last confirmed state.
    pub fn base(&self) -> &BoardLayout {
        &self.base
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, ticket: MoveTicket) -> bool {
        self.pending.iter().any(|(t, _)| *t == ticket)
    }

    /// Applies a move to the view and tracks it until it is settled.
    /// Returns `None` if the move does not fit the current view.
    pub fn push(&mut self, intent: MoveIntent) -> Option<MoveTicket> {
        if !self.view.apply(&intent) {
            return None;
        }
        let ticket = MoveTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.push((ticket, intent));
        Some(ticket)
    }

    /// Forgets a move the server did not accept.
    pub fn discard(&mut self, ticket: MoveTicket) -> bool {
        if self.take(ticket).is_none() {
            return false;
        }
        self.replay();
        true
    }

    /// Folds a move the server accepted into the confirmed base.
    pub fn confirm(&mut self, ticket: MoveTicket) -> bool {
        let Some(intent) = self.take(ticket) else {
            return false;
        };
        self.base.apply(&intent);
        self.replay();
        true
    }

    /// Replaces the confirmed base with a fresh load. Pending moves stay
    /// visible on top of it.
    pub fn rebase(&mut self, base: BoardLayout) {
        self.base = base;
        self.replay();
    }

    fn take(&mut self, ticket: MoveTicket) -> Option<MoveIntent> {
        let index = self.pending.iter().position(|(t, _)| *t == ticket)?;
        Some(self.pending.remove(index).1)
    }

    // Moves whose entity vanished from the base are skipped.
    fn replay(&mut self) {
        let mut view = self.base.clone();
        for (_, intent) in &self.pending {
            view.apply(intent);
        }
        self.view = view;
    }
}
