//! Query keys.

use std::fmt;

use kanban_models::BoardId;

/// Identifies one cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `["board", id]`: the board detail.
    Board(BoardId),
    /// `["columns", id]`: the columns of the board.
    Columns(BoardId),
    /// `["tasks", "board", id]`: the tasks of every column of the board.
    Tasks(BoardId),
}

impl QueryKey {
    pub fn board_id(&self) -> BoardId {
        match self {
            QueryKey::Board(id) | QueryKey::Columns(id) | QueryKey::Tasks(id) => *id,
        }
    }

    /// All keys belonging to a board.
    pub fn all(board: BoardId) -> [QueryKey; 3] {
        [
            QueryKey::Board(board),
            QueryKey::Columns(board),
            QueryKey::Tasks(board),
        ]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Board(id) => write!(f, "board/{id}"),
            QueryKey::Columns(id) => write!(f, "columns/{id}"),
            QueryKey::Tasks(id) => write!(f, "tasks/board/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_board_id_and_display() {
        let key = QueryKey::Tasks(BoardId::new(4));
        assert_eq!(key.board_id(), BoardId::new(4));
        assert_eq!(key.to_string(), "tasks/board/4");
        assert_eq!(QueryKey::all(BoardId::new(4)).len(), 3);
    }
}
