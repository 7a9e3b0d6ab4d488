//! Column types.

use serde::{Deserialize, Serialize};

use crate::ids::{BoardId, ColumnId};

/// An ordered bucket of tasks within a board.
///
/// Columns are ordered left-to-right by ascending `position`. Positions
/// are unique per board but not required to be contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub position: i64,
    pub board_id: BoardId,
}

impl Column {
    /// Creates a new column value.
    pub fn new(id: ColumnId, board_id: BoardId, name: impl Into<String>, position: i64) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            board_id,
        }
    }
}

/// Sorts columns by ascending position.
///
/// The sort is stable: columns sharing a position keep the order in which
/// they were fetched.
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by_key(|c| c.position);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

/// Payload of the move-column endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveColumnRequest {
    pub position: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(id: i64, position: i64) -> Column {
        Column::new(ColumnId::new(id), BoardId::new(1), format!("c{id}"), position)
    }

    #[test]
    fn test_sort_columns_by_position() {
        let mut cols = vec![col(1, 30), col(2, 10), col(3, 20)];
        sort_columns(&mut cols);
        let ids: Vec<i64> = cols.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_columns_keeps_fetch_order_on_ties() {
        let mut cols = vec![col(5, 1), col(4, 1), col(3, 0)];
        sort_columns(&mut cols);
        let ids: Vec<i64> = cols.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![3, 5, 4]);
    }

    #[test]
    fn test_column_wire_format() {
        let c = col(2, 4);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["boardId"], 1);
        assert_eq!(v["position"], 4);
    }
}
