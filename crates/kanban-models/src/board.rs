//! Board types.
//!
//! A board is the top-level container of columns. The gateway returns
//! three shapes of it: a short summary for listings, the plain board, and
//! a detail view that embeds columns, members and labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::ids::{BoardId, UserId};
use crate::label::Label;

/// Who can see a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Only members can see the board.
    #[default]
    Private,
    /// Anyone can see the board.
    Public,
}

/// Role of a member on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl BoardRole {
    /// Returns true if the role may change board structure (columns, labels, members).
    pub fn can_manage(self) -> bool {
        matches!(self, BoardRole::Owner | BoardRole::Admin)
    }
}

/// A board as returned by listing and mutation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub visibility: Visibility,
    pub owner_id: UserId,
    #[serde(with = "crate::format::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::format::lenient")]
    pub updated_at: DateTime<Utc>,
}

/// A board with its columns, members and labels embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub members: Vec<BoardMember>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl BoardDetail {
    /// Returns the board id.
    pub fn id(&self) -> BoardId {
        self.board.id
    }

    /// Returns the board display name.
    pub fn name(&self) -> &str {
        &self.board.name
    }

    /// Looks up a member by user id.
    pub fn member(&self, user_id: UserId) -> Option<&BoardMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

/// Short form of a board used in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: BoardId,
    pub name: String,
    pub visibility: Visibility,
}

/// A member of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: BoardRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: UserId,
    pub role: BoardRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    pub role: BoardRole,
}
