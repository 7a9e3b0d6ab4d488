//! Core data models for the kanban board client.
//!
//! This crate provides the wire and domain types shared by every other
//! crate in the workspace: boards, columns, tasks, labels, comments,
//! users, the request payloads sent to the REST gateway, and a few
//! display helpers.

pub mod board;
pub mod builders;
pub mod column;
pub mod comment;
pub mod error_body;
pub mod format;
pub mod ids;
pub mod label;
pub mod task;
pub mod user;

// Re-export main types
pub use board::{
    AddMemberRequest, Board, BoardDetail, BoardMember, BoardRole, BoardSummary,
    CreateBoardRequest, UpdateBoardRequest, UpdateMemberRequest, Visibility,
};
pub use builders::{ColumnBuilder, TaskBuilder};
pub use column::{sort_columns, Column, CreateColumnRequest, MoveColumnRequest};
pub use comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
pub use error_body::ApiErrorBody;
pub use format::{format_date, format_date_time, format_due_date, initials, parse_timestamp};
pub use ids::{BoardId, ColumnId, CommentId, LabelId, TaskId, UserId};
pub use label::{
    is_valid_color, CreateLabelRequest, Label, LabelBrief, UpdateLabelRequest, PRESET_COLORS,
};
pub use task::{
    sort_tasks, AssigneeBrief, CreateTaskRequest, MoveTaskRequest, TaskDetail, TaskStatus,
    TaskSummary, UpdateTaskRequest,
};
pub use user::{
    LoginRequest, RegisterRequest, TokenResponse, UpdateProfileRequest, User, UserRole,
};
