//! Task comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, TaskId, UserId};
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub task_id: TaskId,
    pub author_id: UserId,
    pub author: User,
    #[serde(with = "crate::format::lenient")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::format::lenient")]
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Returns true if the comment was edited after it was posted.
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comment_decode_and_edited() {
        let body = json!({
            "id": 1,
            "body": "Looks good",
            "taskId": 5,
            "authorId": 2,
            "author": {"id": 2, "fullName": "Grace Hopper", "email": "grace@example.com", "role": "USER"},
            "createdAt": "2026-01-05T10:00:00Z",
            "updatedAt": "2026-01-05T11:00:00Z"
        });
        let comment: Comment = serde_json::from_value(body).unwrap();
        assert_eq!(comment.author.full_name, "Grace Hopper");
        assert!(comment.is_edited());
    }
}
