//! REST operations outside the [`BoardGateway`](crate::BoardGateway) seam:
//! authentication, profile, boards, members, tasks, labels and comments.

use std::collections::BTreeMap;

use reqwest::Method;
use tracing::info;

use kanban_models::{
    is_valid_color, AddMemberRequest, BoardDetail, BoardId, BoardMember, BoardSummary, ColumnId,
    Comment, CommentId, CreateBoardRequest, CreateCommentRequest, CreateLabelRequest,
    CreateTaskRequest, Label, LabelId, LoginRequest, RegisterRequest, TaskDetail, TaskId,
    TaskSummary, TokenResponse, UpdateBoardRequest, UpdateCommentRequest, UpdateLabelRequest,
    UpdateMemberRequest, UpdateProfileRequest, UpdateTaskRequest, User, UserId,
};

use super::HttpGateway;
use crate::error::{GatewayError, Result};
use crate::session::Credentials;

fn color_error(color: &str) -> GatewayError {
    let mut fields = BTreeMap::new();
    fields.insert("color".to_string(), format!("{color} is not a #RRGGBB color"));
    GatewayError::Validation {
        message: "invalid label color".to_string(),
        fields,
    }
}

impl HttpGateway {
    // --- Authentication and profile ---

    /// Registers an account, logs the session in and returns the new user.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let tokens: TokenResponse = self.post("auth/register", request).await?;
        self.establish(tokens).await
    }

    /// Logs in, stores the tokens on the session and returns the user.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let tokens: TokenResponse = self.post("auth/login", request).await?;
        self.establish(tokens).await
    }

    async fn establish(&self, tokens: TokenResponse) -> Result<User> {
        self.session.login(Credentials::from(tokens)).await;
        let user = self.current_user().await?;
        self.session.set_user(user.clone()).await;
        info!(user_id = %user.id, email = %user.email, "Logged in");
        Ok(user)
    }

    /// Client-side logout; the server keeps no session state.
    pub async fn logout(&self) -> bool {
        self.session.logout().await
    }

    pub async fn current_user(&self) -> Result<User> {
        if !self.session.is_logged_in().await {
            return Err(GatewayError::NotAuthenticated);
        }
        self.get("users/me").await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User> {
        let user: User = self.patch("users/me", request).await?;
        self.session.set_user(user.clone()).await;
        Ok(user)
    }

    // --- Boards ---

    pub async fn list_boards(&self) -> Result<Vec<BoardSummary>> {
        self.get("boards").await
    }

    pub async fn create_board(&self, request: &CreateBoardRequest) -> Result<BoardDetail> {
        self.post("boards", request).await
    }

    pub async fn update_board(&self, board: BoardId, request: &UpdateBoardRequest) -> Result<BoardDetail> {
        self.patch(&format!("boards/{board}"), request).await
    }

    pub async fn delete_board(&self, board: BoardId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("boards/{board}"), None).await
    }

    // --- Members ---

    pub async fn list_members(&self, board: BoardId) -> Result<Vec<BoardMember>> {
        self.get(&format!("boards/{board}/members")).await
    }

    pub async fn add_member(&self, board: BoardId, request: &AddMemberRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;
        self.send_unit(
            Method::POST,
            &format!("boards/{board}/members/{}", request.user_id),
            Some(body),
        )
        .await
    }

    /// Changes a member's role. The user id is part of the path.
    pub async fn update_member(
        &self,
        board: BoardId,
        user: UserId,
        request: &UpdateMemberRequest,
    ) -> Result<()> {
        let body = serde_json::to_value(request)?;
        self.send_unit(
            Method::PATCH,
            &format!("boards/{board}/members/{user}"),
            Some(body),
        )
        .await
    }

    pub async fn remove_member(&self, board: BoardId, user: UserId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("boards/{board}/members/{user}"), None).await
    }

    // --- Tasks ---

    pub async fn get_task(&self, task: TaskId) -> Result<TaskDetail> {
        self.get(&format!("tasks/{task}")).await
    }

    pub async fn create_task(&self, column: ColumnId, request: &CreateTaskRequest) -> Result<TaskDetail> {
        self.post(&format!("tasks/{column}"), request).await
    }

    pub async fn update_task(&self, task: TaskId, request: &UpdateTaskRequest) -> Result<TaskDetail> {
        self.patch(&format!("tasks/{task}"), request).await
    }

    pub async fn delete_task(&self, task: TaskId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("tasks/{task}"), None).await
    }

    /// Full-text task search. An empty query lists everything visible.
    pub async fn search_tasks(&self, query: Option<&str>) -> Result<Vec<TaskSummary>> {
        let mut url = self.config.endpoint("tasks/search")?;
        if let Some(q) = query {
            url.query_pairs_mut().append_pair("q", q);
        }
        self.get_url(url).await
    }

    pub async fn add_task_label(&self, task: TaskId, label: LabelId) -> Result<()> {
        self.send_unit(Method::POST, &format!("tasks/{task}/labels/{label}"), None).await
    }

    pub async fn remove_task_label(&self, task: TaskId, label: LabelId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("tasks/{task}/labels/{label}"), None).await
    }

    // --- Labels ---

    pub async fn list_labels(&self, board: BoardId) -> Result<Vec<Label>> {
        self.get(&format!("boards/{board}/labels")).await
    }

    /// Creates a label. Colors are checked locally before any request.
    pub async fn create_label(&self, board: BoardId, request: &CreateLabelRequest) -> Result<Label> {
        if !is_valid_color(&request.color) {
            return Err(color_error(&request.color));
        }
        self.post(&format!("boards/{board}/labels"), request).await
    }

    pub async fn update_label(&self, label: LabelId, request: &UpdateLabelRequest) -> Result<Label> {
        if let Some(color) = request.color.as_deref().filter(|c| !is_valid_color(c)) {
            return Err(color_error(color));
        }
        self.patch(&format!("labels/{label}"), request).await
    }

    pub async fn delete_label(&self, label: LabelId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("labels/{label}"), None).await
    }

    // --- Comments ---

    pub async fn list_comments(&self, task: TaskId) -> Result<Vec<Comment>> {
        self.get(&format!("comments/{task}")).await
    }

    pub async fn create_comment(&self, task: TaskId, request: &CreateCommentRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;
        self.send_unit(Method::POST, &format!("comments/{task}"), Some(body)).await
    }

    pub async fn update_comment(&self, comment: CommentId, request: &UpdateCommentRequest) -> Result<()> {
        let body = serde_json::to_value(request)?;
        self.send_unit(Method::PATCH, &format!("comments/{comment}"), Some(body)).await
    }

    pub async fn delete_comment(&self, comment: CommentId) -> Result<()> {
        self.send_unit(Method::DELETE, &format!("comments/{comment}"), None).await
    }
}
