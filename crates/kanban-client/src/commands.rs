//! Command handlers for CLI subcommands.

use std::path::PathBuf;
use std::sync::Arc;

use kanban_gateway::{BoardGateway, Credentials, GatewayConfig, HttpGateway, Session};
use kanban_models::{
    format_date, format_date_time, format_due_date, is_valid_color, AddMemberRequest, BoardId,
    ColumnId, CommentId, CreateBoardRequest, CreateColumnRequest, CreateCommentRequest,
    CreateLabelRequest, CreateTaskRequest, LabelId, LoginRequest, RegisterRequest, TaskId,
    TaskSummary, UpdateBoardRequest, UpdateCommentRequest, UpdateLabelRequest,
    UpdateMemberRequest, UpdateProfileRequest, UpdateTaskRequest, User, PRESET_COLORS,
};
use kanban_persistence::{SessionStore, StoredSession};
use kanban_reconciler::{MoveOutcome, Slot};
use tracing::{info, warn};

use crate::board::{BoardController, ControllerConfig};
use crate::cli::{
    BoardCommands, ColumnCommands, Commands, CommentCommands, LabelCommands, MemberCommands,
    OutputFormat, StatusArg, TaskCommands, VisibilityArg,
};
use crate::demo;
use crate::error::{ClientError, Result};

/// Where commands send requests and keep the session.
#[derive(Debug, Clone)]
pub struct Context {
    pub api_url: String,
    pub state_dir: PathBuf,
}

impl Context {
    pub fn new(api_url: impl Into<String>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            state_dir: state_dir.into(),
        }
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(kanban_core::session_file_in(&self.state_dir))
    }

    /// Builds a gateway carrying the stored session, if any.
    pub async fn gateway(&self) -> Result<HttpGateway> {
        let session = match self.session_store().load()? {
            Some(stored) => {
                if stored.api_url != self.api_url {
                    warn!(
                        stored = %stored.api_url,
                        current = %self.api_url,
                        "Stored session belongs to another server, ignoring it"
                    );
                    Session::new()
                } else {
                    let mut credentials =
                        Credentials::new(stored.access_token, stored.refresh_token);
                    if let Some(user) = stored.user {
                        credentials = credentials.with_user(user);
                    }
                    Session::with_credentials(credentials)
                }
            }
            None => Session::new(),
        };
        let config = GatewayConfig::new(&self.api_url)?;
        Ok(HttpGateway::new(config, session)?)
    }

    /// Like [`gateway`](Self::gateway) but fails without a login.
    async fn authed_gateway(&self) -> Result<HttpGateway> {
        let gateway = self.gateway().await?;
        if !gateway.session().is_logged_in().await {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(gateway)
    }

    async fn save_session(&self, gateway: &HttpGateway) -> Result<()> {
        let Some(credentials) = gateway.session().credentials().await else {
            return Ok(());
        };
        let stored = StoredSession::new(
            self.api_url.clone(),
            credentials.access_token,
            credentials.refresh_token,
            credentials.user,
        );
        self.session_store().save(&stored)?;
        Ok(())
    }
}

/// Execute a CLI command.
pub async fn execute(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login { email, password } => cmd_login(ctx, email, password).await,
        Commands::Register { name, email, password } => {
            cmd_register(ctx, name, email, password).await
        }
        Commands::Logout => cmd_logout(ctx).await,
        Commands::Whoami => cmd_whoami(ctx).await,
        Commands::Profile { name, password } => cmd_profile(ctx, name, password).await,
        Commands::Boards { command } => boards(ctx, command).await,
        Commands::Members { command } => members(ctx, command).await,
        Commands::Columns { command } => columns(ctx, command).await,
        Commands::Tasks { command } => tasks(ctx, command).await,
        Commands::Labels { command } => labels(ctx, command).await,
        Commands::Comments { command } => comments(ctx, command).await,
        Commands::Demo { fail, keyboard } => demo::run(fail, keyboard).await,
    }
}

// --- Account ---

async fn cmd_login(ctx: &Context, email: String, password: String) -> Result<()> {
    let gateway = ctx.gateway().await?;
    let user = gateway.login(&LoginRequest { email, password }).await?;
    ctx.save_session(&gateway).await?;

    info!(user_id = %user.id, "Logged in");
    println!("Logged in as {} <{}>", user.full_name, user.email);
    Ok(())
}

async fn cmd_register(ctx: &Context, full_name: String, email: String, password: String) -> Result<()> {
    let gateway = ctx.gateway().await?;
    let request = RegisterRequest {
        full_name,
        email,
        password,
    };
    let user = gateway.register(&request).await?;
    ctx.save_session(&gateway).await?;

    println!("Registered and logged in as {} <{}>", user.full_name, user.email);
    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let gateway = ctx.gateway().await?;
    gateway.logout().await;
    if ctx.session_store().clear()? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

async fn cmd_whoami(ctx: &Context) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    let user = gateway.current_user().await?;
    gateway.session().set_user(user.clone()).await;
    ctx.save_session(&gateway).await?;

    print_user(&user);
    Ok(())
}

async fn cmd_profile(ctx: &Context, full_name: Option<String>, password: Option<String>) -> Result<()> {
    if full_name.is_none() && password.is_none() {
        return Err(ClientError::InvalidArgument(
            "nothing to update (pass --name or --password)".into(),
        ));
    }
    let gateway = ctx.authed_gateway().await?;
    let user = gateway
        .update_profile(&UpdateProfileRequest { full_name, password })
        .await?;
    gateway.session().set_user(user.clone()).await;
    ctx.save_session(&gateway).await?;

    println!("Profile updated");
    print_user(&user);
    Ok(())
}

fn print_user(user: &User) {
    println!("{} ({})", user.full_name, user.initials());
    println!("  Email: {}", user.email);
    println!("  Id:    {}", user.id);
    println!("  Role:  {:?}", user.role);
}

// --- Boards ---

async fn boards(ctx: &Context, command: BoardCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        BoardCommands::List { format } => {
            let boards = gateway.list_boards().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&boards)?),
                OutputFormat::Brief => {
                    for board in &boards {
                        println!("{}", board.id);
                    }
                }
                OutputFormat::Table => {
                    if boards.is_empty() {
                        println!("No boards found");
                        return Ok(());
                    }
                    println!("{:<8} {:<30} {:<10}", "ID", "NAME", "VISIBILITY");
                    println!("{}", "-".repeat(50));
                    for board in &boards {
                        println!(
                            "{:<8} {:<30} {:<10}",
                            board.id,
                            truncate(&board.name, 30),
                            format!("{:?}", board.visibility)
                        );
                    }
                }
            }
            Ok(())
        }
        BoardCommands::Show { board, format } => cmd_board_show(gateway, board, format).await,
        BoardCommands::Create { name, visibility } => {
            let request = CreateBoardRequest {
                name,
                visibility: visibility.map(Into::into),
            };
            let board = gateway.create_board(&request).await?;
            println!("Created board '{}' ({})", board.name(), board.id());
            Ok(())
        }
        BoardCommands::Rename { board, name, visibility } => {
            let request = UpdateBoardRequest {
                name: Some(name),
                visibility: visibility.map(VisibilityArg::into),
            };
            let updated = gateway.update_board(board, &request).await?;
            println!("Board {} is now '{}'", updated.id(), updated.name());
            Ok(())
        }
        BoardCommands::Delete { board } => {
            gateway.delete_board(board).await?;
            println!("Deleted board {}", board);
            Ok(())
        }
    }
}

async fn cmd_board_show(gateway: HttpGateway, board_id: BoardId, format: OutputFormat) -> Result<()> {
    let gateway: Arc<dyn BoardGateway> = Arc::new(gateway);
    let controller = BoardController::open(gateway, board_id, ControllerConfig::default()).await?;
    let snapshot = controller.cache().load(board_id).await?;
    let layout = controller.layout().await;

    match format {
        OutputFormat::Json => {
            let columns: Vec<_> = layout
                .columns()
                .iter()
                .map(|column| {
                    serde_json::json!({
                        "column": column,
                        "tasks": layout.tasks(column.id),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "board": snapshot.board,
                "columns": columns,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Brief => {
            for column in layout.columns() {
                let ids: Vec<String> = layout.tasks(column.id).iter().map(|t| t.id.to_string()).collect();
                println!("{} {}", column.id, ids.join(" "));
            }
        }
        OutputFormat::Table => {
            let board = &snapshot.board;
            println!("{} ({:?})", board.name(), board.board.visibility);
            println!("  Id:      {}", board.id());
            println!("  Created: {}", format_date(&board.board.created_at));
            println!("  Members: {}", board.members.len());
            for column in layout.columns() {
                let tasks = layout.tasks(column.id);
                println!();
                println!("[{}] {} ({})", column.id, column.name, tasks.len());
                if tasks.is_empty() {
                    println!("    (empty)");
                }
                for task in tasks {
                    println!("    {}", task_line(task));
                }
            }
        }
    }
    Ok(())
}

fn task_line(task: &TaskSummary) -> String {
    let mut line = format!("#{:<6} {}", task.id, truncate(&task.title, 40));
    if let Some(due) = &task.due_date {
        line.push_str(&format!("  due {}", format_due_date(due)));
    }
    if !task.labels.is_empty() {
        let names: Vec<&str> = task.labels.iter().map(|l| l.name.as_str()).collect();
        line.push_str(&format!("  [{}]", names.join(", ")));
    }
    line
}

// --- Members ---

async fn members(ctx: &Context, command: MemberCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        MemberCommands::List { board } => {
            let members = gateway.list_members(board).await?;
            println!("{:<8} {:<24} {:<30} {:<8}", "ID", "NAME", "EMAIL", "ROLE");
            println!("{}", "-".repeat(72));
            for member in &members {
                println!(
                    "{:<8} {:<24} {:<30} {:<8}",
                    member.user_id,
                    truncate(&member.full_name, 24),
                    truncate(&member.email, 30),
                    format!("{:?}", member.role)
                );
            }
            Ok(())
        }
        MemberCommands::Add { board, user, role } => {
            let request = AddMemberRequest {
                user_id: user,
                role: role.into(),
            };
            gateway.add_member(board, &request).await?;
            println!("Added user {} to board {} as {:?}", user, board, role);
            Ok(())
        }
        MemberCommands::Role { board, user, role } => {
            gateway
                .update_member(board, user, &UpdateMemberRequest { role: role.into() })
                .await?;
            println!("User {} is now {:?} on board {}", user, role, board);
            Ok(())
        }
        MemberCommands::Remove { board, user } => {
            gateway.remove_member(board, user).await?;
            println!("Removed user {} from board {}", user, board);
            Ok(())
        }
    }
}

// --- Columns ---

async fn columns(ctx: &Context, command: ColumnCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        ColumnCommands::Add { board, name, position } => {
            let column = gateway
                .create_column(board, CreateColumnRequest { name, position })
                .await?;
            println!("Created column '{}' ({}) at position {}", column.name, column.id, column.position);
            Ok(())
        }
        ColumnCommands::Move { board, column, index } => {
            let controller = open_board(gateway, board).await?;
            match controller.move_column_to(column, index).await? {
                MoveOutcome::NoOp => println!("Column {} is already at index {}", column, index),
                MoveOutcome::Committed(intent) => {
                    println!("Moved column {} to index {} (position {})", column, index, intent.position())
                }
            }
            Ok(())
        }
    }
}

// --- Tasks ---

async fn tasks(ctx: &Context, command: TaskCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        TaskCommands::Add { column, title, description, due, status } => {
            let request = CreateTaskRequest {
                title,
                description,
                due_date: due,
                status: status.map(Into::into),
                ..Default::default()
            };
            let task = gateway.create_task(column, &request).await?;
            println!("Created task #{} '{}' in column {}", task.id, task.title, task.column_id);
            Ok(())
        }
        TaskCommands::Show { task } => cmd_task_show(&gateway, task).await,
        TaskCommands::Update { task, title, description, due, status } => {
            let request = UpdateTaskRequest {
                title,
                description,
                due_date: due,
                status: status.map(StatusArg::into),
                ..Default::default()
            };
            if request.is_empty() {
                return Err(ClientError::InvalidArgument("nothing to update".into()));
            }
            let updated = gateway.update_task(task, &request).await?;
            println!("Updated task #{} '{}'", updated.id, updated.title);
            Ok(())
        }
        TaskCommands::Delete { task } => {
            gateway.delete_task(task).await?;
            println!("Deleted task #{}", task);
            Ok(())
        }
        TaskCommands::Move { board, task, column, slot } => {
            cmd_task_move(gateway, board, task, column, slot.slot()).await
        }
        TaskCommands::Search { query } => {
            let found = gateway.search_tasks(query.as_deref()).await?;
            if found.is_empty() {
                println!("No tasks found");
            }
            for task in &found {
                println!("{}  (column {})", task_line(task), task.column_id);
            }
            Ok(())
        }
        TaskCommands::Label { task, label } => {
            gateway.add_task_label(task, label).await?;
            println!("Attached label {} to task #{}", label, task);
            Ok(())
        }
        TaskCommands::Unlabel { task, label } => {
            gateway.remove_task_label(task, label).await?;
            println!("Detached label {} from task #{}", label, task);
            Ok(())
        }
    }
}

async fn cmd_task_show(gateway: &HttpGateway, task: TaskId) -> Result<()> {
    let task = gateway.get_task(task).await?;
    println!("#{} {}", task.id, task.title);
    println!("  Status:   {}", task.status.label());
    println!("  Column:   {}", task.column_id);
    println!("  Position: {}", task.position);
    if let Some(due) = &task.due_date {
        println!("  Due:      {}", format_due_date(due));
    }
    if !task.assignees.is_empty() {
        let names: Vec<&str> = task.assignees.iter().map(|a| a.full_name.as_str()).collect();
        println!("  Assigned: {}", names.join(", "));
    }
    if !task.labels.is_empty() {
        let names: Vec<&str> = task.labels.iter().map(|l| l.name.as_str()).collect();
        println!("  Labels:   {}", names.join(", "));
    }
    println!("  Comments: {}", task.comment_count);
    println!("  Files:    {}", task.attachment_count);
    println!("  Created:  {}", format_date_time(&task.created_at));
    println!("  Updated:  {}", format_date_time(&task.updated_at));
    if let Some(description) = &task.description {
        println!();
        println!("{}", description);
    }
    Ok(())
}

async fn cmd_task_move(
    gateway: HttpGateway,
    board: BoardId,
    task: TaskId,
    column: ColumnId,
    slot: Slot,
) -> Result<()> {
    let controller = open_board(gateway, board).await?;
    match controller.move_task_to(task, column, slot).await? {
        MoveOutcome::NoOp => println!("Task #{} is already there", task),
        MoveOutcome::Committed(intent) => {
            info!(task_id = %task, column_id = %column, position = intent.position(), "Task moved");
            println!("Moved task #{} to column {} (position {})", task, column, intent.position());
        }
    }
    Ok(())
}

async fn open_board(gateway: HttpGateway, board: BoardId) -> Result<BoardController> {
    let gateway: Arc<dyn BoardGateway> = Arc::new(gateway);
    let config = ControllerConfig::default()
        .with_reconciler(kanban_reconciler::ReconcilerConfig::from_env());
    BoardController::open(gateway, board, config).await
}

// --- Labels ---

async fn labels(ctx: &Context, command: LabelCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        LabelCommands::List { board } => {
            for label in gateway.list_labels(board).await? {
                println!("{:<8} {:<8} {}", label.id, label.color, label.name);
            }
            Ok(())
        }
        LabelCommands::Add { board, name, color } => {
            let color = color.unwrap_or_else(|| PRESET_COLORS[0].to_string());
            check_color(&color)?;
            let label = gateway
                .create_label(board, &CreateLabelRequest { name, color })
                .await?;
            println!("Created label '{}' ({})", label.name, label.id);
            Ok(())
        }
        LabelCommands::Update { label, name, color } => {
            if let Some(color) = &color {
                check_color(color)?;
            }
            let updated = gateway
                .update_label(label, &UpdateLabelRequest { name, color })
                .await?;
            println!("Label {} is now '{}' {}", updated.id, updated.name, updated.color);
            Ok(())
        }
        LabelCommands::Delete { label } => cmd_label_delete(&gateway, label).await,
    }
}

async fn cmd_label_delete(gateway: &HttpGateway, label: LabelId) -> Result<()> {
    gateway.delete_label(label).await?;
    println!("Deleted label {}", label);
    Ok(())
}

fn check_color(color: &str) -> Result<()> {
    if is_valid_color(color) {
        Ok(())
    } else {
        Err(ClientError::InvalidArgument(format!(
            "'{}' is not a #RRGGBB color",
            color
        )))
    }
}

// --- Comments ---

async fn comments(ctx: &Context, command: CommentCommands) -> Result<()> {
    let gateway = ctx.authed_gateway().await?;
    match command {
        CommentCommands::List { task } => {
            let comments = gateway.list_comments(task).await?;
            if comments.is_empty() {
                println!("No comments");
            }
            for comment in &comments {
                println!(
                    "[{}] {} ({}) {}",
                    comment.id,
                    comment.author.full_name,
                    comment.author.initials(),
                    format_date_time(&comment.created_at)
                );
                println!("    {}", comment.body);
            }
            Ok(())
        }
        CommentCommands::Add { task, body } => {
            gateway
                .create_comment(task, &CreateCommentRequest { body })
                .await?;
            println!("Comment added to task #{}", task);
            Ok(())
        }
        CommentCommands::Edit { comment, body } => {
            gateway
                .update_comment(comment, &UpdateCommentRequest { body })
                .await?;
            println!("Comment {} updated", comment);
            Ok(())
        }
        CommentCommands::Delete { comment } => cmd_comment_delete(&gateway, comment).await,
    }
}

async fn cmd_comment_delete(gateway: &HttpGateway, comment: CommentId) -> Result<()> {
    gateway.delete_comment(comment).await?;
    println!("Deleted comment {}", comment);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long board name", 10), "a very ...");
    }

    #[test]
    fn test_check_color() {
        assert!(check_color("#1A2B3C").is_ok());
        assert!(matches!(check_color("red"), Err(ClientError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_gateway_without_session_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new("http://localhost:8080/api", dir.path());

        let gateway = ctx.gateway().await.unwrap();
        assert!(!gateway.session().is_logged_in().await);
        assert!(matches!(ctx.authed_gateway().await, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_gateway_restores_stored_session() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new("http://localhost:8080/api", dir.path());
        ctx.session_store()
            .save(&StoredSession::new(ctx.api_url.clone(), "access", "refresh", None))
            .unwrap();

        let gateway = ctx.authed_gateway().await.unwrap();
        let credentials = gateway.session().credentials().await.unwrap();
        assert_eq!(credentials.access_token, "access");
    }

    #[tokio::test]
    async fn test_session_for_other_server_is_ignored() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new("http://localhost:8080/api", dir.path());
        ctx.session_store()
            .save(&StoredSession::new("https://other.example.com/api", "a", "r", None))
            .unwrap();

        let gateway = ctx.gateway().await.unwrap();
        assert!(!gateway.session().is_logged_in().await);
    }

    #[tokio::test]
    async fn test_profile_needs_a_field() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new("http://localhost:8080/api", dir.path());
        let err = cmd_profile(&ctx, None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }
}
