//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use kanban_models::{BoardId, BoardRole, ColumnId, CommentId, LabelId, TaskId, TaskStatus, UserId, Visibility};
use kanban_reconciler::Slot;

/// kanban - command-line client for the kanban board API
#[derive(Parser, Debug)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the REST API
    #[arg(long, env = "KANBAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Path to state directory
    #[arg(short, long, env = "KANBAN_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "KANBAN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        /// Full name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "KANBAN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Update your name or password
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Board operations
    Boards {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Board membership
    Members {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Column operations
    Columns {
        #[command(subcommand)]
        command: ColumnCommands,
    },

    /// Task operations
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Board labels
    Labels {
        #[command(subcommand)]
        command: LabelCommands,
    },

    /// Task comments
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Run a scripted drag session against an in-memory board
    Demo {
        /// Make the move request fail to show the rollback
        #[arg(long)]
        fail: bool,

        /// Drive the drag with the keyboard sensor
        #[arg(short, long)]
        keyboard: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// List your boards
    List {
        /// Output format (table, json, brief)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a board with its columns and tasks
    Show {
        board: BoardId,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a board
    Create {
        name: String,

        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
    },

    /// Rename a board or change its visibility
    Rename {
        board: BoardId,

        name: String,

        #[arg(long, value_enum)]
        visibility: Option<VisibilityArg>,
    },

    /// Delete a board
    Delete { board: BoardId },
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    List {
        board: BoardId,
    },

    Add {
        board: BoardId,

        user: UserId,

        #[arg(long, value_enum, default_value = "member")]
        role: RoleArg,
    },

    /// Change a member's role
    Role {
        board: BoardId,

        user: UserId,

        #[arg(value_enum)]
        role: RoleArg,
    },

    Remove {
        board: BoardId,

        user: UserId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// Add a column
    Add {
        board: BoardId,

        name: String,

        /// Insert at this position instead of appending
        #[arg(long)]
        position: Option<i64>,
    },

    /// Move a column to a new index (0 = leftmost)
    Move {
        board: BoardId,

        column: ColumnId,

        index: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task to a column
    Add {
        column: ColumnId,

        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Show task details
    Show { task: TaskId },

    /// Change task fields
    Update {
        task: TaskId,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    Delete { task: TaskId },

    /// Move a task to a column
    Move {
        board: BoardId,

        task: TaskId,

        column: ColumnId,

        #[command(flatten)]
        slot: SlotArgs,
    },

    /// Search tasks by text
    Search { query: Option<String> },

    /// Attach a label
    Label { task: TaskId, label: LabelId },

    /// Detach a label
    Unlabel { task: TaskId, label: LabelId },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    List {
        board: BoardId,
    },

    Add {
        board: BoardId,

        name: String,

        /// Hex color (#RRGGBB); defaults to the first preset
        #[arg(long)]
        color: Option<String>,
    },

    Update {
        label: LabelId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },

    Delete {
        label: LabelId,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    List { task: TaskId },

    Add { task: TaskId, body: String },

    Edit { comment: CommentId, body: String },

    Delete { comment: CommentId },
}

/// Where a moved task lands; the bottom of the column by default.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct SlotArgs {
    /// Put the task first
    #[arg(long, conflicts_with_all = ["bottom", "index"])]
    pub top: bool,

    /// Put the task last
    #[arg(long, conflicts_with = "index")]
    pub bottom: bool,

    /// Put the task at this index among the column's other tasks
    #[arg(long)]
    pub index: Option<usize>,
}

impl SlotArgs {
    pub fn slot(&self) -> Slot {
        match (self.top, self.index) {
            (true, _) => Slot::Top,
            (false, Some(index)) => Slot::Index(index),
            (false, None) => Slot::Bottom,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Brief,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityArg {
    Private,
    Public,
}

impl From<VisibilityArg> for Visibility {
    fn from(arg: VisibilityArg) -> Self {
        match arg {
            VisibilityArg::Private => Visibility::Private,
            VisibilityArg::Public => Visibility::Public,
        }
    }
}

/// Roles that can be granted; ownership is not transferable.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleArg {
    Admin,
    Member,
    Viewer,
}

impl From<RoleArg> for BoardRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => BoardRole::Admin,
            RoleArg::Member => BoardRole::Member,
            RoleArg::Viewer => BoardRole::Viewer,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Open,
    InProgress,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => TaskStatus::Open,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}

impl Cli {
    /// Returns the state directory path, using default if not specified.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(kanban_core::state_dir)
    }

    /// Returns the API base URL, using the environment default if not specified.
    pub fn api_url(&self) -> String {
        kanban_core::resolve_api_url(self.api_url.clone())
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
