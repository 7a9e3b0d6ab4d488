//! Kanban Core - shared configuration for every kanban client crate.
//!
//! - **config**: state directory layout, API base URL and move timeout,
//!   each overridable from the environment.

pub mod config;

pub use config::{
    api_url, config_dir, ensure_runtime_state_dir, env_file, move_timeout, parse_move_timeout,
    resolve_api_url, runtime_state_dir, runtime_state_dir_in, session_file, session_file_in,
    state_dir, API_URL_ENV, DEFAULT_API_URL, DEFAULT_MOVE_TIMEOUT, MOVE_TIMEOUT_ENV,
    STATE_DIR_ENV,
};
