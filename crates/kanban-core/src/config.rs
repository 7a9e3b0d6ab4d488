//! Shared configuration for the kanban client.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.kanban/
//! ├── config/       # .env.local and user settings
//! └── state/        # session.json
//! ```
//!
//! # Environment Variables
//!
//! - `KANBAN_STATE_DIR`: Override the base state directory
//! - `KANBAN_API_URL`: REST API base URL
//! - `KANBAN_MOVE_TIMEOUT_MS`: Move request timeout in milliseconds

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use tracing::warn;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "KANBAN_STATE_DIR";

/// Environment variable for the REST API base URL.
pub const API_URL_ENV: &str = "KANBAN_API_URL";

/// Environment variable for the move request timeout, in milliseconds.
pub const MOVE_TIMEOUT_ENV: &str = "KANBAN_MOVE_TIMEOUT_MS";

/// Base URL used when `KANBAN_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Move timeout used when `KANBAN_MOVE_TIMEOUT_MS` is unset or invalid.
pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_STATE_DIR: &str = ".kanban";
const CONFIG_SUBDIR: &str = "config";
const STATE_SUBDIR: &str = "state";
const SESSION_FILE: &str = "session.json";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the kanban state directory.
///
/// The state directory is determined by:
/// 1. `KANBAN_STATE_DIR` environment variable if set
/// 2. `~/.kanban` if home directory is available
/// 3. `.kanban` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the `.env.local` file path.
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Get the runtime state directory.
pub fn runtime_state_dir() -> PathBuf {
    runtime_state_dir_in(&state_dir())
}

/// Runtime state directory under an explicit base directory.
pub fn runtime_state_dir_in(base: &Path) -> PathBuf {
    base.join(STATE_SUBDIR)
}

/// Get the persisted login session file path.
pub fn session_file() -> PathBuf {
    session_file_in(&state_dir())
}

/// Session file under an explicit base directory.
pub fn session_file_in(base: &Path) -> PathBuf {
    runtime_state_dir_in(base).join(SESSION_FILE)
}

/// Ensure the runtime state directory exists.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_runtime_state_dir() -> std::io::Result<()> {
    let dir = runtime_state_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

/// REST API base URL from `KANBAN_API_URL`, or the default.
pub fn api_url() -> String {
    resolve_api_url(std::env::var(API_URL_ENV).ok())
}

/// Normalizes an optional configured base URL.
///
/// Blank values fall back to [`DEFAULT_API_URL`]; a trailing slash is
/// stripped so paths can be appended uniformly.
pub fn resolve_api_url(configured: Option<String>) -> String {
    configured
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Move request timeout from `KANBAN_MOVE_TIMEOUT_MS`, or the default.
pub fn move_timeout() -> Duration {
    parse_move_timeout(std::env::var(MOVE_TIMEOUT_ENV).ok().as_deref())
}

/// Parses a timeout in milliseconds, falling back to [`DEFAULT_MOVE_TIMEOUT`].
pub fn parse_move_timeout(raw: Option<&str>) -> Duration {
    match raw.map(str::trim) {
        None | Some("") => DEFAULT_MOVE_TIMEOUT,
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => Duration::from_millis(ms),
            _ => {
                warn!(value = %value, "Ignoring invalid {}", MOVE_TIMEOUT_ENV);
                DEFAULT_MOVE_TIMEOUT
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables can't be isolated under parallel test
    // execution, so the env-reading wrappers are only smoke tested.

    #[test]
    fn test_state_dir_smoke() {
        let dir = state_dir();
        assert!(dir.is_absolute() || dir.ends_with(".kanban"));
    }

    #[test]
    fn test_config_dir_name() {
        assert!(config_dir().ends_with("config"));
        assert!(env_file().ends_with(".env.local"));
    }

    #[test]
    fn test_session_file_in() {
        let tmp = tempfile::tempdir().unwrap();
        let file = session_file_in(tmp.path());
        assert_eq!(file, tmp.path().join("state").join("session.json"));
        assert!(session_file().ends_with("state/session.json"));
    }

    #[test]
    fn test_resolve_api_url() {
        assert_eq!(resolve_api_url(None), DEFAULT_API_URL);
        assert_eq!(resolve_api_url(Some("  ".into())), DEFAULT_API_URL);
        assert_eq!(
            resolve_api_url(Some("https://kanban.example.com/api/v1/".into())),
            "https://kanban.example.com/api/v1"
        );
    }

    #[test]
    fn test_parse_move_timeout() {
        assert_eq!(parse_move_timeout(None), DEFAULT_MOVE_TIMEOUT);
        assert_eq!(parse_move_timeout(Some("250")), Duration::from_millis(250));
        assert_eq!(parse_move_timeout(Some("0")), DEFAULT_MOVE_TIMEOUT);
        assert_eq!(parse_move_timeout(Some("soon")), DEFAULT_MOVE_TIMEOUT);
    }
}
