//! Persisted login session.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kanban_models::User;

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Session data written to disk after a successful login.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Base URL the tokens were issued for.
    pub api_url: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<User>,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user: Option<User>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user,
            saved_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("api_url", &self.api_url)
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("saved_at", &self.saved_at)
            .finish_non_exhaustive()
    }
}

/// Reads and writes the session file.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the session, replacing any previous one.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        atomic_write_json(&self.path, session)?;
        info!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Loads the session, if one has been saved.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let session = read_json_optional(&self.path)?;
        debug!(path = %self.path.display(), found = session.is_some(), "Session loaded");
        Ok(session)
    }

    /// Removes the session file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Session cleared");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PersistenceError::RemoveError {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_models::{UserId, UserRole};
    use tempfile::tempdir;

    fn sample() -> StoredSession {
        StoredSession::new(
            "http://localhost:8080/api/v1",
            "access",
            "refresh",
            Some(User {
                id: UserId::new(1),
                full_name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                role: UserRole::User,
            }),
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("state/session.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, sample_with_time(loaded.saved_at));
    }

    fn sample_with_time(saved_at: DateTime<Utc>) -> StoredSession {
        StoredSession {
            saved_at,
            ..sample()
        }
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        assert!(!store.clear().unwrap());
        store.save(&sample()).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("access"));
        assert!(rendered.contains("ada@example.com"));
    }
}
