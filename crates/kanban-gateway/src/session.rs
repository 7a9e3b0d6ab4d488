//! Explicit login session.
//!
//! A [`Session`] is a cloneable handle shared by whatever issues gateway
//! calls. It replaces ambient global token storage: callers log in and
//! out through it, and the HTTP gateway reads the bearer token from it on
//! every request.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use kanban_models::{TokenResponse, User};

/// Tokens and (once fetched) the user they belong to.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<User>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }
}

impl From<TokenResponse> for Credentials {
    fn from(tokens: TokenResponse) -> Self {
        Self::new(tokens.access_token, tokens.refresh_token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .finish_non_exhaustive()
    }
}

/// Shared handle to the current login, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<Credentials>>>,
}

impl Session {
    /// Creates a logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that is already logged in, e.g. restored from disk.
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(credentials))),
        }
    }

    /// Stores credentials, replacing any previous login.
    pub async fn login(&self, credentials: Credentials) {
        let email = credentials.user.as_ref().map(|u| u.email.clone());
        *self.inner.write().await = Some(credentials);
        info!(user = ?email, "Session logged in");
    }

    /// Clears the login. Returns whether a login was present.
    pub async fn logout(&self) -> bool {
        let previous = self.inner.write().await.take();
        if previous.is_some() {
            info!("Session logged out");
        }
        previous.is_some()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Access token for the `Authorization` header.
    pub async fn bearer(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.as_ref().and_then(|c| c.user.clone())
    }

    /// Attaches the user profile to the current login. No-op when logged out.
    pub async fn set_user(&self, user: User) {
        if let Some(credentials) = self.inner.write().await.as_mut() {
            credentials.user = Some(user);
        }
    }

    /// Snapshot of the current credentials.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_models::{UserId, UserRole};

    fn user() -> User {
        User {
            id: UserId::new(1),
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_login_logout_lifecycle() {
        let session = Session::new();
        assert!(!session.is_logged_in().await);
        assert!(session.bearer().await.is_none());

        session.login(Credentials::new("access", "refresh")).await;
        assert!(session.is_logged_in().await);
        assert_eq!(session.bearer().await.as_deref(), Some("access"));

        assert!(session.logout().await);
        assert!(!session.logout().await);
        assert!(session.bearer().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let session = Session::new();
        let other = session.clone();

        session.login(Credentials::new("a", "r")).await;
        assert!(other.is_logged_in().await);

        other.logout().await;
        assert!(!session.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_set_user_requires_login() {
        let session = Session::new();
        session.set_user(user()).await;
        assert!(session.user().await.is_none());

        session.login(Credentials::new("a", "r")).await;
        session.set_user(user()).await;
        assert_eq!(session.user().await.unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_with_credentials() {
        let session = Session::with_credentials(Credentials::new("a", "r").with_user(user()));
        assert!(session.is_logged_in().await);
        assert_eq!(session.user().await.unwrap().id, UserId::new(1));
    }

    #[test]
    fn test_credentials_debug_hides_tokens() {
        let rendered = format!("{:?}", Credentials::new("secret-a", "secret-r"));
        assert!(!rendered.contains("secret"));
    }
}
