//! Persistence layer for the kanban client.
//!
//! The only state the client keeps on disk is the login session. It is
//! written atomically (temp file, then rename) so a crash never leaves a
//! half-written token file behind.
//!
//! # Example
//!
//! ```no_run
//! use kanban_persistence::SessionStore;
//!
//! let store = SessionStore::new("/home/user/.kanban/state/session.json");
//! if let Some(session) = store.load().unwrap() {
//!     println!("logged in against {}", session.api_url);
//! }
//! ```

pub mod atomic;
pub mod error;
pub mod session_store;

pub use error::{PersistenceError, Result};
pub use session_store::{SessionStore, StoredSession};
