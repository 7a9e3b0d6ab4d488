//! Kanban Cache - the board state cache.
//!
//! Holds the last-fetched board, its columns and the flattened task list
//! of every column, keyed by board id. Reads are served from cache until
//! a query key is invalidated; invalidations are broadcast so views can
//! re-render.

pub mod cache;
pub mod error;
pub mod grouping;
pub mod key;

pub use cache::{BoardCache, BoardSnapshot, CacheEvent};
pub use error::{CacheError, Result};
pub use grouping::tasks_by_column;
pub use key::QueryKey;
