//! Kanban Gateway - access to the kanban REST API.
//!
//! - [`BoardGateway`]: the async seam the board cache and move reconciler
//!   depend on (board, columns, tasks of a column, move task, create and
//!   move column).
//! - [`HttpGateway`]: `reqwest` implementation of that seam plus the rest
//!   of the REST surface (auth, profile, boards, members, tasks, labels,
//!   comments).
//! - [`InMemoryGateway`]: in-process implementation with failure
//!   injection and latency, for tests and demos.
//! - [`Session`]: explicit login context passed to the HTTP gateway.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod session;

pub use config::{GatewayConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::{GatewayError, Result};
pub use gateway::BoardGateway;
pub use http::{HttpGateway, REQUEST_ID_HEADER};
pub use memory::{InMemoryGateway, Operation};
pub use session::{Credentials, Session};
