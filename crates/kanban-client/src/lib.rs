//! Kanban Client - board controller and command-line client.
//!
//! - [`BoardController`]: ties a loaded board to the drag controller and
//!   the move reconciler. Feed it pointer or keyboard input; completed
//!   drops are persisted in the background and rolled back on failure.
//! - [`cli`] and [`commands`]: the `kanban` command-line client over the
//!   REST gateway.
//! - [`demo`]: a scripted drag session against an in-memory board.

pub mod board;
pub mod cli;
pub mod commands;
pub mod demo;
pub mod error;

pub use board::{BoardAction, BoardController, ControllerConfig, PendingMove};
pub use commands::Context;
pub use error::{ClientError, Result};
