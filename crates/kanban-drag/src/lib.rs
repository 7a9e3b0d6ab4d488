//! Drag-and-drop session handling for the kanban board.
//!
//! This crate is input-device agnostic: the host feeds pointer or
//! keyboard events together with the measured layout ([`Droppable`]
//! regions), and the [`DragController`] answers what is being hovered
//! and, on release, what should move where ([`DropIntent`]).

pub mod collision;
pub mod controller;
pub mod droppable;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod keyboard;
pub mod metrics;
pub mod placement;

pub use collision::{ClosestCorners, CollisionStrategy, DEFAULT_TIE_EPSILON};
pub use controller::{
    DragConfig, DragController, DragEvent, DragSession, DropIntent, InputMode, OverTarget,
    SessionState, DEFAULT_ACTIVATION_DISTANCE,
};
pub use droppable::Droppable;
pub use entity::{DragEntity, EntityKind, EntityRef};
pub use error::{DragError, Result};
pub use geometry::{Point, Rect};
pub use keyboard::Direction;
pub use metrics::GridMetrics;
pub use placement::Placement;
