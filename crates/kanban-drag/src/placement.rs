//! Where, relative to the hovered target, a drop lands.

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Before the target in list order.
    Before,
    /// After the target in list order.
    After,
    /// Top of a column's task list.
    Top,
    /// Bottom of a column's task list.
    Bottom,
}

/// Before/After along the vertical axis. When the centers are level,
/// moving down means After.
pub fn vertical(dragged: &Rect, target: &Rect, direction_y: f64) -> Placement {
    let (d, t) = (dragged.center().y, target.center().y);
    if d > t || (d == t && direction_y > 0.0) {
        Placement::After
    } else {
        Placement::Before
    }
}

/// Before/After along the horizontal axis, for column reordering.
pub fn horizontal(dragged: &Rect, target: &Rect, direction_x: f64) -> Placement {
    let (d, t) = (dragged.center().x, target.center().x);
    if d > t || (d == t && direction_x > 0.0) {
        Placement::After
    } else {
        Placement::Before
    }
}

/// Top/Bottom for a drop on a column's empty area.
///
/// Bottom when the dragged center is below the last task's center; for an
/// empty column, Bottom when the drag was moving down.
pub fn column_edge(dragged: &Rect, last_task: Option<&Rect>, direction_y: f64) -> Placement {
    let below = match last_task {
        Some(last) => dragged.center().y > last.center().y,
        None => direction_y > 0.0,
    };
    if below {
        Placement::Bottom
    } else {
        Placement::Top
    }
}
