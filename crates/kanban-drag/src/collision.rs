//! Drop target detection.

use crate::droppable::Droppable;
use crate::geometry::Rect;

/// Default tie-breaking tolerance for corner distance scores, in pixels.
pub const DEFAULT_TIE_EPSILON: f64 = 1.0;

/// Picks the droppable a dragged rectangle is over.
pub trait CollisionStrategy: Send + Sync {
    /// Returns the index into `candidates` of the winning region, or
    /// `None` when there are no candidates.
    fn detect(&self, dragged: &Rect, candidates: &[&Droppable]) -> Option<usize>;
}

/// "Closest corners": the region whose four corners are nearest to the
/// dragged rectangle's corresponding corners.
///
/// Scores within `epsilon` of the best are treated as tied; among tied
/// regions the deepest (innermost) wins, then the earliest registered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestCorners {
    pub epsilon: f64,
}

impl ClosestCorners {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Sum of the distances between corresponding corners.
    pub fn score(dragged: &Rect, target: &Rect) -> f64 {
        dragged
            .corners()
            .iter()
            .zip(target.corners().iter())
            .map(|(a, b)| a.distance(*b))
            .sum()
    }
}

impl Default for ClosestCorners {
    fn default() -> Self {
        Self::new(DEFAULT_TIE_EPSILON)
    }
}

impl CollisionStrategy for ClosestCorners {
    fn detect(&self, dragged: &Rect, candidates: &[&Droppable]) -> Option<usize> {
        let scores: Vec<f64> = candidates
            .iter()
            .map(|d| Self::score(dragged, &d.rect))
            .collect();
        let best = scores.iter().copied().fold(f64::INFINITY, f64::min);
        if !best.is_finite() {
            return None;
        }

        let mut winner: Option<usize> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let score = scores[index];
            if score.is_nan() || score > best + self.epsilon {
                continue;
            }
            match winner {
                Some(current) if candidate.depth <= candidates[current].depth => {}
                _ => winner = Some(index),
            }
        }
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_models::{ColumnId, TaskId};

    fn detect(dragged: Rect, candidates: &[Droppable]) -> Option<usize> {
        let refs: Vec<&Droppable> = candidates.iter().collect();
        ClosestCorners::default().detect(&dragged, &refs)
    }

    #[test]
    fn test_exact_overlap_scores_zero() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(ClosestCorners::score(&r, &r), 0.0);
        assert_eq!(
            ClosestCorners::score(&r, &r.translate(crate::geometry::Point::new(3.0, 4.0))),
            20.0
        );
    }

    #[test]
    fn test_picks_nearest() {
        let c = ColumnId::new(1);
        let candidates = vec![
            Droppable::for_task(TaskId::new(1), c, Rect::new(0.0, 0.0, 100.0, 40.0)),
            Droppable::for_task(TaskId::new(2), c, Rect::new(0.0, 50.0, 100.0, 40.0)),
        ];
        assert_eq!(detect(Rect::new(0.0, 45.0, 100.0, 40.0), &candidates), Some(1));
        assert_eq!(detect(Rect::new(0.0, 5.0, 100.0, 40.0), &candidates), Some(0));
    }

    #[test]
    fn test_tie_prefers_innermost() {
        let c = ColumnId::new(1);
        let same = Rect::new(0.0, 0.0, 100.0, 40.0);
        let candidates = vec![
            Droppable::for_column(c, same),
            Droppable::for_task(TaskId::new(1), c, same.translate(crate::geometry::Point::new(0.0, 0.2))),
        ];
        // Task scores 0.8 worse but within epsilon, and it is deeper.
        assert_eq!(detect(same, &candidates), Some(1));
    }

    #[test]
    fn test_tie_at_same_depth_prefers_earliest() {
        let c = ColumnId::new(1);
        let candidates = vec![
            Droppable::for_task(TaskId::new(1), c, Rect::new(0.0, 0.0, 100.0, 40.0)),
            Droppable::for_task(TaskId::new(2), c, Rect::new(0.0, 20.0, 100.0, 40.0)),
        ];
        // Equidistant from both.
        assert_eq!(detect(Rect::new(0.0, 10.0, 100.0, 40.0), &candidates), Some(0));
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(detect(Rect::new(0.0, 0.0, 1.0, 1.0), &[]), None);
    }
}
