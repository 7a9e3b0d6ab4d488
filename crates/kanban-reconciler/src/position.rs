//! Index-based position math.
//!
//! Destination positions are derived from the destination's list index
//! and the positions of the siblings around it, never copied from a
//! sibling. The server is assumed to insert at the requested position,
//! shifting siblings at or after it.

/// Removes the element at `from` and reinserts it at `to`.
///
/// `to` is an index into the list after removal and is clamped to its end.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
}

/// Position for an entity inserted at `index` among `siblings`, whose
/// positions are in list order and exclude the moved entity.
pub fn position_at(siblings: &[i64], index: usize) -> i64 {
    let (Some(&first), Some(&last)) = (siblings.first(), siblings.last()) else {
        return 1;
    };
    if index == 0 {
        return first - 1;
    }
    if index >= siblings.len() {
        return last + 1;
    }
    let (prev, next) = (siblings[index - 1], siblings[index]);
    if next - prev >= 2 {
        prev + (next - prev) / 2
    } else {
        next
    }
}

/// Bumps positions after `index` so the list stays strictly increasing.
pub fn renumber_from<T>(items: &mut [T], index: usize, position: impl Fn(&mut T) -> &mut i64) {
    let Some(mut previous) = items.get_mut(index).map(|item| *position(item)) else {
        return;
    };
    for item in items.iter_mut().skip(index + 1) {
        let current = position(item);
        if *current <= previous {
            *current = previous + 1;
        }
        previous = *current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_move() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        array_move(&mut items, 0, 2);
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);
        array_move(&mut items, 3, 0);
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
        array_move(&mut items, 1, 10);
        assert_eq!(items, vec!['d', 'c', 'a', 'b']);
        array_move(&mut items, 9, 0);
        assert_eq!(items, vec!['d', 'c', 'a', 'b']);
    }

    #[test]
    fn test_edges() {
        assert_eq!(position_at(&[], 0), 1);
        assert_eq!(position_at(&[1, 2], 0), 0);
        assert_eq!(position_at(&[1, 2], 2), 3);
        assert_eq!(position_at(&[-4, 7], 9), 8);
    }

    #[test]
    fn test_between() {
        assert_eq!(position_at(&[10, 20, 30], 1), 15);
        assert_eq!(position_at(&[10, 13], 1), 11);
        // No room: take the next sibling's slot.
        assert_eq!(position_at(&[1, 2, 3], 1), 2);
        assert_eq!(position_at(&[5, 6], 1), 6);
    }

    #[test]
    fn test_renumber_from() {
        let mut positions = vec![1, 2, 2, 3, 9];
        renumber_from(&mut positions, 1, |p| p);
        assert_eq!(positions, vec![1, 2, 3, 4, 9]);

        let mut untouched = vec![1, 5, 9];
        renumber_from(&mut untouched, 0, |p| p);
        assert_eq!(untouched, vec![1, 5, 9]);
        renumber_from(&mut untouched, 7, |p| p);
    }
}
