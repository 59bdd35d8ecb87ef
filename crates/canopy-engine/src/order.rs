//! Position arithmetic for sibling groups.
//!
//! Positions within a sibling group are a contiguous integer sequence
//! starting at 0. The functions here are pure: they take the siblings in
//! current position order and produce the full `(id, position)` assignment
//! batch to persist. Persisting the whole batch atomically (and serializing
//! writers per scope) is the engine's job.

use canopy_model::NodeId;

/// Position for a node appended at the end of a group of `len` siblings.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn append_position(len: usize) -> i64 {
    len as i64
}

/// Reassign `0..n-1` in the given order.
///
/// Used to repair a scope whose stored positions drifted (legacy data) and
/// as the building block of [`move_plan`].
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn normalize(ids: &[NodeId]) -> Vec<(NodeId, i64)> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i64))
        .collect()
}

/// Assignment batch that moves the sibling at `from` to `to`.
///
/// The moved node takes `to`; every sibling between the two positions shifts
/// by one in the direction that closes the gap. The result covers the whole
/// group, so applying it atomically always restores `0..n-1`.
///
/// Both indices must be in bounds; the caller validates them.
#[must_use]
pub fn move_plan(ids: &[NodeId], from: usize, to: usize) -> Vec<(NodeId, i64)> {
    debug_assert!(from < ids.len());
    debug_assert!(to < ids.len());

    let mut reordered: Vec<NodeId> = ids.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    normalize(&reordered)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ids(n: usize) -> Vec<NodeId> {
        (0..n).map(|_| NodeId::new()).collect()
    }

    /// Positions extracted in id order of the original slice.
    fn positions_for(ids: &[NodeId], plan: &[(NodeId, i64)]) -> Vec<i64> {
        ids.iter()
            .map(|id| plan.iter().find(|(p, _)| p == id).unwrap().1)
            .collect()
    }

    fn assert_contiguous(plan: &[(NodeId, i64)]) {
        let mut positions: Vec<i64> = plan.iter().map(|(_, p)| *p).collect();
        positions.sort_unstable();
        let expected: Vec<i64> = (0..plan.len() as i64).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_append_position() {
        assert_eq!(append_position(0), 0);
        assert_eq!(append_position(3), 3);
    }

    #[test]
    fn test_normalize_assigns_zero_based_sequence() {
        let group = ids(4);

        let plan = normalize(&group);

        assert_eq!(positions_for(&group, &plan), [0, 1, 2, 3]);
    }

    #[test]
    fn test_move_forward_shifts_between_down() {
        let group = ids(5);

        let plan = move_plan(&group, 1, 3);

        // Moved node lands on 3; 2 and 3 shift down to close the gap.
        assert_eq!(positions_for(&group, &plan), [0, 3, 1, 2, 4]);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_move_backward_shifts_between_up() {
        let group = ids(5);

        let plan = move_plan(&group, 3, 1);

        assert_eq!(positions_for(&group, &plan), [0, 2, 3, 1, 4]);
        assert_contiguous(&plan);
    }

    #[test]
    fn test_move_to_same_index_is_identity() {
        let group = ids(3);

        let plan = move_plan(&group, 1, 1);

        assert_eq!(positions_for(&group, &plan), [0, 1, 2]);
    }

    #[test]
    fn test_move_to_ends() {
        let group = ids(4);

        assert_eq!(positions_for(&group, &move_plan(&group, 2, 0)), [1, 2, 0, 3]);
        assert_eq!(positions_for(&group, &move_plan(&group, 0, 3)), [3, 0, 1, 2]);
    }

    #[test]
    fn test_contiguity_over_operation_sequence() {
        // Model a sibling group through a mixed sequence of appends,
        // removals, and moves; the stored order must stay 0..n-1 throughout.
        let mut group: Vec<NodeId> = Vec::new();

        for step in 0..64_usize {
            match step % 4 {
                0 | 1 => {
                    assert_eq!(append_position(group.len()), group.len() as i64);
                    group.push(NodeId::new());
                }
                2 if group.len() > 1 => {
                    let from = step % group.len();
                    let to = (step / 2) % group.len();
                    let plan = move_plan(&group, from, to);
                    assert_contiguous(&plan);
                    let moved = group.remove(from);
                    group.insert(to, moved);
                }
                _ if !group.is_empty() => {
                    group.remove(step % group.len());
                    let plan = normalize(&group);
                    assert_contiguous(&plan);
                }
                _ => {}
            }
        }
    }
}
