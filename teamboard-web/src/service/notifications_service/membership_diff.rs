use std::collections::BTreeSet;

///
/// Partition of project members into removed, added and retained.
/// The three sets are disjoint and sorted ascending.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDiff {
    pub removed: Vec<i64>,
    pub added: Vec<i64>,
    pub retained: Vec<i64>,
}

impl MembershipDiff {
    pub fn compute(before: &[i64], after: &[i64]) -> Self {
        let before = before.iter().copied().collect::<BTreeSet<_>>();
        let after = after.iter().copied().collect::<BTreeSet<_>>();

        Self {
            removed: before.difference(&after).copied().collect(),
            added: after.difference(&before).copied().collect(),
            retained: after.intersection(&before).copied().collect(),
        }
    }

    pub fn members_changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compute_overlapping_sets() {
        let diff = MembershipDiff::compute(&[1, 2, 3], &[2, 3, 4]);

        assert_eq!(diff.removed, vec![1]);
        assert_eq!(diff.added, vec![4]);
        assert_eq!(diff.retained, vec![2, 3]);
        assert!(diff.members_changed());
    }

    #[test]
    fn compute_identical_sets() {
        let diff = MembershipDiff::compute(&[3, 1, 2], &[1, 2, 3]);

        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());
        assert_eq!(diff.retained, vec![1, 2, 3]);
        assert!(!diff.members_changed());
    }

    #[test]
    fn compute_duplicates_are_ignored() {
        let diff = MembershipDiff::compute(&[1, 1, 2], &[2, 2, 5, 5]);

        assert_eq!(diff.removed, vec![1]);
        assert_eq!(diff.added, vec![5]);
        assert_eq!(diff.retained, vec![2]);
    }

    #[test]
    fn compute_from_empty() {
        let diff = MembershipDiff::compute(&[], &[7, 8]);

        assert!(diff.removed.is_empty());
        assert_eq!(diff.added, vec![7, 8]);
        assert!(diff.retained.is_empty());
    }
}
