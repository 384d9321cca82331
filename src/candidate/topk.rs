//! Deterministic score ranking and global truncation.

use std::cmp::Ordering;

use crate::candidate::Label;

/// Descending-score comparator over region indices.
///
/// Ties on exactly equal scores resolve to the lower region index, so any
/// sort using this comparator is a total, deterministic order.
fn index_cmp_desc(a: usize, b: usize, labels: &[Label]) -> Ordering {
    labels[b]
        .score
        .total_cmp(&labels[a].score)
        .then_with(|| a.cmp(&b))
}

/// Sorts region indices by descending score with deterministic tie-breaking.
pub(crate) fn sort_indices_desc(indices: &mut [usize], labels: &[Label]) {
    indices.sort_by(|&a, &b| index_cmp_desc(a, b, labels));
}

/// Returns the top `min(|kept|, k)` indices by descending score.
///
/// The result preserves the ranking order, not set order: the first element
/// is the highest-scoring survivor. An empty input yields an empty output.
pub fn rank_top_k(kept: &[usize], labels: &[Label], k: usize) -> Vec<usize> {
    let mut ranked = kept.to_vec();
    sort_indices_desc(&mut ranked, labels);
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::rank_top_k;
    use crate::candidate::Label;

    fn labels(scores: &[f32]) -> Vec<Label> {
        scores
            .iter()
            .map(|&score| Label { class_id: 1, score })
            .collect()
    }

    #[test]
    fn ranks_by_descending_score() {
        let labels = labels(&[0.3, 0.9, 0.5]);
        assert_eq!(rank_top_k(&[0, 1, 2], &labels, 10), vec![1, 2, 0]);
    }

    #[test]
    fn truncates_to_k() {
        let labels = labels(&[0.3, 0.9, 0.5, 0.7]);
        assert_eq!(rank_top_k(&[0, 1, 2, 3], &labels, 2), vec![1, 3]);
    }

    #[test]
    fn ties_resolve_to_the_lower_index() {
        let labels = labels(&[0.5, 0.5, 0.5]);
        assert_eq!(rank_top_k(&[0, 1, 2], &labels, 2), vec![0, 1]);
    }

    #[test]
    fn empty_input_is_not_an_error() {
        assert!(rank_top_k(&[], &[], 5).is_empty());
    }

    #[test]
    fn k_of_zero_yields_nothing() {
        let labels = labels(&[0.9]);
        assert!(rank_top_k(&[0], &labels, 0).is_empty());
    }
}
