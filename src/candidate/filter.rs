//! Background and confidence filtering of scored proposals.

use crate::candidate::Label;
use crate::view::ScoresView;

/// Index of the reserved background class.
pub const BACKGROUND_CLASS: usize = 0;

/// Assigns every region its highest-probability class.
///
/// The argmax runs over all classes including background. Exactly equal
/// probabilities resolve to the lowest class index, so the labeling is
/// deterministic for any input.
pub fn label_proposals(probs: &ScoresView<'_>) -> Vec<Label> {
    let mut labels = Vec::with_capacity(probs.num_rois());
    for roi in 0..probs.num_rois() {
        let row = probs.row(roi).expect("roi within bounds");
        let mut best = 0usize;
        for (class_id, &p) in row.iter().enumerate().skip(1) {
            if p > row[best] {
                best = class_id;
            }
        }
        labels.push(Label {
            class_id: best,
            score: row[best],
        });
    }
    labels
}

/// Returns the ascending index set of regions that pass both gates.
///
/// A region survives when its top class is not background and, if
/// `min_confidence` is set, its top-class score is at least the threshold.
/// The two conditions intersect; an empty result is valid and flows through
/// the remaining stages unchanged.
pub fn filter_candidates(labels: &[Label], min_confidence: Option<f32>) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.class_id != BACKGROUND_CLASS)
        .filter(|(_, label)| min_confidence.map_or(true, |floor| label.score >= floor))
        .map(|(idx, _)| idx)
        .collect()
}
