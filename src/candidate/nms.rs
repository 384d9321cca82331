//! Per-class greedy non-maximum suppression.

use std::collections::BTreeMap;

use crate::boxes::{iou, RoiBox};
use crate::candidate::topk::sort_indices_desc;
use crate::candidate::Label;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Suppresses overlapping candidates independently within each class.
///
/// `survivors` is an ascending index set into `labels` and `boxes`. Within
/// each class present among the survivors, candidates are visited in
/// descending score order (ascending index on equal scores) and kept unless
/// their IoU with an already kept box of the same class exceeds
/// `iou_threshold`; at most `max_per_class` are kept per class. The per-class
/// kept sets are unioned, intersected with `survivors`, and returned as an
/// ascending index set.
pub fn suppress_per_class(
    survivors: &[usize],
    labels: &[Label],
    boxes: &[RoiBox],
    iou_threshold: f32,
    max_per_class: usize,
) -> Vec<usize> {
    let mut kept: Vec<usize> = partition_by_class(survivors, labels)
        .into_iter()
        .flat_map(|(_, indices)| suppress_class(indices, labels, boxes, iou_threshold, max_per_class))
        .collect();
    finish_kept(&mut kept, survivors);
    kept
}

/// Parallel variant of [`suppress_per_class`] fanning out over classes.
///
/// The per-class partitions are independent and the union is re-sorted, so
/// the output is identical to the sequential variant for any input.
#[cfg(feature = "rayon")]
pub fn suppress_per_class_par(
    survivors: &[usize],
    labels: &[Label],
    boxes: &[RoiBox],
    iou_threshold: f32,
    max_per_class: usize,
) -> Vec<usize> {
    let partitions: Vec<Vec<usize>> = partition_by_class(survivors, labels)
        .into_iter()
        .map(|(_, indices)| indices)
        .collect();
    let mut kept: Vec<usize> = partitions
        .into_par_iter()
        .flat_map(|indices| suppress_class(indices, labels, boxes, iou_threshold, max_per_class))
        .collect();
    finish_kept(&mut kept, survivors);
    kept
}

/// Groups surviving indices by class id in deterministic class order.
fn partition_by_class(survivors: &[usize], labels: &[Label]) -> BTreeMap<usize, Vec<usize>> {
    let mut partitions: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &idx in survivors {
        partitions.entry(labels[idx].class_id).or_default().push(idx);
    }
    partitions
}

/// Greedy suppression within one class partition.
fn suppress_class(
    mut indices: Vec<usize>,
    labels: &[Label],
    boxes: &[RoiBox],
    iou_threshold: f32,
    max_per_class: usize,
) -> Vec<usize> {
    sort_indices_desc(&mut indices, labels);

    let mut kept: Vec<usize> = Vec::new();
    'outer: for idx in indices {
        if kept.len() == max_per_class {
            break;
        }
        for &kept_idx in kept.iter() {
            if iou(&boxes[idx], &boxes[kept_idx]) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(idx);
    }
    kept
}

/// Restores set form: ascending order, restricted to the original survivors.
fn finish_kept(kept: &mut Vec<usize>, survivors: &[usize]) {
    kept.sort_unstable();
    kept.retain(|idx| survivors.binary_search(idx).is_ok());
}
