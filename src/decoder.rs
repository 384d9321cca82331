//! High-level detection decoding.
//!
//! `decode_image` runs the full per-image pipeline: top-class labeling, delta
//! decoding and window clipping, background/confidence filtering, per-class
//! suppression, global ranking, and assembly of pixel-coordinate detection
//! records. `decode_batch` maps it over independent images.

use crate::boxes::transform::apply_delta;
use crate::boxes::{Detection, RoiBox};
use crate::candidate::filter::{filter_candidates, label_proposals};
use crate::candidate::nms::suppress_per_class;
use crate::candidate::topk::rank_top_k;
use crate::trace::{trace_event, trace_span};
use crate::util::{DecodeError, DecodeResult};
use crate::view::{DeltasView, ScoresView};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Decoding parameters, explicit per call.
///
/// Defaults match the customary two-stage head settings: confidence floor
/// 0.7, suppression IoU 0.3, at most 100 detections per class and in total,
/// zero delta means and `(0.1, 0.1, 0.2, 0.2)` delta stds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeConfig {
    /// Minimum top-class score; `None` disables the confidence gate.
    pub min_confidence: Option<f32>,
    /// IoU above which a lower-scoring same-class box is suppressed.
    pub nms_iou_threshold: f32,
    /// Maximum detections kept per class during suppression.
    pub max_instances_per_class: usize,
    /// Maximum detections returned per image.
    pub max_total_detections: usize,
    /// Means used to de-standardize regression deltas.
    pub target_means: [f32; 4],
    /// Stds used to de-standardize regression deltas, all positive.
    pub target_stds: [f32; 4],
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            min_confidence: Some(0.7),
            nms_iou_threshold: 0.3,
            max_instances_per_class: 100,
            max_total_detections: 100,
            target_means: [0.0, 0.0, 0.0, 0.0],
            target_stds: [0.1, 0.1, 0.2, 0.2],
        }
    }
}

impl DecodeConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> DecodeResult<()> {
        if let Some(floor) = self.min_confidence {
            if !floor.is_finite() || !(0.0..=1.0).contains(&floor) {
                return Err(DecodeError::InvalidConfig {
                    field: "min_confidence",
                    reason: "must be a finite value in [0, 1]",
                });
            }
        }
        if !self.nms_iou_threshold.is_finite() || !(0.0..=1.0).contains(&self.nms_iou_threshold) {
            return Err(DecodeError::InvalidConfig {
                field: "nms_iou_threshold",
                reason: "must be a finite value in [0, 1]",
            });
        }
        if self.max_instances_per_class == 0 {
            return Err(DecodeError::InvalidConfig {
                field: "max_instances_per_class",
                reason: "must be at least 1",
            });
        }
        if self.max_total_detections == 0 {
            return Err(DecodeError::InvalidConfig {
                field: "max_total_detections",
                reason: "must be at least 1",
            });
        }
        if self.target_means.iter().any(|m| !m.is_finite()) {
            return Err(DecodeError::InvalidConfig {
                field: "target_means",
                reason: "must be finite",
            });
        }
        if self.target_stds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(DecodeError::InvalidConfig {
                field: "target_stds",
                reason: "must be finite and positive",
            });
        }
        Ok(())
    }
}

/// One image's worth of network outputs and proposals.
#[derive(Copy, Clone)]
pub struct ProposalSet<'a> {
    /// Class probabilities, `[num_rois, num_classes]`.
    pub probs: ScoresView<'a>,
    /// Per-class regression deltas, `[num_rois, num_classes, 4]`.
    pub deltas: DeltasView<'a>,
    /// Proposal boxes in normalized coordinates.
    pub rois: &'a [RoiBox],
    /// Output image `(height, width)` in pixels.
    pub image_shape: (u32, u32),
}

/// Decodes one image's proposals into final detections.
///
/// The returned detections are in pixel coordinates, sorted by descending
/// score with lower region indices first on exact ties, at most
/// `max_total_detections` long. Zero proposals yield an empty vector; shape
/// disagreements between the inputs are errors. Regions whose decoded box is
/// non-finite (NaN scores or deltas from the network) are dropped
/// individually rather than failing the call.
pub fn decode_image(
    probs: ScoresView<'_>,
    deltas: DeltasView<'_>,
    rois: &[RoiBox],
    image_shape: (u32, u32),
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<Detection>> {
    cfg.validate()?;
    check_shapes(&probs, &deltas, rois, image_shape)?;
    if rois.is_empty() {
        return Ok(Vec::new());
    }

    let _span = trace_span!("decode_image", rois = rois.len(), classes = probs.num_classes())
        .entered();

    let labels = label_proposals(&probs);

    // Decode every region with its top class's delta, then clip to the full
    // normalized window.
    let mut decoded = Vec::with_capacity(rois.len());
    for (idx, roi) in rois.iter().enumerate() {
        let delta = deltas
            .delta(idx, labels[idx].class_id)
            .expect("roi and class within checked bounds");
        decoded.push(apply_delta(*roi, delta, cfg.target_means, cfg.target_stds).clip(1.0, 1.0));
    }

    let mut survivors = filter_candidates(&labels, cfg.min_confidence);
    // Non-finite boxes cannot participate in IoU comparisons; drop them.
    survivors.retain(|&idx| decoded[idx].is_finite());
    trace_event!("after_filter", count = survivors.len());

    let kept = suppress_per_class(
        &survivors,
        &labels,
        &decoded,
        cfg.nms_iou_threshold,
        cfg.max_instances_per_class,
    );
    trace_event!("after_nms", count = kept.len());

    let ranked = rank_top_k(&kept, &labels, cfg.max_total_detections);

    let height = image_shape.0 as f32;
    let width = image_shape.1 as f32;
    let detections = ranked
        .into_iter()
        .map(|idx| {
            let bbox = decoded[idx].to_pixels(height, width);
            Detection {
                y1: bbox.y1,
                x1: bbox.x1,
                y2: bbox.y2,
                x2: bbox.x2,
                class_id: labels[idx].class_id,
                score: labels[idx].score,
            }
        })
        .collect();
    Ok(detections)
}

/// Decodes a batch of independent images, preserving input order.
pub fn decode_batch(
    inputs: &[ProposalSet<'_>],
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<Vec<Detection>>> {
    inputs
        .iter()
        .map(|set| decode_image(set.probs, set.deltas, set.rois, set.image_shape, cfg))
        .collect()
}

/// Decodes a batch on the rayon pool; output is identical to [`decode_batch`].
///
/// No state crosses images, so the fan-out needs no ordering beyond
/// collecting results back into input position.
#[cfg(feature = "rayon")]
pub fn decode_batch_par(
    inputs: &[ProposalSet<'_>],
    cfg: &DecodeConfig,
) -> DecodeResult<Vec<Vec<Detection>>> {
    inputs
        .par_iter()
        .map(|set| decode_image(set.probs, set.deltas, set.rois, set.image_shape, cfg))
        .collect()
}

fn check_shapes(
    probs: &ScoresView<'_>,
    deltas: &DeltasView<'_>,
    rois: &[RoiBox],
    image_shape: (u32, u32),
) -> DecodeResult<()> {
    if probs.num_rois() != rois.len() || deltas.num_rois() != rois.len() {
        return Err(DecodeError::RoiCountMismatch {
            probs: probs.num_rois(),
            deltas: deltas.num_rois(),
            rois: rois.len(),
        });
    }
    if probs.num_classes() != deltas.num_classes() {
        return Err(DecodeError::ClassCountMismatch {
            probs: probs.num_classes(),
            deltas: deltas.num_classes(),
        });
    }
    if image_shape.0 == 0 || image_shape.1 == 0 {
        return Err(DecodeError::InvalidImageShape {
            height: image_shape.0,
            width: image_shape.1,
        });
    }
    Ok(())
}
