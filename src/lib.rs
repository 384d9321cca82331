//! detdecode turns raw two-stage detection head outputs into final detections.
//!
//! Given per-region class probabilities, per-class box regression deltas, and
//! the region proposals themselves, the decoder refines and clips the boxes,
//! drops background and low-confidence candidates, suppresses duplicates per
//! class, ranks globally, and emits pixel-coordinate detection records. The
//! whole pipeline is deterministic and stateless per image; batches are
//! processed image by image, optionally in parallel via the `rayon` feature.

pub mod boxes;
mod candidate;
pub mod decoder;
mod trace;
pub mod util;
pub mod view;

pub use boxes::transform::{apply_delta, encode_delta};
pub use boxes::{iou, BoxDelta, Detection, RoiBox};
pub use decoder::{decode_batch, decode_image, DecodeConfig, ProposalSet};
pub use util::{DecodeError, DecodeResult};
pub use view::{DeltasView, ScoresView};

#[cfg(feature = "rayon")]
pub use decoder::decode_batch_par;

/// Low-level building blocks for custom decoding pipelines.
///
/// These expose the individual stages for use cases beyond the high-level
/// `decode_image` / `decode_batch` API, such as running suppression on
/// externally decoded boxes or swapping in a different ranking policy. Most
/// users should prefer the top-level functions.
pub mod lowlevel {
    pub use crate::boxes::transform::MAX_LOG_SCALE;
    pub use crate::candidate::filter::{filter_candidates, label_proposals, BACKGROUND_CLASS};
    pub use crate::candidate::nms::suppress_per_class;
    pub use crate::candidate::topk::rank_top_k;
    pub use crate::candidate::Label;

    #[cfg(feature = "rayon")]
    pub use crate::candidate::nms::suppress_per_class_par;
}
