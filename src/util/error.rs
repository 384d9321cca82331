//! Error types for detdecode.

use thiserror::Error;

/// Result alias for detdecode operations.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur when decoding detection head outputs.
///
/// Every variant indicates a contract violation by the caller or the upstream
/// network. None of them is transient: retrying with the same inputs fails
/// the same way.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The score, delta, and proposal inputs disagree on the region count.
    #[error("region count mismatch: scores {probs}, deltas {deltas}, proposals {rois}")]
    RoiCountMismatch {
        probs: usize,
        deltas: usize,
        rois: usize,
    },
    /// The score and delta inputs disagree on the class count.
    #[error("class count mismatch: scores {probs}, deltas {deltas}")]
    ClassCountMismatch { probs: usize, deltas: usize },
    /// A view was declared with fewer classes than background plus one.
    #[error("too few classes: {num_classes} (need background plus at least one foreground class)")]
    TooFewClasses { num_classes: usize },
    /// A flat buffer is shorter than its declared shape requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The output image shape has a zero dimension.
    #[error("invalid image shape: {height}x{width}")]
    InvalidImageShape { height: u32, width: u32 },
    /// A configuration field is outside its valid range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
