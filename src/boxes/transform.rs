//! Delta decoding between proposal boxes and refined boxes.
//!
//! The network predicts offsets in a standardized `(dy, dx, log dh, log dw)`
//! parameterization: center shifts relative to the source box size and log
//! scale factors for the side lengths. `apply_delta` undoes the
//! standardization and produces a refined corner-form box; `encode_delta` is
//! its inverse for finite, non-degenerate box pairs.

use crate::boxes::{BoxDelta, RoiBox};

/// ln(1000 / 16): bound on the log-scale components before exponentiation.
///
/// Caps the growth of either side at 62.5x per refinement, keeping `exp`
/// finite for arbitrarily large network outputs.
pub const MAX_LOG_SCALE: f32 = 4.135_166_5;

/// Applies a standardized regression delta to a proposal box.
///
/// The delta is de-standardized elementwise (`delta * stds + means`), the box
/// center is shifted by `(dy * height, dx * width)`, and the side lengths are
/// scaled by `exp(dh)` / `exp(dw)` with the log scales clamped to
/// [`MAX_LOG_SCALE`]. The result is in the same normalized coordinates as the
/// input and is not clipped to the image window.
pub fn apply_delta(roi: RoiBox, delta: BoxDelta, means: [f32; 4], stds: [f32; 4]) -> RoiBox {
    let dy = delta.dy * stds[0] + means[0];
    let dx = delta.dx * stds[1] + means[1];
    let dh = clamp_log_scale(delta.dh * stds[2] + means[2]);
    let dw = clamp_log_scale(delta.dw * stds[3] + means[3]);

    let height = roi.height();
    let width = roi.width();
    let center_y = roi.y1 + 0.5 * height + dy * height;
    let center_x = roi.x1 + 0.5 * width + dx * width;
    let new_height = height * dh.exp();
    let new_width = width * dw.exp();

    let y1 = center_y - 0.5 * new_height;
    let x1 = center_x - 0.5 * new_width;
    RoiBox::new(y1, x1, y1 + new_height, x1 + new_width)
}

/// Caps a log scale at [`MAX_LOG_SCALE`] while letting NaN through, so a
/// poisoned delta still surfaces as a non-finite box instead of a
/// maximum-size one.
fn clamp_log_scale(v: f32) -> f32 {
    if v > MAX_LOG_SCALE {
        MAX_LOG_SCALE
    } else {
        v
    }
}

/// Computes the standardized delta that maps `src` onto `target`.
///
/// Inverse of [`apply_delta`] for boxes with positive side lengths and
/// positive `stds`. Used to express ground truth or refined boxes in the
/// network's regression parameterization.
pub fn encode_delta(src: RoiBox, target: RoiBox, means: [f32; 4], stds: [f32; 4]) -> BoxDelta {
    let src_h = src.height();
    let src_w = src.width();
    let src_cy = src.y1 + 0.5 * src_h;
    let src_cx = src.x1 + 0.5 * src_w;

    let tgt_h = target.height();
    let tgt_w = target.width();
    let tgt_cy = target.y1 + 0.5 * tgt_h;
    let tgt_cx = target.x1 + 0.5 * tgt_w;

    let dy = (tgt_cy - src_cy) / src_h;
    let dx = (tgt_cx - src_cx) / src_w;
    let dh = (tgt_h / src_h).ln();
    let dw = (tgt_w / src_w).ln();

    BoxDelta {
        dy: (dy - means[0]) / stds[0],
        dx: (dx - means[1]) / stds[1],
        dh: (dh - means[2]) / stds[2],
        dw: (dw - means[3]) / stds[3],
    }
}
