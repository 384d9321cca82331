//! Box geometry for detection decoding.
//!
//! `RoiBox` is an axis-aligned rectangle in `(y1, x1, y2, x2)` corner form,
//! normalized to `[0, 1]` relative to the image height and width. Decoded
//! boxes stay in normalized coordinates through filtering and suppression and
//! are scaled to pixels only when the final `Detection` records are emitted.

pub mod transform;

/// Axis-aligned box in normalized `(y1, x1, y2, x2)` corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoiBox {
    /// Top edge.
    pub y1: f32,
    /// Left edge.
    pub x1: f32,
    /// Bottom edge.
    pub y2: f32,
    /// Right edge.
    pub x2: f32,
}

impl RoiBox {
    /// Creates a box from corner coordinates.
    pub fn new(y1: f32, x1: f32, y2: f32, x2: f32) -> Self {
        Self { y1, x1, y2, x2 }
    }

    /// Returns the box height (`y2 - y1`).
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Returns the box width (`x2 - x1`).
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Returns the box area, zero for inverted or degenerate boxes.
    pub fn area(&self) -> f32 {
        self.height().max(0.0) * self.width().max(0.0)
    }

    /// Returns true when every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.y1.is_finite() && self.x1.is_finite() && self.y2.is_finite() && self.x2.is_finite()
    }

    /// Clamps each coordinate independently into `[0, window_h] x [0, window_w]`.
    pub fn clip(self, window_h: f32, window_w: f32) -> Self {
        Self {
            y1: self.y1.clamp(0.0, window_h),
            x1: self.x1.clamp(0.0, window_w),
            y2: self.y2.clamp(0.0, window_h),
            x2: self.x2.clamp(0.0, window_w),
        }
    }

    /// Scales normalized coordinates to pixel coordinates.
    pub fn to_pixels(self, image_height: f32, image_width: f32) -> Self {
        Self {
            y1: self.y1 * image_height,
            x1: self.x1 * image_width,
            y2: self.y2 * image_height,
            x2: self.x2 * image_width,
        }
    }
}

/// Regression offset `(dy, dx, log dh, log dw)` for one box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxDelta {
    /// Center shift along y, in units of the source box height.
    pub dy: f32,
    /// Center shift along x, in units of the source box width.
    pub dx: f32,
    /// Log-scale factor for the box height.
    pub dh: f32,
    /// Log-scale factor for the box width.
    pub dw: f32,
}

/// Finalized detection record in absolute pixel coordinates.
///
/// `class_id` is always a foreground class (`>= 1`); the background class
/// never reaches the output.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    /// Top edge in pixels.
    pub y1: f32,
    /// Left edge in pixels.
    pub x1: f32,
    /// Bottom edge in pixels.
    pub y2: f32,
    /// Right edge in pixels.
    pub x2: f32,
    /// Foreground class index.
    pub class_id: usize,
    /// Top-class probability of the underlying proposal.
    pub score: f32,
}

/// Intersection-over-union of two corner-form boxes.
///
/// Defined as 0 when the union area is not positive, so degenerate boxes
/// never suppress anything and never poison downstream comparisons.
pub fn iou(a: &RoiBox, b: &RoiBox) -> f32 {
    let inter_y1 = a.y1.max(b.y1);
    let inter_x1 = a.x1.max(b.x1);
    let inter_y2 = a.y2.min(b.y2);
    let inter_x2 = a.x2.min(b.x2);

    let inter = (inter_y2 - inter_y1).max(0.0) * (inter_x2 - inter_x1).max(0.0);
    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}
