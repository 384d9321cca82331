//! Borrowed, shape-checked views over the network's flat output buffers.
//!
//! The scoring network hands over two row-major buffers per image: class
//! probabilities of shape `[num_rois, num_classes]` and regression deltas of
//! shape `[num_rois, num_classes, 4]`. The views validate the buffer length
//! against the declared shape once, at construction, so the per-region
//! accessors can stay cheap. Class 0 is the reserved background class, hence
//! `num_classes >= 2`.

use crate::boxes::BoxDelta;
use crate::util::{DecodeError, DecodeResult};

/// Borrowed `[num_rois, num_classes]` view of class probabilities.
#[derive(Copy, Clone)]
pub struct ScoresView<'a> {
    data: &'a [f32],
    num_rois: usize,
    num_classes: usize,
}

impl<'a> ScoresView<'a> {
    /// Creates a view over a row-major probability buffer.
    pub fn from_slice(data: &'a [f32], num_rois: usize, num_classes: usize) -> DecodeResult<Self> {
        let needed = required_len(num_rois, num_classes, 1)?;
        if data.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_rois,
            num_classes,
        })
    }

    /// Returns the number of regions.
    pub fn num_rois(&self) -> usize {
        self.num_rois
    }

    /// Returns the number of classes including background.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the probability row for region `roi` with length `num_classes`.
    pub fn row(&self, roi: usize) -> Option<&'a [f32]> {
        if roi >= self.num_rois {
            return None;
        }
        let start = roi.checked_mul(self.num_classes)?;
        let end = start.checked_add(self.num_classes)?;
        self.data.get(start..end)
    }
}

/// Borrowed `[num_rois, num_classes, 4]` view of per-class box deltas.
#[derive(Copy, Clone)]
pub struct DeltasView<'a> {
    data: &'a [f32],
    num_rois: usize,
    num_classes: usize,
}

impl<'a> DeltasView<'a> {
    /// Creates a view over a row-major delta buffer.
    pub fn from_slice(data: &'a [f32], num_rois: usize, num_classes: usize) -> DecodeResult<Self> {
        let needed = required_len(num_rois, num_classes, 4)?;
        if data.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_rois,
            num_classes,
        })
    }

    /// Returns the number of regions.
    pub fn num_rois(&self) -> usize {
        self.num_rois
    }

    /// Returns the number of classes including background.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the `(dy, dx, log dh, log dw)` tuple for `(roi, class)`.
    pub fn delta(&self, roi: usize, class_id: usize) -> Option<BoxDelta> {
        if roi >= self.num_rois || class_id >= self.num_classes {
            return None;
        }
        let start = roi
            .checked_mul(self.num_classes)?
            .checked_add(class_id)?
            .checked_mul(4)?;
        let quad = self.data.get(start..start.checked_add(4)?)?;
        Some(BoxDelta {
            dy: quad[0],
            dx: quad[1],
            dh: quad[2],
            dw: quad[3],
        })
    }
}

fn required_len(num_rois: usize, num_classes: usize, inner: usize) -> DecodeResult<usize> {
    if num_classes < 2 {
        return Err(DecodeError::TooFewClasses { num_classes });
    }
    num_rois
        .checked_mul(num_classes)
        .and_then(|v| v.checked_mul(inner))
        .ok_or(DecodeError::BufferTooSmall {
            needed: usize::MAX,
            got: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::{DeltasView, ScoresView};
    use crate::util::DecodeError;

    #[test]
    fn scores_view_rejects_single_class() {
        let data = [1.0f32; 3];
        let err = ScoresView::from_slice(&data, 3, 1).err().unwrap();
        assert_eq!(err, DecodeError::TooFewClasses { num_classes: 1 });
    }

    #[test]
    fn scores_view_rejects_short_buffer() {
        let data = [0.0f32; 5];
        let err = ScoresView::from_slice(&data, 3, 2).err().unwrap();
        assert_eq!(err, DecodeError::BufferTooSmall { needed: 6, got: 5 });
    }

    #[test]
    fn scores_view_accepts_zero_rois() {
        let view = ScoresView::from_slice(&[], 0, 2).unwrap();
        assert_eq!(view.num_rois(), 0);
        assert!(view.row(0).is_none());
    }

    #[test]
    fn scores_row_indexes_row_major() {
        let data = [0.9, 0.1, 0.2, 0.8];
        let view = ScoresView::from_slice(&data, 2, 2).unwrap();
        assert_eq!(view.row(1).unwrap(), &[0.2, 0.8]);
        assert!(view.row(2).is_none());
    }

    #[test]
    fn deltas_view_rejects_short_buffer() {
        let data = [0.0f32; 15];
        let err = DeltasView::from_slice(&data, 2, 2).err().unwrap();
        assert_eq!(err, DecodeError::BufferTooSmall { needed: 16, got: 15 });
    }

    #[test]
    fn delta_indexes_roi_then_class() {
        let mut data = vec![0.0f32; 2 * 3 * 4];
        // roi 1, class 2 occupies the last quad.
        data[(1 * 3 + 2) * 4..].copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);
        let view = DeltasView::from_slice(&data, 2, 3).unwrap();
        let d = view.delta(1, 2).unwrap();
        assert_eq!((d.dy, d.dx, d.dh, d.dw), (0.1, 0.2, 0.3, 0.4));
        assert!(view.delta(2, 0).is_none());
        assert!(view.delta(0, 3).is_none());
    }
}
