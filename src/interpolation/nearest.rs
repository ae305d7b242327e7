//! Nearest neighbor interpolation.
//!
//! This method selects the value of the nearest grid point.
//! It's the simplest interpolation method, offering the fastest
//! performance but with blockier results than bilinear.

use ndarray::ArrayView2;

use super::Interpolator;
use crate::interpolation::common;

/// Nearest neighbor interpolator
pub struct NearestInterpolator;

impl Interpolator for NearestInterpolator {
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64, wrap_columns: bool) -> f32 {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 || !row.is_finite() || !col.is_finite() {
            return f32::NAN;
        }

        let r = common::clamp_index(row.round(), rows) as usize;
        let mut c = col.round();
        if wrap_columns && c >= cols as f64 {
            c -= cols as f64;
        }
        let c = common::clamp_index(c, cols) as usize;

        data[[r, c]]
    }

    fn name(&self) -> &str {
        "nearest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nearest_interpolation_2d() {
        // 3x3 grid with values increasing from left to right, top to bottom
        let data = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let view = data.view();
        let interpolator = NearestInterpolator;

        // Corners
        assert_eq!(interpolator.interpolate(&view, 0.0, 0.0, false), 1.0);
        assert_eq!(interpolator.interpolate(&view, 0.0, 2.0, false), 3.0);
        assert_eq!(interpolator.interpolate(&view, 2.0, 0.0, false), 7.0);
        assert_eq!(interpolator.interpolate(&view, 2.0, 2.0, false), 9.0);

        // Fractional indices
        assert_eq!(interpolator.interpolate(&view, 0.7, 1.3, false), 5.0);
        assert_eq!(interpolator.interpolate(&view, 1.2, 1.7, false), 6.0);

        // Out of bounds clamps
        assert_eq!(interpolator.interpolate(&view, -1.0, 5.5, false), 3.0);
    }

    #[test]
    fn test_nearest_wraps_columns() {
        let data = array![[1.0f32, 2.0, 3.0]];
        let view = data.view();
        let interpolator = NearestInterpolator;

        // 2.6 rounds to column 3, which wraps back to column 0
        assert_eq!(interpolator.interpolate(&view, 0.0, 2.6, true), 1.0);
        assert_eq!(interpolator.interpolate(&view, 0.0, 2.6, false), 3.0);
    }

    #[test]
    fn test_nearest_keeps_missing_values() {
        let data = array![[f32::NAN, 2.0]];
        let view = data.view();
        assert!(NearestInterpolator
            .interpolate(&view, 0.0, 0.2, false)
            .is_nan());
    }
}
