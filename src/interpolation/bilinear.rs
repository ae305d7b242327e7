//! Bilinear interpolation.
//!
//! This method performs linear interpolation in two dimensions using
//! the four nearest grid points. Missing (NaN) neighbours drop out and the
//! remaining weights are renormalized.

use ndarray::ArrayView2;

use super::Interpolator;
use crate::interpolation::common;

/// Bilinear interpolator
pub struct BilinearInterpolator;

impl Interpolator for BilinearInterpolator {
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64, wrap_columns: bool) -> f32 {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 || !row.is_finite() || !col.is_finite() {
            return f32::NAN;
        }

        let row = common::clamp_index(row, rows);
        let col = if wrap_columns {
            col.rem_euclid(cols as f64)
        } else {
            common::clamp_index(col, cols)
        };

        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = if wrap_columns {
            (c0 + 1) % cols
        } else {
            (c0 + 1).min(cols - 1)
        };

        let (wr0, wr1) = common::linear_weight(row - r0 as f64);
        let (wc0, wc1) = common::linear_weight(col - c0 as f64);

        let corners = [
            (data[[r0, c0]], wr0 * wc0),
            (data[[r0, c1]], wr0 * wc1),
            (data[[r1, c0]], wr1 * wc0),
            (data[[r1, c1]], wr1 * wc1),
        ];

        let mut sum = 0.0f64;
        let mut weight = 0.0f64;
        for (value, w) in corners {
            if value.is_finite() && w > 0.0 {
                sum += value as f64 * w;
                weight += w;
            }
        }

        if weight > 0.0 {
            (sum / weight) as f32
        } else {
            f32::NAN
        }
    }

    fn name(&self) -> &str {
        "bilinear"
    }
}
