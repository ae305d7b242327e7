//! Scaling raster values into `[0, 1]` for color mapping.

use ndarray::Array2;
use serde::Serialize;

/// Value bounds requested by a client; missing bounds are autoscaled
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueRange {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// Bounds actually used for a render
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Autoscale both bounds
    pub fn auto() -> Self {
        Self::default()
    }

    /// Fixed bounds
    pub fn fixed(min: f32, max: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Fill in missing bounds from the finite values of `raster`.
    ///
    /// Returns `None` when a bound is missing and the raster holds no finite
    /// value to take it from.
    pub fn resolve(&self, raster: &Array2<f32>) -> Option<ResolvedRange> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            return Some(ResolvedRange { min, max });
        }

        let (lo, hi) = finite_extent(raster)?;
        Some(ResolvedRange {
            min: self.min.unwrap_or(lo),
            max: self.max.unwrap_or(hi),
        })
    }
}

fn finite_extent(raster: &Array2<f32>) -> Option<(f32, f32)> {
    raster
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Map values to `[0, 1]` with `(v - min) / (max - min)`, clamped.
///
/// NaN stays NaN. When the range is empty every finite value maps to 0.5.
pub fn normalize(raster: &Array2<f32>, range: Option<ResolvedRange>) -> Array2<f32> {
    let Some(ResolvedRange { min, max }) = range else {
        return raster.mapv(|_| f32::NAN);
    };
    let span = max - min;

    raster.mapv(|v| {
        if !v.is_finite() {
            f32::NAN
        } else if !(span > 0.0) {
            0.5
        } else {
            ((v - min) / span).clamp(0.0, 1.0)
        }
    })
}
