//! Interpolation algorithms for spatial data.
//!
//! This module provides the samplers used when a source grid is resampled
//! onto an output raster: each output pixel is mapped to fractional grid
//! indices and one of these methods produces its value.

pub mod bilinear;
pub mod common;
pub mod nearest;

use ndarray::ArrayView2;

use crate::error::{IsobarError, Result};

/// Trait for interpolation methods over a `(row, col)` grid
pub trait Interpolator: Send + Sync {
    /// Interpolate a value at fractional `(row, col)` indices.
    ///
    /// When `wrap_columns` is set the grid is periodic in its columns (a
    /// global longitude axis), so a column index past the last column blends
    /// with column 0. Returns NaN when no finite value is available.
    fn interpolate(&self, data: &ArrayView2<f32>, row: f64, col: f64, wrap_columns: bool) -> f32;

    /// Get the name of this interpolation method
    fn name(&self) -> &str;
}

/// Get an interpolator by name
pub fn get_interpolator(name: &str) -> Result<Box<dyn Interpolator>> {
    match name.to_lowercase().as_str() {
        "nearest" => Ok(Box::new(nearest::NearestInterpolator)),
        "bilinear" => Ok(Box::new(bilinear::BilinearInterpolator)),
        _ => Err(IsobarError::invalid(
            "resampling",
            format!(
                "Unknown resampling method: {}. Must be one of: nearest, bilinear",
                name
            ),
        )),
    }
}
