//! Common utilities for interpolation algorithms.

/// Map a coordinate value to a fractional index along a monotonic coordinate array.
///
/// Works for ascending and descending coordinates. Returns `None` when the
/// value lies outside the coordinate range.
pub fn fractional_index(coords: &[f64], value: f64) -> Option<f64> {
    if coords.is_empty() || !value.is_finite() {
        return None;
    }
    if coords.len() == 1 {
        return (coords[0] == value).then_some(0.0);
    }

    let first = coords[0];
    let last = coords[coords.len() - 1];
    let ascending = last >= first;
    let (lo, hi) = if ascending { (first, last) } else { (last, first) };
    if value < lo || value > hi {
        return None;
    }

    // Index of the first coordinate beyond `value` in walking order
    let upper = if ascending {
        coords.partition_point(|&c| c <= value)
    } else {
        coords.partition_point(|&c| c >= value)
    };
    let i0 = upper.saturating_sub(1).min(coords.len() - 2);
    let (c0, c1) = (coords[i0], coords[i0 + 1]);

    if c1 == c0 {
        return Some(i0 as f64);
    }
    Some(i0 as f64 + (value - c0) / (c1 - c0))
}

/// Clamp an index to valid bounds
pub fn clamp_index(index: f64, size: usize) -> f64 {
    index.max(0.0).min((size - 1) as f64)
}

/// Get the weight for linear interpolation
pub fn linear_weight(fraction: f64) -> (f64, f64) {
    (1.0 - fraction, fraction)
}
