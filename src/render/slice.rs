//! Selecting a 2-D `(lat, lon)` slice of a variable.

use ndarray::{s, Array2, Axis as ArrayAxis, Ix2};

use crate::cf::AxisDims;
use crate::error::{IsobarError, Result};
use crate::geo::{wrap_longitude_from, BoundingBox};
use crate::interpolation::common::fractional_index;
use crate::state::AppState;

/// A horizontal slice of a variable, rows ordered by latitude
#[derive(Debug, Clone)]
pub struct GridSlice {
    /// Values indexed `[lat, lon]`
    pub values: Array2<f32>,
    /// Longitude of each column
    pub lons: Vec<f64>,
    /// Latitude of each row
    pub lats: Vec<f64>,
}

impl GridSlice {
    /// Regular ascending longitudes spanning the whole globe
    pub fn is_global(&self) -> bool {
        global_spacing(&self.lons).is_some()
    }

    /// Longitude spacing when the grid wraps around the globe
    pub fn global_spacing(&self) -> Option<f64> {
        global_spacing(&self.lons)
    }
}

fn global_spacing(lons: &[f64]) -> Option<f64> {
    if lons.len() < 2 {
        return None;
    }
    let spacing = lons[1] - lons[0];
    if spacing <= 0.0 {
        return None;
    }
    let span = spacing * lons.len() as f64;
    ((span - 360.0).abs() < spacing * 0.5).then_some(spacing)
}

/// Cut the `(lat, lon)` plane of `parameter` at `time_index`.
///
/// Dimensions other than the resolved X/Y/T axes must have length one.
/// When `window` (WGS84) is given the slice is cropped to the smallest
/// index range covering it.
pub fn slice_variable(
    state: &AppState,
    parameter: &str,
    axes: &AxisDims,
    time_index: Option<usize>,
    window: Option<&BoundingBox>,
) -> Result<GridSlice> {
    let var = state.get_variable_metadata_checked(parameter)?;
    let array = state.get_variable_checked(parameter)?;
    let (x_dim, y_dim) = axes.horizontal(parameter)?;

    // Indices to fix for each non-horizontal dimension
    let mut fixed = Vec::new();
    for (axis, dim) in var.dimensions.iter().enumerate() {
        if dim == x_dim || dim == y_dim {
            continue;
        }
        let size = array.shape()[axis];
        let index = match (axes.t.as_deref(), time_index) {
            (Some(t), Some(index)) if t == dim => index,
            _ if size == 1 => 0,
            _ => {
                return Err(IsobarError::invalid(
                    "parameter",
                    format!(
                        "Variable {} has extra dimension {} of size {}",
                        parameter, dim, size
                    ),
                ))
            }
        };
        if index >= size {
            return Err(IsobarError::not_found(format!(
                "Index {} is outside dimension {} of size {}",
                index, dim, size
            )));
        }
        fixed.push((axis, index));
    }

    let mut view = array.view();
    for &(axis, index) in fixed.iter().rev() {
        view = view.index_axis_move(ArrayAxis(axis), index);
    }
    let plane = view.into_dimensionality::<Ix2>()?;

    let x_first = var.dimensions.iter().position(|d| d == x_dim)
        < var.dimensions.iter().position(|d| d == y_dim);
    let plane = if x_first { plane.reversed_axes() } else { plane };

    let lons = state.get_coordinate_checked(x_dim)?;
    let lats = state.get_coordinate_checked(y_dim)?;

    let Some(window) = window else {
        return Ok(GridSlice {
            values: plane.to_owned(),
            lons: lons.clone(),
            lats: lats.clone(),
        });
    };

    let rows = index_window(lats, window.min_y, window.max_y);
    let cols = longitude_window(lons, window);
    let (Some((r0, r1)), Some((c0, c1))) = (rows, cols) else {
        return Err(IsobarError::not_found(format!(
            "Bounding box {} does not intersect the grid of {}",
            window, parameter
        )));
    };

    Ok(GridSlice {
        values: plane.slice(s![r0..r1, c0..c1]).to_owned(),
        lons: lons[c0..c1].to_vec(),
        lats: lats[r0..r1].to_vec(),
    })
}

/// Smallest half-open index range whose coordinates cover `[lo, hi]`
fn index_window(coords: &[f64], lo: f64, hi: f64) -> Option<(usize, usize)> {
    let (cmin, cmax) = coords
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &c| {
            (a.min(c), b.max(c))
        });
    if coords.is_empty() || hi < cmin || lo > cmax {
        return None;
    }

    let a = fractional_index(coords, lo.max(cmin))?;
    let b = fractional_index(coords, hi.min(cmax))?;
    let start = a.min(b).floor() as usize;
    let end = (a.max(b).ceil() as usize + 1).min(coords.len());
    Some((start, end))
}

fn longitude_window(lons: &[f64], window: &BoundingBox) -> Option<(usize, usize)> {
    if window.width() >= 360.0 {
        return Some((0, lons.len()));
    }
    let start = lons.iter().copied().fold(f64::INFINITY, f64::min);
    let lo = wrap_longitude_from(window.min_x, start);
    let hi = lo + window.width();

    let last = lons.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi > last && global_spacing(lons).is_some() {
        // Window crosses the seam of a global grid
        return Some((0, lons.len()));
    }

    index_window(lons, lo, hi).or_else(|| index_window(lons, lo - 360.0, hi - 360.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{grid_state, global_state};

    fn axes(state: &AppState, parameter: &str) -> AxisDims {
        AxisDims::resolve(state, state.get_variable_metadata(parameter).unwrap())
    }

    #[test]
    fn test_slice_full_plane() {
        let state = grid_state();
        let axes = axes(&state, "temp");
        let grid = slice_variable(&state, "temp", &axes, Some(1), None).unwrap();

        assert_eq!(grid.values.dim(), (3, 4));
        assert_eq!(grid.lats, vec![10.0, 20.0, 30.0]);
        // temp = 100 * t + 10 * lat_index + lon_index
        assert_eq!(grid.values[[2, 3]], 123.0);
        assert_eq!(grid.values[[0, 0]], 100.0);
    }

    #[test]
    fn test_slice_crops_to_window() {
        let state = grid_state();
        let axes = axes(&state, "temp");
        let window = BoundingBox::new(1.0, 15.0, 2.0, 30.0);
        let grid = slice_variable(&state, "temp", &axes, Some(0), Some(&window)).unwrap();

        assert_eq!(grid.lons, vec![1.0, 2.0]);
        assert_eq!(grid.lats, vec![10.0, 20.0, 30.0]);
        assert_eq!(grid.values[[0, 0]], 1.0);
    }

    #[test]
    fn test_slice_outside_grid_is_not_found() {
        let state = grid_state();
        let axes = axes(&state, "temp");
        let window = BoundingBox::new(50.0, 60.0, 70.0, 80.0);
        let err = slice_variable(&state, "temp", &axes, Some(0), Some(&window)).unwrap_err();
        assert!(matches!(err, IsobarError::DataNotFound { .. }));
    }

    #[test]
    fn test_slice_transposes_lon_first_variables() {
        let state = grid_state();
        let axes = axes(&state, "wind");
        let grid = slice_variable(&state, "wind", &axes, None, None).unwrap();

        assert_eq!(grid.values.dim(), (3, 4));
        // wind = lon_index * 10 + lat_index, stored [lon, lat]
        assert_eq!(grid.values[[1, 3]], 31.0);
    }

    #[test]
    fn test_slice_rejects_extra_dimension() {
        let state = grid_state();
        let axes = axes(&state, "profile");
        assert_eq!(axes.t.as_deref(), Some("time"));

        let err = slice_variable(&state, "profile", &axes, Some(0), None).unwrap_err();
        match &err {
            IsobarError::InvalidParameter { param, message } => {
                assert_eq!(param, "parameter");
                assert!(message.contains("level"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_slice_descending_latitudes() {
        let coords = [30.0, 20.0, 10.0, 0.0];
        assert_eq!(index_window(&coords, 12.0, 22.0), Some((0, 3)));
        assert_eq!(index_window(&coords, 20.0, 20.0), Some((1, 2)));
        assert_eq!(index_window(&coords, 40.0, 50.0), None);
    }

    #[test]
    fn test_longitude_window_on_0_360_grid() {
        let state = global_state();
        let lons = state.get_coordinate("lon").unwrap();

        // -90..-45 lies at 270..315 on a 0..360 grid
        let (c0, c1) = longitude_window(lons, &BoundingBox::new(-90.0, 0.0, -45.0, 10.0)).unwrap();
        assert_eq!(lons[c0], 270.0);
        assert_eq!(lons[c1 - 1], 315.0);

        // Crossing the 0 meridian keeps the whole row
        let full = longitude_window(lons, &BoundingBox::new(-10.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(full, (0, lons.len()));
    }

    #[test]
    fn test_global_detection() {
        assert_eq!(global_spacing(&[0.0, 90.0, 180.0, 270.0]), Some(90.0));
        assert_eq!(global_spacing(&[0.0, 1.0, 2.0]), None);
        assert_eq!(global_spacing(&[0.0]), None);
    }
}
