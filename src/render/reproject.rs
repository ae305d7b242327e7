//! Resampling a grid slice onto an output raster.

use ndarray::Array2;

use super::slice::GridSlice;
use crate::error::{IsobarError, Result};
use crate::geo::{wrap_longitude_from, BoundingBox, Crs};
use crate::interpolation::common::fractional_index;
use crate::interpolation::Interpolator;

/// The raster an image is rendered into: `width x height` pixels covering
/// `bbox` in `crs`, north up
#[derive(Debug, Clone)]
pub struct OutputGrid {
    pub crs: Crs,
    pub bbox: BoundingBox,
    pub width: u32,
    pub height: u32,
}

impl OutputGrid {
    pub fn new(crs: Crs, bbox: BoundingBox, width: u32, height: u32) -> Self {
        Self {
            crs,
            bbox,
            width,
            height,
        }
    }

    /// Center of pixel `(col, row)` in output CRS units
    pub fn pixel_center(&self, col: u32, row: u32) -> (f64, f64) {
        let x = self.bbox.min_x + (col as f64 + 0.5) * self.bbox.width() / self.width as f64;
        let y = self.bbox.max_y - (row as f64 + 0.5) * self.bbox.height() / self.height as f64;
        (x, y)
    }
}

/// Sample `grid` at every pixel center of `output`.
///
/// Returns an array indexed `[row, col]` with row 0 at the top. Pixels
/// that fall outside the grid are NaN.
pub fn reproject(
    grid: &GridSlice,
    output: &OutputGrid,
    interpolator: &dyn Interpolator,
) -> Result<Array2<f32>> {
    let (rows, cols) = grid.values.dim();
    if rows != grid.lats.len() || cols != grid.lons.len() {
        return Err(IsobarError::Interpolation {
            message: format!(
                "Grid of shape {:?} does not match {} latitudes and {} longitudes",
                grid.values.dim(),
                grid.lats.len(),
                grid.lons.len()
            ),
        });
    }

    let values = grid.values.view();
    let locator = ColumnLocator::new(grid);

    let (height, width) = (output.height as usize, output.width as usize);
    let raster = if output.crs.is_separable() {
        // Longitude follows the pixel column and latitude the pixel row
        let col_index: Vec<Option<f64>> = (0..output.width)
            .map(|col| {
                let (x, y) = output.pixel_center(col, 0);
                let (lon, _) = output.crs.to_wgs84(x, y)?;
                locator.locate(lon)
            })
            .collect();
        let row_index: Vec<Option<f64>> = (0..output.height)
            .map(|row| {
                let (x, y) = output.pixel_center(0, row);
                let (_, lat) = output.crs.to_wgs84(x, y)?;
                fractional_index(&grid.lats, lat)
            })
            .collect();

        Array2::from_shape_fn((height, width), |(row, col)| {
            match (row_index[row], col_index[col]) {
                (Some(r), Some(c)) => interpolator.interpolate(&values, r, c, locator.wraps()),
                _ => f32::NAN,
            }
        })
    } else {
        Array2::from_shape_fn((height, width), |(row, col)| {
            let (x, y) = output.pixel_center(col as u32, row as u32);
            let located = output.crs.to_wgs84(x, y).and_then(|(lon, lat)| {
                Some((fractional_index(&grid.lats, lat)?, locator.locate(lon)?))
            });
            match located {
                Some((r, c)) => interpolator.interpolate(&values, r, c, locator.wraps()),
                None => f32::NAN,
            }
        })
    };

    Ok(raster)
}

/// Maps longitudes to fractional column indices in the grid's convention
struct ColumnLocator<'a> {
    lons: &'a [f64],
    start: f64,
    global_spacing: Option<f64>,
}

impl<'a> ColumnLocator<'a> {
    fn new(grid: &'a GridSlice) -> Self {
        Self {
            lons: &grid.lons,
            start: grid.lons.iter().copied().fold(f64::INFINITY, f64::min),
            global_spacing: grid.global_spacing(),
        }
    }

    fn wraps(&self) -> bool {
        self.global_spacing.is_some()
    }

    fn locate(&self, lon: f64) -> Option<f64> {
        if !lon.is_finite() || self.lons.is_empty() {
            return None;
        }
        let lon = wrap_longitude_from(lon, self.start);
        match self.global_spacing {
            // Past the last column the value blends back into column 0
            Some(spacing) => Some((lon - self.lons[0]) / spacing),
            None => fractional_index(self.lons, lon),
        }
    }
}
