//! The map rendering pipeline.
//!
//! A render takes one variable through these stages:
//!
//! 1. [`slice`]: pick the time step and cut the `(lat, lon)` plane
//! 2. [`reproject`]: sample the plane at every pixel of the output raster
//! 3. [`normalize`]: scale values into `[0, 1]`
//! 4. [`encode`]: apply the colormap and write a PNG
//!
//! Everything here is synchronous and CPU bound; handlers run it on the
//! blocking thread pool.

pub mod encode;
pub mod normalize;
pub mod reproject;
pub mod slice;

use std::time::Instant;
use tracing::debug;

pub use encode::{colorize, encode_png};
pub use normalize::{normalize, ResolvedRange, ValueRange};
pub use reproject::{reproject, OutputGrid};
pub use slice::{slice_variable, GridSlice};

use crate::cf::{self, AxisDims, RequestedTime};
use crate::colormaps;
use crate::error::{IsobarError, Result};
use crate::geo::{BoundingBox, Crs};
use crate::interpolation;
use crate::state::AppState;

/// Everything needed to render one image
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Variable to render
    pub parameter: String,
    /// Time step; ignored for variables without a time axis
    pub time: Option<RequestedTime>,
    /// Area covered by the image, in `crs` units
    pub bbox: BoundingBox,
    /// CRS of `bbox` and of the output raster
    pub crs: Crs,
    pub width: u32,
    pub height: u32,
    /// Crop the source grid to `bbox` before resampling
    pub crop: bool,
    pub range: ValueRange,
    pub colormap: String,
    pub resampling: String,
}

/// A finished render
#[derive(Debug, Clone)]
pub struct Rendered {
    /// PNG bytes
    pub png: Vec<u8>,
    /// Index of the time step used, if the variable has a time axis
    pub time_index: Option<usize>,
    /// Value bounds the colormap was stretched over
    pub range: Option<ResolvedRange>,
}

/// Run the whole pipeline for `request`
pub fn render_png(state: &AppState, request: &RenderRequest) -> Result<Rendered> {
    let start = Instant::now();

    let colormap = colormaps::get_colormap(&request.colormap)?;
    let interpolator = interpolation::get_interpolator(&request.resampling)?;

    let var = state.get_variable_metadata_checked(&request.parameter)?;
    let axes = AxisDims::resolve(state, var);
    axes.horizontal(&request.parameter)?;

    let time_index = match (axes.t.as_deref(), &request.time) {
        (Some(t_dim), Some(requested)) => Some(cf::select_time_index(state, t_dim, requested)?),
        (Some(t_dim), None) => {
            return Err(IsobarError::invalid(
                "datetime",
                format!(
                    "Variable {} varies along {}; a datetime is required",
                    request.parameter, t_dim
                ),
            ))
        }
        (None, _) => None,
    };

    // Without a WGS84 extent the whole grid is kept
    let window = request
        .crop
        .then(|| request.crs.bbox_to_wgs84(&request.bbox))
        .flatten();
    let grid = slice_variable(state, &request.parameter, &axes, time_index, window.as_ref())?;

    let output = OutputGrid::new(
        request.crs.clone(),
        request.bbox,
        request.width,
        request.height,
    );
    let raster = reproject(&grid, &output, interpolator.as_ref())?;

    let range = request.range.resolve(&raster);
    let image = colorize(&normalize(&raster, range), colormap.as_ref());
    let png = encode_png(&image)?;

    debug!(
        parameter = %request.parameter,
        grid_shape = ?grid.values.dim(),
        width = request.width,
        height = request.height,
        colormap = %colormap.name(),
        resampling = %interpolator.name(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Rendered image"
    );

    Ok(Rendered {
        png,
        time_index,
        range,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{global_state, grid_state};
    use super::*;
    use chrono::{TimeZone, Utc};

    fn request(parameter: &str, time: Option<RequestedTime>) -> RenderRequest {
        RenderRequest {
            parameter: parameter.to_string(),
            time,
            bbox: BoundingBox::new(0.0, 10.0, 3.0, 30.0),
            crs: Crs::Epsg4326,
            width: 6,
            height: 4,
            crop: true,
            range: ValueRange::auto(),
            colormap: "rainbow".to_string(),
            resampling: "bilinear".to_string(),
        }
    }

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    #[test]
    fn test_render_selects_time_step() {
        let state = grid_state();
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 6, 0, 0).unwrap();
        let rendered =
            render_png(&state, &request("temp", Some(RequestedTime::Instant(instant)))).unwrap();

        assert_eq!(rendered.time_index, Some(1));
        let range = rendered.range.unwrap();
        assert!(range.min >= 100.0 && range.max <= 123.0);
        assert_eq!(decode(&rendered.png).dimensions(), (6, 4));
    }

    #[test]
    fn test_render_requires_datetime_for_time_axis() {
        let state = grid_state();
        let err = render_png(&state, &request("temp", None)).unwrap_err();
        assert!(matches!(
            err,
            IsobarError::InvalidParameter { ref param, .. } if param == "datetime"
        ));
    }

    #[test]
    fn test_render_ignores_datetime_without_time_axis() {
        let state = grid_state();
        let rendered = render_png(&state, &request("wind", Some(RequestedTime::Raw(42.0)))).unwrap();
        assert_eq!(rendered.time_index, None);
    }

    #[test]
    fn test_render_unknown_time_and_parameter() {
        let state = grid_state();
        let err = render_png(&state, &request("temp", Some(RequestedTime::Raw(3.0)))).unwrap_err();
        assert!(matches!(err, IsobarError::DataNotFound { .. }));

        let err = render_png(&state, &request("nope", None)).unwrap_err();
        assert!(matches!(err, IsobarError::VariableNotFound { .. }));

        let mut bad_cmap = request("wind", None);
        bad_cmap.colormap = "not-a-map".to_string();
        assert!(matches!(
            render_png(&state, &bad_cmap).unwrap_err(),
            IsobarError::InvalidParameter { ref param, .. } if param == "cmap"
        ));
    }

    #[test]
    fn test_render_area_outside_data_is_transparent() {
        let state = grid_state();
        let mut req = request("wind", None);
        req.bbox = BoundingBox::new(-3.0, 10.0, 3.0, 30.0);
        req.width = 4;
        let image = decode(&render_png(&state, &req).unwrap().png);

        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(3, 0).0[3], 255);
    }

    #[test]
    fn test_render_projected_crs() {
        let state = grid_state();
        let utm = Crs::parse("EPSG:32631").unwrap();
        let (min_x, min_y) = utm.from_wgs84(0.5, 12.0).unwrap();
        let (max_x, max_y) = utm.from_wgs84(2.5, 28.0).unwrap();

        let mut req = request("wind", None);
        req.crs = utm;
        req.bbox = BoundingBox::new(min_x, min_y, max_x, max_y);
        let rendered = render_png(&state, &req).unwrap();

        let image = decode(&rendered.png);
        assert_eq!(image.dimensions(), (6, 4));
        assert_eq!(image.get_pixel(3, 2).0[3], 255);
        let range = rendered.range.unwrap();
        assert!(range.min >= 0.0 && range.max <= 32.0);
    }

    #[test]
    fn test_render_global_mercator_tile() {
        let state = global_state();
        let tile = crate::geo::TileCoord::new(1, 0, 0).unwrap();
        let req = RenderRequest {
            parameter: "sst".to_string(),
            time: None,
            bbox: crate::geo::tile_bounds_mercator(&tile),
            crs: Crs::Epsg3857,
            width: 16,
            height: 16,
            crop: false,
            range: ValueRange::fixed(0.0, 7.0),
            colormap: "viridis".to_string(),
            resampling: "nearest".to_string(),
        };
        let rendered = render_png(&state, &req).unwrap();
        assert_eq!(rendered.range, Some(ResolvedRange { min: 0.0, max: 7.0 }));

        // Rows north of the 60N grid edge stay transparent
        let image = decode(&rendered.png);
        assert_eq!(image.dimensions(), (16, 16));
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(0, 15).0[3], 255);
    }
}
