//! Map image endpoint handlers.
//!
//! Two endpoints render a variable to PNG:
//!
//! - `GET {prefix}/` draws a bounding box in EPSG:4326 or EPSG:3857 at a
//!   requested size, autoscaling colors to the values in view
//! - `GET {prefix}/tile/{parameter}/{t}/{z}/{x}/{y}` draws one Web Mercator
//!   XYZ tile on a fixed color scale
//!
//! Rendering is CPU bound and runs on the blocking thread pool.

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cf::RequestedTime;
use crate::error::{IsobarError, Result};
use crate::geo::{tile_bounds_mercator, BoundingBox, Crs, TileCoord};
use crate::logging::{generate_request_id, log_request_error};
use crate::render::{render_png, RenderRequest, ValueRange};
use crate::state::AppState;

/// CRS assumed when a bbox request does not name one
const DEFAULT_CRS: Crs = Crs::Epsg4326;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameters for the bbox image endpoint
#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    /// Bounding box as "xmin,ymin,xmax,ymax" in `crs` units
    pub bbox: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Variable to render
    pub parameter: String,
    /// Time step, ISO 8601 or a raw time coordinate value
    pub datetime: String,
    /// CRS of the bbox and the image (default EPSG:4326)
    pub crs: Option<String>,
    /// Colormap name
    pub cmap: Option<String>,
    /// Value drawn with the low end of the colormap (default: data minimum)
    pub min_value: Option<f32>,
    /// Value drawn with the high end of the colormap (default: data maximum)
    pub max_value: Option<f32>,
    /// nearest or bilinear
    pub resampling: Option<String>,
}

/// Path segments of the tile endpoint
#[derive(Debug, Deserialize)]
pub struct TilePath {
    pub parameter: String,
    pub t: String,
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

/// Query parameters for the tile endpoint
#[derive(Debug, Default, Deserialize)]
pub struct TileQuery {
    /// Tile edge in pixels
    pub size: Option<u32>,
    pub cmap: Option<String>,
    pub min_value: Option<f32>,
    pub max_value: Option<f32>,
    pub resampling: Option<String>,
}

/// Handle GET {prefix}/ requests
pub async fn image_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ImageQuery>, QueryRejection>,
) -> Response {
    let endpoint = "image";
    let request_id = generate_request_id();
    let start_time = Instant::now();

    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            let error = IsobarError::invalid("query", rejection.body_text());
            return error_response(&error, endpoint, &request_id, None);
        }
    };

    debug!(
        endpoint = endpoint,
        request_id = %request_id,
        parameter = %params.parameter,
        datetime = %params.datetime,
        bbox = %params.bbox,
        crs = ?params.crs,
        width = params.width,
        height = params.height,
        cmap = ?params.cmap,
        "Processing image request"
    );

    match image_request(&state, &params) {
        Ok(request) => render_response(state, request, endpoint, request_id, start_time).await,
        Err(error) => error_response(&error, endpoint, &request_id, Some(&params.parameter)),
    }
}

/// Handle GET {prefix}/tile/{parameter}/{t}/{z}/{x}/{y} requests
pub async fn tile_handler(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<TilePath>, PathRejection>,
    query: std::result::Result<Query<TileQuery>, QueryRejection>,
) -> Response {
    let endpoint = "tile";
    let request_id = generate_request_id();
    let start_time = Instant::now();

    let (path, params) = match (path, query) {
        (Ok(Path(path)), Ok(Query(params))) => (path, params),
        (Err(rejection), _) => {
            let error = IsobarError::invalid("tile", rejection.body_text());
            return error_response(&error, endpoint, &request_id, None);
        }
        (_, Err(rejection)) => {
            let error = IsobarError::invalid("query", rejection.body_text());
            return error_response(&error, endpoint, &request_id, None);
        }
    };

    debug!(
        endpoint = endpoint,
        request_id = %request_id,
        parameter = %path.parameter,
        t = %path.t,
        tile = %format!("{}/{}/{}", path.z, path.x, path.y),
        size = ?params.size,
        "Processing tile request"
    );

    match tile_request(&state, &path, &params) {
        Ok(request) => render_response(state, request, endpoint, request_id, start_time).await,
        Err(error) => error_response(&error, endpoint, &request_id, Some(&path.parameter)),
    }
}

/// Validate a bbox query and turn it into a render request
fn image_request(state: &AppState, params: &ImageQuery) -> Result<RenderRequest> {
    let render = &state.config.render;

    let bbox = BoundingBox::parse(&params.bbox)?;
    let crs = match params.crs.as_deref() {
        Some(crs) if !crs.trim().is_empty() => Crs::parse(crs)?,
        _ => DEFAULT_CRS,
    };
    check_dimension("width", params.width, render.max_image_dimension)?;
    check_dimension("height", params.height, render.max_image_dimension)?;

    let range = ValueRange {
        min: params.min_value,
        max: params.max_value,
    };
    check_range(&range)?;

    Ok(RenderRequest {
        parameter: params.parameter.clone(),
        time: Some(RequestedTime::parse(&params.datetime)?),
        bbox,
        crs,
        width: params.width,
        height: params.height,
        crop: true,
        range,
        colormap: params
            .cmap
            .clone()
            .unwrap_or_else(|| render.default_colormap.clone()),
        resampling: params
            .resampling
            .clone()
            .unwrap_or_else(|| render.resampling.clone()),
    })
}

/// Validate a tile request and turn it into a render request
fn tile_request(state: &AppState, path: &TilePath, params: &TileQuery) -> Result<RenderRequest> {
    let render = &state.config.render;

    let coord = TileCoord::new(path.z, path.x, path.y)?;
    let size = params.size.unwrap_or(render.tile_size);
    check_dimension("size", size, render.max_image_dimension)?;

    let range = ValueRange::fixed(
        params.min_value.unwrap_or(render.tile_min_value),
        params.max_value.unwrap_or(render.tile_max_value),
    );
    check_range(&range)?;

    Ok(RenderRequest {
        parameter: path.parameter.clone(),
        time: Some(RequestedTime::parse(&path.t)?),
        bbox: tile_bounds_mercator(&coord),
        crs: Crs::Epsg3857,
        width: size,
        height: size,
        crop: false,
        range,
        colormap: params
            .cmap
            .clone()
            .unwrap_or_else(|| render.default_colormap.clone()),
        resampling: params
            .resampling
            .clone()
            .unwrap_or_else(|| render.resampling.clone()),
    })
}

fn check_dimension(param: &str, value: u32, max: u32) -> Result<()> {
    if value == 0 || value > max {
        return Err(IsobarError::invalid(
            param,
            format!("{} must be between 1 and {}, got {}", param, max, value),
        ));
    }
    Ok(())
}

fn check_range(range: &ValueRange) -> Result<()> {
    for (param, value) in [("min_value", range.min), ("max_value", range.max)] {
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(IsobarError::invalid(param, "Value must be a finite number"));
        }
    }
    if let (Some(min), Some(max)) = (range.min, range.max) {
        if min >= max {
            return Err(IsobarError::invalid(
                "min_value",
                format!("min_value ({}) must be less than max_value ({})", min, max),
            ));
        }
    }
    Ok(())
}

/// Render on the blocking pool and build the PNG response
async fn render_response(
    state: Arc<AppState>,
    request: RenderRequest,
    endpoint: &str,
    request_id: String,
    start_time: Instant,
) -> Response {
    let parameter = request.parameter.clone();
    let rendered = tokio::task::spawn_blocking(move || render_png(&state, &request))
        .await
        .unwrap_or_else(|e| {
            Err(IsobarError::Server {
                message: format!("Render task failed: {}", e),
            })
        });

    match rendered {
        Ok(rendered) => {
            info!(
                endpoint = endpoint,
                request_id = %request_id,
                parameter = %parameter,
                time_index = ?rendered.time_index,
                range = ?rendered.range,
                bytes = rendered.png.len(),
                duration_ms = start_time.elapsed().as_millis() as u64,
                "Image generation successful"
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "image/png".to_string()),
                    (REQUEST_ID_HEADER, request_id),
                ],
                rendered.png,
            )
                .into_response()
        }
        Err(error) => error_response(&error, endpoint, &request_id, Some(&parameter)),
    }
}

fn error_response(
    error: &IsobarError,
    endpoint: &str,
    request_id: &str,
    parameter: Option<&str>,
) -> Response {
    log_request_error(error, endpoint, request_id, parameter);

    (
        error.status_code(),
        Json(serde_json::json!({
            "error": error.to_string(),
            "request_id": request_id
        })),
    )
        .into_response()
}
