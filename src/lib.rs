//! # isobar
//!
//! Renders a gridded NetCDF field as PNG map images over HTTP.
//!
//! A single file is loaded into memory at startup and two endpoints draw it:
//!
//! - **Bounding-box images**: any box in EPSG:4326 or EPSG:3857 at any size,
//!   with colors autoscaled to the values in view
//! - **XYZ tiles**: slippy-map tiles in Web Mercator on a fixed color scale
//!
//! ## Architecture
//!
//! - **Data Layer** ([`data_loader`], [`state`], [`cf`]): loads and CF decodes
//!   the file and resolves longitude, latitude and time axes
//! - **Geometry** ([`geo`]): bounding boxes, CRS transforms and tile bounds
//! - **Rendering** ([`render`], [`interpolation`], [`colormaps`]): slice,
//!   resample, normalize, colorize and encode
//! - **API Layer** ([`handlers`], [`router`]): the axum endpoints

pub mod cf;
pub mod colormaps;
pub mod config;
#[cfg(feature = "netcdf")]
pub mod data_loader;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod interpolation;
pub mod logging;
pub mod render;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::{IsobarError, Result};
pub use logging::{create_http_trace_layer, generate_request_id, init_tracing};
pub use router::build_router;
pub use state::{AppState, AttributeValue, Dimension, Metadata, Variable};
