//! HTTP request handlers for the isobar API.
//!
//! This module contains all the endpoint handlers for the web server.

pub mod heartbeat;
pub mod image;
pub mod metadata;

pub use heartbeat::heartbeat_handler;
pub use image::{image_handler, tile_handler};
pub use metadata::metadata_handler;
