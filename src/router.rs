//! Route table for the isobar server.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{heartbeat_handler, image_handler, metadata_handler, tile_handler};
use crate::logging::create_http_trace_layer;
use crate::state::AppState;

/// Build the application router.
///
/// The image endpoints are mounted under `config.render.route_prefix`:
/// `{prefix}/` for bounding boxes and
/// `{prefix}/tile/:parameter/:t/:z/:x/:y` for XYZ tiles.
pub fn build_router(state: Arc<AppState>) -> Router {
    let base = state
        .config
        .render
        .route_prefix
        .trim_end_matches('/')
        .to_string();

    let mut router = Router::new()
        .route(&format!("{}/", base), get(image_handler))
        .route(
            &format!("{}/tile/:parameter/:t/:z/:x/:y", base),
            get(tile_handler),
        )
        .route("/metadata", get(metadata_handler))
        .route("/heartbeat", get(heartbeat_handler));

    if !base.is_empty() {
        router = router.route(&base, get(image_handler));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(create_http_trace_layer())
        .with_state(state)
}
