//! Metadata endpoint handler.
//!
//! Returns JSON describing the loaded file: dimensions, variables,
//! attributes and coordinates, plus what the image endpoints need to know
//! (the resolved CF axes of each variable, decoded times and the color maps).

use axum::{extract::State, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::cf::{self, AxisDims};
use crate::colormaps;
use crate::logging::generate_request_id;
use crate::state::AppState;

/// Handle GET /metadata requests
pub async fn metadata_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let request_id = generate_request_id();
    let start_time = Instant::now();

    debug!(
        endpoint = "/metadata",
        request_id = %request_id,
        "Processing metadata request"
    );

    let response = build_metadata(&state);

    info!(
        endpoint = "/metadata",
        request_id = %request_id,
        duration_us = start_time.elapsed().as_micros() as u64,
        variable_count = state.metadata.variables.len(),
        dimension_count = state.metadata.dimensions.len(),
        "Metadata request successful"
    );

    Json(response)
}

fn build_metadata(state: &AppState) -> serde_json::Value {
    let mut axes = BTreeMap::new();
    let mut times = BTreeMap::new();
    for name in state.data_variable_names() {
        let Some(var) = state.get_variable_metadata(&name) else {
            continue;
        };
        let dims = AxisDims::resolve(state, var);
        if let Some(t) = &dims.t {
            if let Ok(decoded) = cf::decode_times(state, t) {
                let iso: Vec<Option<String>> =
                    decoded.iter().map(|t| t.map(|t| t.to_rfc3339())).collect();
                times.insert(t.clone(), iso);
            }
        }
        axes.insert(name, dims);
    }

    serde_json::json!({
        "global_attributes": state.metadata.global_attributes,
        "dimensions": state.metadata.dimensions,
        "variables": state.metadata.variables,
        "coordinates": state.metadata.coordinates,
        "axes": axes,
        "times": times,
        "colormaps": colormaps::available_colormaps(),
    })
}
