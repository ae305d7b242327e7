//! Heartbeat endpoint handler.
//!
//! Returns server status information: uptime, memory usage, a summary of
//! the loaded dataset and the image endpoint settings.

use axum::{extract::State, Json};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::state::AppState;

/// Server ID, generated once per process
static SERVER_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Server start time
static START_TIME: Lazy<SystemTime> = Lazy::new(SystemTime::now);

/// Touch the lazily initialized statics so uptime counts from startup
pub fn mark_start() {
    Lazy::force(&START_TIME);
    Lazy::force(&SERVER_ID);
}

/// Heartbeat response structure
#[derive(Serialize)]
pub struct HeartbeatResponse {
    /// Server ID (unique per instance)
    pub server_id: String,
    /// Current timestamp (ISO 8601 format)
    pub timestamp: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Process memory usage in bytes
    pub memory_usage_bytes: Option<u64>,
    /// Available system memory in bytes
    pub available_memory_bytes: Option<u64>,
    /// Dataset information
    pub dataset: DatasetInfo,
    /// Where and how images are served
    pub render: RenderInfo,
    /// Server status
    pub status: String,
}

/// Dataset information structure
#[derive(Serialize)]
pub struct DatasetInfo {
    /// Dataset file path
    pub file_path: Option<String>,
    /// Number of renderable variables
    pub variable_count: usize,
    /// Names of the renderable variables
    pub variables: Vec<String>,
    /// Number of dimensions
    pub dimension_count: usize,
    /// Dimension names and sizes, sorted by name
    pub dimensions: Vec<(String, usize)>,
    /// Approximate memory usage for dataset in bytes
    pub data_memory_bytes: usize,
}

/// Rendering settings a client needs to build image URLs
#[derive(Serialize)]
pub struct RenderInfo {
    pub route_prefix: String,
    pub tile_size: u32,
    pub default_colormap: String,
    /// Fixed tile color scale
    pub tile_range: (f32, f32),
}

impl RenderInfo {
    fn from_state(state: &AppState) -> Self {
        let render = &state.config.render;
        Self {
            route_prefix: render.route_prefix.clone(),
            tile_size: render.tile_size,
            default_colormap: render.default_colormap.clone(),
            tile_range: (render.tile_min_value, render.tile_max_value),
        }
    }
}

impl DatasetInfo {
    fn from_state(state: &AppState) -> Self {
        let variables = state.data_variable_names();
        let mut dimensions: Vec<(String, usize)> = state
            .metadata
            .dimensions
            .values()
            .map(|dim| (dim.name.clone(), dim.size))
            .collect();
        dimensions.sort();

        Self {
            file_path: state
                .config
                .data
                .file_path
                .as_ref()
                .map(|p| p.display().to_string()),
            variable_count: variables.len(),
            variables,
            dimension_count: dimensions.len(),
            dimensions,
            data_memory_bytes: state.data_memory_bytes(),
        }
    }
}

/// Handle GET /heartbeat requests
pub async fn heartbeat_handler(State(state): State<Arc<AppState>>) -> Json<HeartbeatResponse> {
    let now = SystemTime::now();
    let timestamp = chrono::DateTime::<chrono::Utc>::from(now)
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let uptime = now
        .duration_since(*START_TIME)
        .unwrap_or(Duration::from_secs(0));

    Json(HeartbeatResponse {
        server_id: SERVER_ID.clone(),
        timestamp,
        uptime_seconds: uptime.as_secs(),
        memory_usage_bytes: get_memory_usage(),
        available_memory_bytes: get_available_memory(),
        dataset: DatasetInfo::from_state(&state),
        render: RenderInfo::from_state(&state),
        status: "healthy".to_string(),
    })
}

/// Resident set size of this process
#[cfg(target_os = "linux")]
fn get_memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_kb_field(&status, "VmRSS")
}

/// Memory the kernel reports as available to new allocations
#[cfg(target_os = "linux")]
fn get_available_memory() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_kb_field(&meminfo, "MemAvailable")
}

#[cfg(not(target_os = "linux"))]
fn get_memory_usage() -> Option<u64> {
    None
}

#[cfg(not(target_os = "linux"))]
fn get_available_memory() -> Option<u64> {
    None
}

/// Bytes of a `Key:   1234 kB` line, as found in `/proc/self/status` and `/proc/meminfo`
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_kb_field(contents: &str, key: &str) -> Option<u64> {
    let value = contents.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix(':'))
    })?;
    let kb: u64 = value.split_whitespace().next()?.parse().ok()?;
    Some(kb * 1024)
}
