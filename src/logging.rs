//! Logging utilities for the isobar server.
//!
//! This module provides structured logging functionality to make logs more
//! searchable, analyzable, and useful for production deployments.

use std::time::Duration;
use tracing::{error, info, warn, Level};

use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use uuid::Uuid;

use crate::error::IsobarError;

/// Creates the tracing layer for HTTP request/response logging
pub fn create_http_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    let response_formatter = DefaultOnResponse::new()
        .level(Level::DEBUG)
        .latency_unit(LatencyUnit::Micros);

    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(response_formatter)
}

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set. Calling this twice is harmless.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log detailed information about the data loaded
pub fn log_data_load_stats(
    file_path: &str,
    var_names: &[&str],
    dim_details: &str,
    memory_usage: usize,
    duration: Duration,
) {
    info!(
        operation = "data_load",
        file_path = file_path,
        var_count = var_names.len(),
        vars = %var_names.join(", "),
        dims = dim_details,
        memory_mb = memory_usage / (1024 * 1024),
        duration_ms = duration.as_millis() as u64,
        "Data loaded successfully"
    );
}

/// Log an error that occurred during request processing.
///
/// Client mistakes are logged at `warn`, everything else at `error`.
pub fn log_request_error(
    error: &IsobarError,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) {
    let status = error.status_code().as_u16();
    if error.status_code().is_client_error() {
        warn!(
            error = %error,
            endpoint = endpoint,
            request_id = request_id,
            status = status,
            params = params.unwrap_or("none"),
            "Request rejected"
        );
    } else {
        error!(
            error = %error,
            endpoint = endpoint,
            request_id = request_id,
            status = status,
            params = params.unwrap_or("none"),
            "Request processing error"
        );
    }
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
