//! isobar - gridded NetCDF fields as PNG map images and XYZ tiles
//!
//! This is the main entry point for the isobar server.

use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use isobar::data_loader::load_netcdf;
use isobar::handlers::heartbeat;
use isobar::{build_router, init_tracing, Config};

fn main() -> anyhow::Result<()> {
    let (config, netcdf_path) = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.log_level);
    heartbeat::mark_start();
    info!("Starting isobar v{}", env!("CARGO_PKG_VERSION"));

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if let Some(workers) = config.server.workers {
        runtime.worker_threads(workers);
    }
    let runtime = runtime.build().context("Failed to build the tokio runtime")?;

    runtime.block_on(serve(config, netcdf_path))
}

async fn serve(config: Config, netcdf_path: std::path::PathBuf) -> anyhow::Result<()> {
    info!("Loading NetCDF file: {}", netcdf_path.display());
    let app_state = load_netcdf(&netcdf_path, config.clone())
        .with_context(|| format!("Failed to load {}", netcdf_path.display()))?;

    let variables = app_state.data_variable_names();
    if variables.is_empty() {
        warn!("The file contains no variables that can be rendered");
    }
    info!(
        variables = %variables.join(", "),
        dimensions = app_state.metadata.dimensions.len(),
        "Dataset ready"
    );

    let app = build_router(Arc::new(app_state));

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid host address: {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(
        "Server listening on http://{}{}/",
        addr,
        config.render.route_prefix.trim_end_matches('/')
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server has been gracefully shut down");
    Ok(())
}

/// Wait for a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
