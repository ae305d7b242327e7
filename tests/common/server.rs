//! In-process test server.

use std::net::SocketAddr;
use std::sync::Arc;

use isobar::{build_router, Config};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::test_data::create_global_ocean_nc;

/// An isobar server on an ephemeral port, serving the global ocean file
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
    // Keeps the NetCDF file alive for the server's lifetime
    _dir: TempDir,
}

impl TestServer {
    /// Start with the default configuration
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start with a configuration adjusted by `configure`
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("ocean.nc");
        create_global_ocean_nc(&path).expect("Failed to write test NetCDF file");

        let mut config = Config::default();
        config.data.file_path = Some(path.clone());
        configure(&mut config);

        let state = isobar::data_loader::load_netcdf(&path, config)
            .expect("Failed to load test NetCDF file");
        let app = build_router(Arc::new(state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            addr,
            handle,
            _dir: dir,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
