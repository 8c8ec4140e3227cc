//! HTTP stream server
//!
//! Starts the capture task, binds the listener and serves the camera routes.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::capture::{CaptureConfig, CaptureSource};
use crate::error::{Error, Result};
use crate::server::clients::ClientTracker;
use crate::server::config::ServerConfig;
use crate::server::handlers::{snapshot_handler, status_handler, stream_handler, AppState};
use crate::server::multipart::MultipartEncoder;
use crate::store::FrameStore;

/// Live camera stream server
pub struct StreamServer {
    config: ServerConfig,
    capture: Arc<CaptureConfig>,
    store: Arc<FrameStore>,
    clients: Arc<ClientTracker>,
    started_at: Instant,
}

impl StreamServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig, capture: CaptureConfig) -> Self {
        let clients = Arc::new(ClientTracker::new(config.max_clients));

        Self {
            config,
            capture: Arc::new(capture),
            store: Arc::new(FrameStore::new()),
            clients,
            started_at: Instant::now(),
        }
    }

    /// Get a reference to the frame store
    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of connected stream clients
    pub fn active_clients(&self) -> usize {
        self.clients.active()
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Result<Router> {
        let state = AppState {
            store: Arc::clone(&self.store),
            capture: Arc::clone(&self.capture),
            encoder: Arc::new(MultipartEncoder::new(&self.config.boundary)?),
            pacing: self.config.pacing_for(self.capture.fps),
            clients: Arc::clone(&self.clients),
            started_at: self.started_at,
        };

        let mut traced = Router::new()
            .route("/camera/snapshot", get(snapshot_handler))
            .route("/camera/status", get(status_handler));

        if let Some(ref dir) = self.config.static_dir {
            traced = traced.fallback_service(ServeDir::new(dir));
        }

        // Live stream requests are long-lived and logged by the broadcaster
        let router = Router::new()
            .route("/camera", get(stream_handler))
            .merge(traced.layer(TraceLayer::new_for_http()))
            .with_state(state);

        Ok(router)
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server until `shutdown` completes
    ///
    /// Shutdown stops accepting connections and kills the capture process.
    /// Live stream connections that were already accepted are not drained:
    /// they keep serving the last stored frame until the client goes away
    /// or the runtime is dropped.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        // Fail on bad config before anything is spawned
        self.capture.validate()?;
        let router = self.router()?;

        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            tcp_nodelay = self.config.tcp_nodelay,
            "Camera stream server listening"
        );

        let capture_handle =
            CaptureSource::new(self.capture.as_ref().clone()).spawn(Arc::clone(&self.store));

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = axum::serve(listener, router)
                .tcp_nodelay(self.config.tcp_nodelay)
                .into_future() => {
                result.map_err(|e| Error::Server(e.to_string()))
            }
        };

        // Kills the capture process (kill_on_drop)
        capture_handle.abort();

        result
    }

    /// Configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_rejects_bad_boundary() {
        let server = StreamServer::new(
            ServerConfig::default().boundary("bad boundary"),
            CaptureConfig::default(),
        );

        assert!(matches!(server.router(), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_serve_rejects_bad_capture_config() {
        let server = StreamServer::new(ServerConfig::default(), CaptureConfig::default().fps(0));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = server.serve(listener, std::future::pending()).await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(server.store().state(), crate::store::CaptureState::Starting);
    }

    #[tokio::test]
    async fn test_shutdown_stops_server() {
        let server = StreamServer::new(
            ServerConfig::default(),
            CaptureConfig::with_program("mjpeg-rs-no-such-capture-program"),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            server.serve(listener, async {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            }),
        )
        .await
        .unwrap();

        assert!(result.is_ok());
    }
}
