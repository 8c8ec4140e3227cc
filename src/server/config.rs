//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use super::multipart::DEFAULT_BOUNDARY;
use super::pacing::PacingPolicy;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent stream clients (0 = unlimited)
    pub max_clients: usize,

    /// Multipart boundary token for the live stream
    pub boundary: String,

    /// Poll pacing override (None = derived from the capture frame rate)
    pub pacing: Option<PacingPolicy>,

    /// Directory served for all paths not handled by the camera routes
    pub static_dir: Option<PathBuf>,

    /// Enable TCP_NODELAY on accepted connections
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_clients: 0, // Unlimited
            boundary: DEFAULT_BOUNDARY.to_string(),
            pacing: None,
            static_dir: None,
            tcp_nodelay: true, // Multipart parts are small, Nagle adds latency
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum stream clients
    pub fn max_clients(mut self, max: usize) -> Self {
        self.max_clients = max;
        self
    }

    /// Set the multipart boundary token
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    /// Set a fixed pacing policy
    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = Some(pacing);
        self
    }

    /// Serve static files from a directory
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Pacing to use for a capture running at `fps`
    pub fn pacing_for(&self, fps: u32) -> PacingPolicy {
        self.pacing
            .unwrap_or_else(|| PacingPolicy::from_frame_rate(fps))
    }
}
