//! Live camera MJPEG server
//!
//! Run with: cargo run --bin mjpeg-server -- [OPTIONS]
//!
//! Examples:
//!   mjpeg-server                                  # rpicam-vid, 640x480@15, port 8080
//!   mjpeg-server --width 1280 --height 720 --fps 30
//!   mjpeg-server --bind 127.0.0.1:9000 --static-dir ./www
//!
//! Endpoints:
//!   http://localhost:8080/camera            live multipart stream
//!   http://localhost:8080/camera/snapshot   latest frame
//!   http://localhost:8080/camera/status     capture status (JSON)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mjpeg_rs::{CaptureConfig, PacingPolicy, ServerConfig, StreamServer};

#[derive(Debug, Parser)]
#[command(name = "mjpeg-server", version, about = "Serve a live camera as an MJPEG stream")]
struct Args {
    /// Address to bind to
    #[arg(long, env = "MJPEG_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Capture program writing MJPEG to stdout
    #[arg(long, env = "MJPEG_CAPTURE_PROGRAM", default_value = "rpicam-vid")]
    program: String,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// Frame width
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Frame rate
    #[arg(long, default_value_t = 15)]
    fps: u32,

    /// Maximum concurrent stream clients (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_clients: usize,

    /// Fixed poll interval in milliseconds (default: derived from --fps)
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Directory served for all other paths
    #[arg(long, env = "MJPEG_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Disable TCP_NODELAY on client connections
    #[arg(long)]
    no_tcp_nodelay: bool,

    /// Seconds to wait before reporting whether capture started
    #[arg(long, default_value_t = 1)]
    startup_grace_secs: u64,

    /// Extra arguments passed to the capture program
    #[arg(last = true)]
    capture_args: Vec<String>,
}

impl Args {
    fn capture_config(&self) -> CaptureConfig {
        let mut config = CaptureConfig::with_program(&self.program)
            .camera(self.camera)
            .resolution(self.width, self.height)
            .fps(self.fps);
        config.extra_args = self.capture_args.clone();
        config
    }

    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::with_addr(self.bind)
            .max_clients(self.max_clients)
            .tcp_nodelay(!self.no_tcp_nodelay);
        if let Some(ms) = self.poll_interval_ms {
            config = config.pacing(PacingPolicy::fixed(Duration::from_millis(ms)));
        }
        if let Some(ref dir) = self.static_dir {
            config = config.static_dir(dir);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("mjpeg_rs=info,mjpeg_server=info")
            }),
        )
        .init();

    let capture = args.capture_config();
    tracing::info!(
        program = %capture.program,
        width = capture.width,
        height = capture.height,
        fps = capture.fps,
        "Starting camera stream server"
    );

    let server = StreamServer::new(args.server_config(), capture);
    let store = std::sync::Arc::clone(server.store());
    let grace = Duration::from_secs(args.startup_grace_secs);

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        if store.is_active() {
            tracing::info!("Camera active");
        } else {
            tracing::warn!(state = %store.state(), "Camera not active, serving without capture");
        }
    });

    tracing::info!("Stream: http://{}/camera", server.bind_addr());

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
