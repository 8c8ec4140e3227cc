//! # mjpeg-rs
//!
//! Live MJPEG camera relay.
//!
//! A capture process (for example `rpicam-vid --codec mjpeg -o -`) writes
//! back-to-back JPEG images to its stdout with no framing besides the JPEG
//! start/end of image markers. This crate splits that byte stream into
//! frames, keeps the most recent one in a single-slot store and serves it to
//! any number of HTTP clients as a `multipart/x-mixed-replace` stream.
//!
//! ```text
//!   capture stdout ──► Demuxer ──► FrameStore ──┬──► Broadcaster ──► client
//!                                  (1 slot)     ├──► Broadcaster ──► client
//!                                               └──► snapshot / status
//! ```
//!
//! Clients are never buffered: each one polls the store at its own pace and
//! only ever sees the latest frame. A slow client silently skips frames.
//!
//! # Example
//!
//! ```no_run
//! use mjpeg_rs::{CaptureConfig, ServerConfig, StreamServer};
//!
//! # async fn example() -> mjpeg_rs::Result<()> {
//! let server = StreamServer::new(ServerConfig::default(), CaptureConfig::default());
//! server.run().await
//! # }
//! ```

pub mod capture;
pub mod demux;
pub mod error;
pub mod media;
pub mod server;
pub mod stats;
pub mod store;

pub use capture::CaptureConfig;
pub use demux::Demuxer;
pub use error::{Error, Result};
pub use media::Frame;
pub use server::{PacingPolicy, ServerConfig, StreamServer};
pub use store::{CaptureState, FrameStore};
