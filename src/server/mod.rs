//! HTTP server
//!
//! Serves the latest captured frame as a live multipart stream, a single
//! snapshot, and a JSON status report. Each stream client runs its own
//! [`Broadcaster`]; clients share nothing but the frame store.

pub mod broadcaster;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod listener;
pub mod multipart;
pub mod pacing;

pub use broadcaster::{Broadcaster, ClientSession};
pub use clients::{ClientSlot, ClientTracker};
pub use config::ServerConfig;
pub use listener::StreamServer;
pub use multipart::MultipartEncoder;
pub use pacing::PacingPolicy;
