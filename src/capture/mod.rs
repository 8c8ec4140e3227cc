//! Capture input
//!
//! Runs the external capture process and pumps its stdout through the
//! demuxer into the frame store. The process itself is opaque: anything
//! that writes a motion-JPEG byte stream to stdout works.

pub mod config;
pub mod pump;
pub mod source;

pub use config::CaptureConfig;
pub use pump::{pump, PumpOutcome};
pub use source::CaptureSource;
