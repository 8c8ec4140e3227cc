//! Capture status report served by the status endpoint

use std::time::Duration;

use serde::Serialize;

use crate::capture::CaptureConfig;
use crate::store::FrameStore;

/// Snapshot of capture liveness and parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Capture is producing frames
    pub running: bool,
    /// At least one frame was captured
    pub has_frame: bool,
    /// Configured frame width
    pub width: u32,
    /// Configured frame height
    pub height: u32,
    /// Configured frame rate
    pub fps: u32,
    /// Capture state name
    pub state: &'static str,
    /// Frames captured since start
    pub frames_captured: u64,
    /// Connected stream clients
    pub clients: usize,
    /// Server uptime in seconds
    pub uptime_secs: u64,
}

impl StatusReport {
    /// Collect the current status
    pub fn collect(
        store: &FrameStore,
        capture: &CaptureConfig,
        clients: usize,
        uptime: Duration,
    ) -> Self {
        let state = store.state();

        Self {
            running: state.is_active(),
            has_frame: store.has_frame(),
            width: capture.width,
            height: capture.height,
            fps: capture.fps,
            state: state.as_str(),
            frames_captured: store.frames_published(),
            clients,
            uptime_secs: uptime.as_secs(),
        }
    }
}
