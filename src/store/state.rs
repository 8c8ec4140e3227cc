//! Capture liveness state

use std::fmt;

/// State of the capture path as seen by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CaptureState {
    /// Capture not started yet
    Starting = 0,
    /// Capture process running and producing bytes
    Running = 1,
    /// Capture process ended; the last frame stays servable
    Terminated = 2,
    /// Capture process could not be started
    Unavailable = 3,
}

impl CaptureState {
    /// Whether frames may still arrive
    pub fn is_active(self) -> bool {
        self == CaptureState::Running
    }

    /// Whether this is a final state (no restart is attempted)
    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureState::Terminated | CaptureState::Unavailable)
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => CaptureState::Running,
            2 => CaptureState::Terminated,
            3 => CaptureState::Unavailable,
            _ => CaptureState::Starting,
        }
    }

    /// Short lowercase name, used in the status report
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureState::Starting => "starting",
            CaptureState::Running => "running",
            CaptureState::Terminated => "terminated",
            CaptureState::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
