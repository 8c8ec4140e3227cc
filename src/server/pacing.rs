//! Client polling pace

use std::time::Duration;

/// Extra frames per second added to the capture rate so a client polls a
/// little faster than frames are produced
pub const DEFAULT_MARGIN_FPS: u32 = 5;

/// How long a broadcaster waits between polls of the frame store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    interval: Duration,
}

impl PacingPolicy {
    /// Poll at `fps + DEFAULT_MARGIN_FPS` times per second
    pub fn from_frame_rate(fps: u32) -> Self {
        Self::with_margin(fps, DEFAULT_MARGIN_FPS)
    }

    /// Poll at `fps + margin_fps` times per second
    pub fn with_margin(fps: u32, margin_fps: u32) -> Self {
        let rate = fps.saturating_add(margin_fps).max(1);
        Self {
            interval: Duration::from_secs_f64(1.0 / f64::from(rate)),
        }
    }

    /// Fixed polling interval
    pub fn fixed(interval: Duration) -> Self {
        Self { interval }
    }

    /// Wait between polls
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_frame_rate(15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_twenty_polls_per_second() {
        assert_eq!(PacingPolicy::default().interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_from_frame_rate() {
        let pacing = PacingPolicy::from_frame_rate(25);
        assert_eq!(pacing.interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_zero_rate_does_not_divide_by_zero() {
        let pacing = PacingPolicy::with_margin(0, 0);
        assert_eq!(pacing.interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_fixed() {
        let pacing = PacingPolicy::fixed(Duration::from_millis(7));
        assert_eq!(pacing.interval(), Duration::from_millis(7));
    }
}
