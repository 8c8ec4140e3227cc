//! Capture process supervision
//!
//! Spawns the capture program once. If it cannot be started, or once its
//! stdout ends, the store is left in a terminal state; restarting is left to
//! whatever supervises this process.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::demux::Demuxer;
use crate::error::{Error, Result};
use crate::store::{CaptureState, FrameStore};

use super::config::CaptureConfig;
use super::pump::{pump, PumpOutcome};

/// External capture process feeding a frame store
pub struct CaptureSource {
    config: CaptureConfig,
}

impl CaptureSource {
    /// Create a capture source
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    /// Get the capture configuration
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    fn spawn_child(&self) -> Result<Child> {
        Command::new(&self.config.program)
            .args(self.config.command_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::SourceUnavailable(format!(
                    "{} not found",
                    self.config.program
                )),
                _ => Error::SourceUnavailable(format!("{}: {}", self.config.program, e)),
            })
    }

    /// Run capture until the process output ends
    ///
    /// Always returns an error: `SourceUnavailable` if the process could not
    /// be started, `SourceTerminated` once it stops producing bytes.
    pub async fn run(self, store: Arc<FrameStore>) -> Result<()> {
        self.config.validate()?;

        let mut child = match self.spawn_child() {
            Ok(child) => child,
            Err(e) => {
                store.set_state(CaptureState::Unavailable);
                return Err(e);
            }
        };

        let mut stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                store.set_state(CaptureState::Unavailable);
                return Err(Error::SourceUnavailable("stdout not captured".into()));
            }
        };

        tracing::info!(
            program = %self.config.program,
            pid = ?child.id(),
            width = self.config.width,
            height = self.config.height,
            fps = self.config.fps,
            "Capture started"
        );

        let mut demuxer = Demuxer::with_max_buffer_size(self.config.max_buffer_size);
        let outcome = pump(&mut stdout, &mut demuxer, &store, self.config.read_chunk_size).await;

        match outcome {
            PumpOutcome::Ended => tracing::warn!("Capture output ended"),
            PumpOutcome::Failed(e) => tracing::warn!(error = %e, "Capture read failed"),
        }

        // The process may still be alive after closing stdout
        if let Err(e) = child.start_kill() {
            tracing::debug!(error = %e, "Capture process already exited");
        }
        match child.wait().await {
            Ok(status) => tracing::info!(status = %status, "Capture process exited"),
            Err(e) => tracing::debug!(error = %e, "Failed to reap capture process"),
        }

        Err(Error::SourceTerminated)
    }

    /// Spawn [`CaptureSource::run`] on the runtime
    ///
    /// Errors are logged; the store reflects the final state.
    pub fn spawn(self, store: Arc<FrameStore>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run(store).await {
                match e {
                    Error::SourceTerminated => tracing::warn!("Capture terminated, no restart"),
                    e => tracing::error!(error = %e, "Capture failed to start"),
                }
            }
        })
    }
}
