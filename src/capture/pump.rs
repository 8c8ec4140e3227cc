//! Read loop: byte source → demuxer → store

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::demux::Demuxer;
use crate::store::{CaptureState, FrameStore};

/// Why the pump stopped
#[derive(Debug)]
pub enum PumpOutcome {
    /// The source reached end of stream
    Ended,
    /// A read from the source failed
    Failed(std::io::Error),
}

/// Pump `reader` until it ends, publishing every extracted frame
///
/// Marks the store `Running` on entry and `Terminated` on exit. Frames are
/// published in stream order. The last frame stays in the store after the
/// source is gone.
pub async fn pump<R>(
    reader: &mut R,
    demuxer: &mut Demuxer,
    store: &FrameStore,
    chunk_size: usize,
) -> PumpOutcome
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; chunk_size.max(1)];
    store.set_state(CaptureState::Running);

    let outcome = loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break PumpOutcome::Ended,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => break PumpOutcome::Failed(e),
        };

        for frame in demuxer.feed(&chunk[..n]) {
            store.set(frame);
        }
    };

    store.set_state(CaptureState::Terminated);

    let stats = demuxer.stats();
    tracing::debug!(
        bytes_in = stats.bytes_in,
        frames = stats.frames,
        bytes_discarded = stats.bytes_discarded,
        resyncs = stats.resyncs,
        buffered = demuxer.buffered_len(),
        "Capture pump stopped"
    );

    outcome
}
