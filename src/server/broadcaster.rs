//! Per-client frame broadcaster
//!
//! Every connected client gets its own broadcaster. It polls the frame store
//! at the configured pace and forwards a frame only if it is not the one it
//! sent last. Nothing is queued per client: a client slower than the capture
//! rate simply skips frames, and a client that stops reading only stalls its
//! own broadcaster.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::media::Frame;
use crate::store::FrameStore;

use super::clients::ClientSlot;
use super::multipart::MultipartEncoder;
use super::pacing::PacingPolicy;

/// State kept for one client connection
#[derive(Debug)]
pub struct ClientSession {
    /// Client slot (released when the session is dropped)
    slot: ClientSlot,
    /// Last frame written to this client
    last_sent: Option<Arc<Frame>>,
    /// Frames written
    pub frames_sent: u64,
    /// Payload bytes written
    pub bytes_sent: u64,
}

impl ClientSession {
    /// Create a session for an admitted client
    pub fn new(slot: ClientSlot) -> Self {
        Self {
            slot,
            last_sent: None,
            frames_sent: 0,
            bytes_sent: 0,
        }
    }

    /// Client id
    pub fn client_id(&self) -> u64 {
        self.slot.id()
    }

    /// Whether `frame` has not been sent to this client yet
    pub fn is_new(&self, frame: &Arc<Frame>) -> bool {
        match self.last_sent {
            Some(ref last) => !Frame::same(last, frame),
            None => true,
        }
    }

    fn mark_sent(&mut self, frame: &Arc<Frame>) {
        self.last_sent = Some(Arc::clone(frame));
        self.frames_sent += 1;
        self.bytes_sent += frame.len() as u64;
    }
}

/// Serves the latest frames to one client
pub struct Broadcaster {
    store: Arc<FrameStore>,
    encoder: Arc<MultipartEncoder>,
    pacing: PacingPolicy,
    session: ClientSession,
    /// Sleep before the next poll (false only before the first one)
    wait_before_poll: bool,
}

impl Broadcaster {
    /// Create a broadcaster for an admitted client
    pub fn new(
        store: Arc<FrameStore>,
        encoder: Arc<MultipartEncoder>,
        pacing: PacingPolicy,
        slot: ClientSlot,
    ) -> Self {
        tracing::debug!(client_id = slot.id(), "Stream client connected");

        Self {
            store,
            encoder,
            pacing,
            session: ClientSession::new(slot),
            wait_before_poll: false,
        }
    }

    /// Get the client session
    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// Wait until the store holds a frame this client has not been sent
    ///
    /// The frame is recorded as sent before it is returned.
    pub async fn next_frame(&mut self) -> Arc<Frame> {
        loop {
            if self.wait_before_poll {
                tokio::time::sleep(self.pacing.interval()).await;
            }
            self.wait_before_poll = true;

            if let Some(frame) = self.store.get() {
                if self.session.is_new(&frame) {
                    self.session.mark_sent(&frame);
                    return frame;
                }
            }
        }
    }

    /// Write parts to `writer` until a write fails
    ///
    /// Never returns `Ok`: the stream only ends when the client goes away.
    pub async fn run<W>(mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            let frame = self.next_frame().await;
            for part in self.encoder.encode(&frame) {
                writer.write_all(&part).await?;
            }
            writer.flush().await?;
        }
    }

    /// Turn the broadcaster into an HTTP body stream
    ///
    /// Dropping the stream (client disconnect) drops the broadcaster and
    /// releases its client slot.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        stream::unfold(self, |mut broadcaster| async move {
            let frame = broadcaster.next_frame().await;
            let parts = broadcaster.encoder.encode(&frame);
            Some((parts, broadcaster))
        })
        .flat_map(|parts| stream::iter(parts.into_iter().map(Ok::<Bytes, Infallible>)))
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        tracing::debug!(
            client_id = self.session.client_id(),
            frames_sent = self.session.frames_sent,
            bytes_sent = self.session.bytes_sent,
            "Stream client disconnected"
        );
    }
}
