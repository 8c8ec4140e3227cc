//! Marker-based JPEG stream demuxer

use bytes::{Buf, BytesMut};

use crate::media::jpeg::{find_marker, is_complete_image, EOI, MARKER_LEN, SOI};
use crate::media::Frame;

/// Default cap for buffered, not yet terminated frame data (8MB)
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Demuxer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxStats {
    /// Total bytes fed
    pub bytes_in: u64,
    /// Frames extracted
    pub frames: u64,
    /// Bytes dropped as garbage or during resync
    pub bytes_discarded: u64,
    /// Times an oversized partial frame was abandoned
    pub resyncs: u64,
}

/// Splits a concatenated JPEG byte stream into frames
///
/// Not thread-safe by design: a single capture task owns it and calls
/// [`Demuxer::feed`] in stream order.
#[derive(Debug)]
pub struct Demuxer {
    /// Unconsumed bytes: empty, a lone trailing `0xFF`, or one partial frame
    buffer: BytesMut,
    /// Offset where the EOI search resumes for the partial frame at the front
    scan_from: usize,
    /// Maximum partial frame size before resync
    max_buffer_size: usize,
    /// Next frame sequence number
    next_sequence: u64,
    stats: DemuxStats,
}

impl Demuxer {
    /// Create a demuxer with the default buffer cap
    pub fn new() -> Self {
        Self::with_max_buffer_size(DEFAULT_MAX_BUFFER_SIZE)
    }

    /// Create a demuxer with a specific buffer cap
    pub fn with_max_buffer_size(max_buffer_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            scan_from: 0,
            max_buffer_size: max_buffer_size.max(2 * MARKER_LEN),
            next_sequence: 1,
            stats: DemuxStats::default(),
        }
    }

    /// Feed the next chunk of the stream
    ///
    /// Returns every frame completed by this chunk, in stream order. May be
    /// empty.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);
        self.stats.bytes_in += chunk.len() as u64;

        let mut frames = Vec::new();
        while let Some(frame) = self.extract_one() {
            frames.push(frame);
        }

        self.enforce_cap();
        frames
    }

    /// Try to cut one complete frame off the front of the buffer
    fn extract_one(&mut self) -> Option<Frame> {
        let start = match find_marker(&self.buffer, SOI, 0) {
            Some(start) => start,
            None => {
                self.discard_garbage();
                return None;
            }
        };

        // Buffer now starts with the SOI
        self.discard(start);

        // EOI search begins after the SOI so that FF D8 FF D9 is a valid frame
        // and a stray EOI before the SOI is ignored. Bytes already scanned in
        // earlier calls are skipped.
        let from = self.scan_from.max(MARKER_LEN);
        let end = match find_marker(&self.buffer, EOI, from) {
            Some(end) => end,
            None => {
                // Last byte may be the FF of an EOI split across chunks
                self.scan_from = self.buffer.len() - 1;
                return None;
            }
        };

        let data = self.buffer.split_to(end + MARKER_LEN).freeze();
        self.scan_from = 0;
        debug_assert!(is_complete_image(&data));

        let frame = Frame::new(self.next_sequence, data);
        self.next_sequence += 1;
        self.stats.frames += 1;

        tracing::trace!(sequence = frame.sequence, size = frame.len(), "Frame extracted");
        Some(frame)
    }

    /// Drop everything except a trailing `0xFF`, which may be the first half
    /// of an SOI split across chunks
    fn discard_garbage(&mut self) {
        let keep = usize::from(self.buffer.last() == Some(&SOI[0]));
        let drop = self.buffer.len() - keep;
        self.discard(drop);
    }

    fn discard(&mut self, count: usize) {
        if count > 0 {
            self.buffer.advance(count);
            self.scan_from = 0;
            self.stats.bytes_discarded += count as u64;
        }
    }

    /// Abandon partial frames that grew past the cap
    ///
    /// The buffer starts with an SOI here and contains no EOI after it, so
    /// the only thing worth keeping is a later SOI.
    fn enforce_cap(&mut self) {
        while self.buffer.len() > self.max_buffer_size {
            let before = self.buffer.len();
            match find_marker(&self.buffer, SOI, MARKER_LEN) {
                Some(next) => self.discard(next),
                None => self.discard_garbage(),
            }
            self.stats.resyncs += 1;

            tracing::warn!(
                dropped = before - self.buffer.len(),
                max_buffer_size = self.max_buffer_size,
                "Partial frame exceeded buffer cap, resyncing"
            );
        }
    }

    /// Bytes currently held waiting for more input
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of buffered bytes
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Counters since creation
    pub fn stats(&self) -> DemuxStats {
        self.stats
    }

    /// Drop all buffered data
    pub fn reset(&mut self) {
        let len = self.buffer.len();
        self.discard(len);
    }
}

impl Default for Demuxer {
    fn default() -> Self {
        Self::new()
    }
}
