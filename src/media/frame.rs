//! Frame type shared between the demuxer, the store and the broadcasters
//!
//! A frame is handed out as `Arc<Frame>`. Two frames are "the same" only if
//! they are the same allocation; identical bytes published twice are two
//! distinct frames.

use std::sync::Arc;

use bytes::Bytes;

/// One complete encoded still image, SOI through EOI inclusive
///
/// Cheap to clone: the payload is reference counted by `Bytes`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position in the capture stream (1-based)
    pub sequence: u64,
    /// Image bytes (zero-copy via reference counting)
    pub data: Bytes,
}

impl Frame {
    /// Create a frame from already delimited image bytes
    pub fn new(sequence: u64, data: Bytes) -> Self {
        Self { sequence, data }
    }

    /// Image size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the frame carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw image bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check whether two shared frames are the same frame (identity, not content)
    pub fn same(a: &Arc<Frame>, b: &Arc<Frame>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_content() {
        let data = Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]);
        let a = Arc::new(Frame::new(1, data.clone()));
        let b = Arc::new(Frame::new(1, data));
        let a2 = Arc::clone(&a);

        assert!(Frame::same(&a, &a2));
        assert!(!Frame::same(&a, &b));
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_len() {
        let frame = Frame::new(7, Bytes::from_static(&[0xFF, 0xD8, b'x', 0xFF, 0xD9]));
        assert_eq!(frame.len(), 5);
        assert!(!frame.is_empty());
        assert_eq!(frame.sequence, 7);
    }
}
