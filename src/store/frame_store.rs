//! Single-slot frame store implementation

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::media::Frame;

use super::state::CaptureState;

/// Holder of the most recently completed frame
///
/// One writer (the capture task), any number of readers. The lock guards
/// only the `Arc` swap and is never held across I/O.
#[derive(Debug)]
pub struct FrameStore {
    /// Latest frame, if any was ever published
    latest: RwLock<Option<Arc<Frame>>>,

    /// Capture state, stored as `CaptureState as u8`
    state: AtomicU8,

    /// Number of frames published
    frames_published: AtomicU64,
}

impl FrameStore {
    /// Create an empty store in the `Starting` state
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
            state: AtomicU8::new(CaptureState::Starting as u8),
            frames_published: AtomicU64::new(0),
        }
    }

    /// Publish a frame, replacing the previous one
    ///
    /// Returns the shared handle readers will observe.
    pub fn set(&self, frame: Frame) -> Arc<Frame> {
        let frame = Arc::new(frame);
        let previous = {
            let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
            latest.replace(Arc::clone(&frame))
        };
        // Drop the superseded frame outside the lock
        drop(previous);

        self.frames_published.fetch_add(1, Ordering::Relaxed);
        frame
    }

    /// Get the latest frame, or `None` if no frame was ever published
    pub fn get(&self) -> Option<Arc<Frame>> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether at least one frame was published
    pub fn has_frame(&self) -> bool {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Whether the capture path is currently producing frames
    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Current capture state
    pub fn state(&self) -> CaptureState {
        CaptureState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Set the capture state
    pub fn set_state(&self, state: CaptureState) {
        let previous = CaptureState::from_u8(self.state.swap(state as u8, Ordering::AcqRel));

        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Capture state changed");
        }
    }

    /// Number of frames published since creation
    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn frame(seq: u64, fill: u8, len: usize) -> Frame {
        let mut data = vec![0xFF, 0xD8];
        data.extend(std::iter::repeat(fill).take(len));
        data.extend_from_slice(&[0xFF, 0xD9]);
        Frame::new(seq, Bytes::from(data))
    }

    #[test]
    fn test_empty_store() {
        let store = FrameStore::new();

        assert!(store.get().is_none());
        assert!(!store.has_frame());
        assert!(!store.is_active());
        assert_eq!(store.state(), CaptureState::Starting);
        assert_eq!(store.frames_published(), 0);
    }

    #[test]
    fn test_set_replaces_latest() {
        let store = FrameStore::new();

        let first = store.set(frame(1, b'a', 3));
        let got = store.get().unwrap();
        assert!(Frame::same(&first, &got));

        let second = store.set(frame(2, b'b', 3));
        let got = store.get().unwrap();
        assert!(Frame::same(&second, &got));
        assert!(!Frame::same(&first, &got));
        assert_eq!(store.frames_published(), 2);
    }

    #[test]
    fn test_reader_keeps_superseded_frame() {
        let store = FrameStore::new();
        store.set(frame(1, b'a', 4));
        let held = store.get().unwrap();

        store.set(frame(2, b'b', 8));

        // The old handle is still whole after being replaced
        assert_eq!(held.sequence, 1);
        assert_eq!(held.as_bytes(), frame(1, b'a', 4).as_bytes());
    }

    #[test]
    fn test_state_transitions() {
        let store = FrameStore::new();

        store.set_state(CaptureState::Running);
        assert!(store.is_active());

        store.set(frame(1, b'a', 1));
        store.set_state(CaptureState::Terminated);
        assert!(!store.is_active());
        // Stale frame remains available
        assert!(store.has_frame());
    }

    #[test]
    fn test_concurrent_get_never_torn() {
        let store = Arc::new(FrameStore::new());
        let writer_store = Arc::clone(&store);

        let writer = std::thread::spawn(move || {
            for i in 0..2000u64 {
                // Each frame is uniform, with a length derived from its sequence
                let fill = (i % 251) as u8;
                writer_store.set(frame(i + 1, fill, (i % 97) as usize));
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        if let Some(f) = store.get() {
                            let i = f.sequence - 1;
                            let expected = frame(f.sequence, (i % 251) as u8, (i % 97) as usize);
                            assert_eq!(f.as_bytes(), expected.as_bytes());
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(store.frames_published(), 2000);
        assert_eq!(store.get().unwrap().sequence, 2000);
    }
}
