//! Connected client bookkeeping

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Tracks live stream clients and enforces the optional client limit
#[derive(Debug)]
pub struct ClientTracker {
    active: AtomicUsize,
    next_id: AtomicU64,
    limit: Option<Arc<Semaphore>>,
}

impl ClientTracker {
    /// Create a tracker; `max_clients == 0` means unlimited
    pub fn new(max_clients: usize) -> Self {
        let limit = if max_clients > 0 {
            Some(Arc::new(Semaphore::new(max_clients)))
        } else {
            None
        };

        Self {
            active: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            limit,
        }
    }

    /// Admit a new client, or `None` if the limit is reached
    pub fn try_admit(self: &Arc<Self>) -> Option<ClientSlot> {
        let permit = match self.limit {
            Some(ref sem) => Some(sem.clone().try_acquire_owned().ok()?),
            None => None,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);

        Some(ClientSlot {
            id,
            tracker: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Number of connected stream clients
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

/// A connected client's slot; released on drop
#[derive(Debug)]
pub struct ClientSlot {
    id: u64,
    tracker: Arc<ClientTracker>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl ClientSlot {
    /// Unique client id
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ClientSlot {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::Relaxed);
    }
}
