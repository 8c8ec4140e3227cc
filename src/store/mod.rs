//! Latest-frame store
//!
//! The store is the only point of coordination between the capture task and
//! the clients. It holds exactly one frame: publishing a new one replaces the
//! old one, nothing is queued.
//!
//! # Architecture
//!
//! ```text
//!                         Arc<FrameStore>
//!                     ┌──────────────────────┐
//!                     │ latest: RwLock<      │
//!                     │   Option<Arc<Frame>> │
//!                     │ >                    │
//!                     │ state: CaptureState  │
//!                     └──────────┬───────────┘
//!                                │
//!         ┌──────────────────────┼───────────────────────┐
//!         │                      │                       │
//!         ▼                      ▼                       ▼
//!    [Capture task]        [Broadcaster]           [Broadcaster]
//!    store.set()           store.get()             store.get()
//! ```
//!
//! # Zero-Copy Design
//!
//! `get()` clones the `Arc<Frame>` under the lock and nothing else. Frame bytes
//! are immutable once published, so readers use them without holding any lock.

pub mod frame_store;
pub mod state;

pub use frame_store::FrameStore;
pub use state::CaptureState;
