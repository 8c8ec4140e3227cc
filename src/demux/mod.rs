//! Frame demultiplexer
//!
//! Splits the raw capture byte stream into discrete JPEG frames. Chunk
//! boundaries from the pipe are arbitrary, so a frame may arrive split
//! across any number of reads and a single read may carry several frames.

pub mod demuxer;

pub use demuxer::{DemuxStats, Demuxer, DEFAULT_MAX_BUFFER_SIZE};
