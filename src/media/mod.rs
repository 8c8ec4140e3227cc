//! Media handling
//!
//! This module provides:
//! - JPEG start/end of image marker scanning
//! - The immutable, reference-counted `Frame` shared between the store and clients

pub mod frame;
pub mod jpeg;

pub use frame::Frame;
pub use jpeg::{find_marker, EOI, SOI};
