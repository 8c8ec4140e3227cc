//! JPEG marker scanning
//!
//! A motion-JPEG capture stream is a plain concatenation of JPEG images.
//! There are no length prefixes, so frames are delimited only by their
//! markers:
//!
//! ```text
//! +---------+----------------------------+---------+
//! | FF D8   | segments + entropy data... | FF D9   |
//! | (SOI)   |                            | (EOI)   |
//! +---------+----------------------------+---------+
//! ```
//!
//! Inside entropy-coded data a literal `0xFF` is always followed by a stuffed
//! `0x00`, so `FF D9` cannot appear before the real end of image.

/// Start of image marker
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// End of image marker
pub const EOI: [u8; 2] = [0xFF, 0xD9];

/// Marker length in bytes
pub const MARKER_LEN: usize = 2;

/// Find the first occurrence of `marker` in `data` at or after `from`.
///
/// Returns the absolute offset of the marker's first byte.
pub fn find_marker(data: &[u8], marker: [u8; 2], from: usize) -> Option<usize> {
    if from >= data.len() {
        return None;
    }

    data[from..]
        .windows(MARKER_LEN)
        .position(|w| w == marker)
        .map(|pos| pos + from)
}

/// Check if `data` looks like a complete JPEG image (starts with SOI, ends with EOI)
pub fn is_complete_image(data: &[u8]) -> bool {
    data.len() >= 2 * MARKER_LEN && data.starts_with(&SOI) && data.ends_with(&EOI)
}
