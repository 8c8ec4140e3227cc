//! `multipart/x-mixed-replace` part encoding
//!
//! Each frame is sent as one part; the browser replaces the previous image
//! with it:
//!
//! ```text
//! --frame\r\n
//! Content-Type: image/jpeg\r\n
//! Content-Length: 5120\r\n
//! \r\n
//! <5120 bytes of JPEG>\r\n
//! ```

use axum::http::HeaderValue;
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::media::Frame;

/// Default boundary token
pub const DEFAULT_BOUNDARY: &str = "frame";

/// Maximum boundary length allowed by RFC 2046
const MAX_BOUNDARY_LEN: usize = 70;

/// Encodes frames as parts of a multipart stream
#[derive(Debug, Clone)]
pub struct MultipartEncoder {
    boundary: String,
    content_type: HeaderValue,
}

impl MultipartEncoder {
    /// Create an encoder for the given boundary token
    pub fn new(boundary: &str) -> Result<Self> {
        validate_boundary(boundary)?;

        let content_type =
            HeaderValue::from_str(&format!("multipart/x-mixed-replace; boundary={}", boundary))
                .map_err(|e| Error::Config(format!("invalid boundary: {}", e)))?;

        Ok(Self {
            boundary: boundary.to_string(),
            content_type,
        })
    }

    /// Boundary token
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Response `Content-Type` for the whole stream
    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    /// Part headers for a frame of `len` bytes
    pub fn part_header(&self, len: usize) -> Bytes {
        Bytes::from(format!(
            "--{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            self.boundary, len
        ))
    }

    /// Encode a frame as header, payload and trailing line break
    ///
    /// The payload is not copied.
    pub fn encode(&self, frame: &Frame) -> [Bytes; 3] {
        [
            self.part_header(frame.len()),
            frame.data.clone(),
            Bytes::from_static(b"\r\n"),
        ]
    }
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.to_string(),
            content_type: HeaderValue::from_static("multipart/x-mixed-replace; boundary=frame"),
        }
    }
}

fn validate_boundary(boundary: &str) -> Result<()> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(Error::Config(format!(
            "boundary must be 1-{} characters",
            MAX_BOUNDARY_LEN
        )));
    }
    if !boundary
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "'()+_,-./:=?".contains(c))
    {
        return Err(Error::Config(format!("invalid boundary: {}", boundary)));
    }
    Ok(())
}
