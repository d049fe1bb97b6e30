//! Decoder types
//!
//! Content encoding detection.

use serde::{Deserialize, Serialize};

/// Content encoding of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Plain body
    #[default]
    Identity,
    /// Gzip-compressed body (report payloads)
    Gzip,
}

impl Compression {
    /// Gzip magic bytes
    pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

    /// Detect the encoding from the `Content-Encoding` header or the body's
    /// leading bytes.
    pub fn detect(content_encoding: Option<&str>, body: &[u8]) -> Self {
        let declared = content_encoding
            .map(|enc| enc.split(',').any(|e| e.trim().eq_ignore_ascii_case("gzip")))
            .unwrap_or(false);

        if declared || body.starts_with(&Self::GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::Identity
        }
    }
}
