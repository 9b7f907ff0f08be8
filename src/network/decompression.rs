// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Content-encoding decoding for captured bodies
//!
//! Only display copies are decoded. Bytes delivered to the caller are never
//! touched.

use std::io::{self, Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};

/// Content encodings the inspector can decode for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
    /// Anything else; captured as-is
    Unsupported,
}

impl ContentEncoding {
    /// Parse a `Content-Encoding` header value
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return ContentEncoding::Identity;
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => ContentEncoding::Identity,
            "gzip" | "x-gzip" => ContentEncoding::Gzip,
            "deflate" => ContentEncoding::Deflate,
            other => {
                tracing::debug!(encoding = other, "Unsupported content encoding, capturing raw");
                ContentEncoding::Unsupported
            }
        }
    }
}

/// Decode a complete buffer
pub fn decode(encoding: ContentEncoding, data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    match encoding {
        ContentEncoding::Gzip => {
            GzDecoder::new(data).read_to_end(&mut decoded)?;
        }
        ContentEncoding::Deflate => {
            ZlibDecoder::new(data).read_to_end(&mut decoded)?;
        }
        ContentEncoding::Identity | ContentEncoding::Unsupported => {
            decoded.extend_from_slice(data);
        }
    }
    Ok(decoded)
}

/// Writer that decodes everything written to it into `inner`
///
/// Decoded output is complete once the returned writer is flushed and
/// dropped.
pub fn decoding_writer<W>(encoding: ContentEncoding, inner: W) -> Box<dyn Write + Send>
where
    W: Write + Send + 'static,
{
    match encoding {
        ContentEncoding::Gzip => Box::new(flate2::write::GzDecoder::new(inner)),
        ContentEncoding::Deflate => Box::new(flate2::write::ZlibDecoder::new(inner)),
        ContentEncoding::Identity | ContentEncoding::Unsupported => Box::new(inner),
    }
}
