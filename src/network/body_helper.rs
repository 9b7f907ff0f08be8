// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capturing outgoing request bodies

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::decompression::{decode, ContentEncoding};
use super::reporter::NetworkEventReporter;

#[derive(Debug, Clone)]
struct CapturedRequestBody {
    raw: Vec<u8>,
    encoding: ContentEncoding,
}

/// Mirrors request body bytes into the reporter, one helper per exchange
pub struct RequestBodyHelper {
    reporter: Arc<dyn NetworkEventReporter>,
    request_id: String,
    captured: Arc<Mutex<Option<CapturedRequestBody>>>,
}

impl RequestBodyHelper {
    pub fn new(reporter: Arc<dyn NetworkEventReporter>, request_id: impl Into<String>) -> Self {
        Self {
            reporter,
            request_id: request_id.into(),
            captured: Arc::new(Mutex::new(None)),
        }
    }

    /// Sink the request body is written into. Captured bytes become visible
    /// to the helper once the sink is closed or dropped.
    pub fn create_body_sink(&self, content_encoding: Option<&str>) -> io::Result<CaptureSink> {
        Ok(CaptureSink {
            buffer: Vec::new(),
            encoding: ContentEncoding::from_header(content_encoding),
            slot: Some(self.captured.clone()),
        })
    }

    /// Whether a body was captured
    pub fn has_body(&self) -> bool {
        self.captured.lock().is_some()
    }

    /// Captured body decoded for display
    pub fn display_body(&self) -> io::Result<Vec<u8>> {
        let captured = self.captured.lock();
        let Some(body) = captured.as_ref() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no request body was captured",
            ));
        };
        decode(body.encoding, &body.raw)
    }

    /// Report the captured body size to the reporter
    pub fn report_data_sent(&self) {
        let Some(raw_len) = self.captured.lock().as_ref().map(|b| b.raw.len()) else {
            return;
        };

        let display_len = match self.display_body() {
            Ok(body) => body.len(),
            Err(e) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    error = %e,
                    "Could not decode request body for display"
                );
                raw_len
            }
        };

        self.reporter
            .data_sent(&self.request_id, display_len, raw_len);
    }
}

/// Write side of a request body capture
///
/// Closing, explicitly or by drop, hands the written bytes to the helper.
pub struct CaptureSink {
    buffer: Vec<u8>,
    encoding: ContentEncoding,
    slot: Option<Arc<Mutex<Option<CapturedRequestBody>>>>,
}

impl CaptureSink {
    /// Finish the capture
    pub fn close(mut self) -> io::Result<()> {
        self.finish();
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(slot) = self.slot.take() {
            *slot.lock() = Some(CapturedRequestBody {
                raw: std::mem::take(&mut self.buffer),
                encoding: self.encoding,
            });
        }
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.slot.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "capture sink is closed",
            ));
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for CaptureSink {
    fn drop(&mut self) {
        self.finish();
    }
}
