// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Contract between the inspector and the event sink it reports to

use std::io;
use std::sync::Arc;

use crate::http::BodySource;

use super::response_handler::ResponseHandler;

/// Ordered header enumeration shared by request and response views
///
/// Names may repeat. Lookups by name are case-insensitive.
pub trait InspectorHeaders {
    fn header_count(&self) -> usize;

    fn header_name(&self, index: usize) -> Option<&str>;

    fn header_value(&self, index: usize) -> Option<&str>;

    fn first_header_value(&self, name: &str) -> Option<&str>;

    /// All headers as owned pairs, in order
    fn header_pairs(&self) -> Vec<(String, String)> {
        (0..self.header_count())
            .filter_map(|i| {
                let name = self.header_name(i)?;
                let value = self.header_value(i)?;
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }
}

/// Read-only view of an outgoing request
pub trait InspectorRequest: InspectorHeaders {
    fn id(&self) -> &str;

    /// Short label for UIs
    fn friendly_name(&self) -> Option<&str> {
        None
    }

    fn url(&self) -> &str;

    fn method(&self) -> &str;

    /// Body bytes as they will be displayed, captured through the request
    /// body helper. `None` when the request has no body.
    fn body(&self) -> io::Result<Option<Vec<u8>>>;
}

/// Read-only view of received response headers
pub trait InspectorResponse: InspectorHeaders {
    fn request_id(&self) -> &str;

    fn url(&self) -> &str;

    fn status_code(&self) -> u16;

    fn reason_phrase(&self) -> &str;

    /// Always `false` unless the client exposes a real reuse signal
    fn connection_reused(&self) -> bool;

    /// Correlation hint, valid within this process only
    fn connection_id(&self) -> u64;

    fn from_disk_cache(&self) -> bool;
}

/// What the sink did with a response body stream
pub enum StreamInterpretation {
    /// No substitution: the original stream goes back into the response
    Unchanged(BodySource),
    /// Read the body through this stream instead. It owns the original
    /// stream, so closing it closes the original.
    Intercepted(BodySource),
}

/// Sink for exchange telemetry
///
/// Every method is best-effort and infallible from the caller's point of
/// view: a sink that fails must swallow its own errors. Implementations are
/// shared across concurrent exchanges and must be thread-safe.
pub trait NetworkEventReporter: Send + Sync {
    /// Checked once per exchange; when `false` the sink receives no other call
    fn is_enabled(&self) -> bool;

    fn next_request_id(&self) -> String;

    fn request_will_be_sent(&self, request: &dyn InspectorRequest);

    fn response_headers_received(&self, response: &dyn InspectorResponse);

    fn http_exchange_failed(&self, request_id: &str, error: &str);

    /// Offered the raw response stream once headers are reported. Only
    /// called when the response has a body.
    fn interpret_response_stream(
        &self,
        request_id: &str,
        content_type: Option<&str>,
        content_encoding: Option<&str>,
        stream: BodySource,
        handler: Arc<dyn ResponseHandler>,
    ) -> StreamInterpretation {
        let _ = (request_id, content_type, content_encoding, handler);
        StreamInterpretation::Unchanged(stream)
    }

    fn response_read_failed(&self, request_id: &str, error: &str) {
        let _ = (request_id, error);
    }

    fn response_read_finished(&self, request_id: &str) {
        let _ = request_id;
    }

    /// Sent instead of a stream offer when the response carries no body
    /// (HEAD, 204, 304). Ends the exchange.
    fn response_finished_without_body(&self, request_id: &str) {
        let _ = request_id;
    }

    fn data_sent(&self, request_id: &str, data_length: usize, encoded_length: usize) {
        let _ = (request_id, data_length, encoded_length);
    }

    fn data_received(&self, request_id: &str, data_length: usize, encoded_length: usize) {
        let _ = (request_id, data_length, encoded_length);
    }
}
