// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory event store that records exchanges reported by the inspector

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use super::event::{
    CapturedBody, ExchangeState, NetworkEvent, RequestInfo, ResponseInfo, TransferSize,
};
use super::reporter::{
    InspectorRequest, InspectorResponse, NetworkEventReporter, StreamInterpretation,
};
use super::response_handler::{ResponseHandler, ResponseHandlingStream};
use crate::http::headers::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::http::BodySource;

/// Recorder callback type
pub type EventCallback = Arc<dyn Fn(&NetworkEvent) + Send + Sync>;

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Report exchanges at all
    pub enabled: bool,
    /// Prefix for generated request ids
    pub id_prefix: String,
    /// Maximum events to store; the oldest is evicted first
    pub max_events: usize,
    /// Capture request and response bodies
    pub capture_bodies: bool,
    /// Maximum body size to capture
    pub max_body_size: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            id_prefix: "req_".to_string(),
            max_events: 1000,
            capture_bodies: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Decoded response bytes, capped at the capture limit
#[derive(Debug, Default)]
struct CaptureBuffer {
    data: Vec<u8>,
    limit: usize,
    truncated: bool,
}

/// Write end handed to the response handling stream
struct BodyCapture(Arc<Mutex<CaptureBuffer>>);

impl Write for BodyCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut capture = self.0.lock();
        let room = capture.limit.saturating_sub(capture.data.len());
        if buf.len() > room {
            capture.truncated = true;
        }
        let take = buf.len().min(room);
        capture.data.extend_from_slice(&buf[..take]);
        // Accept everything so decoded counts stay accurate past the limit
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct InFlight {
    started: Instant,
    capture: Option<Arc<Mutex<CaptureBuffer>>>,
}

/// Reporter that keeps recent exchanges in memory
///
/// Share it with an [`InspectorInterceptor`](super::InspectorInterceptor)
/// through an `Arc` and query it afterwards.
pub struct NetworkRecorder {
    config: RecorderConfig,
    enabled: AtomicBool,
    counter: AtomicU64,
    events: RwLock<VecDeque<NetworkEvent>>,
    in_flight: DashMap<String, InFlight>,
    on_request: Option<EventCallback>,
    on_response: Option<EventCallback>,
}

impl NetworkRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            counter: AtomicU64::new(0),
            events: RwLock::new(VecDeque::new()),
            in_flight: DashMap::new(),
            on_request: None,
            on_response: None,
            config,
        }
    }

    /// Called after a request is announced
    pub fn on_request(mut self, callback: EventCallback) -> Self {
        self.on_request = Some(callback);
        self
    }

    /// Called once response headers arrive or the exchange fails
    pub fn on_response(mut self, callback: EventCallback) -> Self {
        self.on_response = Some(callback);
        self
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Toggle reporting; exchanges already in flight keep reporting
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Get all captured events
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Get one event by request id
    pub fn event(&self, id: &str) -> Option<NetworkEvent> {
        self.events.read().iter().find(|e| e.id == id).cloned()
    }

    /// Get failed requests
    pub fn failed_requests(&self) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| {
                e.state == ExchangeState::Failed || (e.response.is_some() && !e.is_success())
            })
            .cloned()
            .collect()
    }

    /// Get requests to a specific domain
    pub fn requests_to_domain(&self, domain: &str) -> Vec<NetworkEvent> {
        let domain_lower = domain.to_lowercase();
        self.events
            .read()
            .iter()
            .filter(|e| {
                url::Url::parse(&e.request.url)
                    .ok()
                    .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
                    .map(|host| {
                        host == domain_lower || host.ends_with(&format!(".{}", domain_lower))
                    })
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Get unique URLs
    pub fn unique_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .events
            .read()
            .iter()
            .map(|e| e.request.url.clone())
            .collect();
        urls.sort();
        urls.dedup();
        urls
    }

    /// Clear all events
    pub fn clear(&self) {
        self.events.write().clear();
        self.in_flight.clear();
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Export events as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events())
    }

    /// Store an event (with max limit)
    fn store_event(&self, event: NetworkEvent) {
        let mut events = self.events.write();
        while events.len() >= self.config.max_events.max(1) {
            if let Some(evicted) = events.pop_front() {
                self.in_flight.remove(&evicted.id);
            }
        }
        events.push_back(event);
    }

    /// Apply `update` to a stored event. Evicted events are ignored.
    fn update<F>(&self, request_id: &str, update: F) -> Option<NetworkEvent>
    where
        F: FnOnce(&mut NetworkEvent),
    {
        let mut events = self.events.write();
        let event = events.iter_mut().rev().find(|e| e.id == request_id)?;
        update(event);
        Some(event.clone())
    }

    fn elapsed(&self, request_id: &str) -> Option<std::time::Duration> {
        self.in_flight.get(request_id).map(|f| f.started.elapsed())
    }

    fn capture_body(
        &self,
        body: io::Result<Option<Vec<u8>>>,
        request_id: &str,
    ) -> Option<CapturedBody> {
        match body {
            Ok(body) => body.map(|b| CapturedBody::new(&b, self.config.max_body_size)),
            Err(e) => {
                tracing::warn!(request_id, error = %e, "Could not capture request body");
                None
            }
        }
    }
}

impl Default for NetworkRecorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl NetworkEventReporter for NetworkRecorder {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn next_request_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.config.id_prefix, n)
    }

    fn request_will_be_sent(&self, request: &dyn InspectorRequest) {
        let mut info = RequestInfo::new(request.url(), request.method());
        info.headers = request.header_pairs();
        info.content_type = request.first_header_value(CONTENT_TYPE).map(String::from);
        info.friendly_name = request.friendly_name().map(String::from);
        if self.config.capture_bodies {
            info.body = self.capture_body(request.body(), request.id());
        }

        let event = NetworkEvent::new(request.id(), info);
        if let Some(ref callback) = self.on_request {
            callback(&event);
        }

        self.in_flight.insert(
            event.id.clone(),
            InFlight {
                started: Instant::now(),
                capture: None,
            },
        );
        self.store_event(event);
    }

    fn response_headers_received(&self, response: &dyn InspectorResponse) {
        let mut info = ResponseInfo::new(response.status_code(), response.reason_phrase());
        info.headers = response.header_pairs();
        info.content_type = response.first_header_value(CONTENT_TYPE).map(String::from);
        info.content_length = response
            .first_header_value(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok());
        info.connection_id = response.connection_id();
        info.connection_reused = response.connection_reused();
        info.from_cache = response.from_disk_cache();

        let elapsed = self.elapsed(response.request_id());
        let event = self.update(response.request_id(), |event| {
            event.response = Some(info);
            event.state = ExchangeState::Responded;
            event.duration = elapsed;
        });

        if let (Some(event), Some(callback)) = (event, self.on_response.as_ref()) {
            callback(&event);
        }
    }

    fn http_exchange_failed(&self, request_id: &str, error: &str) {
        let elapsed = self.in_flight.remove(request_id).map(|(_, f)| f.started.elapsed());
        let event = self.update(request_id, |event| {
            event.error = Some(error.to_string());
            event.state = ExchangeState::Failed;
            event.duration = elapsed;
        });
        tracing::debug!(request_id, error, "Recorded failed exchange");

        if let (Some(event), Some(callback)) = (event, self.on_response.as_ref()) {
            callback(&event);
        }
    }

    fn interpret_response_stream(
        &self,
        request_id: &str,
        _content_type: Option<&str>,
        content_encoding: Option<&str>,
        stream: BodySource,
        handler: Arc<dyn ResponseHandler>,
    ) -> StreamInterpretation {
        let Some(mut in_flight) = self.in_flight.get_mut(request_id) else {
            return StreamInterpretation::Unchanged(stream);
        };

        let stream = ResponseHandlingStream::new(stream, handler);
        if !self.config.capture_bodies {
            return StreamInterpretation::Intercepted(BodySource::new(stream));
        }

        let capture = Arc::new(Mutex::new(CaptureBuffer {
            limit: self.config.max_body_size,
            ..CaptureBuffer::default()
        }));
        in_flight.capture = Some(capture.clone());

        StreamInterpretation::Intercepted(BodySource::new(
            stream.with_decoded_output(content_encoding, BodyCapture(capture)),
        ))
    }

    fn response_read_failed(&self, request_id: &str, error: &str) {
        self.in_flight.remove(request_id);
        self.update(request_id, |event| {
            event.error = Some(format!("Response read failed: {}", error));
            event.state = ExchangeState::Failed;
        });
    }

    fn response_read_finished(&self, request_id: &str) {
        let body = self
            .in_flight
            .remove(request_id)
            .and_then(|(_, f)| f.capture)
            .map(|capture| {
                let capture = capture.lock();
                let mut body = CapturedBody::new(&capture.data, capture.limit);
                body.truncated |= capture.truncated;
                body
            });

        self.update(request_id, |event| {
            if let Some(response) = event.response.as_mut() {
                response.body = body;
            }
            event.state = ExchangeState::Finished;
        });
    }

    fn response_finished_without_body(&self, request_id: &str) {
        self.in_flight.remove(request_id);
        self.update(request_id, |event| {
            event.data_received = Some(TransferSize {
                decoded: 0,
                encoded: 0,
            });
            event.state = ExchangeState::Finished;
        });
    }

    fn data_sent(&self, request_id: &str, data_length: usize, encoded_length: usize) {
        self.update(request_id, |event| {
            event.data_sent = Some(TransferSize {
                decoded: data_length,
                encoded: encoded_length,
            });
        });
    }

    fn data_received(&self, request_id: &str, data_length: usize, encoded_length: usize) {
        self.update(request_id, |event| {
            event.data_received = Some(TransferSize {
                decoded: data_length,
                encoded: encoded_length,
            });
        });
    }
}
