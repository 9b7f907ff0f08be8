// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event types

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::http::headers::LOCATION;

/// One recorded HTTP exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    /// Request id handed out by the recorder
    pub id: String,
    /// When the request was announced
    pub timestamp: SystemTime,
    /// Where the exchange is in its lifecycle
    pub state: ExchangeState,
    /// Request information
    pub request: RequestInfo,
    /// Response information (if available)
    pub response: Option<ResponseInfo>,
    /// Time until response headers or failure
    pub duration: Option<Duration>,
    /// Error message if failed
    pub error: Option<String>,
    /// Request body size
    pub data_sent: Option<TransferSize>,
    /// Response body size, known once the body has been read
    pub data_received: Option<TransferSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeState {
    /// Request announced, nothing heard back yet
    Pending,
    /// Headers received, body not finished
    Responded,
    /// Body read to the end
    Finished,
    /// Transport failure or body read failure
    Failed,
}

/// Byte counts for a body, before and after content decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSize {
    pub decoded: usize,
    pub encoded: usize,
}

/// Request information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Request headers grouped by name, duplicates kept
    pub headers: Vec<(String, String)>,
    /// Request body, decoded for display
    pub body: Option<CapturedBody>,
    /// Content type
    pub content_type: Option<String>,
    /// Display name supplied by the request view
    pub friendly_name: Option<String>,
}

/// Response information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers grouped by name, duplicates kept
    pub headers: Vec<(String, String)>,
    /// Response body (may be truncated)
    pub body: Option<CapturedBody>,
    /// Content type
    pub content_type: Option<String>,
    /// Content length header
    pub content_length: Option<u64>,
    /// Identifier of the connection that carried the exchange
    pub connection_id: u64,
    /// Whether the connection had carried an earlier exchange
    pub connection_reused: bool,
    /// Whether response was from cache
    pub from_cache: bool,
}

/// Body bytes kept for display
///
/// UTF-8 bodies are stored as text, anything else as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedBody {
    pub text: String,
    pub base64_encoded: bool,
    /// Whether bytes past the capture limit were dropped
    pub truncated: bool,
}

impl NetworkEvent {
    /// Create a new pending event
    pub fn new(id: impl Into<String>, request: RequestInfo) -> Self {
        Self {
            id: id.into(),
            timestamp: SystemTime::now(),
            state: ExchangeState::Pending,
            request,
            response: None,
            duration: None,
            error: None,
            data_sent: None,
            data_received: None,
        }
    }

    /// Set response
    pub fn with_response(mut self, response: ResponseInfo) -> Self {
        self.response = Some(response);
        self.state = ExchangeState::Responded;
        self
    }

    /// Set error
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.state = ExchangeState::Failed;
        self
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ExchangeState::Finished | ExchangeState::Failed)
    }

    /// Check if response was successful
    pub fn is_success(&self) -> bool {
        self.response
            .as_ref()
            .map(|r| r.status >= 200 && r.status < 300)
            .unwrap_or(false)
    }

    /// Check if response is HTML
    pub fn is_html(&self) -> bool {
        self.response
            .as_ref()
            .and_then(|r| r.content_type.as_ref())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }

    /// Check if response is JSON
    pub fn is_json(&self) -> bool {
        self.response
            .as_ref()
            .and_then(|r| r.content_type.as_ref())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }

    /// Get response body if JSON
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        self.response
            .as_ref()
            .and_then(|r| r.body.as_ref())
            .filter(|body| !body.base64_encoded && !body.truncated)
            .and_then(|body| serde_json::from_str(&body.text).ok())
    }
}

impl RequestInfo {
    /// Create a new request info
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            headers: Vec::new(),
            body: None,
            content_type: None,
            friendly_name: None,
        }
    }

    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    /// Get URL parameters
    pub fn url_params(&self) -> HashMap<String, String> {
        if let Ok(url) = url::Url::parse(&self.url) {
            url.query_pairs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        } else {
            HashMap::new()
        }
    }
}

impl ResponseInfo {
    /// Create a new response info
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: None,
            content_type: None,
            content_length: None,
            connection_id: 0,
            connection_reused: false,
            from_cache: false,
        }
    }

    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    /// Check if redirect
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Get redirect location
    pub fn redirect_location(&self) -> Option<&str> {
        self.header(LOCATION)
    }
}

impl CapturedBody {
    /// Keep at most `max_size` bytes of `bytes`
    pub fn new(bytes: &[u8], max_size: usize) -> Self {
        let truncated = bytes.len() > max_size;
        let kept = &bytes[..bytes.len().min(max_size)];

        match std::str::from_utf8(kept) {
            Ok(text) => Self::text(text, truncated),
            // Cut in the middle of a character by the limit
            Err(e) if truncated && e.error_len().is_none() => {
                Self::text(&String::from_utf8_lossy(&kept[..e.valid_up_to()]), truncated)
            }
            Err(_) => Self {
                text: STANDARD.encode(kept),
                base64_encoded: true,
                truncated,
            },
        }
    }

    fn text(text: &str, truncated: bool) -> Self {
        Self {
            text: text.to_string(),
            base64_encoded: false,
            truncated,
        }
    }

    /// Captured bytes
    pub fn bytes(&self) -> Vec<u8> {
        if self.base64_encoded {
            STANDARD.decode(&self.text).unwrap_or_default()
        } else {
            self.text.as_bytes().to_vec()
        }
    }
}

fn first_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
