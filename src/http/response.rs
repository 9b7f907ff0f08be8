// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::body::{ResponseBody, StreamingBody};
use super::headers::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use crate::error::{Error, Result};

/// HTTP response representation
///
/// The body streams: it is read at most once, through whatever
/// [`ResponseBody`] the pipeline left in place.
#[derive(Debug)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body, `None` when the response carries none
    pub body: Option<Box<dyn ResponseBody>>,
    /// Final URL (after redirects)
    pub url: Url,
    /// Whether this was a redirect
    pub redirected: bool,
    /// Whether the response was served from a cache
    pub from_cache: bool,
    /// Time to response headers in milliseconds
    pub response_time_ms: u64,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url) -> Self {
        Self {
            status,
            headers,
            body: None,
            url,
            redirected: false,
            from_cache: false,
            response_time_ms: 0,
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl ResponseBody + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Attach an in-memory body, typed from the content-type header
    pub fn with_bytes(self, bytes: impl Into<Bytes>) -> Self {
        let content_type = self.content_type().map(String::from);
        self.with_body(StreamingBody::from_bytes(content_type.as_deref(), bytes))
    }

    /// Mark as served from cache
    pub fn from_cache(mut self, from_cache: bool) -> Self {
        self.from_cache = from_cache;
        self
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Reason phrase for the status code
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Detach the body, leaving the response body-less
    pub fn take_body(&mut self) -> Option<Box<dyn ResponseBody>> {
        self.body.take()
    }

    /// Read the whole body
    pub async fn bytes(mut self) -> Result<Bytes> {
        match self.body.take() {
            Some(body) => {
                let mut source = body.into_source();
                let bytes = source.bytes().await?;
                source.close();
                Ok(bytes)
            }
            None => Ok(Bytes::new()),
        }
    }

    /// Get body as text
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Parse body as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    /// Get content encoding
    pub fn content_encoding(&self) -> Option<&str> {
        self.header(CONTENT_ENCODING)
    }

    /// Get declared content length
    pub fn content_length(&self) -> Option<u64> {
        self.header(CONTENT_LENGTH).and_then(|v| v.parse().ok())
    }

    /// Get the final URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}
