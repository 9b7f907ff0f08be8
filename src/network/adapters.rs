// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Inspector views over this crate's `Request`/`Response`

use std::io::{self, Write};

use reqwest::header::HeaderMap;

use super::body_helper::RequestBodyHelper;
use super::reporter::{InspectorHeaders, InspectorRequest, InspectorResponse};
use crate::http::headers::CONTENT_ENCODING;
use crate::http::{Connection, Request, Response};

/// Snapshot of a header map. Values are grouped by name in first-seen
/// name order, duplicates kept.
#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn from_map(headers: &HeaderMap) -> Self {
        Self {
            entries: headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        }
    }
}

impl InspectorHeaders for HeaderList {
    fn header_count(&self) -> usize {
        self.entries.len()
    }

    fn header_name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    fn header_value(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(_, value)| value.as_str())
    }

    fn first_header_value(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Request view handed to `request_will_be_sent`
pub struct ClientInspectorRequest<'a> {
    request_id: &'a str,
    request: &'a Request,
    headers: HeaderList,
    body_helper: &'a RequestBodyHelper,
}

impl<'a> ClientInspectorRequest<'a> {
    pub fn new(
        request_id: &'a str,
        request: &'a Request,
        body_helper: &'a RequestBodyHelper,
    ) -> Self {
        Self {
            request_id,
            request,
            headers: HeaderList::from_map(&request.headers),
            body_helper,
        }
    }
}

impl InspectorHeaders for ClientInspectorRequest<'_> {
    fn header_count(&self) -> usize {
        self.headers.header_count()
    }

    fn header_name(&self, index: usize) -> Option<&str> {
        self.headers.header_name(index)
    }

    fn header_value(&self, index: usize) -> Option<&str> {
        self.headers.header_value(index)
    }

    fn first_header_value(&self, name: &str) -> Option<&str> {
        self.headers.first_header_value(name)
    }
}

impl InspectorRequest for ClientInspectorRequest<'_> {
    fn id(&self) -> &str {
        self.request_id
    }

    fn url(&self) -> &str {
        self.request.url.as_str()
    }

    fn method(&self) -> &str {
        self.request.method.as_str()
    }

    fn body(&self) -> io::Result<Option<Vec<u8>>> {
        let Some(body) = self.request.body.as_ref() else {
            return Ok(None);
        };

        // The body is an immutable buffer; writing a copy leaves the one the
        // transport sends untouched.
        let mut sink = self
            .body_helper
            .create_body_sink(self.first_header_value(CONTENT_ENCODING))?;
        sink.write_all(body)?;
        sink.close()?;

        self.body_helper.display_body().map(Some)
    }
}

/// Response view handed to `response_headers_received`
pub struct ClientInspectorResponse<'a> {
    request_id: &'a str,
    request: &'a Request,
    response: &'a Response,
    connection: &'a Connection,
    headers: HeaderList,
}

impl<'a> ClientInspectorResponse<'a> {
    pub fn new(
        request_id: &'a str,
        request: &'a Request,
        response: &'a Response,
        connection: &'a Connection,
    ) -> Self {
        Self {
            request_id,
            request,
            response,
            connection,
            headers: HeaderList::from_map(&response.headers),
        }
    }
}

impl InspectorHeaders for ClientInspectorResponse<'_> {
    fn header_count(&self) -> usize {
        self.headers.header_count()
    }

    fn header_name(&self, index: usize) -> Option<&str> {
        self.headers.header_name(index)
    }

    fn header_value(&self, index: usize) -> Option<&str> {
        self.headers.header_value(index)
    }

    fn first_header_value(&self, name: &str) -> Option<&str> {
        self.headers.first_header_value(name)
    }
}

impl InspectorResponse for ClientInspectorResponse<'_> {
    fn request_id(&self) -> &str {
        self.request_id
    }

    fn url(&self) -> &str {
        self.request.url.as_str()
    }

    fn status_code(&self) -> u16 {
        self.response.status_code()
    }

    fn reason_phrase(&self) -> &str {
        self.response.status_text()
    }

    fn connection_reused(&self) -> bool {
        self.connection.reused()
    }

    fn connection_id(&self) -> u64 {
        self.connection.id()
    }

    fn from_disk_cache(&self) -> bool {
        self.response.from_cache
    }
}
