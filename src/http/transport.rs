// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport: the last stage of the pipeline, which puts requests on the wire

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};

use super::body::{BodySource, StreamingBody};
use super::request::Request;
use super::response::Response;
use crate::error::Result;

/// Sends a request and returns the response with a streaming body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let has_body = response_may_have_body(&request.method);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let content_length = response.content_length();

        let mut converted = Response::new(status, headers, final_url);
        converted.redirected = converted.url != request.url;
        converted.response_time_ms = response_time_ms;

        if has_body && status_may_have_body(status) {
            let content_type = converted.content_type().map(String::from);
            let source = BodySource::from_stream(response.bytes_stream());
            converted.body = Some(Box::new(StreamingBody::new(
                content_type,
                content_length,
                source,
            )));
        }

        tracing::trace!(
            url = %converted.url,
            status = %status,
            time_ms = response_time_ms,
            "Transport response"
        );

        Ok(converted)
    }
}

fn response_may_have_body(method: &Method) -> bool {
    *method != Method::HEAD
}

fn status_may_have_body(status: StatusCode) -> bool {
    !(status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED)
}
