// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer
//!
//! Provides a reqwest-backed client whose calls run through an interceptor
//! pipeline, with streaming response bodies.

mod body;
mod chain;
mod client;
mod connection;
mod request;
mod response;
mod transport;

pub use body::{BodySource, ResponseBody, StreamingBody};
pub use chain::{Chain, Interceptor, RequestLogger, SharedInterceptor, Stage};
pub use client::{HttpClient, HttpClientConfig, RequestBuilder};
pub use connection::{Connection, Route};
pub use request::Request;
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("netscope/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_ENCODING: &str = "accept-encoding";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const LOCATION: &str = "location";
}
