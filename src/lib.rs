// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Netscope - HTTP Network Inspection
//!
//! An interceptor for a reqwest-backed HTTP client that reports every
//! exchange to a pluggable event reporter, for debugging tools and traffic
//! analysis.
//!
//! ## Features
//!
//! - Interceptor pipeline: application and network stages, connection aware
//! - Request metadata and body capture before the request is sent
//! - Response metadata with connection identity
//! - Response body interposition: reporters can tee the body while the
//!   caller reads it, without changing a single byte
//! - Transfer sizes before and after gzip/deflate decoding
//! - In-memory recorder with bounded storage and JSON export
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netscope::{HttpClient, InspectorInterceptor, NetworkRecorder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let recorder = Arc::new(NetworkRecorder::default());
//!     let client = HttpClient::new()?
//!         .network_interceptor(InspectorInterceptor::new(recorder.clone()));
//!
//!     let response = client.get("https://example.com").await?;
//!     let body = response.text().await?;
//!     println!("{} bytes", body.len());
//!
//!     for event in recorder.events() {
//!         println!("{} {} {:?}", event.request.method, event.request.url, event.state);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod network;

// Re-exports for convenience

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{
    BodySource, Chain, Connection, HttpClient, HttpClientConfig, Interceptor, Request,
    RequestLogger, Response, ResponseBody, Stage,
};

// Network
pub use network::{
    ForwardingResponseBody, InspectorInterceptor, NetworkEventReporter, RequestBodyHelper,
    StreamInterpretation,
};
pub use network::{DefaultResponseHandler, ResponseHandler, ResponseHandlingStream};
pub use network::{ExchangeState, NetworkEvent, NetworkRecorder, RecorderConfig};

/// Netscope version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
