// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor pipeline
//!
//! Every call runs through two stages. Application interceptors run first,
//! once per call, with no connection. Network interceptors run next to the
//! transport and see the [`Connection`] the request goes out on.
//!
//! # Example
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use netscope::http::{Chain, Interceptor, Response};
//! use netscope::Result;
//!
//! struct UserAgent(&'static str);
//!
//! #[async_trait]
//! impl Interceptor for UserAgent {
//!     async fn intercept(&self, chain: Chain<'_>) -> Result<Response> {
//!         let request = chain.request().clone().header("user-agent", self.0);
//!         chain.proceed(request).await
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::client::HttpClient;
use super::connection::Connection;
use super::request::Request;
use super::response::Response;
use crate::error::Result;

/// Interceptor in the request/response pipeline
///
/// Implementations observe or rewrite the request, call
/// [`Chain::proceed`] exactly once (or short-circuit), and return the
/// response.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Handle one exchange
    async fn intercept(&self, chain: Chain<'_>) -> Result<Response>;
}

/// Pipeline stage a chain is positioned in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before the connection is chosen
    Application,
    /// Next to the transport
    Network,
}

/// The rest of the pipeline, as seen by one interceptor
pub struct Chain<'a> {
    client: &'a HttpClient,
    request: Request,
    stage: Stage,
    index: usize,
    connection: Option<Connection>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(client: &'a HttpClient, request: Request) -> Self {
        Self {
            client,
            request,
            stage: Stage::Application,
            index: 0,
            connection: None,
        }
    }

    /// Request as it reached this interceptor
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Connection the request will go out on; `None` for application
    /// interceptors
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Stage this chain is positioned in
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the rest of the pipeline with `request`
    pub async fn proceed(self, request: Request) -> Result<Response> {
        let Chain {
            client,
            mut stage,
            mut index,
            mut connection,
            ..
        } = self;

        if stage == Stage::Application && index >= client.interceptors().len() {
            stage = Stage::Network;
            index = 0;
            connection = Some(Connection::for_url(&request.url));
        }

        let interceptors = match stage {
            Stage::Application => client.interceptors(),
            Stage::Network => client.network_interceptors(),
        };

        match interceptors.get(index).cloned() {
            Some(interceptor) => {
                let next = Chain {
                    client,
                    request,
                    stage,
                    index: index + 1,
                    connection,
                };
                interceptor.intercept(next).await
            }
            None => client.transport().send(request).await,
        }
    }
}

/// Logs every exchange through `tracing`
///
/// Registered as a network interceptor it also logs the connection id.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    /// Filter by URL substring
    pub url_filter: Option<String>,
}

impl RequestLogger {
    /// Log only URLs containing `filter`
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            url_filter: Some(filter.into()),
        }
    }

    fn should_log(&self, request: &Request) -> bool {
        match self.url_filter {
            Some(ref filter) => request.url.as_str().contains(filter),
            None => true,
        }
    }
}

#[async_trait]
impl Interceptor for RequestLogger {
    async fn intercept(&self, chain: Chain<'_>) -> Result<Response> {
        let request = chain.request().clone();
        if !self.should_log(&request) {
            return chain.proceed(request).await;
        }

        let connection_id = chain.connection().map(Connection::id);
        let method = request.method.clone();
        let url = request.url.clone();
        let start = Instant::now();

        tracing::info!(%method, %url, ?connection_id, "Request");

        match chain.proceed(request).await {
            Ok(response) => {
                tracing::info!(
                    %url,
                    status = %response.status,
                    time_ms = start.elapsed().as_millis() as u64,
                    "Response"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Request failed");
                Err(e)
            }
        }
    }
}

/// Shared interceptor handle
pub type SharedInterceptor = Arc<dyn Interceptor>;
