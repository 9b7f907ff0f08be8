// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network interceptor that reports exchanges to an event reporter
//!
//! Register it as a network interceptor so it sees the connection:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netscope::{HttpClient, InspectorInterceptor, NetworkRecorder};
//!
//! # fn main() -> netscope::Result<()> {
//! let recorder = Arc::new(NetworkRecorder::default());
//! let client = HttpClient::new()?
//!     .network_interceptor(InspectorInterceptor::new(recorder.clone()));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use super::adapters::{ClientInspectorRequest, ClientInspectorResponse};
use super::body_helper::RequestBodyHelper;
use super::forwarding::ForwardingResponseBody;
use super::reporter::{NetworkEventReporter, StreamInterpretation};
use super::response_handler::DefaultResponseHandler;
use crate::error::{Error, Result};
use crate::http::{Chain, Interceptor, Response};

/// Forwards request/response metadata and body streams to a reporter
///
/// When the reporter is disabled the interceptor only calls
/// [`Chain::proceed`] and returns its result untouched.
#[derive(Clone)]
pub struct InspectorInterceptor {
    reporter: Arc<dyn NetworkEventReporter>,
}

impl InspectorInterceptor {
    pub fn new(reporter: Arc<dyn NetworkEventReporter>) -> Self {
        Self { reporter }
    }

    /// Offer the response body to the reporter and install whatever stream
    /// it hands back
    fn interpose_body(&self, request_id: &str, response: &mut Response) {
        let Some(mut body) = response.body.take() else {
            self.reporter.response_finished_without_body(request_id);
            return;
        };

        let content_type = body.content_type().map(String::from);
        let content_encoding = response.content_encoding().map(String::from);
        let raw = std::mem::take(body.source());
        let handler = Arc::new(DefaultResponseHandler::new(
            self.reporter.clone(),
            request_id,
        ));

        let interpretation = self.reporter.interpret_response_stream(
            request_id,
            content_type.as_deref(),
            content_encoding.as_deref(),
            raw,
            handler,
        );

        response.body = Some(match interpretation {
            StreamInterpretation::Unchanged(raw) => {
                *body.source() = raw;
                body
            }
            StreamInterpretation::Intercepted(stream) => {
                tracing::trace!(request_id, "Response body interposed");
                Box::new(ForwardingResponseBody::new(body, stream))
            }
        });
    }
}

#[async_trait]
impl Interceptor for InspectorInterceptor {
    async fn intercept(&self, chain: Chain<'_>) -> Result<Response> {
        let request = chain.request().clone();

        if !self.reporter.is_enabled() {
            return chain.proceed(request).await;
        }

        let request_id = self.reporter.next_request_id();
        let connection = chain.connection().cloned();

        let body_helper = RequestBodyHelper::new(self.reporter.clone(), request_id.as_str());
        self.reporter
            .request_will_be_sent(&ClientInspectorRequest::new(&request_id, &request, &body_helper));
        tracing::debug!(
            request_id = %request_id,
            method = %request.method,
            url = %request.url,
            "Request will be sent"
        );

        let mut response = match chain.proceed(request.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(request_id = %request_id, error = %e, "Exchange failed");
                self.reporter.http_exchange_failed(&request_id, &e.to_string());
                return Err(e);
            }
        };

        if body_helper.has_body() {
            body_helper.report_data_sent();
        }

        let Some(connection) = connection else {
            tracing::error!(
                request_id = %request_id,
                "Inspector registered as an application interceptor"
            );
            return Err(Error::MissingConnection);
        };

        self.reporter.response_headers_received(&ClientInspectorResponse::new(
            &request_id,
            &request,
            &response,
            &connection,
        ));
        tracing::debug!(
            request_id = %request_id,
            status = %response.status,
            connection_id = connection.id(),
            "Response headers received"
        );

        self.interpose_body(&request_id, &mut response);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{
        BodySource, HttpClient, HttpClientConfig, Request, ResponseBody, StreamingBody, Transport,
    };
    use crate::network::reporter::{InspectorRequest, InspectorResponse};
    use crate::network::response_handler::{ResponseHandler, ResponseHandlingStream};
    use parking_lot::Mutex;
    use reqwest::header::{HeaderMap, HeaderValue};
    use reqwest::StatusCode;
    use std::io::{self, Write};
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        IsEnabled,
        NextRequestId,
        RequestWillBeSent {
            id: String,
            method: String,
            url: String,
            body: Option<Vec<u8>>,
        },
        ResponseHeadersReceived {
            id: String,
            status: u16,
        },
        HttpExchangeFailed {
            id: String,
            error: String,
        },
        InterpretResponseStream {
            id: String,
            content_type: Option<String>,
            content_encoding: Option<String>,
        },
        ReadFinished(String),
        FinishedWithoutBody(String),
        ReadFailed(String),
        DataSent(String, usize, usize),
        DataReceived(String, usize, usize),
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Passthrough,
        Tee,
    }

    struct Recording {
        enabled: bool,
        mode: Mode,
        calls: Mutex<Vec<Call>>,
        teed: Arc<Mutex<Vec<u8>>>,
    }

    impl Recording {
        fn new(enabled: bool, mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                enabled,
                mode,
                calls: Mutex::new(Vec::new()),
                teed: Arc::new(Mutex::new(Vec::new())),
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().push(call);
        }
    }

    struct TeeSink(Arc<Mutex<Vec<u8>>>);

    impl Write for TeeSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl NetworkEventReporter for Recording {
        fn is_enabled(&self) -> bool {
            self.record(Call::IsEnabled);
            self.enabled
        }

        fn next_request_id(&self) -> String {
            self.record(Call::NextRequestId);
            "req-1".to_string()
        }

        fn request_will_be_sent(&self, request: &dyn InspectorRequest) {
            let body = request.body().unwrap();
            self.record(Call::RequestWillBeSent {
                id: request.id().to_string(),
                method: request.method().to_string(),
                url: request.url().to_string(),
                body,
            });
        }

        fn response_headers_received(&self, response: &dyn InspectorResponse) {
            self.record(Call::ResponseHeadersReceived {
                id: response.request_id().to_string(),
                status: response.status_code(),
            });
        }

        fn http_exchange_failed(&self, request_id: &str, error: &str) {
            self.record(Call::HttpExchangeFailed {
                id: request_id.to_string(),
                error: error.to_string(),
            });
        }

        fn interpret_response_stream(
            &self,
            request_id: &str,
            content_type: Option<&str>,
            content_encoding: Option<&str>,
            stream: BodySource,
            handler: Arc<dyn ResponseHandler>,
        ) -> StreamInterpretation {
            self.record(Call::InterpretResponseStream {
                id: request_id.to_string(),
                content_type: content_type.map(String::from),
                content_encoding: content_encoding.map(String::from),
            });
            match self.mode {
                Mode::Passthrough => StreamInterpretation::Unchanged(stream),
                Mode::Tee => StreamInterpretation::Intercepted(BodySource::new(
                    ResponseHandlingStream::new(stream, handler)
                        .with_output(Box::new(TeeSink(self.teed.clone()))),
                )),
            }
        }

        fn response_read_failed(&self, request_id: &str, _error: &str) {
            self.record(Call::ReadFailed(request_id.to_string()));
        }

        fn response_read_finished(&self, request_id: &str) {
            self.record(Call::ReadFinished(request_id.to_string()));
        }

        fn response_finished_without_body(&self, request_id: &str) {
            self.record(Call::FinishedWithoutBody(request_id.to_string()));
        }

        fn data_sent(&self, request_id: &str, data_length: usize, encoded_length: usize) {
            self.record(Call::DataSent(
                request_id.to_string(),
                data_length,
                encoded_length,
            ));
        }

        fn data_received(&self, request_id: &str, data_length: usize, encoded_length: usize) {
            self.record(Call::DataReceived(
                request_id.to_string(),
                data_length,
                encoded_length,
            ));
        }
    }

    /// Origin stream that records when it is released
    struct Origin {
        inner: io::Cursor<Vec<u8>>,
        closed: Arc<AtomicBool>,
    }

    impl AsyncRead for Origin {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl Drop for Origin {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    enum Reply {
        Body(&'static str),
        NoBody,
        Fail,
    }

    struct StubTransport {
        reply: Reply,
        closed: Arc<AtomicBool>,
        sent: AtomicUsize,
    }

    impl StubTransport {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                closed: Arc::new(AtomicBool::new(false)),
                sent: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: Request) -> Result<Response> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            let mut headers = HeaderMap::new();
            headers.insert("content-type", HeaderValue::from_static("text/plain"));
            let response = Response::new(StatusCode::OK, headers, request.url);
            match self.reply {
                Reply::Body(text) => {
                    let origin = Origin {
                        inner: io::Cursor::new(text.as_bytes().to_vec()),
                        closed: self.closed.clone(),
                    };
                    Ok(response.with_body(StreamingBody::new(
                        Some("text/plain".to_string()),
                        Some(text.len() as u64),
                        BodySource::new(origin),
                    )))
                }
                Reply::NoBody => Ok(response),
                Reply::Fail => Err(Error::transport("connection reset by peer")),
            }
        }
    }

    fn client(transport: Arc<StubTransport>, reporter: Arc<Recording>) -> HttpClient {
        HttpClient::with_transport(transport, HttpClientConfig::default())
            .network_interceptor(InspectorInterceptor::new(reporter))
    }

    fn body_ptr(response: &Response) -> usize {
        response
            .body
            .as_ref()
            .map(|b| b.as_ref() as *const dyn ResponseBody as *const () as usize)
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_disabled_reporter_is_passthrough() {
        let reporter = Recording::new(false, Mode::Tee);
        let transport = StubTransport::new(Reply::Body("hello"));

        let mut response = client(transport.clone(), reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap();

        assert_eq!(reporter.calls(), vec![Call::IsEnabled]);
        let body = response.take_body().unwrap();
        assert_eq!(body.content_length(), Some(5));
        let mut source = body.into_source();
        assert_eq!(&source.bytes().await.unwrap()[..], b"hello");
        assert!(reporter.teed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_passthrough_sink() {
        let reporter = Recording::new(true, Mode::Passthrough);
        let transport = StubTransport::new(Reply::Body("hello"));

        let response = client(transport, reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap();

        assert_eq!(
            reporter.calls(),
            vec![
                Call::IsEnabled,
                Call::NextRequestId,
                Call::RequestWillBeSent {
                    id: "req-1".to_string(),
                    method: "GET".to_string(),
                    url: "https://example.com/x".to_string(),
                    body: None,
                },
                Call::ResponseHeadersReceived {
                    id: "req-1".to_string(),
                    status: 200,
                },
                Call::InterpretResponseStream {
                    id: "req-1".to_string(),
                    content_type: Some("text/plain".to_string()),
                    content_encoding: None,
                },
            ]
        );
        assert_eq!(response.text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unchanged_stream_keeps_original_body_object() {
        let reporter = Recording::new(true, Mode::Passthrough);
        let transport = StubTransport::new(Reply::Body("hello"));

        struct BodyWitness {
            ptr: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl Interceptor for BodyWitness {
            async fn intercept(&self, chain: Chain<'_>) -> Result<Response> {
                let request = chain.request().clone();
                let response = chain.proceed(request).await?;
                self.ptr.store(body_ptr(&response), Ordering::SeqCst);
                Ok(response)
            }
        }

        let ptr = Arc::new(AtomicUsize::new(0));
        let client = HttpClient::with_transport(transport, HttpClientConfig::default())
            .network_interceptor(InspectorInterceptor::new(reporter))
            .network_interceptor(BodyWitness { ptr: ptr.clone() });

        let response = client.get("https://example.com/x").await.unwrap();
        assert_ne!(body_ptr(&response), 0);
        assert_eq!(body_ptr(&response), ptr.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_scenario_tee_sink_and_cascading_close() {
        let reporter = Recording::new(true, Mode::Tee);
        let transport = StubTransport::new(Reply::Body("hello"));
        let closed = transport.closed.clone();

        let mut response = client(transport, reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap();

        let mut body = response.take_body().unwrap();
        assert_eq!(body.content_type(), Some("text/plain"));
        assert_eq!(body.content_length(), Some(5));

        let mut out = Vec::new();
        body.source().read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(&reporter.teed.lock()[..], b"hello");
        assert!(!closed.load(Ordering::SeqCst));

        body.close();
        assert!(closed.load(Ordering::SeqCst));

        let calls = reporter.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[
                Call::DataReceived("req-1".to_string(), 5, 5),
                Call::ReadFinished("req-1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_without_reading_reaches_origin() {
        let reporter = Recording::new(true, Mode::Tee);
        let transport = StubTransport::new(Reply::Body("never read"));
        let closed = transport.closed.clone();

        let mut response = client(transport, reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap();

        response.take_body().unwrap().close();
        assert!(closed.load(Ordering::SeqCst));
        assert!(reporter
            .calls()
            .contains(&Call::ReadFailed("req-1".to_string())));
    }

    #[tokio::test]
    async fn test_transport_failure_reported_and_propagated() {
        let reporter = Recording::new(true, Mode::Tee);
        let transport = StubTransport::new(Reply::Fail);

        let err = client(transport, reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(ref msg) if msg == "connection reset by peer"));
        let failures: Vec<_> = reporter
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::HttpExchangeFailed { .. }))
            .collect();
        assert_eq!(
            failures,
            vec![Call::HttpExchangeFailed {
                id: "req-1".to_string(),
                error: "Transport error: connection reset by peer".to_string(),
            }]
        );
        assert!(!reporter
            .calls()
            .iter()
            .any(|c| matches!(c, Call::ResponseHeadersReceived { .. })));
    }

    #[tokio::test]
    async fn test_bodyless_response_is_not_offered() {
        let reporter = Recording::new(true, Mode::Tee);
        let transport = StubTransport::new(Reply::NoBody);

        let response = client(transport, reporter.clone())
            .get("https://example.com/x")
            .await
            .unwrap();

        assert!(response.body.is_none());
        let calls = reporter.calls();
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::InterpretResponseStream { .. })));
        assert_eq!(
            calls.last(),
            Some(&Call::FinishedWithoutBody("req-1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_connection_fails_fast() {
        let reporter = Recording::new(true, Mode::Tee);
        let transport = StubTransport::new(Reply::Body("hello"));

        let client = HttpClient::with_transport(transport.clone(), HttpClientConfig::default())
            .interceptor(InspectorInterceptor::new(reporter.clone()));

        let err = client.get("https://example.com/x").await.unwrap_err();

        assert!(matches!(err, Error::MissingConnection));
        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
        assert!(!reporter.calls().iter().any(|c| matches!(
            c,
            Call::ResponseHeadersReceived { .. } | Call::InterpretResponseStream { .. }
        )));
    }

    #[tokio::test]
    async fn test_request_body_captured_and_reported() {
        let reporter = Recording::new(true, Mode::Passthrough);
        let transport = StubTransport::new(Reply::NoBody);

        client(transport, reporter.clone())
            .post("https://example.com/submit", "payload")
            .await
            .unwrap();

        let calls = reporter.calls();
        assert!(calls.contains(&Call::RequestWillBeSent {
            id: "req-1".to_string(),
            method: "POST".to_string(),
            url: "https://example.com/submit".to_string(),
            body: Some(b"payload".to_vec()),
        }));
        let sent = calls
            .iter()
            .position(|c| *c == Call::DataSent("req-1".to_string(), 7, 7))
            .unwrap();
        let headers = calls
            .iter()
            .position(|c| matches!(c, Call::ResponseHeadersReceived { .. }))
            .unwrap();
        assert!(sent < headers);
    }
}
