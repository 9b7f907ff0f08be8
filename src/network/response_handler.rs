// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Observing response bodies as the caller reads them

use std::io::{self, Write};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, ReadBuf};

use super::decompression::{decoding_writer, ContentEncoding};
use super::reporter::NetworkEventReporter;
use crate::http::BodySource;

/// Callbacks driven by a [`ResponseHandlingStream`]
///
/// `on_eof` and `on_error` are mutually exclusive and fire at most once.
pub trait ResponseHandler: Send + Sync {
    /// Raw bytes relayed to the caller
    fn on_read(&self, num_bytes: usize);

    /// Bytes produced by decoding the raw stream
    fn on_read_decoded(&self, num_bytes: usize);

    fn on_eof(&self);

    fn on_error(&self, error: &io::Error);
}

/// Handler that forwards body progress to a reporter
pub struct DefaultResponseHandler {
    reporter: Arc<dyn NetworkEventReporter>,
    request_id: String,
    bytes_read: AtomicUsize,
    decoded_bytes_read: AtomicUsize,
    saw_decoded: AtomicBool,
}

impl DefaultResponseHandler {
    pub fn new(reporter: Arc<dyn NetworkEventReporter>, request_id: impl Into<String>) -> Self {
        Self {
            reporter,
            request_id: request_id.into(),
            bytes_read: AtomicUsize::new(0),
            decoded_bytes_read: AtomicUsize::new(0),
            saw_decoded: AtomicBool::new(false),
        }
    }

    fn report_data_received(&self) {
        let raw = self.bytes_read.load(Ordering::Acquire);
        let decoded = if self.saw_decoded.load(Ordering::Acquire) {
            self.decoded_bytes_read.load(Ordering::Acquire)
        } else {
            raw
        };
        self.reporter.data_received(&self.request_id, decoded, raw);
    }
}

impl ResponseHandler for DefaultResponseHandler {
    fn on_read(&self, num_bytes: usize) {
        self.bytes_read.fetch_add(num_bytes, Ordering::AcqRel);
    }

    fn on_read_decoded(&self, num_bytes: usize) {
        self.saw_decoded.store(true, Ordering::Release);
        self.decoded_bytes_read.fetch_add(num_bytes, Ordering::AcqRel);
    }

    fn on_eof(&self) {
        self.report_data_received();
        self.reporter.response_read_finished(&self.request_id);
    }

    fn on_error(&self, error: &io::Error) {
        self.report_data_received();
        self.reporter
            .response_read_failed(&self.request_id, &error.to_string());
    }
}

/// Counts decoded bytes on their way into a capture sink
struct CountingWriter<W> {
    inner: W,
    handler: Arc<dyn ResponseHandler>,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.handler.on_read_decoded(written);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Reading,
    Finished,
    Failed,
}

pin_project! {
    /// Tee over a response body stream
    ///
    /// Relays every byte from the wrapped source unchanged, reports progress
    /// to a [`ResponseHandler`], and optionally copies bytes into a capture
    /// sink. Capture failures are logged and stop the capture; they never
    /// reach the reader. Dropping the stream drops the wrapped source.
    pub struct ResponseHandlingStream {
        #[pin]
        source: BodySource,
        handler: Arc<dyn ResponseHandler>,
        output: Option<Box<dyn Write + Send>>,
        state: ReadState,
    }

    impl PinnedDrop for ResponseHandlingStream {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if *this.state == ReadState::Reading {
                *this.output = None;
                *this.state = ReadState::Failed;
                this.handler.on_error(&io::Error::new(
                    io::ErrorKind::Interrupted,
                    "response body closed before end of stream",
                ));
            }
        }
    }
}

impl ResponseHandlingStream {
    pub fn new(source: BodySource, handler: Arc<dyn ResponseHandler>) -> Self {
        Self {
            source,
            handler,
            output: None,
            state: ReadState::Reading,
        }
    }

    /// Copy raw bytes into `output`
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    /// Decode bytes per `content_encoding` into `output`, reporting decoded
    /// counts to the handler
    pub fn with_decoded_output<W>(self, content_encoding: Option<&str>, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let counting = CountingWriter {
            inner: output,
            handler: self.handler.clone(),
        };
        let encoding = ContentEncoding::from_header(content_encoding);
        self.with_output(decoding_writer(encoding, counting))
    }
}

fn finish_output(output: &mut Option<Box<dyn Write + Send>>) {
    if let Some(mut out) = output.take() {
        if let Err(e) = out.flush() {
            tracing::warn!(error = %e, "Failed to flush captured response body");
        }
    }
}

impl AsyncRead for ResponseHandlingStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        let wanted = buf.remaining() > 0;

        match this.source.poll_read(cx, buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                if *this.state == ReadState::Reading {
                    *this.state = ReadState::Failed;
                    *this.output = None;
                    this.handler.on_error(&e);
                }
                Poll::Ready(Err(e))
            }
            Poll::Ready(Ok(())) => {
                let read = &buf.filled()[before..];
                if !read.is_empty() {
                    this.handler.on_read(read.len());
                    if let Some(out) = this.output.as_mut() {
                        if let Err(e) = out.write_all(read) {
                            tracing::warn!(error = %e, "Dropping response body capture");
                            *this.output = None;
                        }
                    }
                } else if wanted && *this.state == ReadState::Reading {
                    *this.state = ReadState::Finished;
                    // Decoders emit their tail on flush and drop
                    finish_output(this.output);
                    this.handler.on_eof();
                }
                Poll::Ready(Ok(()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tokio::io::AsyncReadExt;

    #[derive(Default)]
    struct Counts {
        read: AtomicUsize,
        decoded: AtomicUsize,
        eof: AtomicUsize,
        errors: Mutex<Vec<String>>,
    }

    impl ResponseHandler for Counts {
        fn on_read(&self, num_bytes: usize) {
            self.read.fetch_add(num_bytes, Ordering::SeqCst);
        }

        fn on_read_decoded(&self, num_bytes: usize) {
            self.decoded.fetch_add(num_bytes, Ordering::SeqCst);
        }

        fn on_eof(&self) {
            self.eof.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, error: &io::Error) {
            self.errors.lock().push(error.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn test_tee_relays_and_captures() {
        let counts = Arc::new(Counts::default());
        let captured = Shared::default();
        let mut stream =
            ResponseHandlingStream::new(BodySource::from_bytes("hello"), counts.clone())
                .with_output(Box::new(captured.clone()));

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        drop(stream);

        assert_eq!(out, b"hello");
        assert_eq!(&captured.0.lock()[..], b"hello");
        assert_eq!(counts.read.load(Ordering::SeqCst), 5);
        assert_eq!(counts.eof.load(Ordering::SeqCst), 1);
        assert!(counts.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_decoded_capture_keeps_raw_for_reader() {
        let encoded = gzip(b"decoded body");
        let counts = Arc::new(Counts::default());
        let captured = Shared::default();
        let mut stream =
            ResponseHandlingStream::new(BodySource::from_bytes(encoded.clone()), counts.clone())
                .with_decoded_output(Some("gzip"), captured.clone());

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, encoded);
        assert_eq!(&captured.0.lock()[..], b"decoded body");
        assert_eq!(counts.read.load(Ordering::SeqCst), encoded.len());
        assert_eq!(counts.decoded.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_capture_failure_does_not_reach_reader() {
        let counts = Arc::new(Counts::default());
        let mut stream =
            ResponseHandlingStream::new(BodySource::from_bytes("still fine"), counts.clone())
                .with_output(Box::new(Broken));

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"still fine");
        assert_eq!(counts.eof.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_source_error_reported_once() {
        let reader = tokio_test::io::Builder::new()
            .read(b"par")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let counts = Arc::new(Counts::default());
        let mut stream = ResponseHandlingStream::new(BodySource::new(reader), counts.clone());

        let mut out = Vec::new();
        assert!(stream.read_to_end(&mut out).await.is_err());
        drop(stream);

        assert_eq!(counts.read.load(Ordering::SeqCst), 3);
        assert_eq!(counts.errors.lock().len(), 1);
        assert_eq!(counts.eof.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_early_close_reported_as_failure() {
        let counts = Arc::new(Counts::default());
        let mut stream =
            ResponseHandlingStream::new(BodySource::from_bytes("0123456789"), counts.clone());

        let mut first = [0u8; 4];
        stream.read_exact(&mut first).await.unwrap();
        drop(stream);

        assert_eq!(counts.eof.load(Ordering::SeqCst), 0);
        assert_eq!(counts.errors.lock().len(), 1);
    }
}
