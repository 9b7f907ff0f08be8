// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Streaming response bodies
//!
//! A response body is a single-reader byte stream plus metadata. Closing a
//! [`BodySource`] drops it, which releases the underlying transport stream
//! and every reader it wraps.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::io::StreamReader;

/// Owned, single-reader byte stream of a response body
pub struct BodySource {
    inner: Pin<Box<dyn AsyncRead + Send>>,
}

impl BodySource {
    /// Wrap any async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            inner: Box::pin(reader),
        }
    }

    /// A source that is already at end of stream
    pub fn empty() -> Self {
        Self::new(tokio::io::empty())
    }

    /// A source over an in-memory buffer
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }

    /// Adapt a chunk stream (such as reqwest's `bytes_stream`)
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let stream = stream.map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Self::new(StreamReader::new(stream))
    }

    /// Read the remaining bytes to the end of the stream
    pub async fn bytes(&mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Close the stream and release everything it wraps
    pub fn close(self) {
        drop(self);
    }
}

impl Default for BodySource {
    fn default() -> Self {
        Self::empty()
    }
}

impl AsyncRead for BodySource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySource").finish_non_exhaustive()
    }
}

/// Response body: metadata plus exactly one byte source
pub trait ResponseBody: Send {
    /// Declared media type, if any
    fn content_type(&self) -> Option<&str>;

    /// Declared length in bytes, if known
    fn content_length(&self) -> Option<u64>;

    /// The byte source every read must go through
    fn source(&mut self) -> &mut BodySource;

    /// Detach the byte source
    fn into_source(self: Box<Self>) -> BodySource;

    /// Close the body and its byte source
    fn close(self: Box<Self>) {
        self.into_source().close();
    }
}

impl fmt::Debug for dyn ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("content_type", &self.content_type())
            .field("content_length", &self.content_length())
            .finish_non_exhaustive()
    }
}

/// Body as produced by a transport
#[derive(Debug)]
pub struct StreamingBody {
    content_type: Option<String>,
    content_length: Option<u64>,
    source: BodySource,
}

impl StreamingBody {
    /// Create a new streaming body
    pub fn new(
        content_type: Option<String>,
        content_length: Option<u64>,
        source: BodySource,
    ) -> Self {
        Self {
            content_type,
            content_length,
            source,
        }
    }

    /// Body over an in-memory buffer with an exact declared length
    pub fn from_bytes(content_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            content_type: content_type.map(String::from),
            content_length: Some(bytes.len() as u64),
            source: BodySource::from_bytes(bytes),
        }
    }
}

impl ResponseBody for StreamingBody {
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    fn source(&mut self) -> &mut BodySource {
        &mut self.source
    }

    fn into_source(self: Box<Self>) -> BodySource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_bytes_reads_everything() {
        let mut source = BodySource::from_bytes("hello");
        assert_eq!(source.bytes().await.unwrap(), Bytes::from("hello"));
        assert!(source.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_stream_concatenates_chunks() {
        let chunks: Vec<std::result::Result<Bytes, io::Error>> =
            vec![Ok(Bytes::from("hel")), Ok(Bytes::from("lo"))];
        let mut source = BodySource::from_stream(futures::stream::iter(chunks));

        assert_eq!(source.bytes().await.unwrap(), Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_from_stream_surfaces_errors() {
        let chunks: Vec<std::result::Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from("partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let mut source = BodySource::from_stream(futures::stream::iter(chunks));

        assert!(source.bytes().await.is_err());
    }

    #[test]
    fn test_streaming_body_metadata() {
        let body = StreamingBody::from_bytes(Some("text/plain"), "hello");
        assert_eq!(body.content_type(), Some("text/plain"));
        assert_eq!(body.content_length(), Some(5));
    }
}
