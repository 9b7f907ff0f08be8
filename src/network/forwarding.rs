// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response body interposer

use crate::http::{BodySource, ResponseBody};

/// Response body whose bytes come from a substitute stream
///
/// Metadata is delegated to the original body. The original body's own
/// source has already been handed to whoever built `intercepted`, and is
/// never read through this type. `intercepted` owns that original source,
/// so closing this body closes the intercepted stream, and with it the
/// original transport stream.
pub struct ForwardingResponseBody {
    body: Box<dyn ResponseBody>,
    intercepted: BodySource,
}

impl ForwardingResponseBody {
    pub fn new(body: Box<dyn ResponseBody>, intercepted: BodySource) -> Self {
        Self { body, intercepted }
    }
}

impl ResponseBody for ForwardingResponseBody {
    fn content_type(&self) -> Option<&str> {
        self.body.content_type()
    }

    fn content_length(&self) -> Option<u64> {
        self.body.content_length()
    }

    fn source(&mut self) -> &mut BodySource {
        &mut self.intercepted
    }

    fn into_source(self: Box<Self>) -> BodySource {
        self.intercepted
    }

    fn close(self: Box<Self>) {
        self.intercepted.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StreamingBody;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

    struct Tracked {
        inner: io::Cursor<Vec<u8>>,
        closed: Arc<AtomicBool>,
    }

    impl AsyncRead for Tracked {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_metadata_from_original_bytes_from_substitute() {
        let original = StreamingBody::from_bytes(Some("text/plain"), "original");
        let mut body: Box<dyn ResponseBody> = Box::new(ForwardingResponseBody::new(
            Box::new(original),
            BodySource::from_bytes("substitute"),
        ));

        assert_eq!(body.content_type(), Some("text/plain"));
        assert_eq!(body.content_length(), Some(8));

        let mut out = String::new();
        body.source().read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "substitute");
    }

    #[test]
    fn test_close_releases_substitute() {
        let closed = Arc::new(AtomicBool::new(false));
        let substitute = BodySource::new(Tracked {
            inner: io::Cursor::new(b"unread".to_vec()),
            closed: closed.clone(),
        });
        let body: Box<dyn ResponseBody> = Box::new(ForwardingResponseBody::new(
            Box::new(StreamingBody::from_bytes(None, "")),
            substitute,
        ));

        assert!(!closed.load(Ordering::SeqCst));
        body.close();
        assert!(closed.load(Ordering::SeqCst));
    }
}
