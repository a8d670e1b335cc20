//! Per-request access logging.

use std::time::Instant;

use http::StatusCode;
use http::header::{HeaderName, HeaderValue};
use tracing::info;

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::ResponseSink;

use super::Middleware;

/// Emits one `INFO` event per completed request.
///
/// Fields: `method`, `uri`, `status`, `status_text`, `elapsed`. A handler
/// that never writes a status is logged as `200`. The response itself is
/// never touched.
///
/// If a layer below panics, the unwind passes straight through and no event
/// is emitted; place [`PanicRecovery`](super::PanicRecovery) *inside* the
/// logger to have failed requests logged as `500`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Middleware for Logger {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        std::sync::Arc::new(LoggerHandler { next })
    }
}

struct LoggerHandler {
    next: BoxedHandler,
}

impl Handler for LoggerHandler {
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let mut capture = StatusCapture::new(sink);

            self.next.call(ctx, &mut capture, req).await;

            let status = capture.status();
            info!(
                method = %req.method(),
                uri = %req.uri(),
                status = status.as_u16(),
                status_text = status.canonical_reason().unwrap_or(""),
                elapsed = ?start.elapsed(),
                "request completed"
            );
        })
    }
}

// ── StatusCapture ─────────────────────────────────────────────────────────────

/// Sink wrapper that remembers the first status written through it.
///
/// Every operation is forwarded unchanged to the wrapped sink.
pub struct StatusCapture<'s> {
    inner: &'s mut dyn ResponseSink,
    status: Option<StatusCode>,
}

impl<'s> StatusCapture<'s> {
    pub fn new(inner: &'s mut dyn ResponseSink) -> Self {
        Self { inner, status: None }
    }

    /// The first status written, or `200 OK` if none was.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// The first status written, `None` while unset.
    pub fn captured(&self) -> Option<StatusCode> {
        self.status
    }
}

impl ResponseSink for StatusCapture<'_> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.inner.set_header(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
        self.inner.write_status(status);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.inner.write_body(chunk);
    }

    fn flush(&mut self) {
        self.inner.flush();
    }

    fn is_committed(&self) -> bool {
        self.inner.is_committed()
    }
}
