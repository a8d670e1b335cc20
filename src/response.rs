//! The response sink every handler writes into.
//!
//! Handlers do not return a response value. They receive a
//! `&mut dyn ResponseSink` and write to it: headers, then a status, then body
//! bytes. That is what lets middleware observe a response as it is produced
//! (the logger wraps the sink to see the status) and lets a middleware decide
//! whether it can still replace a response (panic recovery checks
//! [`ResponseSink::is_committed`]).

use bytes::{Bytes, BytesMut};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::debug;

// ── ResponseSink ──────────────────────────────────────────────────────────────

/// The capability set of an outgoing response.
///
/// Once a status or any body bytes have been written the response is
/// *committed*: later status writes and header changes are ignored.
pub trait ResponseSink: Send {
    /// Sets `name` to `value`, replacing any earlier value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Writes the status line. Only the first call has an effect.
    fn write_status(&mut self, status: StatusCode);

    /// Appends body bytes, committing an implicit `200 OK` if no status has
    /// been written yet.
    fn write_body(&mut self, chunk: &[u8]);

    /// Pushes buffered output towards the client, where the sink supports it.
    fn flush(&mut self) {}

    /// Whether the status line has been decided.
    fn is_committed(&self) -> bool;
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseSinkExt::send`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        })
    }
}

/// Shorthands for writing a whole response in one call.
///
/// Implemented for every sink, including `dyn ResponseSink`.
pub trait ResponseSinkExt: ResponseSink {
    /// Content type, status and body, in that order.
    fn send(&mut self, status: StatusCode, content_type: ContentType, body: &[u8]) {
        self.set_header(header::CONTENT_TYPE, content_type.header_value());
        self.write_status(status);
        self.write_body(body);
    }

    fn text(&mut self, status: StatusCode, body: &str) {
        self.send(status, ContentType::Text, body.as_bytes());
    }

    fn json(&mut self, status: StatusCode, body: &[u8]) {
        self.send(status, ContentType::Json, body);
    }
}

impl<S: ResponseSink + ?Sized> ResponseSinkExt for S {}

/// Writes a terse, status-derived error response such as `401 Unauthorized`.
///
/// Used by the built-in middleware on their failure paths; the body never
/// carries diagnostic detail.
pub fn respond_error<S: ResponseSink + ?Sized>(sink: &mut S, status: StatusCode) {
    sink.set_header(header::CONTENT_TYPE, ContentType::Text.header_value());
    sink.set_header(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    sink.write_status(status);
    let reason = status.canonical_reason().unwrap_or("");
    sink.write_body(format!("{} {reason}\n", status.as_u16()).as_bytes());
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Buffered [`ResponseSink`] that the router hands to each request.
///
/// Everything is kept in memory and turned into an [`http::Response`] once
/// the handler chain returns.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finishes the response. A handler that wrote nothing yields an empty
    /// `200 OK`.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseSink for ResponseWriter {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.status.is_some() {
            debug!(header = %name, "header set after response was committed, ignoring");
            return;
        }
        self.headers.insert(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                debug!(%committed, ignored = %status, "superfluous write_status call");
            }
        }
    }

    fn write_body(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }

    fn is_committed(&self) -> bool {
        self.status.is_some()
    }
}
