//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri};

/// An incoming HTTP request with its body already read into memory.
///
/// Handlers only ever see `&Request`: the request is read-only data that
/// every layer of the chain observes unchanged. Per-request values that
/// middleware wants to hand downstream travel in the
/// [`Context`](crate::Context) instead.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// A request with no headers and an empty body.
    ///
    /// ```rust
    /// use strata::Request;
    /// use http::Method;
    ///
    /// let req = Request::new(Method::POST, "/login".parse().unwrap())
    ///     .with_header(http::header::CONTENT_TYPE, "application/json")
    ///     .with_body(r#"{"Username":"alice","Password":"secret"}"#);
    /// assert_eq!(req.path(), "/login");
    /// ```
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri, headers: HeaderMap::new(), body: Bytes::new() }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, body }
    }

    /// Appends a header. Values that are not valid header text are dropped.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup by name. Returns `None` for values that are not visible
    /// ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
