//! Folding middleware lists into handlers.
//!
//! ```text
//! compose(h, [a, b, c])  ==  a.wrap(b.wrap(c.wrap(h)))
//!
//!   request ─► a ─► b ─► c ─► h
//!  response ◄─ a ◄─ b ◄─ c ◄─┘
//! ```
//!
//! The first middleware in the list is the outermost: it sees the request
//! first and the unwinding response last.

use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::BoxedMiddleware;

/// Wraps `handler` in `middleware`, first element outermost.
///
/// Building the chain has no side effects; everything happens when the
/// returned handler is called.
///
/// ```rust
/// use strata::{compose, handler_fn, Middleware, ResponseSinkExt};
/// use strata::middleware::{Logger, PanicRecovery};
/// use http::StatusCode;
///
/// let index = handler_fn(|_ctx, sink, _req| Box::pin(async move {
///     sink.text(StatusCode::OK, "hello");
/// }));
/// let app = compose(index, [Logger.boxed(), PanicRecovery.boxed()]);
/// # let _ = app;
/// ```
pub fn compose<H, I>(handler: H, middleware: I) -> BoxedHandler
where
    H: Handler,
    I: IntoIterator<Item = BoxedMiddleware>,
{
    let layers: Vec<BoxedMiddleware> = middleware.into_iter().collect();
    layers
        .iter()
        .rev()
        .fold(Arc::new(handler) as BoxedHandler, |next, layer| layer.wrap(next))
}

/// A middleware prefix shared by many routes.
///
/// `partial.compose(h, extra)` is exactly `compose(h, base ++ extra)`. The
/// base list is immutable and reference counted, so one `Partial` can be
/// cloned into every route of an application.
#[derive(Clone, Default)]
pub struct Partial {
    base: Arc<[BoxedMiddleware]>,
}

impl Partial {
    pub fn new(base: impl IntoIterator<Item = BoxedMiddleware>) -> Self {
        Self { base: base.into_iter().collect() }
    }

    /// A new partial with `layer` appended, innermost.
    #[must_use]
    pub fn with(&self, layer: BoxedMiddleware) -> Self {
        Self { base: self.base.iter().cloned().chain([layer]).collect() }
    }

    /// Composes `handler` with the base list followed by `extra`.
    pub fn compose<H, I>(&self, handler: H, extra: I) -> BoxedHandler
    where
        H: Handler,
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        compose(handler, self.base.iter().cloned().chain(extra))
    }

    /// Composes `handler` with the base list only.
    pub fn handler<H: Handler>(&self, handler: H) -> BoxedHandler {
        self.compose(handler, [])
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

/// Pre-binds `base` for reuse; see [`Partial`].
pub fn make_partial(base: impl IntoIterator<Item = BoxedMiddleware>) -> Partial {
    Partial::new(base)
}
