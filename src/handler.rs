//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A composed chain is a stack of *different* concrete types — a logger
//! wrapping a recovery layer wrapping an auth layer wrapping your function.
//! Each layer only needs to know that the next one "is a handler", so every
//! link is held as a trait object behind an `Arc`:
//!
//! ```text
//! handler_fn(|ctx, sink, req| Box::pin(async move { … }))   ← user writes this
//!        ↓
//! FnHandler(closure)                                         ← concrete wrapper
//!        ↓  compose(handler, [Logger.boxed(), …])
//! Arc<dyn Handler>  (= BoxedHandler)                         ← one link per layer
//!        ↓
//! handler.call(ctx, &mut sink, &req)  at request time        ← one vtable call per layer
//! ```
//!
//! The runtime cost per layer is one virtual call and one boxed future,
//! negligible compared to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseSink;

/// A heap-allocated, type-erased future borrowing from the request it serves.
///
/// `Send` lets tokio move the request's task across worker threads.
pub type BoxFuture<'a, T = ()> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of request processing.
///
/// A handler receives the request's [`Context`] by value, the response sink
/// it writes into, and the read-only request. It produces its result purely
/// as side effects on the sink.
///
/// Implement it directly for stateful handlers and middleware layers, or wrap
/// a closure with [`handler_fn`].
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a>;
}

/// A type-erased handler shared between every route and request that uses it.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a> {
        (**self).call(ctx, sink, req)
    }
}

/// Turns a closure into a [`Handler`].
///
/// The closure returns a boxed future so that it may borrow the sink and the
/// request across `.await` points:
///
/// ```rust
/// use strata::{handler_fn, ResponseSinkExt};
/// use http::StatusCode;
///
/// let hello = handler_fn(|ctx, sink, _req| Box::pin(async move {
///     let name = ctx.url_params().and_then(|p| p.by_name("name")).unwrap_or("world");
///     sink.text(StatusCode::OK, &format!("hello, {name}"));
/// }));
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(Context, &'a mut dyn ResponseSink, &'a Request) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    FnHandler(f)
}

/// Newtype produced by [`handler_fn`], bridging a closure to the trait.
#[derive(Clone, Copy)]
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(Context, &'a mut dyn ResponseSink, &'a Request) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a> {
        (self.0)(ctx, sink, req)
    }
}
