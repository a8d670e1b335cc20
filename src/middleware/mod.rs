//! Middleware layer.
//!
//! A middleware is a transform from one [`Handler`] to another: it receives
//! the next link of the chain and returns a new link that runs its own logic
//! around it. Middleware is the right place for cross-cutting concerns.
//!
//! Built-in middleware:
//! - [`Logger`] — one structured event per request with method, URI, status, latency
//! - [`PanicRecovery`] — turns a panicking handler into a `500` for that request only
//! - [`Auth`] — credential parsing and validation; attaches the username to the context
//!
//! Chains are built with [`compose`](crate::compose) and
//! [`Partial`](crate::Partial). The recommended prefix is [`standard()`]:
//! the logger outermost, recovery directly inside it, so a request that
//! panics is still logged, with the `500` recovery wrote.

use std::sync::Arc;

use crate::compose::Partial;
use crate::handler::BoxedHandler;

mod auth;
mod logger;
mod recover;

pub use auth::{
    AnyOf, Auth, Basic, CredentialError, CredentialParser, Credentials, JsonBody, username,
};
pub use logger::{Logger, StatusCapture};
pub use recover::PanicRecovery;

/// A transform from handler to handler.
///
/// `wrap` is called once per route at composition time, never per request,
/// so the same middleware value can wrap any number of handlers.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;

    /// Erases the concrete type so heterogeneous middleware fit in one list.
    fn boxed(self) -> BoxedMiddleware
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// A type-erased middleware, cheap to clone into many chains.
pub type BoxedMiddleware = Arc<dyn Middleware>;

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// `[Logger, PanicRecovery]`, ready to be extended per route.
pub fn standard() -> Partial {
    Partial::new([Logger.boxed(), PanicRecovery.boxed()])
}
