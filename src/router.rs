//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router is also where
//! each request's [`Context`] is born: the matched path parameters are placed
//! in it, in path order, before the route's handler chain runs.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::Full;
use matchit::Router as MatchitRouter;

use crate::context::{Context, Params};
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ResponseSink, ResponseWriter, respond_error};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), not_found: Arc::new(NotFound) }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and reach the handler through
    /// [`Context::url_params`]:
    ///
    /// ```rust,no_run
    /// # use strata::{handler_fn, Router};
    /// # use http::Method;
    /// # let get_user = handler_fn(|_, _, _| Box::pin(async {}));
    /// # let create_user = handler_fn(|_, _, _| Box::pin(async {}));
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with one
    /// already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Replaces the handler used when no route matches (default: `404`).
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Resolves `method` + `path` to a handler and its parameters.
    ///
    /// Unmatched requests get the not-found handler and no parameters.
    pub(crate) fn lookup(&self, method: &Method, path: &str) -> (BoxedHandler, Params) {
        let matched = self.routes.get(method).and_then(|tree| tree.at(path).ok());
        match matched {
            Some(m) => (
                Arc::clone(m.value),
                m.params.iter().collect(),
            ),
            None => (Arc::clone(&self.not_found), Params::new()),
        }
    }

    /// Runs one request through its route and returns the finished response.
    ///
    /// Every request starts from a fresh [`Context`] holding its route
    /// parameters, empty when the route has none.
    pub async fn respond(&self, req: Request) -> http::Response<Full<Bytes>> {
        let (handler, params) = self.lookup(req.method(), req.path());
        let ctx = Context::new().set_url_params(params);
        let mut sink = ResponseWriter::new();
        handler.call(ctx, &mut sink, &req).await;
        sink.into_response()
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

struct NotFound;

impl Handler for NotFound {
    fn call<'a>(
        &'a self,
        _ctx: Context,
        sink: &'a mut dyn ResponseSink,
        _req: &'a Request,
    ) -> BoxFuture<'a> {
        Box::pin(async move { respond_error(sink, StatusCode::NOT_FOUND) })
    }
}
