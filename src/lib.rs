//! # strata
//!
//! Request handling assembled from layers: an ordered list of reusable
//! middleware wrapped around one terminal handler, with an immutable
//! per-request [`Context`] carrying route parameters and identity down the
//! chain.
//!
//! ## The model
//!
//! - A [`Handler`] processes `(Context, &mut dyn ResponseSink, &Request)`.
//! - A [`Middleware`] turns a handler into a new handler.
//! - [`compose`] folds a list of middleware around a handler, first element
//!   outermost; [`Partial`] pre-binds a shared prefix for many routes.
//! - [`Context`] values are never mutated. A layer that wants to tell the
//!   layers below it something derives a child context and passes that on.
//!
//! What ships in the box:
//!
//! - [`middleware::Logger`] — one structured `tracing` event per request
//! - [`middleware::PanicRecovery`] — a panicking handler costs one `500`, nothing more
//! - [`middleware::Auth`] — Basic / JSON-body credentials, `400` / `401` on failure
//! - [`Router`] + [`Server`] — matchit routing on hyper, with graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strata::middleware::{self, Auth};
//! use strata::{handler_fn, Middleware, ResponseSinkExt, Router, Server};
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strata::Error> {
//!     // Logger outermost, PanicRecovery right inside it.
//!     let base = middleware::standard();
//!
//!     let get_user = handler_fn(|ctx, sink, _req| Box::pin(async move {
//!         let id = ctx.url_params().and_then(|p| p.by_name("id")).unwrap_or("unknown");
//!         sink.json(StatusCode::OK, format!(r#"{{"id":"{id}"}}"#).as_bytes());
//!     }));
//!
//!     let whoami = handler_fn(|ctx, sink, _req| Box::pin(async move {
//!         let user = middleware::username(&ctx).unwrap_or("anonymous");
//!         sink.text(StatusCode::OK, user);
//!     }));
//!
//!     let app = Router::new()
//!         .on(Method::GET, "/users/{id}", base.handler(get_user))
//!         .on(Method::GET, "/whoami", base.compose(
//!             whoami,
//!             [Auth::basic(|user: &str, pass: &str| user == "alice" && pass == "secret").boxed()],
//!         ));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod compose;
mod context;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use compose::{Partial, compose, make_partial};
pub use context::{Context, Key, Param, Params};
pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, FnHandler, Handler, handler_fn};
pub use middleware::{BoxedMiddleware, Middleware};
pub use request::Request;
pub use response::{ContentType, ResponseSink, ResponseSinkExt, ResponseWriter, respond_error};
pub use router::Router;
pub use server::Server;
