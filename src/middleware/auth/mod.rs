//! Credential-based authentication.
//!
//! Every request through an [`Auth`] layer takes exactly one path:
//!
//! ```text
//! parse ──err──► 400 Bad Request      (next layer never runs)
//!   │
//!   ok
//!   ▼
//! validate ──false──► 401 Unauthorized (next layer never runs)
//!   │
//!  true
//!   ▼
//! ctx + AuthenticatedUsername ──► next layer
//! ```

use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::context::{Context, Key};
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ResponseSink, respond_error};

use super::Middleware;

mod parser;

pub use parser::{AnyOf, Basic, CredentialError, CredentialParser, Credentials, JsonBody};

/// Authentication middleware: a [`CredentialParser`] plus a validation
/// function.
///
/// ```rust
/// use strata::middleware::Auth;
///
/// let admin_only = Auth::basic(|user: &str, pass: &str| user == "admin" && pass == "hunter2");
/// # let _ = admin_only;
/// ```
pub struct Auth<P, V> {
    inner: Arc<AuthInner<P, V>>,
}

struct AuthInner<P, V> {
    parser: P,
    validate: V,
}

impl<P, V> Auth<P, V>
where
    P: CredentialParser,
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    pub fn new(parser: P, validate: V) -> Self {
        Self { inner: Arc::new(AuthInner { parser, validate }) }
    }
}

impl<V> Auth<Basic, V>
where
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    /// Credentials from the `Authorization: Basic` header.
    pub fn basic(validate: V) -> Self {
        Self::new(Basic, validate)
    }
}

impl<V> Auth<JsonBody, V>
where
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    /// Credentials from a `{"Username": …, "Password": …}` body.
    pub fn json_body(validate: V) -> Self {
        Self::new(JsonBody, validate)
    }
}

impl<V> Auth<AnyOf, V>
where
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    /// Basic header if present and well-formed, otherwise the JSON body.
    pub fn any(validate: V) -> Self {
        Self::new(AnyOf, validate)
    }
}

impl<P, V> Clone for Auth<P, V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<P, V> Middleware for Auth<P, V>
where
    P: CredentialParser,
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(AuthHandler { auth: Arc::clone(&self.inner), next })
    }
}

struct AuthHandler<P, V> {
    auth: Arc<AuthInner<P, V>>,
    next: BoxedHandler,
}

impl<P, V> Handler for AuthHandler<P, V>
where
    P: CredentialParser,
    V: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a> {
        Box::pin(async move {
            let creds = match self.auth.parser.parse(req) {
                Ok(creds) => creds,
                Err(e) => {
                    debug!(uri = %req.uri(), error = %e, "credentials could not be parsed");
                    respond_error(sink, StatusCode::BAD_REQUEST);
                    return;
                }
            };

            if !(self.auth.validate)(&creds.username, &creds.password) {
                debug!(uri = %req.uri(), username = %creds.username, "credentials rejected");
                respond_error(sink, StatusCode::UNAUTHORIZED);
                return;
            }

            let ctx = ctx.with_value(Key::AuthenticatedUsername, creds.username);
            self.next.call(ctx, sink, req).await;
        })
    }
}

/// The username attached by an [`Auth`] layer further up the chain.
pub fn username(ctx: &Context) -> Option<&str> {
    ctx.value::<String>(Key::AuthenticatedUsername).map(String::as_str)
}
