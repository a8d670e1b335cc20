//! Panic isolation.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use http::StatusCode;
use tracing::{error, warn};

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ResponseSink, respond_error};

use super::Middleware;

/// Contains a panic raised anywhere below this layer to the request that
/// raised it.
///
/// The panic message and a backtrace go to the `ERROR` log; the client gets
/// a plain `500 Internal Server Error`, unless the response had already been
/// committed, in which case it is left as is. Nothing is retried.
///
/// "Committed" means a status has been written, even though a buffered
/// [`ResponseWriter`](crate::ResponseWriter) has sent nothing yet. The first
/// status written is the one the client and the [`Logger`](super::Logger)
/// both see, so recovery never overrides it.
///
/// Only layers *inside* this one are protected, including panics raised by
/// their `call` before it returns a future.
#[derive(Clone, Copy, Debug, Default)]
pub struct PanicRecovery;

impl Middleware for PanicRecovery {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(RecoveryHandler { next })
    }
}

struct RecoveryHandler {
    next: BoxedHandler,
}

impl Handler for RecoveryHandler {
    fn call<'a>(
        &'a self,
        ctx: Context,
        sink: &'a mut dyn ResponseSink,
        req: &'a Request,
    ) -> BoxFuture<'a> {
        Box::pin(async move {
            // `call` itself runs inside the guarded future: handlers may do
            // eager work before boxing theirs. The sink is only reborrowed
            // for the inner call and is ours again once the unwind is caught.
            let outcome = AssertUnwindSafe(async { self.next.call(ctx, &mut *sink, req).await })
                .catch_unwind()
                .await;

            let Err(payload) = outcome else { return };

            error!(
                method = %req.method(),
                uri = %req.uri(),
                panic = panic_message(payload.as_ref()),
                backtrace = %Backtrace::force_capture(),
                "handler panicked"
            );

            if sink.is_committed() {
                warn!(uri = %req.uri(), "response already committed, cannot send 500");
                return;
            }
            respond_error(sink, StatusCode::INTERNAL_SERVER_ERROR);
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
