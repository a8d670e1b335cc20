//! Minimal strata example — a shared logging/recovery prefix, a parameterised
//! route, an authenticated route and a route that panics.
//!
//! Run with:
//!   cargo run --example basic -- --addr 127.0.0.1:3000
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl -u alice:secret http://localhost:3000/me
//!   curl -X POST http://localhost:3000/login -d '{"Username":"alice","Password":"secret"}'
//!   curl http://localhost:3000/panic        # 500, and the server keeps serving

use clap::{Parser, ValueEnum};
use http::{Method, StatusCode};
use strata::middleware::{self, Auth};
use strata::{Middleware, ResponseSinkExt, Router, Server, handler_fn};

#[derive(Debug, Parser)]
#[command(about = "strata demo server")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "STRATA_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,

    /// Log output format.
    #[arg(long, env = "STRATA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().init(),
    }
}

fn alice_only(user: &str, pass: &str) -> bool {
    user == "alice" && pass == "secret"
}

#[tokio::main]
async fn main() -> Result<(), strata::Error> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    // Logger outermost so that panicking requests are logged too, with the
    // 500 written by PanicRecovery.
    let base = middleware::standard();

    let index = handler_fn(|_ctx, sink, _req| Box::pin(async move {
        sink.text(StatusCode::OK, "Hello");
    }));

    // GET /users/{id}
    let get_user = handler_fn(|ctx, sink, _req| Box::pin(async move {
        let id = ctx.url_params().and_then(|p| p.by_name("id")).unwrap_or("unknown");
        sink.json(StatusCode::OK, format!(r#"{{"id":"{id}","name":"alice"}}"#).as_bytes());
    }));

    // Any route behind Auth sees the caller's name in its context.
    let me = handler_fn(|ctx, sink, _req| Box::pin(async move {
        let user = middleware::username(&ctx).unwrap_or("nobody");
        sink.text(StatusCode::OK, &format!("Secret for {user}"));
    }));

    let panics = handler_fn(|_ctx, _sink, _req| Box::pin(async move {
        panic!("panic triggered");
    }));

    let app = Router::new()
        .on(Method::GET, "/", base.handler(index))
        .on(Method::GET, "/users/{id}", base.handler(get_user))
        .on(Method::GET, "/me", base.compose(me, [Auth::basic(alice_only).boxed()]))
        .on(Method::POST, "/login", base.compose(me, [Auth::any(alice_only).boxed()]))
        .on(Method::GET, "/panic", base.handler(panics))
        .not_found(base.handler(handler_fn(|_ctx, sink, _req| Box::pin(async move {
            strata::respond_error(sink, StatusCode::NOT_FOUND);
        }))));

    Server::bind(&cli.addr)?.serve(app).await
}
