//! A real server on a loopback port, driven over HTTP.

use std::time::Duration;

use http::{Method, StatusCode};
use strata::middleware::{self, Auth};
use strata::{Middleware, ResponseSinkExt, Router, Server, handler_fn};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn app() -> Router {
    let base = middleware::standard();

    let hello = handler_fn(|_ctx, sink, _req| Box::pin(async move {
        sink.text(StatusCode::OK, "Hello");
    }));
    let user = handler_fn(|ctx, sink, _req| Box::pin(async move {
        let id = ctx.url_params().and_then(|p| p.by_name("id")).unwrap_or("?");
        sink.json(StatusCode::OK, format!(r#"{{"id":"{id}"}}"#).as_bytes());
    }));
    let me = handler_fn(|ctx, sink, _req| Box::pin(async move {
        sink.text(StatusCode::OK, middleware::username(&ctx).unwrap_or("?"));
    }));
    let boom = handler_fn(|_ctx, _sink, _req| Box::pin(async move {
        panic!("boom");
    }));

    Router::new()
        .on(Method::GET, "/", base.handler(hello))
        .on(Method::GET, "/users/{id}", base.handler(user))
        .on(
            Method::POST,
            "/login",
            base.compose(me, [Auth::any(|u: &str, p: &str| u == "alice" && p == "secret").boxed()]),
        )
        .on(Method::GET, "/panic", base.handler(boom))
}

#[tokio::test]
async fn serves_until_shutdown_and_survives_panics() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(
        Server::from_listener(listener).serve_with_shutdown(app(), async {
            let _ = stopped.await;
        }),
    );

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap();
    let url = |path: &str| format!("http://{addr}{path}");

    let res = client.get(url("/panic")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 500);
    assert_eq!(res.text().await.unwrap(), "500 Internal Server Error\n");

    let res = client.get(url("/")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "Hello");

    let res = client.get(url("/users/42")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), r#"{"id":"42"}"#);

    let res = client
        .post(url("/login"))
        .basic_auth("alice", Some("secret"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "alice");

    let res = client
        .post(url("/login"))
        .body(r#"{"Username":"alice","Password":"secret"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "alice");

    let res = client
        .post(url("/login"))
        .basic_auth("alice", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);

    let res = client.get(url("/nowhere")).send().await.unwrap();
    assert_eq!(res.status().as_u16(), StatusCode::NOT_FOUND.as_u16());

    drop(client);
    stop.send(()).unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not drain in time")
        .unwrap();
    assert!(outcome.is_ok());
}

#[test]
fn bind_rejects_bad_addresses() {
    assert!(matches!(Server::bind("not an address"), Err(strata::Error::AddressParse(_))));
    assert!(Server::bind("127.0.0.1:0").is_ok());
}
