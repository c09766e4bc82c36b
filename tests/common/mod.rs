//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use shop_api::config::ServiceConfig;
use shop_api::http::{AppState, HttpServer, ServerError};
use shop_api::lifecycle::{LifecycleState, Shutdown};
use shop_api::observability::Logger;
use shop_api::repository::SqliteRepository;
use shop_api::service::ProductManager;
use shop_api::version::Version;

pub const BUILD: &str = "test-build";
pub const BRANCH: &str = "test-branch";

/// Server over a fresh in-memory database.
pub async fn test_server(config: &ServiceConfig) -> HttpServer {
    let repo = SqliteRepository::in_memory()
        .await
        .expect("in-memory sqlite");
    let version = Version::new(BUILD, BRANCH);
    let logger = Logger::new(&version);
    let state = AppState::new(
        version,
        Arc::new(ProductManager::new(Arc::new(repo))),
        logger,
    );
    HttpServer::new(config, state)
}

/// A server running on an ephemeral local port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub states: watch::Receiver<LifecycleState>,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

/// Spawn a server and wait until it is listening.
pub async fn spawn_server(config: &ServiceConfig) -> RunningServer {
    let server = test_server(config).await;
    let mut states = server.state_watcher();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    states
        .wait_for(|s| *s == LifecycleState::Listening)
        .await
        .unwrap();

    RunningServer {
        addr,
        shutdown,
        states,
        handle,
    }
}

/// Raw request head for a JSON product create with a declared body length.
pub fn product_post_head(content_length: usize) -> String {
    format!(
        "POST /api/v1/products HTTP/1.1\r\n\
         Host: localhost\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {content_length}\r\n\r\n"
    )
}

/// Read a raw HTTP response up to the end of its headers.
pub async fn read_response_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Fully layered router over a fresh in-memory database.
pub async fn test_router() -> Router {
    test_server(&ServiceConfig::default()).await.router()
}

/// Send a request and return status, headers, and the JSON body (`Null` when empty).
pub async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    send(router, builder.body(body).unwrap()).await
}

/// Send a prepared request.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, headers, json)
}

/// Create `count` products named `product-0`, `product-1`, …
pub async fn seed_products(router: &Router, count: usize) -> Vec<Value> {
    let mut created = Vec::with_capacity(count);
    for i in 0..count {
        let (status, _, body) = json_request(
            router,
            "POST",
            "/api/v1/products",
            Some(serde_json::json!({ "name": format!("product-{i}") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created.push(body);
    }
    created
}
