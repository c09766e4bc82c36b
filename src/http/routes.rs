//! Route table.
//!
//! | Method | Path                     | Handler            |
//! |--------|--------------------------|--------------------|
//! | GET    | /api/hello, /api/v1/hello| `health::hello`    |
//! | GET    | /healthz                 | `health::healthz`  |
//! | GET    | /api/v1/products         | `products::list`   |
//! | POST   | /api/v1/products         | `products::create` |
//! | GET    | /api/v1/products/{id}    | `products::get`    |
//! | PUT    | /api/v1/products/{id}    | `products::update` |
//! | DELETE | /api/v1/products/{id}    | `products::delete` |
//!
//! Anything else, including a known path with an unknown method, is a 404.

use axum::{routing::get, Router};

use crate::http::handlers::{health, not_found, products};
use crate::http::server::AppState;

/// Build the route table. Middleware is added by `HttpServer`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/hello", get(health::hello))
        .route("/api/v1/hello", get(health::hello))
        .route("/healthz", get(health::healthz))
        .route(
            "/api/v1/products",
            get(products::list).post(products::create),
        )
        .route(
            "/api/v1/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(state)
}
