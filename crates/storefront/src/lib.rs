//! Orchard Storefront library.
//!
//! This crate provides the storefront functionality as a library, allowing
//! it to be tested and reused. The binary in `main.rs` adds Sentry and the
//! tracing subscriber around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, middleware as axum_middleware, routing::get};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{MokaSessionStore, SessionLocks};
use crate::state::AppState;

/// Build the storefront router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let session_layer =
        middleware::create_session_layer(MokaSessionStore::default(), state.config());
    let static_dir = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/static", static_dir)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::request_id_middleware))
                .layer(axum_middleware::from_fn_with_state(
                    SessionLocks::new(),
                    middleware::session_lock_middleware,
                ))
                .layer(session_layer)
                .layer(axum_middleware::from_fn(
                    middleware::security_headers_middleware,
                )),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. The catalog is loaded lazily, so
/// there is nothing else to check.
async fn health() -> &'static str {
    "ok"
}
