//! Axum router construction.
//!
//! The pipeline order is semantically significant: body decoding precedes
//! pagination, and error normalization wraps everything downstream of it so
//! it can observe faults from dispatch. Axum runs the **last** layer added
//! first, so registration below is the reverse of per-request execution
//! order.

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{cors, handlers, middleware, pagination, state::AppState};

/// Build the application [`Router`] with all routes and pipeline stages
/// attached.
///
/// Per-request execution order: origin policy, request logging,
/// cache-control injection, body ceilings, pagination extraction, panic
/// normalization, route dispatch.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/echo", post(handlers::echo))
        .route("/api/items", get(handlers::list_items))
        .route("/api/upload", post(handlers::upload))
        .fallback(handlers::not_found)
        .layer(middleware::catch_panic_layer())
        .layer(from_fn(pagination::extract))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::enforce_body_limits,
        ))
        // Our content-type-aware ceilings replace axum's blanket limit.
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::cache_control_layer())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), cors::enforce))
        .with_state(state)
}
