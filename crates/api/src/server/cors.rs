//! Cross-origin policy enforcement.
//!
//! The origin allow-list is injected at construction rather than read from a
//! module-level constant, so the policy is testable in isolation and
//! replaceable per deployment environment. A request that declares an origin
//! outside the list is aborted with 403 before any downstream stage runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::ApiError;

use super::middleware::error_response;
use super::state::AppState;

/// Request headers a browser may send on credentialed cross-origin requests.
pub const ALLOWED_HEADERS: &str =
    "Origin, X-Requested-With, Content-Type, Accept, Authorization, appversion, platform";

/// Methods advertised on preflight responses.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Origin allow-list consulted for every request that declares an `Origin`.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    origins: Arc<[String]>,
}

impl OriginPolicy {
    /// Build a policy from an explicit list of permitted origins.
    pub fn new(origins: Vec<String>) -> Self {
        Self {
            origins: origins.into(),
        }
    }

    /// Exact-match membership check against the allow-list.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }
}

/// Origin-policy middleware.
///
/// Requests without an `Origin` header are same-origin and pass through
/// untouched. Admitted cross-origin requests have the CORS response headers
/// attached; preflight `OPTIONS` requests are answered directly and never
/// reach the routes.
pub async fn enforce(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = match req.headers().get(header::ORIGIN) {
        Some(value) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
        None => return next.run(req).await,
    };

    if !state.policy.is_allowed(&origin) {
        return error_response(&ApiError::ForbiddenOrigin(origin));
    }

    if req.method() == Method::OPTIONS {
        return preflight_response(&origin);
    }

    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut(), &origin);
    response
}

/// Answer a preflight request for an admitted origin.
fn preflight_response(origin: &str) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    apply_cors_headers(headers, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// Attach the CORS headers for an admitted origin.
fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}
