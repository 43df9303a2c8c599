//! Pipeline stages shared by the router: cache-control injection, body
//! decoding ceilings, and centralized error normalization.

use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ApiError};
use http_body_util::Limited;
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};
use tracing::error;

/// Value forced onto every response's `Cache-Control` header.
pub const CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// JSON payload ceiling: 10 MB.
pub const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Form and multipart payload ceiling: 50 MB.
pub const FORM_BODY_LIMIT: usize = 50 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

/// Render an [`ApiError`] as its HTTP response.
///
/// Every deliberate per-request failure in the pipeline funnels through here
/// exactly once, so the error body shape is uniform across stages.
pub fn error_response(err: &ApiError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.code(), err.to_string()))).into_response()
}

/// Render an extractor rejection as a normalized error body, preserving the
/// rejection's status code (notably 413 for over-limit bodies).
pub fn rejection_response(status: StatusCode, message: impl Into<String>) -> Response {
    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::FORBIDDEN => "forbidden",
        s if s.is_client_error() => "bad_request",
        _ => "internal_error",
    };
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

/// Layer converting panics in downstream stages into a 500 error body.
pub fn catch_panic_layer() -> CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(handle_panic as fn(Box<dyn Any + Send + 'static>) -> Response)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown panic".to_owned()
    };
    error!(error = %detail, "handler panicked");
    error_response(&ApiError::Internal("internal server error".into()))
}

// ---------------------------------------------------------------------------
// Cache control
// ---------------------------------------------------------------------------

/// Layer forcing [`CACHE_CONTROL`] onto every response.
pub fn cache_control_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL),
    )
}

// ---------------------------------------------------------------------------
// Body ceilings
// ---------------------------------------------------------------------------

/// Per-content-type body decoding ceilings.
///
/// Injectable so tests can exercise the over-limit path with small ceilings.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    /// Ceiling for JSON (and any unrecognised) payloads.
    pub json: usize,
    /// Ceiling for form-encoded and multipart payloads.
    pub form: usize,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            json: JSON_BODY_LIMIT,
            form: FORM_BODY_LIMIT,
        }
    }
}

impl BodyLimits {
    /// Ceiling for a request, chosen by its `Content-Type`.
    pub fn for_content_type(&self, content_type: Option<&str>) -> usize {
        match content_type {
            Some(ct)
                if ct.starts_with("multipart/form-data")
                    || ct.starts_with("application/x-www-form-urlencoded") =>
            {
                self.form
            }
            _ => self.json,
        }
    }
}

/// Wrap the request body with the content-type-appropriate ceiling.
///
/// Buffering extractors downstream (`Json`, `Form`, `Multipart`) surface the
/// length-limit error as `413 Payload Too Large` instead of truncating. The
/// router disables axum's default body limit so these ceilings are the only
/// ones in effect.
pub async fn enforce_body_limits(
    State(state): State<super::state::AppState>,
    req: Request,
    next: Next,
) -> Response {
    let limit = state.limits.for_content_type(
        req.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );
    let (parts, body) = req.into_parts();
    let limited = Body::new(Limited::new(body, limit));
    next.run(Request::from_parts(parts, limited)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceilings() {
        let limits = BodyLimits::default();
        assert_eq!(limits.json, 10 * 1024 * 1024);
        assert_eq!(limits.form, 50 * 1024 * 1024);
    }

    #[test]
    fn ceiling_selection_by_content_type() {
        let limits = BodyLimits { json: 10, form: 50 };
        assert_eq!(limits.for_content_type(Some("application/json")), 10);
        assert_eq!(
            limits.for_content_type(Some("multipart/form-data; boundary=xyz")),
            50
        );
        assert_eq!(
            limits.for_content_type(Some("application/x-www-form-urlencoded")),
            50
        );
        assert_eq!(limits.for_content_type(None), 10);
    }

    #[test]
    fn rejection_response_codes() {
        let resp = rejection_response(StatusCode::PAYLOAD_TOO_LARGE, "too big");
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let resp = rejection_response(StatusCode::UNPROCESSABLE_ENTITY, "bad field");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn error_response_uses_mapped_status() {
        let resp = error_response(&ApiError::ForbiddenOrigin("http://x".into()));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
