//! Common error types shared across crates.

use thiserror::Error;

/// Top-level API error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ApiError::BadRequest`] → 400
/// - [`ApiError::ForbiddenOrigin`] → 403
/// - [`ApiError::NotFound`] → 404
/// - [`ApiError::PayloadTooLarge`] → 413
/// - [`ApiError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed — invalid JSON, bad query parameter, or an
    /// unparseable body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request declared an origin outside the allow-list. The message
    /// names the rejected origin verbatim.
    #[error("{0} is not a valid origin")]
    ForbiddenOrigin(String),

    /// No route matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body exceeded its decoding ceiling.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ForbiddenOrigin(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::ForbiddenOrigin(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ApiError::ForbiddenOrigin("x".into()).http_status(), 403);
        assert_eq!(ApiError::NotFound("x".into()).http_status(), 404);
        assert_eq!(ApiError::PayloadTooLarge("x".into()).http_status(), 413);
        assert_eq!(ApiError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn forbidden_origin_names_the_origin() {
        let e = ApiError::ForbiddenOrigin("http://evil.example".into());
        assert_eq!(e.to_string(), "http://evil.example is not a valid origin");
    }

    #[test]
    fn display_includes_message() {
        let e = ApiError::BadRequest("body was not valid JSON".into());
        assert!(e.to_string().contains("body was not valid JSON"));
    }
}
