//! Request and response types exchanged with API clients.
//!
//! Every response body uses the same envelope shape: successes are
//! `{"success": true, "data": ...}`, failures are
//! `{"success": false, "error": {"code": ..., "message": ...}}`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// Success envelope wrapping every 2xx response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Always `true` for this shape.
    pub success: bool,
    /// Handler-specific payload.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload in the success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Detail carried inside an [`ErrorResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false` for this shape.
    pub success: bool,
    /// Code and message describing the failure.
    pub error: ErrorBody,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// Deployment environment name.
    pub env: String,
    /// Crate version serving the request.
    pub version: String,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Page requested when no `page` query parameter is present.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when no `limit` query parameter is present.
pub const DEFAULT_LIMIT: u64 = 25;
/// Upper bound on the page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Paging parameters derived from the query string by the pagination stage
/// and stored as a request extension for downstream handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl PageParams {
    /// Build paging parameters, clamping `page` to at least 1 and `limit`
    /// into `1..=MAX_LIMIT`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Number of items to skip before the first item of this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// A single page of a listing, with the paging metadata echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number served.
    pub page: u64,
    /// Page size served.
    pub limit: u64,
    /// Total number of items across all pages.
    pub total: u64,
}
