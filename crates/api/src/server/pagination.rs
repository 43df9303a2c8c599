//! Pagination parameter extraction.
//!
//! Derives `page` and `limit` from the query string and stores a
//! [`PageParams`] request extension for downstream handlers. Malformed or
//! missing values fall back to the defaults rather than failing the request;
//! `limit` is clamped to the configured maximum.

use axum::{
    extract::{Query, Request},
    middleware::Next,
    response::Response,
};
use common::protocol::{PageParams, DEFAULT_LIMIT, DEFAULT_PAGE};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct RawPageQuery {
    page: Option<String>,
    limit: Option<String>,
}

/// Pagination middleware: attach [`PageParams`] to the request extensions.
pub async fn extract(mut req: Request, next: Next) -> Response {
    let raw = Query::<RawPageQuery>::try_from_uri(req.uri())
        .map(|q| q.0)
        .unwrap_or_default();
    req.extensions_mut().insert(params_from(raw));
    next.run(req).await
}

fn params_from(raw: RawPageQuery) -> PageParams {
    let page = raw
        .page
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PAGE);
    let limit = raw
        .limit
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIMIT);
    PageParams::new(page, limit)
}
