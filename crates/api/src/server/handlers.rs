//! Axum request handlers for the route surface.
//!
//! Success bodies leave every handler wrapped in [`Envelope`]; failures are
//! rendered through the normalization helpers in [`super::middleware`] so
//! clients always see the same error shape.

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common::protocol::{Envelope, ErrorResponse, HealthResponse, Paged, PageParams};
use serde::Serialize;

use super::middleware::rejection_response;
use super::state::AppState;

/// `GET /health` — liveness check with environment and version info.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        env: state.env.to_string(),
        version: env!("CARGO_PKG_VERSION").into(),
    };
    (StatusCode::OK, Json(Envelope::ok(body))).into_response()
}

/// `POST /api/echo` — parse the JSON body and return it in the envelope.
///
/// The rejection branch preserves the extractor's status code, so an
/// over-ceiling body answers 413 rather than being truncated.
pub async fn echo(payload: Result<Json<serde_json::Value>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(value)) => (StatusCode::OK, Json(Envelope::ok(value))).into_response(),
        Err(rejection) => rejection_response(rejection.status(), rejection.body_text()),
    }
}

/// Number of entries in the reference collection served by `/api/items`.
const ITEMS_TOTAL: u64 = 250;

/// `GET /api/items` — paginated listing over a reference collection,
/// demonstrating the paging contract: `page`/`limit` from the pagination
/// stage, metadata echoed in the response.
pub async fn list_items(Extension(params): Extension<PageParams>) -> Response {
    let items: Vec<String> = (0..ITEMS_TOTAL)
        .skip(params.offset() as usize)
        .take(params.limit as usize)
        .map(|i| format!("item-{:04}", i + 1))
        .collect();

    let body = Paged {
        items,
        page: params.page,
        limit: params.limit,
        total: ITEMS_TOTAL,
    };
    (StatusCode::OK, Json(Envelope::ok(body))).into_response()
}

/// Summary of one uploaded multipart field.
#[derive(Debug, Serialize)]
pub struct UploadedPart {
    /// Field name from the multipart part.
    pub field: String,
    /// Size of the part in bytes.
    pub size: usize,
}

/// `POST /api/upload` — accept a multipart upload and return a per-part
/// summary. Parts are drained fully; the 50 MB ceiling applies to the whole
/// body.
pub async fn upload(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    let mut parts = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let name = field.name().unwrap_or_default().to_owned();
                match field.bytes().await {
                    Ok(bytes) => parts.push(UploadedPart {
                        field: name,
                        size: bytes.len(),
                    }),
                    Err(e) => return multipart_error_response(&e),
                }
            }
            Ok(None) => break,
            Err(e) => return multipart_error_response(&e),
        }
    }

    (StatusCode::OK, Json(Envelope::ok(parts))).into_response()
}

/// Map a multipart read error onto its response: a body over the upload
/// ceiling answers 413, anything else is a 400.
fn multipart_error_response(err: &MultipartError) -> Response {
    if hit_length_limit(err) {
        rejection_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "multipart body exceeded the upload ceiling",
        )
    } else {
        rejection_response(StatusCode::BAD_REQUEST, err.to_string())
    }
}

/// Walk the error's source chain looking for the body-ceiling error raised
/// by the limited request body.
fn hit_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(e) = source {
        if e.is::<http_body_util::LengthLimitError>() || e.to_string().contains("length limit") {
            return true;
        }
        source = e.source();
    }
    false
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "not_found",
            "the requested resource does not exist",
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
        middleware::from_fn,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = AppState::default();
        Router::new()
            .route("/health", get(health))
            .route("/api/echo", post(echo))
            .route("/api/items", get(list_items))
            .route("/api/upload", post(upload))
            .fallback(not_found)
            .layer(from_fn(super::super::pagination::extract))
            .with_state(state)
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["env"], "test");
    }

    #[tokio::test]
    async fn echo_returns_payload_in_envelope() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"aetasaal"}"#))
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["name"], "aetasaal");
    }

    #[tokio::test]
    async fn echo_rejects_invalid_json_with_error_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn list_items_serves_the_requested_page() {
        let resp = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/items?page=2&limit=10")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["page"], 2);
        assert_eq!(json["data"]["limit"], 10);
        assert_eq!(json["data"]["total"], 250);
        assert_eq!(json["data"]["items"][0], "item-0011");
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn upload_summarises_multipart_parts() {
        let body = concat!(
            "--boundary\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "hello world\r\n",
            "--boundary--\r\n",
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=boundary",
            )
            .body(Body::from(body))
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"][0]["field"], "file");
        assert_eq!(json["data"][0]["size"], 11);
    }

    #[tokio::test]
    async fn upload_rejects_non_multipart_content_type() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn unknown_route_returns_404_error_body() {
        let resp = test_router()
            .oneshot(Request::builder().uri("/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "not_found");
    }
}
