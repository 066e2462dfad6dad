pub mod completion;
pub mod relay_app;
pub mod relay_server;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "https://wagox-design.netlify.app";

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn prompt_request(body: Value, origin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/prompt")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(origin) = origin {
        builder = builder.header(header::ORIGIN, origin);
    }

    builder
        .body(Body::from(
            serde_json::to_vec(&body).expect("json body should serialize for integration request"),
        ))
        .expect("integration request should build")
}
