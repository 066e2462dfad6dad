use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use super::errors::{ORIGIN_NOT_ALLOWED_MESSAGE, error_response};

/// Browser origins permitted to call the HTTP API. Requests without an
/// `Origin` header are treated as same-origin or non-browser and pass.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Arc<[HeaderValue]>,
    allow_any: bool,
}

impl OriginPolicy {
    pub fn new(origins: &[String]) -> Self {
        let allow_any = origins.iter().any(|origin| origin.trim() == "*");
        let allowed = origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty() && *origin != "*")
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "ignoring allowed origin that is not a valid header value");
                    None
                }
            })
            .collect();

        Self { allowed, allow_any }
    }

    pub fn allows(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(_) if self.allow_any => true,
            Some(origin) => self.allowed.iter().any(|allowed| allowed == origin),
        }
    }

    pub(super) fn cors_layer(&self) -> CorsLayer {
        let allow_origin = if self.allow_any {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.allowed.iter().cloned())
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

pub(super) async fn origin_guard(
    State(policy): State<OriginPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(header::ORIGIN);
    if policy.allows(origin) {
        return next.run(req).await;
    }

    warn!(origin = ?origin, path = req.uri().path(), "request origin not allowed");
    error_response(StatusCode::FORBIDDEN, ORIGIN_NOT_ALLOWED_MESSAGE)
}
