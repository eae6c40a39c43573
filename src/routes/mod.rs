//! Router assembly.

mod common;
mod resources;

pub use common::common_routes_with_ready;
pub use resources::{config_node_routes, device_routes};

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::{ErrorCode, ErrorStruct};
use crate::state::AppState;

async fn api_not_found() -> ErrorStruct {
    ErrorCode::ApiNotFound.error()
}

/// Error responses produced by the router or a layer (405, 413) come with a plain or empty
/// body. Give them the same `{"detail": [...]}` shape as everything else.
async fn json_errors(resp: Response) -> Response {
    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&resp) {
        return resp;
    }
    tracing::debug!(status = status.as_u16(), "framework error response");
    let mut out = ErrorStruct::from_status(status).into_response();
    for (name, value) in resp.headers() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            out.headers_mut().insert(name.clone(), value.clone());
        }
    }
    out
}

fn is_json(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// The full application: health routes, both resources, a JSON 404 fallback and a body size cap.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(config_node_routes(state.clone()))
        .merge(device_routes(state))
        .fallback(api_not_found)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(map_response(json_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::ALLOW, StatusCode};

    #[tokio::test]
    async fn plain_error_becomes_detail_body() {
        let plain = (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, "GET,HEAD")], "").into_response();
        let resp = json_errors(plain).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET,HEAD");
        assert!(is_json(&resp));
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"][0]["type"], "client_error.http_exception");
    }

    #[tokio::test]
    async fn structured_errors_pass_through() {
        let resp = json_errors(ErrorCode::ApiNotFound.error().into_response()).await;
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"][0]["type"], "client_error.api_not_found");
    }
}
