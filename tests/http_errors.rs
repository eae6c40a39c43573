//! Request handling that is settled before the database is touched, plus the shape of a
//! storage outage as seen by a client.

mod common;

use axum::http::{Method, StatusCode};
use common::{error_type, offline_app, send};

#[tokio::test]
async fn unknown_route_is_api_not_found() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "client_error.api_not_found");
    assert!(body["detail"][0]["msg"].as_str().is_some());
}

#[tokio::test]
async fn health_and_version_need_no_database() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "autoinstall-admin");
}

#[tokio::test]
async fn ready_reports_unreachable_database() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let app = offline_app();
    let (status, body) = send(&app, Method::POST, "/config-nodes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&body), "client_error.request_body_empty");
}

#[tokio::test]
async fn malformed_json_carries_position() {
    let app = offline_app();
    let (status, body) = send(&app, Method::POST, "/devices", Some("{\"name\": \"D1\",")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_type(&body), "client_error.json_decode_error");
    let ctx = &body["detail"][0]["ctx"];
    assert_eq!(ctx["line"], 1);
    assert!(ctx["column"].is_number());
    assert!(ctx["msg"].is_string());
}

#[tokio::test]
async fn body_must_be_an_object() {
    let app = offline_app();
    let (status, body) = send(&app, Method::POST, "/config-nodes", Some("\"A\"")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&body), "client_error.request_body_invalid");
}

#[tokio::test]
async fn missing_field_is_lack() {
    let app = offline_app();
    let (status, body) = send(&app, Method::POST, "/devices", Some(r#"{"name": "D1"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&body), "client_error.request_body_lack");
    assert_eq!(body["detail"][0]["loc"][1], "config_node_id");
}

#[tokio::test]
async fn non_uuid_id_is_not_found() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/config-nodes/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&body), "client_error.resource_not_found");
}

#[tokio::test]
async fn bad_query_string_is_invalid() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/devices?limit=many", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&body), "client_error.request_body_invalid");
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let app = offline_app();
    let huge = format!(r#"{{"name": "{}"}}"#, "x".repeat(common::BODY_LIMIT + 1));
    let (status, body) = send(&app, Method::POST, "/config-nodes", Some(&huge)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_type(&body), "client_error.http_exception");
    assert_eq!(body["detail"][0]["msg"], "Payload Too Large");
}

#[tokio::test]
async fn unsupported_method_keeps_status_with_detail_body() {
    let app = offline_app();
    let (status, body) = send(&app, Method::PUT, "/config-nodes", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_type(&body), "client_error.http_exception");
    assert_eq!(body["detail"][0]["msg"], "Method Not Allowed");

    let (status, body) = send(&app, Method::POST, "/devices/enum-values", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_type(&body), "client_error.http_exception");
}

#[tokio::test]
async fn unreachable_database_is_a_logged_connection_error() {
    let app = offline_app();
    let (status, body) = send(&app, Method::GET, "/config-nodes", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_type(&body), "db_server_error.db_connection_error");
    // Internal detail stays in the log.
    assert!(!body.to_string().contains("127.0.0.1"));
}
