//! End-to-end hierarchy scenario over HTTP against a live PostgreSQL. Skipped when
//! `DATABASE_URL` is unset.

mod common;

use autoinstall_admin::{app, AppState};
use axum::http::{Method, StatusCode};
use common::{db_pool, error_type, send, unique, BODY_LIMIT};
use serde_json::{json, Value};

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn hierarchy_paths_labels_and_cycle_rejection() {
    let Some(pool) = db_pool().await else { return };
    let app = app(AppState { pool }, BODY_LIMIT);

    let (a_name, b_name, d_name) = (unique("A"), unique("B"), unique("D1"));

    let body = json!({"name": a_name, "autoinstall_config": "{}"}).to_string();
    let (status, a) = send(&app, Method::POST, "/config-nodes", Some(&body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", a);
    let a_id = a["data"]["id"].as_str().unwrap().to_string();

    let body = json!({"name": b_name, "parent_id": a_id, "autoinstall_config": "{}"}).to_string();
    let (status, b) = send(&app, Method::POST, "/config-nodes", Some(&body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", b);
    let b_id = b["data"]["id"].as_str().unwrap().to_string();

    let body = json!({"name": d_name, "config_node_id": b_id, "identifier": "client-chosen"}).to_string();
    let (status, d) = send(&app, Method::POST, "/devices", Some(&body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", d);
    let d_id = d["data"]["id"].as_str().unwrap().to_string();
    assert_ne!(d["data"]["identifier"], "client-chosen");

    let path = format!("{} > {}", a_name, b_name);

    let (status, nodes) = send(&app, Method::GET, "/config-nodes/enum-values", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(titles(&nodes).contains(&path));

    let (status, devices) = send(&app, Method::GET, "/devices/enum-values", None).await;
    assert_eq!(status, StatusCode::OK);
    let label = format!("Device: {}({})[{}]", d_name, d_id, path);
    assert!(titles(&devices).contains(&label), "{:?}", titles(&devices));

    // A under B would close the loop.
    let body = json!({"parent_id": b_id}).to_string();
    let (status, err) = send(&app, Method::PATCH, &format!("/config-nodes/{}", a_id), Some(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&err), "client_error.cyclic_parent");
    assert_eq!(err["detail"][0]["loc"], json!(["parent_id"]));
    assert_eq!(err["detail"][0]["input"], b_id.as_str());

    // Nothing changed.
    let (_, a_again) = send(&app, Method::GET, &format!("/config-nodes/{}", a_id), None).await;
    assert_eq!(a_again["data"]["parent_id"], Value::Null);

    // Filtered listing sees the child.
    let (status, listed) = send(&app, Method::GET, &format!("/config-nodes?parent_id={}", a_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["meta"]["count"], 1);
    assert_eq!(listed["data"][0]["name"], b_name.as_str());

    // A still has B beneath it.
    let (status, err) = send(&app, Method::DELETE, &format!("/config-nodes/{}", a_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&err), "db_value_error.db_restrict_constraint_error");

    for uri in [
        format!("/devices/{}", d_id),
        format!("/config-nodes/{}", b_id),
        format!("/config-nodes/{}", a_id),
    ] {
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "{}: {}", uri, body);
    }
    let (status, err) = send(&app, Method::GET, &format!("/devices/{}", d_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_type(&err), "client_error.resource_not_found");
}

#[tokio::test]
async fn invalid_payloads_are_rejected_before_writing() {
    let Some(pool) = db_pool().await else { return };
    let app = app(AppState { pool }, BODY_LIMIT);

    let body = json!({"name": "  ", "autoinstall_config": "{}"}).to_string();
    let (status, err) = send(&app, Method::POST, "/config-nodes", Some(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&err), "client_error.request_body_lack");

    let body = json!({"name": unique("bad"), "autoinstall_config": "{oops"}).to_string();
    let (status, err) = send(&app, Method::POST, "/config-nodes", Some(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&err), "client_error.request_body_invalid");

    let body = json!({"name": null}).to_string();
    let uri = format!("/config-nodes/{}", uuid::Uuid::new_v4());
    let (status, err) = send(&app, Method::PATCH, &uri, Some(&body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_type(&err), "client_error.request_body_lack");
}
