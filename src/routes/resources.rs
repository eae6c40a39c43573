//! CRUD routes for `/config-nodes` and `/devices`.

use axum::{routing::get, Router};

use crate::handlers::{config_node, device};
use crate::state::AppState;

pub fn config_node_routes(state: AppState) -> Router {
    Router::new()
        .route("/config-nodes", get(config_node::list).post(config_node::create))
        .route("/config-nodes/enum-values", get(config_node::enum_values))
        .route(
            "/config-nodes/:id",
            get(config_node::read)
                .patch(config_node::update)
                .delete(config_node::delete),
        )
        .with_state(state)
}

pub fn device_routes(state: AppState) -> Router {
    Router::new()
        .route("/devices", get(device::list).post(device::create))
        .route("/devices/enum-values", get(device::enum_values))
        .route(
            "/devices/:id",
            get(device::read).patch(device::update).delete(device::delete),
        )
        .with_state(state)
}
