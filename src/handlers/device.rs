//! `/devices` handlers.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use super::{body_rejection, page_bounds, parse_body, parse_id, query_error};
use crate::error::AppError;
use crate::model::{DeviceChanges, NewDevice};
use crate::response::{success_many, success_one, success_one_ok, success_page};
use crate::service::DeviceService;
use crate::sql::{Filter, ListQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeviceListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub config_node_id: Option<Uuid>,
}

impl DeviceListParams {
    fn filter(&self) -> Option<Filter> {
        let mut filters = Vec::new();
        if let Some(name) = &self.name {
            filters.push(Filter::eq("name", name.as_str()));
        }
        if let Some(identifier) = &self.identifier {
            filters.push(Filter::eq("identifier", identifier.as_str()));
        }
        if let Some(node) = self.config_node_id {
            filters.push(Filter::eq("config_node_id", node));
        }
        Filter::all(filters)
    }
}

pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<DeviceListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(query_error)?;
    let filter = params.filter();
    let (offset, limit) = page_bounds(params.offset, params.limit);
    let mut tx = state.pool.begin().await?;
    let total = DeviceService::count(&mut *tx, filter.as_ref()).await?;
    let query = ListQuery {
        filter,
        ..Default::default()
    }
    .page(Some(offset), Some(limit));
    let rows = DeviceService::list(&mut *tx, &query).await?;
    tx.commit().await?;
    Ok(success_page(rows, total))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(body_rejection)?;
    let new: NewDevice = parse_body(&body)?;
    let mut tx = state.pool.begin().await?;
    let device = DeviceService::create(&mut *tx, new).await?;
    tx.commit().await?;
    tracing::info!(id = %device.base.id, name = %device.name, "device created");
    Ok(success_one(device))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.pool.begin().await?;
    let device = DeviceService::retrieve(&mut *tx, id).await?;
    tx.commit().await?;
    Ok(success_one_ok(device))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let body = body.map_err(body_rejection)?;
    let changes: DeviceChanges = parse_body(&body)?;
    let mut tx = state.pool.begin().await?;
    let device = DeviceService::update(&mut *tx, Some(id), changes).await?;
    tx.commit().await?;
    Ok(success_one_ok(device))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.pool.begin().await?;
    let device = DeviceService::delete(&mut *tx, id).await?;
    tx.commit().await?;
    tracing::info!(id = %id, "device deleted");
    Ok(success_one_ok(device))
}

/// `Device: <name>(<id>)[<path>]` options.
pub async fn enum_values(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut tx = state.pool.begin().await?;
    let values = DeviceService::enum_values(&mut *tx).await?;
    tx.commit().await?;
    Ok(success_many(values))
}
