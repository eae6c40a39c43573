//! `/config-nodes` handlers. One transaction per request, committed on success.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use super::{body_rejection, page_bounds, parse_body, parse_id, query_error};
use crate::error::AppError;
use crate::model::{ConfigNodeChanges, NewConfigNode};
use crate::response::{success_many, success_one, success_one_ok, success_page};
use crate::service::ConfigNodeService;
use crate::sql::{Filter, ListQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigNodeListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl ConfigNodeListParams {
    fn filter(&self) -> Option<Filter> {
        Filter::all(
            self.name
                .clone()
                .map(|n| Filter::eq("name", n))
                .into_iter()
                .chain(self.parent_id.map(|p| Filter::eq("parent_id", p))),
        )
    }
}

pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ConfigNodeListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(query_error)?;
    let filter = params.filter();
    let (offset, limit) = page_bounds(params.offset, params.limit);
    let mut tx = state.pool.begin().await?;
    let total = ConfigNodeService::count(&mut *tx, filter.as_ref()).await?;
    let query = ListQuery {
        filter,
        ..Default::default()
    }
    .page(Some(offset), Some(limit));
    let rows = ConfigNodeService::list(&mut *tx, &query).await?;
    tx.commit().await?;
    Ok(success_page(rows, total))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.map_err(body_rejection)?;
    let new: NewConfigNode = parse_body(&body)?;
    let mut tx = state.pool.begin().await?;
    let node = ConfigNodeService::create(&mut *tx, new).await?;
    tx.commit().await?;
    tracing::info!(id = %node.base.id, name = %node.name, "config node created");
    Ok(success_one(node))
}

pub async fn read(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.pool.begin().await?;
    let node = ConfigNodeService::retrieve(&mut *tx, id).await?;
    tx.commit().await?;
    Ok(success_one_ok(node))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let body = body.map_err(body_rejection)?;
    let changes: ConfigNodeChanges = parse_body(&body)?;
    let mut tx = state.pool.begin().await?;
    let node = ConfigNodeService::update(&mut *tx, Some(id), changes).await?;
    tx.commit().await?;
    Ok(success_one_ok(node))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let mut tx = state.pool.begin().await?;
    let node = ConfigNodeService::delete(&mut *tx, id).await?;
    tx.commit().await?;
    tracing::info!(id = %id, "config node deleted");
    Ok(success_one_ok(node))
}

/// Selector options titled with materialized paths.
pub async fn enum_values(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut tx = state.pool.begin().await?;
    let values = ConfigNodeService::enum_values(&mut *tx).await?;
    tx.commit().await?;
    Ok(success_many(values))
}
