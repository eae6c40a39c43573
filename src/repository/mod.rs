//! Generic transactional data access for any [`Record`].
//!
//! Every operation runs on the caller's connection, normally `&mut *tx` of an open
//! transaction. Nothing here commits; dropping the transaction on error rolls back.

mod config_node;

pub use config_node::TREE_LOCK_KEY;

use std::marker::PhantomData;

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{AppError, ErrorCode};
use crate::model::{Insertable, Record};
use crate::sql::{self, Filter, ListQuery, PgBindValue, QueryBuf};

/// Data access for entity `E`. Stateless; all functions take the connection explicitly.
pub struct Repository<E>(PhantomData<E>);

fn bind_rows<'q, E: Record>(q: &'q QueryBuf) -> QueryAs<'q, Postgres, E, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_as::<_, E>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn bind_scalar(q: &QueryBuf) -> QueryScalar<'_, Postgres, i64, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn by_id(id: Uuid) -> Filter {
    Filter::eq("id", PgBindValue::from(id))
}

impl<E: Record> Repository<E> {
    /// Number of rows matching `filter`; all rows when `None`.
    pub async fn count(conn: &mut PgConnection, filter: Option<&Filter>) -> Result<i64, AppError> {
        let q = sql::count(E::TABLE, filter);
        let n = bind_scalar(&q).fetch_one(&mut *conn).await?;
        Ok(n)
    }

    /// Exactly one row matching `filter`, optionally locked until the transaction ends.
    pub async fn retrieve(
        conn: &mut PgConnection,
        filter: &Filter,
        lock_for_update: bool,
    ) -> Result<E, AppError> {
        let q = sql::select_by(E::TABLE, filter, Some(2), lock_for_update);
        let mut rows = bind_rows::<E>(&q).fetch_all(&mut *conn).await?;
        match rows.len() {
            0 => Err(ErrorCode::ResourceNotFound.into()),
            1 => Ok(rows.remove(0)),
            _ => Err(ErrorCode::MultipleResourcesFound.with_ctx("table", E::TABLE).into()),
        }
    }

    pub async fn retrieve_by_id(
        conn: &mut PgConnection,
        id: Uuid,
        lock_for_update: bool,
    ) -> Result<E, AppError> {
        Self::retrieve(conn, &by_id(id), lock_for_update).await
    }

    /// Filtered, ordered (default `updated_at DESC`), paged rows.
    pub async fn list(conn: &mut PgConnection, list: &ListQuery) -> Result<Vec<E>, AppError> {
        let q = sql::select_list(E::TABLE, list);
        let rows = bind_rows::<E>(&q).fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    /// Insert with a fresh id. The returned entity carries the server-populated fields.
    pub async fn create<N>(conn: &mut PgConnection, new: &N) -> Result<E, AppError>
    where
        N: Insertable<Record = E>,
    {
        Self::create_with_id(conn, Uuid::new_v4(), new).await
    }

    pub async fn create_with_id<N>(conn: &mut PgConnection, id: Uuid, new: &N) -> Result<E, AppError>
    where
        N: Insertable<Record = E>,
    {
        let q = sql::insert(E::TABLE, id, &new.values());
        bind_rows::<E>(&q)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| ErrorCode::NotAllowedLogicCalled.with_ctx("table", E::TABLE).into())
    }

    /// Lock the row, merge the supplied fields onto it and write it back.
    ///
    /// A concurrent update of the same row blocks on the lock and then merges onto the first
    /// writer's committed state.
    pub async fn update(
        conn: &mut PgConnection,
        id: Option<Uuid>,
        changes: E::Changes,
    ) -> Result<E, AppError> {
        let id = id.ok_or_else(|| ErrorCode::RequestBodyLack.at(&["id"]))?;
        let mut current = Self::retrieve_by_id(conn, id, true).await?;
        current.apply(changes)?;
        let q = sql::update_by_id(E::TABLE, id, &current.values());
        bind_rows::<E>(&q)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| ErrorCode::ResourceNotFound.into())
    }

    pub async fn delete(conn: &mut PgConnection, entity: &E) -> Result<(), AppError> {
        let q = sql::delete_by_id(E::TABLE, entity.id());
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let done = query.execute(&mut *conn).await?;
        if done.rows_affected() == 0 {
            return Err(ErrorCode::ResourceNotFound.into());
        }
        Ok(())
    }

    /// Delete by id after taking the row lock. Missing rows are `resource_not_found`.
    pub async fn delete_by_id(conn: &mut PgConnection, id: Uuid) -> Result<E, AppError> {
        let entity = Self::retrieve_by_id(conn, id, true).await?;
        Self::delete(conn, &entity).await?;
        Ok(entity)
    }
}
