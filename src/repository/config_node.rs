//! ConfigNode-specific queries: the hierarchy snapshot and the tree lock.

use sqlx::PgConnection;

use super::Repository;
use crate::error::AppError;
use crate::hierarchy::NodeLink;
use crate::model::ConfigNode;

/// Advisory lock key serializing parent changes across the whole ConfigNode tree.
pub const TREE_LOCK_KEY: i64 = 0x636f_6e66_6967_6e6f;

impl Repository<ConfigNode> {
    /// Every node's `(id, parent_id, name)`. Plain read, no row locks.
    pub async fn links(conn: &mut PgConnection) -> Result<Vec<NodeLink>, AppError> {
        let sql = r#"SELECT "id", "parent_id", "name" FROM "confignode""#;
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, NodeLink>(sql).fetch_all(&mut *conn).await?;
        Ok(rows)
    }

    /// Take the transaction-scoped tree lock. Released on commit or rollback.
    pub async fn lock_tree(conn: &mut PgConnection) -> Result<(), AppError> {
        let sql = "SELECT pg_advisory_xact_lock($1)";
        tracing::debug!(sql = %sql, key = TREE_LOCK_KEY, "query");
        sqlx::query(sql).bind(TREE_LOCK_KEY).execute(&mut *conn).await?;
        Ok(())
    }
}
