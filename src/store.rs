//! Database bootstrap: create the database if missing, open the pool, and lay down the schema.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::error::{AppError, NamingConvention};
use crate::settings::{Settings, SettingsError};

/// Advisory lock key held while the DDL runs, so concurrent starts do not race.
const SCHEMA_LOCK_KEY: i64 = 0x6175_746f_7363_6865;

/// Create the database named in `database_url` if it does not exist yet.
/// Connects to the `postgres` maintenance database on the same server to do so.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), SettingsError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| SettingsError::Invalid {
            key: "DATABASE_URL",
            value: url.to_string(),
        })?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (path_and_query, None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.trim().to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Open the connection pool described by `settings`. Connections are established on demand.
pub async fn connect(settings: &Settings) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .acquire_timeout(settings.database_connect_timeout)
        .connect(&settings.database_url)
        .await?;
    Ok(pool)
}

/// Idempotent DDL for `confignode` and `device`. Constraint and index names follow
/// [`NamingConvention`] so storage errors can be traced back to their column.
pub fn schema_ddl() -> Vec<String> {
    use NamingConvention::*;

    let pk = |table: &str| PrimaryKey.render(&[("table_name", table)]);
    let ix = |table: &str, column: &str| {
        Index.render(&[("table_name", table), ("column_0_name", column)])
    };
    let fk = |table: &str, column: &str, referred: &str| {
        ForeignKey.render(&[
            ("table_name", table),
            ("column_0_name", column),
            ("referred_table_name", referred),
        ])
    };

    vec![
        format!(
            r#"CREATE TABLE IF NOT EXISTS "confignode" (
                "id" UUID NOT NULL,
                "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                "updated_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                "name" TEXT NOT NULL,
                "parent_id" UUID,
                "autoinstall_config" TEXT NOT NULL,
                CONSTRAINT {} PRIMARY KEY ("id"),
                CONSTRAINT {} FOREIGN KEY ("parent_id") REFERENCES "confignode" ("id")
            )"#,
            quote_ident(&pk("confignode")),
            quote_ident(&fk("confignode", "parent_id", "confignode")),
        ),
        format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS {} ON "confignode" ("name")"#,
            quote_ident(&ix("confignode", "name"))
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "device" (
                "id" UUID NOT NULL,
                "created_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                "updated_at" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                "name" TEXT NOT NULL,
                "identifier" TEXT NOT NULL,
                "config_node_id" UUID NOT NULL,
                CONSTRAINT {} PRIMARY KEY ("id"),
                CONSTRAINT {} FOREIGN KEY ("config_node_id") REFERENCES "confignode" ("id")
            )"#,
            quote_ident(&pk("device")),
            quote_ident(&fk("device", "config_node_id", "confignode")),
        ),
        format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS {} ON "device" ("name")"#,
            quote_ident(&ix("device", "name"))
        ),
        format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS {} ON "device" ("identifier")"#,
            quote_ident(&ix("device", "identifier"))
        ),
    ]
}

/// Run [`schema_ddl`] in one transaction under an advisory lock.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for ddl in schema_ddl() {
        tracing::debug!(sql = %ddl, "ddl");
        sqlx::query(&ddl).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_url_points_at_postgres() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@db:5432/autoinstall").unwrap();
        assert_eq!(admin, "postgres://u:p@db:5432/postgres");
        assert_eq!(name, "autoinstall");
    }

    #[test]
    fn query_string_is_kept_on_admin_url() {
        let (admin, name) =
            parse_db_name_from_url("postgres://localhost/autoinstall?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres?sslmode=disable");
        assert_eq!(name, "autoinstall");
    }

    #[test]
    fn url_without_path_is_rejected() {
        assert_eq!(
            parse_db_name_from_url("postgres://localhost").unwrap_err(),
            SettingsError::Invalid {
                key: "DATABASE_URL",
                value: "postgres://localhost".into(),
            }
        );
    }

    #[tokio::test]
    async fn bad_database_url_fails_before_connecting() {
        let err = ensure_database_exists("postgres://localhost").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(err.is(crate::error::ErrorCode::UnknownServerError));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn ddl_names_constraints_by_convention() {
        let ddl = schema_ddl().join("\n");
        for name in [
            "pk_confignode",
            "fk_confignode_parent_id_confignode",
            "ix_confignode_name",
            "pk_device",
            "fk_device_config_node_id_confignode",
            "ix_device_name",
            "ix_device_identifier",
        ] {
            assert!(ddl.contains(&format!("\"{}\"", name)), "missing {}", name);
        }
    }
}
