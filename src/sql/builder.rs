//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for one table.

use super::filter::{Filter, ListQuery, DEFAULT_ORDER};
use super::params::PgBindValue;
use uuid::Uuid;

/// Quote identifier for PostgreSQL (safe: only from code).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    pub(crate) fn push_param(&mut self, v: PgBindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }

    fn where_clause(&mut self, filter: Option<&Filter>) -> String {
        match filter {
            Some(f) => format!(" WHERE {}", f.render(self)),
            None => String::new(),
        }
    }
}

/// SELECT COUNT(*) with optional filter.
pub fn count(table: &str, filter: Option<&Filter>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(filter);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(table), where_clause);
    q
}

/// SELECT rows matching `filter`, at most `limit`, optionally locking them (`FOR UPDATE`).
pub fn select_by(table: &str, filter: &Filter, limit: Option<i64>, for_update: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(Some(filter));
    let limit_clause = limit
        .map(|n| format!(" LIMIT ${}", q.push_param(n.into())))
        .unwrap_or_default();
    let lock_clause = if for_update { " FOR UPDATE" } else { "" };
    q.sql = format!(
        "SELECT * FROM {}{}{}{}",
        quoted(table),
        where_clause,
        limit_clause,
        lock_clause
    );
    q
}

/// SELECT list: filter, ORDER BY (default `updated_at DESC`), then OFFSET / LIMIT.
pub fn select_list(table: &str, list: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = q.where_clause(list.filter.as_ref());
    let order = list
        .order_by
        .as_deref()
        .filter(|o| !o.is_empty())
        .unwrap_or(&DEFAULT_ORDER);
    let order_clause = format!(
        " ORDER BY {}",
        order.iter().map(|o| o.render()).collect::<Vec<_>>().join(", ")
    );
    let offset_clause = list
        .offset
        .map(|n| format!(" OFFSET ${}", q.push_param(n.into())))
        .unwrap_or_default();
    let limit_clause = list
        .limit
        .map(|n| format!(" LIMIT ${}", q.push_param(n.into())))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT * FROM {}{}{}{}{}",
        quoted(table),
        where_clause,
        order_clause,
        offset_clause,
        limit_clause
    );
    q
}

/// INSERT one row with an explicit id; timestamps come from column defaults.
pub fn insert(table: &str, id: Uuid, values: &[(&'static str, PgBindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec![quoted("id")];
    let mut placeholders = vec![format!("${}", q.push_param(id.into()))];
    for (col, v) in values {
        cols.push(quoted(col));
        placeholders.push(format!("${}", q.push_param(v.clone())));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        quoted(table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE the writable columns of one row by id and stamp `updated_at`.
pub fn update_by_id(table: &str, id: Uuid, values: &[(&'static str, PgBindValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets: Vec<String> = values
        .iter()
        .map(|(col, v)| format!("{} = ${}", quoted(col), q.push_param(v.clone())))
        .collect();
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(id.into());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        quoted(table),
        sets.join(", "),
        quoted("id"),
        id_param
    );
    q
}

/// DELETE one row by id.
pub fn delete_by_id(table: &str, id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_param = q.push_param(id.into());
    q.sql = format!("DELETE FROM {} WHERE {} = ${}", quoted(table), quoted("id"), id_param);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::filter::OrderBy;

    #[test]
    fn count_without_filter_counts_all() {
        let q = count("confignode", None);
        assert_eq!(q.sql, r#"SELECT COUNT(*) FROM "confignode""#);
        assert!(q.params.is_empty());
    }

    #[test]
    fn locked_select_limits_to_two_rows() {
        let id = Uuid::nil();
        let q = select_by("device", &Filter::eq("id", id), Some(2), true);
        assert_eq!(
            q.sql,
            r#"SELECT * FROM "device" WHERE "id" = $1 LIMIT $2 FOR UPDATE"#
        );
        assert_eq!(q.params, vec![PgBindValue::Uuid(Some(id)), PgBindValue::I64(2)]);
    }

    #[test]
    fn list_defaults_to_most_recently_updated() {
        let q = select_list("confignode", &ListQuery::default());
        assert_eq!(q.sql, r#"SELECT * FROM "confignode" ORDER BY "updated_at" DESC"#);
    }

    #[test]
    fn list_composes_filter_order_and_paging() {
        let list = ListQuery {
            filter: Filter::all([Filter::IsNull("parent_id"), Filter::ne("name", "x")]),
            order_by: Some(vec![OrderBy::asc("name")]),
            offset: Some(20),
            limit: Some(10),
        };
        let q = select_list("confignode", &list);
        assert_eq!(
            q.sql,
            r#"SELECT * FROM "confignode" WHERE ("parent_id" IS NULL) AND ("name" <> $1) ORDER BY "name" ASC OFFSET $2 LIMIT $3"#
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn empty_in_matches_nothing() {
        let q = count("device", Some(&Filter::In("id", vec![])));
        assert_eq!(q.sql, r#"SELECT COUNT(*) FROM "device" WHERE FALSE"#);
    }

    #[test]
    fn update_never_touches_id_or_created_at() {
        let id = Uuid::nil();
        let q = update_by_id("device", id, &[("name", "d1".into())]);
        assert_eq!(
            q.sql,
            r#"UPDATE "device" SET "name" = $1, "updated_at" = NOW() WHERE "id" = $2 RETURNING *"#
        );
        assert!(!q.sql.contains("created_at"));
    }

    #[test]
    fn insert_binds_id_first() {
        let id = Uuid::nil();
        let q = insert("confignode", id, &[("name", "A".into()), ("parent_id", PgBindValue::Uuid(None))]);
        assert_eq!(
            q.sql,
            r#"INSERT INTO "confignode" ("id", "name", "parent_id") VALUES ($1, $2, $3) RETURNING *"#
        );
        assert_eq!(q.params[0], PgBindValue::Uuid(Some(id)));
    }
}
