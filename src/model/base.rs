//! Identity and audit fields shared by every entity, and the capability traits the repository
//! is generic over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ErrorStruct;
use crate::sql::PgBindValue;

/// Columns the server owns. Never written from a client payload.
pub const READ_ONLY_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Base {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted entity: has a [`Base`], lives in one table, and knows how to merge a partial
/// update onto itself.
pub trait Record: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    const TABLE: &'static str;

    /// Partial-update payload. Absent fields leave the row untouched.
    type Changes: Send;

    fn base(&self) -> &Base;

    fn id(&self) -> Uuid {
        self.base().id
    }

    /// Client-writable columns and their current values. Base fields are never included.
    fn values(&self) -> Vec<(&'static str, PgBindValue)>;

    /// Merge explicitly supplied fields onto `self`.
    fn apply(&mut self, changes: Self::Changes) -> Result<(), ErrorStruct>;
}

/// A create payload for some [`Record`].
pub trait Insertable: Send + Sync {
    type Record: Record;

    fn values(&self) -> Vec<(&'static str, PgBindValue)>;
}

/// Drop server-owned keys from a submitted JSON object.
pub fn strip_read_only(obj: &mut Map<String, Value>) {
    for col in READ_ONLY_COLUMNS {
        obj.remove(col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_read_only_keeps_other_keys() {
        let mut obj = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "created_at": "2020-01-01T00:00:00Z",
            "updated_at": "2020-01-01T00:00:00Z",
            "name": "A"
        })
        .as_object()
        .cloned()
        .unwrap();
        strip_read_only(&mut obj);
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["name"], "A");
    }
}
