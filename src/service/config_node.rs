//! ConfigNode operations: validation and the hierarchy check in front of the repository.

use sqlx::PgConnection;
use uuid::Uuid;

use super::RequestValidator;
use crate::error::AppError;
use crate::hierarchy::{self, config_node_enum_values, ensure_acyclic, materialize_paths};
use crate::model::{ConfigNode, ConfigNodeChanges, EnumValue, NewConfigNode, Patch};
use crate::repository::Repository;
use crate::sql::{Filter, ListQuery};

type Repo = Repository<ConfigNode>;

pub struct ConfigNodeService;

impl ConfigNodeService {
    pub async fn count(conn: &mut PgConnection, filter: Option<&Filter>) -> Result<i64, AppError> {
        Repo::count(conn, filter).await
    }

    pub async fn list(conn: &mut PgConnection, list: &ListQuery) -> Result<Vec<ConfigNode>, AppError> {
        Repo::list(conn, list).await
    }

    pub async fn retrieve(conn: &mut PgConnection, id: Uuid) -> Result<ConfigNode, AppError> {
        Repo::retrieve_by_id(conn, id, false).await
    }

    pub async fn create(conn: &mut PgConnection, new: NewConfigNode) -> Result<ConfigNode, AppError> {
        RequestValidator::new_config_node(&new)?;
        let id = Uuid::new_v4();
        if let Some(parent_id) = new.parent_id {
            Self::check_parent(conn, id, parent_id).await?;
        }
        Repo::create_with_id(conn, id, &new).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: Option<Uuid>,
        changes: ConfigNodeChanges,
    ) -> Result<ConfigNode, AppError> {
        RequestValidator::config_node_changes(&changes)?;
        if let (Some(id), Patch::Value(parent_id)) = (id, &changes.parent_id) {
            Self::check_parent(conn, id, *parent_id).await?;
        }
        Repo::update(conn, id, changes).await
    }

    /// Nodes that still have children or devices are refused by the foreign keys.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<ConfigNode, AppError> {
        Repo::delete_by_id(conn, id).await
    }

    /// Every reachable node labelled with its materialized path, parents before children.
    pub async fn enum_values(conn: &mut PgConnection) -> Result<Vec<EnumValue>, AppError> {
        let links = Repo::links(conn).await?;
        Ok(config_node_enum_values(materialize_paths(&links)))
    }

    /// Serialize on the tree lock, then make sure `parent_id` does not descend from `node_id`.
    async fn check_parent(conn: &mut PgConnection, node_id: Uuid, parent_id: Uuid) -> Result<(), AppError> {
        Repo::lock_tree(conn).await?;
        let links = Repo::links(conn).await?;
        ensure_acyclic(&hierarchy::parent_map(&links), node_id, parent_id)?;
        Ok(())
    }
}
