//! Device operations.

use sqlx::PgConnection;
use uuid::Uuid;

use super::RequestValidator;
use crate::error::AppError;
use crate::hierarchy::{device_enum_values, materialize_paths};
use crate::model::{ConfigNode, Device, DeviceChanges, EnumValue, NewDevice};
use crate::repository::Repository;
use crate::sql::{Filter, ListQuery};

type Repo = Repository<Device>;

pub struct DeviceService;

impl DeviceService {
    pub async fn count(conn: &mut PgConnection, filter: Option<&Filter>) -> Result<i64, AppError> {
        Repo::count(conn, filter).await
    }

    pub async fn list(conn: &mut PgConnection, list: &ListQuery) -> Result<Vec<Device>, AppError> {
        Repo::list(conn, list).await
    }

    pub async fn retrieve(conn: &mut PgConnection, id: Uuid) -> Result<Device, AppError> {
        Repo::retrieve_by_id(conn, id, false).await
    }

    /// The identifier is issued here; anything the client sent for it was dropped on parse.
    pub async fn create(conn: &mut PgConnection, new: NewDevice) -> Result<Device, AppError> {
        RequestValidator::new_device(&new)?;
        let new = NewDevice::new(new.name, new.config_node_id);
        Repo::create(conn, &new).await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: Option<Uuid>,
        changes: DeviceChanges,
    ) -> Result<Device, AppError> {
        RequestValidator::device_changes(&changes)?;
        Repo::update(conn, id, changes).await
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<Device, AppError> {
        Repo::delete_by_id(conn, id).await
    }

    /// `Device: <name>(<id>)[<path>]` for every device whose node has a path.
    pub async fn enum_values(conn: &mut PgConnection) -> Result<Vec<EnumValue>, AppError> {
        let links = Repository::<ConfigNode>::links(conn).await?;
        let devices = Repo::list(conn, &ListQuery::default()).await?;
        Ok(device_enum_values(&devices, &materialize_paths(&links)))
    }
}
