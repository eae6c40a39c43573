//! Device: attached to exactly one ConfigNode, identified by a server-issued token.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::base::{Base, Insertable, Record};
use super::patch::Patch;
use crate::error::ErrorStruct;
use crate::sql::PgBindValue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct Device {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    /// Issued at creation, never changed afterwards.
    pub identifier: String,
    pub config_node_id: Uuid,
}

impl Record for Device {
    const TABLE: &'static str = "device";
    type Changes = DeviceChanges;

    fn base(&self) -> &Base {
        &self.base
    }

    fn values(&self) -> Vec<(&'static str, PgBindValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("config_node_id", self.config_node_id.into()),
        ]
    }

    fn apply(&mut self, changes: DeviceChanges) -> Result<(), ErrorStruct> {
        changes.name.apply_required("name", &mut self.name)?;
        changes
            .config_node_id
            .apply_required("config_node_id", &mut self.config_node_id)?;
        Ok(())
    }
}

/// 16 random bytes, hex encoded.
pub fn generate_identifier() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub config_node_id: Uuid,
    #[serde(skip, default = "generate_identifier")]
    pub identifier: String,
}

impl NewDevice {
    pub fn new(name: impl Into<String>, config_node_id: Uuid) -> Self {
        NewDevice {
            name: name.into(),
            config_node_id,
            identifier: generate_identifier(),
        }
    }
}

impl Insertable for NewDevice {
    type Record = Device;

    fn values(&self) -> Vec<(&'static str, PgBindValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("identifier", self.identifier.clone().into()),
            ("config_node_id", self.config_node_id.into()),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceChanges {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub config_node_id: Patch<Uuid>,
}
