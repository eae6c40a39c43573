//! ConfigNode: a node in the self-referential configuration hierarchy.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::base::{Base, Insertable, Record};
use super::patch::Patch;
use crate::error::ErrorStruct;
use crate::sql::PgBindValue;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct ConfigNode {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub parent_id: Option<Uuid>,
    /// Serialized autoinstall configuration; opaque to this crate beyond being valid JSON.
    pub autoinstall_config: String,
}

impl Record for ConfigNode {
    const TABLE: &'static str = "confignode";
    type Changes = ConfigNodeChanges;

    fn base(&self) -> &Base {
        &self.base
    }

    fn values(&self) -> Vec<(&'static str, PgBindValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("parent_id", self.parent_id.into()),
            ("autoinstall_config", self.autoinstall_config.clone().into()),
        ]
    }

    fn apply(&mut self, changes: ConfigNodeChanges) -> Result<(), ErrorStruct> {
        changes.name.apply_required("name", &mut self.name)?;
        changes.parent_id.apply_nullable(&mut self.parent_id);
        changes
            .autoinstall_config
            .apply_required("autoinstall_config", &mut self.autoinstall_config)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewConfigNode {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub autoinstall_config: String,
}

impl Insertable for NewConfigNode {
    type Record = ConfigNode;

    fn values(&self) -> Vec<(&'static str, PgBindValue)> {
        vec![
            ("name", self.name.clone().into()),
            ("parent_id", self.parent_id.into()),
            ("autoinstall_config", self.autoinstall_config.clone().into()),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigNodeChanges {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub parent_id: Patch<Uuid>,
    #[serde(default)]
    pub autoinstall_config: Patch<String>,
}
