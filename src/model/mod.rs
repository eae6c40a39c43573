//! Entities and their create / partial-update payloads.

mod base;
mod config_node;
mod device;
mod patch;

pub use base::{strip_read_only, Base, Insertable, Record, READ_ONLY_COLUMNS};
pub use config_node::{ConfigNode, ConfigNodeChanges, NewConfigNode};
pub use device::{generate_identifier, Device, DeviceChanges, NewDevice};
pub use patch::Patch;

use serde::Serialize;
use uuid::Uuid;

/// Selector option: `{"const": <id>, "title": <label>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    #[serde(rename = "const")]
    pub const_: Uuid,
    pub title: String,
}
