//! autoinstall-admin: config-node hierarchy and device administration on PostgreSQL.
//!
//! Layers, bottom up: [`sql`] builds statements, [`repository`] runs them inside the caller's
//! transaction, [`hierarchy`] keeps the node tree acyclic and renders paths, [`service`]
//! validates payloads, and [`routes`] exposes it all over HTTP. Every failure crosses the
//! boundary as an [`ErrorStruct`].

pub mod error;
pub mod handlers;
pub mod hierarchy;
pub mod model;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ErrorClass, ErrorCode, ErrorStruct};
pub use hierarchy::{device_label, ensure_acyclic, materialize_paths, MaterializedPath, NodeLink};
pub use model::{ConfigNode, Device, EnumValue, NewConfigNode, NewDevice, Patch};
pub use repository::Repository;
pub use response::{success_many, success_one};
pub use routes::{app, common_routes_with_ready};
pub use service::{ConfigNodeService, DeviceService};
pub use settings::{Settings, SettingsError};
pub use state::AppState;
pub use store::{connect, ensure_database_exists, ensure_schema};
