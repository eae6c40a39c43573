//! Entity services: payload validation and hierarchy rules in front of [`crate::repository`].

mod config_node;
mod device;
mod validation;
pub use config_node::ConfigNodeService;
pub use device::DeviceService;
pub use validation::RequestValidator;
