pub mod config;
pub mod telemetry;
pub mod views;

pub use config::{DatabaseConfig, ServiceConfig};
pub use views::{TableView, TransformSpec, ViewRegistry};
