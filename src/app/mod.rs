pub mod data_table_service;

pub use data_table_service::{DataTableService, ServiceOptions};
