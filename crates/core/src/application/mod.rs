pub mod dashboard_service;
pub mod usage_logger;

pub use dashboard_service::*;
pub use usage_logger::*;
