pub mod app_config;
pub mod dashboard_config;
pub mod sheets_config;
