pub mod auth;
pub mod cached_source;
pub mod http_client;
pub mod property_source;
pub mod spreadsheet_manager;
pub mod spreadsheet_read;
pub mod spreadsheet_write;
pub mod string_rows;
pub mod usage_log_sink;
pub mod value_range_factory;
