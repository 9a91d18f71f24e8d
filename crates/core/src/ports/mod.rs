pub mod property_source;
pub mod usage_log_sink;

pub use property_source::*;
pub use usage_log_sink::*;
