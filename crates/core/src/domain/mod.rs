pub mod format;
pub mod history;
pub mod property;
pub mod ranking;
pub mod sheets;
pub mod usage_log;

// Re-export commonly used types
pub use property::*;
pub use ranking::*;
