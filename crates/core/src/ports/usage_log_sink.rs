use thiserror::Error;

use crate::domain::usage_log::LogEntry;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to append usage log row")]
    AppendFailed,
}

#[async_trait::async_trait]
pub trait UsageLogSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> error_stack::Result<(), LogError>;
}
