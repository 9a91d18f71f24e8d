use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::usage_log::LogEntry,
    ports::{
        property_source::SheetLocation,
        usage_log_sink::{LogError, UsageLogSink},
    },
};

use super::{spreadsheet_manager::SpreadsheetManager, spreadsheet_write::SpreadsheetWrite};

/// Appends usage log rows to a tab of the log spreadsheet.
#[derive(Debug)]
pub struct SheetsUsageLogSink {
    manager: Arc<SpreadsheetManager>,
    location: SheetLocation,
}

impl SheetsUsageLogSink {
    pub fn new(manager: Arc<SpreadsheetManager>, location: SheetLocation) -> Self {
        Self { manager, location }
    }
}

#[async_trait::async_trait]
impl UsageLogSink for SheetsUsageLogSink {
    #[instrument(skip(self), fields(location = %self.location))]
    async fn append(&self, entry: &LogEntry) -> error_stack::Result<(), LogError> {
        self.manager
            .append_row(&self.location, &entry.to_cells())
            .await
            .change_context(LogError::AppendFailed)
    }
}
