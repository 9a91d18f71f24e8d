use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::{property::SheetRows, sheets::a1_notation::RowSpan},
    ports::property_source::{FetchError, PropertySource, SheetLocation},
};

use super::{
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    spreadsheet_read::SpreadsheetRead,
};

impl From<SpreadsheetManagerError> for FetchError {
    fn from(error: SpreadsheetManagerError) -> Self {
        match error {
            SpreadsheetManagerError::Authentication => FetchError::Authentication,
            SpreadsheetManagerError::PermissionDenied => FetchError::PermissionDenied,
            SpreadsheetManagerError::NotFound => FetchError::NotFound,
            SpreadsheetManagerError::Network => FetchError::Network,
            SpreadsheetManagerError::UnexpectedResponse
            | SpreadsheetManagerError::FailedToFetchSheetTitle => FetchError::Unexpected,
        }
    }
}

/// Reads property rows straight from Google Sheets, on every call.
#[derive(Debug)]
pub struct SheetsPropertySource {
    manager: Arc<SpreadsheetManager>,
}

impl SheetsPropertySource {
    pub fn new(manager: Arc<SpreadsheetManager>) -> Self {
        Self { manager }
    }
}

#[async_trait::async_trait]
impl PropertySource for SheetsPropertySource {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        location: &SheetLocation,
        row_cap: Option<u32>,
    ) -> error_stack::Result<SheetRows, FetchError> {
        let rows = self
            .manager
            .read_rows(location, RowSpan::first_rows(row_cap))
            .await
            .map_err(|report| {
                let context = FetchError::from(*report.current_context());
                report.change_context(context)
            })
            .attach_printable_lazy(|| format!("Failed to fetch property rows from {}", location))?;

        tracing::debug!("Fetched {} rows from {}", rows.len(), location);
        Ok(Arc::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_errors_map_to_fetch_errors() {
        assert_eq!(
            FetchError::from(SpreadsheetManagerError::PermissionDenied),
            FetchError::PermissionDenied
        );
        assert_eq!(
            FetchError::from(SpreadsheetManagerError::Network),
            FetchError::Network
        );
        assert_eq!(
            FetchError::from(SpreadsheetManagerError::FailedToFetchSheetTitle),
            FetchError::Unexpected
        );
    }
}
