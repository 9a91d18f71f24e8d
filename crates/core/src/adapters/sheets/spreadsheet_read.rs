use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::sheets::a1_notation::{RowSpan, ToA1Notation},
    ports::property_source::SheetLocation,
};

use super::{
    spreadsheet_manager::{api_error, SpreadsheetManager, SpreadsheetManagerError},
    string_rows::IntoStringRows,
};

pub trait SpreadsheetRead {
    fn read_rows(
        &self,
        location: &SheetLocation,
        span: RowSpan,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError>,
    > + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    /// Cells come back as displayed in the sheet. Trailing empty cells and
    /// rows are omitted by the API.
    #[instrument]
    async fn read_rows(
        &self,
        location: &SheetLocation,
        span: RowSpan,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        let sheet_title = self.get_sheet_title(location).await?;
        let range = span.to_a1_notation(Some(&sheet_title));

        let response = self
            .hub
            .spreadsheets()
            .values_get(&location.spreadsheet_id, range.as_ref())
            .value_render_option("FORMATTED_VALUE")
            .add_scope(google_sheets4::api::Scope::Spreadsheet)
            .doit()
            .await
            .map_err(api_error)
            .attach_printable_lazy(|| format!("Failed to fetch range {} of {}", range, location))?;

        Ok(response.1.values.unwrap_or_default().into_string_rows())
    }
}
