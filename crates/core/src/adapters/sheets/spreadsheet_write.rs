use error_stack::ResultExt;
use google_sheets4::api::ValueRange;
use tracing::instrument;

use crate::{
    domain::sheets::a1_notation::{quote_sheet_title, A1Notation},
    ports::property_source::SheetLocation,
};

use super::{
    spreadsheet_manager::{api_error, SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::ValueRangeFactory,
};

pub trait SpreadsheetWrite {
    fn append_row(
        &self,
        location: &SheetLocation,
        cells: &[String],
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;
}

impl SpreadsheetWrite for SpreadsheetManager {
    /// Appends below the last non-empty row of the tab, parsing cells as if
    /// typed by a user.
    #[instrument]
    async fn append_row(
        &self,
        location: &SheetLocation,
        cells: &[String],
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let sheet_title = self.get_sheet_title(location).await?;
        let range = A1Notation(quote_sheet_title(&sheet_title));

        self.hub
            .spreadsheets()
            .values_append(
                ValueRange::from_single_row(cells),
                &location.spreadsheet_id,
                range.as_ref(),
            )
            .value_input_option("USER_ENTERED")
            .insert_data_option("INSERT_ROWS")
            .add_scope(google_sheets4::api::Scope::Spreadsheet)
            .doit()
            .await
            .map(|_| ())
            .map_err(api_error)
            .attach_printable_lazy(|| format!("Failed to append to range {} of {}", range, location))
    }
}
