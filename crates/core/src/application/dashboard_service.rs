use std::sync::Arc;

use error_stack::ResultExt;
use tracing::{info, instrument};

use crate::{
    domain::{
        history::{self, ComparisonUnavailable, PriceComparison, YearRank},
        property::{ColumnLayout, PropertyRecord, RawTable},
        ranking::{RankingProcessor, RankingQuery, RankingView},
        sheets::row::Row,
        usage_log::{LogEntry, UsageEvent},
    },
    ports::property_source::{FetchError, PropertySource, SheetLocation},
};

use super::usage_logger::UsageLogger;

/// What the dashboard reads and how it presents values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub location: SheetLocation,
    pub row_cap: Option<u32>,
    pub header_row: Row,
    pub preferred_year: Option<i32>,
    pub value_unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardRequest {
    pub query: RankingQuery,
    /// Overrides the configured value year for this request.
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingPage {
    pub view: RankingView,
    pub zones: Vec<String>,
    pub years: Vec<i32>,
    pub selected_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDetail {
    pub row_index: usize,
    pub sheet_row: Row,
    pub identifier: String,
    pub zone: Option<String>,
    /// `None` when the unit has no value in the ranked year.
    pub record: Option<PropertyRecord>,
    pub value_year: Option<i32>,
    pub history: Vec<YearRank>,
    pub comparison: Result<PriceComparison, ComparisonUnavailable>,
}

/// One pass of the dashboard per call: fetch (possibly cached), rank, log.
pub struct DashboardService {
    source: Arc<dyn PropertySource>,
    logger: UsageLogger,
    settings: DashboardSettings,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn PropertySource>,
        logger: UsageLogger,
        settings: DashboardSettings,
    ) -> Self {
        DashboardService {
            source,
            logger,
            settings,
        }
    }

    async fn load_table(&self) -> error_stack::Result<RawTable, FetchError> {
        let rows = self
            .source
            .fetch(&self.settings.location, self.settings.row_cap)
            .await?;

        RawTable::from_sheet_rows(rows, self.settings.header_row)
            .change_context(FetchError::InsufficientData)
            .attach_printable_lazy(|| format!("Sheet {}", self.settings.location))
    }

    /// Layout for the configured year, moved to `year` when the sheet has it.
    fn layout_for(&self, table: &RawTable, year: Option<i32>) -> ColumnLayout {
        let layout = ColumnLayout::detect(table.header(), self.settings.preferred_year);
        match year {
            Some(year) => layout.with_value_year(year).unwrap_or(layout),
            None => layout,
        }
    }

    #[instrument(skip(self))]
    pub async fn ranking(
        &self,
        request: &DashboardRequest,
    ) -> error_stack::Result<RankingPage, FetchError> {
        let table = self.load_table().await?;
        let layout = self.layout_for(&table, request.year);

        let processor =
            RankingProcessor::new(layout.clone()).with_value_unit(&self.settings.value_unit);
        let view = processor.process(table.rows(), &request.query);

        info!(
            "Ranked {} of {} rows ({} dropped)",
            view.len(),
            table.len(),
            view.dropped_count()
        );

        let event = match request.query.search_text() {
            Some(_) => UsageEvent::Search,
            None => UsageEvent::View,
        };
        self.logger.log(
            LogEntry::now(event)
                .with_query(&request.query.filter_text)
                .with_result_count(view.len()),
        );

        Ok(RankingPage {
            zones: layout.distinct_zones(table.rows()),
            years: layout.years().iter().map(|column| column.year).collect(),
            selected_year: layout.value_year(),
            view,
        })
    }

    /// Detail for the data row at `row_index`, or `None` when the sheet has no
    /// such row.
    #[instrument(skip(self))]
    pub async fn unit_detail(
        &self,
        row_index: usize,
        year: Option<i32>,
    ) -> error_stack::Result<Option<UnitDetail>, FetchError> {
        let table = self.load_table().await?;
        let rows = table.rows();
        let Some(row) = rows.get(row_index) else {
            return Ok(None);
        };
        let layout = self.layout_for(&table, year);

        let comparison = match history::base_year(&layout) {
            Some(base_year) => history::closest_in_other_zone(&layout, rows, row_index, base_year),
            None => Err(ComparisonUnavailable::NoBaseYear(history::DEFAULT_BASE_YEAR)),
        };

        let identifier = layout.identifier_of(row);
        self.logger
            .log(LogEntry::now(UsageEvent::Detail).with_subject(identifier.clone()));

        Ok(Some(UnitDetail {
            row_index,
            sheet_row: table.sheet_row(row_index),
            identifier,
            zone: layout
                .zone_of(row)
                .filter(|zone| !zone.is_empty())
                .map(str::to_string),
            record: PropertyRecord::from_row(&layout, row_index, row).ok(),
            value_year: layout.value_year(),
            history: history::rank_history(&layout, rows, row_index),
            comparison,
        }))
    }

    /// Drops cached rows so the next request fetches the sheet again.
    #[instrument(skip(self))]
    pub async fn reload(&self) {
        self.source.invalidate(&self.settings.location).await;
        self.logger.log(LogEntry::now(UsageEvent::Reload));
        info!("Reloading {}", self.settings.location);
    }
}
