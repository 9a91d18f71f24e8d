use std::sync::Arc;

use error_stack::ResultExt;
use property_rank_core::{
    adapters::{
        config::{app_config::AppConfig, sheets_config::ConfigurationError},
        sheets::{
            cached_source::CachingPropertySource, property_source::SheetsPropertySource,
            spreadsheet_manager::SpreadsheetManager, usage_log_sink::SheetsUsageLogSink,
        },
    },
    application::{
        dashboard_service::{DashboardService, DashboardSettings},
        usage_logger::UsageLogger,
    },
    ports::property_source::PropertySource,
};
use tracing::{info, instrument};

use crate::web_adapter::WebState;

pub struct DashboardFactory;

impl DashboardFactory {
    #[instrument(skip(config))]
    pub async fn create(config: &AppConfig) -> error_stack::Result<WebState, ConfigurationError> {
        let manager = Arc::new(
            SpreadsheetManager::new(&config.sheets.credentials)
                .await
                .change_context(ConfigurationError::InvalidCredentials(
                    "could not load the service account key",
                ))?,
        );

        let sheets_source = SheetsPropertySource::new(Arc::clone(&manager));
        let source: Arc<dyn PropertySource> = match config.dashboard.cache_ttl() {
            Some(ttl) => {
                info!("Caching sheet rows for {:?}", ttl);
                Arc::new(CachingPropertySource::new(sheets_source, ttl))
            }
            None => Arc::new(sheets_source),
        };

        let logger = match &config.sheets.log {
            Some(location) => {
                info!("Usage log enabled: {}", location);
                UsageLogger::new(Arc::new(SheetsUsageLogSink::new(
                    Arc::clone(&manager),
                    location.clone(),
                )))
            }
            None => {
                info!("Usage log disabled");
                UsageLogger::disabled()
            }
        };

        let service = DashboardService::new(source, logger, DashboardSettings::from(config));

        Ok(WebState {
            service: Arc::new(service),
            dashboard: Arc::new(config.dashboard.clone()),
        })
    }
}
