use std::{collections::HashMap, fmt::Debug};

use error_stack::{report, Report, ResultExt};
use google_sheets4::Sheets;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::{adapters::config::sheets_config::CredentialSource, ports::property_source::SheetLocation};

use super::{
    auth::{self, AuthError},
    http_client::{self, HttpsConnector},
};

pub struct SpreadsheetManager {
    pub(super) hub: Sheets<HttpsConnector>,
    pub sheet_title_cache: RwLock<HashMap<SheetLocation, String>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager")
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Sheets API rejected the service account credentials")]
    Authentication,
    #[error("Service account has no access to the spreadsheet")]
    PermissionDenied,
    #[error("Spreadsheet not found")]
    NotFound,
    #[error("Could not reach the Sheets API")]
    Network,
    #[error("Unexpected Sheets API response")]
    UnexpectedResponse,
    #[error("Failed to fetch sheet title")]
    FailedToFetchSheetTitle,
}

impl SpreadsheetManagerError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => SpreadsheetManagerError::Authentication,
            403 => SpreadsheetManagerError::PermissionDenied,
            404 => SpreadsheetManagerError::NotFound,
            _ => SpreadsheetManagerError::UnexpectedResponse,
        }
    }

    /// Sorts a failed API call into the failure kinds the dashboard tells apart.
    pub fn from_api_error(error: &google_sheets4::Error) -> Self {
        use google_sheets4::Error;

        match error {
            Error::MissingToken(_) | Error::MissingAPIKey => SpreadsheetManagerError::Authentication,
            Error::BadRequest(body) => Self::from_error_body(body),
            Error::Failure(response) => Self::from_status(response.status().as_u16()),
            Error::HttpError(_) | Error::Io(_) => SpreadsheetManagerError::Network,
            _ => SpreadsheetManagerError::UnexpectedResponse,
        }
    }

    /// Google error bodies look like `{"error": {"code": 403, "status": "PERMISSION_DENIED"}}`.
    fn from_error_body(body: &serde_json::Value) -> Self {
        let error = &body["error"];
        if let Some(code) = error["code"].as_u64() {
            return u16::try_from(code)
                .map(Self::from_status)
                .unwrap_or(SpreadsheetManagerError::UnexpectedResponse);
        }
        match error["status"].as_str() {
            Some("UNAUTHENTICATED") => SpreadsheetManagerError::Authentication,
            Some("PERMISSION_DENIED") => SpreadsheetManagerError::PermissionDenied,
            Some("NOT_FOUND") => SpreadsheetManagerError::NotFound,
            _ => SpreadsheetManagerError::UnexpectedResponse,
        }
    }
}

/// Wraps an API error in a report whose context is its failure kind.
pub(super) fn api_error(error: google_sheets4::Error) -> Report<SpreadsheetManagerError> {
    let context = SpreadsheetManagerError::from_api_error(&error);
    Report::new(error).change_context(context)
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(credentials: &CredentialSource) -> error_stack::Result<Self, AuthError> {
        let client = http_client::http_client();
        let auth = auth::auth(credentials, client.clone()).await?;
        let hub: Sheets<HttpsConnector> = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            hub,
            sheet_title_cache: RwLock::new(HashMap::new()),
        })
    }

    /// Title of the tab with `location.gid`. Unknown gids resolve to the first
    /// tab of the spreadsheet.
    #[instrument]
    pub async fn get_sheet_title(
        &self,
        location: &SheetLocation,
    ) -> error_stack::Result<String, SpreadsheetManagerError> {
        if let Some(title) = self.sheet_title_cache.read().await.get(location).cloned() {
            return Ok(title);
        }

        let response = self
            .hub
            .spreadsheets()
            .get(&location.spreadsheet_id)
            .add_scope(google_sheets4::api::Scope::Spreadsheet)
            .doit()
            .await
            .map_err(api_error)
            .attach_printable_lazy(|| format!("Failed to open spreadsheet {}", location))?;

        let tabs: Vec<(i32, String)> = response
            .1
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| {
                let properties = sheet.properties?;
                Some((properties.sheet_id?, properties.title?))
            })
            .collect();

        let title = match tabs.iter().find(|(gid, _)| *gid == location.gid) {
            Some((_, title)) => title.clone(),
            None => {
                let (first_gid, first_title) = tabs.first().cloned().ok_or_else(|| {
                    report!(SpreadsheetManagerError::FailedToFetchSheetTitle)
                        .attach_printable(format!("Spreadsheet {} has no tabs", location))
                })?;
                warn!(
                    "Tab with gid {} not found in {}, using first tab '{}' (gid {})",
                    location.gid, location.spreadsheet_id, first_title, first_gid
                );
                first_title
            }
        };

        let mut guard = self.sheet_title_cache.write().await;
        for (gid, tab_title) in &tabs {
            guard.insert(
                SheetLocation::new(location.spreadsheet_id.clone(), *gid),
                tab_title.clone(),
            );
        }
        guard.insert(location.clone(), title.clone());

        Ok(title)
    }
}
