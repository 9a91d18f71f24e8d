use std::fmt;

use thiserror::Error;

use crate::domain::property::SheetRows;

/// A spreadsheet tab, addressed by document id and tab id (gid).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetLocation {
    pub spreadsheet_id: String,
    pub gid: i32,
}

impl SheetLocation {
    pub fn new(spreadsheet_id: impl Into<String>, gid: i32) -> Self {
        SheetLocation {
            spreadsheet_id: spreadsheet_id.into(),
            gid,
        }
    }
}

impl fmt::Display for SheetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#gid={}", self.spreadsheet_id, self.gid)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("could not authenticate with the service account")]
    Authentication,
    #[error("the service account has no access to the sheet")]
    PermissionDenied,
    #[error("the sheet was not found")]
    NotFound,
    #[error("the sheet could not be reached")]
    Network,
    #[error("the sheet has no data below the header row")]
    InsufficientData,
    #[error("unexpected response from the sheet")]
    Unexpected,
}

#[async_trait::async_trait]
pub trait PropertySource: Send + Sync {
    /// Reads the tab from its first row through `row_cap`, or the whole tab
    /// when no cap is given. Rows keep the order they have in the sheet.
    async fn fetch(
        &self,
        location: &SheetLocation,
        row_cap: Option<u32>,
    ) -> error_stack::Result<SheetRows, FetchError>;

    /// Forgets anything remembered about `location`. Sources without a cache
    /// have nothing to do.
    async fn invalidate(&self, _location: &SheetLocation) {}
}
