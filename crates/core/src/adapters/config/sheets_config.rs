use std::{fmt, path::PathBuf};

use error_stack::report;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::sheets::row::Row, ports::property_source::SheetLocation};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no service account credentials configured: set `gcp_service_account` or `SERVICE_ACCOUNT_FILE`")]
    MissingCredentials,
    #[error("invalid service account credentials: {0}")]
    InvalidCredentials(&'static str),
    #[error("could not read configuration sources")]
    Source,
    #[error("invalid configuration at `{0}`")]
    Deserialize(String),
}

/// Built-in sheet settings, used for anything the overrides leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetsDefaults {
    pub main_sheet_id: &'static str,
    pub main_gid: i32,
    pub max_data_rows: u32,
    pub log_sheet_id: &'static str,
    pub log_gid: i32,
    pub header_row: u32,
}

pub const DEFAULTS: SheetsDefaults = SheetsDefaults {
    main_sheet_id: "1QGSM-mICX9KYa5Izym6sFKVaWwO-o0j86V-KmJ-w0IM",
    main_gid: 0,
    max_data_rows: 10337,
    log_sheet_id: "1-V5Ux8yto_8WE6epumN1aWT_D5t_1Dx14VWBZ0SvbbU",
    log_gid: 0,
    // The district sheet keeps a title row above its header.
    header_row: 2,
};

/// Settings read from the config file and environment. Every field is optional.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SheetsOverrides {
    pub main_sheet_id: Option<String>,
    pub main_gid: Option<i32>,
    /// `0` reads the whole tab.
    pub max_data_rows: Option<u32>,
    /// An empty string turns usage logging off.
    pub log_sheet_id: Option<String>,
    pub log_gid: Option<i32>,
    pub header_row: Option<u32>,
    pub gcp_service_account: Option<ServiceAccountInfo>,
    #[serde(alias = "SERVICE_ACCOUNT_FILE")]
    pub service_account_file: Option<String>,
}

/// Inline service account, in the layout of the JSON key Google issues.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServiceAccountInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_uri: Option<String>,
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_provider_x509_cert_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_x509_cert_url: Option<String>,
}

impl fmt::Debug for ServiceAccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountInfo")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ServiceAccountInfo {
    /// Secret stores often keep the PEM on one line with literal `\n` escapes.
    fn with_unescaped_key(mut self) -> Self {
        self.private_key = self.private_key.replace("\\n", "\n");
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Inline(ServiceAccountInfo),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub main: SheetLocation,
    pub max_data_rows: Option<u32>,
    pub log: Option<SheetLocation>,
    pub header_row: Row,
    pub credentials: CredentialSource,
}

impl SheetsConfig {
    /// Overrides win over `defaults`. Only the credentials have no default.
    pub fn resolve(
        defaults: &SheetsDefaults,
        overrides: SheetsOverrides,
    ) -> error_stack::Result<Self, ConfigurationError> {
        let credentials = resolve_credentials(
            overrides.gcp_service_account,
            overrides.service_account_file,
        )?;

        let main_sheet_id = overrides
            .main_sheet_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| defaults.main_sheet_id.to_string());

        let max_data_rows = match overrides.max_data_rows.unwrap_or(defaults.max_data_rows) {
            0 => None,
            cap => Some(cap),
        };

        let log_sheet_id = overrides
            .log_sheet_id
            .unwrap_or_else(|| defaults.log_sheet_id.to_string());
        let log = (!log_sheet_id.trim().is_empty()).then(|| {
            SheetLocation::new(
                log_sheet_id.trim(),
                overrides.log_gid.unwrap_or(defaults.log_gid),
            )
        });

        Ok(SheetsConfig {
            main: SheetLocation::new(
                main_sheet_id.trim(),
                overrides.main_gid.unwrap_or(defaults.main_gid),
            ),
            max_data_rows,
            log,
            header_row: Row::from_row(overrides.header_row.unwrap_or(defaults.header_row)),
            credentials,
        })
    }
}

fn resolve_credentials(
    inline: Option<ServiceAccountInfo>,
    file: Option<String>,
) -> error_stack::Result<CredentialSource, ConfigurationError> {
    if let Some(info) = inline {
        if info.private_key.trim().is_empty() {
            return Err(report!(ConfigurationError::InvalidCredentials(
                "`private_key` is empty"
            )));
        }
        if info.client_email.trim().is_empty() {
            return Err(report!(ConfigurationError::InvalidCredentials(
                "`client_email` is empty"
            )));
        }
        return Ok(CredentialSource::Inline(info.with_unescaped_key()));
    }

    match file.filter(|path| !path.trim().is_empty()) {
        Some(path) => Ok(CredentialSource::File(PathBuf::from(path.trim()))),
        None => Err(report!(ConfigurationError::MissingCredentials)),
    }
}
