use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::sheets_config::CredentialSource;

use super::http_client::{HttpClient, HttpsConnector};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Could not read the service account key")]
    ReadKey,
    #[error("Could not create an authenticator")]
    BuildAuthenticator,
}

#[instrument(skip(client))]
pub async fn auth(
    credentials: &CredentialSource,
    client: HttpClient,
) -> error_stack::Result<Authenticator<HttpsConnector>, AuthError> {
    let secret: oauth2::ServiceAccountKey = match credentials {
        CredentialSource::Inline(info) => {
            let json = serde_json::to_vec(info).change_context(AuthError::ReadKey)?;
            oauth2::parse_service_account_key(json)
                .change_context(AuthError::ReadKey)
                .attach_printable("Inline `gcp_service_account` is not a valid service account key")?
        }
        CredentialSource::File(path) => oauth2::read_service_account_key(path)
            .await
            .change_context(AuthError::ReadKey)
            .attach_printable_lazy(|| {
                format!(
                    "Could not read service account private key at '{}'",
                    path.display()
                )
            })?,
    };

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(AuthError::BuildAuthenticator)
}
