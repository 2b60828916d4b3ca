use super::secrets::{ResolverChain, SecretBlob};
use super::store::{CLIENT_SECRETS_FILE, CredentialStore, SERVICE_ACCOUNT_FILE, ensure_parent};
use crate::config::{AuthMode, Config};
use crate::drive::AUTH_SCOPE;
use crate::error::{AppError, Result};
use hyper_util::client::legacy::connect::HttpConnector;
use tracing::{debug, instrument};
use yup_oauth2::{
    ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
    ServiceAccountAuthenticator, ServiceAccountKey, authenticator::Authenticator,
    hyper_rustls::HttpsConnector,
};

pub type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Credential material parsed for one of the supported auth modes.
enum GoogleCredential {
    Installed(ApplicationSecret),
    ServiceAccount(Box<ServiceAccountKey>),
}

impl GoogleCredential {
    fn parse(mode: AuthMode, blob: &SecretBlob) -> Result<Self> {
        match mode {
            AuthMode::Installed => yup_oauth2::parse_application_secret(blob.as_str())
                .map(Self::Installed)
                .map_err(|e| AppError::Auth(format!("Invalid OAuth client secret: {}", e))),
            AuthMode::ServiceAccount => yup_oauth2::parse_service_account_key(blob.as_str())
                .map(|key| Self::ServiceAccount(Box::new(key)))
                .map_err(|e| AppError::Auth(format!("Invalid service account key: {}", e))),
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Self::Installed(_) => CLIENT_SECRETS_FILE,
            Self::ServiceAccount(_) => SERVICE_ACCOUNT_FILE,
        }
    }
}

/// Resolve the secret, build the authenticator and verify it by fetching a token.
///
/// Nothing is written to disk and no request is made until a valid secret
/// has been resolved.
#[instrument(name = "Authenticating to Google Drive", skip_all)]
pub async fn authenticate(config: &Config, store: &CredentialStore) -> Result<AuthType> {
    let chain = ResolverChain::from_config(&config.secrets)?;
    authenticate_with(&chain, config.google.auth_mode, config.google.secret_key(), store).await
}

pub(crate) async fn authenticate_with(
    chain: &ResolverChain,
    mode: AuthMode,
    secret_key: &str,
    store: &CredentialStore,
) -> Result<AuthType> {
    let blob = chain.resolve(secret_key)?;
    let credential = GoogleCredential::parse(mode, &blob)?;

    store.persist(credential.file_name(), blob.as_str())?;

    let auth = match credential {
        GoogleCredential::Installed(secret) => from_installed_flow(secret, store).await?,
        GoogleCredential::ServiceAccount(key) => from_service_account(*key).await?,
    };

    // Trigger authentication by requesting a token
    let _token = auth
        .token(&[AUTH_SCOPE])
        .await
        .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

    debug!(?mode, "Google Drive authentication verified");

    Ok(auth)
}

async fn from_installed_flow(secret: ApplicationSecret, store: &CredentialStore) -> Result<AuthType> {
    // The user approves access in a browser; a local server receives the redirect
    let mut builder =
        InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect);

    if let Some(token_cache_path) = store.token_cache() {
        ensure_parent(&token_cache_path)?;
        builder = builder.persist_tokens_to_disk(token_cache_path);
    }

    builder
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))
}

async fn from_service_account(key: ServiceAccountKey) -> Result<AuthType> {
    ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build service account authenticator: {}", e)))
}

/// Clear persisted Google credentials
#[instrument(name = "Clearing persisted Google credentials", skip_all)]
pub fn clear_credentials(store: &CredentialStore) -> Result<usize> {
    let removed = store.clear()?;
    debug!(removed, "Cleared persisted credentials");
    Ok(removed)
}
