use crate::auth::{self, CredentialStore};
use crate::config::Config;
use crate::drive::DriveClient;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Produces an authenticated session on demand.
#[async_trait]
pub trait Connector {
    type Session: Send + Sync;

    async fn connect(&self) -> Result<Self::Session>;
}

/// Holds the session once it has been established.
///
/// The first `get_session` call runs the connector; later calls return the
/// same handle. A failed connect leaves the cache empty.
pub struct SessionCache<C: Connector> {
    connector: C,
    session: OnceCell<C::Session>,
}

impl<C: Connector> SessionCache<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            session: OnceCell::new(),
        }
    }

    pub async fn get_session(&self) -> Result<&C::Session> {
        self.session
            .get_or_try_init(|| async {
                debug!("No cached session, connecting...");
                self.connector.connect().await
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }
}

/// Connects to Google Drive using the configured credentials.
pub struct GoogleDriveConnector {
    config: Config,
    store: CredentialStore,
}

impl GoogleDriveConnector {
    pub fn new(config: Config, store: CredentialStore) -> Self {
        Self { config, store }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let store = auth::credential_store(&config)?;
        Ok(Self::new(config, store))
    }
}

#[async_trait]
impl Connector for GoogleDriveConnector {
    type Session = DriveClient;

    #[instrument(name = "Connecting to Google Drive", skip_all)]
    async fn connect(&self) -> Result<DriveClient> {
        let authenticator = auth::authenticate(&self.config, &self.store).await?;
        DriveClient::new(authenticator)
    }
}
