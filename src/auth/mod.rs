mod google;
pub mod secrets;
pub mod store;

pub use google::{AuthType, authenticate, clear_credentials};
pub use secrets::{EnvResolver, ResolverChain, SecretBlob, SecretResolver, SecretsFileResolver};
pub use store::{CredentialStore, Persistence};

use crate::config::Config;
use crate::error::Result;

/// Build the credential store described by the config.
pub fn credential_store(config: &Config) -> Result<CredentialStore> {
    match config.credentials.persist {
        true => Ok(CredentialStore::on_disk(config.credentials_dir()?)),
        false => Ok(CredentialStore::in_memory()),
    }
}
