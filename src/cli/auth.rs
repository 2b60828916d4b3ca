use dialoguer::Confirm;
use drive_tabular::auth::{self, Persistence};
use super::open_store;
use drive_tabular::{AppError, Config, Result};
use tracing::info;

pub async fn execute(reset: bool, yes: bool) -> Result<()> {
    let config = Config::load()?;

    if reset {
        reset_credentials(&config, yes)?;
    }

    let store = open_store(config)?;
    store.connect().await?;

    info!("Google Drive authentication verified");

    Ok(())
}

fn reset_credentials(config: &Config, yes: bool) -> Result<()> {
    let store = auth::credential_store(config)?;
    let Persistence::Disk(dir) = store.persistence() else {
        info!("Credentials are not persisted, nothing to reset");
        return Ok(());
    };

    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Delete persisted credentials in {:?}?", dir))
            .default(false)
            .interact()
            .map_err(|e| AppError::Other(e.into()))?;

    if !confirmed {
        info!("Keeping persisted credentials");
        return Ok(());
    }

    let removed = auth::clear_credentials(&store)?;
    info!(removed, "Cleared persisted credentials");

    Ok(())
}
