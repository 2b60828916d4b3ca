use clap::Subcommand;
use drive_tabular::{Config, Result};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show configuration and cache paths
    Paths,
}

impl ShowResource {
    pub async fn execute(&self) -> Result<()> {
        match self {
            ShowResource::Paths => show_paths(),
        }
    }
}

fn show_paths() -> Result<()> {
    let config_path = Config::config_file()?;
    let config = Config::load()?;
    let credentials_dir = config.credentials_dir()?;

    info!(path = ?config_path, "Config path");
    info!(
        path = ?credentials_dir,
        persist = config.credentials.persist,
        "Credentials path"
    );
    info!(path = ?config.secrets.file, sources = ?config.secrets.sources, "Secrets file");

    Ok(())
}
