mod auth;
mod show;
mod transfer;

use clap::{Parser, Subcommand};
use drive_tabular::session::GoogleDriveConnector;
use drive_tabular::{Config, Result, TabularStore};
use tracing::debug;

pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "drive-tabular")]
#[command(about = "Read and write CSV and Excel tables stored in Google Drive", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Auth { reset, yes } => auth::execute(*reset, *yes).await,
            Commands::Read { file_id, format } => transfer::read(file_id, format).await,
            Commands::Write {
                file_id,
                path,
                format,
            } => transfer::write(file_id, path, format).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

/// Build a store whose failures surface once, through `main`'s error log.
fn open_store(config: Config) -> Result<TabularStore<GoogleDriveConnector>> {
    let store = TabularStore::from_config(config)?;
    Ok(store.with_notifier(|message: &str| debug!("{}", message)))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Google Drive and verify access
    Auth {
        /// Delete persisted credentials first
        #[arg(long)]
        reset: bool,
        /// Do not ask for confirmation when resetting
        #[arg(long, short)]
        yes: bool,
    },
    /// Download a remote file and print it as CSV
    Read {
        file_id: String,
        /// Format of the remote file: csv or excel
        #[arg(long, short)]
        format: String,
    },
    /// Replace the content of a remote file with a local table
    Write {
        file_id: String,
        path: std::path::PathBuf,
        /// Format of both the local and the remote file: csv or excel
        #[arg(long, short, default_value = "csv")]
        format: String,
    },
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}
