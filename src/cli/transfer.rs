use drive_tabular::tabular::{self, TabularFormat};
use super::open_store;
use drive_tabular::{Config, Result};
use std::io;
use std::path::Path;
use tracing::info;

pub async fn read(file_id: &str, format: &str) -> Result<()> {
    let store = open_store(Config::load()?)?;
    let table = store.read_tabular(file_id, format).await?;

    tabular::csv::write(&table, io::stdout().lock())?;

    Ok(())
}

pub async fn write(file_id: &str, path: &Path, format: &str) -> Result<()> {
    let local_format: TabularFormat = format.parse()?;
    let table = tabular::read_path(path, local_format)?;

    let store = open_store(Config::load()?)?;
    store.write_tabular(&table, file_id, format).await?;

    info!(file_id, rows = table.row_count(), "Upload completed");

    Ok(())
}
