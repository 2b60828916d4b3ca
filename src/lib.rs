//! Read and write CSV and Excel tables stored in existing Google Drive files.
//!
//! A [`TabularStore`] owns one lazily authenticated Drive session, shared by
//! every transfer it performs:
//!
//! ```no_run
//! # async fn run() -> drive_tabular::Result<()> {
//! use drive_tabular::{Config, TabularStore};
//!
//! let store = TabularStore::from_config(Config::load()?)?;
//! let table = store.read_tabular("abc123", "csv").await?;
//! store.write_tabular(&table, "abc123", "excel").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod drive;
pub mod error;
pub mod notify;
pub mod session;
pub mod staging;
pub mod store;
pub mod tabular;

pub use config::Config;
pub use error::{AppError, Result};
pub use store::TabularStore;
pub use tabular::{Cell, Table, TabularFormat};
