pub mod csv;
pub mod excel;
mod format;
mod table;

pub use format::TabularFormat;
pub use table::{Cell, Table};

use crate::error::Result;
use std::path::Path;

pub fn read_path(path: &Path, format: TabularFormat) -> Result<Table> {
    match format {
        TabularFormat::Csv => csv::read_path(path),
        TabularFormat::Excel => excel::read_path(path),
    }
}

pub fn write_path(table: &Table, path: &Path, format: TabularFormat) -> Result<()> {
    match format {
        TabularFormat::Csv => csv::write_path(table, path),
        TabularFormat::Excel => excel::write_path(table, path),
    }
}

#[cfg(test)]
pub(crate) use table::test_helpers;
