// CSV import/export with column-wide type inference

use super::{Cell, Table};
use crate::error::{AppError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnKind {
    fn of(value: &str) -> Self {
        if parse_bool(value).is_some() {
            ColumnKind::Bool
        } else if value.parse::<i64>().is_ok() {
            ColumnKind::Int
        } else if parse_float(value).is_some() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }

    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }

    fn cell(self, value: &str) -> Cell {
        if value.is_empty() {
            return Cell::Empty;
        }
        match self {
            ColumnKind::Bool => parse_bool(value).map(Cell::Bool),
            ColumnKind::Int => value.parse().ok().map(Cell::Int),
            ColumnKind::Float => parse_float(value).map(Cell::Float),
            ColumnKind::Text => None,
        }
        .unwrap_or_else(|| Cell::String(value.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// Words like "inf" and "NaN" stay text
fn parse_float(value: &str) -> Option<f64> {
    if !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parse CSV content. The first record is the header row.
pub fn read<R: Read>(source: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() {
        return Err(AppError::Parse("No columns to parse from CSV".to_string()));
    }

    let records = reader
        .records()
        .enumerate()
        .map(|(idx, record)| {
            record.map_err(|e| {
                AppError::Parse(format!("Failed to read CSV record {}: {}", idx + 1, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| {
            records
                .iter()
                .filter_map(|record| record.get(col))
                .filter(|value| !value.is_empty())
                .map(ColumnKind::of)
                .reduce(ColumnKind::widen)
                .unwrap_or(ColumnKind::Text)
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&kinds)
                .map(|(value, kind)| kind.cell(value))
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

pub fn read_path(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    read(file)
}

/// Write the header row followed by every data row.
pub fn write<W: Write>(table: &Table, sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(sink);

    writer
        .write_record(table.columns())
        .map_err(|e| AppError::Encode(format!("Failed to write CSV header: {}", e)))?;

    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| AppError::Encode(format!("Failed to write CSV record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::Encode(format!("Failed to flush CSV data: {}", e)))?;

    Ok(())
}

pub fn write_path(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write(table, file)
}
