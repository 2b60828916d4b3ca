// Excel (.xlsx) import/export
//
// Reading always goes through calamine's Xlsx engine and only looks at the
// first worksheet. Writing produces a single worksheet.

use super::{Cell, Table};
use crate::error::{AppError, Result};
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

// Largest float that still maps exactly onto an integer
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT => Cell::Int(*n as i64),
        Data::Float(n) => Cell::Float(*n),
        Data::Bool(b) => Cell::Bool(*b),
        // Dates are kept as their serial number
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(e) => Cell::String(e.to_string()),
    }
}

fn header_name(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Read the first worksheet. The first row is the header row.
///
/// Positions are anchored at A1 and the extent covers both the cells holding
/// data and the sheet's recorded dimension, so leading blank columns and
/// trailing blank rows are kept.
pub fn read_path(path: &Path) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| AppError::Parse(format!("Failed to open Excel file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Parse("Excel file contains no sheets".to_string()))?;

    let dimensions = workbook
        .worksheet_cells_reader(&sheet_name)
        .map_err(|e| AppError::Parse(format!("Failed to read sheet '{}': {}", sheet_name, e)))?
        .dimensions();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Parse(format!("Failed to read sheet '{}': {}", sheet_name, e)))?;

    let Some((data_last_row, data_last_col)) = range.end() else {
        return Err(AppError::Parse("No columns to parse from Excel sheet".to_string()));
    };
    let last_row = data_last_row.max(dimensions.end.0);
    let last_col = data_last_col.max(dimensions.end.1);

    let value = |row: u32, col: u32| range.get_value((row, col)).unwrap_or(&Data::Empty);

    let columns = (0..=last_col).map(|col| header_name(value(0, col))).collect();

    let rows = (1..=last_row)
        .map(|row| (0..=last_col).map(|col| to_cell(value(row, col))).collect())
        .collect();

    Table::new(columns, rows)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    blank: &Format,
) -> Result<()> {
    let result = match cell {
        // Stored as a formatted blank so the cell still counts toward the sheet dimension
        Cell::Empty => worksheet.write_blank(row, col, blank),
        Cell::String(s) if s.is_empty() => worksheet.write_blank(row, col, blank),
        Cell::Bool(b) => worksheet.write_boolean(row, col, *b),
        Cell::Int(n) => worksheet.write_number(row, col, *n as f64),
        Cell::Float(n) => worksheet.write_number(row, col, *n),
        Cell::String(s) => worksheet.write_string(row, col, s),
    };

    result
        .map(|_| ())
        .map_err(|e| AppError::Encode(format!("Failed to write cell ({}, {}): {}", row, col, e)))
}

fn column_index(idx: usize) -> Result<u16> {
    u16::try_from(idx)
        .map_err(|_| AppError::Encode(format!("Too many columns for Excel: {}", idx + 1)))
}

fn row_index(idx: usize) -> Result<u32> {
    u32::try_from(idx).map_err(|_| AppError::Encode(format!("Too many rows for Excel: {}", idx)))
}

/// Write the table to a single-sheet workbook. The header goes in row 0.
pub fn write_path(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    // Blank cells without a non-default format are dropped by the writer
    let blank = Format::new().set_unlocked();

    for (col, name) in table.columns().iter().enumerate() {
        write_cell(worksheet, 0, column_index(col)?, &Cell::String(name.clone()), &blank)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_index(row_idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, column_index(col)?, cell, &blank)?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| AppError::Encode(format!("Failed to save Excel file: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::table::test_helpers::mock_table;

    #[test]
    fn test_write_then_read_preserves_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        let table = mock_table();

        write_path(&table, &path).unwrap();

        assert_eq!(read_path(&path).unwrap(), table);
    }

    #[test]
    fn test_native_types_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("types.xlsx");
        let table = Table::new(
            vec!["flag".to_string(), "ratio".to_string(), "note".to_string()],
            vec![
                vec![Cell::Bool(true), Cell::Float(0.25), Cell::from("a")],
                vec![Cell::Bool(false), Cell::Float(-3.5), Cell::from("b")],
            ],
        )
        .unwrap();

        write_path(&table, &path).unwrap();

        assert_eq!(read_path(&path).unwrap(), table);
    }

    #[test]
    fn test_not_a_workbook_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.xlsx");
        std::fs::write(&path, "name,value\nx,1\n").unwrap();

        assert!(matches!(read_path(&path), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_integral_floats_become_ints() {
        assert_eq!(to_cell(&Data::Float(3.0)), Cell::Int(3));
        assert_eq!(to_cell(&Data::Float(3.5)), Cell::Float(3.5));
        assert_eq!(header_name(&Data::Empty), "");
    }

    #[test]
    fn test_blank_leading_column_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leading.xlsx");
        let table = Table::new(
            vec![String::new(), "b".to_string()],
            vec![vec![Cell::Empty, Cell::Int(1)], vec![Cell::Empty, Cell::Int(2)]],
        )
        .unwrap();

        write_path(&table, &path).unwrap();
        let read_back = read_path(&path).unwrap();

        assert_eq!(read_back.columns(), ["", "b"]);
        assert_eq!(read_back, table);
    }

    #[test]
    fn test_trailing_blank_row_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trailing.xlsx");
        let table = Table::new(
            vec!["name".to_string(), "value".to_string()],
            vec![
                vec![Cell::from("x"), Cell::Int(1)],
                vec![Cell::Empty, Cell::Empty],
            ],
        )
        .unwrap();

        write_path(&table, &path).unwrap();
        let read_back = read_path(&path).unwrap();

        assert_eq!(read_back.row_count(), 2);
        assert_eq!(read_back, table);
    }
}
