use crate::error::{AppError, Result};
use std::fmt;

/// A single value in a table. Types come from the parser, never from a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Float(n) => write!(f, "{}", n),
            Cell::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Rows of cells under named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut table = Self {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(AppError::Parse(format!(
                "row {} has {} fields, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the first column with this name, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    /// Two columns, two rows: `[["x", 1], ["y", 2]]`.
    pub(crate) fn mock_table() -> Table {
        Table::new(
            vec!["name".to_string(), "value".to_string()],
            vec![
                vec![Cell::from("x"), Cell::Int(1)],
                vec![Cell::from("y"), Cell::Int(2)],
            ],
        )
        .unwrap()
    }
}
