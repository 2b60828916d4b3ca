use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabularFormat {
    #[default]
    Csv,
    Excel,
}

impl TabularFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "text/csv",
            TabularFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for TabularFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(TabularFormat::Csv),
            "excel" | "xlsx" => Ok(TabularFormat::Excel),
            _ => Err(AppError::UnsupportedFormat(format!(
                "'{}' (expected 'csv' or 'excel')",
                s
            ))),
        }
    }
}

impl fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabularFormat::Csv => f.write_str("csv"),
            TabularFormat::Excel => f.write_str("excel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_formats() {
        assert_eq!("csv".parse::<TabularFormat>().unwrap(), TabularFormat::Csv);
        assert_eq!("Excel".parse::<TabularFormat>().unwrap(), TabularFormat::Excel);
        assert_eq!("xlsx".parse::<TabularFormat>().unwrap(), TabularFormat::Excel);
    }

    #[test]
    fn test_parse_unsupported_format() {
        for name in ["parquet", "json", "", "xls"] {
            assert!(
                matches!(name.parse::<TabularFormat>(), Err(AppError::UnsupportedFormat(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for format in [TabularFormat::Csv, TabularFormat::Excel] {
            assert_eq!(format.to_string().parse::<TabularFormat>().unwrap(), format);
        }
    }
}
