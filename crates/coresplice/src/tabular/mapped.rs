//! Tables whose columns have been resolved against a [`TableFormat`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::columns::{map_columns, normalize, ColumnIdentity};
use super::formats::TableFormat;
use super::table::DataTable;
use crate::error::{Result, SpliceError};

static SITE_HOLE_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(U?[0-9]+)([A-Za-z]+)").expect("valid site/hole regex"));

const SITE_HOLE: ColumnIdentity = ColumnIdentity::text("SiteHole", "Site and hole, e.g. 1A");

/// A raw table plus the position of every format column in it.
///
/// Optional columns absent from the file map to `None` and read as empty.
/// Columns not named by the format are kept and reachable by index.
#[derive(Debug, Clone)]
pub struct MappedTable {
    format: TableFormat,
    table: DataTable,
    columns: IndexMap<&'static str, Option<usize>>,
}

impl MappedTable {
    /// Map `table` onto `format`, failing if a required column is missing.
    ///
    /// A compound `SiteHole` column is split into `Site` and `Hole` first,
    /// unless the file already carries either of them.
    pub fn new(mut table: DataTable, format: TableFormat) -> Result<Self> {
        split_site_hole(&mut table);

        let found = map_columns(format.columns, &table.headers);
        let missing: Vec<String> = format
            .required()
            .filter(|name| !found.contains_key(name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(SpliceError::MissingColumns {
                format: format.name.to_string(),
                columns: missing,
            });
        }

        let columns = format
            .columns
            .iter()
            .map(|c| (c.name, found.get(c.name).copied()))
            .collect();

        Ok(Self {
            format,
            table,
            columns,
        })
    }

    pub fn format(&self) -> &TableFormat {
        &self.format
    }

    /// Underlying raw table, including unmapped columns.
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Position of a format column in the file, if present.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied().flatten()
    }

    /// Trimmed text of a cell; null-like and absent cells read as "".
    pub fn text(&self, row: usize, name: &str) -> &str {
        let value = self
            .index(name)
            .and_then(|col| self.table.get(row, col))
            .unwrap_or("");
        if DataTable::is_null_value(value) {
            ""
        } else {
            value.trim()
        }
    }

    /// Finite numeric cell; `None` when null-like or absent.
    pub fn number(&self, row: usize, name: &str) -> Result<Option<f64>> {
        let value = self.text(row, name);
        if value.is_empty() {
            return Ok(None);
        }
        let number = value
            .parse::<f64>()
            .map_err(|_| self.parse_error(row, name, format!("'{}' is not a number", value)))?;
        if !number.is_finite() {
            return Err(self.parse_error(row, name, format!("'{}' is not a finite number", value)));
        }
        Ok(Some(number))
    }

    /// Numeric cell that must be present.
    pub fn required_number(&self, row: usize, name: &str) -> Result<f64> {
        self.number(row, name)?
            .ok_or_else(|| self.parse_error(row, name, "missing value".to_string()))
    }

    /// Parse error for a cell; rows are reported 1-based.
    pub fn parse_error(&self, row: usize, name: &str, message: String) -> SpliceError {
        SpliceError::Parse {
            row: row + 1,
            column: name.to_string(),
            message,
        }
    }
}

fn split_site_hole(table: &mut DataTable) {
    let has = |name: &str| table.headers.iter().any(|h| normalize(h) == normalize(name));
    if has("Site") || has("Hole") {
        return;
    }
    let Some(index) = table.headers.iter().position(|h| SITE_HOLE.matches(h)) else {
        return;
    };

    let part = |row: &[String], group: usize| {
        row.get(index)
            .and_then(|cell| SITE_HOLE_VALUE.captures(cell))
            .map(|caps| caps[group].to_string())
            .unwrap_or_default()
    };
    table.push_column("Site", |row| part(row, 1));
    table.push_column("Hole", |row| part(row, 2));
}
