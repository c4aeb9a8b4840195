//! Measurement data: arbitrary columns keyed by section identity and a depth.

use std::path::Path;

use crate::error::{Result, SpliceError};
use crate::identity::CoreKey;
use crate::tabular::columns::normalize;
use crate::tabular::formats::{col, MEASUREMENT};
use crate::tabular::{DataTable, MappedTable, TableReader};

/// Default name of the depth column.
pub const DEFAULT_DEPTH_COLUMN: &str = "Depth";

#[derive(Debug, Clone)]
pub struct MeasurementData {
    name: String,
    table: MappedTable,
    depth_index: usize,
}

impl MeasurementData {
    /// Map the identity columns and locate `depth_column` by header name.
    pub fn from_table(name: impl Into<String>, table: DataTable, depth_column: &str) -> Result<Self> {
        let table = MappedTable::new(table, MEASUREMENT)?;
        let wanted = normalize(depth_column);
        let depth_index = table
            .table()
            .headers
            .iter()
            .position(|h| normalize(h) == wanted)
            .ok_or_else(|| SpliceError::MissingColumns {
                format: MEASUREMENT.name.to_string(),
                columns: vec![depth_column.to_string()],
            })?;
        Ok(Self {
            name: name.into(),
            table,
            depth_index,
        })
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>, depth_column: &str) -> Result<Self> {
        let (table, source) = reader.read_file(path)?;
        Self::from_table(source.file, table, depth_column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Headers as they appear in the file, plus any split from `SiteHole`.
    pub fn headers(&self) -> &[String] {
        &self.table.table().headers
    }

    pub fn depth_index(&self) -> usize {
        self.depth_index
    }

    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cells(&self, row: usize) -> &[String] {
        &self.table.table().rows[row]
    }

    pub fn core_key(&self, row: usize) -> CoreKey {
        CoreKey::new(
            self.table.text(row, col::SITE.name),
            self.table.text(row, col::HOLE.name),
            self.table.text(row, col::CORE.name),
        )
    }

    pub fn section(&self, row: usize) -> &str {
        self.table.text(row, col::SECTION.name)
    }

    /// Raw depth of a row; `None` when the cell is null-like.
    pub fn depth(&self, row: usize) -> Result<Option<f64>> {
        let value = self.cells(row)[self.depth_index].trim();
        if DataTable::is_null_value(value) {
            return Ok(None);
        }
        value.parse::<f64>().map(Some).map_err(|_| SpliceError::Parse {
            row: row + 1,
            column: self.headers()[self.depth_index].clone(),
            message: format!("'{}' is not a number", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(csv: &str, depth: &str) -> Result<MeasurementData> {
        let table = TableReader::new().read_bytes(csv.as_bytes())?;
        MeasurementData::from_table("test", table, depth)
    }

    #[test]
    fn test_depth_column_by_name() {
        let md = data(
            "Site,Hole,Core,Tool,Section,Depth CSF-A (m),Gamma\n1,A,1,H,1,0.25,2.1\n1,A,1,H,2,NA,2.2\n",
            "Depth CSF-A",
        )
        .unwrap();
        assert_eq!(md.depth_index(), 5);
        assert_eq!(md.depth(0).unwrap(), Some(0.25));
        assert_eq!(md.depth(1).unwrap(), None);
        assert_eq!(md.core_key(0), CoreKey::new("1", "A", "1"));
        assert_eq!(md.section(1), "2");
    }

    #[test]
    fn test_missing_depth_column() {
        let err = data("Site,Hole,Core,Tool,Section\n1,A,1,H,1\n", DEFAULT_DEPTH_COLUMN).unwrap_err();
        assert!(matches!(err, SpliceError::MissingColumns { .. }));
    }
}
