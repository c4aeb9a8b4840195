//! Sparse splice: the ordered intervals a scientist picked, by section coordinates.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::identity::{CoreIdentity, SectionKey};
use crate::tabular::formats::{col, SPARSE_SPLICE};
use crate::tabular::{format_number, format_optional, MappedTable, TableFormat, TableReader, TabularRecord};

/// How an interval is joined to its neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpliceType {
    /// Top of one interval placed exactly at the other's bottom.
    Tie,
    /// Interval stacked below the other, optionally with a gap.
    Append,
}

impl SpliceType {
    /// Parse cell text: trimmed and case-insensitive, empty is `None`.
    pub fn parse(text: &str) -> Result<Option<SpliceType>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else if trimmed.eq_ignore_ascii_case("tie") {
            Ok(Some(SpliceType::Tie))
        } else if trimmed.eq_ignore_ascii_case("append") {
            Ok(Some(SpliceType::Append))
        } else {
            Err(SpliceError::UnknownSpliceType(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpliceType::Tie => "TIE",
            SpliceType::Append => "APPEND",
        }
    }
}

impl fmt::Display for SpliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splice type and optional gap carried by an interval.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Join {
    pub splice_type: Option<SpliceType>,
    /// Explicit APPEND gap in meters.
    pub gap: Option<f64>,
}

impl Join {
    pub fn tie() -> Self {
        Self {
            splice_type: Some(SpliceType::Tie),
            gap: None,
        }
    }

    pub fn append(gap: Option<f64>) -> Self {
        Self {
            splice_type: Some(SpliceType::Append),
            gap,
        }
    }
}

/// A point on a core given as section + offset from the section top (cm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionOffset {
    pub section: String,
    pub offset: f64,
}

impl SectionOffset {
    pub fn new(section: impl Into<String>, offset: f64) -> Self {
        Self {
            section: section.into(),
            offset,
        }
    }
}

impl fmt::Display for SectionOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}cm", self.section, self.offset)
    }
}

/// One interval of a sparse splice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseInterval {
    pub core: CoreIdentity,
    pub top: SectionOffset,
    pub bottom: SectionOffset,
    pub join: Join,
    pub data_used: String,
    pub comment: String,
}

impl SparseInterval {
    pub fn new(core: CoreIdentity, top: SectionOffset, bottom: SectionOffset, join: Join) -> Self {
        Self {
            core,
            top,
            bottom,
            join,
            data_used: String::new(),
            comment: String::new(),
        }
    }

    pub fn top_key(&self) -> SectionKey {
        self.core.section(self.top.section.clone())
    }

    pub fn bottom_key(&self) -> SectionKey {
        self.core.section(self.bottom.section.clone())
    }
}

impl fmt::Display for SparseInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} to {}", self.core, self.top, self.bottom)
    }
}

impl TabularRecord for SparseInterval {
    const FORMAT: TableFormat = SPARSE_SPLICE;

    fn cells(&self) -> Vec<String> {
        vec![
            self.core.site.clone(),
            self.core.hole.clone(),
            self.core.core.clone(),
            self.core.tool.clone(),
            self.top.section.clone(),
            format_number(self.top.offset),
            self.bottom.section.clone(),
            format_number(self.bottom.offset),
            self.join.splice_type.map(|t| t.to_string()).unwrap_or_default(),
            format_optional(self.join.gap),
            self.data_used.clone(),
            self.comment.clone(),
        ]
    }
}

/// Ordered list of sparse splice intervals.
#[derive(Debug, Clone)]
pub struct SparseSplice {
    name: String,
    intervals: Vec<SparseInterval>,
}

impl SparseSplice {
    pub fn new(name: impl Into<String>, intervals: Vec<SparseInterval>) -> Self {
        Self {
            name: name.into(),
            intervals,
        }
    }

    pub fn from_table(name: impl Into<String>, table: &MappedTable) -> Result<Self> {
        let intervals = (0..table.row_count())
            .map(|r| -> Result<SparseInterval> {
                let splice_type = SpliceType::parse(table.text(r, col::SPLICE_TYPE.name))?;
                Ok(SparseInterval {
                    core: CoreIdentity::new(
                        table.text(r, col::SITE.name),
                        table.text(r, col::HOLE.name),
                        table.text(r, col::CORE.name),
                        table.text(r, col::TOOL.name),
                    ),
                    top: SectionOffset::new(
                        table.text(r, col::TOP_SECTION.name),
                        table.required_number(r, col::TOP_OFFSET.name)?,
                    ),
                    bottom: SectionOffset::new(
                        table.text(r, col::BOTTOM_SECTION.name),
                        table.required_number(r, col::BOTTOM_OFFSET.name)?,
                    ),
                    join: Join {
                        splice_type,
                        gap: table.number(r, col::GAP.name)?,
                    },
                    data_used: table.text(r, col::DATA_USED.name).to_string(),
                    comment: table.text(r, col::COMMENT.name).to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, intervals))
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>) -> Result<Self> {
        let (table, source) = reader.load(path, SPARSE_SPLICE)?;
        Self::from_table(source.file, &table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intervals(&self) -> &[SparseInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_type_parse() {
        assert_eq!(SpliceType::parse(" tie ").unwrap(), Some(SpliceType::Tie));
        assert_eq!(SpliceType::parse("Append").unwrap(), Some(SpliceType::Append));
        assert_eq!(SpliceType::parse("").unwrap(), None);
        match SpliceType::parse("SPLICE") {
            Err(SpliceError::UnknownSpliceType(t)) => assert_eq!(t, "SPLICE"),
            other => panic!("expected UnknownSpliceType, got {:?}", other),
        }
    }

    #[test]
    fn test_interval_keys_share_core() {
        let interval = SparseInterval::new(
            CoreIdentity::new("1", "B", "4", "H"),
            SectionOffset::new("2", 10.0),
            SectionOffset::new("5", 42.5),
            Join::tie(),
        );
        assert_eq!(interval.top_key(), SectionKey::new("1", "B", "4", "2"));
        assert_eq!(interval.bottom_key().section, "5");
        assert_eq!(interval.to_string(), "1B-4H 2@10cm to 5@42.5cm");
        assert_eq!(interval.cells()[8], "TIE");
    }
}
