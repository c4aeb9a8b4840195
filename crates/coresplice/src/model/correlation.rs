//! Manual correlations that pin off-splice cores.
//!
//! Two file layouts exist. A tie-point file pairs a point on an off-splice core
//! with a point on an on-splice core; an offset file gives an off-splice core's
//! offset outright. The layout is chosen once, from the file's columns.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::identity::{CoreIdentity, CoreKey, SectionKey};
use crate::tabular::formats::{col, EXPLICIT_OFFSET_CORRELATION, TIE_POINT_CORRELATION};
use crate::tabular::{DataTable, MappedTable, TableReader};

/// A point on a core: section and depth within it (cm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub core: CoreIdentity,
    pub section: String,
    pub depth: f64,
}

impl CorrelationPoint {
    pub fn section_key(&self) -> SectionKey {
        self.core.section(self.section.clone())
    }
}

/// Off-splice point correlated to an on-splice point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiePointEntry {
    pub off_splice: CorrelationPoint,
    pub on_splice: CorrelationPoint,
}

/// Explicit cumulative offset (m) for an off-splice core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetEntry {
    pub core: CoreIdentity,
    pub offset: f64,
}

/// A borrowed entry of either layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrelationEntry<'a> {
    TiePoint(&'a TiePointEntry),
    ExplicitOffset(&'a OffsetEntry),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", content = "entries", rename_all = "snake_case")]
pub enum ManualCorrelation {
    TiePoint(Vec<TiePointEntry>),
    ExplicitOffset(Vec<OffsetEntry>),
}

impl ManualCorrelation {
    /// Pick the layout whose required columns the table carries, tie points first.
    pub fn from_table(table: DataTable) -> Result<Self> {
        match MappedTable::new(table.clone(), TIE_POINT_CORRELATION) {
            Ok(mapped) => Self::tie_points(&mapped),
            Err(SpliceError::MissingColumns { columns: tie_missing, .. }) => {
                match MappedTable::new(table, EXPLICIT_OFFSET_CORRELATION) {
                    Ok(mapped) => Self::offsets(&mapped),
                    Err(SpliceError::MissingColumns { columns: offset_missing, .. }) => {
                        Err(SpliceError::Format(format!(
                            "Manual correlation matches neither layout: {} lacks {:?}, {} lacks {:?}",
                            TIE_POINT_CORRELATION.name,
                            tie_missing,
                            EXPLICIT_OFFSET_CORRELATION.name,
                            offset_missing
                        )))
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>) -> Result<Self> {
        let (table, _) = reader.read_file(path)?;
        Self::from_table(table)
    }

    fn tie_points(table: &MappedTable) -> Result<Self> {
        let point = |r: usize,
                     site: &str,
                     hole: &str,
                     core: &str,
                     tool: &str,
                     section: &str,
                     depth: &str|
         -> Result<CorrelationPoint> {
            Ok(CorrelationPoint {
                core: CoreIdentity::new(
                    table.text(r, site),
                    table.text(r, hole),
                    table.text(r, core),
                    table.text(r, tool),
                ),
                section: table.text(r, section).to_string(),
                depth: table.required_number(r, depth)?,
            })
        };
        let entries = (0..table.row_count())
            .map(|r| -> Result<TiePointEntry> {
                Ok(TiePointEntry {
                    off_splice: point(
                        r,
                        col::SITE1.name,
                        col::HOLE1.name,
                        col::CORE1.name,
                        col::TOOL1.name,
                        col::SECTION1.name,
                        col::SECTION_DEPTH1.name,
                    )?,
                    on_splice: point(
                        r,
                        col::SITE2.name,
                        col::HOLE2.name,
                        col::CORE2.name,
                        col::TOOL2.name,
                        col::SECTION2.name,
                        col::SECTION_DEPTH2.name,
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ManualCorrelation::TiePoint(entries))
    }

    fn offsets(table: &MappedTable) -> Result<Self> {
        let entries = (0..table.row_count())
            .map(|r| -> Result<OffsetEntry> {
                Ok(OffsetEntry {
                    core: CoreIdentity::new(
                        table.text(r, col::SITE.name),
                        table.text(r, col::HOLE.name),
                        table.text(r, col::CORE.name),
                        table.text(r, col::TOOL.name),
                    ),
                    offset: table.required_number(r, col::OFFSET.name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ManualCorrelation::ExplicitOffset(entries))
    }

    pub fn len(&self) -> usize {
        match self {
            ManualCorrelation::TiePoint(entries) => entries.len(),
            ManualCorrelation::ExplicitOffset(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry naming `core` as its off-splice core, in file order.
    pub fn locate_by_off_splice_core(&self, core: &CoreKey) -> Vec<CorrelationEntry<'_>> {
        match self {
            ManualCorrelation::TiePoint(entries) => entries
                .iter()
                .filter(|e| e.off_splice.core.key() == *core)
                .map(CorrelationEntry::TiePoint)
                .collect(),
            ManualCorrelation::ExplicitOffset(entries) => entries
                .iter()
                .filter(|e| e.core.key() == *core)
                .map(CorrelationEntry::ExplicitOffset)
                .collect(),
        }
    }

    /// Whether any tie point correlates to `core` as the on-splice side.
    pub fn describes_on_splice_core(&self, core: &CoreKey) -> bool {
        match self {
            ManualCorrelation::TiePoint(entries) => {
                entries.iter().any(|e| e.on_splice.core.key() == *core)
            }
            ManualCorrelation::ExplicitOffset(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> DataTable {
        TableReader::new().read_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_tie_point_layout() {
        let mc = ManualCorrelation::from_table(table(
            "Site1,Hole1,Core1,Tool1,Section1,SectionDepth1,Site2,Hole2,Core2,Tool2,Section2,SectionDepth2\n\
             1,D,2,H,1,0.5,1,A,2,H,1,30\n\
             1,D,2,H,2,10,1,B,2,H,1,40\n",
        ))
        .unwrap();
        assert!(matches!(mc, ManualCorrelation::TiePoint(_)));
        let found = mc.locate_by_off_splice_core(&CoreKey::new("1", "D", "2"));
        assert_eq!(found.len(), 2);
        match found[0] {
            CorrelationEntry::TiePoint(e) => {
                assert_eq!(e.off_splice.depth, 0.5);
                assert_eq!(e.on_splice.depth, 30.0);
            }
            other => panic!("expected tie point, got {:?}", other),
        }
        assert!(mc.describes_on_splice_core(&CoreKey::new("1", "A", "2")));
        assert!(!mc.describes_on_splice_core(&CoreKey::new("1", "D", "2")));
    }

    #[test]
    fn test_offset_layout_tool_optional() {
        let mc = ManualCorrelation::from_table(table("Site,Hole,Core,Offset\n1,C,5,1.25\n")).unwrap();
        assert_eq!(mc.len(), 1);
        let found = mc.locate_by_off_splice_core(&CoreKey::new("1", "C", "5"));
        match found.as_slice() {
            [CorrelationEntry::ExplicitOffset(e)] => assert_eq!(e.offset, 1.25),
            other => panic!("expected one offset entry, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_layout() {
        let err = ManualCorrelation::from_table(table("Foo,Bar\n1,2\n")).unwrap_err();
        assert!(err.is_format_error());
    }
}
