//! Splice Interval Table: sparse splice intervals with resolved depths.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::round3;
use super::sparse_splice::{Join, SectionOffset, SparseInterval, SpliceType};
use crate::error::Result;
use crate::identity::{CoreIdentity, CoreKey};
use crate::tabular::formats::{col, SPLICE_INTERVAL_TABLE};
use crate::tabular::{format_number, format_optional, MappedTable, TableFormat, TableReader, TabularRecord};

/// A splice interval with CSF and CCSF depths (m) at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitRow {
    pub interval: SparseInterval,
    pub top_csf: f64,
    pub top_ccsf: f64,
    pub bottom_csf: f64,
    pub bottom_ccsf: f64,
}

impl SitRow {
    pub fn core(&self) -> &CoreIdentity {
        &self.interval.core
    }

    pub fn key(&self) -> CoreKey {
        self.interval.core.key()
    }

    /// Shift applied to the interval: top CCSF − top CSF.
    pub fn offset(&self) -> f64 {
        round3(self.top_ccsf - self.top_csf)
    }

    /// Sections the interval spans. Integer section names expand to the full
    /// inclusive range; anything else yields just the two end sections.
    pub fn sections(&self) -> Vec<String> {
        let top = &self.interval.top.section;
        let bottom = &self.interval.bottom.section;
        if top == bottom {
            return vec![top.clone()];
        }
        match (top.parse::<u32>(), bottom.parse::<u32>()) {
            (Ok(t), Ok(b)) if t <= b => (t..=b).map(|s| s.to_string()).collect(),
            _ => vec![top.clone(), bottom.clone()],
        }
    }
}

impl TabularRecord for SitRow {
    const FORMAT: TableFormat = SPLICE_INTERVAL_TABLE;

    fn cells(&self) -> Vec<String> {
        let i = &self.interval;
        vec![
            i.core.site.clone(),
            i.core.hole.clone(),
            i.core.core.clone(),
            i.core.tool.clone(),
            i.top.section.clone(),
            format_number(i.top.offset),
            format_number(self.top_csf),
            format_number(self.top_ccsf),
            i.bottom.section.clone(),
            format_number(i.bottom.offset),
            format_number(self.bottom_csf),
            format_number(self.bottom_ccsf),
            i.join.splice_type.map(|t| t.to_string()).unwrap_or_default(),
            format_optional(i.join.gap),
            i.data_used.clone(),
            i.comment.clone(),
        ]
    }
}

/// Ordered Splice Interval Table.
#[derive(Debug, Clone, Default)]
pub struct SpliceIntervalTable {
    name: String,
    rows: Vec<SitRow>,
}

impl SpliceIntervalTable {
    pub fn new(name: impl Into<String>, rows: Vec<SitRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn from_table(name: impl Into<String>, table: &MappedTable) -> Result<Self> {
        let rows = (0..table.row_count())
            .map(|r| -> Result<SitRow> {
                let interval = SparseInterval {
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
                        splice_type: SpliceType::parse(table.text(r, col::SPLICE_TYPE.name))?,
                        gap: table.number(r, col::GAP.name)?,
                    },
                    data_used: table.text(r, col::DATA_USED.name).to_string(),
                    comment: table.text(r, col::COMMENT.name).to_string(),
                };
                Ok(SitRow {
                    interval,
                    top_csf: table.required_number(r, col::TOP_DEPTH_CSF.name)?,
                    top_ccsf: table.required_number(r, col::TOP_DEPTH_CCSF.name)?,
                    bottom_csf: table.required_number(r, col::BOTTOM_DEPTH_CSF.name)?,
                    bottom_ccsf: table.required_number(r, col::BOTTOM_DEPTH_CCSF.name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, rows))
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>) -> Result<Self> {
        let (table, source) = reader.load(path, SPLICE_INTERVAL_TABLE)?;
        Self::from_table(source.file, &table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[SitRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct sites in order of first appearance.
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !sites.contains(&row.interval.core.site.as_str()) {
                sites.push(&row.interval.core.site);
            }
        }
        sites
    }

    pub fn contains_core(&self, core: &CoreKey) -> bool {
        self.core_row(core).is_some()
    }

    /// First interval taken from a core.
    pub fn core_row(&self, core: &CoreKey) -> Option<&SitRow> {
        self.rows.iter().find(|r| r.key() == *core)
    }

    /// Offset of a core's first interval.
    pub fn core_offset(&self, core: &CoreKey) -> Option<f64> {
        self.core_row(core).map(SitRow::offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sit_row(core: &str, top: &str, bottom: &str, top_csf: f64, top_ccsf: f64) -> SitRow {
        SitRow {
            interval: SparseInterval::new(
                CoreIdentity::new("1", "A", core, "H"),
                SectionOffset::new(top, 0.0),
                SectionOffset::new(bottom, 50.0),
                Join::tie(),
            ),
            top_csf,
            top_ccsf,
            bottom_csf: top_csf + 1.0,
            bottom_ccsf: top_ccsf + 1.0,
        }
    }

    #[test]
    fn test_sections_span() {
        assert_eq!(sit_row("1", "2", "4", 0.0, 0.0).sections(), vec!["2", "3", "4"]);
        assert_eq!(sit_row("1", "3", "3", 0.0, 0.0).sections(), vec!["3"]);
        assert_eq!(sit_row("1", "6", "CC", 0.0, 0.0).sections(), vec!["6", "CC"]);
    }

    #[test]
    fn test_core_offset_uses_first_interval() {
        let sit = SpliceIntervalTable::new(
            "sit",
            vec![
                sit_row("1", "1", "2", 0.0, 0.25),
                sit_row("2", "1", "2", 3.0, 3.5),
                sit_row("1", "3", "4", 2.0, 2.75),
            ],
        );
        assert_eq!(sit.core_offset(&CoreKey::new("1", "A", "1")), Some(0.25));
        assert_eq!(sit.core_offset(&CoreKey::new("1", "A", "2")), Some(0.5));
        assert_eq!(sit.core_offset(&CoreKey::new("1", "B", "1")), None);
        assert_eq!(sit.sites(), vec!["1"]);
    }
}
