//! Affine Table: one depth shift per core.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::round3;
use crate::error::{Result, SpliceError};
use crate::identity::{CoreIdentity, CoreKey};
use crate::tabular::formats::{col, AFFINE_TABLE};
use crate::tabular::{format_number, format_optional, MappedTable, TableFormat, TableReader, TabularRecord};

/// How a core's shift was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShiftType {
    /// Tied to a point on another core.
    Tie,
    /// Set explicitly: a user gap or offset.
    Set,
    /// Relative: inherited from another core's shift.
    Rel,
    /// Fixed reference core.
    Anchor,
}

impl ShiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Tie => "TIE",
            ShiftType::Set => "SET",
            ShiftType::Rel => "REL",
            ShiftType::Anchor => "ANCHOR",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TIE" => Ok(ShiftType::Tie),
            "SET" => Ok(ShiftType::Set),
            "REL" => Ok(ShiftType::Rel),
            "ANCHOR" => Ok(ShiftType::Anchor),
            other => Err(SpliceError::Format(format!(
                "Unknown shift type '{}', expected TIE, SET, REL or ANCHOR",
                other
            ))),
        }
    }
}

/// The tie point behind a TIE shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiePoint {
    /// Core that stays put.
    pub fixed_core: CoreKey,
    /// CSF depth of the tie on the fixed core.
    pub fixed_csf: f64,
    /// CSF depth of the tie on the shifted core.
    pub shifted_csf: f64,
}

/// Shift of one core from CSF to CCSF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineRow {
    pub core: CoreIdentity,
    pub csf: f64,
    pub ccsf: f64,
    /// Cumulative offset, CCSF − CSF.
    pub offset: f64,
    pub differential_offset: f64,
    pub growth_rate: f64,
    pub shift_type: ShiftType,
    pub tie: Option<TiePoint>,
    pub data_used: String,
    pub comment: String,
}

impl AffineRow {
    /// Row with the given depth and offset; summary fields start at zero.
    /// CCSF is derived and rounded to 3 decimals.
    pub fn new(core: CoreIdentity, csf: f64, offset: f64, shift_type: ShiftType) -> Self {
        Self {
            core,
            csf,
            ccsf: round3(csf + offset),
            offset,
            differential_offset: 0.0,
            growth_rate: 0.0,
            shift_type,
            tie: None,
            data_used: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_tie(mut self, tie: TiePoint) -> Self {
        self.tie = Some(tie);
        self
    }

    pub fn with_data_used(mut self, data_used: impl Into<String>) -> Self {
        self.data_used = data_used.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn key(&self) -> CoreKey {
        self.core.key()
    }
}

impl fmt::Display for AffineRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} CSF = {}, CCSF = {}, Offset = {} ({})",
            self.core, self.csf, self.ccsf, self.offset, self.shift_type
        )
    }
}

impl TabularRecord for AffineRow {
    const FORMAT: TableFormat = AFFINE_TABLE;

    fn cells(&self) -> Vec<String> {
        vec![
            self.core.site.clone(),
            self.core.hole.clone(),
            self.core.core.clone(),
            self.core.tool.clone(),
            format_number(self.csf),
            format_number(self.ccsf),
            format_number(self.offset),
            format_number(self.differential_offset),
            format_number(self.growth_rate),
            self.shift_type.to_string(),
            self.tie.as_ref().map(|t| t.fixed_core.hole_core()).unwrap_or_default(),
            format_optional(self.tie.as_ref().map(|t| t.fixed_csf)),
            format_optional(self.tie.as_ref().map(|t| t.shifted_csf)),
            self.data_used.clone(),
            self.comment.clone(),
        ]
    }
}

/// Affine rows, at most one per [`CoreKey`].
#[derive(Debug, Clone, Default)]
pub struct AffineTable {
    name: String,
    rows: Vec<AffineRow>,
}

impl AffineTable {
    pub fn new(name: impl Into<String>, rows: Vec<AffineRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Build from a mapped file. The fixed core column only holds hole +
    /// core, so a tie's fixed core is taken to be on the shifted core's site.
    pub fn from_table(name: impl Into<String>, table: &MappedTable) -> Result<Self> {
        let rows = (0..table.row_count())
            .map(|r| -> Result<AffineRow> {
                let core = CoreIdentity::new(
                    table.text(r, col::SITE.name),
                    table.text(r, col::HOLE.name),
                    table.text(r, col::CORE.name),
                    table.text(r, col::TOOL.name),
                );
                let shift_type: ShiftType = table
                    .text(r, col::SHIFT_TYPE.name)
                    .parse()
                    .map_err(|e: SpliceError| table.parse_error(r, col::SHIFT_TYPE.name, e.to_string()))?;

                let fixed = table.text(r, col::FIXED_CORE.name);
                let tie = match (
                    split_hole_core(fixed),
                    table.number(r, col::FIXED_TIE_CSF.name)?,
                    table.number(r, col::SHIFTED_TIE_CSF.name)?,
                ) {
                    (Some((hole, number)), Some(fixed_csf), Some(shifted_csf)) => Some(TiePoint {
                        fixed_core: CoreKey::new(core.site.clone(), hole, number),
                        fixed_csf,
                        shifted_csf,
                    }),
                    _ => None,
                };

                Ok(AffineRow {
                    csf: table.required_number(r, col::DEPTH_CSF.name)?,
                    ccsf: table.required_number(r, col::DEPTH_CCSF.name)?,
                    offset: table.required_number(r, col::OFFSET.name)?,
                    differential_offset: table.number(r, col::DIFFERENTIAL_OFFSET.name)?.unwrap_or(0.0),
                    growth_rate: table.number(r, col::GROWTH_RATE.name)?.unwrap_or(0.0),
                    shift_type,
                    tie,
                    data_used: table.text(r, col::DATA_USED.name).to_string(),
                    comment: table.text(r, col::COMMENT.name).to_string(),
                    core,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(name, rows))
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>) -> Result<Self> {
        let (table, source) = reader.load(path, AFFINE_TABLE)?;
        Self::from_table(source.file, &table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[AffineRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AffineRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, core: &CoreKey) -> Option<&AffineRow> {
        self.rows.iter().find(|r| r.key() == *core)
    }

    /// Cumulative offset of a core.
    pub fn offset(&self, core: &CoreKey) -> Option<f64> {
        self.get(core).map(|r| r.offset)
    }

    /// Distinct sites in order of first appearance.
    pub fn sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !sites.contains(&row.core.site.as_str()) {
                sites.push(&row.core.site);
            }
        }
        sites
    }
}

/// `B13` → (`B`, `13`).
fn split_hole_core(text: &str) -> Option<(String, String)> {
    let split = text.find(|c: char| c.is_ascii_digit())?;
    let (hole, core) = text.split_at(split);
    if hole.is_empty() || !core.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((hole.to_string(), core.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_type_round_trip_text() {
        for t in [ShiftType::Tie, ShiftType::Set, ShiftType::Rel, ShiftType::Anchor] {
            assert_eq!(t.to_string().parse::<ShiftType>().unwrap(), t);
        }
        assert_eq!(" rel ".parse::<ShiftType>().unwrap(), ShiftType::Rel);
        assert!("SHIFT".parse::<ShiftType>().is_err());
    }

    #[test]
    fn test_tie_cells() {
        let row = AffineRow::new(CoreIdentity::new("1", "B", "2", "H"), 3.0, 0.298, ShiftType::Tie)
            .with_tie(TiePoint {
                fixed_core: CoreKey::new("1", "A", "2"),
                fixed_csf: 4.5,
                shifted_csf: 4.202,
            });
        let cells = row.cells();
        assert_eq!(cells[9], "TIE");
        assert_eq!(cells[10], "A2");
        assert_eq!(cells[11], "4.5");
        assert_eq!(cells[12], "4.202");
    }

    #[test]
    fn test_split_hole_core() {
        assert_eq!(split_hole_core("B13"), Some(("B".to_string(), "13".to_string())));
        assert_eq!(split_hole_core("13"), None);
        assert_eq!(split_hole_core(""), None);
        assert_eq!(split_hole_core("B1x"), None);
    }

    #[test]
    fn test_lookup_by_key() {
        let table = AffineTable::new(
            "affine",
            vec![AffineRow::new(CoreIdentity::new("1", "A", "1", "H"), 0.0, 0.0, ShiftType::Rel)],
        );
        assert_eq!(table.offset(&CoreKey::new("1", "A", "1")), Some(0.0));
        assert!(table.get(&CoreKey::new("1", "A", "2")).is_none());
    }
}
