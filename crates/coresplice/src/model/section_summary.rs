//! Section Summary: drilled and curated extent of every section.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::round3;
use crate::error::{Result, SpliceError};
use crate::identity::{CoreIdentity, CoreKey, SectionKey};
use crate::tabular::formats::{col, SECTION_SUMMARY};
use crate::tabular::{format_number, format_optional, MappedTable, TableFormat, TableReader, TabularRecord};

/// A section interval excluded from depth calculations, in cm from the section top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub top: f64,
    pub bottom: f64,
}

impl Gap {
    pub fn length(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Parse space-delimited `top-bottom` pairs, e.g. `0-0.5 94.5-96`.
pub fn parse_gaps(text: &str) -> Result<Vec<Gap>> {
    text.split_whitespace()
        .map(|pair| {
            let malformed = || SpliceError::Format(format!("Malformed gap '{}'", pair));
            let (top, bottom) = pair.split_once('-').ok_or_else(malformed)?;
            let top: f64 = top.trim().parse().map_err(|_| malformed())?;
            let bottom: f64 = bottom.trim().parse().map_err(|_| malformed())?;
            if !top.is_finite() || !bottom.is_finite() {
                return Err(malformed());
            }
            Ok(Gap { top, bottom })
        })
        .collect()
}

/// Inverse of [`parse_gaps`].
pub fn format_gaps(gaps: &[Gap]) -> String {
    gaps.iter()
        .map(|g| format!("{}-{}", format_number(g.top), format_number(g.bottom)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One Section Summary row. Depths in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub core: CoreIdentity,
    pub section: String,
    pub top_depth: f64,
    pub bottom_depth: f64,
    pub top_depth_scaled: Option<f64>,
    pub bottom_depth_scaled: Option<f64>,
    pub curated_length: f64,
    pub gaps: Vec<Gap>,
}

impl SectionRow {
    pub fn key(&self) -> SectionKey {
        self.core.section(self.section.clone())
    }

    /// Total length in cm of gaps starting strictly above `offset_cm`.
    pub fn gap_above(&self, offset_cm: f64) -> f64 {
        self.gaps
            .iter()
            .filter(|g| g.top < offset_cm)
            .map(Gap::length)
            .sum()
    }

    fn validate(&self) -> Result<()> {
        let fail = |what: String| -> Result<()> {
            Err(SpliceError::Format(format!("Section {}: {}", self.key(), what)))
        };

        let depths = [
            ("top depth", Some(self.top_depth)),
            ("bottom depth", Some(self.bottom_depth)),
            ("scaled top depth", self.top_depth_scaled),
            ("scaled bottom depth", self.bottom_depth_scaled),
            ("curated length", Some(self.curated_length)),
        ];
        for (what, value) in depths {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return fail(format!("{} {} is not a finite number", what, v));
            }
        }

        if self.bottom_depth < self.top_depth {
            return fail(format!(
                "bottom depth {}m is above top depth {}m",
                self.bottom_depth, self.top_depth
            ));
        }
        if self.curated_length < 0.0 {
            return fail(format!("negative curated length {}m", self.curated_length));
        }

        let length_cm = self.curated_length * 100.0;
        let mut sorted = self.gaps.clone();
        sorted.sort_by(|a, b| a.top.total_cmp(&b.top));
        for (i, gap) in sorted.iter().enumerate() {
            if gap.top > gap.bottom {
                return fail(format!("gap {}-{} has top below bottom", gap.top, gap.bottom));
            }
            if gap.top < 0.0 || gap.bottom > length_cm {
                return fail(format!(
                    "gap {}-{} lies outside the section's {}cm",
                    gap.top, gap.bottom, length_cm
                ));
            }
            if i > 0 && sorted[i - 1].bottom > gap.top {
                return fail(format!(
                    "gaps {}-{} and {}-{} overlap",
                    sorted[i - 1].top,
                    sorted[i - 1].bottom,
                    gap.top,
                    gap.bottom
                ));
            }
        }
        Ok(())
    }
}

impl TabularRecord for SectionRow {
    const FORMAT: TableFormat = SECTION_SUMMARY;

    fn cells(&self) -> Vec<String> {
        vec![
            self.core.site.clone(),
            self.core.hole.clone(),
            self.core.core.clone(),
            self.core.tool.clone(),
            self.section.clone(),
            format_number(self.top_depth),
            format_number(self.bottom_depth),
            format_optional(self.top_depth_scaled),
            format_optional(self.bottom_depth_scaled),
            format_number(self.curated_length),
            format_gaps(&self.gaps),
        ]
    }
}

/// Validated, indexed Section Summary.
#[derive(Debug, Clone)]
pub struct SectionSummary {
    name: String,
    rows: Vec<SectionRow>,
    index: HashMap<SectionKey, usize>,
}

impl SectionSummary {
    /// Validate rows and index them by [`SectionKey`].
    pub fn from_rows(name: impl Into<String>, rows: Vec<SectionRow>) -> Result<Self> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            row.validate()?;
            if index.insert(row.key(), i).is_some() {
                return Err(SpliceError::Format(format!(
                    "Section {} appears more than once",
                    row.key()
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            rows,
            index,
        })
    }

    pub fn from_table(name: impl Into<String>, table: &MappedTable) -> Result<Self> {
        let rows = (0..table.row_count())
            .map(|r| -> Result<SectionRow> {
                let gaps = parse_gaps(table.text(r, col::GAPS.name))
                    .map_err(|e| table.parse_error(r, col::GAPS.name, e.to_string()))?;
                Ok(SectionRow {
                    core: CoreIdentity::new(
                        table.text(r, col::SITE.name),
                        table.text(r, col::HOLE.name),
                        table.text(r, col::CORE.name),
                        table.text(r, col::TOOL.name),
                    ),
                    section: table.text(r, col::SECTION.name).to_string(),
                    top_depth: table.required_number(r, col::TOP_DEPTH.name)?,
                    bottom_depth: table.required_number(r, col::BOTTOM_DEPTH.name)?,
                    top_depth_scaled: table.number(r, col::TOP_DEPTH_SCALED.name)?,
                    bottom_depth_scaled: table.number(r, col::BOTTOM_DEPTH_SCALED.name)?,
                    curated_length: table.required_number(r, col::CURATED_LENGTH.name)?,
                    gaps,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(name, rows)
    }

    pub fn load(reader: &TableReader, path: impl AsRef<Path>) -> Result<Self> {
        let (table, source) = reader.load(path, SECTION_SUMMARY)?;
        Self::from_table(source.file, &table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[SectionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &SectionKey) -> Option<&SectionRow> {
        self.index.get(key).map(|&i| &self.rows[i])
    }

    /// Like [`get`](Self::get), but a miss is an error.
    pub fn section(&self, key: &SectionKey) -> Result<&SectionRow> {
        self.get(key)
            .ok_or_else(|| SpliceError::NotFound(format!("section {} in Section Summary", key)))
    }

    /// One row per core: the section "1" rows, in file order.
    pub fn cores(&self) -> impl Iterator<Item = &SectionRow> {
        self.rows.iter().filter(|r| r.section == "1")
    }

    /// Every distinct core, in order of its first row.
    pub fn core_identities(&self) -> Vec<&CoreIdentity> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|r| seen.insert(r.core.key()))
            .map(|r| &r.core)
            .collect()
    }

    pub fn contains_core(&self, core: &CoreKey) -> bool {
        self.rows.iter().any(|r| r.core.key() == *core)
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

    /// Top of the highest and bottom of the lowest section of a core,
    /// ignoring the core catcher.
    pub fn core_range(&self, core: &CoreKey) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter(|r| r.core.key() == *core && r.section != "CC")
            .fold(None, |range, r| match range {
                None => Some((r.top_depth, r.bottom_depth)),
                Some((top, bottom)) => Some((top.min(r.top_depth), bottom.max(r.bottom_depth))),
            })
            .map(|(top, bottom)| (round3(top), round3(bottom)))
    }

    /// First section of a core whose drilled interval contains `depth`.
    pub fn section_at_depth(&self, core: &CoreKey, depth: f64) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.core.key() == *core && r.top_depth <= depth && depth <= r.bottom_depth)
            .map(|r| r.section.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(core: &str, section: &str, top: f64, bottom: f64, length: f64) -> SectionRow {
        SectionRow {
            core: CoreIdentity::new("1", "A", core, "H"),
            section: section.to_string(),
            top_depth: top,
            bottom_depth: bottom,
            top_depth_scaled: None,
            bottom_depth_scaled: None,
            curated_length: length,
            gaps: Vec::new(),
        }
    }

    #[test]
    fn test_parse_gaps() {
        let gaps = parse_gaps("0-0.5  94.5-96").unwrap();
        assert_eq!(gaps, vec![Gap { top: 0.0, bottom: 0.5 }, Gap { top: 94.5, bottom: 96.0 }]);
        assert!(parse_gaps("").unwrap().is_empty());
        assert!(parse_gaps("12").is_err());
        assert!(parse_gaps("a-b").is_err());
        assert_eq!(format_gaps(&gaps), "0-0.5 94.5-96");
    }

    #[test]
    fn test_gap_above_uses_strict_start() {
        let mut r = row("1", "1", 0.0, 1.5, 1.5);
        r.gaps = vec![Gap { top: 0.0, bottom: 2.5 }, Gap { top: 50.0, bottom: 51.0 }];
        assert_eq!(r.gap_above(0.0), 0.0);
        assert_eq!(r.gap_above(50.0), 2.5);
        assert_eq!(r.gap_above(100.0), 3.5);
    }

    #[test]
    fn test_validation_rejects_bad_rows() {
        assert!(SectionSummary::from_rows("ss", vec![row("1", "1", 2.0, 1.0, 1.0)]).is_err());
        assert!(SectionSummary::from_rows("ss", vec![row("1", "1", 0.0, 1.0, -0.1)]).is_err());

        let mut overlapping = row("1", "1", 0.0, 1.5, 1.5);
        overlapping.gaps = vec![Gap { top: 10.0, bottom: 20.0 }, Gap { top: 15.0, bottom: 25.0 }];
        assert!(SectionSummary::from_rows("ss", vec![overlapping]).is_err());

        let mut outside = row("1", "1", 0.0, 1.5, 1.5);
        outside.gaps = vec![Gap { top: 140.0, bottom: 160.0 }];
        assert!(SectionSummary::from_rows("ss", vec![outside]).is_err());

        let duplicate = vec![row("1", "1", 0.0, 1.5, 1.5), row("1", "1", 1.5, 3.0, 1.5)];
        let err = SectionSummary::from_rows("ss", duplicate).unwrap_err();
        assert!(err.is_format_error());

        let mut nan_top = row("1", "1", 0.0, 1.5, 1.5);
        nan_top.top_depth = f64::NAN;
        assert!(SectionSummary::from_rows("ss", vec![nan_top]).unwrap_err().is_format_error());
        let mut infinite_scaled = row("1", "1", 0.0, 1.5, 1.5);
        infinite_scaled.bottom_depth_scaled = Some(f64::INFINITY);
        assert!(SectionSummary::from_rows("ss", vec![infinite_scaled]).is_err());
        let mut nan_length = row("1", "1", 0.0, 1.5, 1.5);
        nan_length.curated_length = f64::NAN;
        assert!(SectionSummary::from_rows("ss", vec![nan_length]).is_err());

        // zero-length core catcher is fine
        assert!(SectionSummary::from_rows("ss", vec![row("1", "CC", 3.0, 3.0, 0.0)]).is_ok());
    }

    #[test]
    fn test_lookups() {
        let ss = SectionSummary::from_rows(
            "ss",
            vec![
                row("1", "1", 0.0, 1.5, 1.5),
                row("1", "2", 1.5, 3.0, 1.5),
                row("1", "CC", 3.0, 3.2, 0.2),
                row("2", "1", 3.2, 4.7, 1.5),
            ],
        )
        .unwrap();
        let core1 = CoreKey::new("1", "A", "1");
        assert_eq!(ss.cores().count(), 2);
        assert_eq!(ss.core_identities().len(), 2);
        assert_eq!(ss.core_range(&core1), Some((0.0, 3.0)));
        assert_eq!(ss.section_at_depth(&core1, 2.0), Some("2"));
        assert!(ss.contains_core(&CoreKey::new("1", "A", "2")));
        assert!(!ss.contains_core(&CoreKey::new("1", "B", "2")));
        assert_eq!(ss.sites(), vec!["1"]);
        assert!(matches!(
            ss.section(&SectionKey::new("1", "A", "9", "1")),
            Err(SpliceError::NotFound(_))
        ));
    }
}
