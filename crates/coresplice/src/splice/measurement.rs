//! Measurement Splicer: composite depths for measurement rows.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::config::ExportOptions;
use crate::context::RunContext;
use crate::diagnostics::{Observation, ObservationKind, Severity};
use crate::error::Result;
use crate::identity::CoreKey;
use crate::model::{round3, AffineTable, MeasurementData, SpliceIntervalTable};
use crate::tabular::{format_number, TableWriter};

pub const RAW_DEPTH_COLUMN: &str = "RawDepth";
pub const OFFSET_COLUMN: &str = "Offset";
pub const ON_SPLICE_COLUMN: &str = "On-Splice";

/// Measurement rows with composite depths, ready to write.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SplicedMeasurements {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub on_splice: usize,
    pub off_splice: usize,
    /// Rows left out because their core has no affine row.
    pub unmatched: usize,
}

impl SplicedMeasurements {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn write<W: Write>(&self, writer: &TableWriter, out: W) -> Result<()> {
        writer.write(out, &self.headers, self.rows.iter().cloned())
    }
}

/// Shift every measurement row onto the composite depth scale.
///
/// Rows inside a splice interval come first, interval by interval, flagged
/// on-splice. The rest follow core by core in affine-row order.
pub fn splice_measurements(
    affine: &AffineTable,
    sit: &SpliceIntervalTable,
    data: &MeasurementData,
    options: &ExportOptions,
    ctx: &mut RunContext<'_>,
) -> Result<SplicedMeasurements> {
    let depth_index = data.depth_index();
    let mut by_core: HashMap<CoreKey, Vec<usize>> = HashMap::new();
    let mut depths = Vec::with_capacity(data.len());
    for row in 0..data.len() {
        by_core.entry(data.core_key(row)).or_default().push(row);
        depths.push(data.depth(row)?);
    }

    let mut out = SplicedMeasurements {
        headers: spliced_headers(data.headers(), depth_index),
        ..Default::default()
    };
    let mut emitted = vec![false; data.len()];
    let emit = |row: usize, offset: f64, on_splice: bool| -> Vec<String> {
        let mut cells = data.cells(row).to_vec();
        let depth = depths[row].map(|d| format_number(round3(d + offset))).unwrap_or_default();
        let flag = if on_splice { "TRUE" } else { "FALSE" };
        let tail = [depth, format_number(offset), flag.to_string()];
        cells.splice(depth_index + 1..depth_index + 1, tail);
        cells
    };

    for (index, interval) in sit.rows().iter().enumerate() {
        let offset = interval.offset();
        let sections = interval.sections();
        let mut matched = 0usize;
        for &row in by_core.get(&interval.key()).map(Vec::as_slice).unwrap_or_default() {
            if emitted[row] || !sections.iter().any(|s| s == data.section(row)) {
                continue;
            }
            let in_range = options.whole_splice_section
                || depths[row].is_some_and(|d| interval.top_csf <= d && d <= interval.bottom_csf);
            if in_range {
                emitted[row] = true;
                out.rows.push(emit(row, offset, true));
                matched += 1;
            }
        }
        out.on_splice += matched;
        tracing::debug!(interval = index + 1, core = %interval.key(), rows = matched, "spliced measurement rows");
        if matched == 0 {
            ctx.record(Observation::new(
                ObservationKind::EmptySpliceInterval,
                Severity::Info,
                interval.interval.to_string(),
                format!("no rows of {} fall in splice interval {}", data.name(), index + 1),
            ));
        }
    }

    if options.include_off_splice {
        for affine_row in affine.rows() {
            let Some(rows) = by_core.get(&affine_row.key()) else {
                continue;
            };
            for &row in rows {
                if !emitted[row] {
                    emitted[row] = true;
                    out.rows.push(emit(row, affine_row.offset, false));
                    out.off_splice += 1;
                }
            }
        }

        out.unmatched = emitted.iter().filter(|e| !**e).count();
        if out.unmatched > 0 {
            ctx.record(
                Observation::warning(
                    ObservationKind::UnmatchedMeasurementRows,
                    data.name(),
                    format!("{} rows belong to cores without an affine row and were left out", out.unmatched),
                )
                .with_value(out.unmatched as f64),
            );
        }
    }

    Ok(out)
}

/// Input headers with the depth column renamed and the computed columns
/// inserted right after it.
fn spliced_headers(headers: &[String], depth_index: usize) -> Vec<String> {
    let mut spliced = headers.to_vec();
    let depth = std::mem::replace(&mut spliced[depth_index], RAW_DEPTH_COLUMN.to_string());
    spliced.splice(
        depth_index + 1..depth_index + 1,
        [depth, OFFSET_COLUMN.to_string(), ON_SPLICE_COLUMN.to_string()],
    );
    spliced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpliceConfig;
    use crate::identity::CoreIdentity;
    use crate::model::{AffineRow, Join, SectionOffset, ShiftType, SitRow, SparseInterval};
    use crate::tabular::TableReader;

    fn sit() -> SpliceIntervalTable {
        SpliceIntervalTable::new(
            "sit",
            vec![SitRow {
                interval: SparseInterval::new(
                    CoreIdentity::new("1", "A", "1", "H"),
                    SectionOffset::new("1", 0.0),
                    SectionOffset::new("2", 50.0),
                    Join::default(),
                ),
                top_csf: 0.0,
                top_ccsf: 0.1,
                bottom_csf: 2.0,
                bottom_ccsf: 2.1,
            }],
        )
    }

    fn affine() -> AffineTable {
        AffineTable::new(
            "affine",
            vec![
                AffineRow::new(CoreIdentity::new("1", "A", "1", "H"), 0.0, 0.1, ShiftType::Rel),
                AffineRow::new(CoreIdentity::new("1", "B", "1", "H"), 0.5, 0.25, ShiftType::Rel),
            ],
        )
    }

    fn data() -> MeasurementData {
        let csv = "Site,Hole,Core,Tool,Section,Depth,Value\n\
                   1,B,1,H,1,0.7,9\n\
                   1,A,1,H,1,0.5,1\n\
                   1,A,1,H,2,1.9,2\n\
                   1,A,1,H,2,2.4,3\n\
                   1,C,1,H,1,0.2,4\n";
        let table = TableReader::new().read_bytes(csv.as_bytes()).unwrap();
        MeasurementData::from_table("md", table, "Depth").unwrap()
    }

    #[test]
    fn test_headers_and_on_splice_rows_first() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let out = splice_measurements(&affine(), &sit(), &data(), &ExportOptions::default(), &mut ctx).unwrap();

        assert_eq!(
            out.headers,
            vec!["Site", "Hole", "Core", "Tool", "Section", "RawDepth", "Depth", "Offset", "On-Splice", "Value"]
        );
        assert_eq!(out.on_splice, 2);
        assert_eq!(out.off_splice, 2);
        assert_eq!(out.unmatched, 1);
        assert_eq!(out.rows[0][6], "0.6");
        assert_eq!(out.rows[0][8], "TRUE");
        assert_eq!(out.rows[1][9], "2");
        // A1 below the interval, then B1
        assert_eq!(out.rows[2][9], "3");
        assert_eq!(out.rows[2][8], "FALSE");
        assert_eq!(out.rows[3][6], "0.95");
        assert!(ctx.diagnostics().has(ObservationKind::UnmatchedMeasurementRows));
    }

    #[test]
    fn test_on_splice_only_whole_section() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let options = ExportOptions::default()
            .with_include_off_splice(false)
            .with_whole_splice_section(true);
        let out = splice_measurements(&affine(), &sit(), &data(), &options, &mut ctx).unwrap();
        assert_eq!(out.on_splice, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out.unmatched, 0);
        assert!(out.rows.iter().all(|r| r[8] == "TRUE"));
    }

    #[test]
    fn test_empty_interval_noted() {
        let csv = "Site,Hole,Core,Tool,Section,Depth\n1,B,1,H,1,0.7\n";
        let table = TableReader::new().read_bytes(csv.as_bytes()).unwrap();
        let data = MeasurementData::from_table("md", table, "Depth").unwrap();
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        splice_measurements(&affine(), &sit(), &data, &ExportOptions::default(), &mut ctx).unwrap();
        assert!(ctx.diagnostics().has(ObservationKind::EmptySpliceInterval));
    }
}
