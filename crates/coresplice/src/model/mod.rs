//! Typed tables exchanged between the pipeline stages.

pub mod affine;
pub mod correlation;
pub mod measurement;
pub mod section_summary;
pub mod sparse_splice;
pub mod splice_interval;

pub use affine::{AffineRow, AffineTable, ShiftType, TiePoint};
pub use correlation::{CorrelationEntry, CorrelationPoint, ManualCorrelation, OffsetEntry, TiePointEntry};
pub use measurement::{MeasurementData, DEFAULT_DEPTH_COLUMN};
pub use section_summary::{Gap, SectionRow, SectionSummary};
pub use sparse_splice::{Join, SectionOffset, SparseInterval, SparseSplice, SpliceType};
pub use splice_interval::{SitRow, SpliceIntervalTable};

/// Round to millimeter precision.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
