//! coresplice: composite depth splicing for multi-hole drill cores.
//!
//! Cores from neighbouring holes overlap in depth but not in what they
//! recovered. A sparse splice picks the best interval from each core; this
//! crate turns it into a Splice Interval Table (SIT) on the composite depth
//! scale (CCSF) and an affine table giving every core's shift from drilled
//! depth (CSF).
//!
//! # Core Principles
//!
//! - **Explicit conventions**: how a splice type describes a join is configured, not guessed
//! - **Non-destructive**: inputs are never modified; outputs are staged and written together
//! - **Full provenance**: every correction and fallback is recorded as an observation
//!
//! # Example
//!
//! ```no_run
//! use coresplice::{ConversionInputs, ConversionOutputs, Splicer};
//!
//! let splicer = Splicer::new();
//! let report = splicer
//!     .convert_files(
//!         &ConversionInputs::new("section_summary.csv", "sparse_splice.csv"),
//!         &ConversionOutputs::default()
//!             .with_sit("sit.csv")
//!             .with_affine("affine.csv"),
//!     )
//!     .unwrap();
//!
//! println!("Intervals: {}", report.summary.intervals);
//! println!("Affine rows: {}", report.summary.affine_rows);
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod identity;
pub mod model;
pub mod progress;
pub mod resolver;
pub mod splice;
pub mod tabular;

mod context;
mod splicer;

pub use crate::splicer::{
    ConversionInputs, ConversionOutputs, ConversionReport, ConversionResult, ConversionSummary,
    ExportResult, ObservationCounts, Splicer,
};
pub use config::{ExportOptions, JoinConvention, SpliceConfig};
pub use context::RunContext;
pub use diagnostics::{Diagnostics, Observation, ObservationKind, Severity};
pub use error::{Result, SpliceError};
pub use identity::{CoreIdentity, CoreKey, SectionIdentity, SectionKey};
pub use model::{
    AffineRow, AffineTable, ManualCorrelation, MeasurementData, SectionSummary, ShiftType,
    SitRow, SparseInterval, SparseSplice, SpliceIntervalTable, SpliceType,
};
pub use progress::{NoProgress, ProgressEvent, ProgressListener, Stage};
pub use resolver::SectionDepthResolver;
pub use splice::{build_sit, finish, resolve_off_splice, splice_measurements, SplicedMeasurements};
pub use tabular::{OutputVocabulary, ReaderConfig, TableReader, TableWriter};
