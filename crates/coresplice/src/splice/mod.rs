//! The splicing pipeline: sparse splice to SIT, off-splice shifts, summary
//! columns, and measurement export.

mod builder;
mod finish;
mod measurement;
mod offsplice;

pub use builder::build_sit;
pub use finish::finish;
pub use measurement::{
    splice_measurements, SplicedMeasurements, OFFSET_COLUMN, ON_SPLICE_COLUMN, RAW_DEPTH_COLUMN,
};
pub use offsplice::resolve_off_splice;
