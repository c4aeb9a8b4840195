//! Fuzz target for the table reader.
//!
//! Feeds arbitrary bytes through delimiter detection and every table format,
//! which must fail with an error rather than panic.

#![no_main]

use coresplice::model::{ManualCorrelation, SectionSummary, SparseSplice, SpliceIntervalTable};
use coresplice::tabular::formats::{SECTION_SUMMARY, SPARSE_SPLICE, SPLICE_INTERVAL_TABLE};
use coresplice::tabular::MappedTable;
use coresplice::TableReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let reader = TableReader::new();
    let Ok(table) = reader.read_bytes(data) else {
        return;
    };

    if let Ok(mapped) = MappedTable::new(table.clone(), SECTION_SUMMARY) {
        let _ = SectionSummary::from_table("fuzz", &mapped);
    }
    if let Ok(mapped) = MappedTable::new(table.clone(), SPARSE_SPLICE) {
        let _ = SparseSplice::from_table("fuzz", &mapped);
    }
    if let Ok(mapped) = MappedTable::new(table.clone(), SPLICE_INTERVAL_TABLE) {
        let _ = SpliceIntervalTable::from_table("fuzz", &mapped);
    }
    let _ = ManualCorrelation::from_table(table);
});
