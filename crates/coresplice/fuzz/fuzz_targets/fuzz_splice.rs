//! Fuzz target for sparse splice conversion.
//!
//! Builds a small Section Summary and a sparse splice from arbitrary input and
//! runs the full conversion, which may reject the splice but must not panic.

#![no_main]

use arbitrary::Arbitrary;
use coresplice::model::{Join, SectionOffset, SectionRow};
use coresplice::{CoreIdentity, SectionSummary, SparseInterval, SparseSplice, SpliceConfig, Splicer};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInterval {
    core: u8,
    top_cm: u8,
    bottom_cm: u8,
    join: u8,
    gap_cm: i8,
}

#[derive(Debug, Arbitrary)]
struct FuzzSplice {
    lazy_append: bool,
    core_tops_cm: Vec<u16>,
    intervals: Vec<FuzzInterval>,
}

fuzz_target!(|input: FuzzSplice| {
    if input.core_tops_cm.is_empty() || input.core_tops_cm.len() > 16 || input.intervals.len() > 32 {
        return;
    }

    let core = |i: usize| {
        let hole = if i % 2 == 0 { "A" } else { "B" };
        CoreIdentity::new("1", hole, (i + 1).to_string(), "H")
    };
    let rows = input
        .core_tops_cm
        .iter()
        .enumerate()
        .map(|(i, &top)| {
            let top = top as f64 / 100.0;
            SectionRow {
                core: core(i),
                section: "1".to_string(),
                top_depth: top,
                bottom_depth: top + 1.5,
                top_depth_scaled: Some(top),
                bottom_depth_scaled: Some(top + 1.4),
                curated_length: 1.5,
                gaps: Vec::new(),
            }
        })
        .collect();
    let Ok(summary) = SectionSummary::from_rows("fuzz", rows) else {
        return;
    };

    let intervals = input
        .intervals
        .iter()
        .map(|fi| {
            let join = match fi.join % 4 {
                0 => Join::default(),
                1 => Join::tie(),
                2 => Join::append(None),
                _ => Join::append(Some(fi.gap_cm as f64 / 100.0)),
            };
            SparseInterval::new(
                core(fi.core as usize % input.core_tops_cm.len()),
                SectionOffset::new("1", fi.top_cm as f64),
                SectionOffset::new("1", fi.bottom_cm as f64),
                join,
            )
        })
        .collect();
    let sparse = SparseSplice::new("fuzz", intervals);

    let splicer = Splicer::with_config(SpliceConfig::default().with_lazy_append(input.lazy_append));
    let _ = splicer.convert(&summary, &sparse, None);
});
