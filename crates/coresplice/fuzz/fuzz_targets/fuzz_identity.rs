//! Fuzz target for identifier and gap parsing.
//!
//! Section identifiers, splice types and gap lists come straight from user
//! files; parsing them must never panic.

#![no_main]

use coresplice::model::section_summary::parse_gaps;
use coresplice::model::SpliceType;
use coresplice::tabular::columns::normalize;
use coresplice::SectionIdentity;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = text.parse::<SectionIdentity>();
        let _ = SpliceType::parse(text);
        let _ = parse_gaps(text);
        let _ = normalize(text);
    }
});
