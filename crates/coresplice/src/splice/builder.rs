//! Splice Builder: sparse splice intervals to composite depths.

use std::collections::HashSet;

use crate::config::JoinConvention;
use crate::context::RunContext;
use crate::diagnostics::{Observation, ObservationKind, Severity};
use crate::error::{Result, SpliceError};
use crate::model::{
    round3, AffineRow, Join, ShiftType, SitRow, SparseInterval, SpliceType, TiePoint,
};
use crate::progress::ProgressEvent;
use crate::resolver::SectionDepthResolver;

/// What the next interval needs to know about the one before it.
struct Previous<'i> {
    interval: &'i SparseInterval,
    bottom_csf: f64,
    bottom_ccsf: f64,
    shift: f64,
}

/// Shift chosen for an interval and how it was chosen.
struct Placement {
    shift: f64,
    shift_type: ShiftType,
    tie: Option<TiePoint>,
}

/// Resolve every interval's depths in one forward pass.
///
/// Returns the Splice Interval Table rows and one affine row per distinct
/// core, taken from the core's first interval.
pub fn build_sit(
    intervals: &[SparseInterval],
    resolver: &SectionDepthResolver<'_>,
    ctx: &mut RunContext<'_>,
) -> Result<(Vec<SitRow>, Vec<AffineRow>)> {
    let total = intervals.len();
    let mut rows = Vec::with_capacity(total);
    let mut affine = Vec::new();
    let mut seen = HashSet::new();
    let mut previous: Option<Previous<'_>> = None;

    for (index, interval) in intervals.iter().enumerate() {
        let top_csf = resolver.resolve_depth(&interval.top_key(), interval.top.offset, false, ctx)?;
        let bottom_csf =
            resolver.resolve_depth(&interval.bottom_key(), interval.bottom.offset, false, ctx)?;
        if !top_csf.is_finite() || !bottom_csf.is_finite() || top_csf >= bottom_csf {
            return Err(SpliceError::InvertedInterval {
                index: index + 1,
                core: interval.core.to_string(),
                top: top_csf,
                bottom: bottom_csf,
            });
        }

        let placement = match &previous {
            None => Placement {
                shift: 0.0,
                shift_type: ShiftType::Rel,
                tie: None,
            },
            Some(prev) => place(index, interval, top_csf, prev, resolver, ctx)?,
        };

        let top_ccsf = round3(top_csf + placement.shift);
        let bottom_ccsf = round3(bottom_csf + placement.shift);
        tracing::debug!(
            interval = index + 1,
            core = %interval.core,
            top_csf,
            top_ccsf,
            bottom_csf,
            bottom_ccsf,
            shift = placement.shift,
            "resolved splice interval"
        );

        let key = interval.core.key();
        if seen.insert(key.clone()) {
            let mut row = AffineRow::new(interval.core.clone(), top_csf, placement.shift, placement.shift_type)
                .with_data_used(interval.data_used.clone())
                .with_comment("splice");
            row.tie = placement.tie;
            affine.push(row);
        } else {
            ctx.record(Observation::new(
                ObservationKind::DuplicateSpliceCore,
                Severity::Error,
                key.to_string(),
                format!(
                    "core already spliced, interval {} keeps the first interval's affine shift",
                    index + 1
                ),
            ));
        }

        rows.push(SitRow {
            interval: interval.clone(),
            top_csf,
            top_ccsf,
            bottom_csf,
            bottom_ccsf,
        });

        ctx.progress(ProgressEvent::IntervalResolved {
            index,
            total,
            core: key,
        });

        previous = Some(Previous {
            interval,
            bottom_csf,
            bottom_ccsf,
            shift: placement.shift,
        });
    }

    Ok((rows, affine))
}

/// Shift for an interval that follows `prev`.
fn place(
    index: usize,
    interval: &SparseInterval,
    top_csf: f64,
    prev: &Previous<'_>,
    resolver: &SectionDepthResolver<'_>,
    ctx: &mut RunContext<'_>,
) -> Result<Placement> {
    let config = ctx.config();
    let join: Join = match config.join_convention {
        JoinConvention::Leading => interval.join,
        JoinConvention::Trailing => prev.interval.join,
    };
    let splice_type = join.splice_type.ok_or_else(|| {
        SpliceError::Format(format!(
            "Interval {} ({}) has no splice type joining it to interval {} ({})",
            index + 1,
            interval.core,
            index,
            prev.interval.core
        ))
    })?;

    let mut shift = match (splice_type, join.gap) {
        (SpliceType::Tie, _) => prev.bottom_ccsf - top_csf,
        (SpliceType::Append, Some(gap)) => (prev.bottom_ccsf + gap) - top_csf,
        (SpliceType::Append, None) => {
            let same_hole = interval.core.site == prev.interval.core.site
                && interval.core.hole == prev.interval.core.hole;
            if same_hole || config.lazy_append {
                prev.shift
            } else {
                let scaled_top =
                    resolver.resolve_depth(&interval.top_key(), interval.top.offset, true, ctx)?;
                let scaled_bottom = resolver.resolve_depth(
                    &prev.interval.bottom_key(),
                    prev.interval.bottom.offset,
                    true,
                    ctx,
                )?;
                let scaled_gap = round3(scaled_top - scaled_bottom);
                if scaled_gap < 0.0 {
                    ctx.record(
                        Observation::warning(
                            ObservationKind::NegativeScaledGap,
                            interval.core.key().to_string(),
                            format!(
                                "previous interval bottom is {}m below this interval's top in scaled depth",
                                -scaled_gap
                            ),
                        )
                        .with_value(scaled_gap),
                    );
                }
                (prev.bottom_ccsf - top_csf) + scaled_gap
            }
        }
    };
    shift = round3(shift);

    let overlap = round3(prev.bottom_ccsf - round3(top_csf + shift));
    if overlap > 0.0 {
        ctx.record(
            Observation::warning(
                ObservationKind::IntervalOverlap,
                interval.core.key().to_string(),
                format!(
                    "previous interval bottom {}m is below this interval's top {}m",
                    prev.bottom_ccsf,
                    round3(top_csf + shift)
                ),
            )
            .with_value(overlap),
        );
        if splice_type == SpliceType::Append {
            shift = round3(shift + overlap);
            ctx.record(
                Observation::warning(
                    ObservationKind::OverlapCorrected,
                    interval.core.key().to_string(),
                    format!("APPEND shift raised to {}m to remove {}m overlap", shift, overlap),
                )
                .with_value(overlap),
            );
        }
    }

    let shift_type = match (splice_type, join.gap) {
        (SpliceType::Tie, _) => ShiftType::Tie,
        (SpliceType::Append, Some(_)) => ShiftType::Set,
        (SpliceType::Append, None) => ShiftType::Rel,
    };
    let tie = (splice_type == SpliceType::Tie).then(|| TiePoint {
        fixed_core: prev.interval.core.key(),
        fixed_csf: prev.bottom_csf,
        shifted_csf: top_csf,
    });

    Ok(Placement {
        shift,
        shift_type,
        tie,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpliceConfig;
    use crate::diagnostics::Diagnostics;
    use crate::identity::CoreIdentity;
    use crate::model::{SectionOffset, SectionRow, SectionSummary};

    fn section(hole: &str, core: &str, section: &str, top: f64, bottom: f64) -> SectionRow {
        SectionRow {
            core: CoreIdentity::new("1", hole, core, "H"),
            section: section.to_string(),
            top_depth: top,
            bottom_depth: bottom,
            top_depth_scaled: Some(top),
            bottom_depth_scaled: Some(bottom),
            curated_length: bottom - top,
            gaps: Vec::new(),
        }
    }

    fn interval(hole: &str, core: &str, top: (&str, f64), bottom: (&str, f64), join: Join) -> SparseInterval {
        SparseInterval::new(
            CoreIdentity::new("1", hole, core, "H"),
            SectionOffset::new(top.0, top.1),
            SectionOffset::new(bottom.0, bottom.1),
            join,
        )
    }

    fn summary() -> SectionSummary {
        SectionSummary::from_rows(
            "ss",
            vec![
                section("A", "1", "1", 0.0, 1.5),
                section("A", "1", "2", 1.5, 3.0),
                section("A", "2", "1", 3.0, 4.5),
                section("B", "1", "1", 0.5, 2.0),
                section("B", "1", "2", 2.0, 3.5),
                section("B", "2", "1", 3.6, 5.1),
            ],
        )
        .unwrap()
    }

    fn run(intervals: &[SparseInterval], config: &SpliceConfig) -> (Vec<SitRow>, Vec<AffineRow>, Diagnostics) {
        let summary = summary();
        let resolver = SectionDepthResolver::new(&summary);
        let mut ctx = RunContext::new(config);
        let (rows, affine) = build_sit(intervals, &resolver, &mut ctx).unwrap();
        (rows, affine, ctx.into_diagnostics())
    }

    #[test]
    fn test_first_interval_unshifted() {
        let (rows, affine, _) = run(
            &[interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default())],
            &SpliceConfig::default(),
        );
        assert_eq!(rows[0].top_ccsf, 0.0);
        assert_eq!(rows[0].bottom_ccsf, 2.5);
        assert_eq!(affine[0].shift_type, ShiftType::Rel);
        assert_eq!(affine[0].offset, 0.0);
    }

    #[test]
    fn test_tie_lands_on_previous_bottom() {
        let (rows, affine, _) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "1", ("2", 30.0), ("2", 140.0), Join::tie()),
            ],
            &SpliceConfig::default(),
        );
        // B1 top = 2.3 CSF, tied to A1 bottom at 2.5
        assert_eq!(rows[1].top_csf, 2.3);
        assert_eq!(rows[1].top_ccsf, rows[0].bottom_ccsf);
        assert_eq!(affine[1].offset, 0.2);
        assert_eq!(affine[1].shift_type, ShiftType::Tie);
        let tie = affine[1].tie.as_ref().unwrap();
        assert_eq!(tie.fixed_core.hole_core(), "A1");
        assert_eq!(tie.fixed_csf, 2.5);
        assert_eq!(tie.shifted_csf, 2.3);
    }

    #[test]
    fn test_same_hole_append_inherits_shift() {
        let (rows, affine, _) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("A", "2", ("1", 0.0), ("1", 100.0), Join::append(None)),
            ],
            &SpliceConfig::default(),
        );
        assert_eq!(affine[0].offset, affine[1].offset);
        assert_eq!(rows[1].top_ccsf, 3.0);
        assert_eq!(affine[1].shift_type, ShiftType::Rel);
    }

    #[test]
    fn test_append_with_gap_is_set() {
        let (rows, affine, _) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "2", ("1", 0.0), ("1", 100.0), Join::append(Some(0.25))),
            ],
            &SpliceConfig::default(),
        );
        assert_eq!(rows[1].top_ccsf, 2.75);
        assert_eq!(affine[1].shift_type, ShiftType::Set);
        assert_eq!(affine[1].offset, -0.85);
    }

    #[test]
    fn test_inter_hole_append_keeps_scaled_gap() {
        let (rows, _, _) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "2", ("1", 0.0), ("1", 100.0), Join::append(None)),
            ],
            &SpliceConfig::default(),
        );
        // scaled gap between A1 bottom (2.5) and B2 top (3.6) is 1.1m
        assert_eq!(rows[1].top_ccsf, 3.6);

        let lazy = SpliceConfig::default().with_lazy_append(true);
        let (rows, _, _) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "2", ("1", 0.0), ("1", 100.0), Join::append(None)),
            ],
            &lazy,
        );
        assert_eq!(rows[1].top_ccsf, 3.6);
        assert_eq!(rows[1].offset(), 0.0);
    }

    #[test]
    fn test_append_overlap_corrected_tie_overlap_kept() {
        let (rows, _, diagnostics) = run(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "2", ("1", 0.0), ("1", 100.0), Join::append(Some(-0.5))),
            ],
            &SpliceConfig::default(),
        );
        assert_eq!(rows[1].top_ccsf, rows[0].bottom_ccsf);
        assert!(diagnostics.has(ObservationKind::IntervalOverlap));
        assert!(diagnostics.has(ObservationKind::OverlapCorrected));
    }

    #[test]
    fn test_duplicate_core_is_error_observation() {
        let (rows, affine, diagnostics) = run(
            &[
                interval("A", "1", ("1", 0.0), ("1", 100.0), Join::default()),
                interval("B", "1", ("1", 60.0), ("2", 100.0), Join::tie()),
                interval("A", "1", ("2", 50.0), ("2", 140.0), Join::tie()),
            ],
            &SpliceConfig::default(),
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(affine.len(), 2);
        assert_eq!(diagnostics.count(Severity::Error), 1);
    }

    #[test]
    fn test_trailing_convention_uses_previous_join() {
        let intervals = [
            interval("A", "1", ("1", 0.0), ("2", 100.0), Join::tie()),
            interval("B", "1", ("2", 30.0), ("2", 140.0), Join::default()),
        ];
        let trailing = SpliceConfig::default().with_join_convention(JoinConvention::Trailing);
        let (rows, affine, _) = run(&intervals, &trailing);
        assert_eq!(rows[1].top_ccsf, rows[0].bottom_ccsf);
        // classified by the join that placed it, not its own empty type
        assert_eq!(affine[1].shift_type, ShiftType::Tie);
        assert_eq!(affine[1].tie.as_ref().unwrap().fixed_core.hole_core(), "A1");

        let summary = summary();
        let config = SpliceConfig::default();
        let resolver = SectionDepthResolver::new(&summary);
        let mut ctx = RunContext::new(&config);
        let err = build_sit(&intervals, &resolver, &mut ctx).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_inverted_interval_is_fatal() {
        let summary = summary();
        let config = SpliceConfig::default();
        let resolver = SectionDepthResolver::new(&summary);
        let mut ctx = RunContext::new(&config);
        let err = build_sit(
            &[interval("A", "1", ("2", 50.0), ("1", 10.0), Join::default())],
            &resolver,
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, SpliceError::InvertedInterval { index: 1, .. }));
    }

    #[test]
    fn test_nan_offset_is_fatal() {
        let summary = summary();
        let config = SpliceConfig::default();
        let resolver = SectionDepthResolver::new(&summary);
        let mut ctx = RunContext::new(&config);
        let err = build_sit(
            &[
                interval("A", "1", ("1", 0.0), ("2", 100.0), Join::default()),
                interval("B", "1", ("2", f64::NAN), ("2", 140.0), Join::tie()),
            ],
            &resolver,
            &mut ctx,
        )
        .unwrap_err();
        assert!(matches!(err, SpliceError::InvertedInterval { index: 2, .. }));
    }
}
