//! Off-Splice Affine Resolver: shifts for cores the splice never visits.

use std::collections::HashSet;

use crate::context::RunContext;
use crate::diagnostics::{Observation, ObservationKind, Severity};
use crate::error::{Result, SpliceError};
use crate::identity::{CoreIdentity, CoreKey};
use crate::model::{
    round3, AffineRow, CorrelationEntry, ManualCorrelation, OffsetEntry, ShiftType,
    SpliceIntervalTable, TiePoint, TiePointEntry,
};
use crate::progress::ProgressEvent;
use crate::resolver::SectionDepthResolver;

const COMMENT: &str = "off-splice";

/// One affine row for every Section Summary core absent from the splice.
///
/// A manual correlation is consulted first; cores it does not pin take the
/// offset of the on-splice core whose top is nearest their own.
pub fn resolve_off_splice(
    sit: &SpliceIntervalTable,
    resolver: &SectionDepthResolver<'_>,
    correlation: Option<&ManualCorrelation>,
    ctx: &mut RunContext<'_>,
) -> Result<Vec<AffineRow>> {
    let summary = resolver.summary();
    let restrict = ctx.config().restrict_to_splice_sites;
    let splice_sites: HashSet<&str> = sit.sites().into_iter().collect();

    let mut on_splice: Vec<CoreKey> = Vec::new();
    let mut off_splice: Vec<&CoreIdentity> = Vec::new();
    let mut skipped = 0usize;
    for core in summary.core_identities() {
        if restrict && !splice_sites.contains(core.site.as_str()) {
            skipped += 1;
            continue;
        }
        let key = core.key();
        let has_top = summary.get(&key.section("1")).is_some();
        if sit.contains_core(&key) {
            // nearest-top candidates need a core top
            if has_top {
                on_splice.push(key);
            }
        } else if has_top {
            off_splice.push(core);
        } else {
            ctx.record(Observation::warning(
                ObservationKind::CoreWithoutTopSection,
                key.to_string(),
                "core has no section 1 in the Section Summary and was not given an affine row",
            ));
        }
    }

    if skipped > 0 {
        ctx.record(
            Observation::new(
                ObservationKind::SkippedSiteCores,
                Severity::Info,
                summary.name(),
                format!(
                    "{} cores on sites outside the splice ({}) were not given affine rows",
                    skipped,
                    sit.sites().join(", ")
                ),
            )
            .with_value(skipped as f64),
        );
    }
    tracing::debug!(
        on_splice = on_splice.len(),
        off_splice = off_splice.len(),
        skipped,
        "partitioned Section Summary cores"
    );

    let total = off_splice.len();
    let mut rows = Vec::with_capacity(total);
    for (index, core) in off_splice.into_iter().enumerate() {
        let key = core.key();
        let entries = correlation
            .map(|mc| mc.locate_by_off_splice_core(&key))
            .unwrap_or_default();
        if entries.len() > 1 {
            ctx.record(
                Observation::warning(
                    ObservationKind::DuplicateCorrelation,
                    key.to_string(),
                    format!(
                        "{} manual correlations name this core, using the first",
                        entries.len()
                    ),
                )
                .with_value(entries.len() as f64),
            );
        }

        let pinned = match entries.first() {
            Some(CorrelationEntry::TiePoint(entry)) => {
                tie_to_splice(core, entry, sit, resolver, ctx)?
            }
            Some(CorrelationEntry::ExplicitOffset(entry)) => {
                Some(explicit_offset(core, entry, resolver)?)
            }
            None => None,
        };
        let row = match pinned {
            Some(row) => row,
            None => nearest_top(core, &on_splice, sit, resolver)?,
        };

        tracing::debug!(
            core = %key,
            offset = row.offset,
            shift_type = %row.shift_type,
            "resolved off-splice core"
        );
        rows.push(row.with_comment(COMMENT));
        ctx.progress(ProgressEvent::CoreResolved {
            index,
            total,
            core: key,
        });
    }

    Ok(rows)
}

/// TIE row from a correlation, or `None` when the on-splice side is not
/// actually in the splice.
fn tie_to_splice(
    core: &CoreIdentity,
    entry: &TiePointEntry,
    sit: &SpliceIntervalTable,
    resolver: &SectionDepthResolver<'_>,
    ctx: &mut RunContext<'_>,
) -> Result<Option<AffineRow>> {
    let on_core = entry.on_splice.core.key();
    let Some(sit_offset) = sit.core_offset(&on_core) else {
        ctx.record(Observation::warning(
            ObservationKind::CorrelationCoreOffSplice,
            core.key().to_string(),
            format!(
                "correlated core {} is not in the splice, using nearest core top",
                on_core
            ),
        ));
        return Ok(None);
    };

    let off_csf = resolver.resolve_depth(
        &entry.off_splice.section_key(),
        entry.off_splice.depth,
        false,
        ctx,
    )?;
    let on_csf = resolver.resolve_depth(
        &entry.on_splice.section_key(),
        entry.on_splice.depth,
        false,
        ctx,
    )?;
    let composite = round3(on_csf + sit_offset);
    let offset = round3(composite - off_csf);

    Ok(Some(
        AffineRow::new(core.clone(), off_csf, offset, ShiftType::Tie).with_tie(TiePoint {
            fixed_core: on_core,
            fixed_csf: on_csf,
            shifted_csf: off_csf,
        }),
    ))
}

fn explicit_offset(
    core: &CoreIdentity,
    entry: &OffsetEntry,
    resolver: &SectionDepthResolver<'_>,
) -> Result<AffineRow> {
    let top = resolver.core_top(&core.key())?;
    Ok(AffineRow::new(core.clone(), top, round3(entry.offset), ShiftType::Set))
}

fn nearest_top(
    core: &CoreIdentity,
    on_splice: &[CoreKey],
    sit: &SpliceIntervalTable,
    resolver: &SectionDepthResolver<'_>,
) -> Result<AffineRow> {
    let key = core.key();
    let top = resolver.core_top(&key)?;
    let nearest = resolver.core_with_closest_top(&key, on_splice)?;
    let offset = sit.core_offset(&nearest).ok_or_else(|| {
        SpliceError::NotFound(format!("splice interval for core {}", nearest))
    })?;
    Ok(AffineRow::new(core.clone(), top, offset, ShiftType::Rel))
}
