//! Section Depth Resolver: section coordinates to absolute depth.

use crate::context::RunContext;
use crate::diagnostics::{Observation, ObservationKind};
use crate::error::{Result, SpliceError};
use crate::identity::{CoreKey, SectionKey};
use crate::model::{round3, SectionRow, SectionSummary};

/// Depth lookups against a [`SectionSummary`].
#[derive(Debug, Clone, Copy)]
pub struct SectionDepthResolver<'a> {
    summary: &'a SectionSummary,
}

impl<'a> SectionDepthResolver<'a> {
    pub fn new(summary: &'a SectionSummary) -> Self {
        Self { summary }
    }

    pub fn summary(&self) -> &'a SectionSummary {
        self.summary
    }

    /// Depth (m) of a point `offset_cm` below the top of a section.
    ///
    /// Gaps starting above the offset are excluded. With `use_scaled`, depths
    /// come from the scaled (CSF-B) columns and, when the curated length
    /// exceeds the drilled length, the offset is compressed to fit.
    pub fn resolve_depth(
        &self,
        key: &SectionKey,
        offset_cm: f64,
        use_scaled: bool,
        ctx: &mut RunContext<'_>,
    ) -> Result<f64> {
        let row = self.summary.section(key)?;
        let (top, bottom) = if use_scaled {
            (
                scaled(row, row.top_depth_scaled, "TopDepthScaled")?,
                scaled(row, row.bottom_depth_scaled, "BottomDepthScaled")?,
            )
        } else {
            (row.top_depth, row.bottom_depth)
        };
        let top = round3(top);
        let bottom = round3(bottom);

        let offset_m = offset_cm / 100.0;
        if offset_m > row.curated_length {
            ctx.record(
                Observation::warning(
                    ObservationKind::OffsetBeyondLength,
                    key.to_string(),
                    format!(
                        "offset {}cm is beyond curated length of section {}m",
                        offset_cm, row.curated_length
                    ),
                )
                .with_value(offset_m - row.curated_length),
            );
        }

        let gap_cm = row.gap_above(offset_cm);
        let adjusted_m = (offset_cm - gap_cm) / 100.0;
        let mut depth = top + adjusted_m;

        let drilled = round3(bottom - top);
        if use_scaled && row.curated_length > drilled {
            let compressed = top + adjusted_m * (drilled / row.curated_length);
            ctx.record(
                Observation::warning(
                    ObservationKind::ScaledCompression,
                    key.to_string(),
                    format!(
                        "curated length {}m exceeds drilled length {}m, compressing depth {}m to {}m",
                        row.curated_length,
                        drilled,
                        round3(depth),
                        round3(compressed)
                    ),
                )
                .with_value(round3(depth - compressed)),
            );
            depth = compressed;
        }

        tracing::debug!(
            section = %key,
            offset_cm,
            gap_cm,
            scaled = use_scaled,
            depth,
            "resolved section depth"
        );
        Ok(round3(depth))
    }

    /// Top depth of a core: the top of its section "1".
    pub fn core_top(&self, core: &CoreKey) -> Result<f64> {
        self.section_top(&core.section("1"))
    }

    pub fn section_top(&self, key: &SectionKey) -> Result<f64> {
        Ok(round3(self.summary.section(key)?.top_depth))
    }

    pub fn section_bottom(&self, key: &SectionKey) -> Result<f64> {
        Ok(round3(self.summary.section(key)?.bottom_depth))
    }

    pub fn section_length(&self, key: &SectionKey) -> Result<f64> {
        Ok(round3(self.summary.section(key)?.curated_length))
    }

    /// Candidate whose core top is nearest the query core's top.
    ///
    /// The query core itself is skipped. Equal distances go to the lowest
    /// [`CoreKey`], so the result does not depend on candidate order.
    pub fn core_with_closest_top<'c, I>(&self, core: &CoreKey, candidates: I) -> Result<CoreKey>
    where
        I: IntoIterator<Item = &'c CoreKey>,
    {
        let query_top = self.core_top(core)?;
        let mut best: Option<(f64, &CoreKey)> = None;

        for candidate in candidates {
            if candidate == core {
                continue;
            }
            let diff = (self.core_top(candidate)? - query_top).abs();
            let closer = match best {
                None => true,
                Some((best_diff, best_key)) => {
                    diff < best_diff || (diff == best_diff && candidate < best_key)
                }
            };
            if closer {
                best = Some((diff, candidate));
            }
        }

        let (diff, closest) = best.ok_or_else(|| {
            SpliceError::NotFound(format!("no candidate core to compare with {}", core))
        })?;
        tracing::debug!(
            core = %core,
            closest = %closest,
            diff = round3(diff),
            "closest core top"
        );
        Ok(closest.clone())
    }
}

fn scaled(row: &SectionRow, value: Option<f64>, column: &str) -> Result<f64> {
    value.ok_or_else(|| {
        SpliceError::NotFound(format!("{} of section {} in Section Summary", column, row.key()))
    })
}
