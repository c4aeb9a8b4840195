//! Affine Summary Finisher: ordering, differential offsets and growth rates.

use crate::context::RunContext;
use crate::diagnostics::{Observation, ObservationKind};
use crate::error::{Result, SpliceError};
use crate::model::{round3, AffineRow};

/// Sort rows by (site, hole, core number) and fill in the per-hole summary
/// columns. The sort is stable, so rows for the same core keep their order.
pub fn finish(rows: Vec<AffineRow>, ctx: &mut RunContext<'_>) -> Result<Vec<AffineRow>> {
    let mut keyed = rows
        .into_iter()
        .map(|row| -> Result<(u64, AffineRow)> {
            let number = row.core.core.trim().parse::<u64>().map_err(|_| {
                SpliceError::NonNumericCore {
                    site: row.core.site.clone(),
                    hole: row.core.hole.clone(),
                    core: row.core.core.clone(),
                }
            })?;
            Ok((number, row))
        })
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|(a_num, a), (b_num, b)| {
        (&a.core.site, &a.core.hole, a_num).cmp(&(&b.core.site, &b.core.hole, b_num))
    });

    let mut finished: Vec<AffineRow> = Vec::with_capacity(keyed.len());
    let mut hole_start = 0;
    for (_, mut row) in keyed {
        let same_hole = finished
            .last()
            .is_some_and(|prev| prev.core.site == row.core.site && prev.core.hole == row.core.hole);
        if !same_hole {
            hole_start = finished.len();
        }

        match finished.last().filter(|_| same_hole) {
            None => {
                row.differential_offset = row.offset;
                row.growth_rate = 0.0;
            }
            Some(prev) => {
                row.differential_offset = round3(row.offset - prev.offset);
                let points: Vec<(f64, f64)> = finished[hole_start..]
                    .iter()
                    .chain(std::iter::once(&row))
                    .map(|r| (r.csf, r.ccsf))
                    .collect();
                row.growth_rate = match slope(&points) {
                    Some(rate) => round3(rate),
                    None => {
                        ctx.record(Observation::warning(
                            ObservationKind::GrowthRateFallback,
                            row.key().to_string(),
                            format!(
                                "growth rate undefined over {} cores with the same CSF, using 0",
                                points.len()
                            ),
                        ));
                        0.0
                    }
                };
            }
        }
        finished.push(row);
    }

    tracing::debug!(rows = finished.len(), "finished affine table");
    Ok(finished)
}

/// Least-squares slope of y on x, or `None` when x has no spread.
fn slope(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    let rate = sxy / sxx;
    (sxx > 0.0 && rate.is_finite()).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpliceConfig;
    use crate::identity::CoreIdentity;
    use crate::model::ShiftType;

    fn row(hole: &str, core: &str, csf: f64, offset: f64) -> AffineRow {
        AffineRow::new(CoreIdentity::new("1", hole, core, "H"), csf, offset, ShiftType::Rel)
    }

    #[test]
    fn test_growth_rate_cumulative() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let rows = finish(
            vec![
                row("C", "3", 20.0, 5.0),
                row("C", "1", 0.0, 5.0),
                row("C", "4", 30.0, 5.0),
                row("C", "2", 10.0, 5.0),
            ],
            &mut ctx,
        )
        .unwrap();
        let rates: Vec<f64> = rows.iter().map(|r| r.growth_rate).collect();
        assert_eq!(rates, vec![0.0, 1.0, 1.0, 1.0]);
        let diffs: Vec<f64> = rows.iter().map(|r| r.differential_offset).collect();
        assert_eq!(diffs, vec![5.0, 0.0, 0.0, 0.0]);
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_numeric_core_order_and_hole_reset() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let rows = finish(
            vec![
                row("B", "1", 0.0, 0.2),
                row("A", "10", 90.0, 1.4),
                row("A", "2", 9.0, 0.5),
            ],
            &mut ctx,
        )
        .unwrap();
        let order: Vec<String> = rows.iter().map(|r| r.key().hole_core()).collect();
        assert_eq!(order, vec!["A2", "A10", "B1"]);
        assert_eq!(rows[1].differential_offset, 0.9);
        assert_eq!(rows[2].differential_offset, 0.2);
        assert_eq!(rows[2].growth_rate, 0.0);
    }

    #[test]
    fn test_degenerate_fit_falls_back() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let rows = finish(vec![row("A", "1", 3.0, 0.0), row("A", "2", 3.0, 0.5)], &mut ctx).unwrap();
        assert_eq!(rows[1].growth_rate, 0.0);
        assert!(ctx.diagnostics().has(ObservationKind::GrowthRateFallback));
    }

    #[test]
    fn test_non_numeric_core_rejected() {
        let config = SpliceConfig::default();
        let mut ctx = RunContext::new(&config);
        let err = finish(vec![row("A", "1x", 0.0, 0.0)], &mut ctx).unwrap_err();
        assert!(matches!(err, SpliceError::NonNumericCore { .. }));
        assert!(err.is_format_error());
    }
}
