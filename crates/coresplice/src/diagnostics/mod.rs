//! Run diagnostics: policy warnings and skipped-data errors.
//!
//! Every observation is mirrored to `tracing` at the matching level when it is
//! recorded, and kept so callers can report or serialize it afterwards.

mod observation;

pub use observation::{Observation, ObservationKind, Severity};

/// Ordered collection of the observations made during one run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    observations: Vec<Observation>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation, assigning it the next id.
    pub fn record(&mut self, mut observation: Observation) {
        observation.id = format!("obs_{:03}", self.observations.len() + 1);

        match observation.severity {
            Severity::Info => tracing::info!(
                kind = ?observation.kind,
                subject = %observation.subject,
                "{}",
                observation.description
            ),
            Severity::Warning => tracing::warn!(
                kind = ?observation.kind,
                subject = %observation.subject,
                "{}",
                observation.description
            ),
            Severity::Error => tracing::error!(
                kind = ?observation.kind,
                subject = %observation.subject,
                "{}",
                observation.description
            ),
        }

        self.observations.push(observation);
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of observations at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.observations
            .iter()
            .filter(|o| o.severity == severity)
            .count()
    }

    /// Observations of one kind, in the order they were recorded.
    pub fn of_kind(&self, kind: ObservationKind) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(move |o| o.kind == kind)
    }

    /// Whether any observation of this kind was recorded.
    pub fn has(&self, kind: ObservationKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_assigns_sequential_ids() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(Observation::warning(
            ObservationKind::ScaledCompression,
            "1A-1-2",
            "compressed",
        ));
        diagnostics.record(Observation::new(
            ObservationKind::DuplicateSpliceCore,
            Severity::Error,
            "1A-1",
            "duplicate",
        ));

        let ids: Vec<&str> = diagnostics.observations().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["obs_001", "obs_002"]);
        assert_eq!(diagnostics.count(Severity::Warning), 1);
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert!(diagnostics.has(ObservationKind::DuplicateSpliceCore));
        assert!(!diagnostics.has(ObservationKind::IntervalOverlap));
    }
}
