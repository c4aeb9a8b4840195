//! Observation types for non-fatal conditions met during a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of condition that was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// Section offset lies past the section's curated length.
    OffsetBeyondLength,
    /// Curated length exceeds drilled length; a scaled depth was compressed.
    ScaledCompression,
    /// Inter-hole APPEND where the current top sits above the previous bottom in scaled depth.
    NegativeScaledGap,
    /// Previous interval's composite bottom lies below the current composite top.
    IntervalOverlap,
    /// An APPEND shift was raised to remove an overlap.
    OverlapCorrected,
    /// A core appears in more than one splice interval.
    DuplicateSpliceCore,
    /// More than one manual correlation names the same off-splice core.
    DuplicateCorrelation,
    /// A manual correlation references a core that is not on-splice.
    CorrelationCoreOffSplice,
    /// Growth-rate regression was degenerate and fell back to zero.
    GrowthRateFallback,
    /// Section Summary cores skipped because their site has no splice intervals.
    SkippedSiteCores,
    /// A Section Summary core has no section "1", so it has no top and no affine row.
    CoreWithoutTopSection,
    /// A splice interval matched no measurement rows.
    EmptySpliceInterval,
    /// Measurement rows with no affine shift were left out of an export.
    UnmatchedMeasurementRows,
}

impl ObservationKind {
    /// Get a human-readable label for the observation kind.
    pub fn label(&self) -> &'static str {
        match self {
            ObservationKind::OffsetBeyondLength => "Offset Beyond Curated Length",
            ObservationKind::ScaledCompression => "Scaled Depth Compression",
            ObservationKind::NegativeScaledGap => "Negative Scaled Gap",
            ObservationKind::IntervalOverlap => "Interval Overlap",
            ObservationKind::OverlapCorrected => "Overlap Corrected",
            ObservationKind::DuplicateSpliceCore => "Duplicate Splice Core",
            ObservationKind::DuplicateCorrelation => "Duplicate Correlation",
            ObservationKind::CorrelationCoreOffSplice => "Correlation Core Off-Splice",
            ObservationKind::GrowthRateFallback => "Growth Rate Fallback",
            ObservationKind::SkippedSiteCores => "Skipped Site Cores",
            ObservationKind::CoreWithoutTopSection => "Core Without Top Section",
            ObservationKind::EmptySpliceInterval => "Empty Splice Interval",
            ObservationKind::UnmatchedMeasurementRows => "Unmatched Measurement Rows",
        }
    }
}

/// Severity level of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Policy warning; processing continued.
    Warning,
    /// Data problem that was skipped over; processing continued.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A non-fatal condition recorded during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Identifier, unique within a run.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    pub severity: Severity,
    /// Core, section or interval the observation concerns.
    pub subject: String,
    /// Human-readable description.
    pub description: String,
    /// Numeric value behind the observation (overlap, gap, row count...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub detected_at: DateTime<Utc>,
}

impl Observation {
    /// Create a new observation. The id is assigned when it is recorded.
    pub fn new(
        kind: ObservationKind,
        severity: Severity,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            kind,
            severity,
            subject: subject.into(),
            description: description.into(),
            value: None,
            detected_at: Utc::now(),
        }
    }

    /// Shorthand for a warning.
    pub fn warning(
        kind: ObservationKind,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(kind, Severity::Warning, subject, description)
    }

    /// Set the numeric value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}
