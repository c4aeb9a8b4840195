//! Main Splicer struct and public API.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ExportOptions, SpliceConfig};
use crate::context::RunContext;
use crate::diagnostics::{Observation, Severity};
use crate::error::{Result, SpliceError};
use crate::model::{
    AffineTable, ManualCorrelation, MeasurementData, SectionSummary, SparseSplice,
    SpliceIntervalTable,
};
use crate::progress::{NoProgress, ProgressEvent, ProgressListener, Stage};
use crate::resolver::SectionDepthResolver;
use crate::splice::{self, SplicedMeasurements};
use crate::tabular::formats::{AFFINE_TABLE, SECTION_SUMMARY, SPARSE_SPLICE, SPLICE_INTERVAL_TABLE};
use crate::tabular::{SourceMetadata, StagedOutputs, TableReader, TableWriter};

/// Files read by [`Splicer::convert_files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionInputs {
    pub section_summary: PathBuf,
    pub splice: PathBuf,
    pub correlation: Option<PathBuf>,
}

impl ConversionInputs {
    pub fn new(section_summary: impl Into<PathBuf>, splice: impl Into<PathBuf>) -> Self {
        Self {
            section_summary: section_summary.into(),
            splice: splice.into(),
            correlation: None,
        }
    }

    pub fn with_correlation(mut self, correlation: impl Into<PathBuf>) -> Self {
        self.correlation = Some(correlation.into());
        self
    }
}

/// Files written by [`Splicer::convert_files`]. Unset paths are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutputs {
    pub sit: Option<PathBuf>,
    pub affine: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

impl ConversionOutputs {
    pub fn with_sit(mut self, path: impl Into<PathBuf>) -> Self {
        self.sit = Some(path.into());
        self
    }

    pub fn with_affine(mut self, path: impl Into<PathBuf>) -> Self {
        self.affine = Some(path.into());
        self
    }

    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some(path.into());
        self
    }
}

/// Result of converting a sparse splice.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub sit: SpliceIntervalTable,
    pub affine: AffineTable,
    pub observations: Vec<Observation>,
    pub summary: ConversionSummary,
}

/// Counts describing a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub intervals: usize,
    /// Distinct cores visited by the splice.
    pub splice_cores: usize,
    pub off_splice_cores: usize,
    pub affine_rows: usize,
    pub sites: Vec<String>,
    /// Composite depth range covered by the splice.
    pub top_ccsf: Option<f64>,
    pub bottom_ccsf: Option<f64>,
    pub observations_by_severity: ObservationCounts,
    pub observations_by_kind: BTreeMap<String, usize>,
}

/// Counts of observations by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl ObservationCounts {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut counts = Self::default();
        for obs in observations {
            match obs.severity {
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }
}

/// Durable record of a file conversion, saved as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub sources: Vec<SourceMetadata>,
    pub config: SpliceConfig,
    pub summary: ConversionSummary,
    pub observations: Vec<Observation>,
    /// Table files written.
    pub outputs: Vec<PathBuf>,
    pub generated_at: DateTime<Utc>,
}

impl ConversionReport {
    /// Save as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| SpliceError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = File::create(path).map_err(|source| SpliceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SpliceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Result of splicing measurement data.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub measurements: SplicedMeasurements,
    pub observations: Vec<Observation>,
    /// File written, when exporting from files.
    pub output: Option<PathBuf>,
}

/// The core-splicing engine.
pub struct Splicer {
    config: SpliceConfig,
    reader: TableReader,
    writer: TableWriter,
    progress: Option<Arc<dyn ProgressListener>>,
}

impl Splicer {
    /// Create a new Splicer with default configuration.
    pub fn new() -> Self {
        Self::with_config(SpliceConfig::default())
    }

    pub fn with_config(config: SpliceConfig) -> Self {
        let reader = TableReader::with_config(config.reader.clone());
        let writer = TableWriter::new(config.output_vocabulary);
        Self {
            config,
            reader,
            writer,
            progress: None,
        }
    }

    /// Report progress to `listener` during conversions and exports.
    pub fn with_progress(mut self, listener: impl ProgressListener + 'static) -> Self {
        self.progress = Some(Arc::new(listener));
        self
    }

    pub fn config(&self) -> &SpliceConfig {
        &self.config
    }

    fn context(&self) -> RunContext<'_> {
        let listener: &dyn ProgressListener = match &self.progress {
            Some(listener) => listener.as_ref(),
            None => &NoProgress,
        };
        RunContext::new(&self.config).with_progress(listener)
    }

    /// Convert a sparse splice into a Splice Interval Table and a finished
    /// affine table covering every core of the splice's sites.
    pub fn convert(
        &self,
        summary: &SectionSummary,
        sparse: &SparseSplice,
        correlation: Option<&ManualCorrelation>,
    ) -> Result<ConversionResult> {
        let mut ctx = self.context();
        self.convert_with(&mut ctx, summary, sparse, correlation)
    }

    fn convert_with(
        &self,
        ctx: &mut RunContext<'_>,
        summary: &SectionSummary,
        sparse: &SparseSplice,
        correlation: Option<&ManualCorrelation>,
    ) -> Result<ConversionResult> {
        let resolver = SectionDepthResolver::new(summary);

        ctx.progress(ProgressEvent::StageStarted(Stage::BuildSplice));
        let (sit_rows, mut affine_rows) = splice::build_sit(sparse.intervals(), &resolver, ctx)?;
        let sit = SpliceIntervalTable::new(sparse.name(), sit_rows);
        let splice_cores = affine_rows.len();
        ctx.progress(ProgressEvent::StageFinished(Stage::BuildSplice));

        ctx.progress(ProgressEvent::StageStarted(Stage::OffSplice));
        let off_splice = splice::resolve_off_splice(&sit, &resolver, correlation, ctx)?;
        let off_splice_cores = off_splice.len();
        affine_rows.extend(off_splice);
        ctx.progress(ProgressEvent::StageFinished(Stage::OffSplice));

        ctx.progress(ProgressEvent::StageStarted(Stage::Finish));
        let affine = AffineTable::new(sparse.name(), splice::finish(affine_rows, ctx)?);
        ctx.progress(ProgressEvent::StageFinished(Stage::Finish));

        let observations = ctx.diagnostics().observations().to_vec();
        let summary = ConversionSummary {
            intervals: sit.len(),
            splice_cores,
            off_splice_cores,
            affine_rows: affine.len(),
            sites: sit.sites().into_iter().map(String::from).collect(),
            top_ccsf: sit.rows().iter().map(|r| r.top_ccsf).reduce(f64::min),
            bottom_ccsf: sit.rows().iter().map(|r| r.bottom_ccsf).reduce(f64::max),
            observations_by_severity: ObservationCounts::from_observations(&observations),
            observations_by_kind: count_by_kind(&observations),
        };
        tracing::info!(
            intervals = summary.intervals,
            affine_rows = summary.affine_rows,
            warnings = summary.observations_by_severity.warning,
            errors = summary.observations_by_severity.error,
            "converted sparse splice"
        );

        Ok(ConversionResult {
            sit,
            affine,
            observations,
            summary,
        })
    }

    /// Load the inputs, convert, and write the requested outputs.
    ///
    /// Outputs are staged and only moved into place once all of them were
    /// written, so a failed run leaves existing files alone.
    pub fn convert_files(
        &self,
        inputs: &ConversionInputs,
        outputs: &ConversionOutputs,
    ) -> Result<ConversionReport> {
        let mut ctx = self.context();

        ctx.progress(ProgressEvent::StageStarted(Stage::Load));
        let mut sources = Vec::new();
        let (table, source) = self.reader.load(&inputs.section_summary, SECTION_SUMMARY)?;
        let summary = SectionSummary::from_table(source.file.clone(), &table)?;
        sources.push(source);
        let (table, source) = self.reader.load(&inputs.splice, SPARSE_SPLICE)?;
        let sparse = SparseSplice::from_table(source.file.clone(), &table)?;
        sources.push(source);
        let correlation = match &inputs.correlation {
            Some(path) => {
                let (table, source) = self.reader.read_file(path)?;
                sources.push(source);
                Some(ManualCorrelation::from_table(table)?)
            }
            None => None,
        };
        ctx.progress(ProgressEvent::StageFinished(Stage::Load));

        let result = self.convert_with(&mut ctx, &summary, &sparse, correlation.as_ref())?;

        ctx.progress(ProgressEvent::StageStarted(Stage::Write));
        let mut staged = StagedOutputs::new();
        if let Some(path) = &outputs.sit {
            staged.stage(path, |out| self.writer.write_records(out, result.sit.rows()))?;
        }
        if let Some(path) = &outputs.affine {
            staged.stage(path, |out| self.writer.write_records(out, result.affine.rows()))?;
        }

        let report = ConversionReport {
            sources,
            config: self.config.clone(),
            summary: result.summary,
            observations: result.observations,
            outputs: [&outputs.sit, &outputs.affine].into_iter().flatten().cloned().collect(),
            generated_at: Utc::now(),
        };
        if let Some(path) = &outputs.report {
            staged.stage(path, |out| {
                serde_json::to_writer_pretty(out, &report)?;
                Ok(())
            })?;
        }
        staged.commit()?;
        ctx.progress(ProgressEvent::StageFinished(Stage::Write));

        Ok(report)
    }

    /// Put measurement rows on the composite depth scale.
    pub fn splice_measurements(
        &self,
        affine: &AffineTable,
        sit: &SpliceIntervalTable,
        data: &MeasurementData,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let mut ctx = self.context();
        ctx.progress(ProgressEvent::StageStarted(Stage::Export));
        let measurements = splice::splice_measurements(affine, sit, data, options, &mut ctx)?;
        ctx.progress(ProgressEvent::StageFinished(Stage::Export));
        tracing::info!(
            on_splice = measurements.on_splice,
            off_splice = measurements.off_splice,
            unmatched = measurements.unmatched,
            "spliced measurement data"
        );
        Ok(ExportResult {
            measurements,
            observations: ctx.into_diagnostics().into_observations(),
            output: None,
        })
    }

    /// Load an affine table, SIT and measurement file, splice, and write the
    /// result to `output`.
    pub fn export_measurements(
        &self,
        affine: impl AsRef<Path>,
        sit: impl AsRef<Path>,
        data: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        let (table, source) = self.reader.load(affine, AFFINE_TABLE)?;
        let affine = AffineTable::from_table(source.file, &table)?;
        let (table, source) = self.reader.load(sit, SPLICE_INTERVAL_TABLE)?;
        let sit = SpliceIntervalTable::from_table(source.file, &table)?;
        let data = MeasurementData::load(&self.reader, data, &options.depth_column)?;

        let mut result = self.splice_measurements(&affine, &sit, &data, options)?;

        let output = output.as_ref();
        let mut staged = StagedOutputs::new();
        staged.stage(output, |out| result.measurements.write(&self.writer, out))?;
        staged.commit()?;
        result.output = Some(output.to_path_buf());
        Ok(result)
    }
}

impl Default for Splicer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Splicer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Splicer")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

fn count_by_kind(observations: &[Observation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for obs in observations {
        *counts.entry(obs.kind.label().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::{NamedTempFile, TempDir};

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SECTIONS: &str = "Site,Hole,Core,Tool,Section,TopDepth,BottomDepth,TopDepthScaled,BottomDepthScaled,CuratedLength,Gaps\n\
        1,A,1,H,1,0.0,1.5,0.0,1.5,1.5,\n\
        1,A,2,H,1,1.5,3.0,1.5,3.0,1.5,\n\
        1,B,1,H,1,0.4,1.9,0.4,1.9,1.5,\n";

    const SPLICE: &str = "Site,Hole,Core,Tool,TopSection,TopOffset,BottomSection,BottomOffset,SpliceType,Gap,DataUsed,Comment\n\
        1,A,1,H,1,0,1,150,,,NGR,\n\
        1,A,2,H,1,0,1,150,TIE,,NGR,\n";

    #[test]
    fn test_convert_files_writes_all_outputs() {
        let sections = create_test_file(SECTIONS);
        let splice = create_test_file(SPLICE);
        let dir = TempDir::new().unwrap();
        let outputs = ConversionOutputs::default()
            .with_sit(dir.path().join("out/sit.csv"))
            .with_affine(dir.path().join("out/affine.csv"))
            .with_report(dir.path().join("out/report.json"));

        let report = Splicer::new()
            .convert_files(&ConversionInputs::new(sections.path(), splice.path()), &outputs)
            .unwrap();

        assert_eq!(report.summary.intervals, 2);
        assert_eq!(report.summary.splice_cores, 2);
        assert_eq!(report.summary.off_splice_cores, 1);
        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.sources.len(), 2);
        assert!(dir.path().join("out/sit.csv").exists());
        assert!(dir.path().join("out/affine.csv").exists());

        let loaded = ConversionReport::load(dir.path().join("out/report.json")).unwrap();
        assert_eq!(loaded.summary, report.summary);
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let sections = create_test_file(SECTIONS);
        let splice = create_test_file(
            "Site,Hole,Core,Tool,TopSection,TopOffset,BottomSection,BottomOffset,SpliceType,Gap\n\
             1,A,1,H,1,0,1,150,,\n\
             1,A,9,H,1,0,1,150,TIE,\n",
        );
        let dir = TempDir::new().unwrap();
        let outputs = ConversionOutputs::default().with_sit(dir.path().join("sit.csv"));

        let err = Splicer::new()
            .convert_files(&ConversionInputs::new(sections.path(), splice.path()), &outputs)
            .unwrap_err();
        assert!(matches!(err, SpliceError::NotFound(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_progress_events_reported() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let sections = create_test_file(SECTIONS);
        let splice = create_test_file(SPLICE);
        let reader = TableReader::new();
        let summary = SectionSummary::load(&reader, sections.path()).unwrap();
        let sparse = SparseSplice::load(&reader, splice.path()).unwrap();

        let splicer = Splicer::new().with_progress(move |e: ProgressEvent| sink.borrow_mut().push(e));
        splicer.convert(&summary, &sparse, None).unwrap();

        let events = events.borrow();
        let intervals = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::IntervalResolved { .. }))
            .count();
        let cores = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::CoreResolved { .. }))
            .count();
        assert_eq!(intervals, 2);
        assert_eq!(cores, 1);
        assert_eq!(events.first(), Some(&ProgressEvent::StageStarted(Stage::BuildSplice)));
        assert_eq!(events.last(), Some(&ProgressEvent::StageFinished(Stage::Finish)));
    }

    #[test]
    fn test_observation_counts() {
        let sections = create_test_file(SECTIONS);
        let splice = create_test_file(
            "Site,Hole,Core,Tool,TopSection,TopOffset,BottomSection,BottomOffset,SpliceType,Gap\n\
             1,A,1,H,1,0,1,160,,\n\
             1,A,2,H,1,0,1,150,TIE,\n",
        );
        let reader = TableReader::new();
        let result = Splicer::new()
            .convert(
                &SectionSummary::load(&reader, sections.path()).unwrap(),
                &SparseSplice::load(&reader, splice.path()).unwrap(),
                None,
            )
            .unwrap();
        assert_eq!(result.summary.observations_by_severity.warning, 1);
        assert_eq!(result.summary.observations_by_kind.len(), 1);
    }
}
