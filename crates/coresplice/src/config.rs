//! Run configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};
use crate::model::DEFAULT_DEPTH_COLUMN;
use crate::tabular::{OutputVocabulary, ReaderConfig};

/// Which interval's splice type and gap describe a join.
///
/// `Leading` is the default because a first interval's type must be ignorable
/// and a TIE row must land on the bottom of the interval above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinConvention {
    /// An interval's type and gap describe how it joins the interval above.
    /// The first interval's type and gap are ignored.
    #[default]
    Leading,
    /// An interval's type and gap describe how the next interval joins it.
    /// The affine row's shift type and tie point then also come from the
    /// previous interval's join, since that join placed the interval.
    Trailing,
}

/// Configuration for sparse splice conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Reuse the previous shift for every gapless APPEND, even across holes.
    pub lazy_append: bool,
    pub join_convention: JoinConvention,
    /// Only give affine rows to cores from sites that appear in the splice.
    pub restrict_to_splice_sites: bool,
    /// Header names for written tables.
    pub output_vocabulary: OutputVocabulary,
    pub reader: ReaderConfig,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            lazy_append: false,
            join_convention: JoinConvention::default(),
            restrict_to_splice_sites: true,
            output_vocabulary: OutputVocabulary::default(),
            reader: ReaderConfig::default(),
        }
    }
}

impl SpliceConfig {
    pub fn with_lazy_append(mut self, lazy_append: bool) -> Self {
        self.lazy_append = lazy_append;
        self
    }

    pub fn with_join_convention(mut self, convention: JoinConvention) -> Self {
        self.join_convention = convention;
        self
    }

    pub fn with_restrict_to_splice_sites(mut self, restrict: bool) -> Self {
        self.restrict_to_splice_sites = restrict;
        self
    }

    pub fn with_output_vocabulary(mut self, vocabulary: OutputVocabulary) -> Self {
        self.output_vocabulary = vocabulary;
        self
    }

    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    /// Load from a JSON file; absent fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SpliceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SpliceError::Config(format!("Failed to parse config '{}': {}", path.display(), e))
        })
    }
}

/// Options for exporting spliced measurement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Name of the measurement depth column.
    pub depth_column: String,
    /// Also emit rows outside splice intervals, shifted by their core's offset.
    pub include_off_splice: bool,
    /// Take every row of a spliced section, ignoring the interval's depth range.
    pub whole_splice_section: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            depth_column: DEFAULT_DEPTH_COLUMN.to_string(),
            include_off_splice: true,
            whole_splice_section: false,
        }
    }
}

impl ExportOptions {
    pub fn with_depth_column(mut self, column: impl Into<String>) -> Self {
        self.depth_column = column.into();
        self
    }

    pub fn with_include_off_splice(mut self, include: bool) -> Self {
        self.include_off_splice = include;
        self
    }

    pub fn with_whole_splice_section(mut self, whole: bool) -> Self {
        self.whole_splice_section = whole;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpliceConfig::default();
        assert!(!config.lazy_append);
        assert!(config.restrict_to_splice_sites);
        assert_eq!(config.join_convention, JoinConvention::Leading);
        assert_eq!(config.output_vocabulary, OutputVocabulary::Iodp);

        let export = ExportOptions::default();
        assert_eq!(export.depth_column, "Depth");
        assert!(export.include_off_splice);
        assert!(!export.whole_splice_section);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SpliceConfig = serde_json::from_str(
            r#"{"lazy_append": true, "join_convention": "trailing", "reader": {"delimiter": ";"}}"#,
        )
        .unwrap();
        assert!(config.lazy_append);
        assert_eq!(config.join_convention, JoinConvention::Trailing);
        assert!(config.restrict_to_splice_sites);
        assert_eq!(config.reader.delimiter, Some(';'));
        assert_eq!(config.reader.quote, '"');
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{not json").unwrap();
        assert!(matches!(SpliceConfig::load(file.path()), Err(SpliceError::Config(_))));
    }
}
