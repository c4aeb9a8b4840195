//! Error types for the coresplice library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for coresplice operations.
///
/// Every variant is fatal for the run that produced it. Non-fatal conditions
/// are reported as [`Observation`](crate::diagnostics::Observation)s instead.
#[derive(Debug, Error)]
pub enum SpliceError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell could not be converted to the type its column requires.
    #[error("Parse error at row {row}, column '{column}': {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Input is structurally invalid for the table it claims to be.
    #[error("Format error: {0}")]
    Format(String),

    /// Required columns could not be mapped from the input headers.
    #[error("Format {format} requires missing columns {columns:?}")]
    MissingColumns {
        format: String,
        columns: Vec<String>,
    },

    /// Splice type text is neither TIE nor APPEND.
    #[error("Unknown splice type '{0}', expected TIE or APPEND")]
    UnknownSpliceType(String),

    /// Core number could not be read as an integer while ordering affine rows.
    #[error("Core '{core}' of {site}{hole} is not an integer")]
    NonNumericCore {
        site: String,
        hole: String,
        core: String,
    },

    /// A core or section is absent from the table it was looked up in.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A splice interval resolves to a top at or below its bottom.
    #[error("Interval {index} ({core}) resolves to top {top}m at or below bottom {bottom}m")]
    InvertedInterval {
        index: usize,
        core: String,
        top: f64,
        bottom: f64,
    },

    /// Empty file or no rows to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpliceError {
    /// Whether the error stems from malformed input rather than a lookup miss or IO.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            SpliceError::Format(_)
                | SpliceError::MissingColumns { .. }
                | SpliceError::UnknownSpliceType(_)
                | SpliceError::NonNumericCore { .. }
                | SpliceError::Parse { .. }
        )
    }
}

/// Result type alias for coresplice operations.
pub type Result<T> = std::result::Result<T, SpliceError>;
