//! CSV writing and all-or-nothing output staging.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::columns::OutputVocabulary;
use super::formats::TableFormat;
use crate::error::{Result, SpliceError};

/// A typed record that serializes to one row of a [`TableFormat`].
pub trait TabularRecord {
    /// Format whose column order `cells` follows.
    const FORMAT: TableFormat;

    fn cells(&self) -> Vec<String>;
}

/// Text form of a numeric cell. NaN is written as an empty cell.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Optional numeric cell.
pub fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

/// Writes comma-separated tables with headers in a chosen vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableWriter {
    vocabulary: OutputVocabulary,
}

impl TableWriter {
    pub fn new(vocabulary: OutputVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> OutputVocabulary {
        self.vocabulary
    }

    /// Output headers for a format.
    pub fn headers(&self, format: &TableFormat) -> Vec<String> {
        format
            .columns
            .iter()
            .map(|c| c.output_name(self.vocabulary))
            .collect()
    }

    /// Write typed records under their format's headers.
    pub fn write_records<W, R>(&self, out: W, records: &[R]) -> Result<()>
    where
        W: Write,
        R: TabularRecord,
    {
        let headers = self.headers(&R::FORMAT);
        self.write(out, &headers, records.iter().map(R::cells))
    }

    /// Write a header row followed by raw rows.
    pub fn write<W, I>(&self, out: W, headers: &[String], rows: I) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = csv::WriterBuilder::new().from_writer(out);
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush().map_err(|e| SpliceError::Csv(e.into()))?;
        Ok(())
    }
}

/// Output files written to temporary siblings and renamed into place only
/// on [`commit`](StagedOutputs::commit). Dropping without committing removes
/// the temporaries, leaving existing outputs untouched.
#[derive(Debug, Default)]
pub struct StagedOutputs {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl StagedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one output to its temporary file.
    pub fn stage<F>(&mut self, path: impl AsRef<Path>, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        let path = path.as_ref();
        let io_error = |source| SpliceError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let temp = temp_path(path);
        self.staged.push((temp.clone(), path.to_path_buf()));

        let file = File::create(&temp).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(io_error)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged file into place, returning the final paths.
    /// A failed rename leaves the remaining temporaries to `Drop`.
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.staged.len());
        for (temp, path) in &self.staged {
            fs::rename(temp, path).map_err(|source| SpliceError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote output");
            written.push(path.clone());
        }
        self.staged.clear();
        Ok(written)
    }
}

impl Drop for StagedOutputs {
    fn drop(&mut self) {
        for (temp, _) in &self.staged {
            let _ = fs::remove_file(temp);
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}
