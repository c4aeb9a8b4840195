//! Tabular adapter: reading delimited files into fixed schemas and writing them back.

pub mod columns;
pub mod formats;
mod mapped;
mod reader;
mod table;
mod writer;

pub use columns::{ColumnDatatype, ColumnIdentity, OutputVocabulary};
pub use formats::TableFormat;
pub use mapped::MappedTable;
pub use reader::{ReaderConfig, TableReader};
pub use table::{DataTable, SourceMetadata};
pub use writer::{format_number, format_optional, StagedOutputs, TableWriter, TabularRecord};
