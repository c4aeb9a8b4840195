//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use coresplice::OutputVocabulary;

/// coresplice: composite depth splicing for multi-hole drill cores
#[derive(Parser)]
#[command(name = "coresplice")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a sparse splice into a Splice Interval Table and affine table
    Convert {
        /// Section Summary file
        #[arg(long, value_name = "FILE")]
        section_summary: PathBuf,

        /// Sparse splice file
        #[arg(long, value_name = "FILE")]
        splice: PathBuf,

        /// Manual correlation file for off-splice cores
        #[arg(long, value_name = "FILE")]
        correlation: Option<PathBuf>,

        /// Output path for the Splice Interval Table (default: <splice>-sit.csv)
        #[arg(long, value_name = "FILE")]
        sit_out: Option<PathBuf>,

        /// Output path for the affine table (default: <splice>-affine.csv)
        #[arg(long, value_name = "FILE")]
        affine_out: Option<PathBuf>,

        /// Write a JSON run report
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Reuse the previous shift for every gapless APPEND
        #[arg(long)]
        lazy_append: bool,

        /// Read each interval's splice type as describing the join below it
        #[arg(long)]
        trailing_joins: bool,

        /// Header names for written tables
        #[arg(long)]
        vocabulary: Option<VocabularyChoice>,

        /// Give affine rows to cores from every site, not only spliced ones
        #[arg(long)]
        all_sites: bool,

        /// JSON configuration file; flags override it
        #[arg(long, value_name = "JSON")]
        config: Option<PathBuf>,
    },

    /// Put measurement data on the composite depth scale
    Export {
        /// Affine table
        #[arg(long, value_name = "FILE")]
        affine: PathBuf,

        /// Splice Interval Table
        #[arg(long, value_name = "FILE")]
        sit: PathBuf,

        /// Measurement data file
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        /// Output path (default: <data>-spliced.csv)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Name of the measurement depth column
        #[arg(long, value_name = "NAME", default_value = "Depth")]
        depth_column: String,

        /// Drop rows outside splice intervals
        #[arg(long)]
        on_splice_only: bool,

        /// Take every row of a spliced section regardless of interval depths
        #[arg(long)]
        whole_section: bool,
    },

    /// Convert a section ID and offset to a drilled depth
    Depth {
        /// Section Summary file
        #[arg(long, value_name = "FILE")]
        section_summary: PathBuf,

        /// Section ID, e.g. 1A-2H-3 or 327-U1363B-2H-5-A
        #[arg(value_name = "SECTION_ID")]
        section: String,

        /// Offset from the section top in cm
        #[arg(value_name = "OFFSET_CM")]
        offset: f64,

        /// Use scaled (CSF-B) depths
        #[arg(long)]
        scaled: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VocabularyChoice {
    Canonical,
    Iodp,
    Laccore,
}

impl From<VocabularyChoice> for OutputVocabulary {
    fn from(choice: VocabularyChoice) -> Self {
        match choice {
            VocabularyChoice::Canonical => OutputVocabulary::Canonical,
            VocabularyChoice::Iodp => OutputVocabulary::Iodp,
            VocabularyChoice::Laccore => OutputVocabulary::LacCore,
        }
    }
}
