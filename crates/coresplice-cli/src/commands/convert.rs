//! Convert command - sparse splice to SIT and affine table.

use std::path::PathBuf;

use colored::Colorize;
use coresplice::{
    ConversionInputs, ConversionOutputs, JoinConvention, OutputVocabulary, SpliceConfig, Splicer,
};

use super::{print_counts, print_observations, sibling_path};

/// Parsed `convert` arguments.
pub struct ConvertArgs {
    pub section_summary: PathBuf,
    pub splice: PathBuf,
    pub correlation: Option<PathBuf>,
    pub sit_out: Option<PathBuf>,
    pub affine_out: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub lazy_append: bool,
    pub trailing_joins: bool,
    pub vocabulary: Option<OutputVocabulary>,
    pub all_sites: bool,
    pub config: Option<PathBuf>,
}

impl ConvertArgs {
    /// Config file first, then flags on top.
    fn splice_config(&self) -> Result<SpliceConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SpliceConfig::load(path)?,
            None => SpliceConfig::default(),
        };
        if self.lazy_append {
            config = config.with_lazy_append(true);
        }
        if self.trailing_joins {
            config = config.with_join_convention(JoinConvention::Trailing);
        }
        if self.all_sites {
            config = config.with_restrict_to_splice_sites(false);
        }
        if let Some(vocabulary) = self.vocabulary {
            config = config.with_output_vocabulary(vocabulary);
        }
        Ok(config)
    }
}

pub fn run(args: ConvertArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    for path in [&args.section_summary, &args.splice]
        .into_iter()
        .chain(args.correlation.as_ref())
    {
        if !path.exists() {
            return Err(format!("File not found: {}", path.display()).into());
        }
    }

    let config = args.splice_config()?;

    println!(
        "{} {}",
        "Converting".cyan().bold(),
        args.splice.display().to_string().white()
    );

    let mut inputs = ConversionInputs::new(&args.section_summary, &args.splice);
    if let Some(ref correlation) = args.correlation {
        inputs = inputs.with_correlation(correlation);
    }

    let sit_path = args
        .sit_out
        .clone()
        .unwrap_or_else(|| sibling_path(&args.splice, "sit"));
    let affine_path = args
        .affine_out
        .clone()
        .unwrap_or_else(|| sibling_path(&args.splice, "affine"));
    let mut outputs = ConversionOutputs::default()
        .with_sit(&sit_path)
        .with_affine(&affine_path);
    if let Some(ref report) = args.report {
        outputs = outputs.with_report(report);
    }

    let report = Splicer::with_config(config).convert_files(&inputs, &outputs)?;
    let summary = &report.summary;

    println!(
        "Spliced {} intervals from {} cores; {} off-splice cores",
        summary.intervals.to_string().white().bold(),
        summary.splice_cores,
        summary.off_splice_cores
    );
    if let (Some(top), Some(bottom)) = (summary.top_ccsf, summary.bottom_ccsf) {
        println!("Composite depth: {:.3} m to {:.3} m CCSF", top, bottom);
    }
    print_counts(&summary.observations_by_severity);
    print_observations(&report.observations, verbose);

    println!();
    println!(
        "{} {}",
        "SIT written to".green(),
        sit_path.display().to_string().white()
    );
    println!(
        "{} {}",
        "Affine table written to".green(),
        affine_path.display().to_string().white()
    );
    if let Some(ref path) = args.report {
        println!(
            "{} {}",
            "Report written to".green(),
            path.display().to_string().white()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(config: Option<PathBuf>) -> ConvertArgs {
        ConvertArgs {
            section_summary: PathBuf::from("ss.csv"),
            splice: PathBuf::from("splice.csv"),
            correlation: None,
            sit_out: None,
            affine_out: None,
            report: None,
            lazy_append: false,
            trailing_joins: false,
            vocabulary: None,
            all_sites: false,
            config,
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"{{"lazy_append": true, "output_vocabulary": "laccore"}}"#).unwrap();

        let mut args = args(Some(file.path().to_path_buf()));
        args.trailing_joins = true;
        args.vocabulary = Some(OutputVocabulary::Canonical);
        let config = args.splice_config().unwrap();

        assert!(config.lazy_append);
        assert_eq!(config.join_convention, JoinConvention::Trailing);
        assert_eq!(config.output_vocabulary, OutputVocabulary::Canonical);
        assert!(config.restrict_to_splice_sites);
    }

    #[test]
    fn test_defaults_without_config() {
        let config = args(None).splice_config().unwrap();
        assert_eq!(config, SpliceConfig::default());
    }
}
