//! CLI command implementations.

pub mod convert;
pub mod depth;
pub mod export;

use std::path::{Path, PathBuf};

use colored::Colorize;
use coresplice::{Observation, ObservationCounts, Severity};

/// `<dir>/<stem>-<suffix>.csv` next to `input`.
pub(crate) fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}-{}.csv", stem, suffix))
}

/// One-line severity count.
pub(crate) fn print_counts(counts: &ObservationCounts) {
    println!(
        "Found {} observations ({} errors, {} warnings, {} info)",
        counts.total().to_string().white().bold(),
        counts.error.to_string().red(),
        counts.warning.to_string().yellow(),
        counts.info.to_string().blue()
    );
}

/// Errors and warnings, one per line; info too when verbose.
pub(crate) fn print_observations(observations: &[Observation], verbose: bool) {
    let shown: Vec<&Observation> = observations
        .iter()
        .filter(|o| verbose || o.severity != Severity::Info)
        .collect();
    if shown.is_empty() {
        return;
    }

    println!();
    println!("{}", "Observations:".yellow().bold());
    for obs in shown {
        let tag = match obs.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warn ".yellow(),
            Severity::Info => "info ".blue(),
        };
        println!(
            "  {} {:<28} {} {}",
            tag,
            obs.kind.label(),
            obs.subject.white(),
            obs.description.dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_path() {
        let path = sibling_path(Path::new("/data/U1234-splice.txt"), "sit");
        assert_eq!(path, PathBuf::from("/data/U1234-splice-sit.csv"));

        let bare = sibling_path(Path::new("splice.csv"), "affine");
        assert_eq!(bare, PathBuf::from("splice-affine.csv"));
    }
}
