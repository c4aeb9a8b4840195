//! Export command - measurement data on the composite depth scale.

use std::path::PathBuf;

use colored::Colorize;
use coresplice::{ExportOptions, Splicer};

use super::{print_observations, sibling_path};

#[allow(clippy::too_many_arguments)]
pub fn run(
    affine: PathBuf,
    sit: PathBuf,
    data: PathBuf,
    output: Option<PathBuf>,
    depth_column: String,
    on_splice_only: bool,
    whole_section: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for path in [&affine, &sit, &data] {
        if !path.exists() {
            return Err(format!("File not found: {}", path.display()).into());
        }
    }

    let output = output.unwrap_or_else(|| sibling_path(&data, "spliced"));
    let options = ExportOptions::default()
        .with_depth_column(depth_column)
        .with_include_off_splice(!on_splice_only)
        .with_whole_splice_section(whole_section);

    println!(
        "{} {}",
        "Splicing".cyan().bold(),
        data.display().to_string().white()
    );

    let result = Splicer::new().export_measurements(&affine, &sit, &data, &output, &options)?;
    let spliced = &result.measurements;

    println!(
        "{} rows on splice, {} off splice",
        spliced.on_splice.to_string().white().bold(),
        spliced.off_splice
    );
    if spliced.unmatched > 0 {
        println!(
            "{} rows had no affine row and were dropped",
            spliced.unmatched.to_string().yellow()
        );
    }
    print_observations(&result.observations, verbose);

    println!();
    println!(
        "{} {}",
        "Spliced data written to".green(),
        output.display().to_string().white()
    );

    Ok(())
}
