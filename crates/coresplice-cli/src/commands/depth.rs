//! Depth command - section ID plus offset to drilled depth.

use std::path::PathBuf;

use colored::Colorize;
use coresplice::{RunContext, SectionDepthResolver, SectionIdentity, SectionSummary, SpliceConfig, TableReader};

use super::print_observations;

pub fn run(
    section_summary: PathBuf,
    section: String,
    offset: f64,
    scaled: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !section_summary.exists() {
        return Err(format!("File not found: {}", section_summary.display()).into());
    }

    let id: SectionIdentity = section.parse()?;
    let summary = SectionSummary::load(&TableReader::new(), &section_summary)?;
    let config = SpliceConfig::default();
    let mut ctx = RunContext::new(&config);

    let depth = SectionDepthResolver::new(&summary).resolve_depth(&id.key(), offset, scaled, &mut ctx)?;

    let scale = if scaled { "CSF-B" } else { "CSF-A" };
    println!(
        "{} @ {}cm = {} m {}",
        id.to_string().white().bold(),
        offset,
        format!("{:.3}", depth).green().bold(),
        scale
    );
    print_observations(ctx.diagnostics().observations(), verbose);

    Ok(())
}
