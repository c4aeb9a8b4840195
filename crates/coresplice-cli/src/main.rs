//! coresplice CLI - composite depth splicing for drill cores.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            section_summary,
            splice,
            correlation,
            sit_out,
            affine_out,
            report,
            lazy_append,
            trailing_joins,
            vocabulary,
            all_sites,
            config,
        } => commands::convert::run(
            commands::convert::ConvertArgs {
                section_summary,
                splice,
                correlation,
                sit_out,
                affine_out,
                report,
                lazy_append,
                trailing_joins,
                vocabulary: vocabulary.map(Into::into),
                all_sites,
                config,
            },
            cli.verbose,
        ),

        Commands::Export {
            affine,
            sit,
            data,
            output,
            depth_column,
            on_splice_only,
            whole_section,
        } => commands::export::run(
            affine,
            sit,
            data,
            output,
            depth_column,
            on_splice_only,
            whole_section,
            cli.verbose,
        ),

        Commands::Depth {
            section_summary,
            section,
            offset,
            scaled,
        } => commands::depth::run(section_summary, section, offset, scaled, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warn, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "coresplice=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
