use anyhow::Result;
use clap::Parser;
use sentiscope::cli::{Cli, Commands};
use sentiscope::commands::{init_config, run_batch, run_single, BatchOptions};
use sentiscope::config::{load_config, EnvironmentSnapshot};
use sentiscope::observability::init_tracing;
use sentiscope::pipeline::Analyzer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let cwd = std::env::current_dir()?;
    if let Commands::Init { force } = cli.command {
        return init_config(&cwd, force);
    }

    let mut config = load_config(
        cli.config.as_deref(),
        &cwd,
        &EnvironmentSnapshot::from_current_env(),
    )?;
    if let Some(lexicon) = cli.lexicon {
        config.lexicon.path = Some(lexicon);
    }
    let analyzer = Analyzer::new(config)?;

    match cli.command {
        Commands::Sentiment { text } => run_single(&analyzer, &text, None, cli.format),
        Commands::Stance { text, target } => {
            run_single(&analyzer, &text, Some(&target), cli.format)
        }
        Commands::Batch {
            file,
            target,
            jobs,
            stats,
        } => {
            let options = BatchOptions {
                target,
                jobs,
                stats,
                format: cli.format,
            };
            let failures = run_batch(&analyzer, &file, &options)?;
            if failures > 0 {
                tracing::warn!(failures, "some lines could not be analyzed");
            }
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}
