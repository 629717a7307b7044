use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sentiscope")]
#[command(about = "Lexicon-based sentiment and stance classification", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: nearest .sentiscope.toml, then the user config dir)
    #[arg(long, global = true, env = "SENTISCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lexicon TOML file, overriding the configured one
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the sentiment of a text
    Sentiment {
        /// Text to classify (1-5000 characters)
        text: String,
    },

    /// Classify the stance of a text toward a target
    Stance {
        /// Text to classify (1-5000 characters)
        text: String,

        /// Entity or topic the stance is about (1-200 characters)
        #[arg(short, long)]
        target: String,
    },

    /// Classify every line of a file in parallel, printing JSON lines
    Batch {
        /// File with one text per line
        file: PathBuf,

        /// Classify stance toward this target instead of sentiment
        #[arg(short, long)]
        target: Option<String>,

        /// Number of worker threads (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Print cache and performance statistics afterwards
        #[arg(long)]
        stats: bool,
    },

    /// Write a default .sentiscope.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_stance_with_global_flags() {
        let cli = Cli::parse_from([
            "sentiscope",
            "stance",
            "I love Apple",
            "--target",
            "Apple",
            "--format",
            "json",
            "-vv",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Commands::Stance { text, target } => {
                assert_eq!(text, "I love Apple");
                assert_eq!(target, "Apple");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
