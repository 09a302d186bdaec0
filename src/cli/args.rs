// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for nodeflow

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(about = "A node-graph workflow engine executing JSON workflow snapshots")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a workflow from a JSON snapshot file
    Run {
        #[arg(help = "Path to workflow snapshot JSON file")]
        snapshot: PathBuf,

        #[arg(long, help = "Dry run - validate without executing")]
        dry_run: bool,

        #[arg(short, long, help = "Write the post-run snapshot to this path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Maximum number of concurrently running nodes")]
        max_concurrent: Option<usize>,
    },

    /// Validate a workflow snapshot without executing
    Validate {
        #[arg(help = "Path to workflow snapshot JSON file")]
        snapshot: PathBuf,
    },

    /// List the built-in node templates
    Templates,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_parses() {
        let args = Args::try_parse_from([
            "nodeflow",
            "run",
            "flow.json",
            "--max-concurrent",
            "8",
            "--dry-run",
        ])
        .unwrap();

        match args.command {
            Commands::Run {
                snapshot,
                dry_run,
                max_concurrent,
                ..
            } => {
                assert_eq!(snapshot, PathBuf::from("flow.json"));
                assert!(dry_run);
                assert_eq!(max_concurrent, Some(8));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_validate_command_parses() {
        let args = Args::try_parse_from(["nodeflow", "validate", "flow.json"]).unwrap();
        assert!(matches!(args.command, Commands::Validate { .. }));
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        assert!(Args::try_parse_from(["nodeflow", "run"]).is_err());
    }
}
