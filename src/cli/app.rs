// ABOUTME: Main application orchestration for the nodeflow CLI
// ABOUTME: Coordinates between CLI arguments, logging, and command execution

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands};

const DEFAULT_MAX_CONCURRENT: usize = 4;

pub struct App;

impl App {
    pub fn new() -> Self {
        Self
    }

    /// Initialize logging; `RUST_LOG` wins over the verbose flag.
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose { "debug" } else { "info" };
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(!no_color)
            .with_target(false)
            .init();

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub async fn run(&mut self, args: Args) -> Result<()> {
        self.init_logging(args.verbose, args.no_color)?;

        info!("Starting nodeflow v{}", env!("CARGO_PKG_VERSION"));

        match args.command {
            Commands::Run {
                snapshot,
                dry_run,
                output,
                max_concurrent,
            } => {
                let max_concurrent = max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT);
                commands::run_workflow(snapshot, dry_run, output, max_concurrent).await
            }

            Commands::Validate { snapshot } => commands::validate_workflow(snapshot).await,

            Commands::Templates => commands::list_templates(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
