//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;

/// Cache Clone - Clone and push git repositories through a local bare mirror
#[derive(Parser, Debug)]
#[command(name = "cache-clone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level (RUST_LOG overrides it)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone a repository through its mirror, creating or refreshing the mirror first
    Clone(commands::clone::CloneArgs),

    /// Push the current branch to the mirror and from there to the remote
    Push(commands::push::PushArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),

    /// Print the version
    Version,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Clone(args) => commands::clone::execute(args),
            Commands::Push(args) => commands::push::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
            Commands::Version => commands::version::execute(),
        }
    }

    /// Logs go to stderr; `RUST_LOG` overrides the flags.
    fn init_logging(&self) {
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            self.log_level.parse().unwrap_or(LevelFilter::Info)
        };
        // A logger may already be installed when embedded in tests.
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_target(false)
            .try_init();
    }
}
