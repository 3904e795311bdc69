pub mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;

use crate::common::result::SdkSyncResult;
use crate::infrastructure::filesystem::DEFAULT_CONFIG_FILE;
use commands::{DownloadCommand, InitCommand, ModulesCommand, SyncCommand};

/// Shown by `--version`: package version, source revision, build date and target
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("SDKSYNC_REVISION"),
    " ",
    env!("SDKSYNC_BUILD_DATE"),
    ")\ntarget: ",
    env!("SDKSYNC_BUILD_TARGET"),
);

/// sdksync - publish generated API packages to per-module git repositories
#[derive(Parser, Debug)]
#[command(name = "sdksync")]
#[command(about = "Publish generated API packages to per-module git repositories")]
#[command(version, long_version = LONG_VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "SDKSYNC_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate every module and publish it to its repository
    Sync {
        /// Target branch (defaults to the configured default branch)
        #[arg(short, long)]
        branch: Option<String>,

        /// Only synchronize this module
        #[arg(short, long)]
        module: Option<String>,

        /// Modules processed concurrently (0 = number of CPUs)
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Download specification documents
    Download {
        /// Only download this module
        #[arg(short, long)]
        module: Option<String>,
    },

    /// List modules found in the specification directory
    Modules,
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn verbose(&self) -> bool {
        self.cli.verbose
    }

    pub fn no_color(&self) -> bool {
        self.cli.no_color
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if self.cli.no_color {
            colored::control::set_override(false);
        }

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let code = e.exit_code();
                eprintln!("{} {:#}", "Error:".red().bold(), anyhow::Error::from(e));
                exit(code);
            }
        }
    }

    async fn handle_command(&self) -> SdkSyncResult<()> {
        let config_path = self.cli.config.clone();

        match &self.cli.command {
            Commands::Init { force } => InitCommand::new(config_path, *force).execute().await,
            Commands::Sync {
                branch,
                module,
                jobs,
            } => {
                SyncCommand::new(config_path, branch.clone(), module.clone(), *jobs, self.cli.verbose)
                    .execute()
                    .await
            }
            Commands::Download { module } => {
                DownloadCommand::new(config_path, module.clone(), !self.cli.no_color)
                    .execute()
                    .await
            }
            Commands::Modules => ModulesCommand::new(config_path).execute().await,
        }
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
