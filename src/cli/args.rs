//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lambda-lift - Serverless function packager
///
/// Bundles Python sources and their third-party dependencies into
/// deployable zip archives, reusing cached dependency builds.
#[derive(Parser, Debug)]
#[command(name = "lambda-lift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory searched for lambda-lift*.toml files (defaults to current directory)
    #[arg(short, long, global = true, env = "LAMBDA_LIFT_ROOT")]
    pub root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package functions into deployable archives
    Build(BuildArgs),

    /// List discovered function configs
    List(ListArgs),

    /// Inspect or clear dependency caches
    Cache(CacheArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Function names to build (all when omitted)
    pub names: Vec<String>,

    /// Build every discovered function
    #[arg(short, long, conflicts_with = "names")]
    pub all: bool,

    /// Reinstall dependencies even when the cache is fresh
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show whether each dependency cache is fresh
    Status {
        /// Function names (all when omitted)
        names: Vec<String>,
    },

    /// Remove cached dependency archives and markers
    Clear {
        /// Function names to clear
        #[arg(required_unless_present = "all")]
        names: Vec<String>,

        /// Clear every discovered function
        #[arg(short, long, conflicts_with = "names")]
        all: bool,
    },
}
