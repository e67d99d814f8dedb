//! lambda-lift - Serverless function packager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use lambda_lift::cli::{commands, Cli, Commands};
use lambda_lift::config::ConfigRegistry;
use lambda_lift::error::{LiftError, LiftResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LiftResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("lambda_lift=warn"),
        1 => EnvFilter::new("lambda_lift=info"),
        _ => EnvFilter::new("lambda_lift=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()
            .map_err(|e| LiftError::io("getting current directory", e))?,
    };
    debug!("Discovering configs under {}", root.display());
    let registry = ConfigRegistry::discover(&root)?;

    match cli.command {
        Commands::Build(args) => commands::build(args, &registry).await,
        Commands::List(args) => commands::list(args, &registry).await,
        Commands::Cache(args) => commands::cache(args, &registry).await,
    }
}
