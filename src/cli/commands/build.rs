//! Build command - package functions into deployable archives

use crate::cli::args::BuildArgs;
use crate::config::ConfigRegistry;
use crate::error::LiftResult;
use crate::packer::{Packer, PipInstaller};
use crate::ui::{self, TaskSpinner, UiContext};
use std::time::Instant;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, registry: &ConfigRegistry) -> LiftResult<()> {
    let ctx = UiContext::detect();
    let selected = registry.select(&args.names, args.all)?;
    let packer = Packer::new(PipInstaller::new());
    debug!(
        "Building {} function(s) with {}",
        selected.len(),
        packer.installer_name()
    );

    ui::intro(&ctx, "Building functions");
    let started = Instant::now();

    for lambda in &selected {
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Packaging {}...", lambda.name()));

        let report = match packer.package(&lambda.build, args.force).await {
            Ok(report) => report,
            Err(e) => {
                spinner.stop_error(&format!("Failed to package {}", lambda.name()));
                return Err(e);
            }
        };

        let cache = if report.cache_hit {
            "cached dependencies"
        } else {
            "dependencies rebuilt"
        };
        spinner.stop(&format!(
            "{} -> {} ({} entries, {})",
            report.name,
            report.destination.display(),
            report.entries,
            cache
        ));
    }

    ui::outro(
        &ctx,
        &format!(
            "Built {} function(s) in {:.1}s",
            selected.len(),
            started.elapsed().as_secs_f64()
        ),
    );
    Ok(())
}
