//! Cache command - inspect and clear dependency caches

use crate::cache::{self, CacheMarker, CacheStatus};
use crate::cli::args::{CacheAction, CacheArgs};
use crate::config::{BuildConfig, ConfigRegistry, LambdaConfig};
use crate::error::LiftResult;
use crate::packer::blocking;
use crate::ui::{self, Mark, UiContext};

/// Execute the cache command
pub async fn execute(args: CacheArgs, registry: &ConfigRegistry) -> LiftResult<()> {
    match args.action {
        CacheAction::Status { names } => show_status(registry.select(&names, false)?).await,
        CacheAction::Clear { names, all } => clear_caches(registry.select(&names, all)?).await,
    }
}

/// Freshness and last marker of one function, read off the runtime
async fn read_cache(build: &BuildConfig) -> LiftResult<(CacheStatus, Option<CacheMarker>)> {
    let build = build.clone();
    blocking(move || {
        let status = cache::inspect(&build);
        let marker = cache::read_marker(&build).ok().flatten();
        Ok((status, marker))
    })
    .await
}

async fn show_status(configs: Vec<&LambdaConfig>) -> LiftResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Dependency caches");

    let mut stale = 0;
    for lambda in configs {
        let (status, marker) = read_cache(&lambda.build).await?;
        let mark = if status.is_fresh() {
            Mark::Ok
        } else {
            stale += 1;
            Mark::Warn
        };
        ui::line(&ctx, mark, &format!("{}: {}", lambda.name(), status));
        if let Some(marker) = marker {
            ui::detail(
                &ctx,
                "last built",
                &marker.bumped_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            );
        }
    }

    if stale == 0 {
        ui::outro(&ctx, "All caches are fresh");
    } else {
        ui::line(
            &ctx,
            Mark::Warn,
            &format!("{} cache(s) will be rebuilt on the next build", stale),
        );
    }
    Ok(())
}

async fn clear_caches(configs: Vec<&LambdaConfig>) -> LiftResult<()> {
    let ctx = UiContext::detect();
    let mut cleared = 0;

    for lambda in configs {
        if cache::clear(&lambda.build)? {
            cleared += 1;
            ui::line(
                &ctx,
                Mark::Ok,
                &format!(
                    "Cleared {} ({})",
                    lambda.name(),
                    lambda.build.cache_path.display()
                ),
            );
        } else {
            ui::line(&ctx, Mark::Info, &format!("{}: nothing cached", lambda.name()));
        }
    }

    ui::outro(&ctx, &format!("Cleared {} cache(s)", cleared));
    Ok(())
}
