//! List command - show discovered function configs

use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::{ConfigRegistry, LambdaConfig};
use crate::error::LiftResult;
use crate::ui::{self, Mark, UiContext};
use console::style;

/// Execute the list command
pub async fn execute(args: ListArgs, registry: &ConfigRegistry) -> LiftResult<()> {
    if registry.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::line(
                    &ctx,
                    Mark::Info,
                    &format!("No lambda-lift configs under {}", registry.root().display()),
                );
            }
        }
        return Ok(());
    }

    let configs: Vec<&LambdaConfig> = registry.configs().collect();
    match args.format {
        OutputFormat::Table => print_table(&configs),
        OutputFormat::Json => print_json(&configs)?,
        OutputFormat::Plain => print_plain(&configs),
    }

    Ok(())
}

fn print_table(configs: &[&LambdaConfig]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Functions");

    println!(
        "{:<24} {:<10} {:<14} {:<40}",
        style("NAME").bold(),
        style("PLATFORM").bold(),
        style("DEPLOYMENTS").bold(),
        style("CONFIG").bold()
    );
    println!("{}", "-".repeat(88));

    for config in configs {
        let deployments = if config.deployments.is_empty() {
            "-".to_string()
        } else {
            config
                .deployments
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(",")
        };
        println!(
            "{:<24} {:<10} {:<14} {:<40}",
            config.name(),
            config.build.platform,
            deployments,
            config.toml_path.display()
        );
    }

    println!();
    println!("{} function(s)", configs.len());
}

fn print_json(configs: &[&LambdaConfig]) -> LiftResult<()> {
    let json = serde_json::to_string_pretty(configs)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(configs: &[&LambdaConfig]) {
    for config in configs {
        println!("{}", config.name());
    }
}
