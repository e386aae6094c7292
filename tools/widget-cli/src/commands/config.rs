//! Show the resolved configuration.

use anyhow::{Context as _, Result};
use widget_core::WidgetsConfig;

use super::{ConfigArgs, ConfigFormat};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let format = if ctx.output.is_json() {
        ConfigFormat::Json
    } else {
        args.format
    };

    match &ctx.config_path {
        Some(path) => ctx.output.info(&format!("Loaded from {}", path.display())),
        None => ctx.output.info("No widgets.toml found, using defaults"),
    }
    if ctx.config.widgets_root.is_none() {
        ctx.output.warn("widgets_root is not set; widgets cannot be loaded");
    }

    println!("{}", render(&ctx.config, format)?);
    Ok(())
}

fn render(config: &WidgetsConfig, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Toml => toml::to_string_pretty(config).context("Failed to serialize config as TOML"),
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("Failed to serialize config as JSON")
        }
    }
}
