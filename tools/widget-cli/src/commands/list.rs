//! List widget folders.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;
use widget_core::{WidgetPaths, WidgetTypeName, WidgetsConfig};

use super::ListArgs;
use crate::context::Context;
use crate::output::presence;

/// Conventional files found for one widget folder.
#[derive(Debug, Serialize)]
pub struct WidgetEntry {
    pub name: String,
    pub class_name: String,
    pub source: bool,
    pub partial: bool,
    pub config: Option<String>,
}

impl WidgetEntry {
    fn is_complete(&self) -> bool {
        self.source && self.partial
    }
}

/// Run the list command.
pub fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let paths = ctx.paths()?;
    let mut entries = scan(&paths, &ctx.config)?;
    if args.incomplete {
        entries.retain(|entry| !entry.is_complete());
    }

    if ctx.output.is_json() {
        ctx.output.json(&entries);
        return Ok(());
    }

    ctx.output.header(&format!("Widgets in {}", paths.root().display()));
    if entries.is_empty() {
        ctx.output.info("No widgets found");
        return Ok(());
    }

    let widths = [24, 28, 8, 8, 8];
    ctx.output
        .table_row(&["TYPE", "CLASS", "SOURCE", "PARTIAL", "CONFIG"], &widths);
    for entry in &entries {
        let source = presence(entry.source);
        let partial = presence(entry.partial);
        let config = entry.config.clone().unwrap_or_else(|| presence(false));
        ctx.output.table_row(
            &[
                entry.name.as_str(),
                entry.class_name.as_str(),
                source.as_str(),
                partial.as_str(),
                config.as_str(),
            ],
            &widths,
        );
    }

    Ok(())
}

/// Scan the widgets root for folders named like widget types.
pub fn scan(paths: &WidgetPaths, config: &WidgetsConfig) -> Result<Vec<WidgetEntry>> {
    let root = paths.root();
    let dir = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read widgets folder: {}", root.display()))?;

    let mut entries = Vec::new();
    for entry in dir {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        match WidgetTypeName::new(name.as_str()) {
            Ok(widget) => entries.push(inspect(paths, config, &widget)),
            Err(_) => tracing::debug!(folder = %name, "skipping folder that is not a widget type"),
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn inspect(paths: &WidgetPaths, config: &WidgetsConfig, widget: &WidgetTypeName) -> WidgetEntry {
    let config_ext = config
        .config_extensions
        .iter()
        .find(|ext| is_file(&paths.config_file(widget, ext)))
        .cloned();

    WidgetEntry {
        name: widget.to_string(),
        class_name: widget.class_name(),
        source: is_file(&paths.source_file(widget, &config.source_extension)),
        partial: is_file(&paths.partial_file(widget, &config.partial_extension)),
        config: config_ext,
    }
}

fn is_file(path: &Path) -> bool {
    path.is_file()
}
