//! Validate a widget type.

use anyhow::{bail, Result};
use serde::Serialize;
use widget_core::{WidgetTypeName, WidgetsConfig};
use widget_runtime::{ConfigSource, FsConfigSource};

use super::CheckArgs;
use crate::context::Context;

/// Outcome of checking one widget type.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    pub widget: String,
    pub class_name: Option<String>,
    pub defaults: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Run the check command.
pub fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let report = check(&args.widget, &ctx.config);

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        ctx.output.header(&format!("Checking widget '{}'", report.widget));
        if let Some(class_name) = &report.class_name {
            ctx.output.kv("class", class_name);
        }
        if !report.defaults.is_empty() {
            ctx.output.kv("defaults", &report.defaults.join(", "));
        }
        for warning in &report.warnings {
            ctx.output.warn(&format!("Warning: {}", warning));
        }
        for error in &report.errors {
            ctx.output.error(&format!("Error: {}", error));
        }
    }

    if !report.errors.is_empty() {
        bail!("Widget '{}' has {} error(s)", report.widget, report.errors.len());
    }

    ctx.output.success(&format!("Widget '{}' is valid", report.widget));
    Ok(())
}

/// Check a widget's name, conventional files and configuration.
pub fn check(name: &str, config: &WidgetsConfig) -> CheckReport {
    let mut report = CheckReport {
        widget: name.to_string(),
        ..Default::default()
    };

    let widget = match WidgetTypeName::new(name) {
        Ok(widget) => widget,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };
    report.class_name = Some(widget.class_name());

    let Some(paths) = config.paths() else {
        report.errors.push("no widgets folder set".to_string());
        return report;
    };

    let source = paths.source_file(&widget, &config.source_extension);
    if !source.is_file() {
        report
            .errors
            .push(format!("source file missing: {}", source.display()));
    }

    let partial = paths.partial_file(&widget, &config.partial_extension);
    if !partial.is_file() {
        report
            .warnings
            .push(format!("partial missing: {}", partial.display()));
    }

    match FsConfigSource::from_config(config).load(&widget) {
        Ok(Some(defaults)) => {
            report.defaults = defaults.names().map(str::to_string).collect();
        }
        Ok(None) => {}
        Err(e) => report.errors.push(e.to_string()),
    }

    report
}
