//! Print session keys for a widget instance.

use anyhow::Result;
use serde::Serialize;
use widget_core::{WidgetIdentifier, WidgetTypeName};
use widget_session::{SessionStateKey, StateScope};

use super::KeysArgs;
use crate::context::Context;

#[derive(Debug, Serialize)]
struct KeysReport {
    widget: String,
    identifier: String,
    page: String,
    permanent: String,
}

/// Run the keys command.
pub fn run(args: KeysArgs, ctx: &Context) -> Result<()> {
    let widget = WidgetTypeName::new(args.widget.as_str())?;
    let identifier = args
        .identifier
        .map(WidgetIdentifier::new)
        .unwrap_or_default();
    let report = keys(&widget, &identifier);

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.header(&format!("Session keys for {} ({})", widget, identifier));
    ctx.output.kv("page", &report.page);
    ctx.output.kv("permanent", &report.permanent);

    if widget.as_str().contains('_') || identifier.as_str().contains('_') {
        ctx.output.warn("Underscores in names can make keys of different widget types collide");
    }

    Ok(())
}

fn keys(widget: &WidgetTypeName, identifier: &WidgetIdentifier) -> KeysReport {
    let key = |scope| SessionStateKey::new(widget, identifier, scope).as_str().to_string();
    KeysReport {
        widget: widget.to_string(),
        identifier: identifier.to_string(),
        page: key(StateScope::Page),
        permanent: key(StateScope::Permanent),
    }
}
