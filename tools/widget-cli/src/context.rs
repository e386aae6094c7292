//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use widget_core::{WidgetPaths, WidgetsConfig};

use crate::output::Output;

/// Config file names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["widgets.toml", ".widgets.toml", "widgets.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Runtime configuration, with a relative widgets root resolved against
    /// the directory of the config file.
    pub config: WidgetsConfig,
    /// Config file the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_from(&cwd, config_path, output)
    }

    fn load_from(cwd: &Path, config_path: Option<&str>, output: Output) -> Result<Self> {
        let path = match config_path {
            Some(path) => Some(resolve(cwd, Path::new(path))),
            // Try to find config in current directory or parent directories
            None => find_config(cwd),
        };

        let (config, config_path) = match path {
            Some(path) => {
                output.debug(&format!("Using config {}", path.display()));
                let config = WidgetsConfig::load(&path)
                    .with_context(|| format!("Failed to load config file: {}", path.display()))?;
                let base = path.parent().unwrap_or(cwd).to_path_buf();
                (anchor_root(config, &base), Some(path))
            }
            None => (anchor_root(WidgetsConfig::default(), cwd), None),
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Widget paths under the configured root.
    pub fn paths(&self) -> Result<WidgetPaths> {
        self.config
            .paths()
            .context("No widgets folder set. Add `widgets_root` to widgets.toml.")
    }
}

/// Find a config file in `start` or one of its parents.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

fn anchor_root(mut config: WidgetsConfig, base: &Path) -> WidgetsConfig {
    if let Some(root) = config.widgets_root.take() {
        config.widgets_root = Some(resolve(base, &root));
    }
    config
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
