//! CLI command implementations.

pub mod check;
pub mod config;
pub mod keys;
pub mod list;

use clap::{Args, ValueEnum};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only list widgets missing one of their conventional files.
    #[arg(long)]
    pub incomplete: bool,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Widget type name (e.g. `hello_world`).
    pub widget: String,
}

/// Arguments for the keys command.
#[derive(Args)]
pub struct KeysArgs {
    /// Widget type name.
    pub widget: String,

    /// Instance identifier.
    #[arg(short, long)]
    pub identifier: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ConfigFormat::Toml)]
    pub format: ConfigFormat,
}

/// Config output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}
