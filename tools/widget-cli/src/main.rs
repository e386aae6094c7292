//! Widgets CLI - Inspect widget folders and session state keys.
//!
//! Commands:
//! - `widgets list` - List widget folders and their conventional files
//! - `widgets check` - Validate a widget type
//! - `widgets keys` - Print the session keys of a widget instance
//! - `widgets config` - Show the resolved runtime configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ConfigArgs, KeysArgs, ListArgs};

/// Widgets CLI - Inspect session-stateful widgets
#[derive(Parser)]
#[command(name = "widgets")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List widget folders under the widgets root
    List(ListArgs),

    /// Validate a widget type's name, files and configuration
    Check(CheckArgs),

    /// Print the session keys used by a widget instance
    Keys(KeysArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::List(args) => commands::list::run(args, &ctx),
        Commands::Check(args) => commands::check::run(args, &ctx),
        Commands::Keys(args) => commands::keys::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
