//! gymsync — pull the gym log off the phone and keep dated backups.
//!
//! # Usage
//!
//! ```text
//! gymsync sync [--device ID] [--bridge PATH] [--local-dir DIR] [--timeout SECS] [--serve]
//! gymsync devices [--bridge PATH]
//! gymsync serve [--port N] [--no-browser]
//! gymsync config show|init|path
//! ```
//!
//! Global flags: `--config PATH` (default `~/.gymsync/config.yaml`), `--verbose`.

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{config::ConfigCommand, devices::DevicesArgs, serve::ServeArgs, sync::SyncArgs};
use gymsync_core::{store, SyncConfig};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gymsync",
    version,
    about = "Sync the gym records file from an Android device over adb",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ~/.gymsync/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug diagnostics on stderr (RUST_LOG overrides).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull the records file, rotate the previous copy, and clean the device.
    Sync(SyncArgs),

    /// List devices attached to the bridge.
    Devices(DevicesArgs),

    /// Serve the records directory over HTTP and open the graph page.
    Serve(ServeArgs),

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sync(args) => args.run(load_config(cli.config.as_deref())?),
        Commands::Devices(args) => args.run(load_config(cli.config.as_deref())?),
        Commands::Serve(args) => args.run(load_config(cli.config.as_deref())?),
        Commands::Config { command } => commands::config::run(command, cli.config.as_deref()),
    }
}

/// Defaults, overlaid by the config file when one exists.
fn load_config(explicit: Option<&std::path::Path>) -> Result<SyncConfig> {
    match explicit {
        Some(path) => store::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => store::load_or_default().context("failed to load ~/.gymsync/config.yaml"),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
