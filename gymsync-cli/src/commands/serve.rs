//! `gymsync serve` — serve the records directory and open the graph page.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gymsync_core::SyncConfig;
use gymsync_serve::{graph_url, serve_blocking, ServeOutcome};

/// Arguments for `gymsync serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (default: `http_port` from the config).
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Do not open the browser.
    #[arg(long)]
    pub no_browser: bool,
}

impl ServeArgs {
    pub fn run(self, mut config: SyncConfig) -> Result<()> {
        if let Some(port) = self.port {
            config.http_port = port;
        }
        serve(config.serve_root(), config.http_port, !self.no_browser)
    }
}

/// Serve `root` on `port` until Ctrl-C. Shared with `gymsync sync --serve`.
pub fn serve(root: &Path, port: u16, open: bool) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("serve root {} is not a directory", root.display());
    }

    let outcome = serve_blocking(root, port, open, |addr| {
        println!(
            "{} Server started on port {} ({})",
            "✓".green(),
            addr.port(),
            graph_url(addr.port())
        );
        println!("Press Ctrl-C to stop.");
    })
    .with_context(|| format!("failed to serve {} on port {port}", root.display()))?;

    match outcome {
        ServeOutcome::Stopped => println!("Server stopped."),
        ServeOutcome::AlreadyServing => println!(
            "{}",
            format!("Port {port} is already in use. Trying to open the browser anyway.").yellow()
        ),
    }
    Ok(())
}
